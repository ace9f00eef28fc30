// Admin gate - shared-secret access to the request dashboards
//
// A single configured password unlocks everything. There is no session,
// expiry or lockout, and a failed check is indistinguishable from "not an
// admin": callers simply get nothing back.

use crate::store::{
    CareerRequest, MentorshipRequest, Record, RecordStore, RequestStatus, StoreError,
};
use serde::Serialize;
use std::collections::BTreeSet;

/// Shared-secret check
#[derive(Clone)]
pub struct AdminGate {
    secret: Option<String>,
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl AdminGate {
    /// An empty secret disables the gate entirely
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    /// Plain equality check (not constant-time)
    pub fn authenticate(&self, supplied: &str) -> bool {
        match &self.secret {
            Some(secret) => secret == supplied,
            None => false,
        }
    }
}

/// A stored row together with its positional id
#[derive(Debug, Clone, Serialize)]
pub struct IndexedRow<R> {
    /// Row position in the store; pass this back to update the request
    pub id: usize,
    #[serde(flatten)]
    pub record: R,
}

/// Mentorship dashboard contents
#[derive(Debug, Clone, Serialize)]
pub struct MentorshipDashboard {
    /// Column order of the backing file
    pub columns: &'static [&'static str],
    /// Total rows in the store, before filtering
    pub total: usize,
    /// Statuses present in the store (filter options)
    pub statuses: Vec<RequestStatus>,
    /// Statuses the rows were filtered by
    pub filter: Vec<RequestStatus>,
    /// Matching rows, newest first
    pub requests: Vec<IndexedRow<MentorshipRequest>>,
}

/// Career dashboard contents
#[derive(Debug, Clone, Serialize)]
pub struct CareerDashboard {
    pub columns: &'static [&'static str],
    pub total: usize,
    /// All rows, newest first
    pub requests: Vec<IndexedRow<CareerRequest>>,
}

/// Statuses shown when the admin hasn't picked any
pub fn default_status_filter() -> Vec<RequestStatus> {
    vec![RequestStatus::Pending]
}

/// Number rows by position, then sort newest first (stable for ties)
fn newest_first<R: Record>(rows: Vec<R>) -> Vec<IndexedRow<R>> {
    let mut indexed: Vec<IndexedRow<R>> = rows
        .into_iter()
        .enumerate()
        .map(|(id, record)| IndexedRow { id, record })
        .collect();
    indexed.sort_by(|a, b| b.record.timestamp().cmp(&a.record.timestamp()));
    indexed
}

/// Build the mentorship dashboard filtered to `filter`
pub fn mentorship_dashboard(
    store: &RecordStore<MentorshipRequest>,
    filter: &[RequestStatus],
) -> Result<MentorshipDashboard, StoreError> {
    let rows = store.load_all()?;
    let total = rows.len();

    let statuses: Vec<RequestStatus> = rows
        .iter()
        .map(|r| r.status)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let requests = newest_first(rows)
        .into_iter()
        .filter(|row| filter.contains(&row.record.status))
        .collect();

    Ok(MentorshipDashboard {
        columns: store.columns(),
        total,
        statuses,
        filter: filter.to_vec(),
        requests,
    })
}

/// Build the read-only career dashboard
pub fn career_dashboard(store: &RecordStore<CareerRequest>) -> Result<CareerDashboard, StoreError> {
    let rows = store.load_all()?;
    Ok(CareerDashboard {
        columns: store.columns(),
        total: rows.len(),
        requests: newest_first(rows),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CareerInterest, Country, Interest, Interests};
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap()
    }

    fn request(name: &str, day: u32, status: RequestStatus) -> MentorshipRequest {
        MentorshipRequest {
            timestamp: ts(day),
            name: name.to_string(),
            country: Country::Ghana,
            interests: Interests::new([Interest::Science]),
            contact: "0244000000".to_string(),
            status,
            notes: String::new(),
            education_level: None,
            preferred_comms: None,
        }
    }

    #[test]
    fn test_gate() {
        let gate = AdminGate::new(Some("s3cret".to_string()));
        assert!(gate.is_enabled());
        assert!(gate.authenticate("s3cret"));
        assert!(!gate.authenticate("S3CRET"));
        assert!(!gate.authenticate(""));

        let disabled = AdminGate::new(Some(String::new()));
        assert!(!disabled.is_enabled());
        assert!(!disabled.authenticate(""));
        assert!(!AdminGate::new(None).authenticate("anything"));
    }

    #[test]
    fn test_gate_debug_hides_secret() {
        let gate = AdminGate::new(Some("s3cret".to_string()));
        assert!(!format!("{:?}", gate).contains("s3cret"));
    }

    #[test]
    fn test_mentorship_dashboard_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::in_dir(dir.path());
        store.append(request("Amina", 1, RequestStatus::Pending)).unwrap();
        store.append(request("Kwame", 3, RequestStatus::Resolved)).unwrap();
        store.append(request("Zola", 2, RequestStatus::Pending)).unwrap();

        let dashboard = mentorship_dashboard(&store, &default_status_filter()).unwrap();
        assert_eq!(dashboard.total, 3);
        assert_eq!(dashboard.columns, MentorshipRequest::COLUMNS);
        assert_eq!(
            dashboard.statuses,
            vec![RequestStatus::Pending, RequestStatus::Resolved]
        );

        let names: Vec<(usize, &str)> = dashboard
            .requests
            .iter()
            .map(|r| (r.id, r.record.name.as_str()))
            .collect();
        assert_eq!(names, vec![(2, "Zola"), (0, "Amina")]);

        let all = mentorship_dashboard(&store, RequestStatus::ALL).unwrap();
        assert_eq!(all.requests[0].record.name, "Kwame");
        assert_eq!(all.requests[0].id, 1);
    }

    #[test]
    fn test_empty_dashboards() {
        let dir = tempfile::tempdir().unwrap();
        let mentorship: RecordStore<MentorshipRequest> = RecordStore::in_dir(dir.path());
        let dashboard = mentorship_dashboard(&mentorship, &default_status_filter()).unwrap();
        assert_eq!(dashboard.total, 0);
        assert!(dashboard.statuses.is_empty());

        let career: RecordStore<CareerRequest> = RecordStore::in_dir(dir.path());
        assert_eq!(career_dashboard(&career).unwrap().total, 0);
    }

    #[test]
    fn test_career_dashboard_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::in_dir(dir.path());
        for (day, name) in [(5, "Old"), (9, "New")] {
            store
                .append(CareerRequest {
                    timestamp: ts(day),
                    name: name.to_string(),
                    email: format!("{}@example.com", name.to_lowercase()),
                    career_interest: CareerInterest::Business,
                })
                .unwrap();
        }

        let dashboard = career_dashboard(&store).unwrap();
        assert_eq!(dashboard.columns[2], "email");
        assert_eq!(dashboard.requests[0].record.name, "New");
        assert_eq!(dashboard.requests[1].id, 0);
    }

    #[test]
    fn test_indexed_row_serializes_flat() {
        let row = IndexedRow {
            id: 4,
            record: request("Amina", 1, RequestStatus::Contacted),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["id"], 4);
        assert_eq!(json["status"], "Contacted");
        assert_eq!(json["interests"], "Science");
        assert_eq!(json["timestamp"], "2025-03-01 08:30:00");
    }
}
