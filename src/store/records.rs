// Record types for the two request stores
//
// Field order of each struct is the CSV column order. Enum values are written
// with their display labels so the files stay readable in a spreadsheet.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::Record;

/// Timestamp layout used in both files
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// serde adapter for `NaiveDateTime` in TIMESTAMP_FORMAT
mod timestamp_format {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
            .map_err(serde::de::Error::custom)
    }
}

/// Defines a closed set of form options written by label
///
/// Reading accepts any casing and surrounding whitespace, so hand-edited CSV
/// rows and API bodies like "south africa" still map onto a variant.
macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Parse a label (case-insensitive)
            pub fn parse(s: &str) -> Option<Self> {
                let s = s.trim();
                Self::ALL.iter().copied().find(|v| v.as_str().eq_ignore_ascii_case(s))
            }

            /// All labels in form order
            pub fn labels() -> Vec<&'static str> {
                Self::ALL.iter().map(|v| v.as_str()).collect()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(d)?;
                Self::parse(&raw).ok_or_else(|| {
                    serde::de::Error::custom(format!(
                        "unknown {} '{}', expected one of: {}",
                        stringify!($name),
                        raw,
                        Self::labels().join(", ")
                    ))
                })
            }
        }
    };
}

labelled_enum!(Country {
    Nigeria => "Nigeria",
    Kenya => "Kenya",
    Ghana => "Ghana",
    SouthAfrica => "South Africa",
    Other => "Other",
});

labelled_enum!(
    /// Areas a student can ask for help with
    Interest {
        Math => "Math",
        Science => "Science",
        Coding => "Coding",
        UniversityApplications => "University Applications",
        CareerAdvice => "Career Advice",
    }
);

labelled_enum!(EducationLevel {
    PrimarySchool => "Primary School",
    SecondarySchool => "Secondary School",
    University => "University",
    Graduate => "Graduate",
});

labelled_enum!(PreferredComms {
    WhatsApp => "WhatsApp",
    Sms => "SMS",
    Email => "Email",
});

labelled_enum!(
    /// Mentorship request lifecycle, moved forward by admins
    RequestStatus {
        Pending => "Pending",
        Contacted => "Contacted",
        Resolved => "Resolved",
    }
);

labelled_enum!(CareerInterest {
    Engineering => "Engineering",
    Medicine => "Medicine",
    Business => "Business",
    Technology => "Technology",
    Arts => "Arts",
});

// ─────────────────────────────────────────────────────────────────────────────
// Interests (comma-joined in a single column)
// ─────────────────────────────────────────────────────────────────────────────

/// Selected interests, stored as "Math, Coding"
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Interests(Vec<Interest>);

impl Interests {
    /// Keeps first-seen order and drops duplicates
    pub fn new(items: impl IntoIterator<Item = Interest>) -> Self {
        let mut out: Vec<Interest> = Vec::new();
        for item in items {
            if !out.contains(&item) {
                out.push(item);
            }
        }
        Self(out)
    }
}

impl fmt::Display for Interests {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.0.iter().map(|i| i.as_str()).collect();
        f.write_str(&labels.join(", "))
    }
}

impl Serialize for Interests {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Interests {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        let items = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                Interest::parse(s)
                    .ok_or_else(|| serde::de::Error::custom(format!("unknown interest '{}'", s)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(items))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────────────────────────────────────

/// A tutoring/mentorship request
///
/// `education_level` and `preferred_comms` sit at the end and are optional so
/// files written with only the first seven columns still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentorshipRequest {
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub name: String,
    pub country: Country,
    pub interests: Interests,
    pub contact: String,
    pub status: RequestStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub education_level: Option<EducationLevel>,
    #[serde(default)]
    pub preferred_comms: Option<PreferredComms>,
}

impl Record for MentorshipRequest {
    const KIND: &'static str = "mentorship";
    const FILE_NAME: &'static str = "mentorship_requests.csv";
    const COLUMNS: &'static [&'static str] = &[
        "timestamp",
        "name",
        "country",
        "interests",
        "contact",
        "status",
        "notes",
        "education_level",
        "preferred_comms",
    ];

    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

/// A career-guidance inquiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerRequest {
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub name: String,
    pub email: String,
    pub career_interest: CareerInterest,
}

impl Record for CareerRequest {
    const KIND: &'static str = "career";
    const FILE_NAME: &'static str = "career_requests.csv";
    const COLUMNS: &'static [&'static str] = &["timestamp", "name", "email", "career_interest"];

    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(Country::SouthAfrica.as_str(), "South Africa");
        assert_eq!(PreferredComms::parse("sms"), Some(PreferredComms::Sms));
        assert_eq!(RequestStatus::labels(), vec!["Pending", "Contacted", "Resolved"]);
        assert_eq!(CareerInterest::parse("Law"), None);
    }

    #[test]
    fn test_interests_join_and_dedupe() {
        let interests = Interests::new([Interest::Math, Interest::CareerAdvice, Interest::Math]);
        assert_eq!(interests.to_string(), "Math, Career Advice");
        assert_eq!(interests, Interests::new([Interest::Math, Interest::CareerAdvice]));
    }

    #[test]
    fn test_interests_parse_rejects_unknown() {
        let parsed: Result<Interests, _> = serde_json::from_str(r#""Math, Cooking""#);
        assert!(parsed.is_err());

        let parsed: Interests =
            serde_json::from_str(r#""University Applications,Science""#).unwrap();
        assert_eq!(
            parsed,
            Interests::new([Interest::UniversityApplications, Interest::Science])
        );
    }

    #[test]
    fn test_labels_deserialize_loosely() {
        let country: Country = serde_json::from_str(r#"" south africa ""#).unwrap();
        assert_eq!(country, Country::SouthAfrica);
        let level: EducationLevel = serde_json::from_str(r#""secondary school""#).unwrap();
        assert_eq!(level, EducationLevel::SecondarySchool);

        let err = serde_json::from_str::<PreferredComms>(r#""Fax""#).unwrap_err();
        assert!(err.to_string().contains("expected one of: WhatsApp, SMS, Email"));

        // Serialization still writes the canonical label
        assert_eq!(
            serde_json::to_string(&CareerInterest::Technology).unwrap(),
            r#""Technology""#
        );
    }
}
