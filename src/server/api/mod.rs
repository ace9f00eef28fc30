// HTTP API handlers
//
// All endpoints speak JSON except the speech route, which returns audio.

mod admin;
mod requests;
mod session;

use crate::session::Language;
use crate::store::{
    CareerInterest, Country, EducationLevel, Interest, PreferredComms, RequestStatus,
};
use axum::Json;
use serde::Serialize;

pub use admin::{admin_career, admin_mentorship, admin_update_mentorship, require_admin};
pub use requests::{submit_career, submit_mentorship};
pub use session::{
    session_chat, session_end, session_get, session_home, session_language, session_offline,
    session_speech, session_start, session_voice,
};

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize)]
pub struct LanguageOption {
    pub name: &'static str,
    pub code: &'static str,
    pub voices: &'static [&'static str],
}

/// Everything a client needs to render the forms and language picker
#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    pub languages: Vec<LanguageOption>,
    pub countries: Vec<&'static str>,
    pub interests: Vec<&'static str>,
    pub education_levels: Vec<&'static str>,
    pub preferred_comms: Vec<&'static str>,
    pub career_interests: Vec<&'static str>,
    pub statuses: Vec<&'static str>,
}

/// GET /api/options
pub async fn options() -> Json<OptionsResponse> {
    Json(OptionsResponse {
        languages: Language::ALL
            .iter()
            .map(|l| LanguageOption {
                name: l.as_str(),
                code: l.code(),
                voices: l.voices(),
            })
            .collect(),
        countries: Country::labels(),
        interests: Interest::labels(),
        education_levels: EducationLevel::labels(),
        preferred_comms: PreferredComms::labels(),
        career_interests: CareerInterest::labels(),
        statuses: RequestStatus::labels(),
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::app::tests::test_app;
    use crate::server::SharedApp;
    use crate::tutor::testing::MockChat;
    use std::sync::Arc;

    /// App over a temp dir with a chat mock that always answers `reply`
    pub fn shared_app(dir: &std::path::Path, reply: &str) -> SharedApp {
        Arc::new(test_app(dir, Arc::new(MockChat::ok(reply))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_options_lists_labels() {
        let Json(options) = options().await;
        assert_eq!(options.languages.len(), 3);
        assert_eq!(options.languages[1].name, "French");
        assert_eq!(options.languages[1].voices, &["Georges", "Alice"]);
        assert!(options.countries.contains(&"South Africa"));
        assert_eq!(options.statuses, vec!["Pending", "Contacted", "Resolved"]);
    }

    #[tokio::test]
    async fn test_health() {
        assert_eq!(health().await, "ok");
    }
}
