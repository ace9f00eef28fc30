// Mentorship and career form endpoints

use crate::forms::{CareerForm, MentorshipForm};
use crate::server::{ApiError, SharedApp};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

const MENTORSHIP_SUBMITTED: &str = "Request submitted! Mentor will contact you within 48hrs.";
const CAREER_SUBMITTED: &str = "Thank you! A mentor will contact you soon.";

/// Response for a stored form
#[derive(Debug, Serialize)]
pub struct Submitted {
    /// Row id of the new request
    pub id: usize,
    pub message: &'static str,
}

/// POST /api/mentorship
pub async fn submit_mentorship(
    State(app): State<SharedApp>,
    Json(form): Json<MentorshipForm>,
) -> Result<(StatusCode, Json<Submitted>), ApiError> {
    let id = app.submit_mentorship(form).await?;
    Ok((
        StatusCode::CREATED,
        Json(Submitted {
            id,
            message: MENTORSHIP_SUBMITTED,
        }),
    ))
}

/// POST /api/career
pub async fn submit_career(
    State(app): State<SharedApp>,
    Json(form): Json<CareerForm>,
) -> Result<(StatusCode, Json<Submitted>), ApiError> {
    let id = app.submit_career(form).await?;
    Ok((
        StatusCode::CREATED,
        Json(Submitted {
            id,
            message: CAREER_SUBMITTED,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::mentorship_form;
    use crate::server::api::testing::shared_app;
    use crate::store::{CareerInterest, Interest};

    #[tokio::test]
    async fn test_submit_mentorship() {
        let dir = tempfile::tempdir().unwrap();
        let app = shared_app(dir.path(), "");

        let (status, Json(first)) =
            submit_mentorship(State(app.clone()), Json(mentorship_form(vec![Interest::Math])))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(first.id, 0);

        let (_, Json(second)) = submit_mentorship(
            State(app.clone()),
            Json(mentorship_form(vec![Interest::Coding])),
        )
        .await
        .unwrap();
        assert_eq!(second.id, 1);
    }

    #[tokio::test]
    async fn test_store_failure_is_internal_error() {
        use crate::app::tests::test_app_split;
        use crate::tutor::testing::MockChat;
        use axum::response::IntoResponse;
        use std::sync::Arc;

        let dir = tempfile::tempdir().unwrap();
        let blocked = dir.path().join("blocked");
        std::fs::write(&blocked, b"").unwrap();
        let app: SharedApp = Arc::new(test_app_split(
            &blocked,
            dir.path(),
            Arc::new(MockChat::ok("")),
        ));

        let err = submit_mentorship(State(app.clone()), Json(mentorship_form(vec![Interest::Math])))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"]
            .as_str()
            .unwrap()
            .contains("mentorship_requests.csv"));

        let (status, Json(stored)) = submit_career(
            State(app),
            Json(CareerForm {
                name: "Ade".to_string(),
                email: "ade@example.com".to_string(),
                career_interest: CareerInterest::Medicine,
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(stored.id, 0);
    }

    #[tokio::test]
    async fn test_invalid_form_is_unprocessable() {
        let dir = tempfile::tempdir().unwrap();
        let app = shared_app(dir.path(), "");

        let err = submit_mentorship(State(app.clone()), Json(mentorship_form(vec![])))
            .await
            .unwrap_err();
        match err {
            ApiError::Unprocessable(msg) => assert_eq!(msg, "Please fill required fields (*)"),
            other => panic!("expected Unprocessable, got {:?}", other),
        }
        assert!(app.mentorship.load_all().unwrap().is_empty());

        let err = submit_career(
            State(app),
            Json(CareerForm {
                name: String::new(),
                email: "x@example.com".to_string(),
                career_interest: CareerInterest::Arts,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Unprocessable(_)));
    }
}
