// Admin endpoints
//
// The secret travels in the `x-admin-password` header. A missing or wrong
// secret answers exactly like an unknown route. `require_admin` runs as a
// route layer ahead of the handlers, so a rejected request never reaches the
// path, query or body extractors and can't learn anything from their errors.

use crate::admin::{CareerDashboard, MentorshipDashboard};
use crate::server::{ApiError, SharedApp};
use crate::store::{MentorshipRequest, RequestStatus, StoreError};
use axum::{
    extract::{Path, Query, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

const ADMIN_HEADER: &str = "x-admin-password";

fn secret(headers: &HeaderMap) -> &str {
    headers
        .get(ADMIN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// Route layer: hide every admin route from callers without the secret
pub async fn require_admin(
    State(app): State<SharedApp>,
    request: Request,
    next: Next,
) -> Response {
    if !app.admin.authenticate(secret(request.headers())) {
        return ApiError::Hidden.into_response();
    }
    next.run(request).await
}

/// Query for GET /api/admin/mentorship
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    /// Comma-separated statuses, e.g. "Pending,Contacted". Defaults to Pending.
    pub status: Option<String>,
}

fn parse_statuses(raw: &str) -> Result<Vec<RequestStatus>, ApiError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            RequestStatus::parse(s)
                .ok_or_else(|| ApiError::BadRequest(format!("Unknown status: {}", s)))
        })
        .collect()
}

/// Body for POST /api/admin/mentorship/:index
#[derive(Debug, Deserialize)]
pub struct UpdateBody {
    pub status: RequestStatus,
    #[serde(default)]
    pub notes: String,
}

/// GET /api/admin/mentorship
pub async fn admin_mentorship(
    State(app): State<SharedApp>,
    headers: HeaderMap,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<MentorshipDashboard>, ApiError> {
    let filter = query.status.as_deref().map(parse_statuses).transpose()?;
    app.mentorship_dashboard(secret(&headers), filter)
        .await?
        .map(Json)
        .ok_or(ApiError::Hidden)
}

/// POST /api/admin/mentorship/:index
pub async fn admin_update_mentorship(
    State(app): State<SharedApp>,
    headers: HeaderMap,
    Path(index): Path<usize>,
    Json(body): Json<UpdateBody>,
) -> Result<Json<MentorshipRequest>, ApiError> {
    let updated = app
        .update_mentorship(secret(&headers), index, body.status, &body.notes)
        .await
        .map_err(|e| match e {
            StoreError::IndexOutOfRange { .. } => ApiError::NotFound(e.to_string()),
            other => other.into(),
        })?
        .ok_or(ApiError::Hidden)?;
    Ok(Json(updated))
}

/// GET /api/admin/career
pub async fn admin_career(
    State(app): State<SharedApp>,
    headers: HeaderMap,
) -> Result<Json<CareerDashboard>, ApiError> {
    app.career_dashboard(secret(&headers))
        .await?
        .map(Json)
        .ok_or(ApiError::Hidden)
}
