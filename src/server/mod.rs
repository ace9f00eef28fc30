// Server module - HTTP surface over the dispatcher
//
// Every route resolves a session (or none), hands the request to `App`, and
// renders the result as JSON. The server runs until the shutdown channel
// fires, then finishes in-flight requests.

pub mod api;
mod error;

pub use error::ApiError;

use crate::app::App;
use anyhow::{Context, Result};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// State handed to every handler
pub type SharedApp = Arc<App>;

/// Build the router
pub fn router(app: SharedApp) -> Router {
    // Authenticated before any extractor runs; unmatched paths still fall
    // through to the plain 404
    let admin = Router::new()
        .route("/api/admin/mentorship", get(api::admin_mentorship))
        .route(
            "/api/admin/mentorship/:index",
            post(api::admin_update_mentorship),
        )
        .route("/api/admin/career", get(api::admin_career))
        .route_layer(middleware::from_fn_with_state(
            app.clone(),
            api::require_admin,
        ));

    Router::new()
        .route("/health", get(api::health))
        .route("/api/options", get(api::options))
        // Tutor sessions
        .route("/api/session", post(api::session_start))
        .route(
            "/api/session/:id",
            get(api::session_get).delete(api::session_end),
        )
        .route("/api/session/:id/home", post(api::session_home))
        .route("/api/session/:id/chat", post(api::session_chat))
        .route("/api/session/:id/language", post(api::session_language))
        .route("/api/session/:id/offline", post(api::session_offline))
        .route("/api/session/:id/voice", post(api::session_voice))
        .route("/api/session/:id/speech", get(api::session_speech))
        // Request forms
        .route("/api/mentorship", post(api::submit_mentorship))
        .route("/api/career", post(api::submit_career))
        .merge(admin)
        .with_state(app)
}

/// Sweep idle sessions every `every` until the task is aborted
pub fn spawn_session_sweeper(app: SharedApp, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            app.evict_idle_sessions();
        }
    })
}

/// Start the HTTP server
pub async fn start_server(
    bind_addr: SocketAddr,
    app: SharedApp,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> Result<()> {
    let router = router(app);

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;

    tracing::info!("Server listening on {}", bind_addr);

    // Stop accepting on shutdown, let in-flight turns finish
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_rx.await.ok();
        })
        .await
        .context("Server error")?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::api::testing::shared_app;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    const PASSWORD_HEADER: &str = "x-admin-password";

    async fn send(app: &SharedApp, request: Request<Body>) -> (StatusCode, axum::body::Bytes) {
        let response = router(app.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body)
    }

    fn update(index: &str, password: &str, body: &str) -> Request<Body> {
        Request::post(format!("/api/admin/mentorship/{}", index))
            .header(PASSWORD_HEADER, password)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_rejected_admin_requests_look_like_unknown_routes() {
        let dir = tempfile::tempdir().unwrap();
        let app = shared_app(dir.path(), "");

        let unknown = send(
            &app,
            Request::get("/api/admin/nowhere").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(unknown.0, StatusCode::NOT_FOUND);

        let valid_body = r#"{"status":"Resolved","notes":"done"}"#;
        let rejected = [
            update("0", "wrong", "not json"),
            update("0", "wrong", r#"{"status":"Archived"}"#),
            update("abc", "wrong", valid_body),
            update("0", "wrong", valid_body),
            Request::get("/api/admin/mentorship?status=Bogus")
                .header(PASSWORD_HEADER, "wrong")
                .body(Body::empty())
                .unwrap(),
            Request::get("/api/admin/career").body(Body::empty()).unwrap(),
        ];

        for request in rejected {
            let uri = request.uri().clone();
            assert_eq!(send(&app, request).await, unknown, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_authenticated_admin_requests_reach_handlers() {
        let dir = tempfile::tempdir().unwrap();
        let app = shared_app(dir.path(), "");

        let (status, _) = send(&app, update("0", "pass", r#"{"status":"Archived"}"#)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, body) = send(&app, update("0", "pass", r#"{"status":"Resolved"}"#)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(!body.is_empty());

        let (status, _) = send(
            &app,
            Request::get("/api/admin/mentorship?status=Bogus")
                .header(PASSWORD_HEADER, "pass")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            Request::get("/api/admin/career")
                .header(PASSWORD_HEADER, "pass")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["total"], 0);
    }

    #[tokio::test]
    async fn test_sweeper_runs_until_aborted() {
        let dir = tempfile::tempdir().unwrap();
        let app = shared_app(dir.path(), "");

        let sweeper = spawn_session_sweeper(app, Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!sweeper.is_finished());

        sweeper.abort();
        assert!(sweeper.await.unwrap_err().is_cancelled());
    }
}
