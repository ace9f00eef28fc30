// Tutor session endpoints
//
// Each handler locks the session for the whole interaction, so a chat turn
// blocks other requests for the same session until the backend answers.

use crate::app::{Command, Outcome};
use crate::server::{ApiError, SharedApp};
use crate::session::{Language, SessionId, SessionSnapshot, SharedSession};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Message shown when speech synthesis fails
const SPEECH_ERROR_PREFIX: &str = "⚠️ Error generating audio:";

/// Response for POST /api/session
#[derive(Debug, Serialize)]
pub struct SessionStarted {
    pub session_id: String,
    pub snapshot: SessionSnapshot,
}

/// Response for every session command
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub snapshot: SessionSnapshot,
    /// Language changed; redraw everything
    pub rerender: bool,
    /// Backend failure during the turn (also rendered into the transcript)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Outcome> for CommandResponse {
    fn from(outcome: Outcome) -> Self {
        Self {
            snapshot: outcome.snapshot,
            rerender: outcome.rerender,
            error: outcome.failure.map(|e| e.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct LanguageBody {
    pub language: String,
}

#[derive(Debug, Deserialize)]
pub struct OfflineBody {
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct VoiceBody {
    pub voice: String,
}

fn find_session(app: &SharedApp, id: &str) -> Result<SharedSession, ApiError> {
    let mut sessions = app
        .sessions
        .lock()
        .map_err(|e| ApiError::Internal(format!("Failed to lock sessions: {}", e)))?;
    sessions
        .get(&SessionId::new(id))
        .ok_or_else(|| ApiError::NotFound(format!("Unknown session: {}", id)))
}

async fn run(app: &SharedApp, id: &str, command: Command) -> Result<Json<CommandResponse>, ApiError> {
    let session = find_session(app, id)?;
    let mut state = session.lock().await;
    let outcome = app.dispatch(&mut state, command).await?;
    Ok(Json(outcome.into()))
}

/// POST /api/session - start a session and show the home greeting
pub async fn session_start(
    State(app): State<SharedApp>,
) -> Result<(StatusCode, Json<SessionStarted>), ApiError> {
    let (id, session) = {
        let mut sessions = app
            .sessions
            .lock()
            .map_err(|e| ApiError::Internal(format!("Failed to lock sessions: {}", e)))?;
        sessions.start()
    };

    let mut state = session.lock().await;
    let outcome = app.dispatch(&mut state, Command::EnterHome).await?;

    tracing::info!(session_id = %id, "Session started");
    Ok((
        StatusCode::CREATED,
        Json(SessionStarted {
            session_id: id.to_string(),
            snapshot: outcome.snapshot,
        }),
    ))
}

/// GET /api/session/:id
pub async fn session_get(
    State(app): State<SharedApp>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = find_session(&app, &id)?;
    let state = session.lock().await;
    Ok(Json(state.snapshot()))
}

/// DELETE /api/session/:id
pub async fn session_end(
    State(app): State<SharedApp>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let removed = app
        .sessions
        .lock()
        .map_err(|e| ApiError::Internal(format!("Failed to lock sessions: {}", e)))?
        .end(&SessionId::new(id.as_str()));

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Unknown session: {}", id)))
    }
}

/// POST /api/session/:id/home
pub async fn session_home(
    State(app): State<SharedApp>,
    Path(id): Path<String>,
) -> Result<Json<CommandResponse>, ApiError> {
    run(&app, &id, Command::EnterHome).await
}

/// POST /api/session/:id/chat - one tutor turn
pub async fn session_chat(
    State(app): State<SharedApp>,
    Path(id): Path<String>,
    Json(body): Json<ChatBody>,
) -> Result<Json<CommandResponse>, ApiError> {
    run(&app, &id, Command::SubmitChat { text: body.text }).await
}

/// POST /api/session/:id/language
pub async fn session_language(
    State(app): State<SharedApp>,
    Path(id): Path<String>,
    Json(body): Json<LanguageBody>,
) -> Result<Json<CommandResponse>, ApiError> {
    let language = Language::parse(&body.language)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown language: {}", body.language)))?;
    run(&app, &id, Command::ChangeLanguage(language)).await
}

/// POST /api/session/:id/offline
pub async fn session_offline(
    State(app): State<SharedApp>,
    Path(id): Path<String>,
    Json(body): Json<OfflineBody>,
) -> Result<Json<CommandResponse>, ApiError> {
    run(&app, &id, Command::SetOfflineMode(body.enabled)).await
}

/// POST /api/session/:id/voice
pub async fn session_voice(
    State(app): State<SharedApp>,
    Path(id): Path<String>,
    Json(body): Json<VoiceBody>,
) -> Result<Json<CommandResponse>, ApiError> {
    run(&app, &id, Command::SelectVoice(body.voice)).await
}

/// GET /api/session/:id/speech - audio for the latest assistant message
///
/// 204 when there is nothing to speak.
pub async fn session_speech(
    State(app): State<SharedApp>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let session = find_session(&app, &id)?;
    let state = session.lock().await;

    match app.speak(&state).await {
        Ok(Some(audio)) => Ok(([(header::CONTENT_TYPE, "audio/mpeg")], audio).into_response()),
        Ok(None) => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(e) => Err(ApiError::BadGateway(format!("{} {}", SPEECH_ERROR_PREFIX, e))),
    }
}
