// App module - command dispatcher
//
// Every user interaction is one command applied to one session's state,
// producing a fresh snapshot. Form submissions and admin actions don't touch
// session state and have their own entry points.
//
//   EnterHome        -> seed greeting if the transcript is empty
//   SubmitChat       -> one tutor turn
//   ChangeLanguage   -> reset transcript to the new greeting (re-render)
//   SetOfflineMode   -> flag flip
//   SelectVoice      -> pick from the current language's voices

use crate::admin::{self, AdminGate, CareerDashboard, MentorshipDashboard};
use crate::config::Config;
use crate::forms::{self, CareerForm, FormError, MentorshipForm};
use crate::session::{
    Language, LanguageChange, SessionManager, SessionSnapshot, SessionState, UnknownVoice,
};
use crate::store::{
    self, CareerRequest, MentorshipRequest, RecordStore, RequestStatus, StoreError,
};
use crate::tutor::{BackendError, Tutor};
use bytes::Bytes;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A session-scoped interaction
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    EnterHome,
    SubmitChat { text: String },
    ChangeLanguage(Language),
    SetOfflineMode(bool),
    SelectVoice(String),
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::EnterHome => "enter_home",
            Self::SubmitChat { .. } => "submit_chat",
            Self::ChangeLanguage(_) => "change_language",
            Self::SetOfflineMode(_) => "set_offline_mode",
            Self::SelectVoice(_) => "select_voice",
        }
    }
}

/// What a command produced
#[derive(Debug, Clone)]
pub struct Outcome {
    pub snapshot: SessionSnapshot,
    /// The whole view must be redrawn (language changed)
    pub rerender: bool,
    /// Backend failure during a chat turn, already rendered into the transcript
    pub failure: Option<BackendError>,
}

/// Commands that can be rejected outright
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    UnknownVoice(UnknownVoice),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownVoice(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CommandError {}

/// Why a form submission wasn't stored
#[derive(Debug)]
pub enum SubmitError {
    /// Validation failed, nothing written
    Invalid(FormError),
    /// Store write failed
    Store(StoreError),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(e) => write!(f, "{}", e),
            Self::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SubmitError {}

impl From<FormError> for SubmitError {
    fn from(e: FormError) -> Self {
        Self::Invalid(e)
    }
}

impl From<StoreError> for SubmitError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

/// Application core shared by every HTTP handler
///
/// Store access runs on tokio's blocking pool, so the stores are shared
/// with those tasks through `Arc`.
pub struct App {
    pub tutor: Tutor,
    pub mentorship: Arc<RecordStore<MentorshipRequest>>,
    pub career: Arc<RecordStore<CareerRequest>>,
    pub admin: AdminGate,
    pub sessions: Mutex<SessionManager>,
    /// `None` keeps sessions until they are ended explicitly
    session_idle_timeout: Option<Duration>,
}

impl App {
    pub fn new(
        tutor: Tutor,
        mentorship: RecordStore<MentorshipRequest>,
        career: RecordStore<CareerRequest>,
        admin: AdminGate,
    ) -> Self {
        Self {
            tutor,
            mentorship: Arc::new(mentorship),
            career: Arc::new(career),
            admin,
            sessions: Mutex::new(SessionManager::new()),
            session_idle_timeout: None,
        }
    }

    pub fn with_session_idle_timeout(mut self, idle_timeout: Option<Duration>) -> Self {
        self.session_idle_timeout = idle_timeout;
        self
    }

    /// Build backends, stores and the admin gate from config
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Tutor::from_config(config),
            RecordStore::in_dir(&config.data_dir),
            RecordStore::in_dir(&config.data_dir),
            AdminGate::new(config.admin_pass.clone()),
        )
        .with_session_idle_timeout(config.sessions.idle_timeout())
    }

    /// Drop sessions idle past the configured timeout
    pub fn evict_idle_sessions(&self) -> usize {
        let Some(idle_timeout) = self.session_idle_timeout else {
            return 0;
        };

        match self.sessions.lock() {
            Ok(mut sessions) => {
                if sessions.is_empty() {
                    return 0;
                }
                let evicted = sessions.evict_idle(idle_timeout);
                if evicted > 0 {
                    tracing::info!(evicted, active = sessions.len(), "Idle sessions expired");
                }
                evicted
            }
            Err(e) => {
                tracing::error!("Failed to lock sessions: {}", e);
                0
            }
        }
    }

    /// Apply one command to a session
    pub async fn dispatch(
        &self,
        state: &mut SessionState,
        command: Command,
    ) -> Result<Outcome, CommandError> {
        tracing::debug!(command = command.name(), "Dispatching command");

        let mut rerender = false;
        let mut failure = None;

        match command {
            Command::EnterHome => state.enter_home(),
            Command::SubmitChat { text } => {
                // Blank input is ignored, same as an empty chat box
                if !text.trim().is_empty() {
                    state.enter_home();
                    let outcome = self.tutor.respond(state, &text).await;
                    tracing::debug!(reply_chars = outcome.reply.chars().count(), "Tutor replied");
                    failure = outcome.failure;
                }
            }
            Command::ChangeLanguage(language) => {
                if state.set_language(language) == LanguageChange::Rerender {
                    tracing::info!(language = %language, "Language changed, transcript reset");
                    rerender = true;
                }
            }
            Command::SetOfflineMode(offline) => state.set_offline_mode(offline),
            Command::SelectVoice(voice) => {
                state
                    .select_voice(&voice)
                    .map_err(CommandError::UnknownVoice)?;
            }
        }

        Ok(Outcome {
            snapshot: state.snapshot(),
            rerender,
            failure,
        })
    }

    /// Synthesize the latest assistant message. Independent of chat turns.
    pub async fn speak(&self, state: &SessionState) -> Result<Option<Bytes>, BackendError> {
        self.tutor.speak_latest(state).await
    }

    /// Validate and store a mentorship request. Returns its row id.
    pub async fn submit_mentorship(&self, form: MentorshipForm) -> Result<usize, SubmitError> {
        let request = form.into_request(forms::now())?;
        let mentorship = self.mentorship.clone();
        let index = store::blocking(move || mentorship.append(request)).await?;
        tracing::info!(id = index, "Mentorship request submitted");
        Ok(index)
    }

    /// Validate and store a career request. Returns its row id.
    pub async fn submit_career(&self, form: CareerForm) -> Result<usize, SubmitError> {
        let request = form.into_request(forms::now())?;
        let career = self.career.clone();
        let index = store::blocking(move || career.append(request)).await?;
        tracing::info!(id = index, "Career request submitted");
        Ok(index)
    }

    /// Mentorship dashboard, or `None` if the secret is wrong
    pub async fn mentorship_dashboard(
        &self,
        secret: &str,
        filter: Option<Vec<RequestStatus>>,
    ) -> Result<Option<MentorshipDashboard>, StoreError> {
        if !self.admin.authenticate(secret) {
            return Ok(None);
        }
        let filter = filter.unwrap_or_else(admin::default_status_filter);
        let mentorship = self.mentorship.clone();
        store::blocking(move || admin::mentorship_dashboard(&mentorship, &filter))
            .await
            .map(Some)
    }

    /// Update status and notes by row id, or `None` if the secret is wrong
    pub async fn update_mentorship(
        &self,
        secret: &str,
        index: usize,
        status: RequestStatus,
        notes: &str,
    ) -> Result<Option<MentorshipRequest>, StoreError> {
        if !self.admin.authenticate(secret) {
            return Ok(None);
        }
        let mentorship = self.mentorship.clone();
        let notes = notes.to_string();
        store::blocking(move || mentorship.update_by_index(index, status, &notes))
            .await
            .map(Some)
    }

    /// Career dashboard, or `None` if the secret is wrong
    pub async fn career_dashboard(
        &self,
        secret: &str,
    ) -> Result<Option<CareerDashboard>, StoreError> {
        if !self.admin.authenticate(secret) {
            return Ok(None);
        }
        let career = self.career.clone();
        store::blocking(move || admin::career_dashboard(&career))
            .await
            .map(Some)
    }
}
