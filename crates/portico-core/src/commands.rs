//! UI-facing commands
//!
//! Thin wrappers that turn session operations into the result envelope the
//! frontend consumes. Errors arrive as the user-facing message.

use serde::{Deserialize, Serialize};

use portico_session::{RegistrationForm, SessionState};

use crate::app::App;

#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// `loading`, `anonymous` or `authenticated`
    pub status: String,
    pub user: Option<serde_json::Value>,
}

impl From<SessionState> for SessionInfo {
    fn from(state: SessionState) -> Self {
        let status = state.as_str().to_string();
        let user = match state {
            SessionState::Authenticated(user) => Some(user.into_value()),
            _ => None,
        };
        Self { status, user }
    }
}

pub fn get_session(app: &App) -> CommandResult<SessionInfo> {
    CommandResult::ok(app.session_state().into())
}

pub async fn login(app: &App, username: String, password: String) -> CommandResult<SessionInfo> {
    match app.session_manager().login(&username, &password).await {
        Ok(()) => CommandResult::ok(app.session_state().into()),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

pub async fn logout(app: &App) -> CommandResult<()> {
    app.session_manager().logout().await;
    CommandResult::ok(())
}

pub async fn register(app: &App, form: RegistrationForm) -> CommandResult<()> {
    match app.session_manager().register(&form).await {
        Ok(()) => CommandResult::ok(()),
        Err(e) => CommandResult::err(e.to_string()),
    }
}
