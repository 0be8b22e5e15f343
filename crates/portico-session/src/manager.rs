//! Session Manager
//!
//! Owns the token slot and the in-memory session state and keeps them in
//! step. Every transition runs under one async lock, so a slot write and
//! the state it implies are always published together.

use parking_lot::RwLock;
use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use crate::api::{
    AuthApi, Authentication, Credentials, Registration, RegistrationForm, Verification,
};
use crate::error::AuthError;
use crate::navigator::{Navigator, Route};
use crate::state::{SessionState, UserRecord};
use crate::store::TokenStore;
use crate::transport::HttpTransport;
use crate::Result;

pub struct SessionManager<T> {
    api: Arc<AuthApi<T>>,
    /// Durable token slot
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    /// Published session state; starts as `Loading`
    state: Arc<watch::Sender<SessionState>>,
    /// Token behind the published state, updated in the same step
    token: Arc<RwLock<Option<String>>>,
    /// Serializes restore/login/logout
    transition: Arc<Mutex<()>>,
}

impl<T: HttpTransport> SessionManager<T> {
    pub fn new(transport: T, store: Arc<dyn TokenStore>, navigator: Arc<dyn Navigator>) -> Self {
        let (state, _) = watch::channel(SessionState::Loading);

        Self {
            api: Arc::new(AuthApi::new(transport)),
            store,
            navigator,
            state: Arc::new(state),
            token: Arc::new(RwLock::new(None)),
            transition: Arc::new(Mutex::new(())),
        }
    }

    /// Re-derive the session from the stored token. Called once at start.
    ///
    /// Never navigates. A transport failure leaves the stored token in
    /// place so the next start retries verification. A rejected token that
    /// cannot be cleared stays too; it is rejected again on the next start.
    pub async fn restore(&self) -> SessionState {
        let _guard = self.transition.lock().await;

        let token = match self.store.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read stored token");
                None
            }
        };

        let Some(token) = token else {
            tracing::info!("No stored session");
            return self.publish(SessionState::Anonymous, None);
        };

        match self.api.verify(&token).await {
            Ok(Verification::Valid(user)) => {
                tracing::info!("Restored session");
                self.publish(SessionState::Authenticated(user), Some(token))
            }
            Ok(Verification::Invalid { status }) => {
                tracing::warn!(status, "Stored token rejected, clearing session");
                if let Err(e) = self.store.clear() {
                    tracing::error!(error = %e, "Failed to clear rejected token");
                }
                self.publish(SessionState::Anonymous, None)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not verify stored token");
                self.publish(SessionState::Anonymous, None)
            }
        }
    }

    /// Exchange credentials for a token, then load the profile behind it.
    ///
    /// On success the session is authenticated and the UI is sent to the
    /// profile page. Rejections and network failures leave the state as it
    /// was; a failed profile load after a good login drops the new token.
    /// If the token cannot be dropped the error is `Storage`, since the
    /// next start would otherwise restore a session the user was told failed.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let _guard = self.transition.lock().await;
        let credentials = Credentials::new(username, password);

        let token = match self.api.authenticate(&credentials).await {
            Ok(Authentication::Token(token)) => token,
            Ok(Authentication::Rejected(message)) => {
                tracing::info!(username = %username, "Login rejected");
                return Err(AuthError::Rejected(message));
            }
            Err(e) => {
                tracing::warn!(username = %username, error = %e, "Login request failed");
                return Err(AuthError::Network(e));
            }
        };

        if let Err(e) = self.store.store(&token) {
            tracing::error!(error = %e, "Failed to persist token");
            return Err(AuthError::Storage(e));
        }

        let user = match self.api.verify(&token).await {
            Ok(Verification::Valid(user)) => user,
            Ok(Verification::Invalid { status }) => {
                tracing::warn!(status, "Fresh token rejected by profile endpoint");
                return Err(self.abandon_login());
            }
            Err(e) => {
                tracing::warn!(error = %e, "Profile fetch failed after login");
                return Err(self.abandon_login());
            }
        };

        self.publish(SessionState::Authenticated(user), Some(token));
        tracing::info!(username = %username, "Logged in");
        self.navigator.navigate(Route::Profile);

        Ok(())
    }

    /// End the session. Always succeeds and always navigates home.
    pub async fn logout(&self) {
        let _guard = self.transition.lock().await;

        if let Err(e) = self.store.clear() {
            tracing::error!(error = %e, "Failed to clear stored token");
        }
        self.publish(SessionState::Anonymous, None);
        tracing::info!("Logged out");
        self.navigator.navigate(Route::Home);
    }

    /// Create an account. Does not log in and never touches the session.
    pub async fn register(&self, form: &RegistrationForm) -> Result<()> {
        match self.api.register(form).await {
            Ok(Registration::Created) => {
                tracing::info!(username = %form.username, "Registered account");
                self.navigator.navigate(Route::Success);
                Ok(())
            }
            Ok(Registration::Rejected(message)) => {
                tracing::info!(username = %form.username, "Registration rejected");
                Err(AuthError::Rejected(message))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Registration request failed");
                Err(AuthError::Network(e))
            }
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver that wakes on every published transition
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn current_user(&self) -> Option<UserRecord> {
        self.state.borrow().user().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    /// Bearer token of the published session; `None` unless authenticated.
    /// Mid-transition this still matches `state()`, not the slot.
    pub fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn abandon_login(&self) -> AuthError {
        let cleared = self.store.clear();
        self.publish(SessionState::Anonymous, None);

        match cleared {
            Ok(()) => AuthError::ProfileUnavailable,
            Err(e) => {
                tracing::error!(error = %e, "Failed to drop token of abandoned login");
                AuthError::Storage(e)
            }
        }
    }

    fn publish(&self, state: SessionState, token: Option<String>) -> SessionState {
        tracing::debug!(state = %state, "Session state changed");
        *self.token.write() = token;
        self.state.send_replace(state.clone());
        state
    }
}

impl<T> Clone for SessionManager<T> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            store: Arc::clone(&self.store),
            navigator: Arc::clone(&self.navigator),
            state: Arc::clone(&self.state),
            token: Arc::clone(&self.token),
            transition: Arc::clone(&self.transition),
        }
    }
}
