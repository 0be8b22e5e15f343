//! Navigation requests
//!
//! The session core decides *where* the UI should go after a transition;
//! routing itself belongs to the shell.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Pending routes kept for a shell that is not draining the channel
pub const ROUTE_BUFFER: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// After a successful login
    Profile,
    /// After a successful registration
    Success,
    /// After logout
    Home,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Profile => "/profile",
            Route::Success => "/success",
            Route::Home => "/",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Forwards routes to whoever holds the receiving end (usually the UI shell).
///
/// The channel is bounded; when the shell falls behind, new routes are
/// dropped rather than queued without limit.
#[derive(Clone)]
pub struct ChannelNavigator {
    tx: mpsc::Sender<Route>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::Receiver<Route>) {
        Self::with_capacity(ROUTE_BUFFER)
    }

    pub fn with_capacity(capacity: usize) -> (Self, mpsc::Receiver<Route>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, route: Route) {
        tracing::debug!(route = %route, "Navigation requested");
        match self.tx.try_send(route) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!(route = %route, "Router not draining, navigation dropped");
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!(route = %route, "No router listening, navigation dropped");
            }
        }
    }
}
