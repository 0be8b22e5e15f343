//! Portico Core
//!
//! Application root for the client session. Builds the storage, transport
//! and session manager once at startup and hands the UI a single [`App`]
//! to read session state from and send auth commands through.

mod app;
pub mod commands;
mod config;
mod error;

pub use app::App;
pub use config::Config;
pub use error::CoreError;

// Re-export session components
pub use portico_session::{
    AuthError, ChannelNavigator, Navigator, RegistrationForm, Route, SessionManager,
    SessionState, UserRecord,
};
pub use portico_storage::{Database, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
