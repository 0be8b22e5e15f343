//! Portico Session Management
//!
//! Owns the client-side login session:
//! - A session is either anonymous or authenticated with a cached user record
//! - The bearer token is the only durable piece; everything else is re-derived
//!   on start by asking the backend who the token belongs to
//! - Consumers observe a tri-state (loading / anonymous / authenticated) so
//!   nothing acts on a session that has not been restored yet

mod api;
mod error;
mod manager;
mod navigator;
mod state;
mod store;
mod transport;

#[cfg(test)]
mod testing;

pub use api::{
    AuthApi, Authentication, Credentials, Registration, RegistrationForm, Verification,
};
pub use error::{AuthError, TransportError};
pub use manager::SessionManager;
pub use navigator::{ChannelNavigator, Navigator, Route, ROUTE_BUFFER};
pub use state::{SessionState, UserRecord};
pub use store::{DatabaseTokenStore, MemoryTokenStore, TokenStore, DEFAULT_TOKEN_KEY};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, ReqwestTransport};

pub type Result<T> = std::result::Result<T, AuthError>;
