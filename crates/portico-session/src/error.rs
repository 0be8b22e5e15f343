//! Session error types
//!
//! `AuthError` is what consumers see. Its `Display` output is the message
//! shown to the user, so variants carry no internal detail in their text.

use thiserror::Error;

pub const LOGIN_FAILED: &str = "Login failed";
pub const REGISTRATION_FAILED: &str = "Registration failed";

#[derive(Error, Debug)]
pub enum AuthError {
    /// The backend refused the request (bad credentials, duplicate user, ...)
    #[error("{0}")]
    Rejected(String),

    /// Credentials were accepted but the profile behind the new token could
    /// not be loaded
    #[error("Could not load user profile")]
    ProfileUnavailable,

    #[error("Network error. Please try again.")]
    Network(#[source] TransportError),

    #[error("Could not save session")]
    Storage(#[source] portico_storage::StorageError),
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Response is missing `{0}`")]
    MissingField(&'static str),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}
