//! Backend identity API
//!
//! Translates the three backend calls into typed outcomes. HTTP status
//! interpretation and error-message decoding live here; what those outcomes
//! mean for the session is decided by the manager.

use serde::{Deserialize, Serialize};

use crate::error::{TransportError, LOGIN_FAILED, REGISTRATION_FAILED};
use crate::state::UserRecord;
use crate::transport::{ApiRequest, ApiResponse, HttpTransport};

const VERIFY_PATH: &str = "/user/me";
const LOGIN_PATH: &str = "/login";
const REGISTER_PATH: &str = "/register";

const STATUS_CREATED: u16 = 201;

#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Account creation payload. Forwarded to the backend as-is.
#[derive(Clone, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub password: String,
}

impl std::fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("username", &self.username)
            .field("firstname", &self.firstname)
            .field("lastname", &self.lastname)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    Valid(UserRecord),
    /// Backend answered with a non-2xx status; the token is no good
    Invalid { status: u16 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Authentication {
    Token(String),
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Registration {
    Created,
    Rejected(String),
}

#[derive(Deserialize)]
struct MeResponse {
    #[serde(default)]
    user: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

pub struct AuthApi<T> {
    transport: T,
}

impl<T: HttpTransport> AuthApi<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// `GET /user/me` with the token as bearer credential
    pub async fn verify(&self, token: &str) -> Result<Verification, TransportError> {
        let response = self
            .transport
            .send(ApiRequest::get(VERIFY_PATH).with_bearer(token))
            .await?;

        if !response.is_success() {
            return Ok(Verification::Invalid {
                status: response.status,
            });
        }

        let body: MeResponse = response.parse()?;
        body.user
            .filter(|user| !user.is_null())
            .map(|user| Verification::Valid(UserRecord::new(user)))
            .ok_or(TransportError::MissingField("user"))
    }

    /// `POST /login`
    pub async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<Authentication, TransportError> {
        let body = serde_json::to_value(credentials)?;
        let response = self
            .transport
            .send(ApiRequest::post(LOGIN_PATH, body))
            .await?;

        if !response.is_success() {
            return Ok(Authentication::Rejected(error_message(
                &response,
                LOGIN_FAILED,
            )));
        }

        let body: LoginResponse = response.parse()?;
        body.token
            .filter(|token| !token.is_empty())
            .map(Authentication::Token)
            .ok_or(TransportError::MissingField("token"))
    }

    /// `POST /register`. Only `201 Created` counts as success.
    pub async fn register(
        &self,
        form: &RegistrationForm,
    ) -> Result<Registration, TransportError> {
        let body = serde_json::to_value(form)?;
        let response = self
            .transport
            .send(ApiRequest::post(REGISTER_PATH, body))
            .await?;

        if response.status == STATUS_CREATED {
            Ok(Registration::Created)
        } else {
            Ok(Registration::Rejected(error_message(
                &response,
                REGISTRATION_FAILED,
            )))
        }
    }
}

/// Read `message` from a JSON error body, falling back to `default` when the
/// body is not JSON or its message is absent, empty or whitespace-only.
pub(crate) fn error_message(response: &ApiResponse, default: &str) -> String {
    response
        .parse::<ErrorBody>()
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use crate::transport::Method;
    use serde_json::json;

    #[test]
    fn test_error_message_fallbacks() {
        let with_message = ApiResponse::json(400, json!({ "message": "bad credentials" }));
        assert_eq!(error_message(&with_message, LOGIN_FAILED), "bad credentials");

        let without_message = ApiResponse::json(400, json!({ "error": "x" }));
        assert_eq!(error_message(&without_message, LOGIN_FAILED), LOGIN_FAILED);

        let empty = ApiResponse::new(409, "");
        assert_eq!(error_message(&empty, REGISTRATION_FAILED), REGISTRATION_FAILED);

        let html = ApiResponse::new(502, "<html>Bad Gateway</html>");
        assert_eq!(error_message(&html, LOGIN_FAILED), LOGIN_FAILED);

        let blank = ApiResponse::json(400, json!({ "message": "  " }));
        assert_eq!(error_message(&blank, LOGIN_FAILED), LOGIN_FAILED);

        let non_string = ApiResponse::json(400, json!({ "message": 42 }));
        assert_eq!(error_message(&non_string, LOGIN_FAILED), LOGIN_FAILED);
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let credentials = Credentials::new("alice", "hunter2");
        let printed = format!("{credentials:?}");
        assert!(printed.contains("alice"));
        assert!(!printed.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_verify_outcomes() {
        let transport = ScriptedTransport::new([
            Ok(ApiResponse::json(200, json!({ "user": { "id": 1 } }))),
            Ok(ApiResponse::new(401, "")),
            Ok(ApiResponse::json(200, json!({ "user": null }))),
        ]);
        let api = AuthApi::new(transport);

        assert_eq!(
            api.verify("t").await.unwrap(),
            Verification::Valid(UserRecord::new(json!({ "id": 1 })))
        );
        assert_eq!(
            api.verify("t").await.unwrap(),
            Verification::Invalid { status: 401 }
        );
        assert!(matches!(
            api.verify("t").await,
            Err(TransportError::MissingField("user"))
        ));

        let sent = api.transport().requests();
        assert_eq!(sent[0].method, Method::Get);
        assert_eq!(sent[0].path, "/user/me");
        assert_eq!(sent[0].bearer.as_deref(), Some("t"));
    }

    #[tokio::test]
    async fn test_authenticate_requires_token() {
        let transport = ScriptedTransport::new([
            Ok(ApiResponse::json(200, json!({ "token": "T" }))),
            Ok(ApiResponse::json(200, json!({}))),
        ]);
        let api = AuthApi::new(transport);
        let credentials = Credentials::new("bob", "good");

        assert_eq!(
            api.authenticate(&credentials).await.unwrap(),
            Authentication::Token("T".to_string())
        );
        assert!(matches!(
            api.authenticate(&credentials).await,
            Err(TransportError::MissingField("token"))
        ));

        let sent = api.transport().requests();
        assert_eq!(
            sent[0].body,
            Some(json!({ "username": "bob", "password": "good" }))
        );
        assert!(sent[0].bearer.is_none());
    }

    #[tokio::test]
    async fn test_register_only_accepts_created() {
        let transport = ScriptedTransport::new([
            Ok(ApiResponse::new(201, "")),
            Ok(ApiResponse::json(200, json!({ "ok": true }))),
        ]);
        let api = AuthApi::new(transport);
        let form = RegistrationForm {
            username: "carol".to_string(),
            firstname: "Carol".to_string(),
            lastname: "Doe".to_string(),
            password: "pw".to_string(),
        };

        assert_eq!(api.register(&form).await.unwrap(), Registration::Created);
        assert_eq!(
            api.register(&form).await.unwrap(),
            Registration::Rejected(REGISTRATION_FAILED.to_string())
        );
    }
}
