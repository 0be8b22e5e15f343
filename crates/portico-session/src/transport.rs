//! HTTP transport
//!
//! The session logic only needs "send this request, give me status and body".
//! Keeping that behind a trait lets the state machine run against a scripted
//! backend in tests and against reqwest in the application.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use crate::error::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the backend base URL, e.g. `/user/me`
    pub path: &'static str,
    pub bearer: Option<String>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get(path: &'static str) -> Self {
        Self {
            method: Method::Get,
            path,
            bearer: None,
            body: None,
        }
    }

    pub fn post(path: &'static str, body: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            path,
            bearer: None,
            body: Some(body),
        }
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(status: u16, value: serde_json::Value) -> Self {
        Self::new(status, value.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

pub trait HttpTransport: Send + Sync {
    /// Send a request. Any HTTP status is a successful send; only failures to
    /// get a response at all are errors.
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send;
}

/// Production transport backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl ReqwestTransport {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: normalize_base(base_url),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}

impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.endpoint(request.path)?;

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        tracing::debug!(path = request.path, status, "Backend responded");

        Ok(ApiResponse { status, body })
    }
}

// Url::join drops the last path segment unless the base ends with '/'
fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_endpoint_keeps_base_path() {
        let base = Url::parse("https://example.com/api").unwrap();
        let transport = ReqwestTransport::new(base, Duration::from_secs(5)).unwrap();

        assert_eq!(
            transport.endpoint("/user/me").unwrap().as_str(),
            "https://example.com/api/user/me"
        );
    }

    #[test]
    fn test_response_status_classes() {
        assert!(ApiResponse::new(200, "").is_success());
        assert!(ApiResponse::new(201, "").is_success());
        assert!(!ApiResponse::new(401, "").is_success());
        assert!(!ApiResponse::new(500, "").is_success());
    }

    #[tokio::test]
    async fn test_sends_bearer_and_reads_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/me"))
            .and(header("authorization", "Bearer abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "user": { "id": 1 } })))
            .expect(1)
            .mount(&server)
            .await;

        let base = Url::parse(&server.uri()).unwrap();
        let transport = ReqwestTransport::new(base, Duration::from_secs(5)).unwrap();
        let response = transport
            .send(ApiRequest::get("/user/me").with_bearer("abc"))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        let body: serde_json::Value = response.parse().unwrap();
        assert_eq!(body, json!({ "user": { "id": 1 } }));
    }

    #[tokio::test]
    async fn test_posts_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "message": "nope" })))
            .mount(&server)
            .await;

        let base = Url::parse(&server.uri()).unwrap();
        let transport = ReqwestTransport::new(base, Duration::from_secs(5)).unwrap();
        let response = transport
            .send(ApiRequest::post(
                "/login",
                json!({ "username": "bob", "password": "pw" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status, 400);

        let received = server.received_requests().await.unwrap();
        let sent: serde_json::Value = received[0].body_json().unwrap();
        assert_eq!(sent, json!({ "username": "bob", "password": "pw" }));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // Port freed by dropping the listener, so nothing accepts on it
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let base = Url::parse(&format!("http://127.0.0.1:{port}")).unwrap();
        let transport = ReqwestTransport::new(base, Duration::from_secs(2)).unwrap();

        let result = transport.send(ApiRequest::get("/user/me")).await;
        assert!(result.is_err());
    }
}
