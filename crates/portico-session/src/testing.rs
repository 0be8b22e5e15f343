//! Scripted collaborators for state-machine tests

use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Notify;

use crate::error::TransportError;
use crate::navigator::{Navigator, Route};
use crate::transport::{ApiRequest, ApiResponse, HttpTransport};

/// Replays canned responses in order and records every request it sees
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<ApiResponse, TransportError>>>,
    requests: Mutex<Vec<ApiRequest>>,
    /// Request index that waits for the notify before answering
    gate: Option<(usize, Arc<Notify>)>,
}

impl ScriptedTransport {
    pub fn new(responses: impl IntoIterator<Item = Result<ApiResponse, TransportError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Hold the `index`-th request (zero based) until `release` is notified
    pub fn gated(mut self, index: usize, release: Arc<Notify>) -> Self {
        self.gate = Some((index, release));
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    pub fn paths(&self) -> Vec<&'static str> {
        self.requests.lock().iter().map(|r| r.path).collect()
    }
}

impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let index = {
            let mut requests = self.requests.lock();
            requests.push(request);
            requests.len() - 1
        };
        if let Some((gated, release)) = &self.gate {
            if *gated == index {
                release.notified().await;
            }
        }
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request("no scripted response".to_string())))
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().push(route);
    }
}

/// Slot whose writes always fail, reads succeed with the given token
pub struct ReadOnlyTokenStore {
    token: Option<String>,
}

impl ReadOnlyTokenStore {
    pub fn new(token: Option<&str>) -> Self {
        Self {
            token: token.map(str::to_string),
        }
    }
}

impl crate::store::TokenStore for ReadOnlyTokenStore {
    fn load(&self) -> Result<Option<String>, portico_storage::StorageError> {
        Ok(self.token.clone())
    }

    fn store(&self, _token: &str) -> Result<(), portico_storage::StorageError> {
        Err(read_only())
    }

    fn clear(&self) -> Result<(), portico_storage::StorageError> {
        Err(read_only())
    }
}

fn read_only() -> portico_storage::StorageError {
    std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only slot").into()
}

/// Slot that stores and loads normally but can never be cleared
#[derive(Default)]
pub struct StickyTokenStore {
    token: RwLock<Option<String>>,
}

impl crate::store::TokenStore for StickyTokenStore {
    fn load(&self) -> Result<Option<String>, portico_storage::StorageError> {
        Ok(self.token.read().clone())
    }

    fn store(&self, token: &str) -> Result<(), portico_storage::StorageError> {
        *self.token.write() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), portico_storage::StorageError> {
        Err(read_only())
    }
}
