//! Application state container
//!
//! Created once by the application root and shared with the UI by reference.
//! The session lives for the whole process; there is no other teardown path.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use portico_session::{
    ChannelNavigator, DatabaseTokenStore, Navigator, ReqwestTransport, Route, SessionManager,
    SessionState,
};
use portico_storage::Database;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::Result;

pub struct App {
    config: Config,
    db: Database,
    session_manager: SessionManager<ReqwestTransport>,
    /// Receiving end of navigation requests, until the shell claims it
    routes: Mutex<Option<mpsc::Receiver<Route>>>,
}

impl App {
    /// Build the app with a channel navigator; claim routes with [`App::take_routes`]
    pub fn new(config: Config) -> Result<Self> {
        let (navigator, routes) = ChannelNavigator::new();
        let mut app = Self::with_navigator(config, Arc::new(navigator))?;
        app.routes = Mutex::new(Some(routes));
        Ok(app)
    }

    /// Build the app around a navigator supplied by the UI shell
    pub fn with_navigator(config: Config, navigator: Arc<dyn Navigator>) -> Result<Self> {
        config.validate()?;

        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::open(&config.database_path)?;

        let transport = ReqwestTransport::new(
            config.api_url()?,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        let store = Arc::new(DatabaseTokenStore::with_key(
            db.clone(),
            config.token_key.clone(),
        ));
        let session_manager = SessionManager::new(transport, store, navigator);

        tracing::info!(
            database = %config.database_path.display(),
            api = %config.api_base_url,
            "Portico initialized"
        );

        Ok(Self {
            config,
            db,
            session_manager,
            routes: Mutex::new(None),
        })
    }

    /// Restore the stored session. Until this resolves the state is `Loading`.
    pub async fn initialize(&self) -> SessionState {
        let state = self.session_manager.restore().await;
        tracing::info!(state = %state, "Session restored");
        state
    }

    pub fn session_manager(&self) -> &SessionManager<ReqwestTransport> {
        &self.session_manager
    }

    pub fn session_state(&self) -> SessionState {
        self.session_manager.state()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Navigation requests from the session core. Returns `None` once taken,
    /// or when the app was built with its own navigator.
    pub fn take_routes(&self) -> Option<mpsc::Receiver<Route>> {
        self.routes.lock().take()
    }
}
