//! Durable token slot

use parking_lot::RwLock;
use portico_storage::{Database, StorageError};

pub const DEFAULT_TOKEN_KEY: &str = "auth_token";

/// A single overwritable slot holding the bearer token.
///
/// An absent (or empty) slot means there is no prior session.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, StorageError>;
    fn store(&self, token: &str) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

/// Token slot kept in the `settings` table
#[derive(Clone)]
pub struct DatabaseTokenStore {
    db: Database,
    key: String,
}

impl DatabaseTokenStore {
    pub fn new(db: Database) -> Self {
        Self::with_key(db, DEFAULT_TOKEN_KEY)
    }

    pub fn with_key(db: Database, key: impl Into<String>) -> Self {
        Self {
            db,
            key: key.into(),
        }
    }
}

impl TokenStore for DatabaseTokenStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self
            .db
            .get_setting(&self.key)?
            .filter(|token| !token.is_empty()))
    }

    fn store(&self, token: &str) -> Result<(), StorageError> {
        self.db.set_setting(&self.key, token)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.db.delete_setting(&self.key)?;
        Ok(())
    }
}

/// Process-local slot, for embedding without a database and for tests
#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.token.read().clone().filter(|token| !token.is_empty()))
    }

    fn store(&self, token: &str) -> Result<(), StorageError> {
        *self.token.write() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.token.write() = None;
        Ok(())
    }
}
