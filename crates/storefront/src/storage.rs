//! Per-visitor durable storage.
//!
//! Everything the storefront remembers about a visitor (cart, identity,
//! pending notices, the remote session identifier) lives in a small string
//! key/value store bound to the visitor's session cookie. Values are stored
//! as strings so the persisted cart is exactly the JSON document the cart
//! serializes to.
//!
//! The session is loaded by `SessionManagerLayer` before the handler runs and
//! saved before the response leaves, so a write made here is visible to the
//! next request from the same visitor.

use axum::{extract::FromRequestParts, http::request::Parts};
use thiserror::Error;
use tower_sessions::Session;

use lunar_system_core::SessionId;

use crate::error::AppError;
use crate::models::session_keys;

/// Errors raised by the session-backed storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Session storage error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Failed to serialize stored value: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// String key/value storage scoped to one visitor.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    session: Session,
}

impl LocalStorage {
    /// Wrap a session.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// Read a value. A stored value that is not a string reads as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.session.get::<String>(key).await {
            Ok(value) => Ok(value),
            Err(tower_sessions::session::Error::SerdeJson(e)) => {
                tracing::warn!(key, error = %e, "Discarding non-string storage value");
                self.remove_item(key).await?;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be written.
    pub async fn set_item(&self, key: &str, value: impl Into<String>) -> Result<(), StorageError> {
        self.session.insert(key, value.into()).await?;
        Ok(())
    }

    /// Erase a value. Erasing a missing key is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be written.
    pub async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.session.remove_value(key).await?;
        Ok(())
    }

    /// The visitor's remote session identifier, generated on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read or written.
    pub async fn session_id(&self) -> Result<SessionId, StorageError> {
        if let Some(existing) = self.get_item(session_keys::SESSION_ID).await? {
            return Ok(SessionId::new(existing));
        }

        let id = SessionId::generate();
        self.set_item(session_keys::SESSION_ID, id.as_str()).await?;
        Ok(id)
    }
}

impl<S> FromRequestParts<S> for LocalStorage
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(Self::new)
            .ok_or_else(|| AppError::Internal("session layer is not installed".to_string()))
    }
}
