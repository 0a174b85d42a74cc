//! Identity error types.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur while signing in or out.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The sign-in widget is not configured or not loaded yet.
    #[error("sign-in widget is not available")]
    WidgetUnavailable,

    /// The credential is not a decodable token.
    #[error("malformed credential: {0}")]
    MalformedCredential(String),

    /// The credential was issued for another client.
    #[error("credential audience does not match this client")]
    AudienceMismatch,

    /// The credential has expired.
    #[error("credential has expired")]
    Expired,

    /// The credential carries an unusable email address.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] lunar_system_core::EmailError),

    /// Persisting or clearing the identity failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
