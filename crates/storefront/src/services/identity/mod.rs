//! Google sign-in.
//!
//! The browser runs Google Identity Services; when the visitor picks an
//! account the widget hands back a signed ID token (the "credential"), which
//! `static/js/storefront.js` posts to the callback route. This module turns
//! that credential into an [`Identity`] and keeps it in the visitor's
//! storage.
//!
//! The identity is display-only (greeting, avatar, header badge) and gates
//! nothing, so the token's payload is decoded without verifying Google's
//! signature. The `aud` and `exp` claims are still checked when present.
//!
//! # Flow
//!
//! 1. Page renders the header from [`WidgetStatus`]
//! 2. Script loads, enables the sign-in control, prompts the visitor
//! 3. Credential posted to `/auth/google/callback`
//! 4. [`SignInWidget::sign_in`] decodes, stores and greets
//! 5. [`SignInWidget::sign_out`] clears and asks the widget to stop auto-selecting

mod error;

pub use error::IdentityError;

use std::future::Future;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use lunar_system_core::{Email, UserId};

use crate::models::{Identity, Notice, session_keys};
use crate::services::notices;
use crate::storage::{LocalStorage, StorageError};

/// Display name used when the token carries neither `name` nor `given_name`.
pub const FALLBACK_USER_NAME: &str = "Usuário";

/// Value of the authenticated flag while signed in.
const AUTHENTICATED: &str = "true";

/// What the header shows for the identity control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetStatus {
    /// Sign-in is not possible (no client configured).
    NotLoaded,
    /// Signed out; the control offers sign-in.
    Idle,
    /// Signed in.
    Authenticated(Identity),
}

impl WidgetStatus {
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            Self::NotLoaded | Self::Idle => None,
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// A third-party sign-in widget, seen only through its callback contract.
pub trait SignInWidget: Send + Sync {
    /// Whether sign-in can currently be offered.
    fn is_available(&self) -> bool;

    /// Complete a sign-in from the credential the widget delivered.
    fn sign_in(
        &self,
        storage: &LocalStorage,
        credential: &str,
    ) -> impl Future<Output = Result<Identity, IdentityError>> + Send;

    /// Forget the signed-in identity.
    fn sign_out(
        &self,
        storage: &LocalStorage,
    ) -> impl Future<Output = Result<(), IdentityError>> + Send;
}

/// Google Identity Services.
#[derive(Debug, Clone)]
pub struct GoogleIdentityWidget {
    client_id: Option<String>,
}

impl GoogleIdentityWidget {
    /// Create the widget. `None` disables sign-in.
    #[must_use]
    pub const fn new(client_id: Option<String>) -> Self {
        Self { client_id }
    }

    /// OAuth client identifier the page initializes the widget with.
    #[must_use]
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// Header state for this visitor.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be accessed.
    pub async fn status(&self, storage: &LocalStorage) -> Result<WidgetStatus, StorageError> {
        if let Some(identity) = restore_identity(storage).await? {
            return Ok(WidgetStatus::Authenticated(identity));
        }

        Ok(if self.is_available() {
            WidgetStatus::Idle
        } else {
            WidgetStatus::NotLoaded
        })
    }
}

impl SignInWidget for GoogleIdentityWidget {
    fn is_available(&self) -> bool {
        self.client_id.is_some()
    }

    #[instrument(skip_all)]
    async fn sign_in(
        &self,
        storage: &LocalStorage,
        credential: &str,
    ) -> Result<Identity, IdentityError> {
        let client_id = self.client_id().ok_or(IdentityError::WidgetUnavailable)?;

        let claims = decode_credential(credential)?;
        claims.verify(client_id, chrono::Utc::now().timestamp())?;
        let identity = claims.into_identity()?;

        let serialized = serde_json::to_string(&identity).map_err(StorageError::from)?;
        storage
            .set_item(session_keys::GOOGLE_USER, serialized)
            .await?;
        storage
            .set_item(session_keys::GOOGLE_AUTH, AUTHENTICATED)
            .await?;
        storage.remove_item(session_keys::DISABLE_AUTO_SELECT).await?;

        notices::push(
            storage,
            Notice::success(format!("Bem-vindo, {}! 🎉", identity.user_name)),
        )
        .await?;

        info!(user_id = %identity.user_id, "Signed in with Google");
        Ok(identity)
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, storage: &LocalStorage) -> Result<(), IdentityError> {
        storage.remove_item(session_keys::GOOGLE_USER).await?;
        storage.remove_item(session_keys::GOOGLE_AUTH).await?;
        storage
            .set_item(session_keys::DISABLE_AUTO_SELECT, AUTHENTICATED)
            .await?;

        notices::push(storage, Notice::success("Logout realizado com sucesso! 👋")).await?;

        info!("Signed out");
        Ok(())
    }
}

/// Load the persisted identity.
///
/// The identity only counts when the authenticated flag is set. Malformed
/// data is discarded and both entries erased.
///
/// # Errors
///
/// Returns an error if the storage cannot be accessed.
pub async fn restore_identity(storage: &LocalStorage) -> Result<Option<Identity>, StorageError> {
    let user = storage.get_item(session_keys::GOOGLE_USER).await?;
    let flag = storage.get_item(session_keys::GOOGLE_AUTH).await?;

    let (Some(raw), Some(AUTHENTICATED)) = (user, flag.as_deref()) else {
        return Ok(None);
    };

    match serde_json::from_str::<Identity>(&raw) {
        Ok(identity) => Ok(Some(identity)),
        Err(e) => {
            warn!(error = %e, "Discarding malformed stored identity");
            storage.remove_item(session_keys::GOOGLE_USER).await?;
            storage.remove_item(session_keys::GOOGLE_AUTH).await?;
            Ok(None)
        }
    }
}

/// Consume the one-shot "disable auto-select" directive left by sign-out.
///
/// # Errors
///
/// Returns an error if the storage cannot be accessed.
pub async fn take_disable_auto_select(storage: &LocalStorage) -> Result<bool, StorageError> {
    let pending = storage
        .get_item(session_keys::DISABLE_AUTO_SELECT)
        .await?
        .is_some();
    if pending {
        storage
            .remove_item(session_keys::DISABLE_AUTO_SELECT)
            .await?;
    }
    Ok(pending)
}

/// Claims read from the ID token payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialClaims {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub aud: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl CredentialClaims {
    /// Check audience and expiry against `client_id` and `now` (Unix seconds).
    ///
    /// # Errors
    ///
    /// Returns `AudienceMismatch` or `Expired`.
    pub fn verify(&self, client_id: &str, now: i64) -> Result<(), IdentityError> {
        if self.aud.as_deref().is_some_and(|aud| aud != client_id) {
            return Err(IdentityError::AudienceMismatch);
        }
        if self.exp.is_some_and(|exp| exp <= now) {
            return Err(IdentityError::Expired);
        }
        Ok(())
    }

    /// Build the identity, falling back through `name`, `given_name` and
    /// [`FALLBACK_USER_NAME`] for the display name.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEmail` if the email claim is not an address.
    pub fn into_identity(self) -> Result<Identity, IdentityError> {
        let user_name = [self.name, self.given_name]
            .into_iter()
            .flatten()
            .find(|n| !n.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_USER_NAME.to_string());

        Ok(Identity {
            user_id: UserId::new(self.sub),
            email: Email::parse(&self.email)?,
            user_name,
            avatar: self.picture.filter(|p| !p.is_empty()),
        })
    }
}

/// Decode the payload segment of an ID token.
///
/// The token is three dot-separated base64url segments; only the second is
/// read. Trailing `=` padding is tolerated.
///
/// # Errors
///
/// Returns `MalformedCredential` if the token has no payload segment or the
/// payload is not base64url-encoded JSON with `sub` and `email`.
pub fn decode_credential(credential: &str) -> Result<CredentialClaims, IdentityError> {
    let payload = credential
        .trim()
        .split('.')
        .nth(1)
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| IdentityError::MalformedCredential("missing payload segment".to_string()))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| IdentityError::MalformedCredential(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| IdentityError::MalformedCredential(e.to_string()))
}
