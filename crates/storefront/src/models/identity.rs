//! Signed-in identity.

use serde::{Deserialize, Serialize};

use lunar_system_core::{Email, UserId};

/// The visitor's signed-in identity, as reported by the identity provider.
///
/// Persisted as camelCase JSON under `lunar_google_user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: UserId,
    pub email: Email,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Identity {
    /// First letter shown in the avatar bubble.
    #[must_use]
    pub fn initial(&self) -> String {
        self.user_name
            .chars()
            .next()
            .or_else(|| self.email.as_str().chars().next())
            .map_or_else(|| "U".to_string(), |c| c.to_uppercase().collect())
    }
}
