//! Storage keys.
//!
//! Names of the entries kept in a visitor's durable storage.

/// Keys for per-visitor storage entries.
pub mod keys {
    /// Identifier sent with remote cart records (`session_<uuid>`).
    pub const SESSION_ID: &str = "lunar_session_id";

    /// Serialized cart (JSON array of lines).
    pub const CART: &str = "lunar_cart";

    /// Serialized signed-in identity.
    pub const GOOGLE_USER: &str = "lunar_google_user";

    /// Authenticated flag; `"true"` when signed in, absent otherwise.
    pub const GOOGLE_AUTH: &str = "lunar_google_auth";

    /// Pending notices shown on the next render.
    pub const NOTICES: &str = "lunar_notices";

    /// One-shot directive asking the widget to disable auto-select.
    pub const DISABLE_AUTO_SELECT: &str = "lunar_disable_auto_select";
}
