//! Google sign-in route handlers.
//!
//! The Google Identity Services widget runs in the browser. When the visitor
//! picks an account, `static/js/storefront.js` posts the returned credential
//! here together with Google's double-submit CSRF token.

use axum::{
    Form,
    extract::State,
    http::{HeaderMap, header::COOKIE},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::cookie::Cookie;
use tracing::{instrument, warn};

use crate::error::{AppError, Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::models::Notice;
use crate::services::{IdentityError, SignInWidget, notices};
use crate::state::AppState;
use crate::storage::LocalStorage;

/// Name of the CSRF cookie and form field set by Google.
pub const CSRF_TOKEN_NAME: &str = "g_csrf_token";

const NOT_READY_MESSAGE: &str = "Sistema de login ainda não está pronto. Aguarde um momento.";
const BAD_CREDENTIAL_MESSAGE: &str = "Erro ao processar dados do login. Tente novamente.";

/// Credential callback form data.
#[derive(Deserialize)]
pub struct GoogleCallbackForm {
    pub credential: String,
    #[serde(default)]
    pub g_csrf_token: String,
}

/// Handle the credential posted by the sign-in widget.
///
/// A failed CSRF check is a 400. A refused or unreadable credential queues
/// an error notice and goes back home; success queues the welcome notice and
/// refreshes the catalog.
#[instrument(skip_all)]
pub async fn google_callback(
    State(state): State<AppState>,
    storage: LocalStorage,
    headers: HeaderMap,
    Form(form): Form<GoogleCallbackForm>,
) -> Result<Response> {
    verify_double_submit(&headers, &form.g_csrf_token)?;

    match state.widget().sign_in(&storage, &form.credential).await {
        Ok(identity) => {
            set_sentry_user(&identity.user_id, Some(identity.email.as_str()));
            add_breadcrumb("auth", "Signed in with Google", None);
            state.start_catalog_fetch();
        }
        Err(IdentityError::WidgetUnavailable) => {
            notices::push(&storage, Notice::error(NOT_READY_MESSAGE)).await?;
        }
        Err(IdentityError::Storage(e)) => return Err(AppError::Storage(e)),
        Err(e) => {
            warn!(error = %e, "Rejected Google credential");
            notices::push(&storage, Notice::error(BAD_CREDENTIAL_MESSAGE)).await?;
        }
    }

    Ok(Redirect::to("/").into_response())
}

/// Sign out and go back home.
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    storage: LocalStorage,
) -> Result<impl IntoResponse> {
    state.widget().sign_out(&storage).await?;
    clear_sentry_user();
    add_breadcrumb("auth", "Signed out", None);

    Ok(Redirect::to("/"))
}

/// Google's double-submit check: the form token must equal the cookie.
fn verify_double_submit(headers: &HeaderMap, form_token: &str) -> Result<()> {
    let cookie_token = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(std::result::Result::ok)
        .find(|cookie| cookie.name() == CSRF_TOKEN_NAME)
        .map(|cookie| cookie.value().to_string());

    match cookie_token {
        None => Err(AppError::BadRequest("No CSRF token in cookie".to_string())),
        Some(_) if form_token.is_empty() => {
            Err(AppError::BadRequest("No CSRF token in form".to_string()))
        }
        Some(token) if token == form_token => Ok(()),
        Some(_) => Err(AppError::BadRequest(
            "Failed to verify double submit cookie".to_string(),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_double_submit_accepts_matching_token() {
        let headers = headers("lunar_session=abc; g_csrf_token=tok123");
        assert!(verify_double_submit(&headers, "tok123").is_ok());
    }

    #[test]
    fn test_double_submit_rejects_mismatch_and_missing() {
        let with_cookie = headers("g_csrf_token=tok123");
        assert!(verify_double_submit(&with_cookie, "other").is_err());
        assert!(verify_double_submit(&with_cookie, "").is_err());

        let without_cookie = headers("lunar_session=abc");
        assert!(verify_double_submit(&without_cookie, "tok123").is_err());
        assert!(verify_double_submit(&HeaderMap::new(), "tok123").is_err());
    }
}
