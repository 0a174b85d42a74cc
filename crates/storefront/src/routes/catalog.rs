//! Catalog refresh handler (the "reload products" button).

use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
};
use tracing::instrument;

use crate::error::Result;
use crate::models::Notice;
use crate::services::{CatalogStatus, notices};
use crate::state::AppState;
use crate::storage::LocalStorage;

/// Re-fetch the product list and go back home.
///
/// Waits for the fetch so the next render shows the new snapshot. A failed
/// fetch is surfaced by the home page itself.
#[instrument(skip(state, storage))]
pub async fn refresh(
    State(state): State<AppState>,
    storage: LocalStorage,
) -> Result<impl IntoResponse> {
    if state.catalog().fetch(state.entity_store()).await == CatalogStatus::Ready {
        let count = state.catalog().products().len();
        notices::push(
            &storage,
            Notice::success(format!("{count} produtos carregados")),
        )
        .await?;
    }

    Ok(Redirect::to("/"))
}
