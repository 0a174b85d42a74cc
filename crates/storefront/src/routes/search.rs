//! Search suggestion handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use crate::filters;
use crate::routes::home::ProductView;
use crate::state::AppState;

/// Search suggestions query parameters.
#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: String,
}

/// Suggestion dropdown fragment.
///
/// Renders nothing when there are no suggestions, which hides the dropdown.
#[derive(Template, WebTemplate)]
#[template(path = "partials/suggestions.html")]
pub struct SuggestionsTemplate {
    pub suggestions: Vec<ProductView>,
}

/// Search suggestions endpoint, fetched by the header's search box.
#[instrument(skip(state))]
pub async fn suggest(
    State(state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> SuggestionsTemplate {
    let suggestions = state
        .catalog()
        .suggestions(&query.q)
        .iter()
        .map(ProductView::from)
        .collect();

    SuggestionsTemplate { suggestions }
}
