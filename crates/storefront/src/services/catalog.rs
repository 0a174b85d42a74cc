//! Product catalog.
//!
//! The catalog is a snapshot of the entity store's product list. The app
//! starts with an empty snapshot in the `Loading` state; a background task
//! fetches the list and swaps it in. Every later fetch (explicit refresh,
//! refresh after sign-in) replaces the snapshot wholesale, so the latest
//! response wins.
//!
//! Filtering, grouping and suggestions are pure functions over a snapshot
//! and never mutate it.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{error, info, instrument};

use lunar_system_core::{Category, ProductId};

use crate::entity_store::{EntityStoreClient, Product};

/// Shortest query that produces suggestions.
pub const MIN_SUGGESTION_QUERY_CHARS: usize = 2;

/// Maximum number of suggestions returned.
pub const MAX_SUGGESTIONS: usize = 6;

/// Load state of the catalog snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogStatus {
    /// No fetch has completed yet.
    #[default]
    Loading,
    /// The last fetch succeeded.
    Ready,
    /// The last fetch failed; the snapshot is empty.
    Failed,
}

/// Products of one category, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    pub category: Category,
    pub products: Vec<Product>,
}

#[derive(Debug, Default)]
struct Snapshot {
    status: CatalogStatus,
    products: Arc<Vec<Product>>,
}

/// Shared product catalog.
///
/// Cheap to clone; clones share the same snapshot.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    inner: Arc<RwLock<Snapshot>>,
}

impl Catalog {
    /// Create an empty catalog in the `Loading` state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog that is already loaded with `products`.
    #[must_use]
    pub fn with_products(products: Vec<Product>) -> Self {
        let catalog = Self::new();
        catalog.replace(CatalogStatus::Ready, products);
        catalog
    }

    /// Current load state.
    #[must_use]
    pub fn status(&self) -> CatalogStatus {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .status
    }

    /// Whether at least one fetch has completed (successfully or not).
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.status() != CatalogStatus::Loading
    }

    /// The full, unfiltered product list as last fetched.
    #[must_use]
    pub fn products(&self) -> Arc<Vec<Product>> {
        Arc::clone(
            &self
                .inner
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .products,
        )
    }

    fn replace(&self, status: CatalogStatus, products: Vec<Product>) {
        let mut snapshot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        snapshot.status = status;
        snapshot.products = Arc::new(products);
    }

    /// Fetch the product list from the entity store and swap it in.
    ///
    /// Never fails: on error the snapshot becomes empty and the status
    /// `Failed`, which the page surfaces as an error notice.
    #[instrument(skip_all)]
    pub async fn fetch(&self, client: &EntityStoreClient) -> CatalogStatus {
        match client.list_products().await {
            Ok(products) => {
                info!(count = products.len(), "Catalog loaded");
                self.replace(CatalogStatus::Ready, products);
                CatalogStatus::Ready
            }
            Err(e) => {
                error!(error = %e, "Failed to load catalog");
                self.replace(CatalogStatus::Failed, Vec::new());
                CatalogStatus::Failed
            }
        }
    }

    /// Products matching `query` and `category` (see [`filter_products`]).
    #[must_use]
    pub fn filter(&self, query: &str, category: &str) -> Vec<Product> {
        filter_products(&self.products(), query, category)
    }

    /// Suggestions for `query` (see [`suggest_products`]).
    #[must_use]
    pub fn suggestions(&self, query: &str) -> Vec<Product> {
        suggest_products(&self.products(), query)
    }

    /// Look up a product by identifier.
    #[must_use]
    pub fn find(&self, id: &ProductId) -> Option<Product> {
        self.products().iter().find(|p| &p.id == id).cloned()
    }
}

/// Spawn a background task that fetches the catalog.
///
/// Until it completes the catalog stays in its current state.
pub fn refresh_in_background(catalog: Catalog, client: EntityStoreClient) {
    tokio::spawn(async move {
        let status = catalog.fetch(&client).await;
        info!(?status, "Background catalog fetch finished");
    });
}

/// Case-insensitive substring match of `query` over name, brand and
/// description, and exact match of `category`. Empty values match all.
#[must_use]
pub fn filter_products(products: &[Product], query: &str, category: &str) -> Vec<Product> {
    let needle = query.to_lowercase();
    let category = (!category.is_empty()).then(|| Category::from(category));

    products
        .iter()
        .filter(|p| {
            needle.is_empty()
                || contains_folded(&p.name, &needle)
                || contains_folded(&p.brand, &needle)
                || contains_folded(&p.description, &needle)
        })
        .filter(|p| category.as_ref().is_none_or(|c| &p.category == c))
        .cloned()
        .collect()
}

/// Partition `products` by category, keeping the order in which categories
/// first appear and the order of products within each category.
#[must_use]
pub fn group_by_category(products: Vec<Product>) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = Vec::new();

    for product in products {
        match groups.iter_mut().find(|g| g.category == product.category) {
            Some(group) => group.products.push(product),
            None => groups.push(CategoryGroup {
                category: product.category.clone(),
                products: vec![product],
            }),
        }
    }

    groups
}

/// Up to [`MAX_SUGGESTIONS`] products whose name or brand contains `query`
/// (case-insensitive). Queries shorter than [`MIN_SUGGESTION_QUERY_CHARS`]
/// yield nothing.
#[must_use]
pub fn suggest_products(products: &[Product], query: &str) -> Vec<Product> {
    if query.chars().count() < MIN_SUGGESTION_QUERY_CHARS {
        return Vec::new();
    }

    let needle = query.to_lowercase();
    products
        .iter()
        .filter(|p| contains_folded(&p.name, &needle) || contains_folded(&p.brand, &needle))
        .take(MAX_SUGGESTIONS)
        .cloned()
        .collect()
}

fn contains_folded(haystack: &str, lowercase_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowercase_needle)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lunar_system_core::Price;

    use super::*;

    fn product(id: &str, name: &str, brand: &str, category: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            category: Category::from(category),
            current_price: Price::from_cents(1000),
            old_price: None,
            in_stock: true,
            description: format!("{name} por 30 dias"),
            brand: brand.to_string(),
            image_class: String::new(),
            duration: None,
        }
    }

    fn sample() -> Vec<Product> {
        vec![
            product("1", "Netflix", "NF", "streaming"),
            product("2", "Spotify", "SP", "musica"),
            product("3", "Disney+", "Disney", "streaming"),
            product("4", "Canva Pro", "Canva", "ferramentas"),
        ]
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_filter_empty_returns_everything() {
        assert_eq!(filter_products(&sample(), "", ""), sample());
    }

    #[test]
    fn test_filter_no_match_is_empty() {
        assert!(filter_products(&sample(), "zzz-no-match", "").is_empty());
    }

    #[test]
    fn test_filter_matches_name_brand_description_case_insensitively() {
        assert_eq!(ids(&filter_products(&sample(), "NETFLIX", "")), ["1"]);
        assert_eq!(ids(&filter_products(&sample(), "sp", "")), ["2"]);
        assert_eq!(ids(&filter_products(&sample(), "30 DIAS", "")).len(), 4);
    }

    #[test]
    fn test_filter_by_category_is_exact() {
        assert_eq!(ids(&filter_products(&sample(), "", "streaming")), ["1", "3"]);
        assert!(filter_products(&sample(), "", "Streaming").is_empty());
        assert_eq!(ids(&filter_products(&sample(), "disney", "streaming")), ["3"]);
    }

    #[test]
    fn test_group_preserves_first_seen_order() {
        let groups = group_by_category(sample());
        let categories: Vec<_> = groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(categories, ["streaming", "musica", "ferramentas"]);
        assert_eq!(ids(&groups[0].products), ["1", "3"]);
    }

    #[test]
    fn test_group_empty() {
        assert!(group_by_category(Vec::new()).is_empty());
    }

    #[test]
    fn test_suggestions_scenario() {
        let catalog = vec![
            product("1", "Netflix", "NF", "streaming"),
            product("2", "Spotify", "SP", "musica"),
        ];
        let found = suggest_products(&catalog, "net");
        assert_eq!(ids(&found), ["1"]);
    }

    #[test]
    fn test_suggestions_need_two_chars_and_cap_at_six() {
        assert!(suggest_products(&sample(), "n").is_empty());
        assert!(suggest_products(&sample(), "").is_empty());

        let many: Vec<_> = (0..10)
            .map(|i| product(&i.to_string(), &format!("Plano {i}"), "Lunar", "educacao"))
            .collect();
        assert_eq!(suggest_products(&many, "plano").len(), MAX_SUGGESTIONS);
    }

    #[test]
    fn test_suggestions_ignore_description() {
        assert!(suggest_products(&sample(), "30 dias").is_empty());
    }

    #[test]
    fn test_catalog_state_transitions() {
        let catalog = Catalog::new();
        assert_eq!(catalog.status(), CatalogStatus::Loading);
        assert!(!catalog.is_loaded());
        assert!(catalog.products().is_empty());

        let loaded = Catalog::with_products(sample());
        assert_eq!(loaded.status(), CatalogStatus::Ready);
        assert!(loaded.is_loaded());
        assert_eq!(loaded.find(&ProductId::new("2")).unwrap().name, "Spotify");
        assert!(loaded.find(&ProductId::new("99")).is_none());
        assert_eq!(ids(&loaded.filter("", "musica")), ["2"]);
    }

    #[test]
    fn test_clones_share_snapshot() {
        let catalog = Catalog::new();
        let clone = catalog.clone();
        catalog.replace(CatalogStatus::Failed, Vec::new());
        assert_eq!(clone.status(), CatalogStatus::Failed);
    }
}
