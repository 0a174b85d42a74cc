//! Home page route handler.
//!
//! The home page is the whole storefront: header with search and sign-in,
//! the catalog grouped by category, and the slide-over cart panel.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use lunar_system_core::Price;

use crate::entity_store::Product;
use crate::error::Result;
use crate::filters;
use crate::models::{Identity, Notice};
use crate::routes::cart::CartView;
use crate::services::catalog::{self, Catalog, CatalogStatus, CategoryGroup};
use crate::services::identity::take_disable_auto_select;
use crate::services::{ShoppingCart, WidgetStatus, notices};
use crate::state::AppState;
use crate::storage::LocalStorage;

/// Shown while the last catalog fetch has failed.
pub const CATALOG_ERROR_MESSAGE: &str = "Erro ao carregar produtos. Tente novamente.";

/// Home page query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub category: String,
    /// `open` shows the cart panel.
    pub cart: Option<String>,
}

impl HomeQuery {
    fn is_filtering(&self) -> bool {
        !self.q.is_empty() || !self.category.is_empty()
    }

    fn cart_open(&self) -> bool {
        self.cart.as_deref() == Some("open")
    }
}

// =============================================================================
// View Types
// =============================================================================

/// Product card display data.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub brand: String,
    pub image_class: String,
    pub price: String,
    pub old_price: Option<String>,
    pub duration: Option<String>,
    pub in_stock: bool,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            brand: product.brand.clone(),
            image_class: product.image_class.clone(),
            price: product.current_price.display(),
            old_price: product.old_price.as_ref().map(Price::display),
            duration: product.duration.clone(),
            in_stock: product.in_stock,
        }
    }
}

/// One category section of product cards.
#[derive(Clone)]
pub struct CategorySectionView {
    pub slug: String,
    pub title: String,
    pub products: Vec<ProductView>,
}

impl From<CategoryGroup> for CategorySectionView {
    fn from(group: CategoryGroup) -> Self {
        Self {
            slug: group.category.as_str().to_string(),
            title: group.category.title(),
            products: group.products.iter().map(ProductView::from).collect(),
        }
    }
}

/// Category filter link.
#[derive(Clone)]
pub struct CategoryLinkView {
    pub slug: String,
    pub title: String,
    pub active: bool,
}

/// Signed-in visitor display data.
#[derive(Clone)]
pub struct IdentityView {
    pub user_name: String,
    pub email: String,
    pub initial: String,
    pub avatar: Option<String>,
}

impl From<&Identity> for IdentityView {
    fn from(identity: &Identity) -> Self {
        Self {
            user_name: identity.user_name.clone(),
            email: identity.email.to_string(),
            initial: identity.initial(),
            avatar: identity.avatar.clone(),
        }
    }
}

/// State of the sign-in control in the header.
#[derive(Clone)]
pub enum WidgetView {
    /// No client id configured; the control stays disabled.
    NotLoaded,
    /// Ready to sign in once the Google script has loaded.
    Idle(String),
    SignedIn(IdentityView),
}

/// Header display data.
#[derive(Clone)]
pub struct HeaderView {
    pub query: String,
    pub category: String,
    pub cart_count: u32,
    pub widget: WidgetView,
}

/// Main content of the page.
#[derive(Clone)]
pub enum CatalogView {
    /// First fetch still in flight.
    Loading,
    /// The visitor's query or category filtered everything out.
    NotFound,
    Sections(Vec<CategorySectionView>),
    /// Nothing to show and nothing filtered.
    Welcome,
}

// =============================================================================
// Templates
// =============================================================================

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub header: HeaderView,
    pub identity: Option<IdentityView>,
    pub categories: Vec<CategoryLinkView>,
    pub content: CatalogView,
    pub cart: CartView,
    pub notices: Vec<Notice>,
    pub catalog_failed: bool,
    pub disable_auto_select: bool,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the home page.
#[instrument(skip(state, storage))]
pub async fn home(
    State(state): State<AppState>,
    storage: LocalStorage,
    Query(query): Query<HomeQuery>,
) -> Result<HomeTemplate> {
    let status = state.widget().status(&storage).await?;
    let cart = ShoppingCart::restore(storage.clone()).await?;
    let disable_auto_select = take_disable_auto_select(&storage).await?;
    let mut notices = notices::take(&storage).await?;

    let catalog = state.catalog();
    let catalog_failed = catalog.status() == CatalogStatus::Failed;
    if catalog_failed {
        notices.push(Notice::error(CATALOG_ERROR_MESSAGE));
    }

    let identity = status.identity().map(IdentityView::from);
    let widget = match status {
        WidgetStatus::Authenticated(ref identity) => WidgetView::SignedIn(identity.into()),
        WidgetStatus::Idle => state
            .widget()
            .client_id()
            .map_or(WidgetView::NotLoaded, |id| WidgetView::Idle(id.to_string())),
        WidgetStatus::NotLoaded => WidgetView::NotLoaded,
    };

    Ok(HomeTemplate {
        header: HeaderView {
            query: query.q.clone(),
            category: query.category.clone(),
            cart_count: cart.total_items(),
            widget,
        },
        identity,
        categories: category_links(catalog, &query.category),
        content: catalog_view(catalog, &query),
        cart: CartView::new(&cart, query.cart_open()),
        notices,
        catalog_failed,
        disable_auto_select,
    })
}

/// Decide what the main area shows.
fn catalog_view(catalog: &Catalog, query: &HomeQuery) -> CatalogView {
    if catalog.status() == CatalogStatus::Loading {
        return CatalogView::Loading;
    }

    let filtered = catalog.filter(&query.q, &query.category);
    if !filtered.is_empty() {
        return CatalogView::Sections(
            catalog::group_by_category(filtered)
                .into_iter()
                .map(CategorySectionView::from)
                .collect(),
        );
    }

    if query.is_filtering() {
        CatalogView::NotFound
    } else {
        CatalogView::Welcome
    }
}

/// Category links in first-seen order over the full catalog.
fn category_links(catalog: &Catalog, active: &str) -> Vec<CategoryLinkView> {
    catalog::group_by_category(catalog.products().to_vec())
        .into_iter()
        .map(|group| CategoryLinkView {
            active: group.category.as_str() == active,
            slug: group.category.as_str().to_string(),
            title: group.category.title(),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lunar_system_core::{Category, ProductId};

    use super::*;

    fn product(id: &str, name: &str, category: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            category: Category::from(category),
            current_price: Price::from_cents(1990),
            old_price: Some(Price::from_cents(3990)),
            in_stock: true,
            description: String::new(),
            brand: "Lunar".to_string(),
            image_class: "bg-lunar".to_string(),
            duration: None,
        }
    }

    fn query(q: &str, category: &str) -> HomeQuery {
        HomeQuery {
            q: q.to_string(),
            category: category.to_string(),
            cart: None,
        }
    }

    #[test]
    fn test_loading_before_first_fetch() {
        let catalog = Catalog::new();
        assert!(matches!(
            catalog_view(&catalog, &query("", "")),
            CatalogView::Loading
        ));
    }

    #[test]
    fn test_not_found_only_when_filtering() {
        let catalog = Catalog::with_products(vec![product("1", "Netflix", "streaming")]);
        assert!(matches!(
            catalog_view(&catalog, &query("zzz", "")),
            CatalogView::NotFound
        ));

        let empty = Catalog::with_products(Vec::new());
        assert!(matches!(
            catalog_view(&empty, &query("", "")),
            CatalogView::Welcome
        ));
    }

    #[test]
    fn test_sections_are_grouped() {
        let catalog = Catalog::with_products(vec![
            product("1", "Netflix", "streaming"),
            product("2", "Spotify", "musica"),
            product("3", "Max", "streaming"),
        ]);

        let CatalogView::Sections(sections) = catalog_view(&catalog, &query("", "")) else {
            panic!("expected sections");
        };
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "TELAS STREAMING");
        assert_eq!(sections[0].products.len(), 2);
        assert_eq!(sections[0].products[0].price, "R$ 19.90");
        assert_eq!(sections[0].products[0].old_price.as_deref(), Some("R$ 39.90"));
    }

    #[test]
    fn test_category_links_mark_active() {
        let catalog = Catalog::with_products(vec![
            product("1", "Netflix", "streaming"),
            product("2", "Spotify", "musica"),
        ]);

        let links = category_links(&catalog, "musica");
        assert_eq!(links.len(), 2);
        assert!(!links[0].active);
        assert!(links[1].active);
        assert_eq!(links[1].title, "MÚSICA");
    }

    #[test]
    fn test_cart_open_flag() {
        let mut q = query("", "");
        assert!(!q.cart_open());
        q.cart = Some("open".to_string());
        assert!(q.cart_open());
    }
}
