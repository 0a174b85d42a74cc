//! Catalog inspection.
//!
//! Fetches `products.list()` from the entity store the same way the
//! storefront does, applies the storefront's search filter, and prints the
//! result grouped by category.
//!
//! # Environment Variables
//!
//! - `ENTITY_STORE_URL` - Base URL of the entity store
//! - `ENTITY_STORE_API_KEY` - Optional bearer token

use std::fmt::Write as _;

use thiserror::Error;

use lunar_system_storefront::config::{ConfigError, EntityStoreConfig};
use lunar_system_storefront::entity_store::{EntityStoreClient, EntityStoreError};
use lunar_system_storefront::services::CategoryGroup;
use lunar_system_storefront::services::catalog::{filter_products, group_by_category};

/// Errors that can occur while printing the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Entity store error: {0}")]
    EntityStore(#[from] EntityStoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fetch the catalog and print it to stdout.
///
/// # Errors
///
/// Returns an error if the entity store is not configured or cannot be read.
pub async fn print(query: &str, category: &str, json: bool) -> Result<(), CatalogError> {
    dotenvy::dotenv().ok();

    let config = EntityStoreConfig::from_env()?;
    let client = EntityStoreClient::new(&config)?;

    tracing::info!("Fetching catalog from {}", config.base_url);
    let products = filter_products(&client.list_products().await?, query, category);
    tracing::info!("{} products matched", products.len());

    let output = if json {
        serde_json::to_string_pretty(&products)?
    } else {
        render(&group_by_category(products))
    };

    #[allow(clippy::print_stdout)]
    {
        println!("{output}");
    }

    Ok(())
}

/// Plain-text listing, one block per category.
fn render(groups: &[CategoryGroup]) -> String {
    if groups.is_empty() {
        return "Nenhum produto encontrado".to_string();
    }

    let mut out = String::new();
    for group in groups {
        let _ = writeln!(out, "{} ({})", group.category.title(), group.products.len());
        for product in &group.products {
            let _ = write!(
                out,
                "  {:<32} {:>12}",
                product.name,
                product.current_price.display()
            );
            if let Some(old_price) = &product.old_price {
                let _ = write!(out, "  (de {old_price})");
            }
            if !product.in_stock {
                let _ = write!(out, "  [ESGOTADO]");
            }
            let _ = writeln!(out, "  #{}", product.id);
        }
        out.push('\n');
    }

    out.trim_end().to_string()
}
