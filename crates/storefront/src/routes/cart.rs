//! Cart route handlers.
//!
//! Cart operations are plain form posts. Each one mutates the cart held in
//! the visitor's storage and redirects back to the home page with the cart
//! panel open, so a reload never replays the form.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tracing::instrument;

use lunar_system_core::ProductId;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::{CartLine, Notice};
use crate::services::cart::record_in_background;
use crate::services::{ShoppingCart, notices};
use crate::state::AppState;
use crate::storage::LocalStorage;

/// Where every cart mutation lands.
const CART_OPEN_URL: &str = "/?cart=open";

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub product_id: String,
    pub name: String,
    pub brand: String,
    pub image_class: String,
    pub price: String,
    pub subtotal: String,
    pub quantity: u32,
    /// Quantity the minus button submits (zero removes the line).
    pub decrement: i64,
    pub increment: i64,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        let quantity = i64::from(line.quantity);
        Self {
            product_id: line.product_id.to_string(),
            name: line.name.clone(),
            brand: line.brand.clone(),
            image_class: line.image_class.clone(),
            price: line.price.display(),
            subtotal: line.subtotal().display(),
            quantity: line.quantity,
            decrement: quantity - 1,
            increment: quantity + 1,
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total_items: u32,
    pub total_price: String,
    pub open: bool,
}

impl CartView {
    /// Build the panel for `cart`.
    #[must_use]
    pub fn new(cart: &ShoppingCart, open: bool) -> Self {
        Self {
            lines: cart.lines().iter().map(CartLineView::from).collect(),
            total_items: cart.total_items(),
            total_price: cart.total_price().display(),
            open,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Form naming a single product.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub product_id: ProductId,
}

/// Update quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Add one unit of a catalog product to the cart.
///
/// Unknown products are a 404. Out-of-stock products are refused with a 400
/// and an error notice for the next render.
#[instrument(skip(state, storage))]
pub async fn add(
    State(state): State<AppState>,
    storage: LocalStorage,
    Form(form): Form<ProductForm>,
) -> Result<impl IntoResponse> {
    let product = state
        .catalog()
        .find(&form.product_id)
        .ok_or_else(|| AppError::NotFound(format!("Product {}", form.product_id)))?;

    if !product.in_stock {
        notices::push(
            &storage,
            Notice::error(format!("{} está indisponível", product.name)),
        )
        .await?;
        return Err(AppError::BadRequest(format!(
            "Product {} is out of stock",
            product.id
        )));
    }

    let mut cart = ShoppingCart::restore(storage.clone()).await?;
    let record = cart.add(&product).await?;
    record_in_background(state.entity_store().clone(), record);

    notices::push(
        &storage,
        Notice::success(format!("{} adicionado ao carrinho!", product.name)),
    )
    .await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", product.id.as_str())]),
    );

    Ok(Redirect::to(CART_OPEN_URL))
}

/// Overwrite a line's quantity. Zero or less removes the line.
#[instrument(skip(storage))]
pub async fn update(
    storage: LocalStorage,
    Form(form): Form<UpdateCartForm>,
) -> Result<impl IntoResponse> {
    let mut cart = ShoppingCart::restore(storage.clone()).await?;
    let removing = form.quantity <= 0;

    if cart.set_quantity(&form.product_id, form.quantity).await? && removing {
        notices::push(&storage, Notice::success("Produto removido do carrinho")).await?;
    }

    Ok(Redirect::to(CART_OPEN_URL))
}

/// Remove a line from the cart.
#[instrument(skip(storage))]
pub async fn remove(
    storage: LocalStorage,
    Form(form): Form<ProductForm>,
) -> Result<impl IntoResponse> {
    let mut cart = ShoppingCart::restore(storage.clone()).await?;

    if cart.remove(&form.product_id).await? {
        notices::push(&storage, Notice::success("Produto removido do carrinho")).await?;
    }

    Ok(Redirect::to(CART_OPEN_URL))
}

/// Empty the cart.
#[instrument(skip(storage))]
pub async fn clear(storage: LocalStorage) -> Result<impl IntoResponse> {
    let mut cart = ShoppingCart::restore(storage.clone()).await?;
    cart.clear().await?;
    notices::push(&storage, Notice::success("Carrinho limpo")).await?;

    Ok(Redirect::to(CART_OPEN_URL))
}
