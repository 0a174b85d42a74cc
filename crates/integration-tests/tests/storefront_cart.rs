//! Cart flows against a running storefront.

#![allow(clippy::unwrap_used)]

use lunar_system_integration_tests::{
    API_KEY, FakeEntityStore, TestContext, location, sample_products,
};
use reqwest::StatusCode;

async fn context() -> TestContext {
    TestContext::new(FakeEntityStore::with_products(sample_products())).await
}

#[tokio::test]
async fn test_adding_twice_merges_into_one_line() {
    let ctx = context().await;

    for _ in 0..2 {
        let response = ctx
            .post_form("/cart/add", &[("product_id", "p-netflix")])
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/?cart=open"));
    }

    let (status, body) = ctx.get("/?cart=open").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("cart cart-open"));
    assert_eq!(body.matches("class=\"cart-line\"").count(), 1);
    assert!(body.contains("<span class=\"cart-line-quantity\">2</span>"));
    assert!(body.contains("<span class=\"cart-badge\">2</span>"));
    assert!(body.contains("Subtotal: R$ 20.00"));
    assert!(body.contains("Netflix Premium adicionado ao carrinho!"));
}

#[tokio::test]
async fn test_each_add_is_recorded_remotely() {
    let ctx = context().await;

    ctx.post_form("/cart/add", &[("product_id", "p-netflix")]).await;
    ctx.post_form("/cart/add", &[("product_id", "p-spotify")]).await;

    let records = ctx.store.wait_for_cart_items(2).await;
    let mut product_ids: Vec<&str> = records
        .iter()
        .map(|r| r["productId"].as_str().unwrap())
        .collect();
    product_ids.sort_unstable();
    assert_eq!(product_ids, ["p-netflix", "p-spotify"]);

    for record in &records {
        assert_eq!(record["quantity"], 1);
        assert!(record["sessionId"].as_str().unwrap().starts_with("session_"));
        assert!(record["createdAt"].is_string());
    }
    assert_eq!(records[0]["sessionId"], records[1]["sessionId"]);

    let expected = format!("Bearer {API_KEY}");
    assert!(ctx.store.authorization_headers().contains(&expected));
}

#[tokio::test]
async fn test_failed_remote_record_does_not_block_the_cart() {
    let ctx = context().await;
    ctx.store.set_failing(true);

    let response = ctx
        .post_form("/cart/add", &[("product_id", "p-netflix")])
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let (_, body) = ctx.get("/?cart=open").await;
    assert!(body.contains("<span class=\"cart-line-quantity\">1</span>"));
}

#[tokio::test]
async fn test_quantity_zero_removes_the_line() {
    let ctx = context().await;
    ctx.post_form("/cart/add", &[("product_id", "p-disney")]).await;

    let response = ctx
        .post_form("/cart/update", &[("product_id", "p-disney"), ("quantity", "3")])
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let (_, body) = ctx.get("/?cart=open").await;
    assert!(body.contains("<span class=\"cart-line-quantity\">3</span>"));
    assert!(body.contains("R$ 37.50"));

    ctx.post_form("/cart/update", &[("product_id", "p-disney"), ("quantity", "0")])
        .await;
    let (_, body) = ctx.get("/?cart=open").await;
    assert!(body.contains("Carrinho vazio"));
    assert!(!body.contains("cart-line-quantity"));
}

#[tokio::test]
async fn test_remove_and_clear() {
    let ctx = context().await;
    ctx.post_form("/cart/add", &[("product_id", "p-netflix")]).await;
    ctx.post_form("/cart/add", &[("product_id", "p-spotify")]).await;

    ctx.post_form("/cart/remove", &[("product_id", "p-netflix")])
        .await;
    let (_, body) = ctx.get("/?cart=open").await;
    assert!(body.contains("Produto removido do carrinho"));
    assert_eq!(body.matches("class=\"cart-line\"").count(), 1);
    assert!(body.contains("Spotify Premium"));

    let response = ctx.post_form("/cart/clear", &[]).await;
    assert_eq!(location(&response), Some("/?cart=open"));
    let (_, body) = ctx.get("/?cart=open").await;
    assert!(body.contains("Carrinho limpo"));
    assert!(body.contains("Carrinho vazio"));
}

#[tokio::test]
async fn test_cart_survives_reload_and_is_per_visitor() {
    let ctx = context().await;
    ctx.post_form("/cart/add", &[("product_id", "p-spotify")]).await;

    for _ in 0..2 {
        let (_, body) = ctx.get("/").await;
        assert!(body.contains("<span class=\"cart-badge\">1</span>"));
        assert!(!body.contains("cart cart-open"));
    }

    let stranger = reqwest::Client::new();
    let body = stranger
        .get(ctx.url("/?cart=open"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Carrinho vazio"));
    assert!(!body.contains("cart-badge"));
}

#[tokio::test]
async fn test_unknown_and_out_of_stock_products_are_refused() {
    let ctx = context().await;

    let response = ctx
        .post_form("/cart/add", &[("product_id", "p-missing")])
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ctx
        .post_form("/cart/add", &[("product_id", "p-canva")])
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (_, body) = ctx.get("/?cart=open").await;
    assert!(body.contains("Carrinho vazio"));
    assert!(ctx.store.cart_items().is_empty());
}
