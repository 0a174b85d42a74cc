//! Health probes and response headers.

#![allow(clippy::unwrap_used)]

use lunar_system_integration_tests::{FakeEntityStore, TestContext, sample_products};
use reqwest::StatusCode;

#[tokio::test]
async fn test_health_and_readiness() {
    let ctx = TestContext::new(FakeEntityStore::with_products(sample_products())).await;

    let (status, body) = ctx.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");

    let (status, _) = ctx.get("/health/ready").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_after_failed_fetch() {
    let store = FakeEntityStore::with_products(sample_products());
    store.set_failing(true);
    let ctx = TestContext::new(store).await;

    let (status, _) = ctx.get("/health/ready").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_security_headers_allow_google_sign_in() {
    let ctx = TestContext::new(FakeEntityStore::with_products(sample_products())).await;

    let response = ctx.client.get(ctx.url("/")).send().await.unwrap();
    let headers = response.headers();

    let csp = headers
        .get("content-security-policy")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(csp.contains("https://accounts.google.com/gsi/client"));
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(
        headers.get("cross-origin-opener-policy").unwrap(),
        "same-origin-allow-popups"
    );
    assert!(headers.get("cross-origin-embedder-policy").is_none());
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let ctx = TestContext::new(FakeEntityStore::with_products(sample_products())).await;

    let response = ctx
        .client
        .get(ctx.url("/health"))
        .header("x-request-id", "edge-42")
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers().get("x-request-id").unwrap(), "edge-42");

    let response = ctx.client.get(ctx.url("/health")).send().await.unwrap();
    let generated = response.headers().get("x-request-id").unwrap().to_str().unwrap();
    assert!(!generated.is_empty());
    assert_ne!(generated, "edge-42");
}

#[tokio::test]
async fn test_static_assets_are_served() {
    let ctx = TestContext::new(FakeEntityStore::with_products(sample_products())).await;

    let (status, body) = ctx.get("/static/js/storefront.js").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("g_csrf_token"));
}
