//! End-to-end tests for the Lunar System storefront.
//!
//! Each test spawns the real storefront router on an ephemeral port, backed
//! by an in-memory session store and a fake entity store that speaks the
//! same `/entities/{collection}` JSON as the remote service.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p lunar-system-integration-tests
//! ```
//!
//! No database or network access is needed.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use lunar_system_storefront::build_router;
use lunar_system_storefront::config::{
    EntityStoreConfig, SentryConfig, StorefrontConfig,
};
use lunar_system_storefront::services::CatalogStatus;
use lunar_system_storefront::state::AppState;
use reqwest::{Client, cookie::Jar, redirect};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower_sessions::MemoryStore;
use url::Url;

/// Google client ID the test storefront is configured with.
pub const CLIENT_ID: &str = "lunar-test.apps.googleusercontent.com";

/// Bearer token the storefront sends to the fake entity store.
pub const API_KEY: &str = "lunar-test-key";

/// A product in the entity store's JSON shape.
#[must_use]
pub fn product(id: &str, name: &str, brand: &str, category: &str, price: f64, in_stock: bool) -> Value {
    json!({
        "_id": id,
        "name": name,
        "category": category,
        "currentPrice": price,
        "inStock": in_stock,
        "description": format!("Assinatura {name}"),
        "brand": brand,
        "imageClass": format!("art-{}", brand.to_lowercase()),
        "duration": "30 dias",
    })
}

/// The catalog most tests run against.
#[must_use]
pub fn sample_products() -> Vec<Value> {
    vec![
        product("p-netflix", "Netflix Premium", "Netflix", "streaming", 10.0, true),
        product("p-disney", "Disney Plus", "Disney", "streaming", 12.5, true),
        product("p-spotify", "Spotify Premium", "Spotify", "musica", 8.0, true),
        product("p-canva", "Canva Pro", "Canva", "ferramentas", 15.0, false),
    ]
}

/// Build a Google ID token carrying `claims`. The signature segment is junk.
#[must_use]
pub fn credential(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

/// Claims for a valid sign-in as Ana.
#[must_use]
pub fn ana_claims() -> Value {
    json!({
        "sub": "google-ana",
        "email": "ana@lunar.test",
        "name": "Ana Souza",
        "picture": "https://lh3.googleusercontent.com/a/ana",
        "aud": CLIENT_ID,
        "exp": chrono::Utc::now().timestamp() + 3600,
    })
}

/// In-process stand-in for the remote entity store.
#[derive(Clone, Default)]
pub struct FakeEntityStore {
    inner: Arc<FakeEntityStoreInner>,
}

#[derive(Default)]
struct FakeEntityStoreInner {
    products: Mutex<Option<Vec<Value>>>,
    failing: AtomicBool,
    cart_items: Mutex<Vec<Value>>,
    authorization: Mutex<Vec<String>>,
}

impl FakeEntityStore {
    /// A store whose product list is `products`.
    #[must_use]
    pub fn with_products(products: Vec<Value>) -> Self {
        let store = Self::default();
        *lock(&store.inner.products) = Some(products);
        store
    }

    /// Make every request answer 500 (or recover with `false`).
    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    /// Replace the product list.
    pub fn set_products(&self, products: Vec<Value>) {
        *lock(&self.inner.products) = Some(products);
    }

    /// Add-to-cart records received so far.
    #[must_use]
    pub fn cart_items(&self) -> Vec<Value> {
        lock(&self.inner.cart_items).clone()
    }

    /// `Authorization` headers seen so far.
    #[must_use]
    pub fn authorization_headers(&self) -> Vec<String> {
        lock(&self.inner.authorization).clone()
    }

    /// Wait until at least `count` add-to-cart records arrived.
    ///
    /// Records are sent in the background, so they may land after the
    /// storefront has already answered.
    ///
    /// # Panics
    ///
    /// Panics if they do not arrive within five seconds.
    pub async fn wait_for_cart_items(&self, count: usize) -> Vec<Value> {
        for _ in 0..100 {
            let items = self.cart_items();
            if items.len() >= count {
                return items;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!(
            "expected {count} cart item records, got {}",
            self.cart_items().len()
        );
    }

    /// Serve the store on an ephemeral local port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn(&self) -> SocketAddr {
        let app = Router::new()
            .route("/entities/products", get(list_products))
            .route("/entities/cart_items", post(create_cart_item))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake entity store");
        let addr = listener.local_addr().expect("fake entity store address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        addr
    }

    fn record_authorization(&self, headers: &HeaderMap) {
        if let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
            lock(&self.inner.authorization).push(value.to_string());
        }
    }

    fn is_failing(&self) -> bool {
        self.inner.failing.load(Ordering::SeqCst)
    }
}

async fn list_products(State(store): State<FakeEntityStore>, headers: HeaderMap) -> Response {
    store.record_authorization(&headers);
    if store.is_failing() {
        return (StatusCode::INTERNAL_SERVER_ERROR, "store unavailable").into_response();
    }

    let list = lock(&store.inner.products).clone();
    Json(json!({ "list": list })).into_response()
}

async fn create_cart_item(
    State(store): State<FakeEntityStore>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    store.record_authorization(&headers);
    if store.is_failing() {
        return (StatusCode::INTERNAL_SERVER_ERROR, "store unavailable").into_response();
    }

    let mut created = body.clone();
    created["_id"] = json!(format!("ci-{}", lock(&store.inner.cart_items).len() + 1));
    lock(&store.inner.cart_items).push(body);
    (StatusCode::CREATED, Json(created)).into_response()
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A running storefront plus a cookie-keeping client that does not follow
/// redirects.
pub struct TestContext {
    pub client: Client,
    pub jar: Arc<Jar>,
    pub base_url: Url,
    pub state: AppState,
    pub store: FakeEntityStore,
}

impl TestContext {
    /// Spawn a storefront whose catalog has already been fetched from `store`.
    ///
    /// # Panics
    ///
    /// Panics if the servers cannot be started.
    pub async fn new(store: FakeEntityStore) -> Self {
        let ctx = Self::loading(store).await;
        ctx.state.catalog().fetch(ctx.state.entity_store()).await;
        ctx
    }

    /// Spawn a storefront whose catalog has not been fetched yet.
    ///
    /// # Panics
    ///
    /// Panics if the servers cannot be started.
    pub async fn loading(store: FakeEntityStore) -> Self {
        Self::with_client_id(store, Some(CLIENT_ID.to_string())).await
    }

    /// Spawn an unfetched storefront with the given Google client ID.
    ///
    /// # Panics
    ///
    /// Panics if the servers cannot be started.
    pub async fn with_client_id(store: FakeEntityStore, google_client_id: Option<String>) -> Self {
        let store_addr = store.spawn().await;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind storefront");
        let addr = listener.local_addr().expect("storefront address");

        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://unused"),
            host: addr.ip(),
            port: addr.port(),
            base_url: format!("http://{addr}"),
            entity_store: EntityStoreConfig {
                base_url: Url::parse(&format!("http://{store_addr}")).expect("store url"),
                api_key: Some(SecretString::from(API_KEY)),
            },
            google_client_id,
            sentry: SentryConfig::default(),
        };

        let state = AppState::new(config).expect("app state");
        let app = build_router(state.clone(), MemoryStore::default());

        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .ok();
        });

        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .redirect(redirect::Policy::none())
            .build()
            .expect("http client");

        Self {
            client,
            jar,
            base_url: Url::parse(&format!("http://{addr}/")).expect("base url"),
            state,
            store,
        }
    }

    /// Absolute URL of `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map(String::from)
            .unwrap_or_else(|_| format!("{}{path}", self.base_url))
    }

    /// GET `path` and return status and body.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request");
        let status = response.status();
        let body = response.text().await.expect("response body");
        (status, body)
    }

    /// POST a form to `path` without following the redirect.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request")
    }

    /// Set a cookie on the storefront's origin, as the browser would.
    pub fn set_cookie(&self, cookie: &str) {
        self.jar.add_cookie_str(cookie, &self.base_url);
    }

    /// Sign in through the credential callback with a matching CSRF pair.
    pub async fn sign_in(&self, claims: &Value) -> reqwest::Response {
        self.set_cookie("g_csrf_token=csrf-123; Path=/");
        self.post_form(
            "/auth/google/callback",
            &[
                ("credential", credential(claims).as_str()),
                ("g_csrf_token", "csrf-123"),
            ],
        )
        .await
    }

    /// Whether the catalog finished its last fetch successfully.
    #[must_use]
    pub fn catalog_ready(&self) -> bool {
        self.state.catalog().status() == CatalogStatus::Ready
    }
}

/// `Location` header of a redirect.
#[must_use]
pub fn location(response: &reqwest::Response) -> Option<&str> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
}
