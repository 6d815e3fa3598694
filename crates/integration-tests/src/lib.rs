//! Integration tests for Vitrine.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p vitrine-integration-tests
//! ```
//!
//! No external services are needed: [`FakeCatalog`] serves an in-memory copy
//! of the catalog API on an ephemeral local port, under the same
//! `/api/v1` prefix as the real service.
//!
//! # Test Categories
//!
//! - `catalog_client` - Listing, lookup, caching and error mapping
//! - `auth_session` - Login, registration, restore and logout
//! - `storefront_state` - Cart and favorites over file storage

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

use vitrine_storefront::catalog::CatalogClient;
use vitrine_storefront::config::StorefrontConfig;

/// Path prefix of every fake endpoint.
pub const API_PREFIX: &str = "/api/v1";

/// Credentials of the account present from the start.
pub const SEED_EMAIL: &str = "john@mail.com";
pub const SEED_PASSWORD: &str = "changeme";

/// Number of products served by `/products`.
pub const PRODUCT_COUNT: usize = 10;

type Shared = Arc<FakeState>;

struct FakeState {
    products: Vec<Value>,
    categories: Vec<Value>,
    users: Mutex<Vec<FakeUser>>,
    hits: Mutex<HashMap<String, usize>>,
    failure: Mutex<Option<StatusCode>>,
}

#[derive(Clone)]
struct FakeUser {
    id: i64,
    name: String,
    email: String,
    password: String,
    avatar: String,
}

impl FakeUser {
    fn to_json(&self) -> Value {
        // The real service echoes the password back
        json!({
            "id": self.id,
            "email": self.email,
            "password": self.password,
            "name": self.name,
            "role": "customer",
            "avatar": self.avatar,
            "creationAt": "2025-01-15T10:00:00.000Z",
            "updatedAt": "2025-01-15T10:00:00.000Z",
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process fake of the catalog and auth service.
///
/// The server task stops when the value is dropped.
pub struct FakeCatalog {
    addr: SocketAddr,
    state: Shared,
    server: JoinHandle<()>,
}

impl FakeCatalog {
    /// Bind to an ephemeral port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn start() -> std::io::Result<Self> {
        let state: Shared = Arc::new(FakeState {
            products: sample_products(),
            categories: sample_categories(),
            users: Mutex::new(vec![FakeUser {
                id: 1,
                name: "John".to_string(),
                email: SEED_EMAIL.to_string(),
                password: SEED_PASSWORD.to_string(),
                avatar: "https://i.imgur.com/LDOO4Qs.jpg".to_string(),
            }]),
            hits: Mutex::new(HashMap::new()),
            failure: Mutex::new(None),
        });

        let api = Router::new()
            .route("/products", get(list_products))
            .route("/products/{id}", get(get_product))
            .route("/categories", get(list_categories))
            .route("/categories/{id}/products", get(category_products))
            .route("/auth/login", post(login))
            .route("/auth/profile", get(profile))
            .route("/users", post(create_user));

        let app = Router::new()
            .nest(API_PREFIX, api)
            .layer(middleware::from_fn_with_state(state.clone(), track))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            state,
            server,
        })
    }

    /// Base URL to configure the client with.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}{API_PREFIX}", self.addr)
    }

    /// Default configuration pointed at this server.
    ///
    /// # Panics
    ///
    /// Never in practice: the base URL is always a valid URL.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        let mut config = StorefrontConfig::default();
        config.catalog.api_url = self
            .base_url()
            .parse()
            .unwrap_or_else(|e| panic!("fake catalog URL is invalid: {e}"));
        config
    }

    /// A fresh client (with its own cache) for this server.
    #[must_use]
    pub fn client(&self) -> CatalogClient {
        CatalogClient::new(&self.config().catalog)
    }

    /// Requests received for `path` (relative to [`API_PREFIX`]).
    #[must_use]
    pub fn hits(&self, path: &str) -> usize {
        lock(&self.state.hits).get(path).copied().unwrap_or(0)
    }

    /// Answer every following request with `status` and an error body.
    pub fn fail_with(&self, status: StatusCode) {
        *lock(&self.state.failure) = Some(status);
    }

    /// Serve normally again.
    pub fn recover(&self) {
        *lock(&self.state.failure) = None;
    }

    /// Whether an account exists for `email`.
    #[must_use]
    pub fn has_user(&self, email: &str) -> bool {
        lock(&self.state.users).iter().any(|u| u.email == email)
    }
}

impl Drop for FakeCatalog {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn track(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let path = request.uri().path();
    let path = path.strip_prefix(API_PREFIX).unwrap_or(path).to_string();
    *lock(&state.hits).entry(path).or_insert(0) += 1;

    let failure = *lock(&state.failure);
    if let Some(status) = failure {
        return (
            status,
            Json(json!({"message": "Simulated failure", "statusCode": status.as_u16()})),
        )
            .into_response();
    }

    next.run(request).await
}

async fn list_products(State(state): State<Shared>) -> Json<Value> {
    Json(Value::Array(state.products.clone()))
}

async fn get_product(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let found = id.parse::<i64>().ok().and_then(|id| {
        state
            .products
            .iter()
            .find(|p| p["id"].as_i64() == Some(id))
            .cloned()
    });
    match found {
        Some(product) => Json(product).into_response(),
        None => entity_not_found("Product", &id),
    }
}

async fn list_categories(State(state): State<Shared>) -> Json<Value> {
    Json(Value::Array(state.categories.clone()))
}

async fn category_products(State(state): State<Shared>, Path(id): Path<i64>) -> Json<Value> {
    let products = state
        .products
        .iter()
        .filter(|p| p["category"]["id"].as_i64() == Some(id))
        .cloned()
        .collect();
    Json(Value::Array(products))
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let user = lock(&state.users)
        .iter()
        .find(|u| u.email == email && u.password == password)
        .cloned();

    match user {
        Some(user) => (
            StatusCode::CREATED,
            Json(json!({
                "access_token": format!("token-{}", user.id),
                "refresh_token": format!("refresh-{}", user.id),
            })),
        )
            .into_response(),
        None => unauthorized(),
    }
}

async fn profile(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let id = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer token-"))
        .and_then(|v| v.parse::<i64>().ok());

    let user = id.and_then(|id| lock(&state.users).iter().find(|u| u.id == id).cloned());
    match user {
        Some(user) => Json(user.to_json()).into_response(),
        None => unauthorized(),
    }
}

async fn create_user(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let field = |name: &str| body[name].as_str().unwrap_or_default().to_string();
    let (name, email, password, avatar) =
        (field("name"), field("email"), field("password"), field("avatar"));

    if !email.contains('@') || name.is_empty() || password.len() < 4 {
        return bad_request(&["email must be an email"]);
    }

    let mut users = lock(&state.users);
    if users.iter().any(|u| u.email == email) {
        return bad_request(&["email already registered"]);
    }

    let user = FakeUser {
        id: users.iter().map(|u| u.id).max().unwrap_or(0) + 1,
        name,
        email,
        password,
        avatar,
    };
    users.push(user.clone());
    (StatusCode::CREATED, Json(user.to_json())).into_response()
}

fn entity_not_found(kind: &str, id: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "message": format!("Could not find any entity of type \"{kind}\" matching: {{\"id\": {id}}}"),
            "error": "Bad Request",
            "statusCode": 400,
        })),
    )
        .into_response()
}

fn bad_request(messages: &[&str]) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"message": messages, "error": "Bad Request", "statusCode": 400})),
    )
        .into_response()
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Unauthorized", "statusCode": 401})),
    )
        .into_response()
}

// =============================================================================
// Fixtures
// =============================================================================

fn category(id: i64) -> Value {
    let (name, image) = match id {
        1 => ("Clothes", "https://i.imgur.com/QkIa5tT.jpeg"),
        2 => ("Electronics", "https://i.imgur.com/ZANVnHE.jpeg"),
        _ => ("Furniture", "https://i.imgur.com/Qphac99.jpeg"),
    };
    json!({"id": id, "name": name, "image": image, "slug": name.to_lowercase()})
}

/// Categories served by `/categories`.
#[must_use]
pub fn sample_categories() -> Vec<Value> {
    (1..=3).map(category).collect()
}

/// Products served by `/products`, in catalog order.
///
/// Product 3 carries the double-encoded image list the real service
/// sometimes returns; product 10 costs more than the default price filter
/// allows.
#[must_use]
pub fn sample_products() -> Vec<Value> {
    let rows: [(i64, &str, f64, i64, &str); PRODUCT_COUNT] = [
        (1, "Classic Red Pullover Hoodie", 10.0, 1, "Soft cotton hoodie in bold red"),
        (2, "Classic Heather Gray Hoodie", 5.0, 1, "Everyday hoodie, cozy and warm"),
        (3, "Wireless Headphones", 99.9, 2, "Noise cancelling over-ear headphones"),
        (4, "Classic Black T-Shirt", 35.0, 1, "Essential tee for every wardrobe"),
        (5, "Sleek Smartwatch", 149.99, 2, "Fitness tracking with a bright display"),
        (6, "Modern Desk Lamp", 42.5, 3, "Adjustable LED lamp for the desk"),
        (7, "Running Shoes", 79.0, 1, "Lightweight shoes built for distance"),
        (8, "Mechanical Keyboard", 120.0, 2, "Tactile switches and RGB backlight"),
        (9, "Wooden Chair", 60.0, 3, "Solid oak chair with a classic profile"),
        (10, "Leather Sofa", 1500.0, 3, "Three-seat sofa in full-grain leather"),
    ];

    rows.iter()
        .map(|&(id, title, price, category_id, description)| {
            let images = if id == 3 {
                json!(["[\"https://i.imgur.com/a.jpeg\"", "\"https://i.imgur.com/b.jpeg\"]"])
            } else {
                json!([format!("https://i.imgur.com/p{id}.jpeg")])
            };
            json!({
                "id": id,
                "title": title,
                "slug": title.to_lowercase().replace(' ', "-"),
                "price": price,
                "description": description,
                "category": category(category_id),
                "images": images,
                "creationAt": "2025-01-15T10:00:00.000Z",
                "updatedAt": "2025-01-15T10:00:00.000Z",
            })
        })
        .collect()
}
