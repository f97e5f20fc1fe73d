//! End-to-end tests for the Shopfront client.
//!
//! [`TestBackend`] is an in-process stand-in for the storefront REST backend,
//! built on axum and bound to `127.0.0.1:0`. It speaks the same JSON, keeps
//! everything in memory, counts every request, and can be told to fail the
//! next call to an endpoint.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session` - login, logout, token expiry and the route guard
//! - `cart_sync` / `wishlist_sync` - collection state against the server
//! - `catalog` - product queries and the catalog cache
//! - `orders` - checkout and cancellation

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{FromRequestParts, Path, Query, Request, State};
use axum::http::{StatusCode, header, request::Parts};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Form, Json, Router};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use shopfront_client::api::REQUEST_ID_HEADER;
use shopfront_client::{ClientConfig, Notice, Storefront};
use shopfront_core::models::Message;
use shopfront_core::{
    AccessToken, CartItem, CartItemId, CartItemUpdate, Category, CategoryId, Email, Identity,
    LoginForm, NewCartItem, NewOrder, NewProduct, NewUser, NewWishlistItem, Order, OrderId,
    OrderStatus, OrderUpdate, Price, Product, ProductId, ProductUpdate, Quantity, Role, UserId,
    WishlistItem, WishlistItemId,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use uuid::Uuid;

pub const CUSTOMER_EMAIL: &str = "ada@shop.test";
pub const SECOND_CUSTOMER_EMAIL: &str = "grace@shop.test";
pub const ADMIN_EMAIL: &str = "root@shop.test";
pub const PASSWORD: &str = "correct horse";

/// $12.50, 40 in stock.
pub const PINEAPPLE: &str = "p-pineapple";
/// $5.00, 3 in stock.
pub const MANGO: &str = "p-mango";
/// $10.00, out of stock.
pub const COCONUT: &str = "p-coconut";
/// Inactive; hidden from listings.
pub const RETIRED: &str = "p-retired";

pub const FRUIT: &str = "c-fruit";
pub const PANTRY: &str = "c-pantry";

// =============================================================================
// In-memory database
// =============================================================================

struct Account {
    identity: Identity,
    password: String,
}

#[derive(Default)]
struct Db {
    accounts: Vec<Account>,
    tokens: HashMap<String, UserId>,
    categories: Vec<Category>,
    products: Vec<Product>,
    carts: HashMap<UserId, Vec<CartItem>>,
    wishlists: HashMap<UserId, Vec<WishlistItem>>,
    orders: Vec<Order>,
    next_id: u64,
    hits: HashMap<String, usize>,
    missing_request_ids: usize,
    failures: HashMap<String, (StatusCode, Option<String>)>,
}

impl Db {
    fn seeded() -> Self {
        let mut db = Self::default();
        db.add_account("u-ada", "ada", CUSTOMER_EMAIL, "Ada Lovelace", Role::Customer);
        db.add_account("u-grace", "grace", SECOND_CUSTOMER_EMAIL, "Grace Hopper", Role::Customer);
        db.add_account("u-root", "root", ADMIN_EMAIL, "Site Admin", Role::Administrator);

        db.categories = vec![
            Category {
                id: CategoryId::new(FRUIT),
                name: "Fruit".to_string(),
                description: Some("Fresh tropical fruit".to_string()),
            },
            Category {
                id: CategoryId::new(PANTRY),
                name: "Pantry".to_string(),
                description: None,
            },
        ];
        db.products = vec![
            seed_product(PINEAPPLE, "Golden Pineapple", 1250, FRUIT, 40, true),
            seed_product(MANGO, "Alphonso Mango", 500, FRUIT, 3, true),
            seed_product(COCONUT, "Coconut Milk", 1000, PANTRY, 0, true),
            seed_product(RETIRED, "Dried Papaya", 300, PANTRY, 12, false),
        ];
        db
    }

    fn add_account(&mut self, id: &str, username: &str, email: &str, name: &str, role: Role) {
        self.accounts.push(Account {
            identity: Identity {
                id: UserId::new(id),
                username: username.to_string(),
                email: Email::parse(email).unwrap(),
                full_name: name.to_string(),
                role,
                is_active: true,
                created_at: None,
                updated_at: None,
            },
            password: PASSWORD.to_string(),
        });
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{:06}", self.next_id)
    }

    fn user_id(&self, email: &str) -> UserId {
        self.accounts
            .iter()
            .find(|a| a.identity.email.as_str() == email)
            .map(|a| a.identity.id.clone())
            .unwrap()
    }

    fn active_product(&self, id: &ProductId) -> Result<Product, Failure> {
        self.products
            .iter()
            .find(|p| &p.id == id && p.is_active)
            .cloned()
            .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Product not found"))
    }

    fn product_mut(&mut self, id: &ProductId) -> Result<&mut Product, Failure> {
        self.products
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Product not found"))
    }
}

fn seed_product(
    id: &str,
    name: &str,
    cents: u32,
    category: &str,
    stock: u32,
    active: bool,
) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        description: format!("{name}, hand picked."),
        price: Price::from_cents(cents),
        category_id: CategoryId::new(category),
        stock_quantity: stock,
        image_url: None,
        is_active: active,
        created_at: None,
        updated_at: None,
    }
}

#[derive(Clone, Default)]
struct Shared(Arc<Mutex<Db>>);

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Db> {
        self.0.lock().unwrap()
    }
}

// =============================================================================
// Errors and extractors
// =============================================================================

/// A non-success response with an optional `{ "detail": ... }` body.
struct Failure(StatusCode, Option<String>);

fn fail(status: StatusCode, detail: &str) -> Failure {
    Failure(status, Some(detail.to_string()))
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        match self.1 {
            Some(detail) => (self.0, Json(json!({ "detail": detail }))).into_response(),
            None => (self.0, Json(json!({}))).into_response(),
        }
    }
}

type Reply<T> = Result<Json<T>, Failure>;

struct CurrentUser(Identity);

impl FromRequestParts<Shared> for CurrentUser {
    type Rejection = Failure;

    async fn from_request_parts(parts: &mut Parts, state: &Shared) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Not authenticated"))?;

        let db = state.lock();
        let user_id = db
            .tokens
            .get(token)
            .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Could not validate credentials"))?;
        db.accounts
            .iter()
            .find(|a| &a.identity.id == user_id)
            .map(|a| Self(a.identity.clone()))
            .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Could not validate credentials"))
    }
}

struct AdminUser;

impl FromRequestParts<Shared> for AdminUser {
    type Rejection = Failure;

    async fn from_request_parts(parts: &mut Parts, state: &Shared) -> Result<Self, Self::Rejection> {
        let CurrentUser(identity) = CurrentUser::from_request_parts(parts, state).await?;
        if identity.is_admin() {
            Ok(Self)
        } else {
            Err(fail(StatusCode::FORBIDDEN, "Not enough permissions"))
        }
    }
}

/// Count the request and apply any injected failure.
async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let key = format!("{} {}", request.method(), request.uri().path());
    let injected = {
        let mut db = state.lock();
        *db.hits.entry(key.clone()).or_default() += 1;
        if !request.headers().contains_key(REQUEST_ID_HEADER) {
            db.missing_request_ids += 1;
        }
        db.failures.remove(&key)
    };
    if let Some((status, detail)) = injected {
        return Failure(status, detail).into_response();
    }
    next.run(request).await
}

// =============================================================================
// Router
// =============================================================================

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/me", get(me))
        .route("/api/v1/products/", get(list_products))
        .route("/api/v1/products/categories", get(list_categories))
        .route("/api/v1/products/categories/{id}", get(get_category))
        .route("/api/v1/products/{id}", get(get_product))
        .route("/api/v1/cart/", get(list_cart).post(add_to_cart).delete(clear_cart))
        .route("/api/v1/cart/{id}", put(update_cart_item).delete(remove_cart_item))
        .route(
            "/api/v1/wishlist/",
            get(list_wishlist).post(add_to_wishlist).delete(clear_wishlist),
        )
        .route("/api/v1/wishlist/{id}", axum::routing::delete(remove_wishlist_item))
        .route("/api/v1/orders/", get(list_orders).post(create_order))
        .route("/api/v1/orders/{id}", get(get_order))
        .route("/api/v1/orders/{id}/cancel", post(cancel_order))
        .route("/api/v1/admin/users", get(admin_users))
        .route("/api/v1/admin/products", get(admin_products).post(admin_create_product))
        .route(
            "/api/v1/admin/products/{id}",
            put(admin_update_product).delete(admin_delete_product),
        )
        .route("/api/v1/admin/categories", get(list_categories_admin))
        .route("/api/v1/admin/orders", get(admin_orders))
        .route("/api/v1/admin/orders/{id}", put(admin_update_order))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

// -----------------------------------------------------------------------------
// Auth
// -----------------------------------------------------------------------------

async fn login(State(state): State<Shared>, Form(form): Form<LoginForm>) -> Reply<AccessToken> {
    let mut db = state.lock();
    let user_id = db
        .accounts
        .iter()
        .find(|a| a.identity.email.as_str() == form.username && a.password == form.password)
        .map(|a| a.identity.id.clone())
        .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Incorrect email or password"))?;
    let token = Uuid::new_v4().to_string();
    db.tokens.insert(token.clone(), user_id);
    Ok(Json(AccessToken {
        access_token: token,
        token_type: "bearer".to_string(),
    }))
}

async fn register(State(state): State<Shared>, Json(user): Json<NewUser>) -> Reply<Identity> {
    let mut db = state.lock();
    if db.accounts.iter().any(|a| a.identity.email == user.email) {
        return Err(fail(StatusCode::BAD_REQUEST, "Email already registered"));
    }
    if db.accounts.iter().any(|a| a.identity.username == user.username) {
        return Err(fail(StatusCode::BAD_REQUEST, "Username already taken"));
    }
    let id = db.next_id("u");
    let identity = Identity {
        id: UserId::new(id),
        username: user.username,
        email: user.email,
        full_name: user.full_name,
        role: Role::Customer,
        is_active: true,
        created_at: None,
        updated_at: None,
    };
    db.accounts.push(Account {
        identity: identity.clone(),
        password: user.password,
    });
    Ok(Json(identity))
}

async fn me(CurrentUser(identity): CurrentUser) -> Json<Identity> {
    Json(identity)
}

// -----------------------------------------------------------------------------
// Catalog
// -----------------------------------------------------------------------------

#[derive(Deserialize)]
struct ListParams {
    #[serde(default)]
    skip: usize,
    limit: Option<usize>,
    category_id: Option<String>,
    search: Option<String>,
    min_price: Option<Decimal>,
    max_price: Option<Decimal>,
}

async fn list_products(
    State(state): State<Shared>,
    Query(params): Query<ListParams>,
) -> Reply<Vec<Product>> {
    let limit = params.limit.unwrap_or(100);
    if !(1..=100).contains(&limit) {
        return Err(fail(StatusCode::UNPROCESSABLE_ENTITY, "limit must be between 1 and 100"));
    }
    let search = params.search.map(|s| s.to_lowercase());
    let db = state.lock();
    let products = db
        .products
        .iter()
        .filter(|p| p.is_active)
        .filter(|p| params.category_id.as_deref().is_none_or(|c| p.category_id.as_str() == c))
        .filter(|p| {
            search.as_deref().is_none_or(|s| {
                p.name.to_lowercase().contains(s) || p.description.to_lowercase().contains(s)
            })
        })
        .filter(|p| params.min_price.is_none_or(|min| p.price.amount() >= min))
        .filter(|p| params.max_price.is_none_or(|max| p.price.amount() <= max))
        .skip(params.skip)
        .take(limit)
        .cloned()
        .collect();
    Ok(Json(products))
}

async fn get_product(State(state): State<Shared>, Path(id): Path<String>) -> Reply<Product> {
    state.lock().active_product(&ProductId::new(id)).map(Json)
}

async fn list_categories(State(state): State<Shared>) -> Json<Vec<Category>> {
    Json(state.lock().categories.clone())
}

async fn get_category(State(state): State<Shared>, Path(id): Path<String>) -> Reply<Category> {
    state
        .lock()
        .categories
        .iter()
        .find(|c| c.id.as_str() == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Category not found"))
}

// -----------------------------------------------------------------------------
// Cart
// -----------------------------------------------------------------------------

async fn list_cart(State(state): State<Shared>, CurrentUser(user): CurrentUser) -> Json<Vec<CartItem>> {
    Json(state.lock().carts.get(&user.id).cloned().unwrap_or_default())
}

async fn add_to_cart(
    State(state): State<Shared>,
    CurrentUser(user): CurrentUser,
    Json(item): Json<NewCartItem>,
) -> Reply<CartItem> {
    let mut db = state.lock();
    let product = db.active_product(&item.product_id)?;
    let id = db.next_id("ci");
    let cart = db.carts.entry(user.id.clone()).or_default();

    if let Some(line) = cart.iter_mut().find(|l| l.product_id == item.product_id) {
        let wanted = line.quantity.get().saturating_add(item.quantity.get());
        if wanted > product.stock_quantity {
            return Err(fail(StatusCode::BAD_REQUEST, "Not enough stock available"));
        }
        line.quantity = Quantity::clamped(i64::from(wanted));
        return Ok(Json(line.clone()));
    }

    if item.quantity.get() > product.stock_quantity {
        return Err(fail(StatusCode::BAD_REQUEST, "Not enough stock available"));
    }
    let line = CartItem {
        id: CartItemId::new(id),
        product_id: item.product_id,
        quantity: item.quantity,
        product,
        user_id: Some(user.id),
        created_at: None,
        updated_at: None,
    };
    cart.push(line.clone());
    Ok(Json(line))
}

async fn update_cart_item(
    State(state): State<Shared>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(update): Json<CartItemUpdate>,
) -> Reply<CartItem> {
    let mut db = state.lock();
    let line = db
        .carts
        .get_mut(&user.id)
        .and_then(|cart| cart.iter_mut().find(|l| l.id.as_str() == id))
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Cart item not found"))?;
    if update.quantity.get() > line.product.stock_quantity {
        return Err(fail(StatusCode::BAD_REQUEST, "Not enough stock available"));
    }
    line.quantity = update.quantity;
    Ok(Json(line.clone()))
}

async fn remove_cart_item(
    State(state): State<Shared>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Reply<Message> {
    let mut db = state.lock();
    let cart = db.carts.entry(user.id).or_default();
    let before = cart.len();
    cart.retain(|l| l.id.as_str() != id);
    if cart.len() == before {
        return Err(fail(StatusCode::NOT_FOUND, "Cart item not found"));
    }
    Ok(Json(message("Item removed from cart")))
}

async fn clear_cart(State(state): State<Shared>, CurrentUser(user): CurrentUser) -> Json<Message> {
    state.lock().carts.remove(&user.id);
    Json(message("Cart cleared"))
}

// -----------------------------------------------------------------------------
// Wishlist
// -----------------------------------------------------------------------------

async fn list_wishlist(
    State(state): State<Shared>,
    CurrentUser(user): CurrentUser,
) -> Json<Vec<WishlistItem>> {
    Json(state.lock().wishlists.get(&user.id).cloned().unwrap_or_default())
}

async fn add_to_wishlist(
    State(state): State<Shared>,
    CurrentUser(user): CurrentUser,
    Json(item): Json<NewWishlistItem>,
) -> Reply<WishlistItem> {
    let mut db = state.lock();
    let product = db.active_product(&item.product_id)?;
    let id = db.next_id("wi");
    let wishlist = db.wishlists.entry(user.id.clone()).or_default();
    if wishlist.iter().any(|w| w.product_id == item.product_id) {
        return Err(fail(StatusCode::BAD_REQUEST, "Product already in wishlist"));
    }
    let entry = WishlistItem {
        id: WishlistItemId::new(id),
        product_id: item.product_id,
        product,
        user_id: Some(user.id),
        created_at: None,
    };
    wishlist.push(entry.clone());
    Ok(Json(entry))
}

async fn remove_wishlist_item(
    State(state): State<Shared>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Reply<Message> {
    let mut db = state.lock();
    let wishlist = db.wishlists.entry(user.id).or_default();
    let before = wishlist.len();
    wishlist.retain(|w| w.id.as_str() != id);
    if wishlist.len() == before {
        return Err(fail(StatusCode::NOT_FOUND, "Wishlist item not found"));
    }
    Ok(Json(message("Item removed from wishlist")))
}

async fn clear_wishlist(
    State(state): State<Shared>,
    CurrentUser(user): CurrentUser,
) -> Json<Message> {
    state.lock().wishlists.remove(&user.id);
    Json(message("Wishlist cleared"))
}

// -----------------------------------------------------------------------------
// Orders
// -----------------------------------------------------------------------------

async fn create_order(
    State(state): State<Shared>,
    CurrentUser(user): CurrentUser,
    Json(order): Json<NewOrder>,
) -> Reply<Order> {
    let mut db = state.lock();
    if order.items.is_empty() {
        return Err(fail(StatusCode::BAD_REQUEST, "Order must contain at least one item"));
    }

    let mut total = Decimal::ZERO;
    for line in &order.items {
        let product = db.active_product(&line.product_id)?;
        if product.stock_quantity < line.quantity.get() {
            return Err(fail(
                StatusCode::BAD_REQUEST,
                &format!("Insufficient stock for product {}", product.name),
            ));
        }
        total += product.price.line_total(line.quantity).amount();
    }
    for line in &order.items {
        let product = db.product_mut(&line.product_id)?;
        product.stock_quantity -= line.quantity.get();
    }

    let id = db.next_id("o");
    let placed = Order {
        id: OrderId::new(id),
        user_id: user.id.clone(),
        items: order.items,
        shipping_address: order.shipping_address,
        total_amount: total,
        status: OrderStatus::Pending,
        created_at: None,
        updated_at: None,
    };
    db.orders.push(placed.clone());
    db.carts.remove(&user.id);
    Ok(Json(placed))
}

async fn list_orders(State(state): State<Shared>, CurrentUser(user): CurrentUser) -> Json<Vec<Order>> {
    let db = state.lock();
    Json(
        db.orders
            .iter()
            .rev()
            .filter(|o| o.user_id == user.id)
            .cloned()
            .collect(),
    )
}

async fn get_order(
    State(state): State<Shared>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Reply<Order> {
    state
        .lock()
        .orders
        .iter()
        .find(|o| o.id.as_str() == id && o.user_id == user.id)
        .cloned()
        .map(Json)
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Order not found"))
}

async fn cancel_order(
    State(state): State<Shared>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Reply<Message> {
    let mut db = state.lock();
    let order = db
        .orders
        .iter_mut()
        .find(|o| o.id.as_str() == id && o.user_id == user.id)
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Order not found"))?;
    if !order.status.is_cancellable() {
        return Err(fail(StatusCode::BAD_REQUEST, "Only pending orders can be cancelled"));
    }
    order.status = OrderStatus::Cancelled;
    let items = order.items.clone();
    for line in &items {
        if let Ok(product) = db.product_mut(&line.product_id) {
            product.stock_quantity += line.quantity.get();
        }
    }
    Ok(Json(message("Order cancelled successfully")))
}

// -----------------------------------------------------------------------------
// Admin
// -----------------------------------------------------------------------------

async fn admin_users(State(state): State<Shared>, _: AdminUser) -> Json<Vec<Identity>> {
    Json(state.lock().accounts.iter().map(|a| a.identity.clone()).collect())
}

async fn admin_products(State(state): State<Shared>, _: AdminUser) -> Json<Vec<Product>> {
    Json(state.lock().products.clone())
}

async fn admin_create_product(
    State(state): State<Shared>,
    _: AdminUser,
    Json(new): Json<NewProduct>,
) -> Reply<Product> {
    let mut db = state.lock();
    let id = db.next_id("p");
    let product = Product {
        id: ProductId::new(id),
        name: new.name,
        description: new.description,
        price: new.price,
        category_id: new.category_id,
        stock_quantity: new.stock_quantity,
        image_url: new.image_url,
        is_active: new.is_active,
        created_at: None,
        updated_at: None,
    };
    db.products.push(product.clone());
    Ok(Json(product))
}

async fn admin_update_product(
    State(state): State<Shared>,
    _: AdminUser,
    Path(id): Path<String>,
    Json(update): Json<ProductUpdate>,
) -> Reply<Product> {
    let mut db = state.lock();
    let product = db.product_mut(&ProductId::new(id))?;
    if let Some(name) = update.name {
        product.name = name;
    }
    if let Some(description) = update.description {
        product.description = description;
    }
    if let Some(price) = update.price {
        product.price = price;
    }
    if let Some(category_id) = update.category_id {
        product.category_id = category_id;
    }
    if let Some(stock) = update.stock_quantity {
        product.stock_quantity = stock;
    }
    if update.image_url.is_some() {
        product.image_url = update.image_url;
    }
    if let Some(active) = update.is_active {
        product.is_active = active;
    }
    Ok(Json(product.clone()))
}

async fn admin_delete_product(
    State(state): State<Shared>,
    _: AdminUser,
    Path(id): Path<String>,
) -> Reply<Message> {
    let mut db = state.lock();
    let before = db.products.len();
    db.products.retain(|p| p.id.as_str() != id);
    if db.products.len() == before {
        return Err(fail(StatusCode::NOT_FOUND, "Product not found"));
    }
    Ok(Json(message("Product deleted successfully")))
}

async fn list_categories_admin(State(state): State<Shared>, _: AdminUser) -> Json<Vec<Category>> {
    Json(state.lock().categories.clone())
}

async fn admin_orders(State(state): State<Shared>, _: AdminUser) -> Json<Vec<Order>> {
    Json(state.lock().orders.clone())
}

async fn admin_update_order(
    State(state): State<Shared>,
    _: AdminUser,
    Path(id): Path<String>,
    Json(update): Json<OrderUpdate>,
) -> Reply<Order> {
    let mut db = state.lock();
    let order = db
        .orders
        .iter_mut()
        .find(|o| o.id.as_str() == id)
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Order not found"))?;
    if let Some(status) = update.status {
        order.status = status;
    }
    if let Some(address) = update.shipping_address {
        order.shipping_address = address;
    }
    Ok(Json(order.clone()))
}

fn message(text: &str) -> Message {
    Message {
        message: text.to_string(),
    }
}

// =============================================================================
// Test harness
// =============================================================================

/// A running fake backend. The server task stops when this is dropped.
pub struct TestBackend {
    addr: SocketAddr,
    state: Shared,
    server: JoinHandle<()>,
}

impl TestBackend {
    /// Start a seeded backend on an ephemeral port.
    pub async fn start() -> Self {
        let state = Shared(Arc::new(Mutex::new(Db::seeded())));
        let app = router(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            addr,
            state,
            server,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    #[must_use]
    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(&self.base_url()).unwrap()
    }

    /// A fresh root context pointed at this backend.
    #[must_use]
    pub fn storefront(&self) -> Storefront {
        Storefront::new(&self.config()).unwrap()
    }

    /// Requests seen for `method` and exact `path` (e.g. `"GET", "/api/v1/cart/"`).
    #[must_use]
    pub fn hits(&self, method: &str, path: &str) -> usize {
        let key = format!("{method} {path}");
        self.state.lock().hits.get(&key).copied().unwrap_or(0)
    }

    /// Requests whose path starts with `prefix`, any method.
    #[must_use]
    pub fn hits_under(&self, prefix: &str) -> usize {
        self.state
            .lock()
            .hits
            .iter()
            .filter(|(key, _)| key.split_once(' ').is_some_and(|(_, path)| path.starts_with(prefix)))
            .map(|(_, n)| n)
            .sum()
    }

    #[must_use]
    pub fn total_hits(&self) -> usize {
        self.state.lock().hits.values().sum()
    }

    #[must_use]
    pub fn missing_request_ids(&self) -> usize {
        self.state.lock().missing_request_ids
    }

    /// Fail the next request to `method path` with `status`.
    pub fn fail_next(&self, method: &str, path: &str, status: u16, detail: Option<&str>) {
        let status = StatusCode::from_u16(status).unwrap();
        self.state.lock().failures.insert(
            format!("{method} {path}"),
            (status, detail.map(ToString::to_string)),
        );
    }

    /// Invalidate every issued token, as if they had expired.
    pub fn expire_tokens(&self) {
        self.state.lock().tokens.clear();
    }

    #[must_use]
    pub fn cart_of(&self, email: &str) -> Vec<CartItem> {
        let db = self.state.lock();
        let user = db.user_id(email);
        db.carts.get(&user).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn wishlist_of(&self, email: &str) -> Vec<WishlistItem> {
        let db = self.state.lock();
        let user = db.user_id(email);
        db.wishlists.get(&user).cloned().unwrap_or_default()
    }

    /// Put a line in someone's cart without going through the client.
    pub fn put_in_cart(&self, email: &str, product: &str, quantity: u32) {
        let mut db = self.state.lock();
        let user = db.user_id(email);
        let product = db.active_product(&ProductId::new(product)).ok().unwrap();
        let id = db.next_id("ci");
        db.carts.entry(user.clone()).or_default().push(CartItem {
            id: CartItemId::new(id),
            product_id: product.id.clone(),
            quantity: Quantity::new(quantity).unwrap(),
            product,
            user_id: Some(user),
            created_at: None,
            updated_at: None,
        });
    }

    /// Rename a product directly in the database.
    pub fn rename_product(&self, id: &str, name: &str) {
        let mut db = self.state.lock();
        if let Ok(product) = db.product_mut(&ProductId::new(id)) {
            product.name = name.to_string();
        }
    }

    #[must_use]
    pub fn stock_of(&self, id: &str) -> u32 {
        let db = self.state.lock();
        db.products
            .iter()
            .find(|p| p.id.as_str() == id)
            .map(|p| p.stock_quantity)
            .unwrap()
    }
}

impl Drop for TestBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Everything published on a notice receiver so far.
pub fn drain(notices: &mut broadcast::Receiver<Notice>) -> Vec<Notice> {
    let mut out = Vec::new();
    while let Ok(notice) = notices.try_recv() {
        out.push(notice);
    }
    out
}

/// Just the message texts of [`drain`].
pub fn drain_messages(notices: &mut broadcast::Receiver<Notice>) -> Vec<String> {
    drain(notices).into_iter().map(|n| n.message).collect()
}
