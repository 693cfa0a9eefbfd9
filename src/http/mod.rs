//! HTTP surface: catalog, cart and checkout endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

use crate::catalog::CatalogProvider;
use crate::checkout::{CheckoutActivation, CheckoutNotice, PaymentSignal};
use crate::domain::aggregates::{CartLineItem, CartStore, Order, Product, ProductDraft, ProductUpdate, ProductView, Selection};
use crate::domain::value_objects::{Axis, Money};
use crate::{PosError, Result};

#[derive(Clone)]
pub struct AppState {
    pub cart: Arc<Mutex<CartStore>>,
    pub catalog: Arc<dyn CatalogProvider>,
}

impl AppState {
    pub fn new(cart: CartStore, catalog: impl CatalogProvider + 'static) -> Self {
        Self { cart: Arc::new(Mutex::new(cart)), catalog: Arc::new(catalog) }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "minipos"})) }))
        .route("/api/v1/products", get(list_products).post(create_product))
        .route("/api/v1/products/:id", get(get_product).put(update_product).delete(delete_product))
        .route("/api/v1/products/:id/view", get(product_view))
        .route("/api/v1/products/:id/cart", post(add_selection_to_cart))
        .route("/api/v1/products/:id/variants/:index", delete(delete_variant))
        .route("/api/v1/cart", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route("/api/v1/cart/remove", post(remove_from_cart))
        .route("/api/v1/orders", get(list_orders))
        .route("/checkout", get(checkout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

impl IntoResponse for PosError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::ProductNotFound(_) | Self::VariantNotFound { .. } => StatusCode::NOT_FOUND,
            Self::NoMatchingVariant | Self::EmptyCart => StatusCode::CONFLICT,
            Self::InvalidProduct(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::StorageError(_) | Self::Serialization(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartLineItem>,
    pub item_count: usize,
    pub total: Money,
    pub formatted_total: String,
}

impl From<&CartStore> for CartResponse {
    fn from(cart: &CartStore) -> Self {
        let total = cart.total();
        Self { items: cart.items().to_vec(), item_count: cart.item_count(), total, formatted_total: total.to_string() }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisOptions {
    pub storage: Vec<String>,
    pub color: Vec<String>,
    pub set_type: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductViewResponse {
    pub product: Product,
    pub selection: Selection,
    pub options: AxisOptions,
    pub price: Option<Money>,
    pub formatted_price: Option<String>,
    pub can_add_to_cart: bool,
}

impl From<&ProductView> for ProductViewResponse {
    fn from(view: &ProductView) -> Self {
        let price = view.price();
        Self {
            product: view.product().clone(),
            selection: view.selection().clone(),
            options: AxisOptions {
                storage: view.options(Axis::Storage),
                color: view.options(Axis::Color),
                set_type: view.options(Axis::SetType),
            },
            price,
            formatted_price: price.map(|p| p.to_string()),
            can_add_to_cart: view.can_add_to_cart(),
        }
    }
}

/// Log and drop whatever the last mutation raised.
fn drain_events(cart: &mut CartStore) {
    for event in cart.take_events() {
        debug!(?event, "cart event");
    }
}

async fn list_products(State(s): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(s.catalog.list_products()?))
}

async fn get_product(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>> {
    Ok(Json(s.catalog.get_product(&id)?))
}

async fn create_product(State(s): State<AppState>, Json(draft): Json<ProductDraft>) -> Result<(StatusCode, Json<Product>)> {
    Ok((StatusCode::CREATED, Json(s.catalog.create_product(draft)?)))
}

async fn update_product(State(s): State<AppState>, Path(id): Path<String>, Json(update): Json<ProductUpdate>) -> Result<Json<Product>> {
    Ok(Json(s.catalog.update_product(&id, update)?))
}

async fn delete_product(State(s): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    s.catalog.delete_product(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_variant(State(s): State<AppState>, Path((id, index)): Path<(String, usize)>) -> Result<Json<Product>> {
    Ok(Json(s.catalog.delete_variant(&id, index)?))
}

async fn product_view(State(s): State<AppState>, Path(id): Path<String>, Query(selection): Query<Selection>) -> Result<Json<ProductViewResponse>> {
    let view = ProductView::with_selection(s.catalog.get_product(&id)?, selection);
    Ok(Json(ProductViewResponse::from(&view)))
}

async fn add_selection_to_cart(State(s): State<AppState>, Path(id): Path<String>, Json(selection): Json<Selection>) -> Result<(StatusCode, Json<CartLineItem>)> {
    let view = ProductView::with_selection(s.catalog.get_product(&id)?, selection);
    let item = view.line_item().ok_or(PosError::NoMatchingVariant)?;
    let mut cart = s.cart.lock().await;
    cart.add_to_cart(item.clone());
    drain_events(&mut cart);
    Ok((StatusCode::CREATED, Json(item)))
}

async fn get_cart(State(s): State<AppState>) -> Json<CartResponse> {
    Json(CartResponse::from(&*s.cart.lock().await))
}

async fn add_to_cart(State(s): State<AppState>, Json(item): Json<CartLineItem>) -> (StatusCode, Json<CartResponse>) {
    let mut cart = s.cart.lock().await;
    cart.add_to_cart(item);
    drain_events(&mut cart);
    (StatusCode::CREATED, Json(CartResponse::from(&*cart)))
}

#[derive(Debug, Serialize)]
pub struct RemoveResponse {
    pub removed: usize,
    pub cart: CartResponse,
}

async fn remove_from_cart(State(s): State<AppState>, Json(target): Json<CartLineItem>) -> Json<RemoveResponse> {
    let mut cart = s.cart.lock().await;
    let removed = cart.remove_from_cart(&target);
    drain_events(&mut cart);
    Json(RemoveResponse { removed, cart: CartResponse::from(&*cart) })
}

async fn clear_cart(State(s): State<AppState>) -> StatusCode {
    let mut cart = s.cart.lock().await;
    cart.clear_cart();
    drain_events(&mut cart);
    StatusCode::NO_CONTENT
}

async fn list_orders(State(s): State<AppState>) -> Json<Vec<Order>> {
    Json(s.cart.lock().await.orders().to_vec())
}

#[derive(Debug, Deserialize)]
pub struct CheckoutQuery {
    pub payment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NoticeBody {
    pub kind: CheckoutNotice,
    pub message: &'static str,
    pub warning: bool,
}

impl From<CheckoutNotice> for NoticeBody {
    fn from(kind: CheckoutNotice) -> Self {
        Self { kind, message: kind.message(), warning: kind.is_warning() }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub cart: CartResponse,
    pub notice: Option<NoticeBody>,
    pub order: Option<Order>,
    pub redirect: Option<&'static str>,
}

/// Each request is one view activation with its own latch.
async fn checkout(State(s): State<AppState>, Query(q): Query<CheckoutQuery>) -> Json<CheckoutResponse> {
    let mut activation = CheckoutActivation::new(PaymentSignal::from_query(q.payment.as_deref()));
    let mut cart = s.cart.lock().await;
    let outcome = activation.consume(&mut cart);
    drain_events(&mut cart);
    Json(CheckoutResponse {
        cart: CartResponse::from(&*cart),
        notice: outcome.notice.map(NoticeBody::from),
        order: outcome.order,
        redirect: outcome.redirect,
    })
}
