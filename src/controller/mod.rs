use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use log::{debug, error};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::clients::{OfflinePaymentGateway, PaymentGateway};
use crate::errors::Error;
use crate::forms::{BeerAddForm, ChangeQtyForm, LoginForm, OrderForm, PizzaAddForm, RegistrationForm};
use crate::models::{
    CartContents, CartOwner, Customer, OrderId, OrderState, ProductId, ProductKind, ProductRef,
    SessionId, UserId,
};
use crate::repos::ProductRegistry;
use crate::services::{
    AccountService, AccountServiceImpl, CartService, CartServiceImpl, CatalogService,
    CatalogServiceImpl, OrderService, OrderServiceImpl, SystemService, SystemServiceImpl,
};
use crate::types::DbPool;

pub mod routing;

pub const SESSION_HEADER: &str = "x-session-id";

#[derive(Clone)]
pub struct AppState {
    pub system: Arc<dyn SystemService>,
    pub catalog: Arc<dyn CatalogService>,
    pub cart: Arc<dyn CartService>,
    pub orders: Arc<dyn OrderService>,
    pub accounts: Arc<dyn AccountService>,
    pub payments: Arc<dyn PaymentGateway>,
}

impl AppState {
    pub fn new(db_pool: DbPool) -> Self {
        let registry = Arc::new(ProductRegistry::with_standard_kinds());
        Self {
            system: Arc::new(SystemServiceImpl),
            catalog: Arc::new(CatalogServiceImpl::new(db_pool.clone())),
            cart: Arc::new(CartServiceImpl::new(db_pool.clone(), registry)),
            orders: Arc::new(OrderServiceImpl::new(db_pool.clone())),
            accounts: Arc::new(AccountServiceImpl::new(db_pool)),
            payments: Arc::new(OfflinePaymentGateway),
        }
    }
}

pub struct AppError(pub Error);

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        AppError(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Validation(_)
            | Error::InvalidQuantity(_)
            | Error::ImageConstraint(_)
            | Error::Parse(_) => StatusCode::BAD_REQUEST,
            Error::UserNotFound | Error::WrongPassword => StatusCode::UNAUTHORIZED,
            Error::NotFound | Error::ReferenceNotFound { .. } => StatusCode::NOT_FOUND,
            Error::CartFrozen => StatusCode::CONFLICT,
            Error::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

enum Identity {
    User(UserId),
    Session(SessionId),
}

fn identify(headers: &HeaderMap) -> Result<Identity, Error> {
    if let Some(raw) = headers.get(header::AUTHORIZATION) {
        let raw = raw
            .to_str()
            .map_err(|_| Error::Validation("authorization header is not valid UTF-8".into()))?;
        let user_id = raw
            .parse::<i32>()
            .map_err(|_| Error::Validation(format!("cannot parse user id from \"{}\"", raw)))?;
        debug!("extracted user id {}", user_id);
        return Ok(Identity::User(UserId(user_id)));
    }
    if let Some(raw) = headers.get(SESSION_HEADER) {
        let raw = raw
            .to_str()
            .map_err(|_| Error::Validation("session header is not valid UTF-8".into()))?;
        let session_id = raw
            .parse::<SessionId>()
            .map_err(|_| Error::Validation(format!("cannot parse session id from \"{}\"", raw)))?;
        return Ok(Identity::Session(session_id));
    }
    Err(Error::Validation(
        "an authorization or session header is required".into(),
    ))
}

fn require_user(headers: &HeaderMap) -> Result<UserId, Error> {
    match identify(headers)? {
        Identity::User(user_id) => Ok(user_id),
        Identity::Session(_) => Err(Error::UserNotFound),
    }
}

async fn owner_from_headers(state: &AppState, headers: &HeaderMap) -> Result<CartOwner, Error> {
    match identify(headers)? {
        Identity::User(user_id) => {
            let customer = state.accounts.customer_for_user(user_id).await?;
            Ok(CartOwner::Customer(customer.id))
        }
        Identity::Session(session_id) => Ok(CartOwner::Anonymous(session_id)),
    }
}

fn parse_kind(raw: &str) -> Result<ProductKind, Error> {
    raw.parse::<ProductKind>()
}

async fn product_ref_by_slug(state: &AppState, kind: ProductKind, slug: &str) -> Result<ProductRef, Error> {
    let product = state.catalog.product_detail(kind, slug).await?;
    Ok(ProductRef::new(kind, product.id()))
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutPage {
    pub cart: CartContents,
    pub client_secret: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SetStatusPayload {
    pub status: String,
}

pub async fn healthcheck(State(state): State<AppState>) -> Result<Json<String>, AppError> {
    Ok(Json(state.system.healthcheck().await?))
}

pub async fn main_page(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.catalog.main_page().await?))
}

pub async fn categories(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = state
        .catalog
        .categories(params.page.unwrap_or(1), params.page_size)
        .await?;
    Ok(Json(page))
}

pub async fn category_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.catalog.category_detail(&slug).await?))
}

pub async fn product_detail(
    State(state): State<AppState>,
    Path((kind, slug)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let kind = parse_kind(&kind)?;
    Ok(Json(state.catalog.product_detail(kind, &slug).await?))
}

pub async fn save_pizza(
    State(state): State<AppState>,
    Json(form): Json<PizzaAddForm>,
) -> Result<impl IntoResponse, AppError> {
    let product = state.catalog.save_pizza(form).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn save_beer(
    State(state): State<AppState>,
    Json(form): Json<BeerAddForm>,
) -> Result<impl IntoResponse, AppError> {
    let product = state.catalog.save_beer(form).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn beer_list(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.catalog.list_beer(params.search.as_deref()).await?))
}

pub async fn beer_detail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let beer = state
        .catalog
        .get_beer(ProductId(id))
        .await?
        .ok_or(Error::NotFound)?;
    Ok(Json(beer))
}

pub async fn customers(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.catalog.list_customers().await?))
}

pub async fn cart_view(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CartContents>, AppError> {
    let owner = owner_from_headers(&state, &headers).await?;
    Ok(Json(state.cart.get_cart(owner).await?))
}

pub async fn add_to_cart(
    State(state): State<AppState>,
    Path((kind, slug)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<CartContents>, AppError> {
    let owner = owner_from_headers(&state, &headers).await?;
    let product_ref = product_ref_by_slug(&state, parse_kind(&kind)?, &slug).await?;
    Ok(Json(state.cart.add_item(owner, product_ref).await?))
}

pub async fn remove_from_cart(
    State(state): State<AppState>,
    Path((kind, slug)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<CartContents>, AppError> {
    let owner = owner_from_headers(&state, &headers).await?;
    let product_ref = product_ref_by_slug(&state, parse_kind(&kind)?, &slug).await?;
    Ok(Json(state.cart.remove_item(owner, product_ref).await?))
}

pub async fn change_qty(
    State(state): State<AppState>,
    Path((kind, slug)): Path<(String, String)>,
    headers: HeaderMap,
    Form(form): Form<ChangeQtyForm>,
) -> Result<Json<CartContents>, AppError> {
    let owner = owner_from_headers(&state, &headers).await?;
    let product_ref = product_ref_by_slug(&state, parse_kind(&kind)?, &slug).await?;
    Ok(Json(state.cart.set_quantity(owner, product_ref, form.qty).await?))
}

pub async fn checkout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CheckoutPage>, AppError> {
    let owner = owner_from_headers(&state, &headers).await?;
    let cart = state.cart.get_cart(owner).await?;
    let intent = state
        .payments
        .create_intent(cart.cart.final_price, "usd")
        .await?;
    Ok(Json(CheckoutPage {
        cart,
        client_secret: intent.client_secret,
    }))
}

pub async fn make_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<OrderForm>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = require_user(&headers)?;
    let customer = state.accounts.customer_for_user(user_id).await?;
    let cart = state.cart.get_cart(CartOwner::Customer(customer.id)).await?;
    let order = state.orders.place_order(user_id, cart.cart.id, form).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn payed_online_order(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let user_id = require_user(&headers)?;
    let customer = state.accounts.customer_for_user(user_id).await?;
    let cart = state.cart.get_cart(CartOwner::Customer(customer.id)).await?;
    state
        .orders
        .place_instant_order(user_id, cart.cart.id)
        .await?;
    Ok(Json(json!({ "status": "payed" })))
}

pub async fn registration(
    State(state): State<AppState>,
    Form(form): Form<RegistrationForm>,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    let customer = state.accounts.register(form).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.accounts.login(form).await?))
}

pub async fn profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let user_id = require_user(&headers)?;
    Ok(Json(state.accounts.profile(user_id).await?))
}

pub async fn set_order_status(
    State(state): State<AppState>,
    Path(order_id): Path<uuid::Uuid>,
    Json(payload): Json<SetStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let state_value = payload.status.parse::<OrderState>().map_err(|e| match e {
        Error::Parse(msg) => Error::Validation(msg),
        other => other,
    })?;
    let order = state
        .orders
        .set_order_state(OrderId(order_id), state_value)
        .await?
        .ok_or(Error::NotFound)?;
    Ok(Json(order))
}
