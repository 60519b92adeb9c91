use axum::{
    extract::{Path, State},
    response::Response,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::common::{created_response, success_response, validate_input};
use crate::auth::BuyerIdentity;
use crate::errors::ServiceError;
use crate::models::{CreateOrderRequest, OrderResponse};
use crate::AppState;

/// Create an order from a cart that already carries a payment intent
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created (or the existing order for this payment intent)", body = OrderResponse),
        (status = 400, description = "Invalid cart, missing payment intent or catalog mismatch", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing buyer identity", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
#[instrument(skip(state, buyer, payload), fields(buyer = %buyer.email))]
pub async fn create_order(
    State(state): State<AppState>,
    buyer: BuyerIdentity,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;

    let order = state
        .services
        .checkout
        .create_order(&buyer.email, payload)
        .await?;

    info!(order_id = %order.id, "Order created");
    Ok(created_response(OrderResponse::from(order)))
}

/// List the caller's orders, newest first
#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "Orders placed by the caller", body = [OrderResponse]),
        (status = 401, description = "Missing buyer identity", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    buyer: BuyerIdentity,
) -> Result<Response, ServiceError> {
    let orders = state.services.checkout.orders_for_buyer(&buyer.email).await?;
    let body: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(success_response(body))
}

/// Fetch one of the caller's orders
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "No such order for this buyer", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    buyer: BuyerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let order = state
        .services
        .checkout
        .order_for_buyer(&buyer.email, id)
        .await?;
    Ok(success_response(OrderResponse::from(order)))
}

/// Order routes
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/:id", get(get_order))
}
