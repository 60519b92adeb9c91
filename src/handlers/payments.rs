use axum::{
    extract::{Path, State},
    response::Response,
    routing::{get, post},
    Router,
};
use tracing::instrument;

use super::common::{map_cart_error, success_response};
use crate::auth::BuyerIdentity;
use crate::errors::ServiceError;
use crate::AppState;

/// Create or update the payment intent for a cart
#[utoipa::path(
    post,
    path = "/api/payments/{cart_id}",
    params(("cart_id" = String, Path, description = "Cart identifier")),
    responses(
        (status = 200, description = "Cart with current payment intent", body = crate::models::CartSnapshot),
        (status = 400, description = "Problem with the cart", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing buyer identity", body = crate::errors::ErrorResponse),
        (status = 502, description = "Payment provider error", body = crate::errors::ErrorResponse)
    ),
    tag = "Payments"
)]
#[instrument(skip(state, buyer), fields(buyer = %buyer.email))]
pub async fn create_or_update_payment_intent(
    State(state): State<AppState>,
    buyer: BuyerIdentity,
    Path(cart_id): Path<String>,
) -> Result<Response, ServiceError> {
    let cart = state
        .services
        .payment_intents
        .create_or_update_intent(&cart_id)
        .await
        .map_err(map_cart_error)?;

    Ok(success_response(cart))
}

/// List the available delivery methods
#[utoipa::path(
    get,
    path = "/api/payments/delivery-methods",
    responses(
        (status = 200, description = "Delivery methods, most expensive first", body = [crate::entities::delivery_method::Model])
    ),
    tag = "Payments"
)]
pub async fn list_delivery_methods(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let methods = state.services.catalog.list_delivery_methods().await?;
    Ok(success_response(methods))
}

/// Payment routes
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/delivery-methods", get(list_delivery_methods))
        .route("/webhook", post(super::payment_webhooks::payment_webhook))
        .route("/:cart_id", post(create_or_update_payment_intent))
}
