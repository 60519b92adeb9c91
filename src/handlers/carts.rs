use axum::{
    extract::{Query, State},
    response::Response,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;
use utoipa::IntoParams;

use super::common::{no_content_response, success_response, validate_input};
use crate::errors::ServiceError;
use crate::models::CartSnapshot;
use crate::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct CartQuery {
    /// Cart identifier
    pub id: String,
}

/// Fetch a cart. An unknown id yields an empty cart with that id.
#[utoipa::path(
    get,
    path = "/api/cart",
    params(CartQuery),
    responses((status = 200, description = "Stored cart, or an empty one", body = CartSnapshot)),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    Query(query): Query<CartQuery>,
) -> Result<Response, ServiceError> {
    let cart = state
        .services
        .cart_store
        .get(&query.id)
        .await?
        .unwrap_or_else(|| CartSnapshot::new(query.id));
    Ok(success_response(cart))
}

/// Store (replace) a cart
#[utoipa::path(
    post,
    path = "/api/cart",
    request_body = CartSnapshot,
    responses(
        (status = 200, description = "Stored cart", body = CartSnapshot),
        (status = 400, description = "Invalid cart", body = crate::errors::ErrorResponse)
    ),
    tag = "Cart"
)]
#[instrument(skip(state, cart), fields(cart_id = %cart.id))]
pub async fn update_cart(
    State(state): State<AppState>,
    Json(cart): Json<CartSnapshot>,
) -> Result<Response, ServiceError> {
    validate_input(&cart)?;
    state.services.cart_store.put(&cart).await?;
    Ok(success_response(cart))
}

/// Delete a cart
#[utoipa::path(
    delete,
    path = "/api/cart",
    params(CartQuery),
    responses(
        (status = 204, description = "Cart deleted"),
        (status = 400, description = "No such cart", body = crate::errors::ErrorResponse)
    ),
    tag = "Cart"
)]
pub async fn delete_cart(
    State(state): State<AppState>,
    Query(query): Query<CartQuery>,
) -> Result<Response, ServiceError> {
    if !state.services.cart_store.delete(&query.id).await? {
        return Err(ServiceError::CartNotFound(query.id));
    }
    Ok(no_content_response())
}

/// Cart routes
pub fn cart_routes() -> Router<AppState> {
    Router::new().route("/", get(get_cart).post(update_cart).delete(delete_cart))
}
