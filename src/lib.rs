//! Checkout API Library
//!
//! Cart pricing, payment intents, order creation and reconciliation of
//! payment provider webhooks against orders.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod payments;
pub mod repositories;
pub mod services;
pub mod tracing;

use axum::{extract::State, http::HeaderValue, response::Json, routing::get, Router};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<config::AppConfig>,
    pub services: handlers::AppServices,
    pub redis: Option<Arc<redis::Client>>,
}

/// Routes mounted under `/api`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/cart", handlers::carts::cart_routes())
        .nest("/payments", handlers::payments::payment_routes())
        .nest("/orders", handlers::orders::order_routes())
}

/// Full application router with middleware, bound to `state`.
pub fn build_router(state: AppState) -> Router {
    let cors_layer = cors_layer(&state.config);

    Router::<AppState>::new()
        .route("/", get(|| async { "checkout-api up" }))
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .merge(openapi::swagger_ui())
        .layer(crate::tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(cors_layer)
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

fn cors_layer(cfg: &config::AppConfig) -> CorsLayer {
    let configured_origins: Option<Vec<HeaderValue>> = cfg
        .cors_allowed_origins
        .as_ref()
        .map(|raw| {
            raw.split(',')
                .filter_map(|origin| {
                    let trimmed = origin.trim();
                    if trimmed.is_empty() {
                        None
                    } else {
                        HeaderValue::from_str(trimmed).ok()
                    }
                })
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty());

    match configured_origins {
        Some(origins) => CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any),
        None if cfg.is_development() => {
            ::tracing::info!("Using permissive CORS in development");
            CorsLayer::permissive()
        }
        None => {
            ::tracing::warn!("No CORS origins configured; cross-origin requests will be rejected");
            CorsLayer::new()
        }
    }
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(err) => {
            ::tracing::warn!(error = %err, "Database ping failed");
            "unhealthy"
        }
    };

    let cache_status = match &state.redis {
        Some(client) => match client.get_async_connection().await {
            Ok(mut conn) => match redis::cmd("PING").query_async::<_, String>(&mut conn).await {
                Ok(_) => "healthy",
                Err(_) => "unhealthy",
            },
            Err(_) => "unhealthy",
        },
        None => "disabled",
    };

    Json(json!({
        "status": if db_status == "healthy" && cache_status != "unhealthy" { "healthy" } else { "unhealthy" },
        "checks": {
            "database": db_status,
            "cart_store": cache_status,
        },
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
