#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
use serde_json::{json, Value};
use tower::ServiceExt;

use checkout_api::{
    config::AppConfig,
    db,
    entities::{delivery_method, order, product},
    errors::ServiceError,
    handlers::AppServices,
    models::{CartLine, CartSnapshot},
    payments::{signature::sign_payload, PaymentProvider, ProviderIntent, SIGNATURE_HEADER},
    services::commerce::InMemoryCartStore,
    AppState,
};

pub const WEBHOOK_SECRET: &str = "whsec_integration";
pub const BUYER: &str = "bob@test.com";

/// A provider call observed by [`RecordingProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Create { amount: i64, currency: String },
    Update { intent_id: String, amount: i64 },
}

/// In-process payment provider that hands out sequential intent ids and
/// records every call.
#[derive(Default)]
pub struct RecordingProvider {
    calls: Mutex<Vec<ProviderCall>>,
    fail_with: Mutex<Option<String>>,
}

impl RecordingProvider {
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Makes every following call fail with the given provider message.
    pub fn fail_with(&self, message: &str) {
        *self.fail_with.lock().unwrap() = Some(message.to_string());
    }

    fn check_failure(&self) -> Result<(), ServiceError> {
        match self.fail_with.lock().unwrap().clone() {
            Some(message) => Err(ServiceError::ExternalServiceError(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PaymentProvider for RecordingProvider {
    async fn create_authorization(
        &self,
        amount_cents: i64,
        currency: &str,
    ) -> Result<ProviderIntent, ServiceError> {
        self.check_failure()?;
        let mut calls = self.calls.lock().unwrap();
        calls.push(ProviderCall::Create {
            amount: amount_cents,
            currency: currency.to_string(),
        });
        let id = format!("pi_test_{}", calls.len());
        Ok(ProviderIntent {
            client_secret: format!("{}_secret_test", id),
            id,
            amount: amount_cents,
        })
    }

    async fn update_authorization(
        &self,
        intent_id: &str,
        amount_cents: i64,
    ) -> Result<ProviderIntent, ServiceError> {
        self.check_failure()?;
        self.calls.lock().unwrap().push(ProviderCall::Update {
            intent_id: intent_id.to_string(),
            amount: amount_cents,
        });
        Ok(ProviderIntent {
            id: intent_id.to_string(),
            client_secret: format!("{}_secret_test", intent_id),
            amount: amount_cents,
        })
    }
}

/// Helper harness for spinning up the application over an in-memory SQLite
/// database, an in-memory cart store and a recording payment provider.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub provider: Arc<RecordingProvider>,
}

impl TestApp {
    /// Construct a new test application with a fresh, seeded database.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "redis://127.0.0.1:6379".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.cart_store_backend = "in-memory".to_string();
        cfg.payments.secret_key = "sk_test_integration".to_string();
        cfg.payments.webhook_secret = WEBHOOK_SECRET.to_string();

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let provider = Arc::new(RecordingProvider::default());
        let services = AppServices::new(
            db_arc.clone(),
            Arc::new(InMemoryCartStore::new()),
            provider.clone(),
            &cfg,
        );

        let state = AppState {
            db: db_arc,
            config: Arc::new(cfg),
            services,
            redis: None,
        };

        let app = Self {
            router: checkout_api::build_router(state.clone()),
            state,
            provider,
        };
        app.seed_catalog().await;
        app
    }

    async fn seed_catalog(&self) {
        for (id, name, price) in [
            (1, "Angular Speedster Board 2000", Decimal::new(1999, 2)),
            (2, "Blue Hat", Decimal::new(1000, 2)),
            (3, "Green Gloves", Decimal::new(1500, 2)),
        ] {
            product::ActiveModel {
                id: Set(id),
                name: Set(name.to_string()),
                description: Set(None),
                price: Set(price),
                picture_url: Set(Some(format!("images/products/{}.png", id))),
                brand: Set(Some("Test".to_string())),
                product_type: Set(Some("Boards".to_string())),
            }
            .insert(self.state.db.as_ref())
            .await
            .expect("seed product");
        }

        for (id, short_name, delivery_time, price) in [
            (1, "UPS1", "1-2 Days", Decimal::new(1000, 2)),
            (2, "UPS2", "2-5 Days", Decimal::new(500, 2)),
            (3, "FREE", "1-2 Weeks", Decimal::ZERO),
        ] {
            delivery_method::ActiveModel {
                id: Set(id),
                short_name: Set(short_name.to_string()),
                delivery_time: Set(delivery_time.to_string()),
                description: Set(format!("{} delivery", short_name)),
                price: Set(price),
            }
            .insert(self.state.db.as_ref())
            .await
            .expect("seed delivery method");
        }
    }

    /// Change a product's catalog price.
    pub async fn set_product_price(&self, product_id: i32, price: Decimal) {
        let model = product::Entity::find_by_id(product_id)
            .one(self.state.db.as_ref())
            .await
            .expect("load product")
            .expect("product exists");
        let mut active: product::ActiveModel = model.into();
        active.price = Set(price);
        active
            .update(self.state.db.as_ref())
            .await
            .expect("update product price");
    }

    /// Remove a product from the catalog.
    pub async fn delete_product(&self, product_id: i32) {
        product::Entity::delete_by_id(product_id)
            .exec(self.state.db.as_ref())
            .await
            .expect("delete product");
    }

    /// Store a cart with one line per `(product_id, client_price, quantity)`.
    pub async fn put_cart(
        &self,
        cart_id: &str,
        lines: &[(i32, Decimal, i32)],
        delivery_method_id: Option<i32>,
    ) -> CartSnapshot {
        let mut cart = CartSnapshot::new(cart_id);
        cart.items = lines
            .iter()
            .map(|(product_id, unit_price, quantity)| CartLine {
                product_id: *product_id,
                product_name: format!("Product {}", product_id),
                picture_url: None,
                unit_price: *unit_price,
                quantity: *quantity,
            })
            .collect();
        cart.delivery_method_id = delivery_method_id;
        self.state
            .services
            .cart_store
            .put(&cart)
            .await
            .expect("store cart");
        cart
    }

    pub async fn cart(&self, cart_id: &str) -> Option<CartSnapshot> {
        self.state
            .services
            .cart_store
            .get(cart_id)
            .await
            .expect("read cart")
    }

    pub async fn order_count(&self) -> u64 {
        order::Entity::find()
            .count(self.state.db.as_ref())
            .await
            .expect("count orders")
    }

    /// Send a request against the router, optionally as an authenticated buyer.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        buyer: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(email) = buyer {
            builder = builder.header(self.state.config.buyer_identity_header.as_str(), email);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Convenience helper for requests made by the default buyer.
    pub async fn request_as_buyer(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request(method, uri, body, Some(BUYER)).await
    }

    pub async fn create_intent(&self, cart_id: &str) -> Response {
        self.request_as_buyer(Method::POST, &format!("/api/payments/{}", cart_id), None)
            .await
    }

    pub async fn create_order(&self, cart_id: &str, delivery_method_id: i32) -> Response {
        self.request_as_buyer(
            Method::POST,
            "/api/orders",
            Some(order_payload(cart_id, delivery_method_id)),
        )
        .await
    }

    /// Deliver a webhook body signed with the configured secret.
    pub async fn post_webhook(&self, event: &Value) -> Response {
        let payload = serde_json::to_vec(event).expect("serialize event");
        let header = sign_payload(&payload, WEBHOOK_SECRET, Utc::now().timestamp()).unwrap();
        self.post_raw_webhook(payload, Some(header)).await
    }

    /// Deliver raw webhook bytes with an arbitrary signature header.
    pub async fn post_raw_webhook(&self, payload: Vec<u8>, signature: Option<String>) -> Response {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/api/payments/webhook")
            .header("content-type", "application/json");
        if let Some(signature) = signature {
            builder = builder.header(SIGNATURE_HEADER, signature);
        }
        let request = builder
            .body(Body::from(payload))
            .expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }
}

pub fn order_payload(cart_id: &str, delivery_method_id: i32) -> Value {
    json!({
        "cartId": cart_id,
        "deliveryMethodId": delivery_method_id,
        "shippingAddress": {
            "name": "Bob Bobbity",
            "line1": "10 The Street",
            "city": "New York",
            "state": "NY",
            "postalCode": "90250",
            "country": "US"
        },
        "paymentSummary": {
            "brand": "visa",
            "last4": "4242",
            "expMonth": 12,
            "expYear": 2030
        }
    })
}

/// A `payment_intent.succeeded` event for `intent_id` settling `amount` cents.
pub fn succeeded_event(intent_id: &str, amount: i64) -> Value {
    json!({
        "id": format!("evt_{}_{}", intent_id, amount),
        "type": "payment_intent.succeeded",
        "data": {
            "object": {
                "id": intent_id,
                "object": "payment_intent",
                "amount": amount,
                "currency": "usd",
                "status": "succeeded"
            }
        }
    })
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

/// Parses a decimal that the API rendered as a JSON string.
pub fn decimal_field(value: &Value) -> Decimal {
    value
        .as_str()
        .expect("decimal rendered as string")
        .parse::<Decimal>()
        .expect("valid decimal")
        .round_dp(2)
}
