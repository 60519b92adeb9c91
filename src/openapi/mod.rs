use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Checkout API",
        version = "0.1.0",
        description = r#"
# Checkout API

Cart pricing, payment authorization, order creation and payment webhook reconciliation.

## Flow

1. Store the cart with `POST /api/cart`.
2. `POST /api/payments/{cart_id}` re-prices the cart against the catalog and creates or resizes the
   provider payment intent. The response carries the `clientSecret` used to confirm payment.
3. `POST /api/orders` snapshots the cart into an order in status `Pending`.
4. The provider calls `POST /api/payments/webhook`; the order moves to `PaymentReceived` when the
   settled amount matches the order total, otherwise to `PaymentMismatch`.

## Buyer identity

Order and payment endpoints read the authenticated buyer's email from the configured identity
header (default `x-authenticated-email`), set by the upstream gateway.

## Error Handling

Errors use a consistent JSON body:

```json
{
  "error": "Bad Request",
  "message": "Problem with your cart: cart basket-1 not found",
  "request_id": "0b0f0c1e-...",
  "timestamp": "2024-01-01T00:00:00Z"
}
```

The webhook endpoint answers with a bare status code.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Cart", description = "Cart store endpoints"),
        (name = "Payments", description = "Payment intents, delivery methods and provider webhooks"),
        (name = "Orders", description = "Order creation and lookup"),
    ),
    paths(
        // Cart
        crate::handlers::carts::get_cart,
        crate::handlers::carts::update_cart,
        crate::handlers::carts::delete_cart,

        // Payments
        crate::handlers::payments::create_or_update_payment_intent,
        crate::handlers::payments::list_delivery_methods,

        // Webhooks
        crate::handlers::payment_webhooks::payment_webhook,

        // Orders
        crate::handlers::orders::create_order,
        crate::handlers::orders::list_orders,
        crate::handlers::orders::get_order,
    ),
    components(
        schemas(
            crate::models::CartSnapshot,
            crate::models::CartLine,
            crate::models::CreateOrderRequest,
            crate::models::ShippingAddress,
            crate::models::PaymentSummary,
            crate::models::OrderResponse,
            crate::models::OrderItem,
            crate::entities::OrderStatus,
            crate::entities::delivery_method::Model,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
