use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
};
use bytes::Bytes;
use tracing::{error, info};

use crate::payments::SIGNATURE_HEADER;
use crate::AppState;

/// Payment provider webhook.
///
/// Responds with a bare status code: 200 for handled or ignored events, 400
/// for malformed payloads and 500 for signature or internal failures so the
/// provider retries.
#[utoipa::path(
    post,
    path = "/api/payments/webhook",
    request_body(content = String, description = "Raw provider event JSON", content_type = "application/json"),
    params(("Stripe-Signature" = String, Header, description = "Provider signature header")),
    responses(
        (status = 200, description = "Event accepted or ignored"),
        (status = 400, description = "Malformed event payload"),
        (status = 500, description = "Signature verification failed or internal error")
    ),
    tag = "Payments"
)]
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    match state.services.reconciler.handle(&body, signature).await {
        Ok(outcome) => {
            info!(?outcome, "Webhook processed");
            StatusCode::OK
        }
        Err(err) => {
            error!(error = %err, "Webhook error");
            err.status_code()
        }
    }
}
