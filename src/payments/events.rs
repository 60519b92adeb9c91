use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ServiceError;

pub const PAYMENT_INTENT_SUCCEEDED: &str = "payment_intent.succeeded";
const PAYMENT_INTENT_OBJECT: &str = "payment_intent";
const STATUS_SUCCEEDED: &str = "succeeded";

/// Envelope of a provider webhook notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventData {
    pub object: Value,
}

#[derive(Debug, Deserialize)]
struct PaymentIntentObject {
    id: String,
    amount: i64,
    currency: String,
    status: String,
}

/// A settled payment intent, amount already in minor units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementEvent {
    pub event_id: String,
    pub intent_id: String,
    pub amount: i64,
    pub currency: String,
}

impl ProviderEvent {
    /// Extracts the settlement carried by this event.
    ///
    /// Returns `Ok(None)` for events that are not a succeeded payment intent.
    /// A payment intent object missing required fields is an
    /// `InvalidPayload` error.
    pub fn settlement(&self) -> Result<Option<SettlementEvent>, ServiceError> {
        if self.event_type != PAYMENT_INTENT_SUCCEEDED {
            return Ok(None);
        }
        if self.data.object.get("object").and_then(Value::as_str) != Some(PAYMENT_INTENT_OBJECT) {
            return Ok(None);
        }

        let intent: PaymentIntentObject = serde_json::from_value(self.data.object.clone())
            .map_err(|e| ServiceError::InvalidPayload(format!("malformed payment intent: {}", e)))?;

        if intent.status != STATUS_SUCCEEDED {
            return Ok(None);
        }

        Ok(Some(SettlementEvent {
            event_id: self.id.clone(),
            intent_id: intent.id,
            amount: intent.amount,
            currency: intent.currency,
        }))
    }
}
