use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::money::to_minor_units;
use crate::entities::OrderStatus;
use crate::errors::ServiceError;
use crate::models::Order;
use crate::payments::{construct_event, SettlementEvent};
use crate::repositories::OrderStore;

/// What a webhook delivery did to local state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Not a succeeded payment intent; nothing to do.
    Ignored,
    /// No order carries this intent yet. The provider will redeliver.
    OrderNotFound { payment_intent_id: String },
    /// Order moved out of `Pending`.
    Transitioned { order_id: Uuid, status: OrderStatus },
    /// Order was already in the status this event computes.
    AlreadySettled { order_id: Uuid, status: OrderStatus },
    /// Order is terminal with a different status; left unchanged.
    Conflict {
        order_id: Uuid,
        current: OrderStatus,
        computed: OrderStatus,
    },
}

/// Status an order should take given the amount the provider settled.
pub fn settlement_status(order: &Order, settled_amount: i64) -> Result<OrderStatus, ServiceError> {
    let order_cents = to_minor_units(order.total())?;
    Ok(if order_cents == settled_amount {
        OrderStatus::PaymentReceived
    } else {
        OrderStatus::PaymentMismatch
    })
}

/// Verifies provider notifications and settles the matching order.
#[derive(Clone)]
pub struct WebhookReconciler {
    orders: Arc<dyn OrderStore>,
    webhook_secret: String,
    tolerance: Duration,
}

impl WebhookReconciler {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        webhook_secret: impl Into<String>,
        tolerance: Duration,
    ) -> Self {
        Self {
            orders,
            webhook_secret: webhook_secret.into(),
            tolerance,
        }
    }

    /// Handles one raw webhook delivery.
    pub async fn handle(
        &self,
        raw_body: &[u8],
        signature_header: Option<&str>,
    ) -> Result<ReconcileOutcome, ServiceError> {
        let event = construct_event(
            raw_body,
            signature_header,
            &self.webhook_secret,
            self.tolerance,
        )
        .map_err(|err| {
            if matches!(err, ServiceError::InvalidSignature(_)) {
                error!(error = %err, "Rejected webhook with invalid signature");
                metrics::counter!("webhooks.rejected", 1, "reason" => "signature");
            }
            err
        })?;

        match event.settlement()? {
            Some(settlement) => self.reconcile(settlement).await,
            None => {
                info!(event_id = %event.id, event_type = %event.event_type, "Ignoring webhook event");
                metrics::counter!("webhooks.ignored", 1);
                Ok(ReconcileOutcome::Ignored)
            }
        }
    }

    /// Applies a verified settlement. Status is always recomputed from the
    /// stored order so duplicate or reordered deliveries converge.
    #[instrument(skip(self, settlement), fields(event_id = %settlement.event_id, payment_intent_id = %settlement.intent_id))]
    pub async fn reconcile(
        &self,
        settlement: SettlementEvent,
    ) -> Result<ReconcileOutcome, ServiceError> {
        let Some(order) = self
            .orders
            .find_by_payment_intent_id(&settlement.intent_id, false)
            .await?
        else {
            warn!("Order not yet found for payment intent; awaiting order creation");
            metrics::counter!("webhooks.order_not_found", 1);
            return Ok(ReconcileOutcome::OrderNotFound {
                payment_intent_id: settlement.intent_id,
            });
        };

        let computed = settlement_status(&order, settlement.amount)?;
        let order_cents = to_minor_units(order.total())?;

        info!(
            order_id = %order.id,
            order_cents,
            settled_cents = settlement.amount,
            "Payment verification"
        );

        if order.status.is_terminal() {
            return Ok(self.terminal_outcome(order.id, order.status, computed));
        }

        if computed == OrderStatus::PaymentMismatch {
            warn!(
                order_id = %order.id,
                expected_cents = order_cents,
                settled_cents = settlement.amount,
                difference = (settlement.amount - order_cents).abs(),
                "Payment mismatch detected"
            );
        }

        let changed = self
            .orders
            .transition_status(order.id, OrderStatus::Pending, computed)
            .await?;

        if changed {
            metrics::counter!("webhooks.settled", 1, "status" => computed.to_string());
            return Ok(ReconcileOutcome::Transitioned {
                order_id: order.id,
                status: computed,
            });
        }

        // Another delivery settled the order between our read and write
        let current = self
            .orders
            .find_by_payment_intent_id(&settlement.intent_id, false)
            .await?
            .map(|order| order.status)
            .unwrap_or(computed);
        Ok(self.terminal_outcome(order.id, current, computed))
    }

    fn terminal_outcome(
        &self,
        order_id: Uuid,
        current: OrderStatus,
        computed: OrderStatus,
    ) -> ReconcileOutcome {
        if current == computed {
            info!(%order_id, status = %current, "Order already settled");
            ReconcileOutcome::AlreadySettled {
                order_id,
                status: current,
            }
        } else {
            warn!(
                %order_id,
                current = %current,
                computed = %computed,
                "Settlement conflicts with terminal order status; leaving unchanged"
            );
            metrics::counter!("webhooks.conflicts", 1);
            ReconcileOutcome::Conflict {
                order_id,
                current,
                computed,
            }
        }
    }
}
