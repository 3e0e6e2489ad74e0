//! HandlePaymentSucceededHandler - Webhook handler renewing the billing period.
//!
//! Redelivered events are absorbed by re-inspection. A payment is stale when
//! its period starts before the current one, or when it covers a period that
//! ended before the open grace period began. Stale payments change nothing.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::foundation::Timestamp;
use crate::domain::subscription::{Subscription, SubscriptionError};
use crate::ports::SubscriptionRepository;

use super::lookup;

/// Command carrying a successful-payment notification.
#[derive(Debug, Clone)]
pub struct HandlePaymentSucceededCommand {
    pub provider_subscription_id: String,
    /// New period bounds as reported by the provider (Unix seconds).
    pub period_start: i64,
    pub period_end: i64,
}

/// Result of handling a successful payment.
#[derive(Debug, Clone)]
pub struct HandlePaymentSucceededResult {
    pub subscription: Subscription,
    /// True if the payment closed an open grace period.
    pub recovered_from_past_due: bool,
    /// True if the payment was older than the stored state and ignored.
    pub stale: bool,
}

/// Handler for successful-payment webhooks.
pub struct HandlePaymentSucceededHandler {
    repository: Arc<dyn SubscriptionRepository>,
}

impl HandlePaymentSucceededHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentSucceededCommand,
    ) -> Result<HandlePaymentSucceededResult, SubscriptionError> {
        // 1. Convert provider bounds
        let start = lookup::timestamp("period_start", cmd.period_start)?;
        let end = lookup::timestamp("period_end", cmd.period_end)?;

        // 2. Load by the provider's id
        let remote_id = cmd.provider_subscription_id.trim();
        let mut subscription =
            lookup::load_for_provider_subscription(self.repository.as_ref(), remote_id).await?;

        // 3. Redelivery of an older payment
        if is_stale(&subscription, cmd.period_start, end) {
            debug!(
                subscription_id = %subscription.id(),
                period_start = %start,
                current_period_start = %subscription.current_period_start(),
                "Ignoring payment older than the current state"
            );
            return Ok(HandlePaymentSucceededResult {
                subscription,
                recovered_from_past_due: false,
                stale: true,
            });
        }

        // 4. Renew and persist
        let recovered_from_past_due = subscription.is_past_due();
        subscription.renew_period(start, end)?;
        self.repository.save(&subscription).await?;

        info!(
            subscription_id = %subscription.id(),
            creator_id = %subscription.creator_id(),
            period_end = %end,
            recovered_from_past_due,
            "Subscription period renewed"
        );

        Ok(HandlePaymentSucceededResult {
            subscription,
            recovered_from_past_due,
            stale: false,
        })
    }
}

/// Provider bounds carry whole seconds, so the period start is compared at
/// that precision.
fn is_stale(subscription: &Subscription, period_start_secs: i64, end: Timestamp) -> bool {
    if period_start_secs < subscription.current_period_start().as_unix_secs() {
        return true;
    }
    match (subscription.is_past_due(), subscription.grace_period_start()) {
        (true, Some(grace_start)) => !end.is_after(&grace_start),
        _ => false,
    }
}
