//! CancelSubscriptionHandler - Command handler for creator-initiated cancellation.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::foundation::Timestamp;
use crate::domain::subscription::{Subscription, SubscriptionError};
use crate::ports::{BillingProvider, SubscriptionRepository};

use super::lookup;

/// Command to cancel a creator's subscription.
#[derive(Debug, Clone)]
pub struct CancelSubscriptionCommand {
    pub creator_id: String,
    /// Cancel now instead of at the end of the current period.
    pub immediate: bool,
}

/// Result of cancellation.
#[derive(Debug, Clone)]
pub struct CancelSubscriptionResult {
    pub subscription: Subscription,
    /// When access ends: now, or the end of the current period.
    pub effective_date: Timestamp,
    /// True if a remote subscription was cancelled with the provider.
    pub remote_cancelled: bool,
}

/// Handler for cancellation.
///
/// The aggregate does not distinguish immediate from deferred cancellation;
/// the effective date is computed here for reporting and passed on to the
/// billing provider.
pub struct CancelSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
    billing: Arc<dyn BillingProvider>,
}

impl CancelSubscriptionHandler {
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        billing: Arc<dyn BillingProvider>,
    ) -> Self {
        Self {
            repository,
            billing,
        }
    }

    pub async fn handle(
        &self,
        cmd: CancelSubscriptionCommand,
    ) -> Result<CancelSubscriptionResult, SubscriptionError> {
        // 1. Load
        let creator_id = lookup::creator_id(&cmd.creator_id)?;
        let mut subscription =
            lookup::load_for_creator(self.repository.as_ref(), &creator_id).await?;

        // 2. Cancellation happens once
        if subscription.is_cancelled() {
            warn!(creator_id = %creator_id, "Subscription already cancelled");
            return Err(SubscriptionError::already_cancelled(subscription.id()));
        }

        let effective_date = if cmd.immediate {
            Timestamp::now()
        } else {
            subscription.current_period_end()
        };

        // 3. Cancel remotely first so a provider failure leaves local state intact
        let remote_cancelled = match subscription.provider().subscription_id.clone() {
            Some(remote_id) => {
                self.billing
                    .cancel_subscription(&remote_id, !cmd.immediate)
                    .await
                    .map_err(lookup::billing_error)?;
                true
            }
            None => false,
        };

        // 4. Cancel locally and persist
        subscription.cancel_subscription();
        self.repository.save(&subscription).await?;

        info!(
            subscription_id = %subscription.id(),
            creator_id = %creator_id,
            immediate = cmd.immediate,
            remote_cancelled,
            "Subscription cancelled"
        );

        Ok(CancelSubscriptionResult {
            subscription,
            effective_date,
            remote_cancelled,
        })
    }
}
