//! ExpireGracePeriodsHandler - Scheduled sweep cancelling unpaid subscriptions.
//!
//! Every past-due subscription whose grace period has run out is cancelled
//! with the billing provider (immediately) and locally. One failing
//! subscription does not stop the sweep.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::BillingConfig;
use crate::domain::foundation::{SubscriptionId, Timestamp};
use crate::domain::subscription::{Subscription, SubscriptionError};
use crate::ports::{BillingProvider, SubscriptionRepository};

use super::lookup;

/// Command to run one sweep.
#[derive(Debug, Clone, Default)]
pub struct ExpireGracePeriodsCommand {
    /// Reference time for the sweep.
    pub now: Timestamp,
}

/// Outcome of a sweep.
#[derive(Debug, Clone, Default)]
pub struct ExpireGracePeriodsResult {
    /// Past-due subscriptions inspected.
    pub examined: usize,
    pub expired: Vec<SubscriptionId>,
    pub failed: Vec<(SubscriptionId, SubscriptionError)>,
}

/// Handler for the grace-period sweep.
pub struct ExpireGracePeriodsHandler {
    repository: Arc<dyn SubscriptionRepository>,
    billing: Arc<dyn BillingProvider>,
    grace_period_days: u32,
}

impl ExpireGracePeriodsHandler {
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        billing: Arc<dyn BillingProvider>,
        config: &BillingConfig,
    ) -> Self {
        Self {
            repository,
            billing,
            grace_period_days: config.grace_period_days,
        }
    }

    pub async fn handle(
        &self,
        cmd: ExpireGracePeriodsCommand,
    ) -> Result<ExpireGracePeriodsResult, SubscriptionError> {
        let past_due = self.repository.find_all_past_due().await?;
        let mut result = ExpireGracePeriodsResult {
            examined: past_due.len(),
            ..Default::default()
        };

        for subscription in past_due
            .into_iter()
            .filter(|s| s.grace_period_elapsed(cmd.now, self.grace_period_days))
        {
            let id = subscription.id();
            match self.expire(subscription).await {
                Ok(()) => result.expired.push(id),
                Err(e) => {
                    warn!(subscription_id = %id, error = %e, "Failed to expire grace period");
                    result.failed.push((id, e));
                }
            }
        }

        info!(
            examined = result.examined,
            expired = result.expired.len(),
            failed = result.failed.len(),
            grace_period_days = self.grace_period_days,
            "Grace period sweep finished"
        );

        Ok(result)
    }

    async fn expire(&self, mut subscription: Subscription) -> Result<(), SubscriptionError> {
        if let Some(remote_id) = subscription.provider().subscription_id.clone() {
            self.billing
                .cancel_subscription(&remote_id, false)
                .await
                .map_err(lookup::billing_error)?;
        }
        subscription.cancel_subscription();
        self.repository.save(&subscription).await?;

        info!(
            subscription_id = %subscription.id(),
            creator_id = %subscription.creator_id(),
            "Subscription cancelled after grace period"
        );
        Ok(())
    }
}
