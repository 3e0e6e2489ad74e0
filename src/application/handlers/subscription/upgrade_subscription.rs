//! UpgradeSubscriptionHandler - Command handler applying a paid upgrade.
//!
//! Driven by a completed checkout. The billing provider is the source of
//! truth for the new period, so the caller supplies the bounds.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::foundation::Timestamp;
use crate::domain::subscription::{
    plan_catalog, BillingInterval, ProviderLinkage, Subscription, SubscriptionError, Tier,
};
use crate::ports::SubscriptionRepository;

use super::lookup;

/// Command to upgrade a creator's subscription.
#[derive(Debug, Clone)]
pub struct UpgradeSubscriptionCommand {
    pub creator_id: String,
    pub tier: String,
    pub billing_interval: BillingInterval,
    pub provider_subscription_id: String,
    pub provider_customer_id: String,
    pub provider_price_id: String,
    pub current_period_start: Timestamp,
    pub current_period_end: Timestamp,
    /// Open a trial from the period start if the new tier offers one and
    /// no trial was used before.
    pub with_trial: bool,
}

/// Result of a successful upgrade.
#[derive(Debug, Clone)]
pub struct UpgradeSubscriptionResult {
    pub subscription: Subscription,
    pub previous_tier: Tier,
    pub interval_changed: bool,
    pub trial_started: bool,
}

/// Handler for upgrades.
pub struct UpgradeSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
}

impl UpgradeSubscriptionHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        cmd: UpgradeSubscriptionCommand,
    ) -> Result<UpgradeSubscriptionResult, SubscriptionError> {
        // 1. Validate input before touching the store
        lookup::require("creator_id", &cmd.creator_id)?;
        lookup::require("provider_subscription_id", &cmd.provider_subscription_id)?;
        lookup::require("provider_customer_id", &cmd.provider_customer_id)?;
        lookup::require("provider_price_id", &cmd.provider_price_id)?;
        let target = lookup::tier(&cmd.tier)?;
        let creator_id = lookup::creator_id(&cmd.creator_id)?;

        // 2. Load
        let mut subscription =
            lookup::load_for_creator(self.repository.as_ref(), &creator_id).await?;
        let previous_tier = subscription.tier();

        // 3. Only strict upgrades go through this path
        if !subscription.plan().can_upgrade_to(target) {
            warn!(
                creator_id = %creator_id,
                from = %previous_tier,
                to = %target,
                "Rejected non-upgrade plan change"
            );
            return Err(SubscriptionError::not_an_upgrade(previous_tier, target));
        }

        // 4. Apply the plan, interval and provider period
        let linkage = ProviderLinkage::new(
            cmd.provider_subscription_id.trim(),
            cmd.provider_customer_id.trim(),
            cmd.provider_price_id.trim(),
        );
        subscription.upgrade(target, Some(linkage))?;

        let interval_changed = subscription.billing_interval() != cmd.billing_interval;
        if interval_changed {
            subscription.change_billing_interval(cmd.billing_interval, None);
        }

        subscription.renew_period(cmd.current_period_start, cmd.current_period_end)?;

        let trial_started = cmd.with_trial
            && plan_catalog::trial_days(target) > 0
            && subscription.trial_start().is_none();
        if trial_started {
            subscription.start_trial_at(cmd.current_period_start)?;
        }

        // 5. Persist
        self.repository.save(&subscription).await?;

        info!(
            subscription_id = %subscription.id(),
            creator_id = %creator_id,
            from = %previous_tier,
            to = %target,
            interval = %subscription.billing_interval(),
            "Subscription upgraded"
        );

        Ok(UpgradeSubscriptionResult {
            subscription,
            previous_tier,
            interval_changed,
            trial_started,
        })
    }
}
