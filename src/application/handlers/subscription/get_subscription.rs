//! GetSubscriptionHandler - Query handler for the creator's subscription view.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::Timestamp;
use crate::domain::subscription::{
    plan_catalog, BillingInterval, Limit, PlanFeatures, Subscription, SubscriptionError,
    SubscriptionStatus, Tier,
};
use crate::ports::SubscriptionRepository;

use super::lookup;

/// Query for a creator's subscription.
#[derive(Debug, Clone)]
pub struct GetSubscriptionQuery {
    pub creator_id: String,
}

/// Usage of one metered resource against its limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageView {
    pub used: u32,
    /// `-1` when unlimited.
    pub limit: Limit,
    pub can_add: bool,
}

/// Price points for the current tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricingView {
    pub monthly_cents: i64,
    pub yearly_cents: i64,
    pub current_interval_cents: i64,
    pub yearly_savings_cents: i64,
}

/// Trial window, present only if a trial was ever started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialView {
    pub is_trialing: bool,
    pub in_trial_period: bool,
    pub trial_start: Option<Timestamp>,
    pub trial_end: Option<Timestamp>,
}

/// Denormalized subscription view for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionView {
    pub subscription_id: String,
    pub creator_id: String,
    pub tier: Tier,
    pub tier_name: &'static str,
    pub status: SubscriptionStatus,
    pub billing_interval: BillingInterval,
    pub current_period_start: Timestamp,
    pub current_period_end: Timestamp,
    /// Commission charged per sale, as a fraction (0.04 for 4%).
    pub commission_rate: f64,
    pub products: UsageView,
    pub pinned_products: UsageView,
    pub near_product_limit: bool,
    pub pricing: PricingView,
    pub features: PlanFeatures,
    pub trial: Option<TrialView>,
    pub grace_period_start: Option<Timestamp>,
}

impl SubscriptionView {
    pub fn from_subscription(subscription: &Subscription) -> Self {
        let tier = subscription.tier();
        let definition = plan_catalog::definition(tier);
        let limits = subscription.limits();

        let trial = subscription.trial_start().map(|_| TrialView {
            is_trialing: subscription.is_trialing(),
            in_trial_period: subscription.is_in_trial_period(),
            trial_start: subscription.trial_start(),
            trial_end: subscription.trial_end(),
        });

        Self {
            subscription_id: subscription.id().to_string(),
            creator_id: subscription.creator_id().to_string(),
            tier,
            tier_name: tier.display_name(),
            status: subscription.status(),
            billing_interval: subscription.billing_interval(),
            current_period_start: subscription.current_period_start(),
            current_period_end: subscription.current_period_end(),
            commission_rate: subscription.commission_rate().as_decimal(),
            products: UsageView {
                used: subscription.products_used(),
                limit: limits.product_limit,
                can_add: subscription.can_add_product(),
            },
            pinned_products: UsageView {
                used: subscription.pinned_products_used(),
                limit: limits.pinned_products_limit,
                can_add: subscription.can_pin_product(),
            },
            near_product_limit: subscription.is_near_product_limit(),
            pricing: PricingView {
                monthly_cents: definition.pricing.monthly_cents,
                yearly_cents: definition.pricing.yearly_cents,
                current_interval_cents: definition
                    .pricing
                    .for_interval(subscription.billing_interval()),
                yearly_savings_cents: plan_catalog::yearly_savings(tier),
            },
            features: definition.features,
            trial,
            grace_period_start: subscription.grace_period_start(),
        }
    }
}

/// Handler for retrieving a creator's subscription view.
pub struct GetSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
}

impl GetSubscriptionHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        query: GetSubscriptionQuery,
    ) -> Result<SubscriptionView, SubscriptionError> {
        let creator_id = lookup::creator_id(&query.creator_id)?;
        let subscription = lookup::load_for_creator(self.repository.as_ref(), &creator_id).await?;
        Ok(SubscriptionView::from_subscription(&subscription))
    }
}
