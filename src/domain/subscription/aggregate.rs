//! Subscription aggregate entity.
//!
//! One subscription per creator. It owns the current plan, lifecycle status,
//! billing period, usage counters, trial window, grace-period marker and the
//! billing-provider linkage. Nothing else mutates these fields.
//!
//! # Design Decisions
//!
//! - **Private state**: fields are only reachable through the operations below
//! - **Results, not panics**: business-rule violations return `DomainError`
//! - **Cancelled is terminal**: only `cancel_subscription`, `end_trial`,
//!   decrements and `change_billing_interval` still apply after cancellation
//! - **Denormalized commission**: `commission_rate` is copied from the catalog
//!   on plan change and is what gets charged until the next change

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    CommissionRate, CreatorId, DomainError, ErrorCode, StateMachine, SubscriptionId, Timestamp,
    UserId,
};

use super::plan_catalog::{self, PlanLimits};
use super::{
    BillingInterval, Limit, LimitedResource, Plan, SubscriptionRecord, SubscriptionStatus, Tier,
};

/// Identifiers held by the external billing provider. All optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderLinkage {
    pub subscription_id: Option<String>,
    pub customer_id: Option<String>,
    pub price_id: Option<String>,
}

impl ProviderLinkage {
    pub fn new(
        subscription_id: impl Into<String>,
        customer_id: impl Into<String>,
        price_id: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: Some(subscription_id.into()),
            customer_id: Some(customer_id.into()),
            price_id: Some(price_id.into()),
        }
    }
}

/// Parameters for [`Subscription::create`].
#[derive(Debug, Clone, Default)]
pub struct NewSubscription {
    pub user_id: String,
    pub creator_id: String,
    /// Defaults to the entry tier.
    pub tier: Option<Tier>,
    /// Defaults to yearly.
    pub billing_interval: Option<BillingInterval>,
    /// Honoured only if the tier offers a trial.
    pub with_trial: bool,
    pub provider: Option<ProviderLinkage>,
}

impl NewSubscription {
    pub fn new(user_id: impl Into<String>, creator_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            creator_id: creator_id.into(),
            ..Self::default()
        }
    }

    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = Some(tier);
        self
    }

    pub fn with_interval(mut self, interval: BillingInterval) -> Self {
        self.billing_interval = Some(interval);
        self
    }

    pub fn with_trial(mut self) -> Self {
        self.with_trial = true;
        self
    }

    pub fn with_provider(mut self, provider: ProviderLinkage) -> Self {
        self.provider = Some(provider);
        self
    }
}

/// Subscription aggregate.
///
/// # Invariants
///
/// - Usage counters never pass a finite limit through `increment_*`
/// - `grace_period_start.is_some()` iff `status == PastDue`
/// - A cancelled subscription is never un-cancelled
/// - `commission_rate` only changes in `change_plan`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    id: SubscriptionId,
    user_id: UserId,
    creator_id: CreatorId,
    plan: Plan,
    status: SubscriptionStatus,
    billing_interval: BillingInterval,
    current_period_start: Timestamp,
    current_period_end: Timestamp,
    products_used: u32,
    pinned_products_used: u32,
    commission_rate: CommissionRate,
    is_trialing: bool,
    trial_start: Option<Timestamp>,
    trial_end: Option<Timestamp>,
    grace_period_start: Option<Timestamp>,
    provider: ProviderLinkage,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Subscription {
    /// Creates a new active subscription starting now.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailed` if the user or creator id is blank.
    pub fn create(params: NewSubscription) -> Result<Self, DomainError> {
        Self::create_at(params, Timestamp::now())
    }

    /// Creates a new active subscription whose first period starts at `now`.
    pub fn create_at(params: NewSubscription, now: Timestamp) -> Result<Self, DomainError> {
        let user_id = UserId::new(params.user_id)?;
        let creator_id = CreatorId::new(params.creator_id)?;
        let tier = params.tier.unwrap_or(Tier::ENTRY);
        let billing_interval = params.billing_interval.unwrap_or_default();

        let trial_end = if params.with_trial {
            plan_catalog::trial_end_date(tier, now)
        } else {
            None
        };

        Ok(Self {
            id: SubscriptionId::new(),
            user_id,
            creator_id,
            plan: Plan::new(tier),
            status: SubscriptionStatus::Active,
            billing_interval,
            current_period_start: now,
            current_period_end: billing_interval.period_end_from(now),
            products_used: 0,
            pinned_products_used: 0,
            commission_rate: plan_catalog::limits_for(tier).commission_rate,
            is_trialing: trial_end.is_some(),
            trial_start: trial_end.map(|_| now),
            trial_end,
            grace_period_start: None,
            provider: params.provider.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuilds an aggregate from storage without re-checking business rules.
    ///
    /// # Errors
    ///
    /// - `InvalidTier` if the stored tier is unknown
    /// - `ValidationFailed` if the stored status, interval, ids or commission
    ///   cannot be represented
    pub fn reconstitute(record: SubscriptionRecord) -> Result<Self, DomainError> {
        let tier: Tier = record.tier.parse().map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidTier,
                format!("Stored subscription has unknown tier: {}", record.tier),
            )
            .with_detail("subscription_id", record.id.to_string())
        })?;
        let status: SubscriptionStatus = record.status.parse()?;
        let billing_interval: BillingInterval = record.billing_interval.parse()?;
        let commission_rate = CommissionRate::from_basis_points(record.commission_basis_points)?;

        Ok(Self {
            id: record.id,
            user_id: UserId::new(record.user_id)?,
            creator_id: CreatorId::new(record.creator_id)?,
            plan: Plan::new(tier),
            status,
            billing_interval,
            current_period_start: record.current_period_start,
            current_period_end: record.current_period_end,
            products_used: record.products_used,
            pinned_products_used: record.pinned_products_used,
            commission_rate,
            is_trialing: record.is_trialing,
            trial_start: record.trial_start,
            trial_end: record.trial_end,
            grace_period_start: record.grace_period_start,
            provider: ProviderLinkage {
                subscription_id: record.provider_subscription_id,
                customer_id: record.provider_customer_id,
                price_id: record.provider_price_id,
            },
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    /// Flattens the aggregate into its persisted shape.
    pub fn to_record(&self) -> SubscriptionRecord {
        SubscriptionRecord {
            id: self.id,
            user_id: self.user_id.as_str().to_string(),
            creator_id: self.creator_id.as_str().to_string(),
            tier: self.plan.tier().as_str().to_string(),
            status: self.status.as_str().to_string(),
            billing_interval: self.billing_interval.as_str().to_string(),
            current_period_start: self.current_period_start,
            current_period_end: self.current_period_end,
            products_used: self.products_used,
            pinned_products_used: self.pinned_products_used,
            commission_basis_points: self.commission_rate.basis_points(),
            is_trialing: self.is_trialing,
            trial_start: self.trial_start,
            trial_end: self.trial_end,
            grace_period_start: self.grace_period_start,
            provider_subscription_id: self.provider.subscription_id.clone(),
            provider_customer_id: self.provider.customer_id.clone(),
            provider_price_id: self.provider.price_id.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Accessors
    // ════════════════════════════════════════════════════════════════════════

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn creator_id(&self) -> &CreatorId {
        &self.creator_id
    }

    pub fn plan(&self) -> Plan {
        self.plan
    }

    pub fn tier(&self) -> Tier {
        self.plan.tier()
    }

    pub fn status(&self) -> SubscriptionStatus {
        self.status
    }

    pub fn billing_interval(&self) -> BillingInterval {
        self.billing_interval
    }

    pub fn current_period_start(&self) -> Timestamp {
        self.current_period_start
    }

    pub fn current_period_end(&self) -> Timestamp {
        self.current_period_end
    }

    pub fn products_used(&self) -> u32 {
        self.products_used
    }

    pub fn pinned_products_used(&self) -> u32 {
        self.pinned_products_used
    }

    pub fn commission_rate(&self) -> CommissionRate {
        self.commission_rate
    }

    pub fn is_trialing(&self) -> bool {
        self.is_trialing
    }

    pub fn trial_start(&self) -> Option<Timestamp> {
        self.trial_start
    }

    pub fn trial_end(&self) -> Option<Timestamp> {
        self.trial_end
    }

    pub fn grace_period_start(&self) -> Option<Timestamp> {
        self.grace_period_start
    }

    pub fn provider(&self) -> &ProviderLinkage {
        &self.provider
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn is_cancelled(&self) -> bool {
        self.status.is_cancelled()
    }

    pub fn is_past_due(&self) -> bool {
        self.status == SubscriptionStatus::PastDue
    }

    // ════════════════════════════════════════════════════════════════════════
    // Derived queries
    // ════════════════════════════════════════════════════════════════════════

    /// Catalog limits for the current tier.
    pub fn limits(&self) -> PlanLimits {
        plan_catalog::limits_for(self.plan.tier())
    }

    pub fn limit_of(&self, resource: LimitedResource) -> Limit {
        let limits = self.limits();
        match resource {
            LimitedResource::Product => limits.product_limit,
            LimitedResource::PinnedProduct => limits.pinned_products_limit,
        }
    }

    pub fn usage_of(&self, resource: LimitedResource) -> u32 {
        match resource {
            LimitedResource::Product => self.products_used,
            LimitedResource::PinnedProduct => self.pinned_products_used,
        }
    }

    /// True if one more unit of `resource` fits under the current plan.
    pub fn can_consume(&self, resource: LimitedResource) -> bool {
        self.limit_of(resource).allows_another(self.usage_of(resource))
    }

    pub fn can_add_product(&self) -> bool {
        self.can_consume(LimitedResource::Product)
    }

    pub fn can_pin_product(&self) -> bool {
        self.can_consume(LimitedResource::PinnedProduct)
    }

    pub fn is_near_product_limit(&self) -> bool {
        self.limit_of(LimitedResource::Product)
            .is_near_limit(self.products_used)
    }

    pub fn is_at_product_limit(&self) -> bool {
        self.limit_of(LimitedResource::Product)
            .is_at_limit(self.products_used)
    }

    pub fn is_in_trial_period(&self) -> bool {
        self.is_in_trial_period_at(Timestamp::now())
    }

    /// True iff trialing and `now` is before the trial end.
    pub fn is_in_trial_period_at(&self, now: Timestamp) -> bool {
        match self.trial_end {
            Some(end) => self.is_trialing && now.is_before(&end),
            None => false,
        }
    }

    /// True if past due and `grace_days` have passed since the grace start.
    pub fn grace_period_elapsed(&self, now: Timestamp, grace_days: u32) -> bool {
        match (self.status, self.grace_period_start) {
            (SubscriptionStatus::PastDue, Some(start)) => {
                !now.is_before(&start.add_days(i64::from(grace_days)))
            }
            _ => false,
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Plan changes
    // ════════════════════════════════════════════════════════════════════════

    /// Moves to `target`, recomputing the commission rate.
    ///
    /// Overwrites all three provider ids when `provider` is given.
    ///
    /// # Errors
    ///
    /// - `SubscriptionCancelled` if cancelled
    /// - `AlreadyOnPlan` if `target` is the current tier
    pub fn change_plan(
        &mut self,
        target: Tier,
        provider: Option<ProviderLinkage>,
    ) -> Result<(), DomainError> {
        self.ensure_not_cancelled("change the plan of")?;
        if self.plan.is(target) {
            return Err(DomainError::new(
                ErrorCode::AlreadyOnPlan,
                "Already subscribed to this plan",
            ));
        }

        self.plan = Plan::new(target);
        self.commission_rate = plan_catalog::limits_for(target).commission_rate;
        if let Some(linkage) = provider {
            self.provider = linkage;
        }
        self.touch();
        Ok(())
    }

    /// Moves to a strictly higher tier.
    ///
    /// # Errors
    ///
    /// - `SubscriptionCancelled` if cancelled
    /// - `NotAnUpgrade` for downgrades and same-tier requests
    pub fn upgrade(
        &mut self,
        target: Tier,
        provider: Option<ProviderLinkage>,
    ) -> Result<(), DomainError> {
        self.ensure_not_cancelled("upgrade")?;
        if !self.plan.can_upgrade_to(target) {
            return Err(DomainError::new(
                ErrorCode::NotAnUpgrade,
                "Can only upgrade to a higher plan",
            )
            .with_detail("from", self.plan.tier().as_str())
            .with_detail("to", target.as_str()));
        }
        self.change_plan(target, provider)
    }

    /// Updates the billing interval and, when given, the provider price id.
    pub fn change_billing_interval(&mut self, interval: BillingInterval, price_id: Option<String>) {
        self.billing_interval = interval;
        if price_id.is_some() {
            self.provider.price_id = price_id;
        }
        self.touch();
    }

    // ════════════════════════════════════════════════════════════════════════
    // Lifecycle
    // ════════════════════════════════════════════════════════════════════════

    /// Cancels the subscription. Repeating the call is a no-op transition.
    ///
    /// Clears the remote subscription id and the grace-period marker.
    pub fn cancel_subscription(&mut self) {
        self.status = SubscriptionStatus::Cancelled;
        self.provider.subscription_id = None;
        self.grace_period_start = None;
        self.touch();
    }

    /// Enters the payment grace period.
    ///
    /// Re-stamps the grace start when already past due.
    ///
    /// # Errors
    ///
    /// Returns `SubscriptionCancelled` if cancelled.
    pub fn mark_as_past_due(&mut self, grace_period_start: Timestamp) -> Result<(), DomainError> {
        if self.is_cancelled() {
            return Err(DomainError::new(
                ErrorCode::SubscriptionCancelled,
                "Cannot mark a cancelled subscription as unpaid",
            ));
        }
        self.status = self.transition(SubscriptionStatus::PastDue)?;
        self.grace_period_start = Some(grace_period_start);
        self.touch();
        Ok(())
    }

    /// Starts a new billing period and returns to good standing.
    ///
    /// # Errors
    ///
    /// - `SubscriptionCancelled` if cancelled
    /// - `ValidationFailed` if `end` is not after `start`
    pub fn renew_period(&mut self, start: Timestamp, end: Timestamp) -> Result<(), DomainError> {
        self.ensure_not_cancelled("renew")?;
        if !end.is_after(&start) {
            return Err(DomainError::validation(
                "current_period_end",
                "Period end must be after period start",
            ));
        }
        self.status = self.transition(SubscriptionStatus::Active)?;
        self.current_period_start = start;
        self.current_period_end = end;
        self.grace_period_start = None;
        self.touch();
        Ok(())
    }

    /// Pushes the current period end out by `days`, returning the previous end.
    ///
    /// # Errors
    ///
    /// - `SubscriptionCancelled` if cancelled
    /// - `ValidationFailed` if `days` is zero
    pub fn extend_current_period(&mut self, days: u32) -> Result<Timestamp, DomainError> {
        self.ensure_not_cancelled("extend")?;
        if days == 0 {
            return Err(DomainError::validation("days", "Days must be greater than zero"));
        }
        let previous = self.current_period_end;
        self.current_period_end = previous.add_days(i64::from(days));
        self.touch();
        Ok(previous)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Trial
    // ════════════════════════════════════════════════════════════════════════

    pub fn start_trial(&mut self) -> Result<(), DomainError> {
        self.start_trial_at(Timestamp::now())
    }

    /// Opens a trial window at `now`. Does not change status.
    ///
    /// # Errors
    ///
    /// - `SubscriptionCancelled` if cancelled
    /// - `TrialUnavailable` if the tier has no trial
    pub fn start_trial_at(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.ensure_not_cancelled("start a trial on")?;
        let trial_end = plan_catalog::trial_end_date(self.plan.tier(), now).ok_or_else(|| {
            DomainError::new(
                ErrorCode::TrialUnavailable,
                "This plan does not offer a trial period",
            )
        })?;
        self.trial_start = Some(now);
        self.trial_end = Some(trial_end);
        self.is_trialing = true;
        self.touch();
        Ok(())
    }

    /// Clears the trialing flag. Trial dates are kept.
    pub fn end_trial(&mut self) {
        self.is_trialing = false;
        self.touch();
    }

    // ════════════════════════════════════════════════════════════════════════
    // Usage
    // ════════════════════════════════════════════════════════════════════════

    /// Consumes one slot of `resource`.
    ///
    /// # Errors
    ///
    /// - `SubscriptionCancelled` if cancelled
    /// - `LimitReached` if the plan has no slot left; the counter is unchanged
    pub fn increment_usage(&mut self, resource: LimitedResource) -> Result<(), DomainError> {
        self.ensure_not_cancelled("record usage on")?;
        let limit = self.limit_of(resource);
        let next = self.usage_of(resource).checked_add(1);
        let Some(next) = next.filter(|_| self.can_consume(resource)) else {
            return Err(DomainError::new(
                ErrorCode::LimitReached,
                format!(
                    "{} limit reached ({}). Upgrade your plan to add more {}.",
                    capitalize(resource.noun()),
                    limit,
                    resource.plural()
                ),
            )
            .with_detail("resource", resource.noun()));
        };
        *self.counter_mut(resource) = next;
        self.touch();
        Ok(())
    }

    /// Releases one slot of `resource`, flooring at zero.
    pub fn decrement_usage(&mut self, resource: LimitedResource) {
        let counter = self.counter_mut(resource);
        *counter = counter.saturating_sub(1);
        self.touch();
    }

    pub fn increment_products_used(&mut self) -> Result<(), DomainError> {
        self.increment_usage(LimitedResource::Product)
    }

    pub fn increment_pinned_products_used(&mut self) -> Result<(), DomainError> {
        self.increment_usage(LimitedResource::PinnedProduct)
    }

    pub fn decrement_products_used(&mut self) {
        self.decrement_usage(LimitedResource::Product)
    }

    pub fn decrement_pinned_products_used(&mut self) {
        self.decrement_usage(LimitedResource::PinnedProduct)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Internals
    // ════════════════════════════════════════════════════════════════════════

    fn counter_mut(&mut self, resource: LimitedResource) -> &mut u32 {
        match resource {
            LimitedResource::Product => &mut self.products_used,
            LimitedResource::PinnedProduct => &mut self.pinned_products_used,
        }
    }

    fn ensure_not_cancelled(&self, action: &str) -> Result<(), DomainError> {
        if self.is_cancelled() {
            return Err(DomainError::new(
                ErrorCode::SubscriptionCancelled,
                format!("Cannot {} a cancelled subscription", action),
            )
            .with_detail("subscription_id", self.id.to_string()));
        }
        Ok(())
    }

    fn transition(&self, target: SubscriptionStatus) -> Result<SubscriptionStatus, DomainError> {
        self.status
            .transition_to(target)
            .map_err(|e| DomainError::new(ErrorCode::InvalidStateTransition, e.to_string()))
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
