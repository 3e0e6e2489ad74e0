//! CheckLimitHandler - Query handler classifying usage as ok, warning or blocked.
//!
//! Sits in front of the catalog: before publishing or pinning a product the
//! caller asks for the current status of the relevant counter.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::subscription::{
    Limit, LimitStatus, LimitedResource, Subscription, SubscriptionError, Tier,
};
use crate::ports::SubscriptionRepository;

use super::lookup;

/// Query for one resource's limit status.
#[derive(Debug, Clone)]
pub struct CheckLimitQuery {
    pub creator_id: String,
    pub resource: LimitedResource,
}

/// Query for both resources at once.
#[derive(Debug, Clone)]
pub struct CheckAllLimitsQuery {
    pub creator_id: String,
}

/// Status of one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckLimitResult {
    pub resource: LimitedResource,
    pub status: LimitStatus,
    pub current: u32,
    /// `-1` when unlimited.
    pub limit: Limit,
    /// User-facing explanation for warning and blocked statuses.
    pub message: Option<String>,
}

impl CheckLimitResult {
    pub(super) fn evaluate(subscription: &Subscription, resource: LimitedResource) -> Self {
        let current = subscription.usage_of(resource);
        let limit = subscription.limit_of(resource);
        let status = limit.status_for(current);
        Self {
            resource,
            status,
            current,
            limit,
            message: status_message(status, resource, limit, subscription.tier()),
        }
    }
}

/// Status of both resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckAllLimitsResult {
    pub products: CheckLimitResult,
    pub pinned_products: CheckLimitResult,
}

impl CheckAllLimitsResult {
    /// Either resource is blocked.
    pub fn has_blocking_limit(&self) -> bool {
        self.products.status.is_blocked() || self.pinned_products.status.is_blocked()
    }

    /// Either resource is at warning or worse.
    pub fn has_warning(&self) -> bool {
        self.products.status.needs_attention() || self.pinned_products.status.needs_attention()
    }
}

pub(super) fn status_message(
    status: LimitStatus,
    resource: LimitedResource,
    limit: Limit,
    tier: Tier,
) -> Option<String> {
    match status {
        LimitStatus::Ok => None,
        LimitStatus::Warning => Some(format!(
            "Only one {} slot left on the {} plan.",
            resource.noun(),
            tier.display_name()
        )),
        LimitStatus::Blocked => Some(format!(
            "You have reached the limit of {} {} on the {} plan. Upgrade to add more.",
            limit,
            resource.plural(),
            tier.display_name()
        )),
    }
}

/// Handler for limit status checks.
pub struct CheckLimitHandler {
    repository: Arc<dyn SubscriptionRepository>,
}

impl CheckLimitHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, query: CheckLimitQuery) -> Result<CheckLimitResult, SubscriptionError> {
        let creator_id = lookup::creator_id(&query.creator_id)?;
        let subscription = lookup::load_for_creator(self.repository.as_ref(), &creator_id).await?;
        Ok(CheckLimitResult::evaluate(&subscription, query.resource))
    }

    /// Checks products and pinned products concurrently.
    pub async fn handle_all(
        &self,
        query: CheckAllLimitsQuery,
    ) -> Result<CheckAllLimitsResult, SubscriptionError> {
        let products = self.handle(CheckLimitQuery {
            creator_id: query.creator_id.clone(),
            resource: LimitedResource::Product,
        });
        let pinned_products = self.handle(CheckLimitQuery {
            creator_id: query.creator_id,
            resource: LimitedResource::PinnedProduct,
        });

        let (products, pinned_products) = futures::try_join!(products, pinned_products)?;

        Ok(CheckAllLimitsResult {
            products,
            pinned_products,
        })
    }
}
