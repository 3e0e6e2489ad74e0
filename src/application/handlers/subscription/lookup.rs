//! Input parsing and aggregate loading shared by the subscription handlers.

use crate::domain::foundation::{CreatorId, SubscriptionId, Timestamp};
use crate::domain::subscription::{Plan, Subscription, SubscriptionError, Tier};
use crate::ports::{BillingProviderError, SubscriptionRepository};

/// Rejects blank input for `field`.
pub(super) fn require(field: &str, value: &str) -> Result<(), SubscriptionError> {
    if value.trim().is_empty() {
        return Err(SubscriptionError::validation(
            field,
            format!("{} is required", field),
        ));
    }
    Ok(())
}

pub(super) fn creator_id(raw: &str) -> Result<CreatorId, SubscriptionError> {
    Ok(CreatorId::new(raw.trim())?)
}

pub(super) fn subscription_id(raw: &str) -> Result<SubscriptionId, SubscriptionError> {
    Ok(SubscriptionId::parse(raw)?)
}

pub(super) fn tier(raw: &str) -> Result<Tier, SubscriptionError> {
    Ok(Plan::parse(raw)?.tier())
}

/// Converts a provider Unix timestamp.
pub(super) fn timestamp(field: &str, secs: i64) -> Result<Timestamp, SubscriptionError> {
    Timestamp::from_unix_secs(secs).ok_or_else(|| {
        SubscriptionError::validation(field, format!("{} is not a valid timestamp", secs))
    })
}

pub(super) async fn load_for_creator(
    repository: &dyn SubscriptionRepository,
    creator_id: &CreatorId,
) -> Result<Subscription, SubscriptionError> {
    repository
        .find_by_creator_id(creator_id)
        .await?
        .ok_or_else(|| SubscriptionError::not_found_for_creator(creator_id.clone()))
}

pub(super) async fn load_for_provider_subscription(
    repository: &dyn SubscriptionRepository,
    remote_id: &str,
) -> Result<Subscription, SubscriptionError> {
    require("provider_subscription_id", remote_id)?;
    repository
        .find_by_provider_subscription_id(remote_id)
        .await?
        .ok_or_else(|| SubscriptionError::not_found_for_provider_subscription(remote_id))
}

pub(super) fn billing_error(err: BillingProviderError) -> SubscriptionError {
    SubscriptionError::billing_provider(err.to_string(), err.retryable)
}
