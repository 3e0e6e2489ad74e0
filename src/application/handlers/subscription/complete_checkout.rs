//! CompleteCheckoutHandler - Webhook handler applying a completed checkout.
//!
//! Reads the session back from the billing provider and routes it through
//! the upgrade use case. The creator, tier and interval come from the
//! metadata written when the checkout was started.

use std::str::FromStr;
use std::sync::Arc;

use tracing::debug;

use crate::domain::foundation::Timestamp;
use crate::domain::subscription::{BillingInterval, Subscription, SubscriptionError};
use crate::ports::{
    metadata_keys, BillingProvider, CheckoutSessionDetails, CheckoutStatus,
    SubscriptionRepository,
};

use super::lookup;
use super::upgrade_subscription::{UpgradeSubscriptionCommand, UpgradeSubscriptionHandler};

/// Command naming the completed session.
#[derive(Debug, Clone)]
pub struct CompleteCheckoutCommand {
    pub session_id: String,
}

/// Result of applying a checkout.
#[derive(Debug, Clone)]
pub struct CompleteCheckoutResult {
    pub subscription: Subscription,
    /// True if this session had already been applied; nothing changed.
    pub already_applied: bool,
}

/// Handler for completed checkouts.
pub struct CompleteCheckoutHandler {
    repository: Arc<dyn SubscriptionRepository>,
    billing: Arc<dyn BillingProvider>,
    upgrade: UpgradeSubscriptionHandler,
}

impl CompleteCheckoutHandler {
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        billing: Arc<dyn BillingProvider>,
    ) -> Self {
        Self {
            upgrade: UpgradeSubscriptionHandler::new(repository.clone()),
            repository,
            billing,
        }
    }

    pub async fn handle(
        &self,
        cmd: CompleteCheckoutCommand,
    ) -> Result<CompleteCheckoutResult, SubscriptionError> {
        // 1. Fetch the session
        lookup::require("session_id", &cmd.session_id)?;
        let session = self
            .billing
            .get_checkout_session(cmd.session_id.trim())
            .await
            .map_err(lookup::billing_error)?;

        if session.status != CheckoutStatus::Complete {
            return Err(SubscriptionError::validation(
                "session_id",
                format!("Checkout session is {}, not complete", session.status),
            ));
        }

        // 2. Read routing metadata and provider ids
        let creator_id = lookup::creator_id(required_metadata(&session, metadata_keys::CREATOR_ID)?)?;
        let tier = lookup::tier(required_metadata(&session, metadata_keys::TIER)?)?;
        let interval =
            BillingInterval::from_str(required_metadata(&session, metadata_keys::INTERVAL)?)?;
        let with_trial = session.metadata_value(metadata_keys::TRIAL) == Some("true");
        let remote_id = required_field("subscription_id", session.subscription_id.as_deref())?;
        let customer_id = required_field("customer_id", session.customer_id.as_deref())?;
        let price_id = required_field("price_id", session.price_id.as_deref())?;

        // 3. Redelivered completion
        let current = lookup::load_for_creator(self.repository.as_ref(), &creator_id).await?;
        if current.tier() == tier
            && current.provider().subscription_id.as_deref() == Some(remote_id)
        {
            debug!(
                creator_id = %creator_id,
                session_id = %cmd.session_id,
                "Checkout already applied"
            );
            return Ok(CompleteCheckoutResult {
                subscription: current,
                already_applied: true,
            });
        }

        // 4. Period from the provider, or a fresh one for the interval
        let (start, end) = match (session.current_period_start, session.current_period_end) {
            (Some(start), Some(end)) => (
                lookup::timestamp("current_period_start", start)?,
                lookup::timestamp("current_period_end", end)?,
            ),
            _ => {
                let now = Timestamp::now();
                (now, interval.period_end_from(now))
            }
        };

        // 5. Delegate
        let result = self
            .upgrade
            .handle(UpgradeSubscriptionCommand {
                creator_id: creator_id.to_string(),
                tier: tier.as_str().to_string(),
                billing_interval: interval,
                provider_subscription_id: remote_id.to_string(),
                provider_customer_id: customer_id.to_string(),
                provider_price_id: price_id.to_string(),
                current_period_start: start,
                current_period_end: end,
                with_trial,
            })
            .await?;

        Ok(CompleteCheckoutResult {
            subscription: result.subscription,
            already_applied: false,
        })
    }
}

fn required_metadata<'a>(
    session: &'a CheckoutSessionDetails,
    key: &str,
) -> Result<&'a str, SubscriptionError> {
    required_field(&format!("metadata.{}", key), session.metadata_value(key))
}

fn required_field<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, SubscriptionError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim()),
        _ => Err(SubscriptionError::validation(
            field,
            format!("{} is missing from the checkout session", field),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::adapters::{InMemorySubscriptionRepository, MockBillingProvider};
    use crate::domain::foundation::{CreatorId, ErrorCode, UserId};
    use crate::domain::subscription::{NewSubscription, Tier};
    use crate::ports::CheckoutRequest;

    struct Fixture {
        handler: CompleteCheckoutHandler,
        repo: Arc<InMemorySubscriptionRepository>,
        billing: MockBillingProvider,
    }

    fn fixture() -> Fixture {
        let sub = Subscription::create(NewSubscription::new("user-1", "creator-1")).unwrap();
        let repo = Arc::new(InMemorySubscriptionRepository::with_subscriptions([sub]));
        let billing = MockBillingProvider::new();
        Fixture {
            handler: CompleteCheckoutHandler::new(repo.clone(), Arc::new(billing.clone())),
            repo,
            billing,
        }
    }

    async fn open_session(billing: &MockBillingProvider, tier: Tier, with_trial: bool) -> String {
        billing
            .create_checkout_session(CheckoutRequest {
                customer_id: None,
                email: "creator@example.com".to_string(),
                user_id: UserId::new("user-1").unwrap(),
                creator_id: CreatorId::new("creator-1").unwrap(),
                tier,
                interval: BillingInterval::Month,
                with_trial,
                success_url: "https://shop.example.com/ok".to_string(),
                cancel_url: "https://shop.example.com/cancel".to_string(),
            })
            .await
            .unwrap()
            .session_id
    }

    fn command(session_id: &str) -> CompleteCheckoutCommand {
        CompleteCheckoutCommand {
            session_id: session_id.to_string(),
        }
    }

    #[tokio::test]
    async fn completed_session_upgrades_subscription() {
        let f = fixture();
        let session_id = open_session(&f.billing, Tier::Pro, false).await;
        f.billing.complete_session(&session_id, "sub_1", "cus_1", "price_pro_month");

        let result = f.handler.handle(command(&session_id)).await.unwrap();

        assert!(!result.already_applied);
        let sub = f
            .repo
            .find_by_provider_subscription_id("sub_1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sub.tier(), Tier::Pro);
        assert_eq!(sub.billing_interval(), BillingInterval::Month);
        assert_eq!(
            sub.current_period_end()
                .duration_since(&sub.current_period_start())
                .num_days(),
            30
        );
    }

    #[tokio::test]
    async fn redelivered_completion_is_idempotent() {
        let f = fixture();
        let session_id = open_session(&f.billing, Tier::Pro, false).await;
        f.billing.complete_session(&session_id, "sub_1", "cus_1", "price_1");
        let first = f.handler.handle(command(&session_id)).await.unwrap();

        let second = f.handler.handle(command(&session_id)).await.unwrap();

        assert!(second.already_applied);
        assert_eq!(second.subscription, first.subscription);
    }

    #[tokio::test]
    async fn business_checkout_with_trial_opens_trial() {
        let f = fixture();
        let session_id = open_session(&f.billing, Tier::Business, true).await;
        f.billing.complete_session(&session_id, "sub_1", "cus_1", "price_biz");

        let result = f.handler.handle(command(&session_id)).await.unwrap();

        assert!(result.subscription.is_trialing());
    }

    #[tokio::test]
    async fn open_session_is_rejected() {
        let f = fixture();
        let session_id = open_session(&f.billing, Tier::Pro, false).await;

        let err = f.handler.handle(command(&session_id)).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::ValidationFailed);
        assert!(err.message().contains("open"));
    }

    #[tokio::test]
    async fn session_without_routing_metadata_is_rejected() {
        let f = fixture();
        f.billing.add_session(
            "cs_manual",
            CheckoutSessionDetails {
                subscription_id: Some("sub_1".to_string()),
                customer_id: Some("cus_1".to_string()),
                price_id: Some("price_1".to_string()),
                status: CheckoutStatus::Complete,
                current_period_start: None,
                current_period_end: None,
                metadata: HashMap::new(),
            },
        );

        let err = f.handler.handle(command("cs_manual")).await.unwrap_err();

        assert_eq!(
            err,
            SubscriptionError::validation(
                "metadata.creator_id",
                "metadata.creator_id is missing from the checkout session"
            )
        );
    }

    #[tokio::test]
    async fn missing_period_falls_back_to_interval_length() {
        let f = fixture();
        f.billing.add_session(
            "cs_manual",
            CheckoutSessionDetails {
                subscription_id: Some("sub_1".to_string()),
                customer_id: Some("cus_1".to_string()),
                price_id: Some("price_1".to_string()),
                status: CheckoutStatus::Complete,
                current_period_start: None,
                current_period_end: None,
                metadata: HashMap::from([
                    (metadata_keys::CREATOR_ID.to_string(), "creator-1".to_string()),
                    (metadata_keys::TIER.to_string(), "pro".to_string()),
                    (metadata_keys::INTERVAL.to_string(), "year".to_string()),
                ]),
            },
        );

        let result = f.handler.handle(command("cs_manual")).await.unwrap();

        let sub = result.subscription;
        assert_eq!(
            sub.current_period_end()
                .duration_since(&sub.current_period_start())
                .num_days(),
            365
        );
    }

    #[tokio::test]
    async fn unknown_session_surfaces_provider_error() {
        let f = fixture();

        let err = f.handler.handle(command("cs_missing")).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::BillingProviderError);
        assert!(!err.is_retryable());
    }
}
