//! StartCheckoutHandler - Command handler opening a provider checkout for an upgrade.
//!
//! Nothing changes locally here. The subscription is upgraded once the
//! provider reports the checkout complete.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ProviderConfig;
use crate::domain::foundation::UserId;
use crate::domain::subscription::{plan_catalog, BillingInterval, SubscriptionError};
use crate::ports::{BillingProvider, CheckoutRequest, SubscriptionRepository};

use super::lookup;

/// Redirect targets handed to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRedirects {
    pub success_url: String,
    pub cancel_url: String,
}

impl From<&ProviderConfig> for CheckoutRedirects {
    fn from(config: &ProviderConfig) -> Self {
        Self {
            success_url: config.success_url.clone(),
            cancel_url: config.cancel_url.clone(),
        }
    }
}

/// Command to start checkout.
#[derive(Debug, Clone)]
pub struct StartCheckoutCommand {
    pub user_id: String,
    pub creator_id: String,
    pub email: String,
    pub tier: String,
    /// Defaults to the subscription's current interval.
    pub billing_interval: Option<BillingInterval>,
    /// Honoured only if the tier offers a trial and none was used yet.
    pub with_trial: bool,
}

/// Checkout session to send the customer to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartCheckoutResult {
    pub session_id: String,
    pub url: String,
    pub trial_included: bool,
}

/// Handler for starting checkout.
pub struct StartCheckoutHandler {
    repository: Arc<dyn SubscriptionRepository>,
    billing: Arc<dyn BillingProvider>,
    redirects: CheckoutRedirects,
}

impl StartCheckoutHandler {
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        billing: Arc<dyn BillingProvider>,
        redirects: CheckoutRedirects,
    ) -> Self {
        Self {
            repository,
            billing,
            redirects,
        }
    }

    pub async fn handle(
        &self,
        cmd: StartCheckoutCommand,
    ) -> Result<StartCheckoutResult, SubscriptionError> {
        // 1. Validate input
        lookup::require("email", &cmd.email)?;
        let user_id = UserId::new(cmd.user_id.trim())?;
        let creator_id = lookup::creator_id(&cmd.creator_id)?;
        let target = lookup::tier(&cmd.tier)?;

        // 2. Load and check ownership
        let subscription = lookup::load_for_creator(self.repository.as_ref(), &creator_id).await?;
        if subscription.user_id() != &user_id {
            warn!(creator_id = %creator_id, user_id = %user_id, "Checkout by non-owner");
            return Err(SubscriptionError::forbidden(
                "Only the subscription owner can change its plan",
            ));
        }
        if subscription.is_cancelled() {
            return Err(SubscriptionError::already_cancelled(subscription.id()));
        }
        if !subscription.plan().can_upgrade_to(target) {
            return Err(SubscriptionError::not_an_upgrade(subscription.tier(), target));
        }

        // 3. Trials are offered once, on tiers that have one
        let with_trial = cmd.with_trial
            && plan_catalog::trial_days(target) > 0
            && subscription.trial_start().is_none();

        // 4. Ask the provider for a session
        let request = CheckoutRequest {
            customer_id: subscription.provider().customer_id.clone(),
            email: cmd.email.trim().to_string(),
            user_id,
            creator_id: creator_id.clone(),
            tier: target,
            interval: cmd
                .billing_interval
                .unwrap_or_else(|| subscription.billing_interval()),
            with_trial,
            success_url: self.redirects.success_url.clone(),
            cancel_url: self.redirects.cancel_url.clone(),
        };
        let session = self
            .billing
            .create_checkout_session(request)
            .await
            .map_err(lookup::billing_error)?;

        info!(
            creator_id = %creator_id,
            tier = %target,
            session_id = %session.session_id,
            with_trial,
            "Checkout started"
        );

        Ok(StartCheckoutResult {
            session_id: session.session_id,
            url: session.url,
            trial_included: with_trial,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemorySubscriptionRepository, MockBillingProvider};
    use crate::domain::foundation::ErrorCode;
    use crate::domain::subscription::{NewSubscription, Subscription, Tier};
    use crate::ports::{metadata_keys, BillingProviderErrorCode, BillingProviderError};

    fn redirects() -> CheckoutRedirects {
        CheckoutRedirects {
            success_url: "https://shop.example.com/billing/success".to_string(),
            cancel_url: "https://shop.example.com/billing/cancel".to_string(),
        }
    }

    fn setup(sub: Subscription) -> (StartCheckoutHandler, MockBillingProvider) {
        let repo = Arc::new(InMemorySubscriptionRepository::with_subscriptions([sub]));
        let billing = MockBillingProvider::new();
        (
            StartCheckoutHandler::new(repo, Arc::new(billing.clone()), redirects()),
            billing,
        )
    }

    fn starter() -> Subscription {
        Subscription::create(NewSubscription::new("user-1", "creator-1")).unwrap()
    }

    fn command(tier: &str, with_trial: bool) -> StartCheckoutCommand {
        StartCheckoutCommand {
            user_id: "user-1".to_string(),
            creator_id: "creator-1".to_string(),
            email: "creator@example.com".to_string(),
            tier: tier.to_string(),
            billing_interval: Some(BillingInterval::Month),
            with_trial,
        }
    }

    #[tokio::test]
    async fn creates_session_tagged_with_routing_metadata() {
        let (handler, billing) = setup(starter());

        let result = handler.handle(command("pro", false)).await.unwrap();

        assert!(result.url.contains(&result.session_id));
        let details = billing.get_checkout_session(&result.session_id).await.unwrap();
        assert_eq!(details.metadata_value(metadata_keys::CREATOR_ID), Some("creator-1"));
        assert_eq!(details.metadata_value(metadata_keys::TIER), Some("pro"));
        assert_eq!(details.metadata_value(metadata_keys::INTERVAL), Some("month"));
    }

    #[tokio::test]
    async fn trial_dropped_for_tier_without_trial() {
        let (handler, _) = setup(starter());

        let result = handler.handle(command("pro", true)).await.unwrap();

        assert!(!result.trial_included);
    }

    #[tokio::test]
    async fn trial_kept_for_business() {
        let (handler, _) = setup(starter());

        let result = handler.handle(command("business", true)).await.unwrap();

        assert!(result.trial_included);
    }

    #[tokio::test]
    async fn non_upgrade_rejected_before_provider_call() {
        let sub = Subscription::create(
            NewSubscription::new("user-1", "creator-1").with_tier(Tier::Pro),
        )
        .unwrap();
        let (handler, billing) = setup(sub);

        let err = handler.handle(command("starter", false)).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::NotAnUpgrade);
        assert!(!billing.was_called("create_checkout_session"));
    }

    #[tokio::test]
    async fn other_user_cannot_start_checkout() {
        let (handler, _) = setup(starter());
        let cmd = StartCheckoutCommand {
            user_id: "user-2".to_string(),
            ..command("pro", false)
        };

        let err = handler.handle(cmd).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn blank_email_fails_validation() {
        let (handler, _) = setup(starter());
        let cmd = StartCheckoutCommand {
            email: String::new(),
            ..command("pro", false)
        };

        let err = handler.handle(cmd).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn provider_rejection_is_not_retryable() {
        let (handler, billing) = setup(starter());
        billing.set_method_error(
            "create_checkout_session",
            BillingProviderError::new(BillingProviderErrorCode::Rejected, "price archived"),
        );

        let err = handler.handle(command("pro", false)).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::BillingProviderError);
        assert!(!err.is_retryable());
    }
}
