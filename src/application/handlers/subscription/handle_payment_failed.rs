//! HandlePaymentFailedHandler - Webhook handler opening the payment grace period.
//!
//! The webhook only knows the provider's subscription id, so lookup goes
//! through that id rather than the creator.
//!
//! Redelivered events are absorbed by re-inspection:
//! - already past due with a grace start: the existing start is returned
//! - failure older than the current period: the period was renewed after the
//!   failure, so the event is acknowledged without reopening a grace period

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::foundation::{SubscriptionId, Timestamp};
use crate::domain::subscription::SubscriptionError;
use crate::ports::SubscriptionRepository;

use super::lookup;

/// Command carrying a failed-payment notification.
#[derive(Debug, Clone)]
pub struct HandlePaymentFailedCommand {
    pub provider_subscription_id: String,
    pub failed_at: Timestamp,
}

/// What the handler did with the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentFailedOutcome {
    /// Grace period opened now.
    MarkedPastDue,
    /// Grace period was already open; nothing changed.
    AlreadyPastDue,
    /// Failure predates the current period; nothing changed.
    Stale,
}

/// Result of handling a failed payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlePaymentFailedResult {
    pub subscription_id: SubscriptionId,
    pub outcome: PaymentFailedOutcome,
    /// Start of the open grace period, if any.
    pub grace_period_start: Option<Timestamp>,
}

/// Handler for failed-payment webhooks.
pub struct HandlePaymentFailedHandler {
    repository: Arc<dyn SubscriptionRepository>,
}

impl HandlePaymentFailedHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentFailedCommand,
    ) -> Result<HandlePaymentFailedResult, SubscriptionError> {
        // 1. Load by the provider's id
        let remote_id = cmd.provider_subscription_id.trim();
        let mut subscription =
            lookup::load_for_provider_subscription(self.repository.as_ref(), remote_id).await?;

        // 2. Redelivery while the grace period is open
        if let (true, Some(existing)) =
            (subscription.is_past_due(), subscription.grace_period_start())
        {
            debug!(
                subscription_id = %subscription.id(),
                grace_period_start = %existing,
                "Payment failure already recorded"
            );
            return Ok(HandlePaymentFailedResult {
                subscription_id: subscription.id(),
                outcome: PaymentFailedOutcome::AlreadyPastDue,
                grace_period_start: Some(existing),
            });
        }

        // 3. Redelivery after a renewal already settled the period
        if cmd.failed_at.is_before(&subscription.current_period_start()) {
            debug!(
                subscription_id = %subscription.id(),
                failed_at = %cmd.failed_at,
                "Ignoring payment failure older than the current period"
            );
            return Ok(HandlePaymentFailedResult {
                subscription_id: subscription.id(),
                outcome: PaymentFailedOutcome::Stale,
                grace_period_start: None,
            });
        }

        // 4. Open the grace period and persist
        subscription.mark_as_past_due(cmd.failed_at)?;
        self.repository.save(&subscription).await?;

        info!(
            subscription_id = %subscription.id(),
            creator_id = %subscription.creator_id(),
            grace_period_start = %cmd.failed_at,
            "Subscription marked past due"
        );

        Ok(HandlePaymentFailedResult {
            subscription_id: subscription.id(),
            outcome: PaymentFailedOutcome::MarkedPastDue,
            grace_period_start: Some(cmd.failed_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemorySubscriptionRepository;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::subscription::{
        NewSubscription, ProviderLinkage, Subscription, SubscriptionStatus, Tier,
    };

    fn business() -> Subscription {
        Subscription::create(
            NewSubscription::new("user-1", "creator-1")
                .with_tier(Tier::Business)
                .with_provider(ProviderLinkage::new("sub_9", "cus_9", "price_9")),
        )
        .unwrap()
    }

    fn setup(sub: Subscription) -> (HandlePaymentFailedHandler, Arc<InMemorySubscriptionRepository>) {
        let repo = Arc::new(InMemorySubscriptionRepository::with_subscriptions([sub]));
        (HandlePaymentFailedHandler::new(repo.clone()), repo)
    }

    fn command(failed_at: Timestamp) -> HandlePaymentFailedCommand {
        HandlePaymentFailedCommand {
            provider_subscription_id: "sub_9".to_string(),
            failed_at,
        }
    }

    async fn stored(repo: &InMemorySubscriptionRepository) -> Subscription {
        repo.find_by_provider_subscription_id("sub_9")
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn active_subscription_enters_grace_period() {
        let (handler, repo) = setup(business());
        let failed_at = Timestamp::now();

        let result = handler.handle(command(failed_at)).await.unwrap();

        assert_eq!(result.outcome, PaymentFailedOutcome::MarkedPastDue);
        let sub = stored(&repo).await;
        assert_eq!(sub.status(), SubscriptionStatus::PastDue);
        assert_eq!(sub.grace_period_start(), Some(failed_at));
    }

    #[tokio::test]
    async fn redelivery_returns_existing_grace_start() {
        let (handler, repo) = setup(business());
        let first = Timestamp::now();
        handler.handle(command(first)).await.unwrap();

        let result = handler
            .handle(command(first.add_days(1)))
            .await
            .unwrap();

        assert_eq!(result.outcome, PaymentFailedOutcome::AlreadyPastDue);
        assert_eq!(result.grace_period_start, Some(first));
        assert_eq!(stored(&repo).await.grace_period_start(), Some(first));
    }

    #[tokio::test]
    async fn failure_before_current_period_is_stale() {
        let (handler, repo) = setup(business());
        let period_start = stored(&repo).await.current_period_start();

        let result = handler
            .handle(command(period_start.minus_days(3)))
            .await
            .unwrap();

        assert_eq!(result.outcome, PaymentFailedOutcome::Stale);
        assert_eq!(stored(&repo).await.status(), SubscriptionStatus::Active);
    }

    #[tokio::test]
    async fn cancelled_subscription_cannot_be_marked_unpaid() {
        let mut sub = business();
        let linkage = sub.provider().clone();
        sub.cancel_subscription();
        // Keep the remote id so the webhook can still find it.
        let mut record = sub.to_record();
        record.provider_subscription_id = linkage.subscription_id;
        let sub = Subscription::reconstitute(record).unwrap();
        let (handler, _) = setup(sub);

        let err = handler.handle(command(Timestamp::now())).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::SubscriptionCancelled);
        assert_eq!(err.message(), "Cannot mark a cancelled subscription as unpaid");
    }

    #[tokio::test]
    async fn unknown_remote_id_is_not_found() {
        let (handler, _) = setup(business());

        let err = handler
            .handle(HandlePaymentFailedCommand {
                provider_subscription_id: "sub_missing".to_string(),
                failed_at: Timestamp::now(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::SubscriptionNotFound);
    }

    #[tokio::test]
    async fn blank_remote_id_fails_validation() {
        let (handler, _) = setup(business());

        let err = handler
            .handle(HandlePaymentFailedCommand {
                provider_subscription_id: "  ".to_string(),
                failed_at: Timestamp::now(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::ValidationFailed);
    }
}
