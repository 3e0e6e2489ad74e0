//! RecordUsageHandler - Command handler adjusting a usage counter.
//!
//! Called by the catalog after a publish/pin (increment) or an
//! unpublish/unpin (decrement) succeeds.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::subscription::{Limit, LimitedResource, SubscriptionError};
use crate::ports::SubscriptionRepository;

use super::lookup;

/// Direction of the counter change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageChange {
    Increment,
    Decrement,
}

/// Command to record usage.
#[derive(Debug, Clone)]
pub struct RecordUsageCommand {
    pub creator_id: String,
    pub resource: LimitedResource,
    pub change: UsageChange,
}

/// Counter state after the change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordUsageResult {
    pub resource: LimitedResource,
    pub used: u32,
    pub limit: Limit,
}

/// Handler for usage counter changes.
pub struct RecordUsageHandler {
    repository: Arc<dyn SubscriptionRepository>,
}

impl RecordUsageHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        cmd: RecordUsageCommand,
    ) -> Result<RecordUsageResult, SubscriptionError> {
        // 1. Load
        let creator_id = lookup::creator_id(&cmd.creator_id)?;
        let mut subscription =
            lookup::load_for_creator(self.repository.as_ref(), &creator_id).await?;

        // 2. Apply
        match cmd.change {
            UsageChange::Increment => {
                if let Err(e) = subscription.increment_usage(cmd.resource) {
                    warn!(
                        creator_id = %creator_id,
                        resource = cmd.resource.noun(),
                        error = %e,
                        "Usage increment rejected"
                    );
                    return Err(e.into());
                }
            }
            UsageChange::Decrement => subscription.decrement_usage(cmd.resource),
        }

        // 3. Persist
        self.repository.save(&subscription).await?;

        let used = subscription.usage_of(cmd.resource);
        info!(
            creator_id = %creator_id,
            resource = cmd.resource.noun(),
            used,
            "Usage recorded"
        );

        Ok(RecordUsageResult {
            resource: cmd.resource,
            used,
            limit: subscription.limit_of(cmd.resource),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemorySubscriptionRepository;
    use crate::domain::foundation::{CreatorId, DomainError, ErrorCode, SubscriptionId, UserId};
    use crate::domain::subscription::{NewSubscription, Subscription, Tier};
    use crate::ports::SubscriptionFilter;
    use async_trait::async_trait;

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    /// Finds one subscription but refuses to save.
    struct FailingSaveRepository {
        subscription: Subscription,
    }

    #[async_trait]
    impl SubscriptionRepository for FailingSaveRepository {
        async fn find_by_id(&self, _id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
            Ok(Some(self.subscription.clone()))
        }

        async fn find_by_user_id(&self, _user_id: &UserId) -> Result<Option<Subscription>, DomainError> {
            Ok(Some(self.subscription.clone()))
        }

        async fn find_by_creator_id(
            &self,
            _creator_id: &CreatorId,
        ) -> Result<Option<Subscription>, DomainError> {
            Ok(Some(self.subscription.clone()))
        }

        async fn find_by_provider_subscription_id(
            &self,
            _remote_id: &str,
        ) -> Result<Option<Subscription>, DomainError> {
            Ok(None)
        }

        async fn find_all_past_due(&self) -> Result<Vec<Subscription>, DomainError> {
            Ok(vec![])
        }

        async fn save(&self, _subscription: &Subscription) -> Result<(), DomainError> {
            Err(DomainError::new(ErrorCode::DatabaseError, "Simulated save failure"))
        }

        async fn exists_by_user_id(&self, _user_id: &UserId) -> Result<bool, DomainError> {
            Ok(true)
        }

        async fn list(&self, _filter: &SubscriptionFilter) -> Result<Vec<Subscription>, DomainError> {
            Ok(vec![])
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn starter() -> Subscription {
        Subscription::create(NewSubscription::new("user-1", "creator-1").with_tier(Tier::Starter))
            .unwrap()
    }

    fn command(resource: LimitedResource, change: UsageChange) -> RecordUsageCommand {
        RecordUsageCommand {
            creator_id: "creator-1".to_string(),
            resource,
            change,
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn increment_persists_new_count() {
        let repo = Arc::new(InMemorySubscriptionRepository::with_subscriptions([starter()]));
        let handler = RecordUsageHandler::new(repo.clone());

        let result = handler
            .handle(command(LimitedResource::Product, UsageChange::Increment))
            .await
            .unwrap();

        assert_eq!(result.used, 1);
        let stored = repo
            .find_by_creator_id(&CreatorId::new("creator-1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.products_used(), 1);
    }

    #[tokio::test]
    async fn increment_over_limit_surfaces_limit_message() {
        let repo = Arc::new(InMemorySubscriptionRepository::with_subscriptions([starter()]));
        let handler = RecordUsageHandler::new(repo);

        let err = handler
            .handle(command(LimitedResource::PinnedProduct, UsageChange::Increment))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::LimitReached);
        assert!(err.message().starts_with("Pinned product limit reached (0)"));
    }

    #[tokio::test]
    async fn decrement_floors_at_zero() {
        let repo = Arc::new(InMemorySubscriptionRepository::with_subscriptions([starter()]));
        let handler = RecordUsageHandler::new(repo);

        let result = handler
            .handle(command(LimitedResource::Product, UsageChange::Decrement))
            .await
            .unwrap();

        assert_eq!(result.used, 0);
    }

    #[tokio::test]
    async fn save_failure_is_retryable_infrastructure_error() {
        let handler = RecordUsageHandler::new(Arc::new(FailingSaveRepository {
            subscription: starter(),
        }));

        let err = handler
            .handle(command(LimitedResource::Product, UsageChange::Increment))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::DatabaseError);
        assert!(err.is_retryable());
    }
}
