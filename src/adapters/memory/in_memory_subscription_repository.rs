//! In-memory subscription repository.
//!
//! Useful for:
//! - Unit and integration tests
//! - Local wiring without a database
//!
//! Enforces the same uniqueness a database would: one subscription per creator
//! and one per user.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{CreatorId, DomainError, ErrorCode, SubscriptionId, UserId};
use crate::domain::subscription::{Subscription, SubscriptionStatus};
use crate::ports::{SubscriptionFilter, SubscriptionRepository};

/// In-memory implementation of [`SubscriptionRepository`].
///
/// Thread-safe via a tokio `RwLock`. Does not persist across restarts.
#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    subscriptions: RwLock<HashMap<SubscriptionId, Subscription>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with `subscriptions`.
    pub fn with_subscriptions(subscriptions: impl IntoIterator<Item = Subscription>) -> Self {
        let map = subscriptions.into_iter().map(|s| (s.id(), s)).collect();
        Self {
            subscriptions: RwLock::new(map),
        }
    }

    pub async fn len(&self) -> usize {
        self.subscriptions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.subscriptions.read().await.is_empty()
    }

    async fn find_first(
        &self,
        predicate: impl Fn(&Subscription) -> bool,
    ) -> Result<Option<Subscription>, DomainError> {
        let subscriptions = self.subscriptions.read().await;
        Ok(subscriptions.values().find(|s| predicate(*s)).cloned())
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        Ok(self.subscriptions.read().await.get(id).cloned())
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<Subscription>, DomainError> {
        self.find_first(|s| s.user_id() == user_id).await
    }

    async fn find_by_creator_id(
        &self,
        creator_id: &CreatorId,
    ) -> Result<Option<Subscription>, DomainError> {
        self.find_first(|s| s.creator_id() == creator_id).await
    }

    async fn find_by_provider_subscription_id(
        &self,
        remote_id: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        self.find_first(|s| s.provider().subscription_id.as_deref() == Some(remote_id))
            .await
    }

    async fn find_all_past_due(&self) -> Result<Vec<Subscription>, DomainError> {
        let filter = SubscriptionFilter {
            tier: None,
            status: Some(SubscriptionStatus::PastDue),
        };
        self.list(&filter).await
    }

    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut subscriptions = self.subscriptions.write().await;

        let conflict = subscriptions.values().find(|existing| {
            existing.id() != subscription.id()
                && (existing.creator_id() == subscription.creator_id()
                    || existing.user_id() == subscription.user_id())
        });
        if let Some(existing) = conflict {
            let owner = if existing.creator_id() == subscription.creator_id() {
                format!("Creator {}", subscription.creator_id())
            } else {
                format!("User {}", subscription.user_id())
            };
            return Err(DomainError::new(
                ErrorCode::SubscriptionExists,
                "A subscription already exists for this user or creator",
            )
            .with_detail("owner", owner)
            .with_detail("existing_id", existing.id().to_string()));
        }

        subscriptions.insert(subscription.id(), subscription.clone());
        Ok(())
    }

    async fn exists_by_user_id(&self, user_id: &UserId) -> Result<bool, DomainError> {
        Ok(self.find_by_user_id(user_id).await?.is_some())
    }

    async fn list(&self, filter: &SubscriptionFilter) -> Result<Vec<Subscription>, DomainError> {
        let subscriptions = self.subscriptions.read().await;
        let mut matching: Vec<Subscription> = subscriptions
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        matching.sort_by_key(|s| s.created_at());
        Ok(matching)
    }
}
