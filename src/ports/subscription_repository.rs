//! Subscription repository port.
//!
//! Loads and persists Subscription aggregates. One subscription per creator.
//!
//! # Design
//!
//! - **Upsert**: `save` inserts or replaces by aggregate id
//! - **Single writer per creator**: concurrent mutation of the same creator is
//!   the storage layer's problem (optimistic versioning or row locks)
//!
//! # Example
//!
//! ```ignore
//! async fn pin(repo: &dyn SubscriptionRepository, creator: &CreatorId) -> Result<(), DomainError> {
//!     let mut sub = repo
//!         .find_by_creator_id(creator)
//!         .await?
//!         .ok_or_else(|| DomainError::new(ErrorCode::SubscriptionNotFound, "not found"))?;
//!     sub.increment_pinned_products_used()?;
//!     repo.save(&sub).await
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CreatorId, DomainError, SubscriptionId, UserId};
use crate::domain::subscription::{Subscription, SubscriptionStatus, Tier};

/// Persistence port for the Subscription aggregate.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Find a subscription by internal id.
    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError>;

    /// Find the subscription owned by a user.
    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<Subscription>, DomainError>;

    /// Find the subscription of a creator.
    async fn find_by_creator_id(
        &self,
        creator_id: &CreatorId,
    ) -> Result<Option<Subscription>, DomainError>;

    /// Find by the billing provider's subscription id.
    async fn find_by_provider_subscription_id(
        &self,
        remote_id: &str,
    ) -> Result<Option<Subscription>, DomainError>;

    /// All subscriptions currently in their payment grace period.
    async fn find_all_past_due(&self) -> Result<Vec<Subscription>, DomainError>;

    /// Insert or replace by id.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError>;

    /// True if the user already owns a subscription.
    async fn exists_by_user_id(&self, user_id: &UserId) -> Result<bool, DomainError>;

    /// Admin listing with optional filters.
    async fn list(&self, filter: &SubscriptionFilter) -> Result<Vec<Subscription>, DomainError>;
}

/// Optional filters for [`SubscriptionRepository::list`]. `None` matches all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionFilter {
    pub tier: Option<Tier>,
    pub status: Option<SubscriptionStatus>,
}

impl SubscriptionFilter {
    pub fn matches(&self, subscription: &Subscription) -> bool {
        self.tier.map_or(true, |t| subscription.tier() == t)
            && self.status.map_or(true, |s| subscription.status() == s)
    }
}
