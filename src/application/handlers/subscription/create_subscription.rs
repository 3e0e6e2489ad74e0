//! CreateSubscriptionHandler - Command handler for opening a creator's subscription.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::foundation::UserId;
use crate::domain::subscription::{
    BillingInterval, NewSubscription, ProviderLinkage, Subscription, SubscriptionError, Tier,
};
use crate::ports::SubscriptionRepository;

use super::lookup;

/// Command to create a subscription.
#[derive(Debug, Clone, Default)]
pub struct CreateSubscriptionCommand {
    pub user_id: String,
    pub creator_id: String,
    /// Defaults to the entry tier.
    pub tier: Option<Tier>,
    /// Defaults to yearly.
    pub billing_interval: Option<BillingInterval>,
    pub with_trial: bool,
    pub provider: Option<ProviderLinkage>,
}

/// Result of subscription creation.
#[derive(Debug, Clone)]
pub struct CreateSubscriptionResult {
    pub subscription: Subscription,
    /// True if a trial window was opened.
    pub trial_started: bool,
}

/// Handler for creating subscriptions.
///
/// A user owns at most one subscription and a creator has at most one.
pub struct CreateSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
}

impl CreateSubscriptionHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        cmd: CreateSubscriptionCommand,
    ) -> Result<CreateSubscriptionResult, SubscriptionError> {
        // 1. Validate ids
        let user_id = UserId::new(cmd.user_id.trim())?;
        let creator_id = lookup::creator_id(&cmd.creator_id)?;

        // 2. Enforce one subscription per user and per creator
        if self.repository.exists_by_user_id(&user_id).await? {
            warn!(user_id = %user_id, "User already owns a subscription");
            return Err(SubscriptionError::already_exists(format!("User {}", user_id)));
        }
        if self.repository.find_by_creator_id(&creator_id).await?.is_some() {
            warn!(creator_id = %creator_id, "Creator already has a subscription");
            return Err(SubscriptionError::already_exists(format!(
                "Creator {}",
                creator_id
            )));
        }

        // 3. Create the aggregate
        let params = NewSubscription {
            user_id: user_id.to_string(),
            creator_id: creator_id.to_string(),
            tier: cmd.tier,
            billing_interval: cmd.billing_interval,
            with_trial: cmd.with_trial,
            provider: cmd.provider,
        };
        let subscription = Subscription::create(params)?;

        // 4. Persist
        self.repository.save(&subscription).await?;

        info!(
            subscription_id = %subscription.id(),
            creator_id = %creator_id,
            tier = %subscription.tier(),
            trialing = subscription.is_trialing(),
            "Subscription created"
        );

        Ok(CreateSubscriptionResult {
            trial_started: subscription.is_trialing(),
            subscription,
        })
    }
}
