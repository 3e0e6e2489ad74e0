//! ExtendSubscriptionHandler - Administrator override pushing out the period end.
//!
//! Authorization is checked before any input validation or lookup, so a
//! non-admin gets the same rejection whether or not the subscription exists.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::foundation::{SubscriptionId, Timestamp, UserId};
use crate::domain::subscription::SubscriptionError;
use crate::ports::{AdminAuthorizer, SubscriptionRepository};

use super::lookup;

/// Largest extension granted in one call.
pub const MAX_EXTENSION_DAYS: u32 = 3650;

/// Command to extend a subscription.
#[derive(Debug, Clone)]
pub struct ExtendSubscriptionCommand {
    pub actor_id: String,
    pub subscription_id: String,
    pub days: u32,
}

/// Result of an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendSubscriptionResult {
    pub subscription_id: SubscriptionId,
    pub previous_period_end: Timestamp,
    pub new_period_end: Timestamp,
}

/// Handler for admin extensions.
pub struct ExtendSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
    authorizer: Arc<dyn AdminAuthorizer>,
}

impl ExtendSubscriptionHandler {
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        authorizer: Arc<dyn AdminAuthorizer>,
    ) -> Self {
        Self {
            repository,
            authorizer,
        }
    }

    pub async fn handle(
        &self,
        cmd: ExtendSubscriptionCommand,
    ) -> Result<ExtendSubscriptionResult, SubscriptionError> {
        // 1. Authorize
        let actor_id = UserId::new(cmd.actor_id.trim())?;
        if !self.authorizer.is_admin(&actor_id).await? {
            warn!(actor_id = %actor_id, "Non-admin attempted subscription extension");
            return Err(SubscriptionError::forbidden(
                "Only administrators can extend subscriptions",
            ));
        }

        // 2. Validate
        if cmd.days == 0 || cmd.days > MAX_EXTENSION_DAYS {
            return Err(SubscriptionError::validation(
                "days",
                format!("days must be between 1 and {}", MAX_EXTENSION_DAYS),
            ));
        }
        lookup::require("subscription_id", &cmd.subscription_id)?;
        let subscription_id = lookup::subscription_id(cmd.subscription_id.trim())?;

        // 3. Load
        let mut subscription = self
            .repository
            .find_by_id(&subscription_id)
            .await?
            .ok_or(SubscriptionError::not_found(subscription_id))?;

        // 4. Extend from the current end, so repeated extensions compound
        let previous_period_end = subscription.extend_current_period(cmd.days)?;
        self.repository.save(&subscription).await?;

        info!(
            subscription_id = %subscription_id,
            actor_id = %actor_id,
            days = cmd.days,
            new_period_end = %subscription.current_period_end(),
            "Subscription extended by administrator"
        );

        Ok(ExtendSubscriptionResult {
            subscription_id,
            previous_period_end,
            new_period_end: subscription.current_period_end(),
        })
    }
}
