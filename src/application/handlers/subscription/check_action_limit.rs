//! CheckActionLimitHandler - Query handler answering "may this action run now?".
//!
//! Consulted right before the catalog mutates: `allowed` is `current < limit`
//! (always true when unlimited).

use std::sync::Arc;

use serde::Serialize;

use crate::domain::subscription::{Limit, LimitStatus, LimitedAction, SubscriptionError};
use crate::ports::SubscriptionRepository;

use super::check_limit::status_message;
use super::lookup;

/// Query for a named action.
#[derive(Debug, Clone)]
pub struct CheckActionLimitQuery {
    pub creator_id: String,
    pub action: LimitedAction,
}

/// Verdict for a named action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckActionLimitResult {
    pub action: LimitedAction,
    pub allowed: bool,
    pub status: LimitStatus,
    pub current: u32,
    pub limit: Limit,
    pub message: Option<String>,
}

/// Handler for action limit checks.
pub struct CheckActionLimitHandler {
    repository: Arc<dyn SubscriptionRepository>,
}

impl CheckActionLimitHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        query: CheckActionLimitQuery,
    ) -> Result<CheckActionLimitResult, SubscriptionError> {
        let creator_id = lookup::creator_id(&query.creator_id)?;
        let subscription = lookup::load_for_creator(self.repository.as_ref(), &creator_id).await?;

        let resource = query.action.resource();
        let current = subscription.usage_of(resource);
        let limit = subscription.limit_of(resource);
        let status = limit.status_for(current);

        Ok(CheckActionLimitResult {
            action: query.action,
            allowed: limit.allows_another(current),
            status,
            current,
            limit,
            message: status_message(status, resource, limit, subscription.tier()),
        })
    }
}
