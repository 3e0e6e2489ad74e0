//! ListSubscriptionsHandler - Admin query over all subscriptions.

use std::str::FromStr;
use std::sync::Arc;

use crate::domain::subscription::{Subscription, SubscriptionError, SubscriptionStatus};
use crate::ports::{SubscriptionFilter, SubscriptionRepository};

use super::lookup;

/// Query with optional filters. Blank values mean "any".
#[derive(Debug, Clone, Default)]
pub struct ListSubscriptionsQuery {
    pub tier: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ListSubscriptionsResult {
    pub subscriptions: Vec<Subscription>,
    pub total: usize,
}

/// Handler for listing subscriptions.
pub struct ListSubscriptionsHandler {
    repository: Arc<dyn SubscriptionRepository>,
}

impl ListSubscriptionsHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        query: ListSubscriptionsQuery,
    ) -> Result<ListSubscriptionsResult, SubscriptionError> {
        let filter = SubscriptionFilter {
            tier: non_blank(query.tier.as_deref()).map(lookup::tier).transpose()?,
            status: non_blank(query.status.as_deref())
                .map(SubscriptionStatus::from_str)
                .transpose()?,
        };

        let subscriptions = self.repository.list(&filter).await?;

        Ok(ListSubscriptionsResult {
            total: subscriptions.len(),
            subscriptions,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
