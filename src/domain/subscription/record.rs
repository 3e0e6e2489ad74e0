//! Flat persisted shape of a subscription.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{SubscriptionId, Timestamp};

/// Row-shaped snapshot of a [`super::Subscription`].
///
/// Enumerations are stored as their string forms; `Subscription::reconstitute`
/// turns this back into an aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub id: SubscriptionId,
    pub user_id: String,
    pub creator_id: String,
    pub tier: String,
    pub status: String,
    pub billing_interval: String,
    pub current_period_start: Timestamp,
    pub current_period_end: Timestamp,
    pub products_used: u32,
    pub pinned_products_used: u32,
    pub commission_basis_points: u16,
    pub is_trialing: bool,
    pub trial_start: Option<Timestamp>,
    pub trial_end: Option<Timestamp>,
    pub grace_period_start: Option<Timestamp>,
    pub provider_subscription_id: Option<String>,
    pub provider_customer_id: Option<String>,
    pub provider_price_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
