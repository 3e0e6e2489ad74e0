//! Subscription module - creator plans, usage limits and billing lifecycle.
//!
//! # Overview
//!
//! Each creator has exactly one subscription. Its tier decides how many
//! products may be published and pinned and what commission the platform keeps
//! on each sale. Billing-provider webhooks move it between `Active`,
//! `PastDue` and the terminal `Cancelled` status.
//!
//! # Module Structure
//!
//! - `tier` - The three ordered tiers
//! - `plan_catalog` - Static per-tier limits, pricing and features
//! - `plan` - Validated tier value
//! - `limit` - Capped/unlimited limits and the ok/warning/blocked status
//! - `aggregate` - The Subscription aggregate
//! - `errors` - Use-case error type

mod aggregate;
mod billing_interval;
mod errors;
mod limit;
mod plan;
pub mod plan_catalog;
mod record;
mod resource;
mod status;
mod tier;

pub use aggregate::{NewSubscription, ProviderLinkage, Subscription};
pub use billing_interval::BillingInterval;
pub use errors::SubscriptionError;
pub use limit::{Limit, LimitStatus, NEAR_LIMIT_PERCENT, UNLIMITED};
pub use plan::Plan;
pub use plan_catalog::{Feature, PlanDefinition, PlanFeatures, PlanLimits, PlanPricing};
pub use record::SubscriptionRecord;
pub use resource::{LimitedAction, LimitedResource};
pub use status::SubscriptionStatus;
pub use tier::Tier;
