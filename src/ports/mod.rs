//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SubscriptionRepository` - Load and persist Subscription aggregates
//! - `BillingProvider` - Checkout sessions and remote cancellation
//! - `AdminAuthorizer` - Administrator role check

mod admin_authorizer;
mod billing_provider;
mod subscription_repository;

pub use admin_authorizer::AdminAuthorizer;
pub use billing_provider::{
    metadata_keys, BillingProvider, BillingProviderError, BillingProviderErrorCode,
    CheckoutRequest, CheckoutSession, CheckoutSessionDetails, CheckoutStatus,
};
pub use subscription_repository::{SubscriptionFilter, SubscriptionRepository};
