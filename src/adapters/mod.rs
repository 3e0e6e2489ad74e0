//! Adapters - Implementations of port interfaces.
//!
//! - `memory` - In-memory subscription store
//! - `billing` - Mock billing provider
//! - `auth` - Admin authorizer

pub mod auth;
pub mod billing;
pub mod memory;

pub use auth::StaticAdminAuthorizer;
pub use billing::MockBillingProvider;
pub use memory::InMemorySubscriptionRepository;
