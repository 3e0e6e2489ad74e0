//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types that form the
//! vocabulary of the billing domain.

mod commission_rate;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use commission_rate::CommissionRate;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{CreatorId, SubscriptionId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
