//! Subscription use-case errors.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotFound* | 404 |
//! | AlreadyExists | 409 |
//! | AlreadyCancelled | 409 |
//! | NotAnUpgrade | 422 |
//! | RuleViolated | 422 |
//! | InvalidTier | 400 |
//! | ValidationFailed | 400 |
//! | Forbidden | 403 |
//! | BillingProvider | 502 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{CreatorId, DomainError, ErrorCode, SubscriptionId, ValidationError};

use super::Tier;

/// Errors returned by subscription handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// No subscription with this id.
    NotFound(SubscriptionId),

    /// The creator has no subscription.
    NotFoundForCreator(CreatorId),

    /// No subscription linked to this billing-provider subscription id.
    NotFoundForProviderSubscription(String),

    /// The user or creator already owns a subscription.
    AlreadyExists(String),

    /// The subscription is already cancelled.
    AlreadyCancelled(SubscriptionId),

    /// Requested tier does not rank above the current one.
    NotAnUpgrade { from: Tier, to: Tier },

    /// A business rule on the aggregate rejected the operation.
    RuleViolated { code: ErrorCode, message: String },

    /// Invalid state for the requested operation.
    InvalidState { current: String, attempted: String },

    /// Caller lacks the required role.
    Forbidden(String),

    /// Validation failed.
    ValidationFailed { field: String, message: String },

    /// Unknown tier name.
    InvalidTier(String),

    /// Billing provider call failed.
    BillingProvider { message: String, retryable: bool },

    /// Store or other infrastructure failure.
    Infrastructure(String),
}

impl SubscriptionError {
    pub fn not_found(id: SubscriptionId) -> Self {
        SubscriptionError::NotFound(id)
    }

    pub fn not_found_for_creator(creator_id: CreatorId) -> Self {
        SubscriptionError::NotFoundForCreator(creator_id)
    }

    pub fn not_found_for_provider_subscription(remote_id: impl Into<String>) -> Self {
        SubscriptionError::NotFoundForProviderSubscription(remote_id.into())
    }

    pub fn already_exists(owner: impl Into<String>) -> Self {
        SubscriptionError::AlreadyExists(owner.into())
    }

    pub fn already_cancelled(id: SubscriptionId) -> Self {
        SubscriptionError::AlreadyCancelled(id)
    }

    pub fn not_an_upgrade(from: Tier, to: Tier) -> Self {
        SubscriptionError::NotAnUpgrade { from, to }
    }

    pub fn invalid_state(current: impl Into<String>, attempted: impl Into<String>) -> Self {
        SubscriptionError::InvalidState {
            current: current.into(),
            attempted: attempted.into(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        SubscriptionError::Forbidden(reason.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SubscriptionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_tier(tier: impl Into<String>) -> Self {
        SubscriptionError::InvalidTier(tier.into())
    }

    pub fn billing_provider(message: impl Into<String>, retryable: bool) -> Self {
        SubscriptionError::BillingProvider {
            message: message.into(),
            retryable,
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        SubscriptionError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            SubscriptionError::NotFound(_)
            | SubscriptionError::NotFoundForCreator(_)
            | SubscriptionError::NotFoundForProviderSubscription(_) => {
                ErrorCode::SubscriptionNotFound
            }
            SubscriptionError::AlreadyExists(_) => ErrorCode::SubscriptionExists,
            SubscriptionError::AlreadyCancelled(_) => ErrorCode::SubscriptionCancelled,
            SubscriptionError::NotAnUpgrade { .. } => ErrorCode::NotAnUpgrade,
            SubscriptionError::RuleViolated { code, .. } => *code,
            SubscriptionError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            SubscriptionError::Forbidden(_) => ErrorCode::Forbidden,
            SubscriptionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            SubscriptionError::InvalidTier(_) => ErrorCode::InvalidTier,
            SubscriptionError::BillingProvider { .. } => ErrorCode::BillingProviderError,
            SubscriptionError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-facing error message.
    pub fn message(&self) -> String {
        match self {
            SubscriptionError::NotFound(id) => format!("Subscription not found: {}", id),
            SubscriptionError::NotFoundForCreator(creator_id) => {
                format!("Subscription not found for creator: {}", creator_id)
            }
            SubscriptionError::NotFoundForProviderSubscription(remote_id) => {
                format!("Subscription not found for billing reference: {}", remote_id)
            }
            SubscriptionError::AlreadyExists(owner) => {
                format!("{} already has a subscription", owner)
            }
            SubscriptionError::AlreadyCancelled(_) => {
                "Subscription is already cancelled".to_string()
            }
            SubscriptionError::NotAnUpgrade { from, to } => format!(
                "Cannot change from {} to {}: only upgrades to a higher plan are allowed",
                from.display_name(),
                to.display_name()
            ),
            SubscriptionError::RuleViolated { message, .. } => message.clone(),
            SubscriptionError::InvalidState { current, attempted } => {
                format!("Cannot {} a subscription that is {}", attempted, current)
            }
            SubscriptionError::Forbidden(reason) => format!("Forbidden: {}", reason),
            SubscriptionError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            SubscriptionError::InvalidTier(tier) => format!("Invalid plan: {}", tier),
            SubscriptionError::BillingProvider { message, .. } => {
                format!("Billing provider error: {}", message)
            }
            SubscriptionError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Returns true if this error should trigger a retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            SubscriptionError::Infrastructure(_) => true,
            SubscriptionError::BillingProvider { retryable, .. } => *retryable,
            _ => false,
        }
    }
}

impl std::fmt::Display for SubscriptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for SubscriptionError {}

impl From<DomainError> for SubscriptionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat => SubscriptionError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCode::InvalidTier => SubscriptionError::InvalidTier(
                err.details.get("tier").cloned().unwrap_or(err.message),
            ),
            ErrorCode::SubscriptionExists => SubscriptionError::AlreadyExists(
                err.details
                    .get("owner")
                    .cloned()
                    .unwrap_or_else(|| "Owner".to_string()),
            ),
            ErrorCode::Forbidden | ErrorCode::Unauthorized => {
                SubscriptionError::Forbidden(err.message)
            }
            ErrorCode::SubscriptionCancelled
            | ErrorCode::AlreadyOnPlan
            | ErrorCode::NotAnUpgrade
            | ErrorCode::LimitReached
            | ErrorCode::TrialUnavailable
            | ErrorCode::InvalidStateTransition => SubscriptionError::RuleViolated {
                code: err.code,
                message: err.message,
            },
            ErrorCode::BillingProviderError => SubscriptionError::BillingProvider {
                message: err.message,
                retryable: false,
            },
            _ => SubscriptionError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ValidationError> for SubscriptionError {
    fn from(err: ValidationError) -> Self {
        SubscriptionError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<SubscriptionError> for DomainError {
    fn from(err: SubscriptionError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
