//! Billing provider port.
//!
//! The engine never moves money itself. It asks the provider for checkout
//! sessions, reads completed sessions back, and cancels remote subscriptions.
//! Inbound webhooks ("checkout completed", "payment failed", "payment
//! succeeded") are mapped onto use cases by the surrounding infrastructure.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{CreatorId, DomainError, ErrorCode, UserId};
use crate::domain::subscription::{BillingInterval, Tier};

/// Metadata keys written on checkout sessions and read back on completion.
pub mod metadata_keys {
    pub const CREATOR_ID: &str = "creator_id";
    pub const USER_ID: &str = "user_id";
    pub const TIER: &str = "tier";
    pub const INTERVAL: &str = "interval";
    pub const TRIAL: &str = "trial";
}

/// Port for the external billing provider.
#[async_trait]
pub trait BillingProvider: Send + Sync {
    /// Create a hosted checkout session for a plan.
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, BillingProviderError>;

    /// Retrieve a checkout session by id.
    async fn get_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSessionDetails, BillingProviderError>;

    /// Cancel a remote subscription.
    ///
    /// If `at_period_end` is true, the remote subscription runs until the
    /// current period ends.
    async fn cancel_subscription(
        &self,
        remote_subscription_id: &str,
        at_period_end: bool,
    ) -> Result<(), BillingProviderError>;
}

/// Request to create a checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Existing provider customer, if any.
    pub customer_id: Option<String>,
    pub email: String,
    pub user_id: UserId,
    pub creator_id: CreatorId,
    pub tier: Tier,
    pub interval: BillingInterval,
    pub with_trial: bool,
    /// Where the provider sends the customer afterwards.
    pub success_url: String,
    pub cancel_url: String,
}

impl CheckoutRequest {
    /// Metadata the provider should echo back on the completed session.
    pub fn metadata(&self) -> HashMap<String, String> {
        HashMap::from([
            (metadata_keys::CREATOR_ID.to_string(), self.creator_id.to_string()),
            (metadata_keys::USER_ID.to_string(), self.user_id.to_string()),
            (metadata_keys::TIER.to_string(), self.tier.as_str().to_string()),
            (metadata_keys::INTERVAL.to_string(), self.interval.as_str().to_string()),
            (metadata_keys::TRIAL.to_string(), self.with_trial.to_string()),
        ])
    }
}

/// Newly created checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub session_id: String,
    /// URL for the customer to complete checkout.
    pub url: String,
}

/// Provider-side state of a checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSessionDetails {
    pub subscription_id: Option<String>,
    pub customer_id: Option<String>,
    pub price_id: Option<String>,
    pub status: CheckoutStatus,
    /// Billing period reported by the provider (Unix seconds).
    pub current_period_start: Option<i64>,
    pub current_period_end: Option<i64>,
    pub metadata: HashMap<String, String>,
}

impl CheckoutSessionDetails {
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

/// Checkout session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStatus {
    Open,
    Complete,
    Expired,
}

impl std::fmt::Display for CheckoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CheckoutStatus::Open => "open",
            CheckoutStatus::Complete => "complete",
            CheckoutStatus::Expired => "expired",
        };
        write!(f, "{}", s)
    }
}

/// Errors from billing provider operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingProviderError {
    pub code: BillingProviderErrorCode,
    pub message: String,
    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl BillingProviderError {
    pub fn new(code: BillingProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retryable: code.is_retryable(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(BillingProviderErrorCode::NetworkError, message)
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(
            BillingProviderErrorCode::NotFound,
            format!("{} not found", resource),
        )
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(BillingProviderErrorCode::Rejected, message)
    }
}

impl std::fmt::Display for BillingProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for BillingProviderError {}

impl From<BillingProviderError> for DomainError {
    fn from(err: BillingProviderError) -> Self {
        DomainError::new(ErrorCode::BillingProviderError, err.message)
            .with_detail("provider_code", err.code.to_string())
    }
}

/// Billing provider error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingProviderErrorCode {
    NetworkError,
    AuthenticationError,
    RateLimitExceeded,
    NotFound,
    /// The provider refused the request (bad price, closed account, ...).
    Rejected,
    Unknown,
}

impl BillingProviderErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BillingProviderErrorCode::NetworkError | BillingProviderErrorCode::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for BillingProviderErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BillingProviderErrorCode::NetworkError => "network_error",
            BillingProviderErrorCode::AuthenticationError => "authentication_error",
            BillingProviderErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            BillingProviderErrorCode::NotFound => "not_found",
            BillingProviderErrorCode::Rejected => "rejected",
            BillingProviderErrorCode::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}
