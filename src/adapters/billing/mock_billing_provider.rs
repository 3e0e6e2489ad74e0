//! Mock billing provider for tests and local wiring.
//!
//! Supports:
//! - Checkout sessions that can be completed from test code
//! - Error injection (next call or per method)
//! - Call tracking

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::foundation::Timestamp;
use crate::ports::{
    metadata_keys, BillingProvider, BillingProviderError, CheckoutRequest, CheckoutSession,
    CheckoutSessionDetails, CheckoutStatus,
};

/// Mock billing provider.
///
/// # Example
///
/// ```ignore
/// let billing = MockBillingProvider::new();
/// let session = billing.create_checkout_session(request).await?;
/// billing.complete_session(&session.session_id, "sub_1", "cus_1", "price_pro_year");
/// let details = billing.get_checkout_session(&session.session_id).await?;
/// ```
#[derive(Default)]
pub struct MockBillingProvider {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    sessions: HashMap<String, CheckoutSessionDetails>,
    cancelled: Vec<CancelledRemote>,
    next_error: Option<BillingProviderError>,
    method_errors: HashMap<String, BillingProviderError>,
    call_log: Vec<MethodCall>,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

/// A remote cancellation the mock received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelledRemote {
    pub subscription_id: String,
    pub at_period_end: bool,
}

impl MockBillingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    // ════════════════════════════════════════════════════════════════════════
    // Configuration
    // ════════════════════════════════════════════════════════════════════════

    /// Registers a session so `get_checkout_session` can return it.
    pub fn add_session(&self, session_id: impl Into<String>, details: CheckoutSessionDetails) {
        self.state().sessions.insert(session_id.into(), details);
    }

    /// Marks a previously created session complete with provider ids and a
    /// fresh billing period for the session's interval.
    ///
    /// Returns false if the session is unknown.
    pub fn complete_session(
        &self,
        session_id: &str,
        subscription_id: &str,
        customer_id: &str,
        price_id: &str,
    ) -> bool {
        let mut state = self.state();
        let Some(session) = state.sessions.get_mut(session_id) else {
            return false;
        };
        let days = match session.metadata.get(metadata_keys::INTERVAL).map(String::as_str) {
            Some("month") => 30,
            _ => 365,
        };
        let start = Timestamp::now();
        session.status = CheckoutStatus::Complete;
        session.subscription_id = Some(subscription_id.to_string());
        session.customer_id = Some(customer_id.to_string());
        session.price_id = Some(price_id.to_string());
        session.current_period_start = Some(start.as_unix_secs());
        session.current_period_end = Some(start.add_days(days).as_unix_secs());
        true
    }

    /// Fails the next call to any method.
    pub fn set_error(&self, error: BillingProviderError) {
        self.state().next_error = Some(error);
    }

    /// Fails every call to `method` until cleared.
    pub fn set_method_error(&self, method: &str, error: BillingProviderError) {
        self.state().method_errors.insert(method.to_string(), error);
    }

    pub fn clear_errors(&self) {
        let mut state = self.state();
        state.next_error = None;
        state.method_errors.clear();
    }

    // ════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════

    pub fn calls(&self) -> Vec<MethodCall> {
        self.state().call_log.clone()
    }

    pub fn was_called(&self, method: &str) -> bool {
        self.state().call_log.iter().any(|c| c.method == method)
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.state()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// Remote cancellations received so far.
    pub fn cancelled(&self) -> Vec<CancelledRemote> {
        self.state().cancelled.clone()
    }

    // ════════════════════════════════════════════════════════════════════════
    // Internals
    // ════════════════════════════════════════════════════════════════════════

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_call(&self, method: &str, args: Vec<String>) {
        self.state().call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }

    fn check_error(&self, method: &str) -> Result<(), BillingProviderError> {
        let mut state = self.state();
        if let Some(error) = state.method_errors.get(method) {
            return Err(error.clone());
        }
        if let Some(error) = state.next_error.take() {
            return Err(error);
        }
        Ok(())
    }
}

impl Clone for MockBillingProvider {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

fn short_id(prefix: &str) -> String {
    let simple = Uuid::new_v4().simple().to_string();
    format!("{}_{}", prefix, &simple[..12])
}

#[async_trait]
impl BillingProvider for MockBillingProvider {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, BillingProviderError> {
        self.record_call(
            "create_checkout_session",
            vec![
                request.creator_id.to_string(),
                request.tier.to_string(),
                request.interval.to_string(),
                request.with_trial.to_string(),
            ],
        );
        self.check_error("create_checkout_session")?;

        let session_id = short_id("cs_mock");
        let details = CheckoutSessionDetails {
            subscription_id: None,
            customer_id: request.customer_id.clone(),
            price_id: None,
            status: CheckoutStatus::Open,
            current_period_start: None,
            current_period_end: None,
            metadata: request.metadata(),
        };
        self.state().sessions.insert(session_id.clone(), details);

        Ok(CheckoutSession {
            url: format!("https://billing.example.com/checkout/{}", session_id),
            session_id,
        })
    }

    async fn get_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSessionDetails, BillingProviderError> {
        self.record_call("get_checkout_session", vec![session_id.to_string()]);
        self.check_error("get_checkout_session")?;

        self.state()
            .sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| BillingProviderError::not_found("Checkout session"))
    }

    async fn cancel_subscription(
        &self,
        remote_subscription_id: &str,
        at_period_end: bool,
    ) -> Result<(), BillingProviderError> {
        self.record_call(
            "cancel_subscription",
            vec![remote_subscription_id.to_string(), at_period_end.to_string()],
        );
        self.check_error("cancel_subscription")?;

        self.state().cancelled.push(CancelledRemote {
            subscription_id: remote_subscription_id.to_string(),
            at_period_end,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CreatorId, UserId};
    use crate::domain::subscription::{BillingInterval, Tier};
    use crate::ports::BillingProviderErrorCode;

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            customer_id: None,
            email: "creator@example.com".to_string(),
            user_id: UserId::new("user-1").unwrap(),
            creator_id: CreatorId::new("creator-1").unwrap(),
            tier: Tier::Pro,
            interval: BillingInterval::Month,
            with_trial: false,
            success_url: "https://shop.example.com/billing/success".to_string(),
            cancel_url: "https://shop.example.com/billing/cancel".to_string(),
        }
    }

    #[tokio::test]
    async fn created_session_is_open_until_completed() {
        let billing = MockBillingProvider::new();
        let session = billing.create_checkout_session(request()).await.unwrap();
        assert!(session.url.contains(&session.session_id));

        let details = billing.get_checkout_session(&session.session_id).await.unwrap();
        assert_eq!(details.status, CheckoutStatus::Open);
        assert_eq!(details.metadata_value("tier"), Some("pro"));

        assert!(billing.complete_session(&session.session_id, "sub_1", "cus_1", "price_1"));
        let details = billing.get_checkout_session(&session.session_id).await.unwrap();
        assert_eq!(details.status, CheckoutStatus::Complete);
        assert_eq!(details.subscription_id.as_deref(), Some("sub_1"));

        let start = details.current_period_start.unwrap();
        let end = details.current_period_end.unwrap();
        assert_eq!((end - start) / 86_400, 30);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let billing = MockBillingProvider::new();
        let err = billing.get_checkout_session("cs_missing").await.unwrap_err();
        assert_eq!(err.code, BillingProviderErrorCode::NotFound);
        assert!(!billing.complete_session("cs_missing", "s", "c", "p"));
    }

    #[tokio::test]
    async fn next_error_is_consumed_once() {
        let billing = MockBillingProvider::new();
        billing.set_error(BillingProviderError::network("timeout"));
        assert!(billing.cancel_subscription("sub_1", true).await.is_err());
        assert!(billing.cancel_subscription("sub_1", true).await.is_ok());
        assert_eq!(billing.call_count("cancel_subscription"), 2);
        assert_eq!(billing.cancelled().len(), 1);
    }

    #[tokio::test]
    async fn method_error_persists_until_cleared() {
        let billing = MockBillingProvider::new();
        billing.set_method_error(
            "create_checkout_session",
            BillingProviderError::rejected("no price"),
        );
        assert!(billing.create_checkout_session(request()).await.is_err());
        assert!(billing.create_checkout_session(request()).await.is_err());
        billing.clear_errors();
        assert!(billing.create_checkout_session(request()).await.is_ok());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let billing = MockBillingProvider::new();
        let other = billing.clone();
        other.cancel_subscription("sub_9", false).await.unwrap();
        assert!(billing.was_called("cancel_subscription"));
        assert_eq!(
            billing.cancelled(),
            vec![CancelledRemote {
                subscription_id: "sub_9".to_string(),
                at_period_end: false
            }]
        );
    }
}
