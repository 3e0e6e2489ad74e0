//! Billing provider adapters.
//!
//! - `mock` - In-process provider with scriptable sessions, for tests and local runs

mod mock_billing_provider;

pub use mock_billing_provider::{CancelledRemote, MethodCall, MockBillingProvider};
