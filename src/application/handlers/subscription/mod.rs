//! Subscription handlers.
//!
//! Command and query handlers for the subscription lifecycle:
//!
//! ## Commands
//! - Creating a subscription
//! - Recording product and pinned-product usage
//! - Starting and completing an upgrade checkout
//! - Upgrading and cancelling
//! - Processing payment webhooks (failed, succeeded)
//! - Extending the current period (admin)
//! - Expiring lapsed grace periods
//!
//! ## Queries
//! - Get the subscription view
//! - Check limits, per resource or per action
//! - List subscriptions (admin)

mod cancel_subscription;
mod check_action_limit;
mod check_limit;
mod complete_checkout;
mod create_subscription;
mod expire_grace_periods;
mod extend_subscription;
mod get_subscription;
mod handle_payment_failed;
mod handle_payment_succeeded;
mod list_subscriptions;
mod lookup;
mod record_usage;
mod start_checkout;
mod upgrade_subscription;

// Commands
pub use cancel_subscription::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, CancelSubscriptionResult,
};
pub use complete_checkout::{
    CompleteCheckoutCommand, CompleteCheckoutHandler, CompleteCheckoutResult,
};
pub use create_subscription::{
    CreateSubscriptionCommand, CreateSubscriptionHandler, CreateSubscriptionResult,
};
pub use expire_grace_periods::{
    ExpireGracePeriodsCommand, ExpireGracePeriodsHandler, ExpireGracePeriodsResult,
};
pub use extend_subscription::{
    ExtendSubscriptionCommand, ExtendSubscriptionHandler, ExtendSubscriptionResult,
    MAX_EXTENSION_DAYS,
};
pub use handle_payment_failed::{
    HandlePaymentFailedCommand, HandlePaymentFailedHandler, HandlePaymentFailedResult,
    PaymentFailedOutcome,
};
pub use handle_payment_succeeded::{
    HandlePaymentSucceededCommand, HandlePaymentSucceededHandler, HandlePaymentSucceededResult,
};
pub use record_usage::{RecordUsageCommand, RecordUsageHandler, RecordUsageResult, UsageChange};
pub use start_checkout::{
    CheckoutRedirects, StartCheckoutCommand, StartCheckoutHandler, StartCheckoutResult,
};
pub use upgrade_subscription::{
    UpgradeSubscriptionCommand, UpgradeSubscriptionHandler, UpgradeSubscriptionResult,
};

// Queries
pub use check_action_limit::{
    CheckActionLimitHandler, CheckActionLimitQuery, CheckActionLimitResult,
};
pub use check_limit::{
    CheckAllLimitsQuery, CheckAllLimitsResult, CheckLimitHandler, CheckLimitQuery,
    CheckLimitResult,
};
pub use get_subscription::{
    GetSubscriptionHandler, GetSubscriptionQuery, PricingView, SubscriptionView, TrialView,
    UsageView,
};
pub use list_subscriptions::{
    ListSubscriptionsHandler, ListSubscriptionsQuery, ListSubscriptionsResult,
};
