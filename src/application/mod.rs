//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, it separates command handlers (write) from query handlers (read).

pub mod handlers;

pub use handlers::subscription::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, CheckActionLimitHandler,
    CheckActionLimitQuery, CheckAllLimitsQuery, CheckLimitHandler, CheckLimitQuery,
    CompleteCheckoutCommand, CompleteCheckoutHandler, CreateSubscriptionCommand,
    CreateSubscriptionHandler, ExpireGracePeriodsCommand, ExpireGracePeriodsHandler,
    ExtendSubscriptionCommand, ExtendSubscriptionHandler, GetSubscriptionHandler,
    GetSubscriptionQuery, HandlePaymentFailedCommand, HandlePaymentFailedHandler,
    HandlePaymentSucceededCommand, HandlePaymentSucceededHandler, ListSubscriptionsHandler,
    ListSubscriptionsQuery, RecordUsageCommand, RecordUsageHandler, StartCheckoutCommand,
    StartCheckoutHandler, UpgradeSubscriptionCommand, UpgradeSubscriptionHandler,
};
