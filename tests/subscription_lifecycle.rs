//! Integration tests for the subscription lifecycle.
//!
//! Drives the application handlers end to end against the in-memory
//! repository, the mock billing provider and the static admin authorizer:
//! 1. Creation and usage limits
//! 2. Checkout, upgrade and cancellation
//! 3. Payment webhooks and grace-period expiry
//! 4. Administrator extensions

use std::sync::Arc;

use creator_billing::adapters::{
    InMemorySubscriptionRepository, MockBillingProvider, StaticAdminAuthorizer,
};
use creator_billing::application::handlers::subscription::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, CheckActionLimitHandler,
    CheckActionLimitQuery, CheckAllLimitsQuery, CheckLimitHandler, CheckLimitQuery,
    CheckoutRedirects, CompleteCheckoutCommand, CompleteCheckoutHandler,
    CreateSubscriptionCommand, CreateSubscriptionHandler, ExpireGracePeriodsCommand,
    ExpireGracePeriodsHandler, ExtendSubscriptionCommand, ExtendSubscriptionHandler,
    GetSubscriptionHandler, GetSubscriptionQuery, HandlePaymentFailedCommand,
    HandlePaymentFailedHandler, HandlePaymentSucceededCommand, HandlePaymentSucceededHandler,
    ListSubscriptionsHandler, ListSubscriptionsQuery, PaymentFailedOutcome, RecordUsageCommand,
    RecordUsageHandler, StartCheckoutCommand, StartCheckoutHandler, UsageChange,
};
use creator_billing::config::BillingConfig;
use creator_billing::domain::foundation::{CreatorId, ErrorCode, Timestamp};
use creator_billing::domain::subscription::{
    BillingInterval, Limit, LimitStatus, LimitedAction, LimitedResource, Subscription,
    SubscriptionStatus, Tier,
};
use creator_billing::ports::SubscriptionRepository;

// =============================================================================
// Test Infrastructure
// =============================================================================

struct App {
    repo: Arc<InMemorySubscriptionRepository>,
    billing: MockBillingProvider,
    authorizer: Arc<StaticAdminAuthorizer>,
}

impl App {
    fn new() -> Self {
        Self {
            repo: Arc::new(InMemorySubscriptionRepository::new()),
            billing: MockBillingProvider::new(),
            authorizer: Arc::new(StaticAdminAuthorizer::new(["admin-1"])),
        }
    }

    async fn create(&self, creator: &str, tier: Tier) -> Subscription {
        CreateSubscriptionHandler::new(self.repo.clone())
            .handle(CreateSubscriptionCommand {
                user_id: format!("user-of-{creator}"),
                creator_id: creator.to_string(),
                tier: Some(tier),
                ..Default::default()
            })
            .await
            .unwrap()
            .subscription
    }

    async fn stored(&self, creator: &str) -> Subscription {
        self.repo
            .find_by_creator_id(&CreatorId::new(creator).unwrap())
            .await
            .unwrap()
            .unwrap()
    }

    fn record_usage(&self) -> RecordUsageHandler {
        RecordUsageHandler::new(self.repo.clone())
    }

    fn check_limit(&self) -> CheckLimitHandler {
        CheckLimitHandler::new(self.repo.clone())
    }

    fn cancel(&self) -> CancelSubscriptionHandler {
        CancelSubscriptionHandler::new(self.repo.clone(), Arc::new(self.billing.clone()))
    }

    fn extend(&self) -> ExtendSubscriptionHandler {
        ExtendSubscriptionHandler::new(self.repo.clone(), self.authorizer.clone())
    }

    fn redirects() -> CheckoutRedirects {
        CheckoutRedirects {
            success_url: "https://shop.example.com/billing/success".to_string(),
            cancel_url: "https://shop.example.com/billing/cancel".to_string(),
        }
    }
}

fn publish(creator: &str) -> RecordUsageCommand {
    RecordUsageCommand {
        creator_id: creator.to_string(),
        resource: LimitedResource::Product,
        change: UsageChange::Increment,
    }
}

fn product_limit_query(creator: &str) -> CheckLimitQuery {
    CheckLimitQuery {
        creator_id: creator.to_string(),
        resource: LimitedResource::Product,
    }
}

// =============================================================================
// Usage Limits
// =============================================================================

#[tokio::test]
async fn starter_walks_from_ok_through_warning_to_blocked() {
    let app = App::new();
    app.create("creator-1", Tier::Starter).await;
    let usage = app.record_usage();
    let check = app.check_limit();

    for _ in 0..9 {
        usage.handle(publish("creator-1")).await.unwrap();
    }
    let warning = check.handle(product_limit_query("creator-1")).await.unwrap();
    assert_eq!(warning.status, LimitStatus::Warning);

    let allowed = CheckActionLimitHandler::new(app.repo.clone())
        .handle(CheckActionLimitQuery {
            creator_id: "creator-1".to_string(),
            action: LimitedAction::PublishProduct,
        })
        .await
        .unwrap();
    assert!(allowed.allowed);

    usage.handle(publish("creator-1")).await.unwrap();
    let blocked = check.handle(product_limit_query("creator-1")).await.unwrap();
    assert_eq!(blocked.status, LimitStatus::Blocked);
    assert_eq!(blocked.current, 10);

    let err = usage.handle(publish("creator-1")).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::LimitReached);
    assert_eq!(app.stored("creator-1").await.products_used(), 10);
}

#[tokio::test]
async fn unpublishing_frees_a_slot() {
    let app = App::new();
    app.create("creator-1", Tier::Starter).await;
    let usage = app.record_usage();
    for _ in 0..10 {
        usage.handle(publish("creator-1")).await.unwrap();
    }

    usage
        .handle(RecordUsageCommand {
            change: UsageChange::Decrement,
            ..publish("creator-1")
        })
        .await
        .unwrap();

    let status = app
        .check_limit()
        .handle(product_limit_query("creator-1"))
        .await
        .unwrap();
    assert_eq!(status.status, LimitStatus::Warning);
}

#[tokio::test]
async fn business_is_never_blocked() {
    let app = App::new();
    app.create("creator-1", Tier::Business).await;
    let usage = app.record_usage();
    for _ in 0..25 {
        usage.handle(publish("creator-1")).await.unwrap();
    }

    let all = app
        .check_limit()
        .handle_all(CheckAllLimitsQuery {
            creator_id: "creator-1".to_string(),
        })
        .await
        .unwrap();

    assert!(!all.has_blocking_limit());
    assert_eq!(all.products.limit, Limit::Unlimited);
}

// =============================================================================
// Checkout, Upgrade, Cancel
// =============================================================================

#[tokio::test]
async fn checkout_upgrade_recomputes_commission_and_keeps_usage() {
    let app = App::new();
    app.create("creator-1", Tier::Starter).await;
    let usage = app.record_usage();
    for _ in 0..3 {
        usage.handle(publish("creator-1")).await.unwrap();
    }

    let checkout = StartCheckoutHandler::new(
        app.repo.clone(),
        Arc::new(app.billing.clone()),
        App::redirects(),
    )
    .handle(StartCheckoutCommand {
        user_id: "user-of-creator-1".to_string(),
        creator_id: "creator-1".to_string(),
        email: "creator-1@example.com".to_string(),
        tier: "pro".to_string(),
        billing_interval: Some(BillingInterval::Month),
        with_trial: false,
    })
    .await
    .unwrap();
    assert!(app
        .billing
        .complete_session(&checkout.session_id, "sub_1", "cus_1", "price_pro_month"));

    CompleteCheckoutHandler::new(app.repo.clone(), Arc::new(app.billing.clone()))
        .handle(CompleteCheckoutCommand {
            session_id: checkout.session_id,
        })
        .await
        .unwrap();

    let sub = app.stored("creator-1").await;
    assert_eq!(sub.tier(), Tier::Pro);
    assert_eq!(sub.commission_rate().basis_points(), 400);
    assert_eq!(sub.products_used(), 3);
    assert_eq!(sub.pinned_products_used(), 0);

    let view = GetSubscriptionHandler::new(app.repo.clone())
        .handle(GetSubscriptionQuery {
            creator_id: "creator-1".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(view.products.limit, Limit::Capped(50));
    assert_eq!(view.billing_interval, BillingInterval::Month);
}

#[tokio::test]
async fn second_cancel_fails_while_aggregate_cancel_is_idempotent() {
    let app = App::new();
    app.create("creator-1", Tier::Pro).await;
    let cancel = app.cancel();
    let command = CancelSubscriptionCommand {
        creator_id: "creator-1".to_string(),
        immediate: false,
    };

    cancel.handle(command.clone()).await.unwrap();
    let err = cancel.handle(command).await.unwrap_err();
    assert_eq!(err.message(), "Subscription is already cancelled");

    let mut sub = app.stored("creator-1").await;
    sub.cancel_subscription();
    assert_eq!(sub.status(), SubscriptionStatus::Cancelled);
}

// =============================================================================
// Payment Webhooks
// =============================================================================

#[tokio::test]
async fn failed_payment_then_renewal_restores_good_standing() {
    let app = App::new();
    app.create("creator-1", Tier::Business).await;
    let sub = app.stored("creator-1").await;
    // Link to a remote subscription so webhooks can find it.
    let mut record = sub.to_record();
    record.provider_subscription_id = Some("sub_biz".to_string());
    app.repo
        .save(&Subscription::reconstitute(record).unwrap())
        .await
        .unwrap();

    let failed = HandlePaymentFailedHandler::new(app.repo.clone())
        .handle(HandlePaymentFailedCommand {
            provider_subscription_id: "sub_biz".to_string(),
            failed_at: Timestamp::now(),
        })
        .await
        .unwrap();
    assert_eq!(failed.outcome, PaymentFailedOutcome::MarkedPastDue);
    let past_due = app.stored("creator-1").await;
    assert_eq!(past_due.status(), SubscriptionStatus::PastDue);
    assert!(past_due.grace_period_start().is_some());

    let start = Timestamp::now().add_days(1);
    let renewed = HandlePaymentSucceededHandler::new(app.repo.clone())
        .handle(HandlePaymentSucceededCommand {
            provider_subscription_id: "sub_biz".to_string(),
            period_start: start.as_unix_secs(),
            period_end: start.add_days(365).as_unix_secs(),
        })
        .await
        .unwrap();
    assert!(renewed.recovered_from_past_due);
    let sub = app.stored("creator-1").await;
    assert_eq!(sub.status(), SubscriptionStatus::Active);
    assert!(sub.grace_period_start().is_none());

    // A late redelivery of the original failure no longer reopens the grace period.
    let redelivered = HandlePaymentFailedHandler::new(app.repo.clone())
        .handle(HandlePaymentFailedCommand {
            provider_subscription_id: "sub_biz".to_string(),
            failed_at: Timestamp::now(),
        })
        .await
        .unwrap();
    assert_eq!(redelivered.outcome, PaymentFailedOutcome::Stale);
    assert_eq!(app.stored("creator-1").await.status(), SubscriptionStatus::Active);
}

#[tokio::test]
async fn lapsed_grace_period_is_cancelled_by_sweep() {
    let app = App::new();
    app.create("creator-1", Tier::Pro).await;
    app.create("creator-2", Tier::Pro).await;
    let now = Timestamp::now();
    let mut lapsed = app.stored("creator-1").await;
    lapsed.mark_as_past_due(now.minus_days(30)).unwrap();
    app.repo.save(&lapsed).await.unwrap();

    let result = ExpireGracePeriodsHandler::new(
        app.repo.clone(),
        Arc::new(app.billing.clone()),
        &BillingConfig::default(),
    )
    .handle(ExpireGracePeriodsCommand { now })
    .await
    .unwrap();

    assert_eq!(result.expired, vec![lapsed.id()]);
    assert_eq!(
        app.stored("creator-1").await.status(),
        SubscriptionStatus::Cancelled
    );
    assert_eq!(app.stored("creator-2").await.status(), SubscriptionStatus::Active);

    let cancelled = ListSubscriptionsHandler::new(app.repo.clone())
        .handle(ListSubscriptionsQuery {
            status: Some("cancelled".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(cancelled.total, 1);
}

// =============================================================================
// Administrator Extension
// =============================================================================

#[tokio::test]
async fn extensions_compound_from_current_end() {
    let app = App::new();
    let sub = app.create("creator-1", Tier::Pro).await;
    let original_end = sub.current_period_end();
    let extend = app.extend();
    let command = ExtendSubscriptionCommand {
        actor_id: "admin-1".to_string(),
        subscription_id: sub.id().to_string(),
        days: 30,
    };

    extend.handle(command.clone()).await.unwrap();
    let result = extend.handle(command).await.unwrap();

    assert_eq!(result.new_period_end, original_end.add_days(60));
    assert_eq!(
        app.stored("creator-1").await.current_period_end(),
        original_end.add_days(60)
    );
}

#[tokio::test]
async fn revoked_admin_loses_access() {
    let app = App::new();
    let sub = app.create("creator-1", Tier::Pro).await;
    app.authorizer.revoke("admin-1");

    let err = app
        .extend()
        .handle(ExtendSubscriptionCommand {
            actor_id: "admin-1".to_string(),
            subscription_id: sub.id().to_string(),
            days: 7,
        })
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::Forbidden);
}
