//! Creator Billing - Subscription lifecycle and entitlement engine
//!
//! Decides which plan a creator is on, what that plan allows (product and
//! pinned-product limits, commission rate, features), and how the
//! subscription moves through trial, active, past-due and cancelled states
//! in response to upgrades, payments and administrator actions.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
