//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `subscription` - Creator plans, usage limits and subscription lifecycle

pub mod foundation;
pub mod subscription;
