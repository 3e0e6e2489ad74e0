//! Authorization adapters.
//!
//! Implementations of the `AdminAuthorizer` port:
//!
//! - `static_admin_authorizer` - Fixed admin id set, for tests and config-driven deployments

mod static_admin_authorizer;

pub use static_admin_authorizer::StaticAdminAuthorizer;
