//! Admin authorization port.
//!
//! Answers whether an actor holds the administrator role. Consulted by
//! admin-only operations before any subscription lookup.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};

/// Port for administrator checks.
///
/// Implementations should fail closed: if the role cannot be determined,
/// return an error rather than `true`.
#[async_trait]
pub trait AdminAuthorizer: Send + Sync {
    async fn is_admin(&self, actor_id: &UserId) -> Result<bool, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_authorizer_is_object_safe() {
        fn _accepts_dyn(_authorizer: &dyn AdminAuthorizer) {}
    }
}
