//! Static admin authorizer.
//!
//! Treats a fixed set of user ids as administrators. Suitable for tests and
//! for small deployments where the admin list comes from configuration.
//!
//! # Example
//!
//! ```ignore
//! let authorizer = StaticAdminAuthorizer::new(["ops-1", "ops-2"]);
//! assert!(authorizer.is_admin(&UserId::new("ops-1")?).await?);
//! ```

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::ports::AdminAuthorizer;

/// Admin authorizer backed by an in-memory id set.
#[derive(Debug, Default)]
pub struct StaticAdminAuthorizer {
    admins: RwLock<HashSet<String>>,
    /// Error returned by every check, for failure-path tests.
    force_error: RwLock<Option<DomainError>>,
}

impl StaticAdminAuthorizer {
    pub fn new<I, S>(admin_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            admins: RwLock::new(admin_ids.into_iter().map(Into::into).collect()),
            force_error: RwLock::new(None),
        }
    }

    /// An authorizer that knows no administrators.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn grant(&self, user_id: impl Into<String>) {
        self.admins
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id.into());
    }

    pub fn revoke(&self, user_id: &str) {
        self.admins
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(user_id);
    }

    /// Makes every check fail with `error`.
    pub fn with_error(self, error: DomainError) -> Self {
        *self.force_error.write().unwrap_or_else(PoisonError::into_inner) = Some(error);
        self
    }
}

#[async_trait]
impl AdminAuthorizer for StaticAdminAuthorizer {
    async fn is_admin(&self, actor_id: &UserId) -> Result<bool, DomainError> {
        if let Some(error) = self
            .force_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(error);
        }
        Ok(self
            .admins
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(actor_id.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    #[tokio::test]
    async fn listed_ids_are_admins() {
        let authorizer = StaticAdminAuthorizer::new(["ops-1"]);
        assert!(authorizer.is_admin(&UserId::new("ops-1").unwrap()).await.unwrap());
        assert!(!authorizer.is_admin(&UserId::new("user-1").unwrap()).await.unwrap());
    }

    #[tokio::test]
    async fn grant_and_revoke() {
        let authorizer = StaticAdminAuthorizer::empty();
        let id = UserId::new("ops-2").unwrap();
        authorizer.grant("ops-2");
        assert!(authorizer.is_admin(&id).await.unwrap());
        authorizer.revoke("ops-2");
        assert!(!authorizer.is_admin(&id).await.unwrap());
    }

    #[tokio::test]
    async fn forced_error_is_returned() {
        let authorizer = StaticAdminAuthorizer::new(["ops-1"])
            .with_error(DomainError::new(ErrorCode::InternalError, "directory down"));
        let err = authorizer
            .is_admin(&UserId::new("ops-1").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InternalError);
    }
}
