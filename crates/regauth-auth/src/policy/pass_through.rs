//! Pass-through access policy.

use async_trait::async_trait;

use super::AccessDecisionPoint;
use crate::AuthResult;
use crate::types::{AuthRequest, ResourceScope};

/// Grants every authenticated account exactly its requested scope.
///
/// Authentication is the only check. Use [`AclPolicy`](super::AclPolicy)
/// when accounts must be limited to particular repositories.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughPolicy;

#[async_trait]
impl AccessDecisionPoint for PassThroughPolicy {
    async fn decide(&self, request: &AuthRequest) -> AuthResult<Option<ResourceScope>> {
        if request.account.is_none() {
            return Ok(None);
        }
        Ok(Some(request.requested_scope.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Account;

    #[tokio::test]
    async fn test_grants_requested_scope() {
        let scope = ResourceScope::new("repository", "app1", ["pull", "push"]);
        let request = AuthRequest::new(Account::verified("alice"), scope.clone());

        let granted = PassThroughPolicy.decide(&request).await.unwrap();
        assert_eq!(granted, Some(scope));
    }

    #[tokio::test]
    async fn test_grants_catalog_scope() {
        let request = AuthRequest::new(Account::verified("alice"), ResourceScope::catalog());
        let granted = PassThroughPolicy.decide(&request).await.unwrap();
        assert_eq!(granted, Some(ResourceScope::catalog()));
    }

    #[tokio::test]
    async fn test_denies_without_account() {
        let request = AuthRequest::anonymous(ResourceScope::new("repository", "app1", ["pull"]));
        assert_eq!(PassThroughPolicy.decide(&request).await.unwrap(), None);
    }
}
