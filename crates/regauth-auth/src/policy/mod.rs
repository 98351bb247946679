//! Access decisions.
//!
//! The [`AccessDecisionPoint`] trait is the boundary between authentication
//! and token issuance: it receives the verified account together with the
//! requested scope and answers with the scope to grant, or `None` to deny.
//!
//! Two policies ship with the crate:
//!
//! - [`PassThroughPolicy`] grants every authenticated account exactly what it
//!   asked for. It is the default and offers no access control at all.
//! - [`AclPolicy`] grants the requested actions allowed by configured
//!   per-account rules.
//!
//! ```ignore
//! use regauth_auth::policy::{AccessDecisionPoint, AclPolicy, AclRule};
//!
//! let policy = AclPolicy::new(vec![AclRule {
//!     account: "alice".to_string(),
//!     resource_type: "repository".to_string(),
//!     name: "alice/*".to_string(),
//!     actions: vec!["pull".to_string(), "push".to_string()],
//! }])?;
//!
//! let granted = policy.decide(&request).await?;
//! ```

pub mod acl;
pub mod pass_through;

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::{AuthRequest, ResourceScope};

pub use acl::{AclPolicy, AclRule};
pub use pass_through::PassThroughPolicy;

/// Decides which part of a requested scope an account receives.
#[async_trait]
pub trait AccessDecisionPoint: Send + Sync {
    /// Decide on a request.
    ///
    /// Implementations must fail closed: a request without a verified account
    /// is never granted.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(scope))` with the granted scope
    /// - `Ok(None)` if access is denied
    ///
    /// # Errors
    ///
    /// Returns an error if the decision could not be made; callers treat
    /// it as a denial.
    async fn decide(&self, request: &AuthRequest) -> AuthResult<Option<ResourceScope>>;
}
