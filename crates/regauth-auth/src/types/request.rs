//! Per-request authorization state.

use super::{Account, ResourceScope};

/// The state of one token request as seen by the access decision point.
///
/// `account` stays `None` until credentials have been verified.
#[derive(Debug, Clone)]
pub struct AuthRequest {
    /// The verified account, if any.
    pub account: Option<Account>,

    /// The scope the client asked for.
    pub requested_scope: ResourceScope,
}

impl AuthRequest {
    /// Creates a request for a verified account.
    pub fn new(account: Account, requested_scope: ResourceScope) -> Self {
        Self {
            account: Some(account),
            requested_scope,
        }
    }

    /// Creates a request that has not been authenticated.
    pub fn anonymous(requested_scope: ResourceScope) -> Self {
        Self {
            account: None,
            requested_scope,
        }
    }

    /// Returns the username of the verified account.
    pub fn username(&self) -> Option<&str> {
        self.account.as_ref().map(|a| a.username.as_str())
    }
}
