//! Rule-based access policy.
//!
//! Each [`AclRule`] allows a set of actions on the resources whose type and
//! name match, for one account or for every account (`*`). Resource names
//! are globs where `*` matches any run of characters, `/` included.
//!
//! The catalog fallback scope is what a client gets when it only logs in, so
//! every authenticated account is granted it without a rule.
//!
//! ```toml
//! [[auth.policy.rules]]
//! account = "alice"
//! type = "repository"
//! name = "alice/*"
//! actions = ["pull", "push"]
//!
//! [[auth.policy.rules]]
//! account = "*"
//! type = "repository"
//! name = "library/*"
//! actions = ["pull"]
//! ```

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::AccessDecisionPoint;
use crate::AuthResult;
use crate::error::AuthError;
use crate::types::{AuthRequest, ResourceScope, WILDCARD_ACTION};

const WILDCARD: &str = "*";

fn wildcard() -> String {
    WILDCARD.to_string()
}

/// One allow rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclRule {
    /// Username the rule applies to, or `*` for every account.
    #[serde(default = "wildcard")]
    pub account: String,

    /// Resource type, or `*` for any type.
    #[serde(rename = "type", default = "wildcard")]
    pub resource_type: String,

    /// Resource name glob.
    #[serde(default = "wildcard")]
    pub name: String,

    /// Allowed actions; `*` allows every action.
    #[serde(default)]
    pub actions: Vec<String>,
}

#[derive(Debug)]
struct CompiledRule {
    rule: AclRule,
    name: Regex,
}

impl CompiledRule {
    fn compile(rule: AclRule) -> AuthResult<Self> {
        let pattern = format!("^{}$", regex::escape(&rule.name).replace(r"\*", ".*"));
        let name = Regex::new(&pattern).map_err(|e| {
            AuthError::configuration(format!("invalid ACL name pattern '{}': {e}", rule.name))
        })?;
        Ok(Self { rule, name })
    }

    fn applies_to(&self, username: &str, scope: &ResourceScope) -> bool {
        (self.rule.account == WILDCARD || self.rule.account == username)
            && (self.rule.resource_type == WILDCARD
                || self.rule.resource_type == scope.resource_type)
            && self.name.is_match(&scope.name)
    }

    fn allows(&self, action: &str) -> bool {
        self.rule
            .actions
            .iter()
            .any(|allowed| allowed == WILDCARD_ACTION || allowed == action)
    }
}

/// Grants the requested actions that at least one matching rule allows.
///
/// A request whose granted action set ends up empty is denied.
#[derive(Debug)]
pub struct AclPolicy {
    rules: Vec<CompiledRule>,
}

impl AclPolicy {
    /// Compiles the rules.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if a name pattern cannot be compiled.
    pub fn new(rules: Vec<AclRule>) -> AuthResult<Self> {
        let rules = rules
            .into_iter()
            .map(CompiledRule::compile)
            .collect::<AuthResult<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Returns the number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if there are no rules, in which case only login is allowed.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn grant(&self, username: &str, requested: &ResourceScope) -> Option<ResourceScope> {
        if requested.is_catalog() {
            return Some(requested.clone());
        }

        let matching: Vec<&CompiledRule> = self
            .rules
            .iter()
            .filter(|rule| rule.applies_to(username, requested))
            .collect();

        let granted: Vec<&String> = requested
            .actions
            .iter()
            .filter(|action| matching.iter().any(|rule| rule.allows(action)))
            .collect();

        if granted.is_empty() {
            return None;
        }
        Some(requested.with_actions(granted.into_iter().cloned()))
    }
}

#[async_trait]
impl AccessDecisionPoint for AclPolicy {
    async fn decide(&self, request: &AuthRequest) -> AuthResult<Option<ResourceScope>> {
        let Some(username) = request.username() else {
            return Ok(None);
        };

        let granted = self.grant(username, &request.requested_scope);
        if granted.is_none() {
            tracing::debug!(
                username,
                scope = %request.requested_scope,
                "No ACL rule grants the requested scope"
            );
        }
        Ok(granted)
    }
}
