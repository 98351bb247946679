//! Resource scopes and the scope parser.
//!
//! A registry client asks for access with a scope of the form
//! `type:name:action1,action2`, for example `repository:library/alpine:pull`.
//! When no usable scope is given (the client is only logging in) the parser
//! falls back to the catalog scope `catalog::*`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::AuthResult;
use crate::error::AuthError;

/// Resource type of the login/bootstrap fallback scope.
pub const CATALOG_SCOPE_TYPE: &str = "catalog";

/// Action granting everything on a resource.
pub const WILDCARD_ACTION: &str = "*";

const SCOPE_SEPARATOR: char = ':';
const ACTION_SEPARATOR: char = ',';

/// A resource type, a resource name and the actions on it.
///
/// Serializes as a registry `access` entry: `{"type", "name", "actions"}`.
/// `actions` keeps request order but holds no duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceScope {
    /// Resource type, e.g. `repository`.
    #[serde(rename = "type")]
    pub resource_type: String,

    /// Resource name, e.g. `library/alpine`. Empty for the catalog scope.
    pub name: String,

    /// Actions, e.g. `pull` and `push`.
    pub actions: Vec<String>,
}

impl ResourceScope {
    /// Creates a scope, dropping empty and repeated actions.
    pub fn new<I, S>(resource_type: impl Into<String>, name: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut deduped: Vec<String> = Vec::new();
        for action in actions {
            let action = action.into();
            if !action.is_empty() && !deduped.contains(&action) {
                deduped.push(action);
            }
        }

        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            actions: deduped,
        }
    }

    /// The fallback scope used when a client is logging in.
    pub fn catalog() -> Self {
        Self {
            resource_type: CATALOG_SCOPE_TYPE.to_string(),
            name: String::new(),
            actions: vec![WILDCARD_ACTION.to_string()],
        }
    }

    /// Returns `true` for the catalog fallback scope.
    pub fn is_catalog(&self) -> bool {
        self.resource_type == CATALOG_SCOPE_TYPE && self.name.is_empty()
    }

    /// Returns `true` if the scope names a concrete resource.
    pub fn is_well_formed(&self) -> bool {
        !self.resource_type.is_empty() && !self.name.is_empty()
    }

    /// Returns a copy of this scope with a different action set.
    #[must_use]
    pub fn with_actions<I, S>(&self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(self.resource_type.clone(), self.name.clone(), actions)
    }
}

impl fmt::Display for ResourceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.resource_type,
            self.name,
            self.actions.join(",")
        )
    }
}

/// Turns the `scope` and `service` request parameters into a [`ResourceScope`].
#[derive(Debug, Clone)]
pub struct ScopeParser {
    registry_domain: String,
}

impl ScopeParser {
    /// Creates a parser for scopes addressed to `registry_domain`.
    pub fn new(registry_domain: impl Into<String>) -> Self {
        Self {
            registry_domain: registry_domain.into(),
        }
    }

    /// Parses a scope, falling back to [`ResourceScope::catalog`] when the
    /// scope is unusable or addressed to another service.
    pub fn parse(&self, scope: &str, service: &str) -> ResourceScope {
        match self.parse_strict(scope, service) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::debug!(error = %err, service, "Using catalog scope");
                ResourceScope::catalog()
            }
        }
    }

    /// Parses a scope without the catalog fallback.
    ///
    /// # Errors
    ///
    /// Returns `ScopeMalformed` when the scope has fewer than three parts,
    /// an empty type or name, or the service is not the registry domain.
    pub fn parse_strict(&self, scope: &str, service: &str) -> AuthResult<ResourceScope> {
        if service != self.registry_domain {
            return Err(AuthError::scope_malformed(scope));
        }

        let mut parts = scope.splitn(3, SCOPE_SEPARATOR);
        let (Some(resource_type), Some(name), Some(actions)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::scope_malformed(scope));
        };

        let parsed = ResourceScope::new(resource_type, name, actions.split(ACTION_SEPARATOR));
        if !parsed.is_well_formed() {
            return Err(AuthError::scope_malformed(scope));
        }

        Ok(parsed)
    }
}
