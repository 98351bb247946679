//! Authentication and authorization error types.
//!
//! This module defines the error taxonomy of the token-issuance pipeline and
//! how each error is grouped when it reaches the HTTP boundary.

use std::fmt;

/// Errors that can occur while issuing a registry token.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Credentials are missing, the user is unknown, or the secret is wrong.
    ///
    /// The three cases are not distinguished.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// The scope string could not be parsed.
    ///
    /// Only the strict parser reports this; the pipeline recovers with the
    /// catalog scope instead.
    #[error("Malformed scope: {scope}")]
    ScopeMalformed {
        /// The raw scope that was rejected.
        scope: String,
    },

    /// The access decision point rejected the requested scope.
    #[error("Access denied: {message}")]
    AccessDenied {
        /// Description of why access was denied.
        message: String,
    },

    /// The token could not be signed.
    #[error("Signing error: {message}")]
    Signing {
        /// Description of the signing error.
        message: String,
    },

    /// Key material or settings are invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// The credential backend failed.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `ScopeMalformed` error.
    #[must_use]
    pub fn scope_malformed(scope: impl Into<String>) -> Self {
        Self::ScopeMalformed {
            scope: scope.into(),
        }
    }

    /// Creates a new `AccessDenied` error.
    #[must_use]
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied {
            message: message.into(),
        }
    }

    /// Creates a new `Signing` error.
    #[must_use]
    pub fn signing(message: impl Into<String>) -> Self {
        Self::Signing {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Returns `true` if the client must receive the generic unauthorized response.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.category() == ErrorCategory::Unauthorized
    }

    /// Returns `true` if this is a server-side fault (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.category() == ErrorCategory::ServerFault
    }

    /// Returns the error category used at the HTTP boundary.
    ///
    /// Storage failures fail closed and are reported as unauthorized.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::AuthenticationFailed => ErrorCategory::Unauthorized,
            Self::ScopeMalformed { .. } => ErrorCategory::Unauthorized,
            Self::AccessDenied { .. } => ErrorCategory::Unauthorized,
            Self::Storage { .. } => ErrorCategory::Unauthorized,
            Self::Signing { .. } => ErrorCategory::ServerFault,
            Self::Configuration { .. } => ErrorCategory::Startup,
        }
    }
}

/// Groups of errors as seen by clients and operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Collapses to the single unauthorized response.
    Unauthorized,
    /// A fault while building the token (HTTP 500).
    ServerFault,
    /// Fatal during startup; never produced while serving requests.
    Startup,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::ServerFault => write!(f, "server_fault"),
            Self::Startup => write!(f, "startup"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            AuthError::AuthenticationFailed.to_string(),
            "Authentication failed"
        );
        assert_eq!(
            AuthError::scope_malformed("repository").to_string(),
            "Malformed scope: repository"
        );
        assert_eq!(
            AuthError::signing("key rejected").to_string(),
            "Signing error: key rejected"
        );
    }

    #[test]
    fn test_denials_collapse_to_unauthorized() {
        assert!(AuthError::AuthenticationFailed.is_unauthorized());
        assert!(AuthError::access_denied("nope").is_unauthorized());
        assert!(AuthError::storage("backend down").is_unauthorized());
        assert!(!AuthError::signing("bad key").is_unauthorized());
    }

    #[test]
    fn test_signing_is_server_fault() {
        let err = AuthError::signing("bad key");
        assert!(err.is_server_error());
        assert_eq!(err.category(), ErrorCategory::ServerFault);
        assert_eq!(
            AuthError::configuration("missing key").category(),
            ErrorCategory::Startup
        );
    }

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::Unauthorized.to_string(), "unauthorized");
        assert_eq!(ErrorCategory::ServerFault.to_string(), "server_fault");
        assert_eq!(ErrorCategory::Startup.to_string(), "startup");
    }
}
