//! Registry token endpoint handler.
//!
//! ```ignore
//! GET /token?service=registry.example.com&scope=repository:app1:pull
//! Authorization: Basic <base64(username:secret)>
//!
//! 200 {"token": "<header>.<claims>.<signature>"}
//! 401 Unauthorized request
//! 500 Internal server error
//! ```

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::extractors::extract_basic_auth;
use crate::pipeline::AuthorizationPipeline;

/// Body of every 401 response.
pub const UNAUTHORIZED_BODY: &str = "Unauthorized request";

/// Body of every 500 response.
pub const SERVER_ERROR_BODY: &str = "Internal server error";

/// State required for the token endpoint.
#[derive(Clone)]
pub struct TokenState {
    pipeline: Arc<AuthorizationPipeline>,
}

impl TokenState {
    /// Creates a new token state.
    pub fn new(pipeline: Arc<AuthorizationPipeline>) -> Self {
        Self { pipeline }
    }

    /// Returns the shared pipeline.
    pub fn pipeline(&self) -> &Arc<AuthorizationPipeline> {
        &self.pipeline
    }
}

/// Query parameters of a token request.
///
/// Repeated parameters keep their first value; clients repeat `scope` for
/// cross-repository mounts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenQuery {
    /// Service the token is for; must be the registry domain.
    #[serde(default)]
    pub service: String,

    /// Requested scope, `type:name:actions`.
    #[serde(default)]
    pub scope: String,
}

impl TokenQuery {
    /// Builds the query from decoded `key=value` pairs.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut service = None;
        let mut scope = None;
        for (key, value) in pairs {
            match key.as_str() {
                "service" if service.is_none() => service = Some(value),
                "scope" if scope.is_none() => scope = Some(value),
                _ => {}
            }
        }

        Self {
            service: service.unwrap_or_default(),
            scope: scope.unwrap_or_default(),
        }
    }
}

/// Successful token response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The compact signed token.
    pub token: String,
}

/// Token endpoint handler.
///
/// Every authentication or authorization failure gets the same 401 body;
/// only a signing failure produces a 500. An unreadable query string is
/// treated as a failed authentication.
pub async fn token_handler(
    State(state): State<TokenState>,
    headers: HeaderMap,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    let query = match params {
        Ok(Query(pairs)) => TokenQuery::from_pairs(pairs),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable token query");
            return token_error_response(&AuthError::AuthenticationFailed);
        }
    };
    let credentials = extract_basic_auth(&headers);

    match state
        .pipeline
        .run(credentials, &query.service, &query.scope)
        .await
    {
        Ok(token) => (StatusCode::OK, Json(TokenResponse { token })).into_response(),
        Err(err) => token_error_response(&err),
    }
}

/// Maps a pipeline error to its fixed response.
fn token_error_response(error: &AuthError) -> Response {
    let (status, body) = if error.is_server_error() {
        (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_BODY)
    } else {
        (StatusCode::UNAUTHORIZED, UNAUTHORIZED_BODY)
    };

    (status, [(CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
}
