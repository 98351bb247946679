use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, routing::get};
use regauth_auth::{AuthConfig, AuthorizationPipeline, ScopeParser, TokenIssuer, TokenState, token_handler};
use tower_http::trace::TraceLayer;

use crate::{config::AppConfig, handlers, keys};

pub struct RegauthServer {
    addr: SocketAddr,
    app: Router,
}

/// Builds the token pipeline from configuration.
///
/// Loads the signing key, seeds the credential store and compiles the
/// access policy. Any failure here must stop startup.
pub fn build_pipeline(cfg: &AuthConfig) -> anyhow::Result<AuthorizationPipeline> {
    let key = keys::load_signing_key(&cfg.signing)?;
    let store = cfg.store.build()?;
    let policy = cfg.policy.build()?;

    let issuer = TokenIssuer::new(
        key,
        cfg.issuer_domain.clone(),
        cfg.registry_domain.clone(),
        cfg.token_ttl(),
    );

    tracing::info!(
        registry = %cfg.registry_domain,
        issuer = %cfg.issuer_domain,
        ttl_secs = cfg.token_duration_secs,
        policy = ?cfg.policy.kind,
        "Token pipeline ready"
    );

    Ok(AuthorizationPipeline::new(
        store,
        policy,
        ScopeParser::new(cfg.registry_domain.clone()),
        issuer,
    ))
}

pub fn build_app(pipeline: Arc<AuthorizationPipeline>) -> Router {
    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        // Registry token endpoint
        .route(
            "/token",
            get(token_handler).with_state(TokenState::new(pipeline)),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    // The query carries scope and service only; credentials travel in headers.
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>, latency: std::time::Duration, span: &tracing::Span| {
                        span.record("http.status_code", tracing::field::display(res.status().as_u16()));
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub fn build(self) -> anyhow::Result<RegauthServer> {
        let pipeline = build_pipeline(&self.config.auth)?;
        let app = build_app(Arc::new(pipeline));

        Ok(RegauthServer {
            addr: self.addr,
            app,
        })
    }
}

impl RegauthServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
