pub mod config;
pub mod handlers;
pub mod keys;
pub mod observability;
pub mod server;

pub use config::{AppConfig, LoggingConfig, ServerConfig};
pub use keys::load_signing_key;
pub use observability::init_tracing;
pub use server::{RegauthServer, ServerBuilder, build_app, build_pipeline};
