//! HTTP handlers for the token service.
//!
//! # Available Handlers
//!
//! - [`token`] - Registry token endpoint

pub mod token;

pub use token::{TokenQuery, TokenResponse, TokenState, token_handler};
