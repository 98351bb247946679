//! Request extraction helpers.

pub mod basic_auth;

pub use basic_auth::{BasicCredentials, extract_basic_auth, parse_basic_auth};
