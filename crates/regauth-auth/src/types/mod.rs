//! Common types shared by the pipeline stages.
//!
//! ## Domain Types
//!
//! - [`Account`] - An account record whose secret never leaves verification
//! - [`ResourceScope`] - Resource type, name and actions requested or granted
//! - [`AuthRequest`] - Per-request state handed to the access decision point

pub mod account;
pub mod request;
pub mod scope;

pub use account::Account;
pub use request::AuthRequest;
pub use scope::{CATALOG_SCOPE_TYPE, ResourceScope, ScopeParser, WILDCARD_ACTION};
