//! # Palaver Core
//!
//! Domain model shared by the Palaver forum server and data layer.
//!
//! This crate provides:
//! - **Scopes**: token scope parsing and permission checks
//! - **Tokens**: opaque API token generation and digesting
//! - **Paging**: limit/offset parameters with sort-column safelists
//! - **Validation**: field-keyed validation error maps

pub mod paging;
pub mod scope;
pub mod token;
pub mod validation;

pub use paging::{Direction, Page, PageParams, SortSafelist};
pub use scope::Scopes;
pub use token::{digest_token, generate_token};
pub use validation::ValidationErrors;
