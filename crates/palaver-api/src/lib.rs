//! # Palaver API
//!
//! JSON REST API server for the Palaver forum.
//!
//! This crate provides:
//! - **REST API**: CRUD for categories, threads, tags, posts, users, friends,
//!   reactions and API tokens
//! - **Authentication**: opaque bearer tokens, stored hashed, checked for
//!   scope and expiry
//! - **Optimistic concurrency**: versioned updates; stale writes get `409`
//! - **Rate limiting**: per-IP token bucket with periodic sweeps
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   HTTP Clients                      │
//! └─────────────────────────┬───────────────────────────┘
//!                           │
//! ┌─────────────────────────▼───────────────────────────┐
//! │                   Palaver Server                    │
//! ├─────────────────────────────────────────────────────┤
//! │  Auth Middleware │ Rate Limiter │ Request Logging   │
//! ├─────────────────────────────────────────────────────┤
//! │                  REST Handlers                      │
//! │  (threads, posts, users, tokens, reactions, ...)    │
//! ├─────────────────────────────────────────────────────┤
//! │                   palaver-db                        │
//! │        (sqlx, versioned rows, migrations)           │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use server::{run_server, run_server_with_shutdown};
pub use state::{AppState, AuthUser};
