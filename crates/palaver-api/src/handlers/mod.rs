//! Request handlers, one module per resource

pub mod categories;
pub mod friends;
pub mod health;
pub mod posts;
pub mod reactions;
pub mod tags;
pub mod threads;
pub mod tokens;
pub mod users;
