//! # Palaver DB
//!
//! Data-access layer for the Palaver forum: parameterized SQL over sqlx
//! (SQLite), with optimistic-concurrency `version` columns on every
//! updatable table.
//!
//! All access goes through [`Store`]. One module per resource:
//! users, tokens, categories, threads, tags, posts, reactions, friends.

mod categories;
mod error;
mod friends;
mod models;
mod posts;
mod reactions;
mod store;
mod tags;
mod threads;
mod tokens;
mod users;

pub use error::DbError;
pub use models::{ApiToken, Category, Post, ReactionCount, Tag, Thread, User};
pub use store::Store;
pub use threads::{ThreadChanges, ThreadFilter};
pub use tokens::NewToken;
pub use users::{NewUser, UserChanges};

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;
    use chrono::{Duration, Utc};

    pub async fn store() -> Store {
        Store::connect_in_memory().await.unwrap()
    }

    pub async fn seed_user(store: &Store, email: &str) -> User {
        store
            .create_user(NewUser {
                email: email.to_string(),
                name: email.split('@').next().unwrap().to_string(),
                password_hash: "x".to_string(),
                is_admin: false,
            })
            .await
            .unwrap()
    }

    pub async fn seed_category(store: &Store, name: &str) -> Category {
        store.create_category(name, "").await.unwrap()
    }

    pub async fn seed_thread(store: &Store, category: &Category, user: &User, title: &str) -> Thread {
        store.create_thread(category.id, user.id, title).await.unwrap()
    }

    pub async fn seed_post(store: &Store, thread: &Thread, user: &User, body: &str) -> Post {
        store.create_post(thread.id, user.id, body).await.unwrap()
    }

    pub fn in_one_hour() -> chrono::DateTime<Utc> {
        Utc::now() + Duration::hours(1)
    }

    pub fn one_hour_ago() -> chrono::DateTime<Utc> {
        Utc::now() - Duration::hours(1)
    }
}
