//! Server configuration

use serde::{Deserialize, Serialize};

/// Forum server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Database URL (e.g. `sqlite://palaver.db`, or `sqlite::memory:`)
    pub database_url: String,
    /// Enable authentication
    pub auth_enabled: bool,
    /// Lifetime of freshly issued tokens, in days
    pub token_ttl_days: i64,
    /// bcrypt cost for password hashing
    pub bcrypt_cost: u32,
    /// Rate limit (requests per second per client IP)
    pub rate_limit_rps: u32,
    /// Rate limit burst allowance
    pub rate_limit_burst: u32,
    /// Trust `X-Forwarded-For` for the client IP
    pub behind_proxy: bool,
    /// Maximum request body size (bytes)
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "sqlite://palaver.db".to_string(),
            auth_enabled: true,
            token_ttl_days: 30,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            rate_limit_rps: 50,
            rate_limit_burst: 100,
            behind_proxy: false,
            max_body_size: 1024 * 1024, // 1 MiB, JSON bodies only
        }
    }
}

impl ServerConfig {
    /// Get the bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
