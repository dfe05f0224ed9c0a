//! Palaver - JSON REST forum server

use clap::Parser;
use palaver_api::{run_server, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "palaver-server")]
#[command(about = "JSON REST API server for the Palaver forum")]
#[command(version)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "PALAVER_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "PALAVER_PORT")]
    port: u16,

    /// Database URL
    #[arg(
        long,
        default_value = "sqlite://palaver.db",
        env = "PALAVER_DATABASE_URL"
    )]
    database_url: String,

    /// Lifetime of issued tokens, in days
    #[arg(long, default_value = "30", env = "PALAVER_TOKEN_TTL_DAYS")]
    token_ttl_days: i64,

    /// Rate limit (requests per second per client IP)
    #[arg(long, default_value = "50", env = "PALAVER_RATE_LIMIT_RPS")]
    rate_limit_rps: u32,

    /// Rate limit burst allowance
    #[arg(long, default_value = "100", env = "PALAVER_RATE_LIMIT_BURST")]
    rate_limit_burst: u32,

    /// Trust X-Forwarded-For for client IPs (behind a reverse proxy)
    #[arg(long, env = "PALAVER_BEHIND_PROXY")]
    behind_proxy: bool,

    /// Disable authentication (for development only!)
    #[arg(long, env = "PALAVER_NO_AUTH")]
    no_auth: bool,

    /// Enable debug logging
    #[arg(short, long, env = "PALAVER_DEBUG")]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Parse arguments
    let args = Args::parse();

    // Setup logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("palaver_api={log_level},palaver_db={log_level},tower_http=debug").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("starting palaver on {}:{}", args.host, args.port);
    tracing::info!("database: {}", args.database_url);

    // Build configuration
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        database_url: args.database_url,
        auth_enabled: !args.no_auth,
        token_ttl_days: args.token_ttl_days,
        rate_limit_rps: args.rate_limit_rps,
        rate_limit_burst: args.rate_limit_burst,
        behind_proxy: args.behind_proxy,
        ..Default::default()
    };

    // Run the server
    run_server(config).await
}
