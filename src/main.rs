use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uplift::application::{ServerConfig, serve};
use uplift::infrastructure::generator::Provider;

/// Serve AI-generated motivational content with a per-category generation
/// cooldown, plus a file-conversion endpoint.
#[derive(Debug, Parser)]
#[command(name = "uplift", version, about)]
struct Cli {
    /// Address to bind the HTTP server to.
    #[arg(long, env = "UPLIFT_BIND_ADDRESS", default_value = "127.0.0.1:8080")]
    bind_address: std::net::SocketAddr,

    /// SQLite database URL.
    #[arg(long, env = "UPLIFT_DATABASE_URL", default_value = "sqlite:uplift.db")]
    database_url: String,

    /// Text-generation provider.
    #[arg(long, env = "UPLIFT_PROVIDER", value_enum, default_value_t = Provider::Mistral)]
    provider: Provider,

    /// API key for the text-generation provider.
    #[arg(long, env = "UPLIFT_PROVIDER_API_KEY")]
    provider_api_key: Option<String>,

    /// Model name passed to the provider.
    #[arg(long, env = "UPLIFT_PROVIDER_MODEL", default_value = "mistral-small-latest")]
    provider_model: String,

    /// Minimum hours between generations for a category.
    #[arg(long, env = "UPLIFT_COOLDOWN_HOURS", default_value_t = 24)]
    cooldown_hours: i64,

    /// API key for the file-conversion service.
    #[arg(long, env = "UPLIFT_CONVERT_API_KEY")]
    convert_api_key: Option<String>,

    /// Seconds between conversion job status checks.
    #[arg(long, env = "UPLIFT_POLL_INTERVAL_SECS", default_value_t = 5)]
    poll_interval_secs: u64,

    /// Maximum conversion job status checks before giving up.
    #[arg(long, env = "UPLIFT_POLL_MAX_ATTEMPTS", default_value_t = 20)]
    poll_max_attempts: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before clap parses env vars)
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();

    serve(ServerConfig {
        bind_address: cli.bind_address,
        database_url: cli.database_url,
        provider: cli.provider,
        provider_api_key: cli.provider_api_key,
        provider_model: cli.provider_model,
        cooldown_hours: cli.cooldown_hours,
        convert_api_key: cli.convert_api_key,
        poll_interval_secs: cli.poll_interval_secs,
        poll_max_attempts: cli.poll_max_attempts,
    })
    .await
}

#[allow(clippy::expect_used)] // Startup: panicking is appropriate if logging cannot be initialized
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("RUST_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact())
            .init();
    }
}
