use clap::Parser;
use gateway::config::{GatewayConfig, JWT_SECRET_ENV};
use gateway::{create_router, seed, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Brokerage gateway API", long_about = None)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(long, default_value = "./config/gateway.json")]
    config: PathBuf,

    /// Listen address, overrides the configuration file
    #[arg(long)]
    listen: Option<SocketAddr>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Gateway API service");

    let mut config = if cli.config.exists() {
        GatewayConfig::load_from_file(&cli.config).await?
    } else {
        tracing::warn!(path = %cli.config.display(), "config file not found, using defaults");
        GatewayConfig::default()
    }
    .with_env_overrides();

    if let Some(listen) = cli.listen {
        config.listen_addr = listen;
    }
    if config.uses_dev_secret() {
        tracing::warn!("using the built-in development JWT secret; set {}", JWT_SECRET_ENV);
    }

    let state = AppState::new(&config);
    if config.seed_demo_data {
        seed::seed_demo_data(&state);
    }

    let app = create_router(state);

    // Bind and serve
    let listener = TcpListener::bind(config.listen_addr).await?;

    tracing::info!("Listening on {}", config.listen_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
