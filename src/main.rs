use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use std::net::IpAddr;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::filter::LevelFilter;

/// Campus event registration demo server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on (overrides PORT)
    #[arg(long, short = 'p')]
    port: Option<u16>,

    /// Address to bind (overrides BIND_ADDR)
    #[arg(long)]
    bind: Option<IpAddr>,

    /// JSON event catalog to seed from (overrides EVENTS_PATH)
    #[arg(long)]
    events: Option<String>,

    /// One-time code lifetime in seconds (overrides OTP_TTL_SECS)
    #[arg(long, value_parser = clap::value_parser!(i64).range(config::server::CODE_TTL_RANGE))]
    otp_ttl: Option<i64>,

    /// Log level: error, warn, info, debug, trace (overrides LOG_LEVEL)
    #[arg(long)]
    log_level: Option<LevelFilter>,
}

mod config;
mod error;
mod logging;
mod managers;
mod models;
mod state;
mod web;

use config::{CatalogConfig, ServerConfig};
use managers::{
    create_shared_payment_manager, create_shared_registration_manager,
    create_shared_verification_manager, SharedVerificationManager,
};
use state::{create_shared_event_store, EventStore};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    let mut config = ServerConfig::from_env();
    apply_overrides(&mut config, &args);

    let level = args
        .log_level
        .or_else(|| std::env::var("LOG_LEVEL").ok().and_then(|l| l.parse().ok()))
        .unwrap_or(LevelFilter::INFO);

    // Log buffer for the operator log feed
    let log_buffer = logging::create_log_buffer(config.log_buffer_size);

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true),
        )
        .with(level)
        .with(logging::LogCaptureLayer::new(log_buffer.clone()))
        .init();

    let catalog = match &config.events_path {
        Some(path) => {
            info!("Loading event catalog from {}...", path);
            CatalogConfig::load_from_file(path)
                .with_context(|| format!("loading event catalog from {}", path))?
        }
        None => {
            info!("No EVENTS_PATH set, using built-in demo catalog");
            CatalogConfig::default()
        }
    };
    info!("Seeded {} events", catalog.event_count());

    let event_store = create_shared_event_store(EventStore::from_catalog(catalog));
    let verification_manager =
        create_shared_verification_manager(chrono::Duration::seconds(config.code_ttl_secs));
    let payment_manager = create_shared_payment_manager();
    let registration_manager = create_shared_registration_manager(
        event_store.clone(),
        verification_manager.clone(),
        payment_manager.clone(),
    );

    spawn_code_sweeper(
        verification_manager.clone(),
        Duration::from_secs(config.code_sweep_secs.max(1)),
    );

    let state = web::AppState {
        event_store,
        verification_manager,
        payment_manager,
        registration_manager,
        log_buffer,
    };

    info!(
        "One-time codes expire after {}s; data is kept in memory only",
        config.code_ttl_secs
    );
    web::start_web_server(&config, state, shutdown_signal()).await?;

    warn!("Server ended.");
    Ok(())
}

fn apply_overrides(config: &mut ServerConfig, args: &Args) {
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(events) = &args.events {
        config.events_path = Some(events.clone());
    }
    if let Some(ttl) = args.otp_ttl {
        config.code_ttl_secs = ttl;
    }
}

/// Periodically drop expired one-time codes
fn spawn_code_sweeper(verification_manager: SharedVerificationManager, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let removed = verification_manager.cleanup_expired();
            if removed > 0 {
                debug!("Swept {} expired verification codes", removed);
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
