//! Lead Route Worker - route optimization for technician appointments
//!
//! Serves route optimization over NATS, or optimizes a single file of stops
//! from the command line.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use cli::{Cli, Command};
use lead_route_worker::config::Config;
use lead_route_worker::handlers;
use lead_route_worker::handlers::route::OptimizeService;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs directory - use LOGS_DIR env var or default to ../logs
    let logs_dir = std::env::var("LOGS_DIR")
        .unwrap_or_else(|_| "../logs".to_string());
    std::fs::create_dir_all(&logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender = RollingFileAppender::new(
        Rotation::DAILY,
        &logs_dir,
        "worker.log",
    );
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Console logs go to stderr so `optimize` output stays clean
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,lead_route_worker=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    info!("Configuration loaded");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Optimize { input, json, max_stops } => {
            let config = match max_stops {
                Some(max_stops) => config.with_max_stops(max_stops)?,
                None => config,
            };
            optimize_file(&config, &input, json).await
        }
    }
}

async fn serve(config: Config) -> Result<()> {
    info!("Starting Lead Route Worker...");

    // Connect to NATS (supports optional NATS_USER/NATS_PASSWORD auth).
    let nats_client = match (std::env::var("NATS_USER"), std::env::var("NATS_PASSWORD")) {
        (Ok(user), Ok(password)) if !user.is_empty() => {
            async_nats::ConnectOptions::new()
                .user_and_password(user, password)
                .connect(&config.nats_url)
                .await?
        }
        _ => async_nats::connect(&config.nats_url).await?,
    };
    info!("Connected to NATS at {}", config.nats_url);

    let handler_result = handlers::start_handlers(nats_client, &config).await;

    if let Err(e) = handler_result {
        error!("Handler error: {}", e);
        return Err(e);
    }

    Ok(())
}

async fn optimize_file(config: &Config, input: &str, json: bool) -> Result<()> {
    let stops = cli::read_stops(input)?;
    info!("Loaded {} stops from {}", stops.len(), input);

    let service = OptimizeService::from_config(config);
    let response = service
        .optimize(stops)
        .await
        .context("Route optimization failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print!("{}", response.summary);
        if let Some(link) = &response.maps_link {
            println!("\n{}", link);
        }
    }

    Ok(())
}
