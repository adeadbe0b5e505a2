//! NATS message handlers

pub mod ping;
pub mod route;

use std::sync::Arc;
use anyhow::Result;
use async_nats::Client;
use tracing::{info, error};
use tokio::select;

use crate::config::Config;
use route::OptimizeService;

/// Start all message handlers
pub async fn start_handlers(client: Client, config: &Config) -> Result<()> {
    info!("Starting message handlers...");

    let ping_subject = config.subject("ping");
    let optimize_subject = config.subject("route.optimize");

    let ping_sub = client.subscribe(ping_subject.clone()).await?;
    let route_optimize_sub = client.subscribe(optimize_subject.clone()).await?;

    info!("Subscribed to {} and {}", ping_subject, optimize_subject);

    let service = Arc::new(OptimizeService::from_config(config));
    info!(
        "Route optimizer ready (max {} stops, timeout {:?})",
        config.max_stops, config.solve_timeout
    );

    let client_ping = client.clone();
    let client_route_optimize = client.clone();

    let ping_handle = tokio::spawn(async move {
        ping::handle_ping(client_ping, ping_sub).await
    });

    let route_optimize_handle = tokio::spawn(async move {
        route::handle_optimize(client_route_optimize, route_optimize_sub, service).await
    });

    select! {
        result = ping_handle => {
            error!("Ping handler finished: {:?}", result);
        }
        result = route_optimize_handle => {
            error!("Route optimize handler finished: {:?}", result);
        }
    }

    Ok(())
}
