//! Route optimization message handler
//!
//! This is the service boundary around the exact solver: it validates
//! coordinates, refuses oversized days before any work is done and puts a
//! deadline on the rest.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::RouteError;
use crate::services::maps::MapsLinkBuilder;
use crate::services::optimizer::solve_with_matrix;
use crate::services::presenter::RoutePresenter;
use crate::services::routing::{build_distance_matrix, DistanceSource, HaversineSource};
use crate::services::tsp::{RouteSolver, SolverConfig};
use crate::types::{
    Coordinates, ErrorResponse, OptimizeRouteRequest, OptimizeRouteResponse, Request,
    RouteResult, Stop, SuccessResponse,
};

/// Why an optimization request was not answered with a route
#[derive(Debug, Error)]
pub enum OptimizeFailure {
    #[error("{} stop(s) have missing or out-of-range coordinates", .ids.len())]
    InvalidCoordinates { ids: Vec<String> },

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("optimization did not finish within {} ms", .0.as_millis())]
    Timeout(Duration),

    #[error("solver task failed: {0}")]
    Task(String),
}

impl OptimizeFailure {
    pub fn code(&self) -> &'static str {
        match self {
            OptimizeFailure::InvalidCoordinates { .. } => "INVALID_COORDINATES",
            OptimizeFailure::Route(e) => e.code(),
            OptimizeFailure::Timeout(_) => "TIMEOUT",
            OptimizeFailure::Task(_) => "OPTIMIZATION_FAILED",
        }
    }

    pub fn to_response(&self, request_id: Uuid) -> ErrorResponse {
        let response = ErrorResponse::new(request_id, self.code(), self.to_string());
        match self {
            OptimizeFailure::InvalidCoordinates { ids } => {
                response.with_details(json!({ "stopIds": ids }))
            }
            OptimizeFailure::Route(RouteError::ScaleExceeded { stops, max }) => {
                response.with_details(json!({ "stops": stops, "maxStops": max }))
            }
            _ => response,
        }
    }
}

/// Everything a route.optimize request needs, shared across messages
pub struct OptimizeService {
    solver: RouteSolver,
    presenter: RoutePresenter,
    source: Arc<dyn DistanceSource>,
    timeout: Duration,
    concurrency: usize,
}

impl OptimizeService {
    pub fn new(
        solver: RouteSolver,
        presenter: RoutePresenter,
        source: Arc<dyn DistanceSource>,
        timeout: Duration,
        concurrency: usize,
    ) -> Self {
        Self {
            solver,
            presenter,
            source,
            timeout,
            concurrency,
        }
    }

    /// Haversine distances with limits taken from the configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            RouteSolver::new(SolverConfig::new(config.max_stops)),
            RoutePresenter::new(MapsLinkBuilder::new(config.maps_base_url.clone())),
            Arc::new(HaversineSource::new()),
            config.solve_timeout,
            config.matrix_concurrency,
        )
    }

    /// Validate, optimize and render one day's stops
    pub async fn optimize(&self, stops: Vec<Stop>) -> Result<OptimizeRouteResponse, OptimizeFailure> {
        let invalid: Vec<String> = stops
            .iter()
            .filter(|s| !s.coordinates().is_valid())
            .map(|s| s.id.clone())
            .collect();
        if !invalid.is_empty() {
            warn!("Rejecting route with invalid coordinates for stops {:?}", invalid);
            return Err(OptimizeFailure::InvalidCoordinates { ids: invalid });
        }

        if let Err(e) = self.solver.check_scale(stops.len()) {
            warn!("Rejecting route: {}", e);
            return Err(e.into());
        }

        let work = run_optimization(
            stops,
            self.solver.clone(),
            Arc::clone(&self.source),
            self.concurrency,
        );

        // the blocking solver thread is not cancelled on timeout, only abandoned
        let result = match tokio::time::timeout(self.timeout, work).await {
            Ok(result) => result?,
            Err(_) => {
                warn!("Route optimization exceeded {:?}", self.timeout);
                return Err(OptimizeFailure::Timeout(self.timeout));
            }
        };

        Ok(self.presenter.present(result))
    }

    /// Turn a raw message payload into the serialized reply
    pub async fn respond(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let request: Request<OptimizeRouteRequest> = match serde_json::from_slice(payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse route.optimize request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                return Ok(serde_json::to_vec(&error)?);
            }
        };

        debug!(
            "route.optimize request {} with {} stops",
            request.id,
            request.payload.stops.len()
        );

        match self.optimize(request.payload.stops).await {
            Ok(response) => {
                let success = SuccessResponse::new(request.id, response);
                Ok(serde_json::to_vec(&success)?)
            }
            Err(failure) => Ok(serde_json::to_vec(&failure.to_response(request.id))?),
        }
    }
}

async fn run_optimization(
    stops: Vec<Stop>,
    solver: RouteSolver,
    source: Arc<dyn DistanceSource>,
    concurrency: usize,
) -> Result<RouteResult, OptimizeFailure> {
    if stops.len() < 2 {
        return Ok(RouteResult::unchanged(&stops));
    }

    let points: Vec<Coordinates> = stops.iter().map(Stop::coordinates).collect();
    let matrix = build_distance_matrix(source.as_ref(), &points, concurrency)
        .await
        .map_err(|e| RouteError::Distance(format!("{:#}", e)))?;

    let solved = tokio::task::spawn_blocking(move || solve_with_matrix(&stops, &matrix, &solver))
        .await
        .map_err(|e| OptimizeFailure::Task(e.to_string()))??;

    Ok(solved)
}

/// Reply to one message. Failures are logged and reported as `false`, they
/// never end the subscription.
async fn answer<F, Fut>(service: &OptimizeService, payload: &[u8], publish: F) -> bool
where
    F: FnOnce(Vec<u8>) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let bytes = match service.respond(payload).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Failed to encode route.optimize reply: {:#}", e);
            return false;
        }
    };

    if let Err(e) = publish(bytes).await {
        warn!("Failed to publish route.optimize reply: {:#}", e);
        return false;
    }
    true
}

/// Handle route.optimize messages
pub async fn handle_optimize(
    client: Client,
    mut subscriber: Subscriber,
    service: Arc<OptimizeService>,
) -> Result<()> {
    let client = &client;
    while let Some(msg) = subscriber.next().await {
        debug!("Received route.optimize message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let started_at = std::time::Instant::now();
        let answered = answer(&service, &msg.payload, |bytes| async move {
            client
                .publish(reply, bytes.into())
                .await
                .map_err(anyhow::Error::from)
        })
        .await;

        if answered {
            info!("route.optimize answered in {} ms", started_at.elapsed().as_millis());
        }
    }

    Ok(())
}
