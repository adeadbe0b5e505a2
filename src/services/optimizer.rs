//! Route optimization pipeline
//!
//! stops → distance matrix → exact solver → metrics → [`RouteResult`]

use tracing::{debug, info};

use crate::error::RouteError;
use crate::services::matrix::DistanceMatrix;
use crate::services::metrics::{round_km, RouteMetrics};
use crate::services::routing::{build_distance_matrix, DistanceSource};
use crate::services::tsp::RouteSolver;
use crate::types::{Coordinates, RouteResult, Stop};

/// Optimize the visiting order of `stops` using haversine distances.
///
/// The first stop is the fixed start. Fewer than two stops come back
/// unchanged with zero distances.
pub fn optimize_route(stops: &[Stop], solver: &RouteSolver) -> Result<RouteResult, RouteError> {
    if stops.len() < 2 {
        debug!("Nothing to optimize ({} stops)", stops.len());
        return Ok(RouteResult::unchanged(stops));
    }

    solver.check_scale(stops.len())?;
    let matrix = DistanceMatrix::from_stops(stops);
    solve_with_matrix(stops, &matrix, solver)
}

/// Same as [`optimize_route`] but distances come from `source`, queried with
/// up to `concurrency` lookups in flight.
pub async fn optimize_route_with(
    stops: &[Stop],
    solver: &RouteSolver,
    source: &dyn DistanceSource,
    concurrency: usize,
) -> Result<RouteResult, RouteError> {
    if stops.len() < 2 {
        debug!("Nothing to optimize ({} stops)", stops.len());
        return Ok(RouteResult::unchanged(stops));
    }

    // reject before paying for n² lookups
    solver.check_scale(stops.len())?;

    let points: Vec<Coordinates> = stops.iter().map(Stop::coordinates).collect();
    let matrix = build_distance_matrix(source, &points, concurrency)
        .await
        .map_err(|e| RouteError::Distance(format!("{:#}", e)))?;

    solve_with_matrix(stops, &matrix, solver)
}

/// Solve on a prebuilt matrix whose indices follow `stops`
pub fn solve_with_matrix(
    stops: &[Stop],
    matrix: &DistanceMatrix,
    solver: &RouteSolver,
) -> Result<RouteResult, RouteError> {
    if stops.len() < 2 {
        return Ok(RouteResult::unchanged(stops));
    }

    let solved = solver.solve(matrix)?;
    let metrics = RouteMetrics::compute(matrix, &solved.order);

    info!(
        "Route optimized: {} stops, {:.1} km (was {:.1} km, saved {}%)",
        stops.len(),
        metrics.optimized_distance,
        metrics.naive_distance,
        metrics.savings_percentage
    );

    Ok(RouteResult {
        optimized_route: solved.order.iter().map(|&i| stops[i].clone()).collect(),
        order: solved.order,
        total_distance: round_km(metrics.optimized_distance),
        original_distance: round_km(metrics.naive_distance),
        saved_distance: round_km(metrics.saved_distance),
        savings_percentage: metrics.savings_percentage,
    })
}
