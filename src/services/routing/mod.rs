//! Routing service for distance matrix calculations
//!
//! Haversine by default. Any other distance backend (a road routing engine,
//! a cached lookup table) plugs in through [`DistanceSource`].

use async_trait::async_trait;
use anyhow::Result;
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;

use crate::services::geo::haversine_distance;
use crate::services::matrix::DistanceMatrix;
use crate::types::Coordinates;

/// Default number of distance lookups in flight at once
pub const DEFAULT_MATRIX_CONCURRENCY: usize = 8;

/// Source of point-to-point distances in kilometers
#[async_trait]
pub trait DistanceSource: Send + Sync {
    /// Distance from `from` to `to`. Need not be symmetric.
    async fn distance(&self, from: &Coordinates, to: &Coordinates) -> Result<f64>;

    /// Get service name for logging
    fn name(&self) -> &str;
}

/// Great-circle distances, no I/O
#[derive(Debug, Clone, Copy, Default)]
pub struct HaversineSource;

impl HaversineSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DistanceSource for HaversineSource {
    async fn distance(&self, from: &Coordinates, to: &Coordinates) -> Result<f64> {
        Ok(haversine_distance(from, to))
    }

    fn name(&self) -> &str {
        "Haversine"
    }
}

/// Build the full matrix by querying `source` for every ordered pair.
///
/// Up to `concurrency` lookups run at once. Each lookup fills its own cell,
/// so completion order does not matter. The diagonal is zero without a lookup.
pub async fn build_distance_matrix(
    source: &dyn DistanceSource,
    points: &[Coordinates],
    concurrency: usize,
) -> Result<DistanceMatrix> {
    let n = points.len();
    let mut matrix = DistanceMatrix::new(n);
    if n <= 1 {
        return Ok(matrix);
    }

    debug!(
        "Building {}x{} distance matrix via {} (concurrency {})",
        n,
        n,
        source.name(),
        concurrency
    );

    let pairs = (0..n).flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j)));

    let cells: Vec<(usize, usize, f64)> = stream::iter(pairs)
        .map(|(i, j)| async move {
            let d = source.distance(&points[i], &points[j]).await?;
            Ok::<_, anyhow::Error>((i, j, d))
        })
        .buffer_unordered(concurrency.max(1))
        .try_collect()
        .await?;

    for (i, j, d) in cells {
        matrix.set(i, j, d);
    }

    Ok(matrix)
}
