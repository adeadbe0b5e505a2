//! Exact open-path TSP solver
//!
//! Finds the shortest route that starts at stop 0 and visits every other stop
//! once, without returning. Bitmask dynamic programming, evaluated bottom-up
//! from the fully visited states towards the start state.
//!
//! Time is O(n² · 2ⁿ) and memory O(n · 2ⁿ), so the solver refuses instances
//! above [`SolverConfig::max_stops()`] instead of degrading to a heuristic.

mod config;

pub use config::{SolverConfig, DEFAULT_MAX_STOPS, HARD_MAX_STOPS};

use std::time::Instant;
use tracing::debug;

use crate::error::RouteError;
use crate::services::matrix::DistanceMatrix;
use crate::types::SolvedRoute;

/// Marker for "no successor" in the choice table
const NO_NEXT: u8 = u8::MAX;

/// Exact route solver
#[derive(Debug, Clone, Default)]
pub struct RouteSolver {
    config: SolverConfig,
}

impl RouteSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Fail fast when `stops` is above the configured bound
    pub fn check_scale(&self, stops: usize) -> Result<(), RouteError> {
        let max = self.config.max_stops().min(HARD_MAX_STOPS);
        if stops > max {
            return Err(RouteError::ScaleExceeded { stops, max });
        }
        Ok(())
    }

    /// Solve for the shortest open path starting at index 0.
    ///
    /// Up to two stops there is nothing to choose: the input order comes back
    /// with distance 0. Among equally short routes the one that picks the
    /// lowest index at the earliest differing step wins.
    pub fn solve(&self, matrix: &DistanceMatrix) -> Result<SolvedRoute, RouteError> {
        let n = matrix.size();
        self.check_scale(n)?;

        if n <= 2 {
            return Ok(SolvedRoute::identity(n));
        }

        let started_at = Instant::now();
        let order = shortest_open_path(matrix);
        let distance = matrix.path_length(&order);

        debug!(
            "Solved {} stops in {} ms: order={:?} distance={:.3} km",
            n,
            started_at.elapsed().as_millis(),
            order,
            distance
        );

        Ok(SolvedRoute { order, distance })
    }
}

/// Table slot for a state. Every reachable mask contains the start bit, so
/// it is dropped to halve the table.
#[inline]
fn slot(mask: usize, pos: usize, n: usize) -> usize {
    (mask >> 1) * n + pos
}

/// Masks containing the start stop, grouped by popcount
fn masks_by_popcount(n: usize) -> Vec<Vec<usize>> {
    let mut levels = vec![Vec::new(); n + 1];
    for mask in (1..1usize << n).step_by(2) {
        levels[mask.count_ones() as usize].push(mask);
    }
    levels
}

/// `remaining[slot(mask, pos)]` is the cheapest way to finish from `pos`
/// once `mask` is visited; `choice` holds the successor achieving it.
/// A state depends only on states one popcount level higher, so levels are
/// filled from fully visited down to the start state `({0}, 0)`.
fn shortest_open_path(matrix: &DistanceMatrix) -> Vec<usize> {
    let n = matrix.size();
    let full = (1usize << n) - 1;
    let states = (1usize << (n - 1)) * n;

    let mut remaining = vec![f64::INFINITY; states];
    let mut choice = vec![NO_NEXT; states];

    for pos in 0..n {
        remaining[slot(full, pos, n)] = 0.0;
    }

    debug!("Route DP over {} states for {} stops", states, n);

    let levels = masks_by_popcount(n);
    for level in (1..n).rev() {
        for &mask in &levels[level] {
            for pos in 0..n {
                if mask & (1 << pos) == 0 {
                    continue;
                }
                // only the start state sits on stop 0
                if pos == 0 && mask != 1 {
                    continue;
                }

                let mut best = f64::INFINITY;
                let mut best_next = NO_NEXT;
                for next in 0..n {
                    if mask & (1 << next) != 0 {
                        continue;
                    }
                    let visited = mask | (1 << next);
                    debug_assert!(visited & (1 << next) != 0);

                    let total = matrix.get(pos, next) + remaining[slot(visited, next, n)];
                    // strict `<` keeps the lowest index on ties; the first
                    // candidate is taken even when distances are NaN
                    if best_next == NO_NEXT || total < best {
                        best = total;
                        best_next = next as u8;
                    }
                }

                remaining[slot(mask, pos, n)] = best;
                choice[slot(mask, pos, n)] = best_next;
            }
        }
    }

    let mut order = Vec::with_capacity(n);
    let (mut mask, mut pos) = (1usize, 0usize);
    order.push(pos);
    while mask != full {
        let next = choice[slot(mask, pos, n)] as usize;
        assert!(
            next < n && mask & (1 << next) == 0,
            "route DP produced an invalid successor {} from stop {}",
            next,
            pos
        );
        mask |= 1 << next;
        pos = next;
        order.push(pos);
    }

    order
}
