//! Route quality metrics
//!
//! Compares the solved order against the order the appointments came in.

use crate::services::matrix::DistanceMatrix;

/// Raw (unrounded) route metrics in kilometers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteMetrics {
    pub optimized_distance: f64,
    pub naive_distance: f64,
    pub saved_distance: f64,
    pub savings_percentage: i64,
}

impl RouteMetrics {
    /// All zeros, used when there are fewer than two stops
    pub fn zero() -> Self {
        Self {
            optimized_distance: 0.0,
            naive_distance: 0.0,
            saved_distance: 0.0,
            savings_percentage: 0,
        }
    }

    /// Measure `order` against the input order `0, 1, ..., n-1`.
    ///
    /// `saved_distance` is negative if the input order was shorter.
    pub fn compute(matrix: &DistanceMatrix, order: &[usize]) -> Self {
        if matrix.size() < 2 {
            return Self::zero();
        }

        let optimized_distance = matrix.path_length(order);
        let naive_distance: f64 = (0..matrix.size() - 1)
            .map(|i| matrix.get(i, i + 1))
            .sum();
        let saved_distance = naive_distance - optimized_distance;

        Self {
            optimized_distance,
            naive_distance,
            saved_distance,
            savings_percentage: savings_percentage(saved_distance, naive_distance),
        }
    }
}

/// Whole-number percentage of `naive` that was saved; 0 for a zero baseline
pub fn savings_percentage(saved: f64, naive: f64) -> i64 {
    if naive > 0.0 {
        (saved / naive * 100.0).round() as i64
    } else {
        0
    }
}

/// Round kilometers to one decimal place for presentation
pub fn round_km(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
