//! Route solver configuration

/// Largest instance the exact solver will ever attempt.
///
/// Memory is `n * 2^(n-1)` states (about 90 MB at 20 stops).
pub const HARD_MAX_STOPS: usize = 20;

/// Default upper bound for a technician's day
pub const DEFAULT_MAX_STOPS: usize = 15;

/// Configuration for the route solver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    max_stops: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_stops: DEFAULT_MAX_STOPS,
        }
    }
}

impl SolverConfig {
    /// Create config with a custom bound, capped at [`HARD_MAX_STOPS`]
    pub fn new(max_stops: usize) -> Self {
        Self {
            max_stops: max_stops.min(HARD_MAX_STOPS),
        }
    }

    /// Requests with more stops than this are rejected before solving
    pub fn max_stops(&self) -> usize {
        self.max_stops
    }
}
