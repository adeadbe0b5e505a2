//! Error types for route optimization

use thiserror::Error;

/// Errors returned by the optimizer.
///
/// An empty stop list is not an error (the result is simply empty) and
/// malformed coordinates are not detected here: they propagate as NaN.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The exact solver is exponential; requests above the bound are refused
    #[error("route has {stops} stops, the exact solver accepts at most {max}")]
    ScaleExceeded { stops: usize, max: usize },

    /// A distance source could not produce a distance
    #[error("distance lookup failed: {0}")]
    Distance(String),
}

impl RouteError {
    /// Stable error code for bus replies
    pub const fn code(&self) -> &'static str {
        match self {
            RouteError::ScaleExceeded { .. } => "TOO_MANY_STOPS",
            RouteError::Distance(_) => "OPTIMIZATION_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_exceeded_message() {
        let err = RouteError::ScaleExceeded { stops: 25, max: 15 };
        assert_eq!(
            err.to_string(),
            "route has 25 stops, the exact solver accepts at most 15"
        );
        assert_eq!(err.code(), "TOO_MANY_STOPS");
    }

    #[test]
    fn test_distance_error_code() {
        let err = RouteError::Distance("timeout".into());
        assert_eq!(err.code(), "OPTIMIZATION_FAILED");
        assert!(err.to_string().contains("timeout"));
    }
}
