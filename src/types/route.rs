//! Route types

use serde::{Deserialize, Deserializer, Serialize};

use super::Stop;

/// Visiting order produced by the solver.
///
/// `order` is a permutation of `0..n` that always starts with 0 (the fixed
/// starting stop). `distance` is the length of the open path in kilometers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolvedRoute {
    pub order: Vec<usize>,
    pub distance: f64,
}

impl SolvedRoute {
    /// Input order unchanged, zero distance (nothing to optimize)
    pub fn identity(n: usize) -> Self {
        Self {
            order: (0..n).collect(),
            distance: 0.0,
        }
    }
}

/// Result of route optimization.
///
/// Distances are in kilometers rounded to one decimal place; the percentage
/// is a whole number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResult {
    /// Stops in the optimized visiting order
    pub optimized_route: Vec<Stop>,
    /// Indices into the input list, in visiting order
    pub order: Vec<usize>,
    pub total_distance: f64,
    pub original_distance: f64,
    pub saved_distance: f64,
    pub savings_percentage: i64,
}

impl RouteResult {
    /// Result for inputs with fewer than two stops
    pub fn unchanged(stops: &[Stop]) -> Self {
        Self {
            optimized_route: stops.to_vec(),
            order: (0..stops.len()).collect(),
            total_distance: 0.0,
            original_distance: 0.0,
            saved_distance: 0.0,
            savings_percentage: 0,
        }
    }
}

/// Request to optimize a technician's day
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRouteRequest {
    /// Appointments in their current (naive) order; the first one is the start
    #[serde(default, deserialize_with = "null_as_empty")]
    pub stops: Vec<Stop>,
}

/// `null` reads as an empty list, same as a missing field
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Stop>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Stop>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Response from route optimization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRouteResponse {
    pub result: RouteResult,
    /// Human readable itinerary
    pub summary: String,
    /// Multi-stop directions link, absent when there are no stops
    #[serde(default)]
    pub maps_link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_result_serializes_camel_case() {
        let result = RouteResult::unchanged(&[Stop::new("1", 48.0, 11.0)]);
        let json = serde_json::to_string(&result).unwrap();

        assert!(json.contains("\"optimizedRoute\""));
        assert!(json.contains("\"totalDistance\":0.0"));
        assert!(json.contains("\"savingsPercentage\":0"));
    }

    #[test]
    fn test_unchanged_keeps_input() {
        let stops = vec![Stop::new("a", 1.0, 1.0)];
        let result = RouteResult::unchanged(&stops);

        assert_eq!(result.optimized_route, stops);
        assert_eq!(result.order, vec![0]);
        assert_eq!(result.saved_distance, 0.0);
    }

    #[test]
    fn test_request_defaults_to_no_stops() {
        let request: OptimizeRouteRequest = serde_json::from_str("{}").unwrap();
        assert!(request.stops.is_empty());

        let request: OptimizeRouteRequest = serde_json::from_str(r#"{"stops":null}"#).unwrap();
        assert!(request.stops.is_empty());

        assert!(serde_json::from_str::<OptimizeRouteRequest>(r#"{"stops":"none"}"#).is_err());
    }

    #[test]
    fn test_identity_route() {
        let route = SolvedRoute::identity(2);
        assert_eq!(route.order, vec![0, 1]);
        assert_eq!(route.distance, 0.0);
        assert!(SolvedRoute::identity(0).order.is_empty());
    }
}
