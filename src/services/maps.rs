//! Map service deep links
//!
//! Builds navigation URLs from coordinates. Nothing here talks to the
//! network; the links are opened by the technician's phone.

use crate::types::{Coordinates, RouteResult, Stop};

pub const DEFAULT_MAPS_BASE_URL: &str = "https://www.google.com/maps";

/// More points than this zoom the cluster view out one step further
const CLUSTER_DETAIL_LIMIT: usize = 10;
const CLUSTER_ZOOM_WIDE: u8 = 11;
const CLUSTER_ZOOM_CLOSE: u8 = 13;

#[derive(Debug, Clone)]
pub struct MapsLinkBuilder {
    base_url: String,
}

impl Default for MapsLinkBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MAPS_BASE_URL)
    }
}

impl MapsLinkBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Pin for a single location
    pub fn place_link(&self, point: &Coordinates) -> Option<String> {
        if !point.is_valid() {
            return None;
        }
        Some(format!("{}?q={},{}", self.base_url, point.lat, point.lng))
    }

    /// Directions between two locations
    pub fn directions_link(&self, from: &Coordinates, to: &Coordinates) -> Option<String> {
        self.multi_stop_link(&[*from, *to])
    }

    /// Directions through every point in order. `None` for an empty list or
    /// when any point is not a usable coordinate.
    pub fn multi_stop_link(&self, points: &[Coordinates]) -> Option<String> {
        if points.is_empty() || points.iter().any(|p| !p.is_valid()) {
            return None;
        }

        let path = points
            .iter()
            .map(|p| format!("{},{}", p.lat, p.lng))
            .collect::<Vec<_>>()
            .join("/");

        Some(format!("{}/dir/{}", self.base_url, path))
    }

    /// Overview centred on the mean of the valid points
    pub fn cluster_link(&self, points: &[Coordinates]) -> Option<String> {
        let valid: Vec<&Coordinates> = points.iter().filter(|p| p.is_valid()).collect();
        if valid.is_empty() {
            return None;
        }

        let count = valid.len() as f64;
        let center_lat = valid.iter().map(|p| p.lat).sum::<f64>() / count;
        let center_lng = valid.iter().map(|p| p.lng).sum::<f64>() / count;
        let zoom = if valid.len() > CLUSTER_DETAIL_LIMIT {
            CLUSTER_ZOOM_WIDE
        } else {
            CLUSTER_ZOOM_CLOSE
        };

        Some(format!(
            "{}/@{},{},{}z",
            self.base_url, center_lat, center_lng, zoom
        ))
    }

    /// Directions through an optimized route, in visiting order
    pub fn route_link(&self, result: &RouteResult) -> Option<String> {
        let points: Vec<Coordinates> = result
            .optimized_route
            .iter()
            .map(Stop::coordinates)
            .collect();
        self.multi_stop_link(&points)
    }
}
