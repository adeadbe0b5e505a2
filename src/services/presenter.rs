//! Itinerary rendering for the technician's chat messages

use std::fmt::Write;

use crate::services::maps::MapsLinkBuilder;
use crate::types::{OptimizeRouteResponse, RouteResult};

const NO_TIME: &str = "--:--";

/// Renders a [`RouteResult`] as chat text plus a directions link
#[derive(Debug, Clone, Default)]
pub struct RoutePresenter {
    maps: MapsLinkBuilder,
}

impl RoutePresenter {
    pub fn new(maps: MapsLinkBuilder) -> Self {
        Self { maps }
    }

    /// Numbered list of stops with total and saved distance.
    ///
    /// The savings line only appears when something was actually saved.
    pub fn summary(&self, result: &RouteResult) -> String {
        let mut summary = String::from("🗺️ Optimierte Route\n\n");
        let _ = writeln!(summary, "Gesamtstrecke: {} km", result.total_distance);

        if result.saved_distance > 0.0 {
            let _ = writeln!(
                summary,
                "Gespart: {} km ({}%)\n",
                result.saved_distance, result.savings_percentage
            );
        }

        summary.push_str("📍 Haltestellen:\n");
        for (index, stop) in result.optimized_route.iter().enumerate() {
            let time = stop
                .appointment_time
                .as_deref()
                .filter(|t| !t.is_empty())
                .unwrap_or(NO_TIME);
            let _ = writeln!(summary, "{}. {} - {}", index + 1, stop.label(), time);
        }

        summary
    }

    pub fn maps_link(&self, result: &RouteResult) -> Option<String> {
        self.maps.route_link(result)
    }

    /// Bundle the result with its rendered forms
    pub fn present(&self, result: RouteResult) -> OptimizeRouteResponse {
        OptimizeRouteResponse {
            summary: self.summary(&result),
            maps_link: self.maps_link(&result),
            result,
        }
    }
}
