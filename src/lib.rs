//! Lead route worker - orders a technician's daily appointments into the
//! shortest route.
//!
//! The library half is the optimizer itself: distance matrix, exact solver,
//! metrics and presentation. The binary wires it to NATS.
//!
//! ```
//! use lead_route_worker::services::optimizer::optimize_route;
//! use lead_route_worker::services::tsp::RouteSolver;
//! use lead_route_worker::types::Stop;
//!
//! let stops = vec![
//!     Stop::new("office", 48.137, 11.575),
//!     Stop::new("far", 48.353, 11.786),
//!     Stop::new("near", 48.104, 11.601),
//! ];
//! let result = optimize_route(&stops, &RouteSolver::default()).unwrap();
//! assert_eq!(result.order, vec![0, 2, 1]);
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod services;
pub mod types;

pub use error::RouteError;
