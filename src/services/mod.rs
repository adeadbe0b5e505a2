//! Business logic services

pub mod geo;
pub mod maps;
pub mod matrix;
pub mod metrics;
pub mod optimizer;
pub mod presenter;
pub mod routing;
pub mod tsp;
