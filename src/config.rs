//! Configuration management

use std::str::FromStr;
use std::time::Duration;

use anyhow::{self, Context, Result};

use crate::services::maps::DEFAULT_MAPS_BASE_URL;
use crate::services::routing::DEFAULT_MATRIX_CONCURRENCY;
use crate::services::tsp::{DEFAULT_MAX_STOPS, HARD_MAX_STOPS};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// NATS server URL
    pub nats_url: String,

    /// Subject namespace, e.g. `leads` gives `leads.route.optimize`
    pub subject_prefix: String,

    /// Largest accepted route; bigger requests are rejected before solving
    pub max_stops: usize,

    /// Deadline for a single optimization
    pub solve_timeout: Duration,

    /// Distance lookups in flight while building a matrix
    pub matrix_concurrency: usize,

    /// Base URL for generated map links
    pub maps_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nats_url: "nats://localhost:4222".to_string(),
            subject_prefix: "leads".to_string(),
            max_stops: DEFAULT_MAX_STOPS,
            solve_timeout: Duration::from_millis(10_000),
            matrix_concurrency: DEFAULT_MATRIX_CONCURRENCY,
            maps_base_url: DEFAULT_MAPS_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let nats_url = lookup("NATS_URL").unwrap_or(defaults.nats_url);

        let subject_prefix = lookup("SUBJECT_PREFIX")
            .map(|p| p.trim_end_matches('.').to_string())
            .unwrap_or(defaults.subject_prefix);
        if subject_prefix.is_empty() {
            anyhow::bail!("SUBJECT_PREFIX must not be empty");
        }

        let max_stops =
            validate_max_stops(parse_var(&lookup, "MAX_STOPS")?.unwrap_or(defaults.max_stops))?;

        let solve_timeout = parse_var::<u64, _>(&lookup, "SOLVE_TIMEOUT_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.solve_timeout);

        let matrix_concurrency = parse_var(&lookup, "MATRIX_CONCURRENCY")?
            .unwrap_or(defaults.matrix_concurrency)
            .max(1);

        let maps_base_url = lookup("MAPS_BASE_URL").unwrap_or(defaults.maps_base_url);

        Ok(Self {
            nats_url,
            subject_prefix,
            max_stops,
            solve_timeout,
            matrix_concurrency,
            maps_base_url,
        })
    }

    /// Replace the stop bound, e.g. from `--max-stops`
    pub fn with_max_stops(mut self, max_stops: usize) -> Result<Self> {
        self.max_stops = validate_max_stops(max_stops)?;
        Ok(self)
    }

    /// Full subject name under the configured prefix
    pub fn subject(&self, name: &str) -> String {
        format!("{}.{}", self.subject_prefix, name)
    }
}

fn validate_max_stops(max_stops: usize) -> Result<usize> {
    if max_stops == 0 || max_stops > HARD_MAX_STOPS {
        anyhow::bail!(
            "MAX_STOPS must be between 1 and {} (got {})",
            HARD_MAX_STOPS,
            max_stops
        );
    }
    Ok(max_stops)
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("{} must be a number, got '{}'", key, raw))
        })
        .transpose()
}
