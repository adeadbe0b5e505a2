//! CLI argument parsing for the lead-route-worker binary.

use std::io::Read;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;

use lead_route_worker::types::{OptimizeRouteRequest, Stop};

#[derive(Parser)]
#[command(name = "lead-route-worker", about = "Route optimizer for technician appointments")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the worker server (default if no subcommand given)
    Serve,
    /// Optimize the stops in a JSON file and print the itinerary
    Optimize {
        /// JSON file with a list of stops (or `{"stops": [...]}`), `-` for stdin
        #[arg(long, short, default_value = "-")]
        input: String,
        /// Print the full JSON response instead of the itinerary text
        #[arg(long)]
        json: bool,
        /// Override MAX_STOPS for this run
        #[arg(long)]
        max_stops: Option<usize>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StopsInput {
    List(Vec<Stop>),
    Request(OptimizeRouteRequest),
}

/// Parse either a bare list of stops or an optimize request body
pub fn parse_stops(raw: &str) -> Result<Vec<Stop>> {
    let input: StopsInput = serde_json::from_str(raw).context("Invalid stops JSON")?;
    Ok(match input {
        StopsInput::List(stops) => stops,
        StopsInput::Request(request) => request.stops,
    })
}

/// Read stops from a file path or `-` for stdin
pub fn read_stops(input: &str) -> Result<Vec<Stop>> {
    let raw = if input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stops from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input))?
    };
    parse_stops(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_no_command_defaults_to_none() {
        let cli = Cli::parse_from(["lead-route-worker"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_serve_command_parses() {
        let cli = Cli::parse_from(["lead-route-worker", "serve"]);
        assert!(matches!(cli.command, Some(Command::Serve)));
    }

    #[test]
    fn test_cli_optimize_command_parses() {
        let cli = Cli::parse_from([
            "lead-route-worker", "optimize", "--input", "day.json", "--json", "--max-stops", "10",
        ]);
        match cli.command {
            Some(Command::Optimize { input, json, max_stops }) => {
                assert_eq!(input, "day.json");
                assert!(json);
                assert_eq!(max_stops, Some(10));
            }
            _ => panic!("expected optimize command"),
        }
    }

    #[test]
    fn test_cli_optimize_defaults_to_stdin() {
        let cli = Cli::parse_from(["lead-route-worker", "optimize"]);
        assert!(matches!(
            cli.command,
            Some(Command::Optimize { ref input, json: false, max_stops: None }) if input == "-"
        ));
    }

    #[test]
    fn test_parse_stops_list_and_request() {
        let list = r#"[{"id":1,"lat":48.1,"lng":11.5},{"id":2,"lat":48.2,"lng":11.6}]"#;
        assert_eq!(parse_stops(list).unwrap().len(), 2);

        let request = r#"{"stops":[{"id":"a","latitude":48.1,"longitude":11.5}]}"#;
        let stops = parse_stops(request).unwrap();
        assert_eq!(stops[0].id, "a");
    }

    #[test]
    fn test_parse_stops_rejects_garbage() {
        assert!(parse_stops("[1, 2]").is_err());
    }
}
