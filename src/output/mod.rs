mod cli;
mod json;

pub use cli::{print_cli_table, print_game_details};
pub use json::print_json;

use crate::model::{DiscoverResponse, GameInfo};
use anyhow::Result;

/// Output format for discovery results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    Table,
    /// JSON format for programmatic use
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use 'table' or 'json'", s)),
        }
    }
}

pub fn print_result(response: &DiscoverResponse, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_cli_table(response),
        OutputFormat::Json => print_json(response),
    }
}

pub fn print_games(games: &[GameInfo], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_game_details(games),
        OutputFormat::Json => print_json(&games),
    }
}

/// Format result to string for file output
pub fn format_result_to_string(response: &DiscoverResponse) -> Result<String> {
    Ok(serde_json::to_string_pretty(response)?)
}
