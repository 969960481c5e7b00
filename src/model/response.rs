use super::{Catalog, InstallRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Caller-facing view of an [`InstallRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameInfo {
    pub name: String,
    pub source: String,
    pub install_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_date: Option<String>,
    pub size_mb: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_hours: Option<f64>,
}

impl From<&InstallRecord> for GameInfo {
    fn from(record: &InstallRecord) -> Self {
        Self {
            name: record.name.clone(),
            source: record.source.display_name().to_string(),
            install_path: record.install_path.display().to_string(),
            executable: record.executable.as_ref().map(|p| p.display().to_string()),
            install_date: record.install_date.map(calendar_date),
            size_mb: record.size_mb(),
            last_active: record.last_active.map(calendar_date),
            usage_hours: record.usage_hours.map(round_hours),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverResponse {
    pub total: usize,
    pub by_source: BTreeMap<String, usize>,
    pub games: Vec<GameInfo>,
}

impl From<&Catalog> for DiscoverResponse {
    fn from(catalog: &Catalog) -> Self {
        Self {
            total: catalog.len(),
            by_source: catalog
                .by_source()
                .iter()
                .map(|(source, count)| (source.display_name().to_string(), *count))
                .collect(),
            games: catalog.records().iter().map(GameInfo::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchResponse {
    pub success: bool,
    pub message: String,
    pub executable: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl std::fmt::Display) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}

/// Formats a timestamp as a plain `yyyy-MM-dd` date.
pub fn calendar_date(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

fn round_hours(hours: f64) -> f64 {
    (hours * 10.0).round() / 10.0
}
