//! Best-effort usage statistics.
//!
//! Each source picks one [`UsageExtractor`]:
//!
//! - [`SteamConfigStore`] - Steam's per-user `localconfig.vdf`
//! - [`TextHeuristic`] - loose `key = value` fields in config, log and save files
//! - [`MtimeProxy`] - executable access time as a last-active stand-in
//!
//! Extractors never fail; a missing or unreadable store yields [`Usage::default`].

mod proxy;
mod steam;
mod text;
pub mod units;

pub use proxy::{last_active_proxy, MtimeProxy};
pub use steam::SteamConfigStore;
pub use text::TextHeuristic;

use crate::model::InstallRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What an extractor could learn about one install.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Usage {
    pub hours: Option<f64>,
    pub last_active: Option<DateTime<Utc>>,
}

impl Usage {
    pub fn is_empty(&self) -> bool {
        self.hours.is_none() && self.last_active.is_none()
    }

    /// Copies the known fields onto `record`.
    pub fn apply(self, record: &mut InstallRecord) {
        if self.hours.is_some() {
            record.usage_hours = self.hours;
        }
        if self.last_active.is_some() {
            record.last_active = self.last_active;
        }
    }
}

pub trait UsageExtractor: Send + Sync {
    fn extract(&self, record: &InstallRecord) -> Usage;
}

/// I/O bounds for the file-scanning extractors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageLimits {
    /// Maximum number of files read per install.
    pub max_files: usize,
    /// Files at or above this size are skipped.
    pub max_file_bytes: u64,
    /// Maximum directory depth below each search root.
    pub max_depth: usize,
}

impl Default for UsageLimits {
    fn default() -> Self {
        Self {
            max_files: 40,
            max_file_bytes: 1024 * 1024,
            max_depth: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Source;

    #[test]
    fn test_apply_keeps_unknown_fields() {
        let mut record = InstallRecord::new("Game", Source::Gog, "/games/game");
        record.usage_hours = Some(3.0);

        Usage {
            hours: None,
            last_active: DateTime::from_timestamp(1_700_000_000, 0),
        }
        .apply(&mut record);

        assert_eq!(record.usage_hours, Some(3.0));
        assert!(record.last_active.is_some());
        assert!(Usage::default().is_empty());
    }
}
