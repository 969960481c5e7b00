//! Configuration file handling.
//!
//! This module provides loading and saving of gamescan configuration
//! from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/gamescan/config.toml`
//! - macOS: `~/Library/Application Support/gamescan/config.toml`
//! - Windows: `%APPDATA%\gamescan\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! default_format = "table"
//! parallel = true
//! disabled_sources = ["installed_programs"]
//! min_main_executable_mb = 5
//!
//! [roots]
//! gog = ["/home/me/Games/wine/drive_c/GOG Games"]
//!
//! [usage]
//! max_files = 40
//! max_file_bytes = 1048576
//! max_depth = 3
//!
//! [ignore]
//! names = ["*Benchmark*", "Spacewar"]
//!
//! [[executable_rules]]
//! source = "ubisoft"
//! title_contains = "far cry"
//! prefix = "farcry"
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::executable::{default_rules, ExecutableRule};
use crate::model::Source;
use crate::usage::UsageLimits;

/// Application configuration.
///
/// This struct represents all configurable options for gamescan.
/// It can be loaded from a TOML file or created with default values.
///
/// # Example
///
/// ```no_run
/// use gamescan::Config;
///
/// // Load from file (or use defaults if file doesn't exist)
/// let config = Config::load().unwrap();
///
/// println!("Parallel scans: {}", config.parallel);
/// println!("Disabled: {:?}", config.disabled_sources);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default output format when no `--format` flag is provided.
    ///
    /// Valid values: "table", "json"
    /// Default: "table"
    pub default_format: String,

    /// Whether sources are scanned concurrently.
    ///
    /// Default: true
    pub parallel: bool,

    /// Sources that are never scanned.
    ///
    /// Default: none
    pub disabled_sources: Vec<Source>,

    /// Size floor, in MiB, for the "largest binary" executable strategy.
    ///
    /// Default: 5
    pub min_main_executable_mb: u64,

    /// Root overrides per source id (e.g. `steam`, `gog`).
    ///
    /// When set, these replace the source's own root lookup. Windows-only
    /// sources with an override also run on other hosts, which is how Wine
    /// and Proton prefixes are scanned.
    pub roots: BTreeMap<String, Vec<PathBuf>>,

    /// Bounds for the file-scanning usage extractors.
    pub usage: UsageLimits,

    /// Titles to drop from the catalog.
    pub ignore: IgnoreConfig,

    /// Naming rules appended to the built-in table.
    pub executable_rules: Vec<ExecutableRule>,
}

/// Configuration for hiding specific titles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    /// Title patterns to exclude, compared case-insensitively.
    ///
    /// Supports glob patterns (e.g., "*Benchmark*", "Steamworks*").
    pub names: Vec<String>,
}

impl IgnoreConfig {
    /// Check if a title should be ignored.
    pub fn should_ignore_name(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.names.iter().any(|pattern| {
            let pattern = pattern.to_lowercase();
            if pattern.contains('*') {
                glob_match(&pattern, &name)
            } else {
                pattern == name
            }
        })
    }
}

/// Simple glob matching (supports * as wildcard).
fn glob_match(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();

    if parts.len() == 1 {
        return pattern == text;
    }

    let mut remaining = text;

    // Check prefix (before first *)
    if !parts[0].is_empty() {
        if !remaining.starts_with(parts[0]) {
            return false;
        }
        remaining = &remaining[parts[0].len()..];
    }

    // Check suffix (after last *)
    let last_part = parts[parts.len() - 1];
    if !last_part.is_empty() {
        if !remaining.ends_with(last_part) {
            return false;
        }
        remaining = &remaining[..remaining.len() - last_part.len()];
    }

    // Check middle parts
    for part in &parts[1..parts.len() - 1] {
        if part.is_empty() {
            continue;
        }
        if let Some(pos) = remaining.find(part) {
            remaining = &remaining[pos + part.len()..];
        } else {
            return false;
        }
    }

    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_format: "table".to_string(),
            parallel: true,
            disabled_sources: Vec::new(),
            min_main_executable_mb: 5,
            roots: BTreeMap::new(),
            usage: UsageLimits::default(),
            ignore: IgnoreConfig::default(),
            executable_rules: Vec::new(),
        }
    }
}

impl Config {
    /// Loads configuration from the config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from an explicit path, with the same
    /// missing-file behaviour as [`load`](Self::load).
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves the configuration to the config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    ///
    /// # Example
    ///
    /// ```
    /// use gamescan::Config;
    ///
    /// let path = Config::config_path();
    /// println!("Config file: {}", path.display());
    /// ```
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gamescan")
            .join("config.toml")
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }

    pub fn is_source_enabled(&self, source: Source) -> bool {
        !self.disabled_sources.contains(&source)
    }

    /// Configured root overrides for a source; empty when none are set.
    pub fn roots_for(&self, source: Source) -> &[PathBuf] {
        self.roots
            .get(source.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The built-in naming rules followed by the configured ones.
    pub fn all_executable_rules(&self) -> Vec<ExecutableRule> {
        let mut rules = default_rules();
        rules.extend(self.executable_rules.iter().cloned());
        rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_match_exact() {
        assert!(glob_match("portal", "portal"));
        assert!(!glob_match("portal", "half-life"));
    }

    #[test]
    fn test_glob_match_prefix() {
        assert!(glob_match("steamworks*", "steamworks"));
        assert!(glob_match("steamworks*", "steamworks common redistributables"));
        assert!(!glob_match("steamworks*", "portal"));
    }

    #[test]
    fn test_glob_match_suffix() {
        assert!(glob_match("*demo", "hades demo"));
        assert!(!glob_match("*demo", "demo disc 2"));
    }

    #[test]
    fn test_glob_match_contains() {
        assert!(glob_match("*benchmark*", "benchmark"));
        assert!(glob_match("*benchmark*", "final fantasy benchmark tool"));
        assert!(!glob_match("*benchmark*", "bench"));
    }

    #[test]
    fn test_ignore_names_case_insensitive() {
        let config = IgnoreConfig {
            names: vec!["Spacewar".to_string(), "*BENCHMARK*".to_string()],
        };

        assert!(config.should_ignore_name("spacewar"));
        assert!(config.should_ignore_name("Final Fantasy XV Benchmark"));
        assert!(!config.should_ignore_name("Spacewar Deluxe"));
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.default_format, "table");
        assert!(config.parallel);
        assert!(config.disabled_sources.is_empty());
        assert_eq!(config.min_main_executable_mb, 5);
        assert_eq!(config.usage.max_files, 40);
        assert!(config.ignore.names.is_empty());
        assert!(Source::ALL.iter().all(|s| config.is_source_enabled(*s)));
    }

    #[test]
    fn test_load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
disabled_sources = ["installed_programs", "xbox"]

[roots]
gog = ["/wine/drive_c/GOG Games"]

[usage]
max_files = 10

[[executable_rules]]
source = "ubisoft"
title_contains = "far cry"
prefix = "farcry"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(!config.is_source_enabled(Source::Xbox));
        assert!(config.is_source_enabled(Source::Steam));
        assert_eq!(
            config.roots_for(Source::Gog),
            &[PathBuf::from("/wine/drive_c/GOG Games")]
        );
        assert!(config.roots_for(Source::Steam).is_empty());
        assert_eq!(config.usage.max_files, 10);
        assert_eq!(config.usage.max_depth, 3);
        assert_eq!(
            config.all_executable_rules().last(),
            Some(&ExecutableRule::new(Source::Ubisoft, "far cry", "farcry"))
        );
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load_from(Path::new("/no/such/gamescan.toml")).unwrap();
        assert!(config.parallel);
    }

    #[test]
    fn test_default_config_round_trips() {
        let text = Config::generate_default_config();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.default_format, "table");
    }
}
