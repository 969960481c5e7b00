use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The store or mechanism an install was discovered through.
///
/// Variant order is the dedup priority: when two sources report the same
/// install directory, the record from the earlier variant wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Steam,
    Epic,
    Gog,
    Ubisoft,
    Ea,
    BattleNet,
    Xbox,
    InstalledPrograms,
}

impl Source {
    pub const ALL: [Source; 8] = [
        Source::Steam,
        Source::Epic,
        Source::Gog,
        Source::Ubisoft,
        Source::Ea,
        Source::BattleNet,
        Source::Xbox,
        Source::InstalledPrograms,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Steam => "steam",
            Source::Epic => "epic",
            Source::Gog => "gog",
            Source::Ubisoft => "ubisoft",
            Source::Ea => "ea",
            Source::BattleNet => "battle_net",
            Source::Xbox => "xbox",
            Source::InstalledPrograms => "installed_programs",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Source::Steam => "Steam",
            Source::Epic => "Epic Games",
            Source::Gog => "GOG",
            Source::Ubisoft => "Ubisoft Connect",
            Source::Ea => "EA",
            Source::BattleNet => "Battle.net",
            Source::Xbox => "Xbox",
            Source::InstalledPrograms => "Installed Programs",
        }
    }

    /// Parses a source id, accepting a few common aliases.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "steam" => Some(Source::Steam),
            "epic" | "egs" => Some(Source::Epic),
            "gog" => Some(Source::Gog),
            "ubisoft" | "uplay" => Some(Source::Ubisoft),
            "ea" | "origin" => Some(Source::Ea),
            "battle_net" | "battlenet" | "battle.net" | "blizzard" => Some(Source::BattleNet),
            "xbox" => Some(Source::Xbox),
            "installed_programs" | "programs" | "registry" => Some(Source::InstalledPrograms),
            _ => None,
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    MacOS,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        #[cfg(target_os = "linux")]
        return Platform::Linux;
        #[cfg(target_os = "macos")]
        return Platform::MacOS;
        #[cfg(target_os = "windows")]
        return Platform::Windows;
    }
}

/// One detected installation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallRecord {
    pub name: String,
    pub source: Source,
    pub install_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_date: Option<DateTime<Utc>>,
    pub size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_hours: Option<f64>,
    /// Vendor-native id (Steam app id, Epic app name, GOG game id).
    #[serde(skip)]
    pub app_id: Option<String>,
}

impl InstallRecord {
    pub fn new(name: impl Into<String>, source: Source, install_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source,
            install_path: install_path.into(),
            executable: None,
            install_date: None,
            size_bytes: 0,
            last_active: None,
            usage_hours: None,
            app_id: None,
        }
    }

    pub fn with_executable(mut self, executable: Option<PathBuf>) -> Self {
        self.executable = executable;
        self
    }

    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    /// Dedup key for this record.
    pub fn key(&self) -> String {
        canonical_key(&self.install_path)
    }

    pub fn size_mb(&self) -> u64 {
        self.size_bytes / 1024 / 1024
    }

    /// Hours used, with an unknown value counted as zero.
    pub fn hours_or_zero(&self) -> f64 {
        self.usage_hours.unwrap_or(0.0)
    }

    pub fn is_launchable(&self) -> bool {
        self.executable.is_some()
    }
}

/// Canonical form of an install path: resolved, absolute, separator- and
/// case-normalized, without trailing separators.
pub fn canonical_key(path: &Path) -> String {
    let resolved = std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf());

    let text = resolved.to_string_lossy().replace('\\', "/");
    let text = text
        .strip_prefix("//?/UNC/")
        .map(|rest| format!("//{}", rest))
        .or_else(|| text.strip_prefix("//?/").map(str::to_string))
        .unwrap_or(text);

    let trimmed = text.trim_end_matches('/');
    let trimmed = if trimmed.is_empty() { "/" } else { trimmed };
    trimmed.to_lowercase()
}
