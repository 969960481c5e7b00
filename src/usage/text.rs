use super::units::{normalize_labeled_hours, parse_timestamp};
use super::{last_active_proxy, Usage, UsageExtractor, UsageLimits};
use crate::model::InstallRecord;
use crate::platform;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

/// Extensions of files worth reading for usage fields.
const TEXT_EXTENSIONS: &[&str] = &[
    "ini", "cfg", "conf", "config", "json", "xml", "yaml", "yml", "txt", "log", "sav", "save",
    "vdf", "properties",
];

static HOURS_FIELD: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)["']?([a-z_]*(?:play_?time|time_?played|hours_?played|minutes_?played|seconds_?played|total_?time)[a-z_]*)["']?\s*[:=]\s*["']?(\d+(?:\.\d+)?)"#,
    )
    .ok()
});

static LAST_PLAYED_FIELD: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)["']?[a-z_]*(?:last_?played|last_?session|last_?launch(?:ed)?|last_?run)[a-z_]*["']?\s*[:=]\s*["']?([0-9][0-9TZ:./+\- ]*[0-9Z])"#,
    )
    .ok()
});

/// Scans small config, log and save files for time-played and last-played
/// fields, falling back to [`last_active_proxy`] when none turn up.
#[derive(Debug, Clone, Default)]
pub struct TextHeuristic {
    limits: UsageLimits,
    search_save_dirs: bool,
}

impl TextHeuristic {
    pub fn new(limits: UsageLimits) -> Self {
        Self {
            limits,
            search_save_dirs: true,
        }
    }

    /// Restricts the scan to the install directory.
    pub fn install_dir_only(mut self) -> Self {
        self.search_save_dirs = false;
        self
    }

    fn candidate_files(&self, record: &InstallRecord) -> Vec<PathBuf> {
        let mut roots = vec![record.install_path.clone()];
        if self.search_save_dirs {
            roots.extend(platform::save_dirs(&record.name));
        }

        let mut files = Vec::new();
        for root in roots {
            for entry in WalkDir::new(&root)
                .max_depth(self.limits.max_depth)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if files.len() >= self.limits.max_files {
                    return files;
                }
                if entry.file_type().is_file() && self.is_candidate(entry.path(), &entry) {
                    files.push(entry.into_path());
                }
            }
        }
        files
    }

    fn is_candidate(&self, path: &Path, entry: &walkdir::DirEntry) -> bool {
        let has_text_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| TEXT_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
        has_text_extension
            && entry
                .metadata()
                .is_ok_and(|m| m.len() < self.limits.max_file_bytes)
    }
}

impl UsageExtractor for TextHeuristic {
    fn extract(&self, record: &InstallRecord) -> Usage {
        let mut usage = Usage::default();

        for path in self.candidate_files(record) {
            let Ok(bytes) = std::fs::read(&path) else {
                continue;
            };
            let found = scan_text(&String::from_utf8_lossy(&bytes));
            usage.hours = max_option(usage.hours, found.hours, f64::max);
            usage.last_active = max_option(usage.last_active, found.last_active, std::cmp::max);
        }

        if usage.last_active.is_none() {
            usage.last_active = last_active_proxy(record);
        }
        usage
    }
}

/// Largest time-played and latest last-played values in one file.
pub fn scan_text(text: &str) -> Usage {
    let mut usage = Usage::default();

    if let Some(re) = HOURS_FIELD.as_ref() {
        for caps in re.captures_iter(text) {
            let Ok(raw) = caps[2].parse::<f64>() else {
                continue;
            };
            if raw <= 0.0 {
                continue;
            }
            let hours = normalize_labeled_hours(&caps[1], raw);
            usage.hours = max_option(usage.hours, Some(hours), f64::max);
        }
    }

    if let Some(re) = LAST_PLAYED_FIELD.as_ref() {
        for caps in re.captures_iter(text) {
            let ts = parse_timestamp(&caps[1]);
            usage.last_active = max_option(usage.last_active, ts, std::cmp::max);
        }
    }

    usage
}

fn max_option<T>(a: Option<T>, b: Option<T>, max: impl Fn(T, T) -> T) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(max(a, b)),
        (a, None) => a,
        (None, b) => b,
    }
}
