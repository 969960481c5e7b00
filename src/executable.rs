//! Picking the launch target inside an install directory.
//!
//! No single heuristic works across vendors, so selection runs an ordered list
//! of cheap strategies and takes the first hit:
//!
//! 1. a file name containing one of the title's words,
//! 2. a source-specific naming rule ([`ExecutableRule`]),
//! 3. the largest executable above a size floor,
//! 4. the first executable that doesn't look like a helper, else the first one.

use crate::cancel::CancelToken;
use crate::model::Source;
use serde::{Deserialize, Serialize};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File name fragments of executables that are never the game itself.
const DENYLIST: &[&str] = &[
    "unins",
    "uninstall",
    "vcredist",
    "vc_redist",
    "dxsetup",
    "dxwebsetup",
    "directx",
    "dotnet",
    "physx",
    "oalinst",
    "redist",
    "prereq",
    "crashreport",
    "crashhandler",
    "crash_handler",
    "crashpad",
    "bugreport",
    "bugsplat",
    "easyanticheat",
    "battleye",
    "beservice",
    "cefprocess",
    "dxdiag",
];

/// Generic helper words, used by the last-resort strategy.
const UTILITY_WORDS: &[&str] = &[
    "launcher",
    "updater",
    "patcher",
    "installer",
    "config",
    "setup",
    "guide",
    "tool",
];

/// Franchise naming conventions that the title-word strategy misses.
pub const DEFAULT_RULES: &[(Source, &str, &str)] = &[
    (Source::Ea, "battlefield", "bf"),
    (Source::BattleNet, "call of duty", "cod"),
    (Source::BattleNet, "world of warcraft", "wow"),
    (Source::Steam, "counter-strike", "cs"),
    (Source::Ubisoft, "assassin's creed", "ac"),
];

/// A source-tagged naming convention: titles containing `title_contains`
/// ship a main binary whose name starts with `prefix`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutableRule {
    pub source: Source,
    pub title_contains: String,
    pub prefix: String,
}

impl ExecutableRule {
    pub fn new(source: Source, title_contains: &str, prefix: &str) -> Self {
        Self {
            source,
            title_contains: title_contains.to_lowercase(),
            prefix: prefix.to_lowercase(),
        }
    }

    fn applies_to(&self, title: &str) -> bool {
        title.to_lowercase().contains(&self.title_contains.to_lowercase())
    }

    fn matches(&self, exe: &ExecutableFile) -> bool {
        exe.stem.starts_with(&self.prefix.to_lowercase())
    }
}

/// The built-in rule table, to which configured rules are appended.
pub fn default_rules() -> Vec<ExecutableRule> {
    DEFAULT_RULES
        .iter()
        .map(|(source, title, prefix)| ExecutableRule::new(*source, title, prefix))
        .collect()
}

/// Tunables for [`select_executable`].
#[derive(Debug, Clone)]
pub struct SelectorOptions {
    /// Only rules tagged with this source are consulted.
    pub source: Source,
    pub rules: Vec<ExecutableRule>,
    /// Minimum size for the "largest binary" strategy.
    pub min_main_bytes: u64,
    pub max_depth: usize,
    pub max_files: usize,
    pub cancel: CancelToken,
}

impl SelectorOptions {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            rules: default_rules(),
            min_main_bytes: 5 * 1024 * 1024,
            max_depth: 6,
            max_files: 20_000,
            cancel: CancelToken::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct ExecutableFile {
    path: PathBuf,
    /// Lower-cased file stem.
    stem: String,
    size: u64,
    depth: usize,
}

/// Selects the most plausible launch target under `install_dir` for a title.
///
/// Returns `None` if the directory has no executables left after filtering.
pub fn select_executable(install_dir: &Path, title: &str, options: &SelectorOptions) -> Option<PathBuf> {
    let executables = list_executables(install_dir, options);
    if executables.is_empty() {
        return None;
    }

    by_title_words(&executables, title)
        .or_else(|| by_rules(&executables, title, options))
        .or_else(|| by_size(&executables, options.min_main_bytes))
        .or_else(|| by_elimination(&executables))
        .map(|exe| exe.path.clone())
}

fn list_executables(install_dir: &Path, options: &SelectorOptions) -> Vec<ExecutableFile> {
    let mut found = Vec::new();
    let mut visited = 0usize;

    for entry in WalkDir::new(install_dir)
        .max_depth(options.max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if options.cancel.is_cancelled() || visited >= options.max_files {
            break;
        }
        visited += 1;

        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if !is_executable(entry.path(), &metadata) {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().to_lowercase();
        if DENYLIST.iter().any(|d| file_name.contains(d)) {
            continue;
        }

        let stem = entry
            .path()
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        found.push(ExecutableFile {
            path: entry.path().to_path_buf(),
            stem,
            size: metadata.len(),
            depth: entry.depth(),
        });
    }

    found.sort_by(|a, b| {
        a.depth
            .cmp(&b.depth)
            .then_with(|| a.path.to_string_lossy().to_lowercase().cmp(&b.path.to_string_lossy().to_lowercase()))
    });
    found
}

fn is_executable(path: &Path, metadata: &Metadata) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase());

    match ext.as_deref() {
        Some("exe") => true,
        Some("x86_64") | Some("x86") | Some("appimage") | Some("sh") | None => has_exec_bit(metadata),
        _ => false,
    }
}

#[cfg(unix)]
fn has_exec_bit(metadata: &Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn has_exec_bit(_metadata: &Metadata) -> bool {
    false
}

/// Title words longer than two characters, stripped of punctuation.
fn title_tokens(title: &str) -> Vec<String> {
    title
        .split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|w| w.chars().count() > 2)
        .collect()
}

fn by_title_words<'a>(executables: &'a [ExecutableFile], title: &str) -> Option<&'a ExecutableFile> {
    let tokens = title_tokens(title);
    if tokens.is_empty() {
        return None;
    }
    executables
        .iter()
        .find(|exe| tokens.iter().any(|t| exe.stem.contains(t.as_str())))
}

fn by_rules<'a>(
    executables: &'a [ExecutableFile],
    title: &str,
    options: &SelectorOptions,
) -> Option<&'a ExecutableFile> {
    options
        .rules
        .iter()
        .filter(|rule| rule.source == options.source && rule.applies_to(title))
        .find_map(|rule| executables.iter().find(|exe| rule.matches(exe)))
}

fn by_size(executables: &[ExecutableFile], min_bytes: u64) -> Option<&ExecutableFile> {
    executables
        .iter()
        .filter(|exe| exe.size > min_bytes)
        .max_by_key(|exe| exe.size)
}

fn by_elimination(executables: &[ExecutableFile]) -> Option<&ExecutableFile> {
    executables
        .iter()
        .find(|exe| !UTILITY_WORDS.iter().any(|w| exe.stem.contains(w)))
        .or_else(|| executables.first())
}
