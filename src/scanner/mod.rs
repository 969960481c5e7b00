//! Per-source game scanners.
//!
//! This module provides the [`Scanner`] trait and one implementation per
//! storefront or install mechanism. Every scanner turns its vendor data into
//! [`Candidate`]s and hands them to the shared [`finish`] pipeline
//! (classifier, executable selector, size, install date, usage).
//!
//! # Available Scanners
//!
//! | Scanner | Source | Platforms |
//! |---------|--------|-----------|
//! | [`SteamScanner`] | Steam libraries | All |
//! | [`EpicScanner`] | Epic Games Launcher manifests | Windows, macOS |
//! | [`GogScanner`] | GOG Galaxy / offline installers | Windows |
//! | [`UbisoftScanner`] | Ubisoft Connect | Windows |
//! | [`EaScanner`] | EA app / Origin | Windows |
//! | [`BattleNetScanner`] | Battle.net | Windows |
//! | [`XboxScanner`] | Xbox app (`XboxGames`) | Windows |
//! | [`InstalledProgramsScanner`] | Uninstall registry | Windows |
//!
//! Scanners for other platforms still run when a root override is configured.
//!
//! # Example
//!
//! ```no_run
//! use gamescan::scanner::{all_scanners, ScanContext, Scanner};
//! use gamescan::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let ctx = ScanContext::new(Config::default());
//!     for scanner in all_scanners() {
//!         if scanner.is_supported() {
//!             println!("Scanning {}...", scanner.name());
//!             let games = scanner.scan(&ctx).await?;
//!             println!("Found {} games", games.len());
//!         }
//!     }
//!     Ok(())
//! }
//! ```

mod battlenet;
mod ea;
mod epic;
mod gog;
mod programs;
mod steam;
mod ubisoft;
mod xbox;

pub use battlenet::BattleNetScanner;
pub use ea::EaScanner;
pub use epic::EpicScanner;
pub use gog::GogScanner;
pub use programs::InstalledProgramsScanner;
pub use steam::SteamScanner;
pub use ubisoft::UbisoftScanner;
pub use xbox::XboxScanner;

use crate::cancel::CancelToken;
use crate::classifier::{self, Verdict};
use crate::config::Config;
use crate::executable::{select_executable, SelectorOptions};
use crate::model::{canonical_key, InstallRecord, Platform, Source};
use crate::registry::{self, RegistryView};
use crate::size;
use crate::usage::UsageExtractor;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything a scan needs besides the scanner itself.
///
/// Cheap to clone; scanners move a clone onto the blocking pool.
#[derive(Clone)]
pub struct ScanContext {
    pub config: Arc<Config>,
    pub registry: Arc<dyn RegistryView>,
    pub cancel: CancelToken,
}

impl ScanContext {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            registry: registry::system_registry(),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_registry(mut self, registry: Arc<dyn RegistryView>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Configured root overrides for `source`.
    pub fn roots(&self, source: Source) -> &[PathBuf] {
        self.config.roots_for(source)
    }

    pub fn has_roots(&self, source: Source) -> bool {
        !self.roots(source).is_empty()
    }

    pub fn selector_options(&self, source: Source) -> SelectorOptions {
        SelectorOptions {
            rules: self.config.all_executable_rules(),
            min_main_bytes: self.config.min_main_executable_mb * 1024 * 1024,
            cancel: self.cancel.clone(),
            ..SelectorOptions::new(source)
        }
    }
}

/// A possible install, before classification and enrichment.
#[derive(Debug, Clone, Default)]
pub struct Candidate {
    pub name: String,
    pub install_path: PathBuf,
    pub publisher: Option<String>,
    /// Launch target named by the vendor's own metadata.
    pub executable_hint: Option<PathBuf>,
    /// Directory searched for a launch target instead of `install_path`.
    pub executable_root: Option<PathBuf>,
    pub app_id: Option<String>,
}

impl Candidate {
    pub fn new(name: impl Into<String>, install_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            install_path: install_path.into(),
            ..Self::default()
        }
    }

    pub fn with_publisher(mut self, publisher: Option<String>) -> Self {
        self.publisher = publisher;
        self
    }

    pub fn with_executable_hint(mut self, hint: Option<PathBuf>) -> Self {
        self.executable_hint = hint;
        self
    }

    pub fn with_executable_root(mut self, root: PathBuf) -> Self {
        self.executable_root = Some(root);
        self
    }

    pub fn with_app_id(mut self, app_id: Option<String>) -> Self {
        self.app_id = app_id;
        self
    }
}

/// Trait for discovering installed games from a specific source.
///
/// Implementors enumerate their vendor's metadata and return enriched
/// [`InstallRecord`]s. A source that isn't present on the machine is not an
/// error; it simply yields no records.
#[async_trait]
pub trait Scanner: Send + Sync {
    /// Returns the human-readable name of this scanner.
    fn name(&self) -> &'static str;

    /// Returns the source type this scanner handles.
    fn source(&self) -> Source;

    /// Returns the platforms this scanner supports.
    fn supported_platforms(&self) -> &[Platform];

    /// Returns true if this scanner is supported on the current platform.
    fn is_supported(&self) -> bool {
        let current = Platform::current();
        self.supported_platforms().contains(&current)
    }

    /// Whether a discovery run should invoke this scanner: enabled in the
    /// config, and either native to this platform or given root overrides.
    fn should_run(&self, ctx: &ScanContext) -> bool {
        ctx.config.is_source_enabled(self.source())
            && (self.is_supported() || ctx.has_roots(self.source()))
    }

    /// Scans for installed games and returns them.
    ///
    /// # Errors
    ///
    /// Returns an error only for unexpected failures (a panicked worker,
    /// for instance); missing launchers and unreadable manifests are skipped.
    async fn scan(&self, ctx: &ScanContext) -> Result<Vec<InstallRecord>>;
}

/// Runs a synchronous scan body on the blocking pool.
pub(crate) async fn run_blocking<F>(ctx: &ScanContext, body: F) -> Result<Vec<InstallRecord>>
where
    F: FnOnce(&ScanContext) -> Vec<InstallRecord> + Send + 'static,
{
    let ctx = ctx.clone();
    let records = tokio::task::spawn_blocking(move || body(&ctx)).await?;
    Ok(records)
}

/// The shared enrichment pipeline.
///
/// Candidates whose directory is missing, that the classifier rejects, that
/// the config ignores, or that repeat an earlier path are dropped. Survivors
/// get an executable, size, install date and usage statistics.
pub fn finish(
    source: Source,
    candidates: Vec<Candidate>,
    undecided: Verdict,
    ctx: &ScanContext,
    usage: &dyn UsageExtractor,
) -> Vec<InstallRecord> {
    let options = ctx.selector_options(source);
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for candidate in candidates {
        if ctx.cancel.is_cancelled() {
            tracing::debug!("{} scan cancelled", source.display_name());
            break;
        }

        if candidate.name.is_empty() || !candidate.install_path.is_dir() {
            tracing::debug!("skipping {:?}: no install directory", candidate.install_path);
            continue;
        }
        if !classifier::accept(&candidate.name, candidate.publisher.as_deref(), undecided) {
            tracing::debug!("classifier rejected '{}'", candidate.name);
            continue;
        }
        if ctx.config.ignore.should_ignore_name(&candidate.name) {
            tracing::debug!("ignoring '{}' per config", candidate.name);
            continue;
        }
        if !seen.insert(canonical_key(&candidate.install_path)) {
            continue;
        }

        records.push(enrich(source, candidate, &options, ctx, usage));
    }

    records
}

fn enrich(
    source: Source,
    candidate: Candidate,
    options: &SelectorOptions,
    ctx: &ScanContext,
    usage: &dyn UsageExtractor,
) -> InstallRecord {
    let search_root = candidate
        .executable_root
        .as_deref()
        .filter(|root| root.is_dir())
        .unwrap_or(&candidate.install_path);
    let executable = candidate
        .executable_hint
        .filter(|hint| hint.is_file())
        .or_else(|| select_executable(search_root, &candidate.name, options));

    let mut record = InstallRecord::new(candidate.name, source, candidate.install_path)
        .with_executable(executable);
    record.app_id = candidate.app_id;
    record.size_bytes = size::directory_size(&record.install_path, &ctx.cancel);
    record.install_date = size::install_date(&record.install_path);

    usage.extract(&record).apply(&mut record);
    record
}

/// Direct subdirectories of `dir` as candidates named after the folder.
pub(crate) fn folder_candidates(dir: &Path, cancel: &CancelToken) -> Vec<Candidate> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        tracing::debug!("cannot read library {:?}", dir);
        return Vec::new();
    };

    let mut candidates: Vec<Candidate> = entries
        .filter_map(|e| e.ok())
        .take_while(|_| !cancel.is_cancelled())
        .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
        .map(|e| Candidate::new(e.file_name().to_string_lossy(), e.path()))
        .collect();
    candidates.sort_by(|a, b| a.install_path.cmp(&b.install_path));
    candidates
}

/// Uninstall entries from `publisher` whose install location exists.
pub(crate) fn publisher_candidates(registry: &dyn RegistryView, publisher: &str) -> Vec<Candidate> {
    let needle = publisher.to_lowercase();

    registry::uninstall_entries(registry)
        .into_iter()
        .filter(|entry| {
            entry
                .publisher
                .as_deref()
                .is_some_and(|p| p.to_lowercase().contains(&needle))
        })
        .filter_map(|entry| {
            let location = PathBuf::from(entry.install_location?);
            Some(Candidate::new(entry.display_name, location).with_publisher(entry.publisher))
        })
        .collect()
}

/// Returns a list of all available scanners, in dedup priority order.
///
/// # Example
///
/// ```
/// use gamescan::scanner::all_scanners;
///
/// let scanners = all_scanners();
/// assert_eq!(scanners.len(), 8);
/// ```
pub fn all_scanners() -> Vec<Box<dyn Scanner>> {
    Source::ALL.into_iter().map(get_scanner).collect()
}

/// Returns the scanner for a specific source.
///
/// # Example
///
/// ```
/// use gamescan::{Source, scanner::get_scanner};
///
/// let scanner = get_scanner(Source::Gog);
/// assert_eq!(scanner.name(), "GOG");
/// ```
pub fn get_scanner(source: Source) -> Box<dyn Scanner> {
    match source {
        Source::Steam => Box::new(SteamScanner),
        Source::Epic => Box::new(EpicScanner),
        Source::Gog => Box::new(GogScanner),
        Source::Ubisoft => Box::new(UbisoftScanner),
        Source::Ea => Box::new(EaScanner),
        Source::BattleNet => Box::new(BattleNetScanner),
        Source::Xbox => Box::new(XboxScanner),
        Source::InstalledPrograms => Box::new(InstalledProgramsScanner),
    }
}
