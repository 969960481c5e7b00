use super::{finish, run_blocking, Candidate, ScanContext};
use crate::classifier::Verdict;
use crate::model::{InstallRecord, Platform, Source};
use crate::registry::{self, UninstallEntry};
use crate::usage::MtimeProxy;
use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Catch-all over the Uninstall registry.
///
/// Anything here might be a game or not, so only names the classifier
/// positively accepts are kept.
pub struct InstalledProgramsScanner;

#[async_trait]
impl super::Scanner for InstalledProgramsScanner {
    fn name(&self) -> &'static str {
        "Installed Programs"
    }

    fn source(&self) -> Source {
        Source::InstalledPrograms
    }

    fn supported_platforms(&self) -> &[Platform] {
        &[Platform::Windows]
    }

    async fn scan(&self, ctx: &ScanContext) -> Result<Vec<InstallRecord>> {
        run_blocking(ctx, scan_programs).await
    }
}

fn scan_programs(ctx: &ScanContext) -> Vec<InstallRecord> {
    let candidates: Vec<Candidate> = registry::uninstall_entries(ctx.registry.as_ref())
        .into_iter()
        .filter(|entry| !entry.system_component)
        .filter_map(entry_candidate)
        .collect();

    finish(Source::InstalledPrograms, candidates, Verdict::Reject, ctx, &MtimeProxy)
}

fn entry_candidate(entry: UninstallEntry) -> Option<Candidate> {
    let location = PathBuf::from(entry.install_location?);
    let hint = entry.display_icon.as_deref().and_then(icon_executable);

    Some(
        Candidate::new(entry.display_name, location)
            .with_publisher(entry.publisher)
            .with_executable_hint(hint),
    )
}

/// `DisplayIcon` is often `"C:\Games\X\x.exe",0`; keep it only if it names an exe.
fn icon_executable(icon: &str) -> Option<PathBuf> {
    let path = icon
        .rsplit_once(',')
        .filter(|(_, index)| index.trim().parse::<i32>().is_ok())
        .map_or(icon, |(path, _)| path)
        .trim()
        .trim_matches('"');

    path.to_ascii_lowercase()
        .ends_with(".exe")
        .then(|| PathBuf::from(path))
}
