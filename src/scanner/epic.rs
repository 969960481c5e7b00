use super::{finish, run_blocking, Candidate, ScanContext};
use crate::classifier::Verdict;
use crate::model::{InstallRecord, Platform, Source};
use crate::platform;
use crate::usage::TextHeuristic;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub struct EpicScanner;

/// The fields we use from an Epic Games Launcher `.item` manifest.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EpicManifest {
    display_name: Option<String>,
    install_location: Option<String>,
    launch_executable: Option<String>,
    app_name: Option<String>,
    main_game_app_name: Option<String>,
    #[serde(rename = "bIsIncompleteInstall", default)]
    is_incomplete_install: bool,
}

impl EpicManifest {
    /// Add-ons carry the base game's app name in `MainGameAppName`.
    fn is_addon(&self) -> bool {
        match (&self.app_name, &self.main_game_app_name) {
            (Some(app), Some(main)) => !main.is_empty() && app != main,
            _ => false,
        }
    }
}

#[async_trait]
impl super::Scanner for EpicScanner {
    fn name(&self) -> &'static str {
        "Epic Games"
    }

    fn source(&self) -> Source {
        Source::Epic
    }

    fn supported_platforms(&self) -> &[Platform] {
        &[Platform::Windows, Platform::MacOS]
    }

    async fn scan(&self, ctx: &ScanContext) -> Result<Vec<InstallRecord>> {
        run_blocking(ctx, scan_epic).await
    }
}

fn scan_epic(ctx: &ScanContext) -> Vec<InstallRecord> {
    let dirs = manifest_dirs(ctx);
    if dirs.is_empty() {
        tracing::debug!("Epic Games Launcher manifests not found");
        return Vec::new();
    }

    let mut candidates = Vec::new();
    for dir in &dirs {
        for path in manifest_files(dir) {
            if ctx.cancel.is_cancelled() {
                break;
            }
            match read_manifest(&path) {
                Ok(manifest) => candidates.extend(manifest_candidate(manifest)),
                Err(e) => tracing::warn!("{:#}", e),
            }
        }
    }

    let usage = TextHeuristic::new(ctx.config.usage.clone());
    finish(Source::Epic, candidates, Verdict::Accept, ctx, &usage)
}

fn manifest_dirs(ctx: &ScanContext) -> Vec<PathBuf> {
    let overrides = ctx.roots(Source::Epic);
    if !overrides.is_empty() {
        return overrides.to_vec();
    }
    platform::epic_manifests_dir(ctx.registry.as_ref())
        .into_iter()
        .collect()
}

fn manifest_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("item"))
        })
        .collect();
    files.sort();
    files
}

fn read_manifest(path: &Path) -> Result<EpicManifest> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
}

fn manifest_candidate(manifest: EpicManifest) -> Option<Candidate> {
    if manifest.is_incomplete_install {
        tracing::debug!("skipping incomplete install {:?}", manifest.display_name);
        return None;
    }
    if manifest.is_addon() {
        tracing::debug!("skipping add-on {:?}", manifest.display_name);
        return None;
    }

    let location = PathBuf::from(manifest.install_location?);
    let hint = manifest
        .launch_executable
        .filter(|exe| !exe.trim().is_empty())
        .map(|exe| location.join(exe));
    let name = manifest.display_name.or_else(|| manifest.app_name.clone())?;

    Some(
        Candidate::new(name, location)
            .with_executable_hint(hint)
            .with_app_id(manifest.app_name),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MemoryRegistry;
    use crate::scanner::tests::{make_game, test_context};
    use crate::scanner::Scanner;
    use std::fs;

    fn write_item(manifests: &Path, file: &str, json: serde_json::Value) {
        fs::create_dir_all(manifests).unwrap();
        fs::write(manifests.join(file), json.to_string()).unwrap();
    }

    #[tokio::test]
    async fn test_reads_manifests_and_skips_addons() {
        let dir = tempfile::tempdir().unwrap();
        let manifests = dir.path().join("Manifests");
        let game = dir.path().join("Games").join("Fortnite");
        make_game(&game.join("Binaries"), "FortniteClient.exe");
        make_game(&game, "Other.exe");

        write_item(
            &manifests,
            "A.item",
            serde_json::json!({
                "DisplayName": "Fortnite",
                "InstallLocation": game.to_string_lossy(),
                "LaunchExecutable": "Binaries/FortniteClient.exe",
                "AppName": "Fortnite",
                "MainGameAppName": "Fortnite",
            }),
        );
        write_item(
            &manifests,
            "B.item",
            serde_json::json!({
                "DisplayName": "Some Expansion",
                "InstallLocation": game.join("dlc").to_string_lossy(),
                "AppName": "Expansion1",
                "MainGameAppName": "Fortnite",
            }),
        );
        write_item(
            &manifests,
            "C.item",
            serde_json::json!({
                "DisplayName": "Half Done",
                "InstallLocation": dir.path().join("Games").to_string_lossy(),
                "AppName": "HalfDone",
                "bIsIncompleteInstall": true,
            }),
        );
        fs::write(manifests.join("D.item"), "{ not json").unwrap();

        let ctx = test_context(Source::Epic, vec![manifests], MemoryRegistry::new());
        let records = EpicScanner.scan(&ctx).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Fortnite");
        assert_eq!(records[0].app_id.as_deref(), Some("Fortnite"));
        assert_eq!(
            records[0].executable,
            Some(game.join("Binaries/FortniteClient.exe"))
        );
    }

    #[test]
    fn test_missing_install_location_is_skipped() {
        let manifest: EpicManifest =
            serde_json::from_str(r#"{"DisplayName": "Ghost", "AppName": "Ghost"}"#).unwrap();
        assert!(manifest_candidate(manifest).is_none());
    }
}
