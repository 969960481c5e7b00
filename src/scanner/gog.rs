use super::{finish, folder_candidates, publisher_candidates, run_blocking, Candidate, ScanContext};
use crate::classifier::Verdict;
use crate::model::{InstallRecord, Platform, Source};
use crate::platform;
use crate::registry::RegistryView;
use crate::usage::TextHeuristic;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const GAMES_KEYS: &[&str] = &[
    r"HKLM\SOFTWARE\WOW6432Node\GOG.com\Games",
    r"HKLM\SOFTWARE\GOG.com\Games",
];

pub struct GogScanner;

/// `goggame-<id>.info`, written next to every GOG install.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GogInfo {
    game_id: Option<String>,
    name: Option<String>,
    #[serde(default)]
    play_tasks: Vec<PlayTask>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayTask {
    #[serde(default)]
    is_primary: bool,
    path: Option<String>,
}

#[async_trait]
impl super::Scanner for GogScanner {
    fn name(&self) -> &'static str {
        "GOG"
    }

    fn source(&self) -> Source {
        Source::Gog
    }

    fn supported_platforms(&self) -> &[Platform] {
        &[Platform::Windows]
    }

    async fn scan(&self, ctx: &ScanContext) -> Result<Vec<InstallRecord>> {
        run_blocking(ctx, scan_gog).await
    }
}

fn scan_gog(ctx: &ScanContext) -> Vec<InstallRecord> {
    let overrides = ctx.roots(Source::Gog);

    let mut candidates = Vec::new();
    let libraries = if overrides.is_empty() {
        candidates.extend(registry_candidates(ctx.registry.as_ref()));
        platform::gog_library_dirs()
    } else {
        overrides.to_vec()
    };

    for library in &libraries {
        for folder in folder_candidates(library, &ctx.cancel) {
            candidates.push(with_info(folder));
        }
    }

    if overrides.is_empty() {
        candidates.extend(publisher_candidates(ctx.registry.as_ref(), "GOG"));
    }

    let usage = TextHeuristic::new(ctx.config.usage.clone());
    finish(Source::Gog, candidates, Verdict::Accept, ctx, &usage)
}

fn registry_candidates(registry: &dyn RegistryView) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for root in GAMES_KEYS {
        for id in registry.subkeys(root) {
            let key = format!(r"{}\{}", root, id);
            let (Some(name), Some(path)) = (
                registry.string_value(&key, "gameName"),
                registry.string_value(&key, "path"),
            ) else {
                continue;
            };

            let hint = registry.string_value(&key, "exe").map(PathBuf::from);
            let game_id = registry.string_value(&key, "gameID").unwrap_or(id);
            candidates.push(
                Candidate::new(name, path)
                    .with_executable_hint(hint)
                    .with_app_id(Some(game_id)),
            );
        }
    }

    candidates
}

/// Replaces a folder-named candidate's details with its `goggame-*.info`.
fn with_info(candidate: Candidate) -> Candidate {
    let Some(info_path) = find_info_file(&candidate.install_path) else {
        return candidate;
    };

    match read_info(&info_path) {
        Ok(info) => {
            let hint = info
                .play_tasks
                .iter()
                .find(|t| t.is_primary)
                .and_then(|t| t.path.as_deref())
                .map(|p| join_relative(&candidate.install_path, p));
            let name = info.name.unwrap_or_else(|| candidate.name.clone());
            Candidate::new(name, candidate.install_path)
                .with_executable_hint(hint)
                .with_app_id(info.game_id)
        }
        Err(e) => {
            tracing::warn!("{:#}", e);
            candidate
        }
    }
}

fn find_info_file(dir: &Path) -> Option<PathBuf> {
    std::fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .find(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("goggame-") && n.ends_with(".info"))
        })
}

fn read_info(path: &Path) -> Result<GogInfo> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
}

/// Joins a play-task path, which always uses `\` separators.
fn join_relative(base: &Path, relative: &str) -> PathBuf {
    relative
        .split(['\\', '/'])
        .filter(|part| !part.is_empty())
        .fold(base.to_path_buf(), |path, part| path.join(part))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MemoryRegistry;
    use crate::scanner::tests::{make_game, test_context};
    use crate::scanner::Scanner;
    use std::fs;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_library_folders_with_info_files() {
        let library = tempfile::tempdir().unwrap();
        let witcher = library.path().join("The Witcher");
        make_game(&witcher.join("System"), "witcher.exe");
        make_game(&witcher, "unins000.exe");
        fs::write(
            witcher.join("goggame-1207658924.info"),
            r#"{"gameId": "1207658924", "name": "The Witcher: Enhanced Edition",
                "playTasks": [{"isPrimary": true, "path": "System\\witcher.exe"}]}"#,
        )
        .unwrap();
        make_game(&library.path().join("Stardew Valley"), "Stardew Valley.exe");

        let ctx = test_context(Source::Gog, vec![library.path().to_path_buf()], MemoryRegistry::new());
        let mut records = GogScanner.scan(&ctx).await.unwrap();
        records.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Stardew Valley");
        assert_eq!(records[1].name, "The Witcher: Enhanced Edition");
        assert_eq!(records[1].app_id.as_deref(), Some("1207658924"));
        assert_eq!(records[1].executable, Some(witcher.join("System").join("witcher.exe")));
    }

    #[test]
    fn test_registry_candidates() {
        let registry = MemoryRegistry::new()
            .with(r"HKLM\SOFTWARE\WOW6432Node\GOG.com\Games\1495134320", "gameName", "Cyberpunk 2077")
            .with(r"HKLM\SOFTWARE\WOW6432Node\GOG.com\Games\1495134320", "path", r"D:\GOG\Cyberpunk 2077")
            .with(r"HKLM\SOFTWARE\WOW6432Node\GOG.com\Games\1495134320", "exe", r"D:\GOG\Cyberpunk 2077\bin\x64\Cyberpunk2077.exe")
            .with(r"HKLM\SOFTWARE\WOW6432Node\GOG.com\Games\999", "gameName", "No Path");

        let candidates = registry_candidates(&registry);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "Cyberpunk 2077");
        assert_eq!(candidates[0].app_id.as_deref(), Some("1495134320"));
        assert!(candidates[0].executable_hint.is_some());
    }

    #[tokio::test]
    async fn test_registry_and_publisher_entries_without_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let game = dir.path().join("Hades");
        make_game(&game, "Hades.exe");

        let registry = MemoryRegistry::new()
            .with(r"HKLM\SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall\Hades_is1", "DisplayName", "Hades")
            .with(r"HKLM\SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall\Hades_is1", "Publisher", "GOG.com")
            .with(
                r"HKLM\SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall\Hades_is1",
                "InstallLocation",
                game.to_string_lossy(),
            );
        let ctx = crate::scanner::ScanContext::new(crate::Config::default())
            .with_registry(Arc::new(registry));

        let records = scan_gog(&ctx);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Hades");
    }

    #[test]
    fn test_join_relative_normalizes_separators() {
        let joined = join_relative(Path::new("/games/witcher"), r"System\witcher.exe");
        assert_eq!(joined, Path::new("/games/witcher/System/witcher.exe"));
    }
}
