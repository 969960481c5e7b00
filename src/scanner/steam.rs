use super::{finish, run_blocking, Candidate, ScanContext};
use crate::classifier::Verdict;
use crate::model::{InstallRecord, Platform, Source};
use crate::platform;
use crate::usage::SteamConfigStore;
use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use steamlocate::{App, Library, SteamDir};

/// `StateFlags` bit set once an app is fully installed.
const STATE_FULLY_INSTALLED: u64 = 4;

pub struct SteamScanner;

#[async_trait]
impl super::Scanner for SteamScanner {
    fn name(&self) -> &'static str {
        "Steam"
    }

    fn source(&self) -> Source {
        Source::Steam
    }

    fn supported_platforms(&self) -> &[Platform] {
        &[Platform::Linux, Platform::MacOS, Platform::Windows]
    }

    async fn scan(&self, ctx: &ScanContext) -> Result<Vec<InstallRecord>> {
        run_blocking(ctx, scan_steam).await
    }
}

fn scan_steam(ctx: &ScanContext) -> Vec<InstallRecord> {
    let roots = steam_roots(ctx);
    let Some(primary) = roots.first() else {
        tracing::debug!("Steam not found");
        return Vec::new();
    };

    let mut candidates = Vec::new();
    let mut seen_libraries: Vec<PathBuf> = Vec::new();
    for root in &roots {
        for library in libraries(root) {
            if ctx.cancel.is_cancelled() {
                break;
            }
            if seen_libraries.iter().any(|l| same_dir(l, library.path())) {
                continue;
            }
            seen_libraries.push(library.path().to_path_buf());
            candidates.extend(library_candidates(&library));
        }
    }

    let usage = SteamConfigStore::load(primary.path());
    finish(Source::Steam, candidates, Verdict::Accept, ctx, &usage)
}

/// Steam client roots: overrides, else the located client, else the
/// conventional directories.
fn steam_roots(ctx: &ScanContext) -> Vec<SteamDir> {
    let overrides = ctx.roots(Source::Steam);
    let paths: Vec<PathBuf> = if overrides.is_empty() {
        let mut paths = Vec::new();
        match SteamDir::locate() {
            Ok(dir) => paths.push(dir.path().to_path_buf()),
            Err(e) => tracing::debug!("steamlocate: {}", e),
        }
        paths.extend(platform::steam_dirs());
        paths
    } else {
        overrides.to_vec()
    };

    let mut roots: Vec<SteamDir> = Vec::new();
    for path in paths {
        if roots.iter().any(|r| same_dir(r.path(), &path)) {
            continue;
        }
        match SteamDir::from_dir(&path) {
            Ok(dir) => roots.push(dir),
            Err(e) => tracing::debug!("not a Steam root {:?}: {}", path, e),
        }
    }
    roots
}

fn same_dir(a: &Path, b: &Path) -> bool {
    crate::model::canonical_key(a) == crate::model::canonical_key(b)
}

/// Every library listed in `libraryfolders.vdf`, plus the root itself when
/// the list is missing, unreadable or leaves it out.
fn libraries(root: &SteamDir) -> Vec<Library> {
    let mut libraries: Vec<Library> = match root.libraries() {
        Ok(iter) => iter
            .filter_map(|library| match library {
                Ok(library) => Some(library),
                Err(e) => {
                    tracing::debug!("skipping Steam library: {}", e);
                    None
                }
            })
            .collect(),
        Err(e) => {
            tracing::debug!("no library list under {:?}: {}", root.path(), e);
            Vec::new()
        }
    };

    if !libraries.iter().any(|l| same_dir(l.path(), root.path())) {
        match Library::from_dir(root.path()) {
            Ok(library) => libraries.insert(0, library),
            Err(e) => tracing::debug!("no steamapps under {:?}: {}", root.path(), e),
        }
    }
    libraries
}

fn library_candidates(library: &Library) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = library
        .apps()
        .filter_map(|app| match app {
            Ok(app) => app_candidate(library, &app),
            Err(e) => {
                tracing::warn!("unreadable Steam app manifest in {:?}: {}", library.path(), e);
                None
            }
        })
        .collect();
    candidates.sort_by(|a, b| a.install_path.cmp(&b.install_path));
    candidates
}

fn app_candidate(library: &Library, app: &App) -> Option<Candidate> {
    if app
        .state_flags
        .as_ref()
        .is_some_and(|flags| flags.0 & STATE_FULLY_INSTALLED == 0)
    {
        tracing::debug!("Steam app {} not fully installed", app.app_id);
        return None;
    }

    let name = app.name.as_deref().unwrap_or(&app.install_dir);
    Some(
        Candidate::new(name, library.resolve_app_dir(app))
            .with_app_id(Some(app.app_id.to_string())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MemoryRegistry;
    use crate::scanner::tests::{make_game, test_context};
    use crate::scanner::Scanner;
    use std::fs;

    fn write_manifest(library: &Path, app_id: &str, name: &str, dir: &str) {
        let steamapps = library.join("steamapps");
        fs::create_dir_all(&steamapps).unwrap();
        fs::write(
            steamapps.join(format!("appmanifest_{}.acf", app_id)),
            format!(
                "\"AppState\"\n{{\n\t\"appid\"\t\t\"{app_id}\"\n\t\"name\"\t\t\"{name}\"\n\t\"StateFlags\"\t\t\"4\"\n\t\"installdir\"\t\t\"{dir}\"\n}}\n"
            ),
        )
        .unwrap();
        make_game(&steamapps.join("common").join(dir), &format!("{}.exe", dir));
    }

    #[tokio::test]
    async fn test_scans_root_and_extra_library() {
        let root = tempfile::tempdir().unwrap();
        let extra = tempfile::tempdir().unwrap();

        write_manifest(root.path(), "220", "Half-Life 2", "Half-Life 2");
        write_manifest(extra.path(), "620", "Portal 2", "Portal 2");
        write_manifest(extra.path(), "228980", "Steamworks Common Redistributables", "Steamworks Shared");
        fs::write(
            root.path().join("steamapps/libraryfolders.vdf"),
            format!(
                "\"libraryfolders\"\n{{\n\t\"0\"\n\t{{\n\t\t\"path\"\t\t\"{}\"\n\t}}\n\t\"1\"\n\t{{\n\t\t\"path\"\t\t\"{}\"\n\t}}\n}}\n",
                root.path().display().to_string().replace('\\', "\\\\"),
                extra.path().display().to_string().replace('\\', "\\\\"),
            ),
        )
        .unwrap();

        let ctx = test_context(Source::Steam, vec![root.path().to_path_buf()], MemoryRegistry::new());
        let mut records = SteamScanner.scan(&ctx).await.unwrap();
        records.sort_by(|a, b| a.name.cmp(&b.name));

        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Half-Life 2", "Portal 2"]);
        assert_eq!(records[0].app_id.as_deref(), Some("220"));
        assert_eq!(
            records[1].executable,
            Some(extra.path().join("steamapps/common/Portal 2/Portal 2.exe"))
        );
    }

    #[tokio::test]
    async fn test_skips_partial_installs_and_corrupt_manifests() {
        let root = tempfile::tempdir().unwrap();
        write_manifest(root.path(), "220", "Half-Life 2", "Half-Life 2");

        let steamapps = root.path().join("steamapps");
        fs::write(
            steamapps.join("appmanifest_400.acf"),
            "\"AppState\" { \"appid\" \"400\" \"name\" \"Portal\" \"StateFlags\" \"1026\" \"installdir\" \"Portal\" }",
        )
        .unwrap();
        make_game(&steamapps.join("common/Portal"), "portal.exe");
        fs::write(steamapps.join("appmanifest_500.acf"), "\"AppState\" {").unwrap();

        let ctx = test_context(Source::Steam, vec![root.path().to_path_buf()], MemoryRegistry::new());
        let records = SteamScanner.scan(&ctx).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Half-Life 2");
    }

    #[test]
    fn test_root_without_library_list_is_its_own_library() {
        let root = tempfile::tempdir().unwrap();
        write_manifest(root.path(), "220", "Half-Life 2", "Half-Life 2");

        let dir = SteamDir::from_dir(root.path()).unwrap();
        let libraries = libraries(&dir);
        assert_eq!(libraries.len(), 1);
        assert_eq!(libraries[0].path(), root.path());
        assert_eq!(libraries[0].app_ids(), &[220]);
    }

    #[tokio::test]
    async fn test_scanned_records_carry_playtime() {
        let root = tempfile::tempdir().unwrap();
        write_manifest(root.path(), "220", "Half-Life 2", "Half-Life 2");

        // SteamID64 76561197960265729 is account 1.
        fs::create_dir_all(root.path().join("config")).unwrap();
        fs::write(
            root.path().join("config/loginusers.vdf"),
            "\"users\" { \"76561197960265729\" { \"MostRecent\" \"1\" \"Timestamp\" \"1700000000\" } }",
        )
        .unwrap();
        let user_config = root.path().join("userdata/1/config");
        fs::create_dir_all(&user_config).unwrap();
        fs::write(
            user_config.join("localconfig.vdf"),
            "\"UserLocalConfigStore\" { \"Software\" { \"Valve\" { \"Steam\" { \"apps\" { \"220\" { \"LastPlayed\" \"1700000000\" \"Playtime\" \"90\" } } } } } }",
        )
        .unwrap();

        let ctx = test_context(Source::Steam, vec![root.path().to_path_buf()], MemoryRegistry::new());
        let records = SteamScanner.scan(&ctx).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].usage_hours, Some(1.5));
        assert_eq!(
            records[0].last_active,
            chrono::DateTime::from_timestamp(1_700_000_000, 0)
        );
    }
}
