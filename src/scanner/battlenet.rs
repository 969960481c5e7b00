use super::{
    finish, folder_candidates, publisher_candidates, run_blocking, Candidate, ScanContext,
};
use crate::classifier::Verdict;
use crate::model::{InstallRecord, Platform, Source};
use crate::platform;
use crate::usage::MtimeProxy;
use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Folder names Battle.net titles install under, directly in Program Files.
const KNOWN_TITLE_DIRS: &[&str] = &[
    "World of Warcraft",
    "Overwatch",
    "Diablo IV",
    "Diablo III",
    "Diablo II Resurrected",
    "Diablo Immortal",
    "Hearthstone",
    "Heroes of the Storm",
    "StarCraft II",
    "StarCraft",
    "Warcraft III",
    "Warcraft Rumble",
    "Call of Duty",
    "Call of Duty Modern Warfare",
    "Call of Duty Black Ops Cold War",
    "Crash Bandicoot 4",
    "Tony Hawk's Pro Skater 1 + 2",
];

pub struct BattleNetScanner;

#[async_trait]
impl super::Scanner for BattleNetScanner {
    fn name(&self) -> &'static str {
        "Battle.net"
    }

    fn source(&self) -> Source {
        Source::BattleNet
    }

    fn supported_platforms(&self) -> &[Platform] {
        &[Platform::Windows]
    }

    async fn scan(&self, ctx: &ScanContext) -> Result<Vec<InstallRecord>> {
        run_blocking(ctx, scan_battlenet).await
    }
}

fn scan_battlenet(ctx: &ScanContext) -> Vec<InstallRecord> {
    let overrides = ctx.roots(Source::BattleNet);

    let mut candidates = Vec::new();
    if overrides.is_empty() {
        for library in platform::battlenet_library_dirs() {
            candidates.extend(folder_candidates(&library, &ctx.cancel));
        }
        candidates.extend(known_title_candidates(&platform::program_files_dirs()));
        candidates.extend(publisher_candidates(ctx.registry.as_ref(), "Blizzard"));
    } else {
        for library in overrides {
            candidates.extend(folder_candidates(library, &ctx.cancel));
        }
    }

    finish(Source::BattleNet, candidates, Verdict::Accept, ctx, &MtimeProxy)
}

fn known_title_candidates(roots: &[PathBuf]) -> Vec<Candidate> {
    roots
        .iter()
        .flat_map(|root| {
            KNOWN_TITLE_DIRS
                .iter()
                .map(move |title| Candidate::new(*title, root.join(title)))
        })
        .filter(|c| c.install_path.is_dir())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MemoryRegistry;
    use crate::scanner::tests::{make_game, test_context};
    use crate::scanner::Scanner;

    #[test]
    fn test_known_titles_only() {
        let root = tempfile::tempdir().unwrap();
        make_game(&root.path().join("World of Warcraft"), "Wow.exe");
        make_game(&root.path().join("Notepad++"), "notepad++.exe");

        let candidates = known_title_candidates(&[root.path().to_path_buf()]);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "World of Warcraft");
    }

    #[tokio::test]
    async fn test_scans_override_library() {
        let library = tempfile::tempdir().unwrap();
        make_game(&library.path().join("Hearthstone"), "Hearthstone.exe");
        make_game(&library.path().join("Battle.net"), "Battle.net Launcher.exe");

        let ctx = test_context(
            Source::BattleNet,
            vec![library.path().to_path_buf()],
            MemoryRegistry::new(),
        );
        let records = BattleNetScanner.scan(&ctx).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Hearthstone");
        assert_eq!(records[0].source, Source::BattleNet);
    }
}
