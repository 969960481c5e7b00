use super::{finish, folder_candidates, run_blocking, Candidate, ScanContext};
use crate::classifier::Verdict;
use crate::model::{InstallRecord, Platform, Source};
use crate::platform;
use crate::usage::MtimeProxy;
use anyhow::Result;
use async_trait::async_trait;

pub struct XboxScanner;

#[async_trait]
impl super::Scanner for XboxScanner {
    fn name(&self) -> &'static str {
        "Xbox"
    }

    fn source(&self) -> Source {
        Source::Xbox
    }

    fn supported_platforms(&self) -> &[Platform] {
        &[Platform::Windows]
    }

    async fn scan(&self, ctx: &ScanContext) -> Result<Vec<InstallRecord>> {
        run_blocking(ctx, scan_xbox).await
    }
}

fn scan_xbox(ctx: &ScanContext) -> Vec<InstallRecord> {
    let overrides = ctx.roots(Source::Xbox);
    let libraries = if overrides.is_empty() {
        platform::xbox_library_dirs()
    } else {
        overrides.to_vec()
    };

    // Xbox app installs keep the game binaries under `Content\`.
    let candidates: Vec<Candidate> = libraries
        .iter()
        .flat_map(|library| folder_candidates(library, &ctx.cancel))
        .map(|candidate| {
            let content = candidate.install_path.join("Content");
            candidate.with_executable_root(content)
        })
        .collect();

    finish(Source::Xbox, candidates, Verdict::Accept, ctx, &MtimeProxy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MemoryRegistry;
    use crate::scanner::tests::{make_game, test_context};
    use crate::scanner::Scanner;

    #[tokio::test]
    async fn test_executable_found_under_content() {
        let library = tempfile::tempdir().unwrap();
        let game = library.path().join("Starfield");
        make_game(&game, "gamelaunchhelper.exe");
        make_game(&game.join("Content"), "Starfield.exe");

        let ctx = test_context(Source::Xbox, vec![library.path().to_path_buf()], MemoryRegistry::new());
        let records = XboxScanner.scan(&ctx).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].install_path, game);
        assert_eq!(records[0].executable, Some(game.join("Content").join("Starfield.exe")));
    }

    #[tokio::test]
    async fn test_plain_layout_without_content_dir() {
        let library = tempfile::tempdir().unwrap();
        let game = library.path().join("Halo Infinite");
        make_game(&game, "HaloInfinite.exe");

        let ctx = test_context(Source::Xbox, vec![library.path().to_path_buf()], MemoryRegistry::new());
        let records = XboxScanner.scan(&ctx).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].executable, Some(game.join("HaloInfinite.exe")));
    }
}
