use super::{finish, folder_candidates, publisher_candidates, run_blocking, ScanContext};
use crate::classifier::Verdict;
use crate::model::{InstallRecord, Platform, Source};
use crate::platform;
use crate::usage::MtimeProxy;
use anyhow::Result;
use async_trait::async_trait;

pub struct EaScanner;

#[async_trait]
impl super::Scanner for EaScanner {
    fn name(&self) -> &'static str {
        "EA"
    }

    fn source(&self) -> Source {
        Source::Ea
    }

    fn supported_platforms(&self) -> &[Platform] {
        &[Platform::Windows]
    }

    async fn scan(&self, ctx: &ScanContext) -> Result<Vec<InstallRecord>> {
        run_blocking(ctx, scan_ea).await
    }
}

fn scan_ea(ctx: &ScanContext) -> Vec<InstallRecord> {
    let overrides = ctx.roots(Source::Ea);
    let libraries = if overrides.is_empty() {
        platform::ea_library_dirs()
    } else {
        overrides.to_vec()
    };

    let mut candidates = Vec::new();
    for library in &libraries {
        candidates.extend(folder_candidates(library, &ctx.cancel));
    }
    if overrides.is_empty() {
        candidates.extend(publisher_candidates(ctx.registry.as_ref(), "Electronic Arts"));
    }

    finish(Source::Ea, candidates, Verdict::Accept, ctx, &MtimeProxy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MemoryRegistry;
    use crate::scanner::tests::{make_game, test_context};
    use crate::scanner::{ScanContext, Scanner};
    use crate::Config;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_scans_override_library() {
        let library = tempfile::tempdir().unwrap();
        make_game(&library.path().join("Battlefield 1"), "bf1.exe");
        make_game(&library.path().join("EA app"), "EADesktop.exe");

        let ctx = test_context(Source::Ea, vec![library.path().to_path_buf()], MemoryRegistry::new());
        let records = EaScanner.scan(&ctx).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Battlefield 1");
        assert_eq!(
            records[0].executable,
            Some(library.path().join("Battlefield 1").join("bf1.exe"))
        );
    }

    #[test]
    fn test_publisher_cross_check() {
        let dir = tempfile::tempdir().unwrap();
        let game = dir.path().join("Apex");
        make_game(&game, "r5apex.exe");
        let other = dir.path().join("Editor");
        make_game(&other, "editor.exe");

        let uninstall = r"HKLM\SOFTWARE\WOW6432Node\Microsoft\Windows\CurrentVersion\Uninstall";
        let registry = MemoryRegistry::new()
            .with(&format!(r"{}\Apex", uninstall), "DisplayName", "Apex Legends")
            .with(&format!(r"{}\Apex", uninstall), "Publisher", "Electronic Arts")
            .with(&format!(r"{}\Apex", uninstall), "InstallLocation", game.to_string_lossy())
            .with(&format!(r"{}\Editor", uninstall), "DisplayName", "Text Editor")
            .with(&format!(r"{}\Editor", uninstall), "Publisher", "Someone Else")
            .with(&format!(r"{}\Editor", uninstall), "InstallLocation", other.to_string_lossy());

        let ctx = ScanContext::new(Config::default()).with_registry(Arc::new(registry));
        let records = scan_ea(&ctx);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Apex Legends");
    }
}
