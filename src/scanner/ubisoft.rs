use super::{finish, folder_candidates, run_blocking, Candidate, ScanContext};
use crate::classifier::Verdict;
use crate::model::{InstallRecord, Platform, Source};
use crate::platform;
use crate::registry::RegistryView;
use crate::usage::MtimeProxy;
use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;

const LAUNCHER_KEYS: &[&str] = &[
    r"HKLM\SOFTWARE\WOW6432Node\Ubisoft\Launcher",
    r"HKLM\SOFTWARE\Ubisoft\Launcher",
];

pub struct UbisoftScanner;

#[async_trait]
impl super::Scanner for UbisoftScanner {
    fn name(&self) -> &'static str {
        "Ubisoft Connect"
    }

    fn source(&self) -> Source {
        Source::Ubisoft
    }

    fn supported_platforms(&self) -> &[Platform] {
        &[Platform::Windows]
    }

    async fn scan(&self, ctx: &ScanContext) -> Result<Vec<InstallRecord>> {
        run_blocking(ctx, scan_ubisoft).await
    }
}

fn scan_ubisoft(ctx: &ScanContext) -> Vec<InstallRecord> {
    let overrides = ctx.roots(Source::Ubisoft);

    let mut candidates = Vec::new();
    let libraries = if overrides.is_empty() {
        candidates.extend(install_candidates(ctx.registry.as_ref()));
        let mut libraries = launcher_libraries(ctx.registry.as_ref());
        libraries.extend(platform::ubisoft_library_dirs());
        libraries
    } else {
        overrides.to_vec()
    };

    for library in &libraries {
        candidates.extend(folder_candidates(library, &ctx.cancel));
    }

    finish(Source::Ubisoft, candidates, Verdict::Accept, ctx, &MtimeProxy)
}

/// `Launcher\Installs\<id>\InstallDir` entries, named after their folder.
fn install_candidates(registry: &dyn RegistryView) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for root in LAUNCHER_KEYS {
        let installs = format!(r"{}\Installs", root);
        for id in registry.subkeys(&installs) {
            let key = format!(r"{}\{}", installs, id);
            let Some(dir) = registry.string_value(&key, "InstallDir") else {
                continue;
            };
            let dir = dir.trim_end_matches(['/', '\\']).to_string();
            let Some(name) = dir.rsplit(['/', '\\']).next().map(str::to_string) else {
                continue;
            };
            candidates.push(Candidate::new(name, dir).with_app_id(Some(id)));
        }
    }

    candidates
}

/// The launcher's own `games` folder.
fn launcher_libraries(registry: &dyn RegistryView) -> Vec<PathBuf> {
    LAUNCHER_KEYS
        .iter()
        .filter_map(|key| registry.string_value(key, "InstallDir"))
        .map(|dir| PathBuf::from(dir).join("games"))
        .filter(|dir| dir.is_dir())
        .collect()
}
