//! Cross-platform path resolution.
//!
//! Conventional locations where launchers keep their data and games. Every
//! function only returns paths that exist, so callers can treat the result
//! as "roots worth enumerating".

use crate::model::Platform;
use crate::registry::RegistryView;
use std::path::PathBuf;

fn existing(path: PathBuf) -> Option<PathBuf> {
    if path.exists() {
        Some(path)
    } else {
        None
    }
}

/// Returns the conventional Steam client directories.
///
/// Platform-specific locations:
/// - Linux: `~/.steam/steam/`, `~/.local/share/Steam/`, the Flatpak data dir
/// - macOS: `~/Library/Application Support/Steam/`
/// - Windows: `C:\Program Files (x86)\Steam\`
pub fn steam_dirs() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    match Platform::current() {
        Platform::Linux => {
            if let Some(home) = dirs::home_dir() {
                candidates.push(home.join(".steam").join("steam"));
                candidates.push(
                    home.join(".var")
                        .join("app")
                        .join("com.valvesoftware.Steam")
                        .join(".local")
                        .join("share")
                        .join("Steam"),
                );
            }
            if let Some(data) = dirs::data_dir() {
                candidates.push(data.join("Steam"));
            }
        }
        Platform::MacOS => {
            if let Some(home) = dirs::home_dir() {
                candidates.push(
                    home.join("Library")
                        .join("Application Support")
                        .join("Steam"),
                );
            }
        }
        Platform::Windows => {
            candidates.extend(program_files_dirs().into_iter().map(|p| p.join("Steam")));
        }
    }

    candidates.into_iter().filter_map(existing).collect()
}

/// Returns the Epic Games Launcher manifest directory.
///
/// The registry's `AppDataPath` wins; otherwise:
/// - Windows: `C:\ProgramData\Epic\EpicGamesLauncher\Data\Manifests\`
/// - macOS: `~/Library/Application Support/Epic/EpicGamesLauncher/Data/Manifests/`
pub fn epic_manifests_dir(registry: &dyn RegistryView) -> Option<PathBuf> {
    const LAUNCHER_KEYS: &[&str] = &[
        r"HKLM\SOFTWARE\WOW6432Node\Epic Games\EpicGamesLauncher",
        r"HKLM\SOFTWARE\Epic Games\EpicGamesLauncher",
    ];

    for key in LAUNCHER_KEYS {
        if let Some(data) = registry.string_value(key, "AppDataPath") {
            if let Some(path) = existing(PathBuf::from(data).join("Manifests")) {
                return Some(path);
            }
        }
    }

    match Platform::current() {
        Platform::Windows => existing(
            program_data_dir()
                .join("Epic")
                .join("EpicGamesLauncher")
                .join("Data")
                .join("Manifests"),
        ),
        Platform::MacOS => {
            let home = dirs::home_dir()?;
            existing(
                home.join("Library")
                    .join("Application Support")
                    .join("Epic")
                    .join("EpicGamesLauncher")
                    .join("Data")
                    .join("Manifests"),
            )
        }
        Platform::Linux => None,
    }
}

/// Returns the conventional GOG game libraries.
///
/// Location: `C:\Program Files (x86)\GOG Galaxy\Games\` and `C:\GOG Games\`
/// on Windows; none elsewhere.
pub fn gog_library_dirs() -> Vec<PathBuf> {
    if Platform::current() != Platform::Windows {
        return Vec::new();
    }

    let mut candidates: Vec<PathBuf> = program_files_dirs()
        .into_iter()
        .map(|p| p.join("GOG Galaxy").join("Games"))
        .collect();
    candidates.push(PathBuf::from(r"C:\GOG Games"));

    candidates.into_iter().filter_map(existing).collect()
}

/// Returns the conventional Ubisoft Connect game library.
///
/// Location: `C:\Program Files (x86)\Ubisoft\Ubisoft Game Launcher\games\`
pub fn ubisoft_library_dirs() -> Vec<PathBuf> {
    program_files_dirs()
        .into_iter()
        .map(|p| p.join("Ubisoft").join("Ubisoft Game Launcher").join("games"))
        .filter_map(existing)
        .collect()
}

/// Returns the conventional EA app and Origin game libraries.
///
/// Location: `EA Games\` and `Origin Games\` under each Program Files dir.
pub fn ea_library_dirs() -> Vec<PathBuf> {
    program_files_dirs()
        .into_iter()
        .flat_map(|p| [p.join("EA Games"), p.join("Origin Games")])
        .filter_map(existing)
        .collect()
}

/// Returns the conventional Blizzard library folders.
///
/// Location: `Blizzard Entertainment\` under each Program Files dir. Most
/// Battle.net titles install directly into Program Files instead; see
/// [`program_files_dirs`].
pub fn battlenet_library_dirs() -> Vec<PathBuf> {
    program_files_dirs()
        .into_iter()
        .map(|p| p.join("Blizzard Entertainment"))
        .filter_map(existing)
        .collect()
}

/// Returns every `X:\XboxGames\` folder on the fixed drives.
pub fn xbox_library_dirs() -> Vec<PathBuf> {
    if Platform::current() != Platform::Windows {
        return Vec::new();
    }

    ('C'..='Z')
        .map(|drive| PathBuf::from(format!(r"{}:\XboxGames", drive)))
        .filter_map(existing)
        .collect()
}

/// Returns `Program Files` and `Program Files (x86)`.
///
/// Environment variables win over the defaults. Empty on non-Windows hosts.
pub fn program_files_dirs() -> Vec<PathBuf> {
    if Platform::current() != Platform::Windows {
        return Vec::new();
    }

    let mut dirs = Vec::new();
    for (var, fallback) in [
        ("ProgramFiles(x86)", r"C:\Program Files (x86)"),
        ("ProgramFiles", r"C:\Program Files"),
    ] {
        let path = std::env::var_os(var)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(fallback));
        if !dirs.contains(&path) {
            dirs.push(path);
        }
    }
    dirs
}

fn program_data_dir() -> PathBuf {
    std::env::var_os("ProgramData")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(r"C:\ProgramData"))
}

/// Returns the per-title save directories that exist.
///
/// Locations checked for a title `T`:
/// - `Documents/My Games/T/`, `Documents/T/`
/// - `~/Saved Games/T/`
/// - the roaming and local app-data dirs `T/`
pub fn save_dirs(title: &str) -> Vec<PathBuf> {
    let title = title.trim();
    if title.is_empty() || title.contains(['/', '\\']) {
        return Vec::new();
    }

    let mut candidates = Vec::new();
    if let Some(docs) = dirs::document_dir() {
        candidates.push(docs.join("My Games").join(title));
        candidates.push(docs.join(title));
    }
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join("Saved Games").join(title));
    }
    if let Some(data) = dirs::data_dir() {
        candidates.push(data.join(title));
    }
    if let Some(local) = dirs::data_local_dir() {
        candidates.push(local.join(title));
    }

    candidates.dedup();
    candidates.into_iter().filter_map(existing).collect()
}
