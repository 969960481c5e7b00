//! Read-only view of the hierarchical configuration registry.
//!
//! Adapters address keys with full paths such as
//! `HKLM\SOFTWARE\WOW6432Node\GOG.com\Games`. On Windows the view is backed by
//! the real registry; elsewhere (and in tests) by [`MemoryRegistry`].

use std::collections::BTreeMap;
use std::sync::Arc;

/// Uninstall key locations scanned for the generic installed-programs list.
pub const UNINSTALL_KEYS: &[&str] = &[
    r"HKLM\SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall",
    r"HKLM\SOFTWARE\WOW6432Node\Microsoft\Windows\CurrentVersion\Uninstall",
    r"HKCU\SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall",
];

pub trait RegistryView: Send + Sync {
    /// Names of the direct subkeys of `key`; empty if the key is missing.
    fn subkeys(&self, key: &str) -> Vec<String>;

    /// A string value; `None` if the key or value is missing or not a string.
    fn string_value(&self, key: &str, name: &str) -> Option<String>;

    /// A DWORD value.
    fn dword_value(&self, key: &str, name: &str) -> Option<u32> {
        self.string_value(key, name)?.trim().parse().ok()
    }
}

/// The registry for the current platform.
pub fn system_registry() -> Arc<dyn RegistryView> {
    #[cfg(windows)]
    {
        Arc::new(windows::WindowsRegistry)
    }
    #[cfg(not(windows))]
    {
        Arc::new(MemoryRegistry::default())
    }
}

/// One entry from an Uninstall key.
#[derive(Debug, Clone, PartialEq)]
pub struct UninstallEntry {
    pub key: String,
    pub display_name: String,
    pub publisher: Option<String>,
    pub install_location: Option<String>,
    pub display_icon: Option<String>,
    pub system_component: bool,
}

/// Reads every entry with a display name from the Uninstall keys.
pub fn uninstall_entries(registry: &dyn RegistryView) -> Vec<UninstallEntry> {
    let mut entries = Vec::new();

    for root in UNINSTALL_KEYS {
        for name in registry.subkeys(root) {
            if is_hotfix(&name) {
                continue;
            }
            let key = format!(r"{}\{}", root, name);
            let Some(display_name) = registry.string_value(&key, "DisplayName") else {
                continue;
            };

            entries.push(UninstallEntry {
                publisher: registry.string_value(&key, "Publisher"),
                install_location: registry
                    .string_value(&key, "InstallLocation")
                    .map(|s| s.trim().trim_matches('"').to_string())
                    .filter(|s| !s.is_empty()),
                display_icon: registry.string_value(&key, "DisplayIcon"),
                system_component: registry.dword_value(&key, "SystemComponent") == Some(1),
                display_name,
                key,
            });
        }
    }

    entries
}

/// Windows update entries such as `KB5012170`.
fn is_hotfix(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    upper
        .strip_prefix("KB")
        .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
}

/// In-memory registry; key and value names compare case-insensitively but
/// keep the case they were created with.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    keys: BTreeMap<String, MemoryKey>,
}

#[derive(Debug, Clone, Default)]
struct MemoryKey {
    path: String,
    values: BTreeMap<String, String>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value, creating the key (and its parents) as needed.
    pub fn set(&mut self, key: &str, name: &str, value: impl Into<String>) -> &mut Self {
        let mut path = String::new();
        for part in key.split('\\') {
            if !path.is_empty() {
                path.push('\\');
            }
            path.push_str(part);
            self.keys
                .entry(path.to_lowercase())
                .or_insert_with(|| MemoryKey {
                    path: path.clone(),
                    values: BTreeMap::new(),
                });
        }
        if let Some(entry) = self.keys.get_mut(&key.to_lowercase()) {
            entry.values.insert(name.to_lowercase(), value.into());
        }
        self
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, key: &str, name: &str, value: impl Into<String>) -> Self {
        self.set(key, name, value);
        self
    }
}

impl RegistryView for MemoryRegistry {
    fn subkeys(&self, key: &str) -> Vec<String> {
        let prefix = format!("{}\\", key.to_lowercase());
        self.keys
            .iter()
            .filter(|(lower, _)| {
                lower
                    .strip_prefix(&prefix)
                    .is_some_and(|rest| !rest.is_empty() && !rest.contains('\\'))
            })
            .filter_map(|(_, k)| k.path.rsplit('\\').next().map(str::to_string))
            .collect()
    }

    fn string_value(&self, key: &str, name: &str) -> Option<String> {
        self.keys
            .get(&key.to_lowercase())?
            .values
            .get(&name.to_lowercase())
            .cloned()
    }
}

#[cfg(windows)]
mod windows {
    use super::RegistryView;
    use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE};
    use winreg::RegKey;

    pub struct WindowsRegistry;

    fn open(key: &str) -> Option<RegKey> {
        let (hive, path) = key.split_once('\\')?;
        let root = match hive.to_ascii_uppercase().as_str() {
            "HKLM" | "HKEY_LOCAL_MACHINE" => RegKey::predef(HKEY_LOCAL_MACHINE),
            "HKCU" | "HKEY_CURRENT_USER" => RegKey::predef(HKEY_CURRENT_USER),
            _ => return None,
        };
        root.open_subkey(path).ok()
    }

    impl RegistryView for WindowsRegistry {
        fn subkeys(&self, key: &str) -> Vec<String> {
            open(key)
                .map(|k| k.enum_keys().flatten().collect())
                .unwrap_or_default()
        }

        fn string_value(&self, key: &str, name: &str) -> Option<String> {
            open(key)?.get_value::<String, _>(name).ok()
        }

        fn dword_value(&self, key: &str, name: &str) -> Option<u32> {
            open(key)?.get_value::<u32, _>(name).ok()
        }
    }
}
