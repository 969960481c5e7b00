use super::{Usage, UsageExtractor};
use crate::model::InstallRecord;
use crate::vdf::{self, Object};
use chrono::DateTime;
use std::path::{Path, PathBuf};

/// Offset between a SteamID64 and the 32-bit account id used in `userdata/`.
const STEAM_ID64_BASE: u64 = 76_561_197_960_265_728;

/// Play time recorded by the Steam client for the most recent local user.
///
/// The per-app table is read once on [`load`](Self::load) and looked up by
/// the record's Steam app id.
#[derive(Debug, Clone, Default)]
pub struct SteamConfigStore {
    apps: Option<Object>,
}

impl SteamConfigStore {
    pub fn load(steam_root: &Path) -> Self {
        let apps = localconfig_path(steam_root).and_then(|path| {
            let text = std::fs::read_to_string(&path).ok()?;
            match vdf::parse(&text) {
                Ok(root) => root
                    .path(&["UserLocalConfigStore", "Software", "Valve", "Steam", "apps"])
                    .cloned(),
                Err(e) => {
                    tracing::debug!("unreadable {:?}: {}", path, e);
                    None
                }
            }
        });

        Self { apps }
    }

    pub fn is_loaded(&self) -> bool {
        self.apps.is_some()
    }

    fn usage_for(&self, app_id: &str) -> Option<Usage> {
        let app = self.apps.as_ref()?.get_obj(app_id)?;

        let minutes = ["Playtime", "Playtime2wks"]
            .iter()
            .find_map(|key| {
                app.get_str(key)?
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|m| *m > 0.0)
            });

        let last_active = app
            .get_str("LastPlayed")
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|ts| *ts > 0)
            .and_then(|ts| DateTime::from_timestamp(ts, 0));

        Some(Usage {
            hours: minutes.map(|m| m / 60.0),
            last_active,
        })
    }
}

impl UsageExtractor for SteamConfigStore {
    fn extract(&self, record: &InstallRecord) -> Usage {
        record
            .app_id
            .as_deref()
            .and_then(|id| self.usage_for(id))
            .unwrap_or_default()
    }
}

/// `userdata/<account>/config/localconfig.vdf` for the most recent user.
fn localconfig_path(steam_root: &Path) -> Option<PathBuf> {
    let text = std::fs::read_to_string(steam_root.join("config").join("loginusers.vdf")).ok()?;
    let root = vdf::parse(&text).ok()?;
    let steam_id = most_recent_user(root.get_obj("users")?)?;
    let account = steam_id.checked_sub(STEAM_ID64_BASE)?;

    let path = steam_root
        .join("userdata")
        .join(account.to_string())
        .join("config")
        .join("localconfig.vdf");
    path.is_file().then_some(path)
}

/// The user flagged `MostRecent`, else the one with the newest `Timestamp`.
fn most_recent_user(users: &Object) -> Option<u64> {
    let mut newest: Option<(u64, u64)> = None;

    for (id, user) in users.objects() {
        let Ok(id) = id.parse::<u64>() else {
            continue;
        };
        if user.get_str("MostRecent") == Some("1") {
            return Some(id);
        }
        let timestamp = user
            .get_str("Timestamp")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0);
        if newest.is_none_or(|(_, ts)| timestamp > ts) {
            newest = Some((id, timestamp));
        }
    }

    newest.map(|(id, _)| id)
}
