use super::{Usage, UsageExtractor};
use crate::model::InstallRecord;
use chrono::{DateTime, Duration, Utc};

/// Uses the executable's last modification or access as the last-active time.
#[derive(Debug, Clone, Copy, Default)]
pub struct MtimeProxy;

impl UsageExtractor for MtimeProxy {
    fn extract(&self, record: &InstallRecord) -> Usage {
        Usage {
            hours: None,
            last_active: last_active_proxy(record),
        }
    }
}

/// `max(modified, accessed)` of the executable, if that is more than a day
/// after the install date. Anything closer is just the install itself.
pub fn last_active_proxy(record: &InstallRecord) -> Option<DateTime<Utc>> {
    let executable = record.executable.as_ref()?;
    let installed = record.install_date?;

    let metadata = std::fs::metadata(executable).ok()?;
    let latest = metadata
        .modified()
        .ok()
        .into_iter()
        .chain(metadata.accessed().ok())
        .max()?;
    let latest = DateTime::<Utc>::from(latest);

    (latest - installed > Duration::days(1)).then_some(latest)
}
