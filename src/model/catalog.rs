use super::{InstallRecord, Source};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

/// The deduplicated, ordered result of one discovery run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    records: Vec<InstallRecord>,
    by_source: BTreeMap<Source, usize>,
}

impl Catalog {
    /// Builds a catalog from records given in source priority order.
    ///
    /// Keeps the first record seen for each canonical install path, then
    /// orders by usage hours (descending, unknown counted as zero) and name.
    pub fn from_records(records: Vec<InstallRecord>) -> Self {
        let mut seen = HashSet::new();
        let mut unique: Vec<InstallRecord> = records
            .into_iter()
            .filter(|record| seen.insert(record.key()))
            .collect();

        unique.sort_by(compare_records);

        let mut by_source = BTreeMap::new();
        for record in &unique {
            *by_source.entry(record.source).or_default() += 1;
        }

        Self {
            records: unique,
            by_source,
        }
    }

    pub fn records(&self) -> &[InstallRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<InstallRecord> {
        self.records
    }

    pub fn by_source(&self) -> &BTreeMap<Source, usize> {
        &self.by_source
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records whose name contains `pattern`, ignoring case.
    pub fn matching(&self, pattern: &str) -> Vec<InstallRecord> {
        let needle = pattern.to_lowercase();
        self.records
            .iter()
            .filter(|r| r.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// The record whose name equals `name`, ignoring case.
    pub fn find_exact(&self, name: &str) -> Option<&InstallRecord> {
        let needle = name.to_lowercase();
        self.records.iter().find(|r| r.name.to_lowercase() == needle)
    }
}

fn compare_records(a: &InstallRecord, b: &InstallRecord) -> Ordering {
    b.hours_or_zero()
        .total_cmp(&a.hours_or_zero())
        .then_with(|| a.name.cmp(&b.name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, source: Source, path: &str, hours: Option<f64>) -> InstallRecord {
        let mut r = InstallRecord::new(name, source, path);
        r.usage_hours = hours;
        r
    }

    #[test]
    fn test_dedup_keeps_first_record_per_path() {
        let catalog = Catalog::from_records(vec![
            record("Portal", Source::Steam, "/games/Portal", Some(3.0)),
            record("PORTAL (registry)", Source::InstalledPrograms, "/GAMES/portal/", None),
            record("Celeste", Source::Epic, "/games/Celeste", None),
        ]);

        assert_eq!(catalog.len(), 2);
        let portal = catalog.find_exact("portal").unwrap();
        assert_eq!(portal.source, Source::Steam);
        assert_eq!(catalog.by_source().get(&Source::InstalledPrograms), None);
        assert_eq!(catalog.by_source().get(&Source::Steam), Some(&1));
        assert_eq!(catalog.by_source().get(&Source::Epic), Some(&1));
    }

    #[test]
    fn test_ordering_by_hours_then_name() {
        let catalog = Catalog::from_records(vec![
            record("b", Source::Steam, "/g/1", None),
            record("a", Source::Steam, "/g/2", Some(0.0)),
            record("Zed", Source::Steam, "/g/3", Some(12.5)),
            record("Alpha", Source::Gog, "/g/4", Some(12.5)),
            record("mid", Source::Epic, "/g/5", Some(1.0)),
        ]);

        let names: Vec<_> = catalog.records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Zed", "mid", "a", "b"]);

        for pair in catalog.records().windows(2) {
            let (x, y) = (&pair[0], &pair[1]);
            assert!(x.hours_or_zero() >= y.hours_or_zero());
            if x.hours_or_zero() == y.hours_or_zero() {
                assert!(x.name <= y.name);
            }
        }
    }

    #[test]
    fn test_matching_is_case_insensitive_substring() {
        let catalog = Catalog::from_records(vec![
            record("Half-Life 2", Source::Steam, "/g/hl2", None),
            record("Half-Life: Alyx", Source::Steam, "/g/alyx", None),
            record("Portal", Source::Steam, "/g/portal", None),
        ]);

        assert_eq!(catalog.matching("half-life").len(), 2);
        assert_eq!(catalog.matching("PORT").len(), 1);
        assert!(catalog.matching("doom").is_empty());
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::from_records(Vec::new());
        assert!(catalog.is_empty());
        assert!(catalog.by_source().is_empty());
    }
}
