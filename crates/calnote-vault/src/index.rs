//! Date-UID index over the periodic notes of one granularity.
//!
//! The index is a snapshot: [`NoteIndex::build`] scans the configured
//! folder and parses every basename with the configured format. It is
//! never patched in place; callers rebuild it when the vault changes.

use std::collections::BTreeMap;

use calnote_core::error::VaultError;
use calnote_core::format::parse_date;
use calnote_core::{Granularity, Locale, Period, PeriodicNoteSettings};

use crate::{NoteFile, Vault};

/// Existing notes of one granularity keyed by date-UID.
#[derive(Debug, Clone)]
pub struct NoteIndex {
    granularity: Granularity,
    notes: BTreeMap<String, NoteFile>,
}

impl NoteIndex {
    /// An index with no notes.
    #[must_use]
    pub fn empty(granularity: Granularity) -> Self {
        Self {
            granularity,
            notes: BTreeMap::new(),
        }
    }

    /// Scan `settings.folder` and index every note whose basename parses
    /// with the format. Files that do not parse are skipped; if two files
    /// map to the same period, the first in path order wins. Formats
    /// without a year place notes in `default_year`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Io`] if the folder cannot be listed.
    pub fn build(
        vault: &dyn Vault,
        granularity: Granularity,
        settings: &PeriodicNoteSettings,
        locale: &Locale,
        default_year: i32,
    ) -> Result<Self, VaultError> {
        let format = settings.basename_format();
        let mut notes: BTreeMap<String, NoteFile> = BTreeMap::new();
        let mut skipped = 0usize;

        for note in vault.list_markdown(&settings.folder)? {
            let Ok(date) = parse_date(&note.basename, format, locale, default_year) else {
                skipped += 1;
                continue;
            };
            let uid = Period::containing(date, granularity, locale).date_uid();
            if let Some(existing) = notes.get(&uid) {
                tracing::debug!(
                    uid,
                    kept = %existing.path,
                    ignored = %note.path,
                    "duplicate periodic note"
                );
                continue;
            }
            notes.insert(uid, note);
        }

        tracing::debug!(
            granularity = %granularity,
            indexed = notes.len(),
            skipped,
            "built note index"
        );
        Ok(Self { granularity, notes })
    }

    #[must_use]
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    #[must_use]
    pub fn get(&self, period: &Period) -> Option<&NoteFile> {
        self.notes.get(&period.date_uid())
    }

    #[must_use]
    pub fn get_uid(&self, uid: &str) -> Option<&NoteFile> {
        self.notes.get(uid)
    }

    #[must_use]
    pub fn contains(&self, period: &Period) -> bool {
        self.get(period).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Entries in date-UID order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NoteFile)> {
        self.notes.iter().map(|(uid, note)| (uid.as_str(), note))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FsVault;
    use chrono::NaiveDate;
    use std::fs;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn touch(root: &std::path::Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn indexes_daily_notes_recursively() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "daily/2026-01-30.md");
        touch(dir.path(), "daily/archive/2025-12-31.md");
        touch(dir.path(), "daily/meeting notes.md");
        touch(dir.path(), "other/2026-01-29.md");
        let vault = FsVault::open(dir.path()).unwrap();

        let settings = PeriodicNoteSettings {
            folder: "daily".to_string(),
            ..PeriodicNoteSettings::defaults_for(Granularity::Day)
        };
        let index =
            NoteIndex::build(&vault, Granularity::Day, &settings, &Locale::EN, 2026).unwrap();

        assert_eq!(index.len(), 2);
        let en = Locale::EN;
        let jan30 = Period::containing(ymd(2026, 1, 30), Granularity::Day, &en);
        assert_eq!(index.get(&jan30).unwrap().path.as_str(), "daily/2026-01-30.md");
        assert!(index.get_uid("day-2025-12-31").is_some());
        assert!(!index.contains(&Period::containing(ymd(2026, 1, 29), Granularity::Day, &en)));
    }

    #[test]
    fn indexes_quarters_and_years_by_uid() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "2026-Q1.md");
        touch(dir.path(), "2026.md");
        let vault = FsVault::open(dir.path()).unwrap();
        let en = Locale::EN;

        let quarters = NoteIndex::build(
            &vault,
            Granularity::Quarter,
            &PeriodicNoteSettings::defaults_for(Granularity::Quarter),
            &en,
            2026,
        )
        .unwrap();
        let uids: Vec<&str> = quarters.iter().map(|(uid, _)| uid).collect();
        assert_eq!(uids, vec!["quarter-2026-1"]);

        let years = NoteIndex::build(
            &vault,
            Granularity::Year,
            &PeriodicNoteSettings::defaults_for(Granularity::Year),
            &en,
            2026,
        )
        .unwrap();
        assert!(years.get_uid("year-2026").is_some());
        assert_eq!(years.granularity(), Granularity::Year);
    }

    #[test]
    fn nested_format_parses_basename_only() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "journal/2026/02/2026-02-14.md");
        let vault = FsVault::open(dir.path()).unwrap();
        let settings = PeriodicNoteSettings {
            format: "YYYY/MM/YYYY-MM-DD".to_string(),
            folder: "journal".to_string(),
            template: String::new(),
        };
        let index =
            NoteIndex::build(&vault, Granularity::Day, &settings, &Locale::EN, 2026).unwrap();
        assert!(index.get_uid("day-2026-02-14").is_some());
    }

    #[test]
    fn duplicate_periods_keep_first_path() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a/2026-01.md");
        touch(dir.path(), "b/2026-01.md");
        let vault = FsVault::open(dir.path()).unwrap();
        let index = NoteIndex::build(
            &vault,
            Granularity::Month,
            &PeriodicNoteSettings::defaults_for(Granularity::Month),
            &Locale::EN,
            2026,
        )
        .unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get_uid("month-2026-01").unwrap().path.as_str(), "a/2026-01.md");
    }

    #[test]
    fn missing_folder_builds_empty_index() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FsVault::open(dir.path()).unwrap();
        let settings = PeriodicNoteSettings {
            folder: "weekly".to_string(),
            ..PeriodicNoteSettings::defaults_for(Granularity::Week)
        };
        let index =
            NoteIndex::build(&vault, Granularity::Week, &settings, &Locale::EN, 2026).unwrap();
        assert!(index.is_empty());
        assert!(NoteIndex::empty(Granularity::Week).is_empty());
    }

    #[test]
    fn year_less_format_uses_the_given_year() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "days/03-14.md");
        let vault = FsVault::open(dir.path()).unwrap();
        let settings = PeriodicNoteSettings {
            format: "MM-DD".to_string(),
            folder: "days".to_string(),
            template: String::new(),
        };
        let index =
            NoteIndex::build(&vault, Granularity::Day, &settings, &Locale::EN, 2031).unwrap();
        assert!(index.get_uid("day-2031-03-14").is_some());
        assert_eq!(index.len(), 1);
    }
}
