//! Create-or-open resolution of periodic notes.

use chrono::{Datelike, NaiveDate};

use calnote_core::{
    expand_template, resolve_settings, Clock, Granularity, Locale, Period, PeriodicNoteSettings,
    Result, SettingsProvider, TemplateContext,
};
use calnote_vault::{FoldInfo, NoteFile, NoteIndex, VaultPath};

use crate::gate::{ConfirmationGate, Prompt};
use crate::host::{Host, OpenState, OpenTarget};

/// Outcome of resolving a period to a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The note was already in the vault.
    Existing(NoteFile),
    /// The note was created by this call.
    Created(NoteFile),
    /// Creation needed confirmation and the user did not give it.
    Declined,
}

impl Resolution {
    #[must_use]
    pub fn file(&self) -> Option<&NoteFile> {
        match self {
            Self::Existing(file) | Self::Created(file) => Some(file),
            Self::Declined => None,
        }
    }

    #[must_use]
    pub fn was_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Settings and locale read once for a single lookup.
struct Lookup {
    settings: PeriodicNoteSettings,
    locale: Locale,
}

impl Lookup {
    fn path(&self, period: &Period) -> VaultPath {
        let filename = self.settings.filename(period.start, &self.locale);
        VaultPath::note(&self.settings.folder, &filename)
    }
}

/// Template text and fold state read for a new note.
struct TemplateInfo {
    contents: String,
    folds: Option<FoldInfo>,
}

/// Resolves periods to notes, creating them on demand.
pub struct NoteResolver<'a> {
    host: Host<'a>,
    settings: &'a dyn SettingsProvider,
    clock: &'a dyn Clock,
}

impl<'a> NoteResolver<'a> {
    pub fn new(host: Host<'a>, settings: &'a dyn SettingsProvider, clock: &'a dyn Clock) -> Self {
        Self {
            host,
            settings,
            clock,
        }
    }

    #[must_use]
    pub fn locale(&self) -> Locale {
        self.settings.locale()
    }

    #[must_use]
    pub fn settings_for(&self, granularity: Granularity) -> PeriodicNoteSettings {
        resolve_settings(self.settings, granularity)
    }

    fn lookup(&self, granularity: Granularity) -> Lookup {
        Lookup {
            settings: self.settings_for(granularity),
            locale: self.locale(),
        }
    }

    /// The period of `granularity` containing `date`.
    #[must_use]
    pub fn period(&self, date: NaiveDate, granularity: Granularity) -> Period {
        Period::containing(date, granularity, &self.locale())
    }

    /// Canonical vault path of the note for `period`.
    #[must_use]
    pub fn note_path(&self, period: &Period) -> VaultPath {
        self.lookup(period.granularity).path(period)
    }

    /// The existing note for `period`, if any.
    #[must_use]
    pub fn find(&self, period: &Period) -> Option<NoteFile> {
        self.host.vault.get_by_path(&self.note_path(period))
    }

    /// Index of all existing notes of `granularity`.
    ///
    /// # Errors
    ///
    /// Returns an error if the notes folder cannot be listed.
    pub fn index(&self, granularity: Granularity) -> Result<NoteIndex> {
        let lookup = self.lookup(granularity);
        Ok(NoteIndex::build(
            self.host.vault,
            granularity,
            &lookup.settings,
            &lookup.locale,
            self.clock.now().year(),
        )?)
    }

    /// Return the note for `period`, creating it if it does not exist.
    ///
    /// Creation passes the confirmation gate first. A create that loses a
    /// race against another writer resolves to the file that won.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder or file cannot be created for any
    /// reason other than the file already existing.
    pub fn get_or_create(&mut self, period: &Period) -> Result<Resolution> {
        let lookup = self.lookup(period.granularity);
        let path = lookup.path(period);
        if let Some(file) = self.host.vault.get_by_path(&path) {
            tracing::debug!(path = %path, uid = period.date_uid(), "note exists");
            return Ok(Resolution::Existing(file));
        }

        let prompt = Prompt::new_note(period.granularity.adjective(), path.basename());
        let gate = ConfirmationGate::new(self.settings.confirm_before_create());
        if !gate.permits(&mut *self.host.confirm, &prompt) {
            tracing::debug!(path = %path, "note creation declined");
            return Ok(Resolution::Declined);
        }

        self.create_note(period, &path, &lookup)
    }

    /// Resolve `period` and open its note in the workspace.
    ///
    /// # Errors
    ///
    /// Propagates creation failures from [`Self::get_or_create`] and
    /// failures of the workspace to open the file.
    pub fn open(&mut self, period: &Period, target: OpenTarget) -> Result<Resolution> {
        let resolution = self.get_or_create(period)?;
        if let Some(file) = resolution.file() {
            let pane = self.host.workspace.acquire_pane(target);
            self.host
                .workspace
                .open_file(pane, file, OpenState { active: true })?;
        }
        Ok(resolution)
    }

    /// Resolve and open the note of `granularity` containing `date`.
    ///
    /// # Errors
    ///
    /// See [`Self::open`].
    pub fn open_date(
        &mut self,
        date: NaiveDate,
        granularity: Granularity,
        target: OpenTarget,
    ) -> Result<Resolution> {
        let period = self.period(date, granularity);
        self.open(&period, target)
    }

    /// Expanded content of a new note for `period`.
    #[must_use]
    pub fn render_content(&self, period: &Period) -> String {
        self.render(period, &self.lookup(period.granularity)).0
    }

    fn render(&self, period: &Period, lookup: &Lookup) -> (String, Option<FoldInfo>) {
        let ctx = TemplateContext {
            date: period.start,
            format: &lookup.settings.format,
            locale: &lookup.locale,
            now: self.clock.now(),
        };
        match self.template_info(&lookup.settings.template, period.granularity) {
            Some(info) => (expand_template(&info.contents, &ctx), info.folds),
            None => (format!("# {}\n", ctx.filename()), None),
        }
    }

    /// Read the configured template. `None` when there is no template or
    /// it could not be read; the user is told about the latter.
    fn template_info(&self, template: &str, granularity: Granularity) -> Option<TemplateInfo> {
        if template.is_empty() {
            return None;
        }

        let read = self
            .host
            .metadata
            .resolve_link(template)
            .ok_or_else(|| format!("template '{template}' not found"))
            .and_then(|file| {
                self.host
                    .vault
                    .read(&file)
                    .map(|contents| (file, contents))
                    .map_err(|e| e.to_string())
            });

        match read {
            Ok((file, contents)) => {
                let folds = self.host.folds.and_then(|store| store.load(&file.path));
                Some(TemplateInfo { contents, folds })
            }
            Err(reason) => {
                tracing::error!(template, %reason, "failed to read note template");
                self.host.notifier.notify(&format!(
                    "Failed to read the {} note template",
                    granularity.adjective()
                ));
                None
            }
        }
    }

    fn create_note(
        &mut self,
        period: &Period,
        path: &VaultPath,
        lookup: &Lookup,
    ) -> Result<Resolution> {
        let vault = self.host.vault;
        if let Some(parent) = path.parent() {
            if !vault.folder_exists(parent) {
                vault.create_folder(parent)?;
            }
        }

        let (content, folds) = self.render(period, lookup);
        match vault.create(path, &content) {
            Ok(file) => {
                tracing::info!(path = %path, uid = period.date_uid(), "created periodic note");
                if let (Some(store), Some(info)) = (self.host.folds, folds) {
                    if let Err(e) = store.save(&file.path, &info) {
                        tracing::warn!(path = %path, error = %e, "could not copy template folds");
                    }
                }
                Ok(Resolution::Created(file))
            }
            Err(e) if e.is_already_exists() => {
                tracing::warn!(path = %path, "note appeared during creation, opening it");
                match vault.get_by_path(path) {
                    Some(file) => Ok(Resolution::Existing(file)),
                    None => Err(e.into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }
}
