//! Periodic note settings and the settings provider contract.
//!
//! Settings are read through [`SettingsProvider`] rather than looked up
//! from another component's runtime state. When a provider has nothing
//! for a granularity, [`PeriodicNoteSettings::defaults_for`] applies.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CalnoteError, Result};
use crate::format::format_date;
use crate::locale::{Locale, WeekStart};
use crate::period::Granularity;

/// Where and how the notes of one granularity are stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodicNoteSettings {
    /// Moment-style filename format. Empty means the granularity default.
    pub format: String,
    /// Vault-relative folder. Empty means the vault root.
    pub folder: String,
    /// Link path of the template note. Empty means no template.
    pub template: String,
}

impl PeriodicNoteSettings {
    /// Settings used when nothing is configured for `granularity`.
    #[must_use]
    pub fn defaults_for(granularity: Granularity) -> Self {
        Self {
            format: granularity.default_format().to_string(),
            folder: String::new(),
            template: String::new(),
        }
    }

    /// Fill blank fields with their documented fallbacks.
    #[must_use]
    pub fn with_fallbacks(mut self, granularity: Granularity) -> Self {
        if self.format.trim().is_empty() {
            self.format = granularity.default_format().to_string();
        }
        self.folder = self.folder.trim().to_string();
        self.template = self.template.trim().to_string();
        self
    }

    /// Filename (without extension) of the note for `date`.
    #[must_use]
    pub fn filename(&self, date: NaiveDate, locale: &Locale) -> String {
        format_date(date, &self.format, locale)
    }

    /// Format segment that names the file itself. Formats may nest
    /// folders (`YYYY/MM/YYYY-MM-DD`); only the last segment is the basename.
    #[must_use]
    pub fn basename_format(&self) -> &str {
        self.format.rsplit('/').next().unwrap_or(&self.format)
    }
}

/// Typed access to the user's periodic note configuration.
pub trait SettingsProvider {
    /// Raw settings for a granularity, if any are configured.
    fn note_settings(&self, granularity: Granularity) -> Option<PeriodicNoteSettings>;

    /// Whether creating a note requires an explicit confirmation.
    fn confirm_before_create(&self) -> bool {
        true
    }

    /// Week rules and names for formatting.
    fn locale(&self) -> Locale {
        Locale::default()
    }
}

/// Settings for `granularity` with fallbacks applied.
#[must_use]
pub fn resolve_settings(
    provider: &dyn SettingsProvider,
    granularity: Granularity,
) -> PeriodicNoteSettings {
    provider
        .note_settings(granularity)
        .unwrap_or_else(|| PeriodicNoteSettings::defaults_for(granularity))
        .with_fallbacks(granularity)
}

/// Locale selection in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// Locale preset name (`en`, `en-gb`, `iso`, ...).
    pub preset: String,
    /// First day of the week override.
    pub week_start: WeekStart,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            preset: "en".to_string(),
            week_start: WeekStart::Locale,
        }
    }
}

/// Contents of `.calnote/config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalnoteConfig {
    pub confirm_before_create: bool,
    /// Open notes in a new split instead of reusing the current pane.
    pub open_in_new_split: bool,
    pub locale: LocaleConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<PeriodicNoteSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week: Option<PeriodicNoteSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<PeriodicNoteSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quarter: Option<PeriodicNoteSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<PeriodicNoteSettings>,
}

impl Default for CalnoteConfig {
    fn default() -> Self {
        Self {
            confirm_before_create: true,
            open_in_new_split: false,
            locale: LocaleConfig::default(),
            day: None,
            week: None,
            month: None,
            quarter: None,
            year: None,
        }
    }
}

impl CalnoteConfig {
    /// A config that spells out the default settings of every granularity.
    #[must_use]
    pub fn with_explicit_defaults() -> Self {
        let mut config = Self::default();
        for granularity in Granularity::ALL {
            *config.slot_mut(granularity) = Some(PeriodicNoteSettings::defaults_for(granularity));
        }
        config
    }

    /// # Errors
    ///
    /// Returns [`CalnoteError::Config`] if the YAML is malformed.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| CalnoteError::Config(e.to_string()))
    }

    /// # Errors
    ///
    /// Returns [`CalnoteError::Serialization`] if the config cannot be encoded.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| CalnoteError::Serialization(e.to_string()))
    }

    /// Load the config file, falling back to defaults when it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`CalnoteError::Io`] if the file exists but cannot be read,
    /// or [`CalnoteError::Config`] if it is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    fn slot(&self, granularity: Granularity) -> &Option<PeriodicNoteSettings> {
        match granularity {
            Granularity::Day => &self.day,
            Granularity::Week => &self.week,
            Granularity::Month => &self.month,
            Granularity::Quarter => &self.quarter,
            Granularity::Year => &self.year,
        }
    }

    fn slot_mut(&mut self, granularity: Granularity) -> &mut Option<PeriodicNoteSettings> {
        match granularity {
            Granularity::Day => &mut self.day,
            Granularity::Week => &mut self.week,
            Granularity::Month => &mut self.month,
            Granularity::Quarter => &mut self.quarter,
            Granularity::Year => &mut self.year,
        }
    }
}

impl SettingsProvider for CalnoteConfig {
    fn note_settings(&self, granularity: Granularity) -> Option<PeriodicNoteSettings> {
        self.slot(granularity).clone()
    }

    fn confirm_before_create(&self) -> bool {
        self.confirm_before_create
    }

    fn locale(&self) -> Locale {
        Locale::from_preset(&self.locale.preset).with_week_start(self.locale.week_start)
    }
}
