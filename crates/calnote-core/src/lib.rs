//! # calnote-core
//!
//! Core types for the calnote periodic notes companion.
//!
//! This crate defines the pieces every other calnote crate builds on:
//! - [`Period`] and [`Granularity`], with date-UIDs and period arithmetic
//! - Moment-style date formatting and parsing ([`format`])
//! - Locale week rules ([`Locale`])
//! - [`PeriodicNoteSettings`] and the [`SettingsProvider`] contract
//! - Template token expansion ([`template`])
//! - Error hierarchy ([`CalnoteError`], [`VaultError`], [`FormatError`])

pub mod clock;
pub mod error;
pub mod format;
pub mod locale;
pub mod period;
pub mod settings;
pub mod template;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CalnoteError, FormatError, Result, VaultError};
pub use locale::{Locale, WeekStart};
pub use period::{Granularity, OffsetUnit, Period};
pub use settings::{
    resolve_settings, CalnoteConfig, LocaleConfig, PeriodicNoteSettings, SettingsProvider,
};
pub use template::{expand_template, TemplateContext};
