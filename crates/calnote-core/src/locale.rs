//! Locale-dependent week rules.
//!
//! Weeks follow the moment.js model: `dow` is the first day of the week
//! (0 = Sunday) and `doy` pins which January day always falls in week 1
//! (`7 + dow - doy`). `en` uses `dow = 0, doy = 6` (the week holding
//! January 1st is week 1); ISO uses `dow = 1, doy = 4`.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Week rules used for `w`/`gggg` tokens, week truncation and weekday
/// template tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locale {
    /// First day of the week, 0 = Sunday.
    pub dow: u32,
    /// Day-of-year anchor for week 1.
    pub doy: u32,
}

impl Default for Locale {
    fn default() -> Self {
        Self::EN
    }
}

/// User override of the first day of the week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    /// Keep whatever the locale preset says.
    #[default]
    Locale,
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl WeekStart {
    fn dow(self) -> Option<u32> {
        match self {
            Self::Locale => None,
            Self::Sunday => Some(0),
            Self::Monday => Some(1),
            Self::Tuesday => Some(2),
            Self::Wednesday => Some(3),
            Self::Thursday => Some(4),
            Self::Friday => Some(5),
            Self::Saturday => Some(6),
        }
    }
}

impl Locale {
    pub const EN: Locale = Locale { dow: 0, doy: 6 };
    pub const ISO: Locale = Locale { dow: 1, doy: 4 };

    /// Look up a locale preset by name. Unknown names fall back to `en`.
    #[must_use]
    pub fn from_preset(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "en" | "en-us" | "" => Self::EN,
            "en-gb" | "iso" | "de" | "fr" | "es" | "it" | "nl" => Self::ISO,
            other => {
                tracing::warn!(locale = other, "unknown locale preset, using en");
                Self::EN
            }
        }
    }

    /// Replace the first day of the week, keeping the week-1 anchor.
    #[must_use]
    pub fn with_week_start(self, start: WeekStart) -> Self {
        match start.dow() {
            Some(dow) => Self { dow, ..self },
            None => self,
        }
    }

    /// January day that is always part of week 1.
    fn first_week_day(&self) -> u32 {
        (7 + self.dow).saturating_sub(self.doy).clamp(1, 7)
    }

    /// Position of `date` inside its locale week, 0-based.
    #[must_use]
    pub fn weekday_index(&self, date: NaiveDate) -> u32 {
        (date.weekday().num_days_from_sunday() + 7 - self.dow) % 7
    }

    /// Position of a named weekday inside a locale week, 0-based.
    #[must_use]
    pub fn weekday_offset(&self, day: Weekday) -> u32 {
        (day.num_days_from_sunday() + 7 - self.dow) % 7
    }

    /// First day of the locale week containing `date`, `None` when that
    /// day falls before the first representable date.
    #[must_use]
    pub fn week_start(&self, date: NaiveDate) -> Option<NaiveDate> {
        date.checked_sub_days(Days::new(u64::from(self.weekday_index(date))))
    }

    /// Locale week-year that `date` belongs to. `None` at the edges of
    /// the representable calendar where that year cannot be determined.
    #[must_use]
    pub fn week_year(&self, date: NaiveDate) -> Option<i32> {
        let anchor = self
            .week_start(date)?
            .checked_add_days(Days::new(u64::from(7 - self.first_week_day())))?;
        Some(anchor.year())
    }

    /// Locale week number of `date` (1-based).
    #[must_use]
    pub fn week_of_year(&self, date: NaiveDate) -> Option<u32> {
        let year = self.week_year(date)?;
        let days = (self.week_start(date)? - self.first_week_start(year)?).num_days();
        u32::try_from(days / 7).ok().map(|weeks| weeks + 1)
    }

    /// First day of week 1 of the given locale week-year.
    #[must_use]
    pub fn first_week_start(&self, year: i32) -> Option<NaiveDate> {
        let anchor = NaiveDate::from_ymd_opt(year, 1, self.first_week_day())?;
        self.week_start(anchor)
    }

    /// Date of the `offset`-th day (0-based) of `week` in `year`.
    #[must_use]
    pub fn from_week(&self, year: i32, week: u32, offset: u32) -> Option<NaiveDate> {
        let days = u64::from(week.saturating_sub(1)) * 7 + u64::from(offset);
        self.first_week_start(year)?.checked_add_days(Days::new(days))
    }
}
