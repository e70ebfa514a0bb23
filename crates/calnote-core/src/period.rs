//! Calendar periods and date arithmetic.
//!
//! A [`Period`] is a calendar date truncated to a [`Granularity`]. Its
//! date-UID (`day-2026-01-31`, `quarter-2026-1`, `year-2026`, ...) is the
//! key used by the note index.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::locale::Locale;

/// Calendar granularity of a periodic note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Granularity {
    pub const ALL: [Granularity; 5] = [
        Granularity::Day,
        Granularity::Week,
        Granularity::Month,
        Granularity::Quarter,
        Granularity::Year,
    ];

    /// Format used when settings leave `format` empty.
    #[must_use]
    pub fn default_format(self) -> &'static str {
        match self {
            Self::Day => "YYYY-MM-DD",
            Self::Week => "gggg-[W]ww",
            Self::Month => "YYYY-MM",
            Self::Quarter => "YYYY-[Q]Q",
            Self::Year => "YYYY",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }

    /// Adjective used in user-facing prompts ("daily", "weekly", ...).
    #[must_use]
    pub fn adjective(self) -> &'static str {
        match self {
            Self::Day => "daily",
            Self::Week => "weekly",
            Self::Month => "monthly",
            Self::Quarter => "quarterly",
            Self::Year => "yearly",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" | "daily" | "d" => Ok(Self::Day),
            "week" | "weekly" | "w" => Ok(Self::Week),
            "month" | "monthly" | "m" => Ok(Self::Month),
            "quarter" | "quarterly" | "q" => Ok(Self::Quarter),
            "year" | "yearly" | "y" => Ok(Self::Year),
            other => Err(format!("unknown granularity '{other}'")),
        }
    }
}

/// A calendar date truncated to a granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    pub granularity: Granularity,
    /// First day of the period.
    pub start: NaiveDate,
}

impl Period {
    /// The period of the given granularity that contains `date`.
    #[must_use]
    pub fn containing(date: NaiveDate, granularity: Granularity, locale: &Locale) -> Self {
        let start = match granularity {
            Granularity::Day => date,
            // A week cut off by the start of the calendar begins at its first day.
            Granularity::Week => locale.week_start(date).unwrap_or(NaiveDate::MIN),
            Granularity::Month => first_of_month(date.year(), date.month()),
            Granularity::Quarter => first_of_month(date.year(), quarter_of(date) * 3 - 2),
            Granularity::Year => first_of_month(date.year(), 1),
        };
        Self { granularity, start }
    }

    /// The period `n` steps away (negative steps go backwards), `None`
    /// when it lies outside the representable calendar.
    #[must_use]
    pub fn offset(&self, n: i64) -> Option<Self> {
        let unit = match self.granularity {
            Granularity::Day => OffsetUnit::Day,
            Granularity::Week => OffsetUnit::Week,
            Granularity::Month => OffsetUnit::Month,
            Granularity::Quarter => OffsetUnit::Quarter,
            Granularity::Year => OffsetUnit::Year,
        };
        let shifted = shift(self.start.and_time(chrono::NaiveTime::MIN), n, unit)?;
        Some(Self {
            granularity: self.granularity,
            start: shifted.date(),
        })
    }

    /// Last day of the period. The last period of the calendar ends at
    /// [`NaiveDate::MAX`].
    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.offset(1)
            .and_then(|next| next.start.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end()
    }

    /// Stable string key identifying this period instance.
    #[must_use]
    pub fn date_uid(&self) -> String {
        let s = self.start;
        match self.granularity {
            Granularity::Day => format!("day-{}", s.format("%Y-%m-%d")),
            Granularity::Week => format!("week-{}", s.format("%Y-%m-%d")),
            Granularity::Month => format!("month-{}", s.format("%Y-%m")),
            Granularity::Quarter => format!("quarter-{}-{}", s.year(), quarter_of(s)),
            Granularity::Year => format!("year-{}", s.year()),
        }
    }
}

/// Quarter (1-4) of a date.
#[must_use]
pub fn quarter_of(date: NaiveDate) -> u32 {
    (date.month() - 1) / 3 + 1
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

/// Unit of a signed template offset such as `+1d` or `-2M`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetUnit {
    Year,
    Quarter,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}

impl OffsetUnit {
    /// Parse a unit letter. `M` is months and `m` is minutes; every other
    /// letter is case-insensitive.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'M' => Some(Self::Month),
            'm' => Some(Self::Minute),
            _ => match c.to_ascii_lowercase() {
                'y' => Some(Self::Year),
                'q' => Some(Self::Quarter),
                'w' => Some(Self::Week),
                'd' => Some(Self::Day),
                'h' => Some(Self::Hour),
                's' => Some(Self::Second),
                _ => None,
            },
        }
    }
}

/// Shift a timestamp by `n` units. Month-based shifts clamp to the end of
/// the target month (Jan 31 + 1 month = Feb 28/29). `None` when the result
/// is not representable.
#[must_use]
pub fn shift(at: NaiveDateTime, n: i64, unit: OffsetUnit) -> Option<NaiveDateTime> {
    let months = |count: Option<i64>| -> Option<NaiveDateTime> {
        let count = count?;
        let magnitude = Months::new(u32::try_from(count.unsigned_abs()).ok()?);
        if count >= 0 {
            at.checked_add_months(magnitude)
        } else {
            at.checked_sub_months(magnitude)
        }
    };
    let span = |d: Option<Duration>| at.checked_add_signed(d?);

    match unit {
        OffsetUnit::Year => months(n.checked_mul(12)),
        OffsetUnit::Quarter => months(n.checked_mul(3)),
        OffsetUnit::Month => months(Some(n)),
        OffsetUnit::Week => span(Duration::try_weeks(n)),
        OffsetUnit::Day => span(Duration::try_days(n)),
        OffsetUnit::Hour => span(Duration::try_hours(n)),
        OffsetUnit::Minute => span(Duration::try_minutes(n)),
        OffsetUnit::Second => span(Duration::try_seconds(n)),
    }
}
