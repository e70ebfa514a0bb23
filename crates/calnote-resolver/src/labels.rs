//! Calendar header labels and month grid indicators.
//!
//! A calendar view shows one month. Its header names the month, quarter
//! and year; each of those becomes a clickable label that carries an
//! indicator for whether the period already has a note. The view itself
//! only implements [`LabelDecorator`]; clicking a label should call
//! [`crate::NoteResolver::open`] with the label's period.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};

use calnote_core::format::format_date;
use calnote_core::{Granularity, Locale, Period, Result};
use calnote_vault::NoteIndex;

use crate::resolver::NoteResolver;

/// One decorated label in the calendar header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLabel {
    pub period: Period,
    pub text: String,
    pub date_uid: String,
    /// Whether a note exists for the period.
    pub has_note: bool,
}

/// Receives header labels to attach click handlers and indicators to.
pub trait LabelDecorator {
    fn decorate(&mut self, label: &HeaderLabel);
}

/// Note indexes for the granularities a calendar view displays.
#[derive(Debug, Clone, Default)]
pub struct CalendarIndexes {
    indexes: BTreeMap<Granularity, NoteIndex>,
}

impl CalendarIndexes {
    /// Build fresh indexes for every granularity.
    ///
    /// # Errors
    ///
    /// Returns an error if a notes folder cannot be listed.
    pub fn build(resolver: &NoteResolver<'_>) -> Result<Self> {
        let mut indexes = BTreeMap::new();
        for granularity in Granularity::ALL {
            indexes.insert(granularity, resolver.index(granularity)?);
        }
        Ok(Self { indexes })
    }

    pub fn insert(&mut self, index: NoteIndex) {
        self.indexes.insert(index.granularity(), index);
    }

    #[must_use]
    pub fn get(&self, granularity: Granularity) -> Option<&NoteIndex> {
        self.indexes.get(&granularity)
    }

    #[must_use]
    pub fn has_note(&self, period: &Period) -> bool {
        self.get(period.granularity)
            .is_some_and(|index| index.contains(period))
    }
}

/// Month, quarter and year labels for the month containing `displayed`.
#[must_use]
pub fn header_labels(
    displayed: NaiveDate,
    locale: &Locale,
    indexes: &CalendarIndexes,
) -> [HeaderLabel; 3] {
    let label = |granularity: Granularity, format: &str| {
        let period = Period::containing(displayed, granularity, locale);
        HeaderLabel {
            period,
            text: format_date(period.start, format, locale),
            date_uid: period.date_uid(),
            has_note: indexes.has_note(&period),
        }
    };
    [
        label(Granularity::Month, "MMMM"),
        label(Granularity::Quarter, "[Q]Q"),
        label(Granularity::Year, "YYYY"),
    ]
}

/// Hand the three header labels to `decorator`.
pub fn decorate_header(
    displayed: NaiveDate,
    locale: &Locale,
    indexes: &CalendarIndexes,
    decorator: &mut dyn LabelDecorator,
) {
    for label in header_labels(displayed, locale, indexes) {
        decorator.decorate(&label);
    }
}

/// One day cell of the month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    /// `false` for the padding days of adjacent months.
    pub in_month: bool,
    pub has_note: bool,
}

/// One row of the month grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekRow {
    pub week: Period,
    /// Locale week number.
    pub number: u32,
    pub has_note: bool,
    pub days: [DayCell; 7],
}

/// Locale weeks covering the month containing `displayed`.
#[must_use]
pub fn month_weeks(
    displayed: NaiveDate,
    locale: &Locale,
    indexes: &CalendarIndexes,
) -> Vec<WeekRow> {
    let month = Period::containing(displayed, Granularity::Month, locale);
    let last = month.end();
    let mut rows = Vec::new();
    let mut week = Period::containing(month.start, Granularity::Week, locale);

    while week.start <= last {
        let days = std::array::from_fn(|i| {
            // Cells past the last representable day repeat it.
            let date = week
                .start
                .checked_add_days(Days::new(i as u64))
                .unwrap_or(NaiveDate::MAX);
            DayCell {
                date,
                in_month: date.month() == month.start.month() && date.year() == month.start.year(),
                has_note: indexes.has_note(&Period::containing(date, Granularity::Day, locale)),
            }
        });
        rows.push(WeekRow {
            week,
            number: locale.week_of_year(week.start).unwrap_or_default(),
            has_note: indexes.has_note(&week),
            days,
        });
        week = match week.offset(1) {
            Some(next) => next,
            None => break,
        };
    }
    rows
}
