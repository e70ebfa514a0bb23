//! Moment-style date formatting and strict parsing.
//!
//! Note filenames and template tokens use moment.js format strings
//! (`YYYY-MM-DD`, `gggg-[W]ww`, `YYYY-[Q]Q`, ...). Bracketed text is
//! literal, recognized tokens are replaced, and every other character is
//! copied through unchanged.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};

use crate::error::FormatError;
use crate::locale::Locale;
use crate::period::quarter_of;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Year4,
    Year2,
    Year,
    Quarter,
    QuarterOrdinal,
    MonthName,
    MonthShort,
    MonthOrdinal,
    Month2,
    Month,
    DayOfYear3,
    DayOfYearOrdinal,
    DayOfYear,
    DayOrdinal,
    Day2,
    Day,
    WeekdayName,
    WeekdayShort,
    WeekdayMin,
    WeekdayOrdinal,
    Weekday,
    LocaleWeekday,
    IsoWeekday,
    WeekOrdinal,
    Week2,
    Week,
    IsoWeekOrdinal,
    IsoWeek2,
    IsoWeek,
    WeekYear4,
    WeekYear2,
    IsoWeekYear4,
    IsoWeekYear2,
    Hour24Pad,
    Hour24,
    Hour12Pad,
    Hour12,
    HourFrom1Pad,
    HourFrom1,
    MinutePad,
    Minute,
    SecondPad,
    Second,
    Fraction(usize),
    MeridiemUpper,
    MeridiemLower,
    UnixSeconds,
    UnixMillis,
}

/// Token table, longest spelling first for each letter.
const TOKENS: &[(&str, Field)] = &[
    ("YYYY", Field::Year4),
    ("YY", Field::Year2),
    ("Y", Field::Year),
    ("Qo", Field::QuarterOrdinal),
    ("Q", Field::Quarter),
    ("MMMM", Field::MonthName),
    ("MMM", Field::MonthShort),
    ("Mo", Field::MonthOrdinal),
    ("MM", Field::Month2),
    ("M", Field::Month),
    ("DDDD", Field::DayOfYear3),
    ("DDDo", Field::DayOfYearOrdinal),
    ("DDD", Field::DayOfYear),
    ("Do", Field::DayOrdinal),
    ("DD", Field::Day2),
    ("D", Field::Day),
    ("dddd", Field::WeekdayName),
    ("ddd", Field::WeekdayShort),
    ("do", Field::WeekdayOrdinal),
    ("dd", Field::WeekdayMin),
    ("d", Field::Weekday),
    ("e", Field::LocaleWeekday),
    ("E", Field::IsoWeekday),
    ("wo", Field::WeekOrdinal),
    ("ww", Field::Week2),
    ("w", Field::Week),
    ("Wo", Field::IsoWeekOrdinal),
    ("WW", Field::IsoWeek2),
    ("W", Field::IsoWeek),
    ("gggg", Field::WeekYear4),
    ("gg", Field::WeekYear2),
    ("GGGG", Field::IsoWeekYear4),
    ("GG", Field::IsoWeekYear2),
    ("HH", Field::Hour24Pad),
    ("H", Field::Hour24),
    ("hh", Field::Hour12Pad),
    ("h", Field::Hour12),
    ("kk", Field::HourFrom1Pad),
    ("k", Field::HourFrom1),
    ("mm", Field::MinutePad),
    ("m", Field::Minute),
    ("ss", Field::SecondPad),
    ("s", Field::Second),
    ("SSS", Field::Fraction(3)),
    ("SS", Field::Fraction(2)),
    ("S", Field::Fraction(1)),
    ("A", Field::MeridiemUpper),
    ("a", Field::MeridiemLower),
    ("X", Field::UnixSeconds),
    ("x", Field::UnixMillis),
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Field(Field),
}

fn tokenize(format: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut rest = format;

    while let Some(c) = rest.chars().next() {
        if c == '[' {
            if let Some(close) = rest.find(']') {
                literal.push_str(&rest[1..close]);
                rest = &rest[close + 1..];
                continue;
            }
        }
        if let Some((spelling, field)) = TOKENS.iter().find(|(t, _)| rest.starts_with(t)) {
            if !literal.is_empty() {
                tokens.push(Token::Literal(std::mem::take(&mut literal)));
            }
            tokens.push(Token::Field(*field));
            rest = &rest[spelling.len()..];
            continue;
        }
        literal.push(c);
        rest = &rest[c.len_utf8()..];
    }
    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    tokens
}

fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Render a date (at midnight) with a moment-style format.
#[must_use]
pub fn format_date(date: NaiveDate, format: &str, locale: &Locale) -> String {
    format_datetime(date.and_time(chrono::NaiveTime::MIN), format, locale)
}

/// Render a timestamp with a moment-style format.
#[must_use]
pub fn format_datetime(at: NaiveDateTime, format: &str, locale: &Locale) -> String {
    let date = at.date();
    let mut out = String::with_capacity(format.len() + 8);
    for token in tokenize(format) {
        match token {
            Token::Literal(text) => out.push_str(&text),
            Token::Field(field) => out.push_str(&render(field, at, date, locale)),
        }
    }
    out
}

/// Locale week-year and week number of `date`. At the very edges of the
/// calendar, where the week-year is not representable, this falls back to
/// the calendar year and the 7-day block of the year.
fn locale_week(date: NaiveDate, locale: &Locale) -> (i32, u32) {
    match (locale.week_year(date), locale.week_of_year(date)) {
        (Some(year), Some(week)) => (year, week),
        _ => (date.year(), date.ordinal0() / 7 + 1),
    }
}

fn render(field: Field, at: NaiveDateTime, date: NaiveDate, locale: &Locale) -> String {
    let weekday = date.weekday().num_days_from_sunday() as usize;
    let hour12 = match at.hour() % 12 {
        0 => 12,
        h => h,
    };
    match field {
        Field::Year4 => format!("{:04}", date.year()),
        Field::Year2 => format!("{:02}", date.year().rem_euclid(100)),
        Field::Year => date.year().to_string(),
        Field::Quarter => quarter_of(date).to_string(),
        Field::QuarterOrdinal => ordinal(quarter_of(date)),
        Field::MonthName => MONTHS[date.month0() as usize].to_string(),
        Field::MonthShort => MONTHS[date.month0() as usize][..3].to_string(),
        Field::MonthOrdinal => ordinal(date.month()),
        Field::Month2 => format!("{:02}", date.month()),
        Field::Month => date.month().to_string(),
        Field::DayOfYear3 => format!("{:03}", date.ordinal()),
        Field::DayOfYearOrdinal => ordinal(date.ordinal()),
        Field::DayOfYear => date.ordinal().to_string(),
        Field::DayOrdinal => ordinal(date.day()),
        Field::Day2 => format!("{:02}", date.day()),
        Field::Day => date.day().to_string(),
        Field::WeekdayName => WEEKDAYS[weekday].to_string(),
        Field::WeekdayShort => WEEKDAYS[weekday][..3].to_string(),
        Field::WeekdayMin => WEEKDAYS[weekday][..2].to_string(),
        Field::WeekdayOrdinal => ordinal(weekday as u32),
        Field::Weekday => weekday.to_string(),
        Field::LocaleWeekday => locale.weekday_index(date).to_string(),
        Field::IsoWeekday => date.weekday().number_from_monday().to_string(),
        Field::WeekOrdinal => ordinal(locale_week(date, locale).1),
        Field::Week2 => format!("{:02}", locale_week(date, locale).1),
        Field::Week => locale_week(date, locale).1.to_string(),
        Field::IsoWeekOrdinal => ordinal(date.iso_week().week()),
        Field::IsoWeek2 => format!("{:02}", date.iso_week().week()),
        Field::IsoWeek => date.iso_week().week().to_string(),
        Field::WeekYear4 => format!("{:04}", locale_week(date, locale).0),
        Field::WeekYear2 => format!("{:02}", locale_week(date, locale).0.rem_euclid(100)),
        Field::IsoWeekYear4 => format!("{:04}", date.iso_week().year()),
        Field::IsoWeekYear2 => format!("{:02}", date.iso_week().year().rem_euclid(100)),
        Field::Hour24Pad => format!("{:02}", at.hour()),
        Field::Hour24 => at.hour().to_string(),
        Field::Hour12Pad => format!("{hour12:02}"),
        Field::Hour12 => hour12.to_string(),
        Field::HourFrom1Pad => format!("{:02}", if at.hour() == 0 { 24 } else { at.hour() }),
        Field::HourFrom1 => (if at.hour() == 0 { 24 } else { at.hour() }).to_string(),
        Field::MinutePad => format!("{:02}", at.minute()),
        Field::Minute => at.minute().to_string(),
        Field::SecondPad => format!("{:02}", at.second()),
        Field::Second => at.second().to_string(),
        Field::Fraction(digits) => {
            let nanos = format!("{:09}", at.nanosecond() % 1_000_000_000);
            nanos[..digits].to_string()
        }
        Field::MeridiemUpper => (if at.hour() < 12 { "AM" } else { "PM" }).to_string(),
        Field::MeridiemLower => (if at.hour() < 12 { "am" } else { "pm" }).to_string(),
        Field::UnixSeconds => at.and_utc().timestamp().to_string(),
        Field::UnixMillis => at.and_utc().timestamp_millis().to_string(),
    }
}

/// Date components collected while parsing.
#[derive(Debug, Default)]
struct Parsed {
    year: Option<i32>,
    quarter: Option<u32>,
    month: Option<u32>,
    day: Option<u32>,
    day_of_year: Option<u32>,
    weekday: Option<u32>,
    locale_weekday: Option<u32>,
    iso_weekday: Option<u32>,
    week: Option<u32>,
    week_year: Option<i32>,
    iso_week: Option<u32>,
    iso_week_year: Option<i32>,
    unix_seconds: Option<i64>,
}

struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn digits(&mut self, min: usize, max: usize) -> Option<i64> {
        let len = self
            .rest
            .bytes()
            .take(max)
            .take_while(u8::is_ascii_digit)
            .count();
        if len < min {
            return None;
        }
        let value = self.rest[..len].parse().ok()?;
        self.rest = &self.rest[len..];
        Some(value)
    }

    fn signed_digits(&mut self) -> Option<i64> {
        let negative = self.rest.starts_with('-');
        if negative || self.rest.starts_with('+') {
            self.rest = &self.rest[1..];
        }
        let value = self.digits(1, 19)?;
        Some(if negative { -value } else { value })
    }

    fn ordinal(&mut self, max: usize) -> Option<u32> {
        let value = self.digits(1, max)?;
        let suffix = self.rest.get(..2)?;
        if ["st", "nd", "rd", "th"].contains(&suffix) {
            self.rest = &self.rest[2..];
            u32::try_from(value).ok()
        } else {
            None
        }
    }

    /// Match one of `names` case-insensitively, preferring the longest.
    fn name(&mut self, names: &[&str]) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for (idx, name) in names.iter().enumerate() {
            let len = name.len();
            let matches = self
                .rest
                .get(..len)
                .is_some_and(|head| head.eq_ignore_ascii_case(name));
            if matches && best.map_or(true, |(_, l)| len > l) {
                best = Some((idx, len));
            }
        }
        let (idx, len) = best?;
        self.rest = &self.rest[len..];
        Some(idx)
    }

    fn literal(&mut self, text: &str) -> bool {
        match self.rest.strip_prefix(text) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }
}

fn expand_two_digit_year(yy: i64) -> i32 {
    let yy = yy as i32;
    if yy > 68 {
        1900 + yy
    } else {
        2000 + yy
    }
}

/// Strictly parse `input` as a date using a moment-style format.
///
/// Time tokens are consumed but do not affect the result. Components the
/// format does not carry default to the start of the enclosing unit; a
/// missing year defaults to `default_year`.
///
/// # Errors
///
/// Returns [`FormatError::Mismatch`] if the input does not follow the
/// format, or [`FormatError::InvalidDate`] if the components do not form
/// an existing date.
pub fn parse_date(
    input: &str,
    format: &str,
    locale: &Locale,
    default_year: i32,
) -> Result<NaiveDate, FormatError> {
    let mismatch = || FormatError::Mismatch {
        input: input.to_string(),
        format: format.to_string(),
    };
    let invalid = || FormatError::InvalidDate {
        input: input.to_string(),
        format: format.to_string(),
    };

    let mut cur = Cursor { rest: input };
    let mut p = Parsed::default();
    let u = |v: i64| u32::try_from(v).ok();
    let y = |v: i64| i32::try_from(v).ok();

    for token in tokenize(format) {
        let ok = match token {
            Token::Literal(text) => cur.literal(&text),
            Token::Field(field) => match field {
                Field::Year4 => cur.digits(4, 4).and_then(y).map(|v| p.year = Some(v)).is_some(),
                Field::Year2 => cur
                    .digits(2, 2)
                    .map(|v| p.year = Some(expand_two_digit_year(v)))
                    .is_some(),
                Field::Year => cur.signed_digits().and_then(y).map(|v| p.year = Some(v)).is_some(),
                Field::Quarter => cur.digits(1, 1).and_then(u).map(|v| p.quarter = Some(v)).is_some(),
                Field::QuarterOrdinal => cur.ordinal(1).map(|v| p.quarter = Some(v)).is_some(),
                Field::MonthName | Field::MonthShort => {
                    let short: Vec<&str> = MONTHS.iter().map(|m| &m[..3]).collect();
                    let names: Vec<&str> = MONTHS.iter().copied().chain(short).collect();
                    cur.name(&names)
                        .map(|idx| p.month = Some((idx % 12) as u32 + 1))
                        .is_some()
                }
                Field::MonthOrdinal => cur.ordinal(2).map(|v| p.month = Some(v)).is_some(),
                Field::Month2 => cur.digits(2, 2).and_then(u).map(|v| p.month = Some(v)).is_some(),
                Field::Month => cur.digits(1, 2).and_then(u).map(|v| p.month = Some(v)).is_some(),
                Field::DayOfYear3 => cur
                    .digits(3, 3)
                    .and_then(u)
                    .map(|v| p.day_of_year = Some(v))
                    .is_some(),
                Field::DayOfYearOrdinal => cur.ordinal(3).map(|v| p.day_of_year = Some(v)).is_some(),
                Field::DayOfYear => cur
                    .digits(1, 3)
                    .and_then(u)
                    .map(|v| p.day_of_year = Some(v))
                    .is_some(),
                Field::DayOrdinal => cur.ordinal(2).map(|v| p.day = Some(v)).is_some(),
                Field::Day2 => cur.digits(2, 2).and_then(u).map(|v| p.day = Some(v)).is_some(),
                Field::Day => cur.digits(1, 2).and_then(u).map(|v| p.day = Some(v)).is_some(),
                Field::WeekdayName | Field::WeekdayShort | Field::WeekdayMin => {
                    let names: Vec<&str> = WEEKDAYS
                        .iter()
                        .copied()
                        .chain(WEEKDAYS.iter().map(|d| &d[..3]))
                        .chain(WEEKDAYS.iter().map(|d| &d[..2]))
                        .collect();
                    cur.name(&names)
                        .map(|idx| p.weekday = Some((idx % 7) as u32))
                        .is_some()
                }
                Field::WeekdayOrdinal => cur.ordinal(1).map(|v| p.weekday = Some(v)).is_some(),
                Field::Weekday => cur.digits(1, 1).and_then(u).map(|v| p.weekday = Some(v)).is_some(),
                Field::LocaleWeekday => cur
                    .digits(1, 1)
                    .and_then(u)
                    .map(|v| p.locale_weekday = Some(v))
                    .is_some(),
                Field::IsoWeekday => cur
                    .digits(1, 1)
                    .and_then(u)
                    .map(|v| p.iso_weekday = Some(v))
                    .is_some(),
                Field::WeekOrdinal => cur.ordinal(2).map(|v| p.week = Some(v)).is_some(),
                Field::Week2 => cur.digits(2, 2).and_then(u).map(|v| p.week = Some(v)).is_some(),
                Field::Week => cur.digits(1, 2).and_then(u).map(|v| p.week = Some(v)).is_some(),
                Field::IsoWeekOrdinal => cur.ordinal(2).map(|v| p.iso_week = Some(v)).is_some(),
                Field::IsoWeek2 => cur.digits(2, 2).and_then(u).map(|v| p.iso_week = Some(v)).is_some(),
                Field::IsoWeek => cur.digits(1, 2).and_then(u).map(|v| p.iso_week = Some(v)).is_some(),
                Field::WeekYear4 => cur
                    .digits(4, 4)
                    .and_then(y)
                    .map(|v| p.week_year = Some(v))
                    .is_some(),
                Field::WeekYear2 => cur
                    .digits(2, 2)
                    .map(|v| p.week_year = Some(expand_two_digit_year(v)))
                    .is_some(),
                Field::IsoWeekYear4 => cur
                    .digits(4, 4)
                    .and_then(y)
                    .map(|v| p.iso_week_year = Some(v))
                    .is_some(),
                Field::IsoWeekYear2 => cur
                    .digits(2, 2)
                    .map(|v| p.iso_week_year = Some(expand_two_digit_year(v)))
                    .is_some(),
                Field::Hour24Pad
                | Field::Hour12Pad
                | Field::HourFrom1Pad
                | Field::MinutePad
                | Field::SecondPad => cur.digits(2, 2).is_some(),
                Field::Hour24 | Field::Hour12 | Field::HourFrom1 | Field::Minute | Field::Second => {
                    cur.digits(1, 2).is_some()
                }
                Field::Fraction(n) => cur.digits(n, n).is_some(),
                Field::MeridiemUpper | Field::MeridiemLower => cur.name(&["am", "pm"]).is_some(),
                Field::UnixSeconds => cur.signed_digits().map(|v| p.unix_seconds = Some(v)).is_some(),
                Field::UnixMillis => cur
                    .signed_digits()
                    .map(|v| p.unix_seconds = Some(v.div_euclid(1000)))
                    .is_some(),
            },
        };
        if !ok {
            return Err(mismatch());
        }
    }
    if !cur.rest.is_empty() {
        return Err(mismatch());
    }

    build_date(&p, locale, default_year).ok_or_else(invalid)
}

fn build_date(p: &Parsed, locale: &Locale, default_year: i32) -> Option<NaiveDate> {
    if let Some(secs) = p.unix_seconds {
        return DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive());
    }

    if p.week.is_some() || p.week_year.is_some() {
        let year = p.week_year.or(p.year)?;
        let week = p.week.unwrap_or(1);
        let offset = p
            .locale_weekday
            .or_else(|| p.weekday.and_then(weekday_from_sunday).map(|d| locale.weekday_offset(d)))
            .unwrap_or(0);
        if week == 0 || week > 53 || offset > 6 {
            return None;
        }
        let date = locale.from_week(year, week, offset)?;
        return (locale.week_year(date)? == year).then_some(date);
    }

    if p.iso_week.is_some() || p.iso_week_year.is_some() {
        let year = p.iso_week_year.or(p.year)?;
        let weekday = match (p.iso_weekday, p.weekday) {
            (Some(e), _) => Weekday::try_from(u8::try_from(e.checked_sub(1)?).ok()?).ok()?,
            (None, Some(d)) => weekday_from_sunday(d)?,
            (None, None) => Weekday::Mon,
        };
        return NaiveDate::from_isoywd_opt(year, p.iso_week.unwrap_or(1), weekday);
    }

    let year = p.year.unwrap_or(default_year);

    let date = if let Some(doy) = p.day_of_year {
        NaiveDate::from_yo_opt(year, doy)?
    } else {
        let month = match (p.month, p.quarter) {
            (Some(m), _) => m,
            (None, Some(q)) if (1..=4).contains(&q) => q * 3 - 2,
            (None, Some(_)) => return None,
            (None, None) => 1,
        };
        NaiveDate::from_ymd_opt(year, month, p.day.unwrap_or(1))?
    };

    match p.weekday {
        Some(d) if date.weekday().num_days_from_sunday() != d => None,
        _ => Some(date),
    }
}

fn weekday_from_sunday(d: u32) -> Option<Weekday> {
    let from_monday = (d + 6) % 7;
    (d < 7).then(|| Weekday::try_from(from_monday as u8).ok()).flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn formats_default_period_formats() {
        let en = Locale::EN;
        let date = ymd(2026, 2, 17);
        assert_eq!(format_date(date, "YYYY-MM-DD", &en), "2026-02-17");
        assert_eq!(format_date(date, "gggg-[W]ww", &en), "2026-W08");
        assert_eq!(format_date(date, "YYYY-MM", &en), "2026-02");
        assert_eq!(format_date(date, "YYYY-[Q]Q", &en), "2026-Q1");
        assert_eq!(format_date(date, "YYYY", &en), "2026");
    }

    #[test]
    fn formats_names_ordinals_and_literals() {
        let en = Locale::EN;
        let date = ymd(2026, 1, 3);
        assert_eq!(
            format_date(date, "dddd, MMMM Do YYYY", &en),
            "Saturday, January 3rd 2026"
        );
        assert_eq!(format_date(date, "ddd MMM D", &en), "Sat Jan 3");
        assert_eq!(format_date(date, "[Week of] YYYY", &en), "Week of 2026");
        assert_eq!(format_date(ymd(2026, 1, 11), "Do", &en), "11th");
        assert_eq!(format_date(ymd(2026, 1, 22), "Do", &en), "22nd");
    }

    #[test]
    fn formats_time_tokens() {
        let en = Locale::EN;
        let at = ymd(2026, 1, 31).and_hms_opt(0, 5, 9).unwrap();
        assert_eq!(format_datetime(at, "HH:mm:ss", &en), "00:05:09");
        assert_eq!(format_datetime(at, "h:mm A", &en), "12:05 AM");
        assert_eq!(format_datetime(at, "k", &en), "24");
    }

    #[test]
    fn unknown_letters_pass_through() {
        assert_eq!(format_date(ymd(2026, 1, 1), "YYYY/z/ZZ", &Locale::EN), "2026/z/ZZ");
    }

    #[test]
    fn iso_and_locale_weeks_differ_around_new_year() {
        let date = ymd(2027, 1, 1); // Friday
        assert_eq!(format_date(date, "gggg-[W]ww", &Locale::EN), "2027-W01");
        assert_eq!(format_date(date, "GGGG-[W]WW", &Locale::EN), "2026-W53");
    }

    #[test]
    fn parses_default_formats() {
        let en = Locale::EN;
        assert_eq!(parse_date("2026-02-17", "YYYY-MM-DD", &en, 2026), Ok(ymd(2026, 2, 17)));
        assert_eq!(parse_date("2026-W08", "gggg-[W]ww", &en, 2026), Ok(ymd(2026, 2, 15)));
        assert_eq!(parse_date("2026-02", "YYYY-MM", &en, 2026), Ok(ymd(2026, 2, 1)));
        assert_eq!(parse_date("2026-Q3", "YYYY-[Q]Q", &en, 2026), Ok(ymd(2026, 7, 1)));
        assert_eq!(parse_date("2026", "YYYY", &en, 2026), Ok(ymd(2026, 1, 1)));
        assert_eq!(parse_date("2026-W53", "GGGG-[W]WW", &en, 2026), Ok(ymd(2026, 12, 28)));
    }

    #[test]
    fn parses_names_and_ordinals() {
        let en = Locale::EN;
        assert_eq!(
            parse_date("Saturday, January 3rd 2026", "dddd, MMMM Do YYYY", &en, 2026),
            Ok(ymd(2026, 1, 3))
        );
        assert_eq!(parse_date("sep 2026", "MMM YYYY", &en, 2026), Ok(ymd(2026, 9, 1)));
    }

    #[test]
    fn strict_parse_rejects_partial_and_invalid_input() {
        let en = Locale::EN;
        assert!(matches!(
            parse_date("2026-02-17 notes", "YYYY-MM-DD", &en, 2026),
            Err(FormatError::Mismatch { .. })
        ));
        assert!(matches!(
            parse_date("2026-2-17", "YYYY-MM-DD", &en, 2026),
            Err(FormatError::Mismatch { .. })
        ));
        assert!(matches!(
            parse_date("2026-02-30", "YYYY-MM-DD", &en, 2026),
            Err(FormatError::InvalidDate { .. })
        ));
        assert!(matches!(
            parse_date("Monday 2026-01-03", "dddd YYYY-MM-DD", &en, 2026),
            Err(FormatError::InvalidDate { .. })
        ));
    }

    #[test]
    fn format_then_parse_recovers_period_start() {
        let en = Locale::EN;
        let mut date = ymd(2025, 12, 20);
        while date < ymd(2026, 1, 20) {
            let week_start = en.week_start(date).unwrap();
            let name = format_date(date, "gggg-[W]ww", &en);
            assert_eq!(parse_date(&name, "gggg-[W]ww", &en, 2026), Ok(week_start), "{name}");
            date = date.succ_opt().unwrap();
        }
    }

    #[test]
    fn week_tokens_at_calendar_edges_render_without_panicking() {
        for locale in [Locale::EN, Locale::ISO] {
            let last = format_date(NaiveDate::MAX, "gggg-[W]ww", &locale);
            assert!(last.starts_with("262142-W"), "{last}");
            let first = format_date(NaiveDate::MIN, "gggg-[W]ww wo", &locale);
            assert!(first.contains("-W"), "{first}");
        }
    }

    #[test]
    fn out_of_range_years_are_rejected() {
        let en = Locale::EN;
        assert!(matches!(
            parse_date("4294969322", "Y", &en, 2026),
            Err(FormatError::Mismatch { .. })
        ));
        assert!(matches!(
            parse_date("-4294965270", "Y", &en, 2026),
            Err(FormatError::Mismatch { .. })
        ));
        assert!(parse_date("300000-W01", "Y-[W]ww", &en, 2026).is_err());
        assert!(parse_date("262143-W01", "gggg-[W]ww", &en, 2026).is_err());
        assert_eq!(parse_date("-2000", "Y", &en, 2026), Ok(ymd(-2000, 1, 1)));
    }

    #[test]
    fn missing_year_comes_from_the_caller() {
        let en = Locale::EN;
        assert_eq!(parse_date("03-14", "MM-DD", &en, 2031), Ok(ymd(2031, 3, 14)));
        assert_eq!(parse_date("03-14", "MM-DD", &en, 1999), Ok(ymd(1999, 3, 14)));
        assert!(matches!(
            parse_date("02-29", "MM-DD", &en, 2027),
            Err(FormatError::InvalidDate { .. })
        ));
    }
}
