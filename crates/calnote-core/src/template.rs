//! Template token expansion for new periodic notes.
//!
//! Recognized placeholders (case-insensitive, whitespace allowed inside
//! the braces):
//!
//! | token | expands to |
//! |-------|-----------|
//! | `{{date}}`, `{{title}}` | the note's filename |
//! | `{{time}}` | current time, `HH:mm` |
//! | `{{date+1d}}`, `{{time-2h:HH:mm}}` | target date at the current time, shifted, optionally with a custom format |
//! | `{{yesterday}}`, `{{tomorrow}}` | adjacent day in the note format |
//! | `{{monday:YYYY-MM-DD}}` | that weekday of the target date's week |
//!
//! Anything else is left untouched.

use std::sync::LazyLock;

use chrono::{Days, NaiveDate, NaiveDateTime, Weekday};
use regex::{Captures, NoExpand, Regex};

use crate::format::{format_date, format_datetime};
use crate::locale::Locale;
use crate::period::{shift, OffsetUnit};

static DATE: LazyLock<Regex> = LazyLock::new(|| token_regex(r"date"));
static TIME: LazyLock<Regex> = LazyLock::new(|| token_regex(r"time"));
static TITLE: LazyLock<Regex> = LazyLock::new(|| token_regex(r"title"));
static YESTERDAY: LazyLock<Regex> = LazyLock::new(|| token_regex(r"yesterday"));
static TOMORROW: LazyLock<Regex> = LazyLock::new(|| token_regex(r"tomorrow"));

static CALC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\{\{\s*(date|time)\s*(([+-]\d+)([yqmwdhs]))?\s*(:.+?)?\}\}")
        .expect("date calc pattern is valid")
});

static WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\{\{\s*(sunday|monday|tuesday|wednesday|thursday|friday|saturday)\s*:(.*?)\}\}",
    )
    .expect("weekday pattern is valid")
});

fn token_regex(name: &str) -> Regex {
    Regex::new(&format!(r"(?i)\{{\{{\s*{name}\s*\}}\}}"))
        .expect("token pattern is valid")
}

/// Inputs for expanding one template.
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    /// Start of the target period.
    pub date: NaiveDate,
    /// Default format, the note's filename format.
    pub format: &'a str,
    pub locale: &'a Locale,
    /// Current wall-clock time.
    pub now: NaiveDateTime,
}

impl TemplateContext<'_> {
    /// The note's filename for this context.
    #[must_use]
    pub fn filename(&self) -> String {
        format_date(self.date, self.format, self.locale)
    }
}

/// Expand every recognized placeholder in `text`.
#[must_use]
pub fn expand_template(text: &str, ctx: &TemplateContext<'_>) -> String {
    let filename = ctx.filename();
    let time = format_datetime(ctx.now, "HH:mm", ctx.locale);

    let out = DATE.replace_all(text, NoExpand(&filename));
    let out = TIME.replace_all(&out, NoExpand(&time));
    let out = TITLE.replace_all(&out, NoExpand(&filename));
    let out = CALC.replace_all(&out, |caps: &Captures<'_>| expand_calc(caps, ctx));

    let out = replace_day(&YESTERDAY, &out, ctx.date.pred_opt(), ctx);
    let out = replace_day(&TOMORROW, &out, ctx.date.succ_opt(), ctx);

    WEEKDAY
        .replace_all(&out, |caps: &Captures<'_>| expand_weekday(caps, ctx))
        .into_owned()
}

/// Replace `token` with `day` in the note format; left as is when the day
/// does not exist.
fn replace_day(
    token: &Regex,
    text: &str,
    day: Option<NaiveDate>,
    ctx: &TemplateContext<'_>,
) -> String {
    match day {
        Some(day) => token
            .replace_all(text, NoExpand(&format_date(day, ctx.format, ctx.locale)))
            .into_owned(),
        None => text.to_string(),
    }
}

fn expand_calc(caps: &Captures<'_>, ctx: &TemplateContext<'_>) -> String {
    let mut at = ctx.date.and_time(ctx.now.time());

    if let (Some(delta), Some(unit)) = (caps.get(3), caps.get(4)) {
        let unit = unit.as_str().chars().next().and_then(OffsetUnit::from_char);
        match (delta.as_str().parse::<i64>(), unit) {
            (Ok(n), Some(unit)) => match shift(at, n, unit) {
                Some(shifted) => at = shifted,
                None => return caps[0].to_string(),
            },
            _ => return caps[0].to_string(),
        }
    }

    match caps.get(5) {
        Some(custom) => format_datetime(at, custom.as_str()[1..].trim(), ctx.locale),
        None => format_datetime(at, ctx.format, ctx.locale),
    }
}

fn expand_weekday(caps: &Captures<'_>, ctx: &TemplateContext<'_>) -> String {
    let Ok(day) = caps[1].parse::<Weekday>() else {
        return caps[0].to_string();
    };
    let offset = Days::new(u64::from(ctx.locale.weekday_offset(day)));
    match ctx
        .locale
        .week_start(ctx.date)
        .and_then(|start| start.checked_add_days(offset))
    {
        Some(date) => format_date(date, caps[2].trim(), ctx.locale),
        None => caps[0].to_string(),
    }
}
