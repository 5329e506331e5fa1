//! Free-form deadline parsing.

use super::DisplayOffset;
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Absolute formats tried in order; the first match wins.
const DATE_TIME_FORMATS: [&str; 3] = ["%d.%m.%Y %H:%M", "%d/%m/%Y %H:%M", "%Y-%m-%d %H:%M"];
const DATE_FORMATS: [&str; 3] = ["%d.%m.%Y", "%d/%m/%Y", "%Y-%m-%d"];

static RELATIVE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(?:in|через)\s+(\d+)\s*(\p{L}+)\.?$").ok());

/// Reasons a deadline expression could not be understood.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseFailure {
    /// Nothing was entered.
    #[error("deadline text is empty")]
    Empty,

    /// The text matches no supported format.
    #[error("unrecognised deadline '{0}'")]
    Unrecognized(String),

    /// The text parsed but describes a time chrono cannot represent.
    #[error("deadline '{0}' is out of range")]
    OutOfRange(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelativeUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl RelativeUnit {
    fn classify(word: &str) -> Option<Self> {
        match word {
            "m" | "min" | "mins" | "minute" | "minutes" => Some(Self::Minutes),
            "h" | "hr" | "hrs" | "hour" | "hours" => Some(Self::Hours),
            "d" | "day" | "days" => Some(Self::Days),
            "w" | "week" | "weeks" => Some(Self::Weeks),
            _ if word.starts_with("мин") => Some(Self::Minutes),
            _ if word.starts_with('ч') => Some(Self::Hours),
            _ if word.starts_with("нед") => Some(Self::Weeks),
            _ if word.starts_with("дн") || word.starts_with("ден") || word == "д" => {
                Some(Self::Days)
            }
            _ => None,
        }
    }

    fn delta(self, amount: i64) -> Option<TimeDelta> {
        match self {
            Self::Minutes => TimeDelta::try_minutes(amount),
            Self::Hours => TimeDelta::try_hours(amount),
            Self::Days => TimeDelta::try_days(amount),
            Self::Weeks => TimeDelta::try_weeks(amount),
        }
    }
}

/// Parses user-entered deadlines relative to the display offset.
///
/// Absolute dates are tried first in a fixed priority order
/// (`dd.mm.yyyy`, `dd/mm/yyyy`, `yyyy-mm-dd`, each with and without
/// `HH:MM`). A date without a time means the end of that local day.
/// Relative forms (`in 3 days`, `через 2 ч`, `tomorrow`, `послезавтра`)
/// resolve against the current local time. Every result is returned as a
/// UTC instant.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeadlineParser {
    offset: DisplayOffset,
}

impl DeadlineParser {
    /// Creates a parser for the given display offset.
    #[must_use]
    pub const fn new(offset: DisplayOffset) -> Self {
        Self { offset }
    }

    /// Parses `input` with `now` as the reference instant.
    ///
    /// # Errors
    ///
    /// Returns [`ParseFailure`] when the input is empty, matches no supported
    /// form, or overflows the representable range. Callers are expected to
    /// re-prompt.
    pub fn parse(&self, input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, ParseFailure> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ParseFailure::Empty);
        }

        if let Some(local) = parse_absolute(trimmed) {
            return self
                .offset
                .to_utc(local)
                .ok_or_else(|| ParseFailure::OutOfRange(trimmed.to_owned()));
        }

        let normalized = trimmed.to_lowercase();
        let local_now = self.offset.to_local(now);
        parse_keyword(&normalized, local_now)
            .or_else(|| parse_relative(&normalized, local_now))
            .ok_or_else(|| ParseFailure::Unrecognized(trimmed.to_owned()))?
            .and_then(|local| self.offset.to_utc(local))
            .ok_or_else(|| ParseFailure::OutOfRange(trimmed.to_owned()))
    }
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN))
}

fn parse_absolute(input: &str) -> Option<NaiveDateTime> {
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
                .map(end_of_day)
        })
}

/// Named days. The outer `Option` reports a match, the inner one overflow.
fn parse_keyword(input: &str, local_now: NaiveDateTime) -> Option<Option<NaiveDateTime>> {
    let days_ahead = match input {
        "today" | "сегодня" => 0,
        "day after tomorrow" | "послезавтра" => 2,
        "tomorrow" | "завтра" => 1,
        _ => return None,
    };
    Some(
        local_now
            .date()
            .checked_add_days(Days::new(days_ahead))
            .map(end_of_day),
    )
}

fn parse_relative(input: &str, local_now: NaiveDateTime) -> Option<Option<NaiveDateTime>> {
    let captures = RELATIVE.as_ref()?.captures(input)?;
    let unit = RelativeUnit::classify(captures.get(2)?.as_str())?;
    let amount = captures.get(1)?.as_str().parse::<i64>().ok();
    Some(
        amount
            .and_then(|value| unit.delta(value))
            .and_then(|delta| local_now.checked_add_signed(delta)),
    )
}
