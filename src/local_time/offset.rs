//! Fixed display offset and presentation formatting.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeDelta, Utc};
use mockable::Clock;
use thiserror::Error;

/// Text shown in place of an absent timestamp.
pub const UNSPECIFIED: &str = "unspecified";

const SECONDS_PER_HOUR: i32 = 3600;

/// Error returned when an offset is outside the range of real time zones.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("display offset {0}h is outside -12..=14")]
pub struct InvalidOffset(pub i32);

/// Presentation granularity for formatted timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayStyle {
    /// `dd.mm.yyyy HH:MM`.
    #[default]
    DateTime,
    /// `dd.mm.yyyy`.
    Date,
}

impl DisplayStyle {
    const fn pattern(self) -> &'static str {
        match self {
            Self::DateTime => "%d.%m.%Y %H:%M",
            Self::Date => "%d.%m.%Y",
        }
    }
}

/// Constant whole-hour shift between UTC and the user-facing clock.
///
/// No daylight-saving rules apply, so converting to local time and back is
/// a lossless shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOffset {
    hours: i32,
    offset: FixedOffset,
}

impl DisplayOffset {
    /// Smallest accepted offset in hours.
    pub const MIN_HOURS: i32 = -12;
    /// Largest accepted offset in hours.
    pub const MAX_HOURS: i32 = 14;
    /// Offset used when none is configured.
    pub const DEFAULT_HOURS: i32 = 5;

    /// Creates an offset of `hours` east of UTC.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidOffset`] when `hours` is outside
    /// [`Self::MIN_HOURS`]..=[`Self::MAX_HOURS`].
    pub fn from_hours(hours: i32) -> Result<Self, InvalidOffset> {
        if !(Self::MIN_HOURS..=Self::MAX_HOURS).contains(&hours) {
            return Err(InvalidOffset(hours));
        }
        let offset = FixedOffset::east_opt(hours * SECONDS_PER_HOUR).ok_or(InvalidOffset(hours))?;
        Ok(Self { hours, offset })
    }

    /// Returns the offset in hours.
    #[must_use]
    pub const fn hours(self) -> i32 {
        self.hours
    }

    /// Converts an absolute instant to wall-clock time in this offset.
    ///
    /// Instants whose local time falls outside chrono's range saturate at
    /// [`NaiveDateTime::MIN`] or [`NaiveDateTime::MAX`].
    #[must_use]
    pub fn to_local(self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant
            .naive_utc()
            .checked_add_signed(self.shift())
            .unwrap_or(if self.hours < 0 {
                NaiveDateTime::MIN
            } else {
                NaiveDateTime::MAX
            })
    }

    /// Interprets a wall-clock time in this offset as an absolute instant.
    ///
    /// Returns `None` when the shifted instant is not representable.
    #[must_use]
    pub fn to_utc(self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        local
            .checked_sub_signed(self.shift())
            .map(|shifted| shifted.and_utc())
    }

    fn shift(self) -> TimeDelta {
        TimeDelta::seconds(i64::from(self.offset.local_minus_utc()))
    }

    /// Returns the current wall-clock time in this offset.
    #[must_use]
    pub fn now_local(self, clock: &impl Clock) -> NaiveDateTime {
        self.to_local(clock.utc())
    }

    /// Formats an optional instant for display.
    ///
    /// An absent instant renders as [`UNSPECIFIED`].
    #[must_use]
    pub fn format(self, instant: Option<DateTime<Utc>>, style: DisplayStyle) -> String {
        instant.map_or_else(
            || UNSPECIFIED.to_owned(),
            |value| self.to_local(value).format(style.pattern()).to_string(),
        )
    }
}

impl Default for DisplayOffset {
    fn default() -> Self {
        Self::from_hours(Self::DEFAULT_HOURS).unwrap_or(Self {
            hours: 0,
            offset: Utc.fix(),
        })
    }
}
