//! Local calendar-day keys and trailing-window enumeration.
//!
//! # Responsibility
//! - Bucket timestamps by the observer's *local* calendar date.
//! - Enumerate the last N calendar days, including days without notes.
//!
//! # Invariants
//! - Two timestamps share a key iff they fall on the same local date.
//! - Keys order chronologically.
//! - `TrailingDays` yields oldest first and is restartable via `Clone`.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Calendar-day identifier in local time, displayed as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Builds a key from calendar components. Returns `None` for invalid dates.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The next calendar day, `None` at the maximum representable date.
    pub fn succ(&self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    /// UTC bounds `[start, end)` of this local day in `tz`.
    ///
    /// Midnight that does not exist locally (DST gap) resolves to the
    /// earliest valid instant after it.
    pub fn utc_bounds<Tz: TimeZone>(&self, tz: &Tz) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = local_midnight_utc(self.0, tz)?;
        let end = local_midnight_utc(self.succ()?.0, tz)?;
        Some((start, end))
    }
}

impl Display for DateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DateKey {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map(Self)
    }
}

impl From<NaiveDate> for DateKey {
    fn from(value: NaiveDate) -> Self {
        Self(value)
    }
}

/// Maps an instant to its calendar date as observed in `tz`.
pub fn local_date_key<Tz: TimeZone>(timestamp: &DateTime<Utc>, tz: &Tz) -> DateKey {
    DateKey(timestamp.with_timezone(tz).date_naive())
}

/// Today's key in `tz`.
pub fn today_key<Tz: TimeZone>(tz: &Tz) -> DateKey {
    local_date_key(&Utc::now(), tz)
}

/// Returns the trailing window of `days` calendar days ending at `today`.
///
/// `days == 0` yields nothing. The window is clipped at the minimum
/// representable date.
pub fn trailing_days(today: DateKey, days: u32) -> TrailingDays {
    let first = today
        .0
        .checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
        .unwrap_or(NaiveDate::MIN);
    let remaining = if days == 0 {
        0
    } else {
        (today.0 - first).num_days() as u32 + 1
    };
    TrailingDays {
        next: DateKey(first),
        remaining,
    }
}

/// Lazy iterator over consecutive calendar days, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailingDays {
    next: DateKey,
    remaining: u32,
}

impl Iterator for TrailingDays {
    type Item = DateKey;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next;
        self.remaining -= 1;
        if self.remaining > 0 {
            match current.succ() {
                Some(next) => self.next = next,
                None => self.remaining = 0,
            }
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TrailingDays {}

fn local_midnight_utc<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<DateTime<Utc>> {
    let mut candidate = date.and_time(NaiveTime::MIN);
    // DST gaps are at most a few hours; probe forward in 15 minute steps.
    for _ in 0..(4 * 24) {
        if let Some(local) = tz.from_local_datetime(&candidate).earliest() {
            return Some(local.with_timezone(&Utc));
        }
        candidate += chrono::Duration::minutes(15);
    }
    None
}
