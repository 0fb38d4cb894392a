//! Time window and timezone types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{AppError, Result};

/// A timezone given either by IANA name or by a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Zone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl Zone {
    /// Calendar date of `instant` in this zone.
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.localize(instant).date_naive()
    }

    /// View an instant in this zone.
    pub fn localize(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self {
            Zone::Named(tz) => instant.with_timezone(tz).fixed_offset(),
            Zone::Fixed(offset) => instant.with_timezone(offset),
        }
    }

    /// Resolve a local wall-clock time to an instant.
    ///
    /// Ambiguous times (DST fall-back) resolve to the earlier instant.
    pub fn resolve(&self, local: NaiveDateTime) -> Result<DateTime<Utc>> {
        let resolved = match self {
            Zone::Named(tz) => tz
                .from_local_datetime(&local)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            Zone::Fixed(offset) => offset
                .from_local_datetime(&local)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
        };
        resolved.ok_or_else(|| AppError::window(format!("{local} does not exist in {self}")))
    }
}

impl FromStr for Zone {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.starts_with('+') || s.starts_with('-') {
            return s
                .parse::<FixedOffset>()
                .map(Zone::Fixed)
                .map_err(|e| AppError::config(format!("Invalid UTC offset '{s}': {e}")));
        }
        s.parse::<Tz>()
            .map(Zone::Named)
            .map_err(|e| AppError::config(format!("Unknown timezone '{s}': {e}")))
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Named(tz) => write!(f, "{}", tz.name()),
            Zone::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

/// Half-open interval `[start, end)` of instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(AppError::window(format!(
                "window start {start} is not before end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Both bounds viewed in `zone`.
    pub fn bounds_in(&self, zone: &Zone) -> (DateTime<FixedOffset>, DateTime<FixedOffset>) {
        (zone.localize(self.start), zone.localize(self.end))
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_zones() {
        assert!(matches!("Asia/Shanghai".parse::<Zone>(), Ok(Zone::Named(_))));
        assert!(matches!("UTC".parse::<Zone>(), Ok(Zone::Named(_))));
        assert!(matches!("+08:00".parse::<Zone>(), Ok(Zone::Fixed(_))));
        assert!("Mars/Olympus".parse::<Zone>().is_err());
    }

    #[test]
    fn test_window_is_half_open() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 2, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 5, 2, 2, 0, 0).unwrap();
        let window = TimeWindow::new(start, end).unwrap();
        assert!(window.contains(start));
        assert!(!window.contains(end));
        assert!(TimeWindow::new(end, start).is_err());
    }

    #[test]
    fn test_dst_gap_is_an_error() {
        let zone: Zone = "America/New_York".parse().unwrap();
        let missing = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        assert!(zone.resolve(missing).is_err());
    }
}
