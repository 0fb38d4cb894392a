// src/services/window.rs

//! Crawl window computation.
//!
//! A window ends at the most recent anchor hour of "today" in the scheduling
//! zone and starts at the anchor before it. With a single anchor this is
//! exactly 24 hours; with several anchors (e.g. morning and evening runs) the
//! window spans the gap between two consecutive anchors.
//!
//! All arithmetic is done on instants, so anchors that fall next to a DST
//! switch or past midnight in UTC need no special handling.

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};

use crate::error::{AppError, Result};
use crate::models::{TimeWindow, Zone};

/// Computes "since last run" windows from a zone and its anchor hours.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeWindowCalculator {
    zone: Zone,
    anchors: Vec<u32>,
}

impl TimeWindowCalculator {
    /// Create a calculator. Anchor hours are sorted and deduplicated.
    pub fn new(zone: Zone, anchor_hours: &[u32]) -> Result<Self> {
        let mut anchors = anchor_hours.to_vec();
        anchors.sort_unstable();
        anchors.dedup();

        if anchors.is_empty() {
            return Err(AppError::config("At least one anchor hour is required"));
        }
        if let Some(hour) = anchors.iter().find(|h| **h > 23) {
            return Err(AppError::config(format!(
                "Anchor hour {hour} is out of range 0-23"
            )));
        }
        Ok(Self { zone, anchors })
    }

    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    pub fn anchors(&self) -> &[u32] {
        &self.anchors
    }

    /// The window that closes at the current run's anchor.
    ///
    /// The anchor is picked on the local clock, so only that one anchor is
    /// resolved to an instant.
    pub fn window_at(&self, now: DateTime<Utc>) -> Result<TimeWindow> {
        let local_now = self.zone.localize(now).naive_local();
        let chosen = self
            .anchors
            .iter()
            .rposition(|hour| local_now.hour() >= *hour)
            .unwrap_or(0);
        let end = self.anchor_on(local_now.date(), self.anchors[chosen])?;

        let start = end - Duration::hours(i64::from(self.gap_before(chosen)));
        TimeWindow::new(start, end)
    }

    fn anchor_on(&self, date: NaiveDate, hour: u32) -> Result<DateTime<Utc>> {
        let local = date
            .and_hms_opt(hour, 0, 0)
            .ok_or_else(|| AppError::window(format!("invalid anchor hour {hour}")))?;
        self.zone.resolve(local)
    }

    /// Hours between anchor `idx` and the one preceding it, cyclically.
    fn gap_before(&self, idx: usize) -> u32 {
        let hour = self.anchors[idx];
        if idx == 0 {
            let last = self.anchors[self.anchors.len() - 1];
            24 - last + hour
        } else {
            hour - self.anchors[idx - 1]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{FixedOffset, TimeZone};

    fn utc8() -> Zone {
        Zone::Fixed(FixedOffset::east_opt(8 * 3600).unwrap())
    }

    fn at(zone: FixedOffset, y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        zone.with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_daily_window_in_fixed_offset_zone() {
        let offset = FixedOffset::east_opt(8 * 3600).unwrap();
        let calc = TimeWindowCalculator::new(utc8(), &[10]).unwrap();
        let window = calc.window_at(at(offset, 2024, 5, 1, 15)).unwrap();

        assert_eq!(window.start(), at(offset, 2024, 4, 30, 10));
        assert_eq!(window.end(), at(offset, 2024, 5, 1, 10));

        let (start, end) = window.bounds_in(&utc8());
        assert_eq!(start.to_rfc3339(), "2024-04-30T10:00:00+08:00");
        assert_eq!(end.to_rfc3339(), "2024-05-01T10:00:00+08:00");
    }

    #[test]
    fn test_window_crosses_utc_midnight() {
        let offset = FixedOffset::east_opt(8 * 3600).unwrap();
        let calc = TimeWindowCalculator::new(utc8(), &[2]).unwrap();
        let window = calc.window_at(at(offset, 2024, 5, 1, 9)).unwrap();

        let (start, end) = window.bounds_in(&"UTC".parse().unwrap());
        assert_eq!(start.to_rfc3339(), "2024-04-29T18:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-04-30T18:00:00+00:00");
    }

    #[test]
    fn test_split_anchors() {
        let offset = FixedOffset::east_opt(8 * 3600).unwrap();
        let calc = TimeWindowCalculator::new(utc8(), &[22, 10]).unwrap();

        let evening = calc.window_at(at(offset, 2024, 5, 1, 23)).unwrap();
        assert_eq!(evening.start(), at(offset, 2024, 5, 1, 10));
        assert_eq!(evening.end(), at(offset, 2024, 5, 1, 22));

        let morning = calc.window_at(at(offset, 2024, 5, 1, 15)).unwrap();
        assert_eq!(morning.start(), at(offset, 2024, 4, 30, 22));
        assert_eq!(morning.end(), at(offset, 2024, 5, 1, 10));
    }

    #[test]
    fn test_window_is_24_hours_across_dst() {
        let zone: Zone = "America/New_York".parse().unwrap();
        let calc = TimeWindowCalculator::new(zone, &[10]).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 18, 0, 0).unwrap();
        let window = calc.window_at(now).unwrap();

        assert_eq!(window.end() - window.start(), Duration::hours(24));
        assert_eq!(window.end(), Utc.with_ymd_and_hms(2024, 3, 10, 14, 0, 0).unwrap());
    }

    #[test]
    fn test_skipped_anchor_in_dst_gap_is_not_resolved() {
        // 02:00 does not exist in New York on 2024-03-10
        let zone: Zone = "America/New_York".parse().unwrap();
        let calc = TimeWindowCalculator::new(zone, &[2, 10, 18]).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap();
        let window = calc.window_at(now).unwrap();

        assert_eq!(window.start(), Utc.with_ymd_and_hms(2024, 3, 10, 14, 0, 0).unwrap());
        assert_eq!(window.end(), Utc.with_ymd_and_hms(2024, 3, 10, 22, 0, 0).unwrap());
    }

    #[test]
    fn test_chosen_anchor_in_dst_gap_fails() {
        let zone: Zone = "America/New_York".parse().unwrap();
        let calc = TimeWindowCalculator::new(zone, &[2, 10, 18]).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 7, 30, 0).unwrap();
        assert!(calc.window_at(now).is_err());
    }

    #[test]
    fn test_rejects_bad_anchors() {
        assert!(TimeWindowCalculator::new(utc8(), &[]).is_err());
        assert!(TimeWindowCalculator::new(utc8(), &[24]).is_err());
    }

    #[test]
    fn test_is_pure() {
        let offset = FixedOffset::east_opt(8 * 3600).unwrap();
        let calc = TimeWindowCalculator::new(utc8(), &[10]).unwrap();
        let now = at(offset, 2024, 5, 1, 15);
        assert_eq!(calc.window_at(now).unwrap(), calc.window_at(now).unwrap());
    }
}
