use chrono::{DateTime, NaiveDate, Utc};

use crate::models::projections::{HalvingCountdown, TimeLeft};

/// Estimated date of the next Bitcoin halving (2028-04-15).
pub fn next_halving() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2028, 4, 15)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or_default()
}

/// Time remaining until scheduled instants. `now` is always supplied by the caller.
pub struct CountdownService;

impl CountdownService {
    pub fn new() -> Self {
        Self
    }

    /// Days/hours/minutes/seconds until `target`, or `None` once it has passed.
    pub fn time_left(&self, target: DateTime<Utc>, now: DateTime<Utc>) -> Option<TimeLeft> {
        let remaining = (target - now).num_seconds();
        if remaining <= 0 {
            return None;
        }
        Some(TimeLeft {
            days: remaining / 86_400,
            hours: remaining / 3_600 % 24,
            minutes: remaining / 60 % 60,
            seconds: remaining % 60,
        })
    }

    /// Countdown to the start (midnight UTC) of an estimated purchase date.
    pub fn until_date(&self, date: NaiveDate, now: DateTime<Utc>) -> Option<TimeLeft> {
        let target = date.and_hms_opt(0, 0, 0)?.and_utc();
        self.time_left(target, now)
    }

    /// Years/days/hours until the next halving; all zero once it has passed.
    pub fn halving(&self, now: DateTime<Utc>) -> HalvingCountdown {
        let remaining = (next_halving() - now).num_seconds();
        if remaining <= 0 {
            return HalvingCountdown::default();
        }
        let days = remaining / 86_400;
        HalvingCountdown {
            years: days / 365,
            days,
            hours: remaining / 3_600 % 24,
        }
    }
}

impl Default for CountdownService {
    fn default() -> Self {
        Self::new()
    }
}
