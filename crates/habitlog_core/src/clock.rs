//! Time source for "today" and creation timestamps.

use chrono::{Local, NaiveDate, TimeZone};

/// Supplies the current local day and wall-clock time.
pub trait Clock {
    /// Current local calendar day.
    fn today(&self) -> NaiveDate;
    /// Current Unix epoch milliseconds.
    fn now_ms(&self) -> i64;
}

/// Clock backed by the system local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now_ms(&self) -> i64 {
        Local::now().timestamp_millis()
    }
}

/// Clock pinned to one day. Timestamps are local midnight of that day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    today: NaiveDate,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn now_ms(&self) -> i64 {
        self.today
            .and_hms_opt(0, 0, 0)
            .and_then(|midnight| Local.from_local_datetime(&midnight).earliest())
            .map_or(0, |dt| dt.timestamp_millis())
    }
}
