use basalt_core::ports::ClockPort;
use chrono::{Local, NaiveDate, Utc};

/// Wall clock in the user's local time zone.
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
