use chrono::NaiveDate;

pub trait ClockPort: Send + Sync {
    fn now_ms(&self) -> i64;

    /// The user's current local calendar day.
    fn today(&self) -> NaiveDate;
}
