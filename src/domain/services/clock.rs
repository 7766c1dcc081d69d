#[cfg(test)]
#[path = "clock_test.rs"]
mod tests;

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;

/// Source of the date stamped on documents. Dates are calendar days in UTC,
/// so two portals in different time zones agree on `last_updated`.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        return self.now().date_naive();
    }
}

#[derive(Default)]
pub struct SystemClock {}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        return Utc::now();
    }
}
