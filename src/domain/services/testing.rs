use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::TimeZone;
use chrono::Utc;

use super::Clock;
use super::RandomSource;

/// Plays back the given values in order, then keeps repeating the last one.
pub struct ScriptedRandom {
    values: Vec<f64>,
    index: AtomicUsize,
}

impl ScriptedRandom {
    pub fn new(values: Vec<f64>) -> ScriptedRandom {
        return ScriptedRandom {
            values,
            index: AtomicUsize::new(0),
        };
    }

    pub fn constant(value: f64) -> ScriptedRandom {
        return ScriptedRandom::new(vec![value]);
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&self) -> f64 {
        let idx = self.index.fetch_add(1, Ordering::SeqCst);
        return self.values[idx.min(self.values.len() - 1)];
    }
}

pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(year: i32, month: u32, day: u32) -> FixedClock {
        return FixedClock::at(year, month, day, 10, 0);
    }

    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> FixedClock {
        return FixedClock {
            now: Utc
                .with_ymd_and_hms(year, month, day, hour, minute, 0)
                .unwrap(),
        };
    }

    pub fn date(&self) -> NaiveDate {
        return self.now.date_naive();
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        return self.now;
    }
}
