use chrono::{Local, NaiveDate, NaiveDateTime};

/// Source of "now" for stamping and day boundaries. The service and the
/// backfill job only ever read time through this trait, so tests can pin it.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Server-local wall clock. All timestamps in the system come from here;
/// clients never supply times.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[cfg(test)]
pub mod fixed {
    use super::*;
    use chrono::Duration;
    use std::sync::{Arc, Mutex};

    /// Test clock pinned to an explicit instant.
    pub struct FixedClock {
        now: Mutex<NaiveDateTime>,
    }

    impl FixedClock {
        pub fn at(datetime: &str) -> Arc<Self> {
            let now = NaiveDateTime::parse_from_str(datetime, "%Y-%m-%dT%H:%M:%S")
                .expect("valid datetime literal");
            Arc::new(Self { now: Mutex::new(now) })
        }

        pub fn set(&self, datetime: &str) {
            let now = NaiveDateTime::parse_from_str(datetime, "%Y-%m-%dT%H:%M:%S")
                .expect("valid datetime literal");
            *self.now.lock().unwrap() = now;
        }

        pub fn advance(&self, duration: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += duration;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> NaiveDateTime {
            *self.now.lock().unwrap()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixed::FixedClock;
    use super::*;
    use chrono::Duration;

    #[test]
    fn fixed_clock_pins_and_advances() {
        let clock = FixedClock::at("2026-02-02T09:15:00");
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 2, 2).unwrap());

        clock.advance(Duration::hours(20));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 2, 3).unwrap());

        clock.set("2026-03-01T00:00:00");
        assert_eq!(clock.now().to_string(), "2026-03-01 00:00:00");
    }
}
