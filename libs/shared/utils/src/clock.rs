use chrono::{FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};
use tracing::warn;

/// Source of the shop's local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// The real clock, shifted to the shop's UTC offset.
#[derive(Debug, Clone)]
pub struct ShopClock {
    offset: FixedOffset,
}

impl ShopClock {
    pub fn new(utc_offset_minutes: i32) -> Self {
        let offset = utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                warn!("UTC offset of {} minutes is out of range, falling back to UTC", utc_offset_minutes);
                Utc.fix()
            });
        Self { offset }
    }
}

impl Clock for ShopClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.offset).naive_local()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_reports_its_date() {
        let instant = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap().and_hms_opt(8, 30, 0).unwrap();
        let clock = FixedClock(instant);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
    }

    #[test]
    fn out_of_range_offset_falls_back_to_utc() {
        let clock = ShopClock::new(48 * 60);
        let utc_today = Utc::now().date_naive();
        // Allow for the test straddling midnight.
        assert!((clock.today() - utc_today).num_days().abs() <= 1);
    }

    #[test]
    fn offsets_overflowing_seconds_fall_back_to_utc() {
        for minutes in [i32::MAX, i32::MIN, 40_000_000] {
            assert_eq!(ShopClock::new(minutes).offset, Utc.fix());
        }
        assert_eq!(ShopClock::new(120).offset.local_minus_utc(), 7_200);
    }
}
