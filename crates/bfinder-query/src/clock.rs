//! Time provider abstraction.
//!
//! Every "today" in the system is the current calendar date in the
//! Asia/Kolkata time zone, never the server locale.  Queries take a
//! [`Clock`] instead of reading the wall clock directly so tests can pin
//! today to a literal date.

use chrono::{FixedOffset, NaiveDate, Utc};

/// Asia/Kolkata UTC offset in seconds (+05:30).  The zone has no DST, so a
/// fixed offset is exact.
pub const KOLKATA_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// The Asia/Kolkata offset as a chrono [`FixedOffset`].
pub fn kolkata_offset() -> FixedOffset {
    // The constant is in range, so this cannot fail.
    FixedOffset::east_opt(KOLKATA_OFFSET_SECS).expect("Asia/Kolkata offset is valid")
}

/// Source of the current calendar date.
pub trait Clock: Send + Sync {
    /// The current date in Asia/Kolkata.
    fn today(&self) -> NaiveDate;
}

/// Wall-clock time anchored to Asia/Kolkata.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&kolkata_offset()).date_naive()
    }
}

/// A clock pinned to one date, for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn kolkata_is_five_thirty_ahead() {
        let utc = Utc.with_ymd_and_hms(2024, 3, 14, 22, 45, 0).unwrap();
        let local = utc.with_timezone(&kolkata_offset());
        // 22:45 UTC + 5:30 crosses midnight into the next day.
        assert_eq!(local.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    }

    #[test]
    fn fixed_clock_pins_today() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(FixedClock(date).today(), date);
    }
}
