//! Offset-aware wall clock backed by a monotonic millisecond counter.
//!
//! The time-sync service refreshes at most once per configured interval, so
//! between refreshes the current time is the last synchronized Unix time
//! plus the monotonic milliseconds elapsed since that sync. The monotonic
//! counter is passed in by the caller rather than read from a timer here,
//! which keeps the clock testable without real wall-clock delays.
//!
//! Before the first successful sync the clock serves the Unix epoch
//! extrapolated from boot, mirroring the stock NTP client's behavior of
//! reporting time-since-epoch-zero rather than failing.

use core::fmt::Write as _;

use time::UtcOffset;

use crate::Result;
use crate::unix_seconds::UnixSeconds;

/// Formatted time-of-day, always exactly `HH:MM:SS`.
pub type TimeOfDay = heapless::String<8>;

/// Local wall clock: last synced Unix time plus elapsed monotonic time.
pub struct WallClock {
    offset: UtcOffset,
    synced_unix: i64,
    synced_at_millis: u64,
}

impl WallClock {
    /// Create a clock with the given UTC offset in minutes (e.g. 180 for UTC+3).
    ///
    /// The clock starts at the Unix epoch until [`set_from_unix`](Self::set_from_unix)
    /// is called with a synchronized timestamp.
    #[must_use]
    pub fn new(utc_offset_minutes: i32) -> Self {
        let offset = UtcOffset::from_whole_seconds(utc_offset_minutes.saturating_mul(60))
            .unwrap_or(UtcOffset::UTC);
        Self {
            offset,
            synced_unix: 0,
            synced_at_millis: 0,
        }
    }

    /// Synchronize the clock to a Unix timestamp observed at `now_millis`
    /// on the monotonic counter.
    pub fn set_from_unix(&mut self, unix_seconds: UnixSeconds, now_millis: u64) {
        self.synced_unix = unix_seconds.as_i64();
        self.synced_at_millis = now_millis;
    }

    /// Current Unix time, extrapolated from the last sync point.
    #[expect(
        clippy::cast_possible_wrap,
        reason = "elapsed seconds fit i64 for any realistic uptime"
    )]
    #[must_use]
    pub fn unix_now(&self, now_millis: u64) -> UnixSeconds {
        let elapsed_secs = now_millis.saturating_sub(self.synced_at_millis) / 1000;
        UnixSeconds(self.synced_unix.saturating_add(elapsed_secs as i64))
    }

    /// Current local time of day, formatted `HH:MM:SS` with zero-padded fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`](crate::Error::Format) if the formatted time
    /// does not fit its fixed-size buffer, which cannot happen for a valid
    /// hour/minute/second triple.
    pub fn time_of_day(&self, now_millis: u64) -> Result<TimeOfDay> {
        let (hours, minutes, seconds) = match self.unix_now(now_millis).to_offset_datetime(self.offset)
        {
            Some(dt) => (dt.hour(), dt.minute(), dt.second()),
            None => (0, 0, 0),
        };
        let mut out = TimeOfDay::new();
        write!(out, "{hours:02}:{minutes:02}:{seconds:02}")?;
        Ok(out)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test code")]
mod tests {
    use super::WallClock;
    use crate::unix_seconds::UnixSeconds;

    #[test]
    fn formats_local_time_with_utc_offset() {
        let mut clock = WallClock::new(180);
        // 2023-11-14 22:13:20 UTC -> 01:13:20 at UTC+3
        clock.set_from_unix(UnixSeconds(1_700_000_000), 10_000);
        assert_eq!(clock.time_of_day(10_000).unwrap().as_str(), "01:13:20");
    }

    #[test]
    fn fields_are_zero_padded() {
        let mut clock = WallClock::new(0);
        // 00:05:09 UTC
        clock.set_from_unix(UnixSeconds(309), 0);
        assert_eq!(clock.time_of_day(0).unwrap().as_str(), "00:05:09");
    }

    #[test]
    fn extrapolates_between_syncs() {
        let mut clock = WallClock::new(0);
        clock.set_from_unix(UnixSeconds(1_700_000_000), 2_000);
        assert_eq!(clock.time_of_day(2_000).unwrap().as_str(), "22:13:20");
        assert_eq!(clock.time_of_day(7_000).unwrap().as_str(), "22:13:25");
        assert_eq!(clock.time_of_day(62_000).unwrap().as_str(), "22:14:20");
    }

    #[test]
    fn unsynced_clock_serves_epoch_from_boot() {
        let clock = WallClock::new(0);
        assert_eq!(clock.time_of_day(0).unwrap().as_str(), "00:00:00");
        assert_eq!(clock.time_of_day(90_000).unwrap().as_str(), "00:01:30");
    }

    #[test]
    fn resync_replaces_extrapolation_base() {
        let mut clock = WallClock::new(0);
        clock.set_from_unix(UnixSeconds(100), 0);
        clock.set_from_unix(UnixSeconds(1_700_000_000), 60_000);
        assert_eq!(clock.time_of_day(60_000).unwrap().as_str(), "22:13:20");
    }
}
