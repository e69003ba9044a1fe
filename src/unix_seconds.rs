//! Units-safe Unix timestamp wrapper.

use defmt::Format;
use time::{OffsetDateTime, UtcOffset};

// Seconds between the NTP epoch (1900-01-01) and the Unix epoch (1970-01-01).
const NTP_TO_UNIX_SECONDS: i64 = 2_208_988_800;

/// Seconds since 1970-01-01 00:00:00 UTC.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Format)]
pub struct UnixSeconds(pub i64);

impl UnixSeconds {
    /// The underlying i64 value.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }

    /// Re-base an NTP-era timestamp (seconds since 1900) onto the Unix epoch.
    ///
    /// Returns `None` for timestamps before 1970, which from a live server
    /// can only mean a mangled response.
    #[must_use]
    pub fn from_ntp_seconds(ntp_seconds: u32) -> Option<Self> {
        match i64::from(ntp_seconds).checked_sub(NTP_TO_UNIX_SECONDS) {
            Some(unix) if unix >= 0 => Some(Self(unix)),
            _ => None,
        }
    }

    /// View this instant as a calendar date-time in the given timezone.
    #[must_use]
    pub fn to_offset_datetime(self, offset: UtcOffset) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp(self.as_i64())
            .ok()
            .map(|dt| dt.to_offset(offset))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test code")]
mod tests {
    use super::UnixSeconds;
    use time::UtcOffset;

    #[test]
    fn ntp_epoch_maps_to_unix_epoch() {
        let unix = UnixSeconds::from_ntp_seconds(2_208_988_800);
        assert_eq!(unix, Some(UnixSeconds(0)));
    }

    #[test]
    fn pre_unix_epoch_rejected() {
        assert_eq!(UnixSeconds::from_ntp_seconds(2_208_988_799), None);
        assert_eq!(UnixSeconds::from_ntp_seconds(0), None);
    }

    #[test]
    fn offset_conversion_shifts_clock_time() {
        // 2023-11-14 22:13:20 UTC
        let unix = UnixSeconds(1_700_000_000);
        let offset = UtcOffset::from_whole_seconds(3 * 3600).unwrap();
        let dt = unix.to_offset_datetime(offset).unwrap();
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (1, 13, 20));
    }
}
