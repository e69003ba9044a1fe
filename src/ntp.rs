//! Network Time Protocol (NTP) wire format helpers.
//!
//! Only the pieces this device needs: a version-3 client request and the
//! transmit-timestamp seconds from the server response. Kept free of socket
//! code so the parsing is testable with canned packets.

use crate::unix_seconds::UnixSeconds;
use crate::{Error, Result};

/// UDP port NTP servers listen on.
pub const NTP_PORT: u16 = 123;

/// NTP packets are 48 bytes with no extension fields.
pub const PACKET_LEN: usize = 48;

// Transmit timestamp: seconds since 1900 at bytes 40..44, big-endian.
const TRANSMIT_SECONDS_OFFSET: usize = 40;

/// Build a client request packet: LI=0, VN=3, Mode=3 (client).
#[expect(clippy::indexing_slicing, reason = "fixed-size packet")]
#[must_use]
pub const fn client_request() -> [u8; PACKET_LEN] {
    let mut packet = [0u8; PACKET_LEN];
    packet[0] = 0x1B;
    packet
}

/// Extract the server's transmit timestamp as Unix seconds.
///
/// # Errors
///
/// Returns [`Error::NtpResponseTooShort`] for truncated packets and
/// [`Error::NtpTimestampInvalid`] for timestamps before the Unix epoch.
pub fn transmit_seconds(response: &[u8]) -> Result<UnixSeconds> {
    if response.len() < PACKET_LEN {
        return Err(Error::NtpResponseTooShort);
    }
    let bytes = response
        .get(TRANSMIT_SECONDS_OFFSET..TRANSMIT_SECONDS_OFFSET + 4)
        .and_then(|slice| <[u8; 4]>::try_from(slice).ok())
        .ok_or(Error::NtpResponseTooShort)?;
    let ntp_seconds = u32::from_be_bytes(bytes);
    UnixSeconds::from_ntp_seconds(ntp_seconds).ok_or(Error::NtpTimestampInvalid)
}

#[cfg(test)]
#[expect(
    clippy::indexing_slicing,
    clippy::unwrap_used,
    reason = "test code"
)]
mod tests {
    use super::{PACKET_LEN, client_request, transmit_seconds};
    use crate::Error;
    use crate::unix_seconds::UnixSeconds;

    fn response_with_ntp_seconds(ntp_seconds: u32) -> [u8; PACKET_LEN] {
        let mut packet = [0u8; PACKET_LEN];
        packet[40..44].copy_from_slice(&ntp_seconds.to_be_bytes());
        packet
    }

    #[test]
    fn request_is_version3_client_mode() {
        let packet = client_request();
        assert_eq!(packet.len(), PACKET_LEN);
        assert_eq!(packet[0], 0x1B);
        assert!(packet[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn parses_transmit_timestamp() {
        // 2023-11-14 22:13:20 UTC
        let packet = response_with_ntp_seconds(1_700_000_000 + 2_208_988_800);
        assert_eq!(
            transmit_seconds(&packet).unwrap(),
            UnixSeconds(1_700_000_000)
        );
    }

    #[test]
    fn short_response_is_rejected() {
        let packet = response_with_ntp_seconds(2_208_988_800);
        assert!(matches!(
            transmit_seconds(&packet[..44]),
            Err(Error::NtpResponseTooShort)
        ));
        assert!(matches!(
            transmit_seconds(&packet[..20]),
            Err(Error::NtpResponseTooShort)
        ));
    }

    #[test]
    fn pre_epoch_timestamp_is_rejected() {
        let packet = response_with_ntp_seconds(0);
        assert!(matches!(
            transmit_seconds(&packet),
            Err(Error::NtpTimestampInvalid)
        ));
    }
}
