//! NTP-backed [`TimeSource`] running over the Embassy network stack.
//!
//! Queries the configured server over UDP at most once per sync interval
//! and feeds the result into a [`WallClock`]. Between refreshes, and after
//! a failed refresh, the clock extrapolates from the last good sync, so
//! callers always get a time value and a failed query only shows up as a
//! `warn` log plus a slightly staler timestamp.

#![allow(clippy::future_not_send, reason = "single-threaded")]

use defmt::{info, warn};
use embassy_net::{Stack, dns::DnsQueryType, udp};
use embassy_time::{Duration, Instant};

use crate::ntp;
use crate::telemetry::TimeSource;
use crate::unix_seconds::UnixSeconds;
use crate::wall_clock::{TimeOfDay, WallClock};
use crate::{Error, Result};

/// How long to wait for the server's response before giving up.
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Wall-clock time kept in sync with an NTP server.
pub struct NtpTime {
    stack: &'static Stack<'static>,
    server: &'static str,
    clock: WallClock,
    sync_interval_ms: u64,
    last_attempt_millis: Option<u64>,
}

impl NtpTime {
    /// Create an unsynchronized clock that will query `server` over `stack`.
    ///
    /// The first [`refresh`](TimeSource::refresh) call performs the initial
    /// sync; later calls are throttled to one query per `sync_interval_ms`.
    #[must_use]
    pub fn new(
        stack: &'static Stack<'static>,
        server: &'static str,
        utc_offset_minutes: i32,
        sync_interval_ms: u64,
    ) -> Self {
        Self {
            stack,
            server,
            clock: WallClock::new(utc_offset_minutes),
            sync_interval_ms,
            last_attempt_millis: None,
        }
    }

    fn due(&self, now_millis: u64) -> bool {
        match self.last_attempt_millis {
            None => true,
            Some(last) => now_millis.saturating_sub(last) >= self.sync_interval_ms,
        }
    }

    async fn fetch(&self) -> Result<UnixSeconds> {
        let addresses = self
            .stack
            .dns_query(self.server, DnsQueryType::A)
            .await
            .map_err(|_| Error::DnsLookup)?;
        let server_addr = *addresses.first().ok_or(Error::DnsEmpty)?;

        let mut rx_meta = [udp::PacketMetadata::EMPTY; 1];
        let mut rx_buffer = [0; 128];
        let mut tx_meta = [udp::PacketMetadata::EMPTY; 1];
        let mut tx_buffer = [0; 128];
        let mut socket = udp::UdpSocket::new(
            *self.stack,
            &mut rx_meta,
            &mut rx_buffer,
            &mut tx_meta,
            &mut tx_buffer,
        );
        socket.bind(0).map_err(|_| Error::SocketBind)?;

        let request = ntp::client_request();
        socket
            .send_to(&request, (server_addr, ntp::NTP_PORT))
            .await
            .map_err(|_| Error::NtpSend)?;

        let mut response = [0u8; ntp::PACKET_LEN];
        let (n, _from) =
            embassy_time::with_timeout(RESPONSE_TIMEOUT, socket.recv_from(&mut response))
                .await
                .map_err(|_| Error::NtpTimeout)?
                .map_err(|_| Error::NtpReceive)?;

        ntp::transmit_seconds(response.get(..n).ok_or(Error::NtpReceive)?)
    }
}

impl TimeSource for NtpTime {
    async fn refresh(&mut self) {
        let now_millis = Instant::now().as_millis();
        if !self.due(now_millis) {
            return;
        }
        self.last_attempt_millis = Some(now_millis);

        match self.fetch().await {
            Ok(unix_seconds) => {
                info!("time sync: unix_seconds={}", unix_seconds.as_i64());
                self.clock
                    .set_from_unix(unix_seconds, Instant::now().as_millis());
            }
            Err(err) => {
                // Stale data policy: keep extrapolating from the last good
                // sync and try again next interval.
                warn!("time sync failed ({}); serving extrapolated time", err);
            }
        }
    }

    fn time_of_day(&mut self) -> Result<TimeOfDay> {
        self.clock.time_of_day(Instant::now().as_millis())
    }
}
