//! Compile-time configuration for the telemetry node.
//!
//! The original device exposes no runtime configuration at all: network
//! credentials, the time server, the UTC offset, and both timing constants
//! are fixed at build time. Rather than ambient globals, they are collected
//! into one immutable value that is passed into each component, so the
//! components stay independently testable with mock values.

/// Immutable build-time configuration, passed by value into each component.
#[derive(Debug, Clone, Copy)]
pub struct TelemetryConfig {
    /// Identifier of the network to join (SSID).
    pub ssid: &'static str,
    /// Credential for the network join.
    pub password: &'static str,
    /// NTP server queried for wall-clock time.
    pub ntp_server: &'static str,
    /// Local-time offset from UTC, in minutes.
    pub utc_offset_minutes: i32,
    /// Interval between telemetry snapshots, in milliseconds.
    pub cadence_ms: u32,
    /// Interval between link-status polls while joining, in milliseconds.
    pub join_poll_ms: u32,
    /// Minimum interval between NTP refresh attempts, in milliseconds.
    pub sync_interval_ms: u64,
}

impl TelemetryConfig {
    /// Create a configuration with the stock timing constants and the
    /// given network credentials.
    #[must_use]
    pub const fn new(ssid: &'static str, password: &'static str) -> Self {
        Self {
            ssid,
            password,
            ntp_server: "pool.ntp.org",
            utc_offset_minutes: 3 * 60,
            cadence_ms: 5_000,
            join_poll_ms: 500,
            sync_interval_ms: 60_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TelemetryConfig;

    #[test]
    fn stock_constants_match_device_defaults() {
        let config = TelemetryConfig::new("TestNet", "secret");
        assert_eq!(config.ssid, "TestNet");
        assert_eq!(config.password, "secret");
        assert_eq!(config.ntp_server, "pool.ntp.org");
        assert_eq!(config.utc_offset_minutes, 180);
        assert_eq!(config.cadence_ms, 5_000);
        assert_eq!(config.join_poll_ms, 500);
        assert_eq!(config.sync_interval_ms, 60_000);
    }
}
