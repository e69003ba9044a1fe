//! Wi-Fi telemetry node for the Raspberry Pi Pico W.
//!
//! Joins a Wi-Fi network, synchronizes wall-clock time over NTP, and emits
//! one JSON telemetry record (local time, network id, RSSI, battery flag)
//! on a fixed cadence.
//!
//! The hardware-facing pieces live behind the `wifi` feature; everything
//! else is plain `no_std` logic that builds and tests on the host.
#![no_std]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod console;
mod error;
pub mod join;
mod never;
pub mod ntp;
pub mod telemetry;
#[cfg(feature = "wifi")]
pub mod time_sync;
mod unix_seconds;
pub mod wall_clock;
#[cfg(feature = "wifi")]
pub mod wifi;

// Re-export commonly used items
pub use config::TelemetryConfig;
#[cfg(feature = "wifi")]
pub use console::DefmtConsole;
pub use console::Console;
pub use error::{Error, Result};
pub use join::{JoinOutcome, JoinPolicy, JoinSupervisor, LinkStatus};
pub use never::Never;
pub use telemetry::{RECORD_LABEL, SignalSampler, SnapshotEmitter, TelemetryRecord, TimeSource};
#[cfg(feature = "wifi")]
pub use time_sync::NtpTime;
pub use unix_seconds::UnixSeconds;
pub use wall_clock::{TimeOfDay, WallClock};
