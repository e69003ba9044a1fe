//! Telemetry snapshot record and the fixed-cadence emitter.
//!
//! Each cycle builds one [`TelemetryRecord`] from the current time, the
//! configured network id, and a fresh signal-strength sample, serializes it
//! to one compact JSON line, and writes a label line plus the record line to
//! the console. Records live for exactly one cycle; nothing persists.
//!
//! Time, signal sampling, output, and the cadence delay are all injected,
//! so the emitter's externally visible behavior (key order, label text,
//! cadence) is testable on the host.

use embedded_hal_async::delay::DelayNs;
use serde::Serialize;

use crate::console::Console;
use crate::never::Never;
use crate::wall_clock::TimeOfDay;
use crate::{Error, Result};

/// Label line printed before every serialized record.
///
/// Kept verbatim from the original device as an external contract; the
/// tooling on the other end of the serial link matches on it.
pub const RECORD_LABEL: &str = "JSON Verisi:";

/// Upper bound for one serialized record: four fixed keys plus an SSID of
/// at most 32 bytes (with JSON escaping headroom).
pub const RECORD_JSON_MAX: usize = 160;

/// Serialized form of one record.
pub type RecordJson = heapless::String<RECORD_JSON_MAX>;

/// Provider of synchronized wall-clock time.
pub trait TimeSource {
    /// Best-effort refresh from the backing time service.
    ///
    /// Failures are tolerated by design: implementations log them and keep
    /// serving the last-known (extrapolated) time, so a stale value flows
    /// into the next record instead of aborting the cycle.
    async fn refresh(&mut self);

    /// Current local time of day, `HH:MM:SS`.
    ///
    /// # Errors
    ///
    /// Returns an error only if formatting into the fixed-size buffer
    /// fails, which cannot happen for a valid time.
    fn time_of_day(&mut self) -> Result<TimeOfDay>;
}

/// Provider of the current received signal strength.
pub trait SignalSampler {
    /// Current RSSI in dBm. Sampling failures yield the implementation's
    /// default or last-known value rather than an error.
    async fn rssi_dbm(&mut self) -> i32;
}

/// One telemetry snapshot. Field order is the wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelemetryRecord<'a> {
    /// Local time of day the snapshot was taken, `HH:MM:SS`.
    #[serde(rename = "Time")]
    pub time: &'a str,
    /// Identifier of the associated network.
    #[serde(rename = "AP_ID")]
    pub ap_id: &'a str,
    /// Received signal strength in dBm at sampling time.
    #[serde(rename = "RSSI")]
    pub rssi: i32,
    /// Battery flag; always `false` until a battery sensor exists.
    #[serde(rename = "LowBattery")]
    pub low_battery: bool,
}

impl<'a> TelemetryRecord<'a> {
    /// Assemble a fully populated record for one cycle.
    #[must_use]
    pub const fn new(time: &'a str, ap_id: &'a str, rssi: i32) -> Self {
        Self {
            time,
            ap_id,
            rssi,
            low_battery: false,
        }
    }

    /// Serialize to one compact JSON line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordEncode`] if the record does not fit
    /// [`RECORD_JSON_MAX`] bytes, which cannot happen for SSIDs within the
    /// 32-byte Wi-Fi limit.
    pub fn to_json(&self) -> Result<RecordJson> {
        serde_json_core::to_string(self).map_err(|_| Error::RecordEncode)
    }
}

/// Fixed-cadence telemetry loop: snapshot, serialize, print, sleep.
pub struct SnapshotEmitter {
    network_id: &'static str,
    cadence_ms: u32,
}

impl SnapshotEmitter {
    /// Create an emitter for the given network id and cadence.
    #[must_use]
    pub const fn new(network_id: &'static str, cadence_ms: u32) -> Self {
        Self {
            network_id,
            cadence_ms,
        }
    }

    /// Run one cycle: refresh time, sample RSSI, emit, then wait one
    /// cadence interval.
    ///
    /// The wait comes last and is the only suspension point besides the
    /// injected collaborators, so consecutive records are spaced by the
    /// cadence regardless of how long serialization takes.
    ///
    /// # Errors
    ///
    /// Propagates formatting and serialization errors; neither occurs for
    /// the fixed record shape.
    pub async fn tick<T, S, C, D>(
        &mut self,
        time: &mut T,
        sampler: &mut S,
        console: &mut C,
        delay: &mut D,
    ) -> Result<()>
    where
        T: TimeSource,
        S: SignalSampler,
        C: Console,
        D: DelayNs,
    {
        time.refresh().await;
        let rssi = sampler.rssi_dbm().await;
        let stamp = time.time_of_day()?;
        let record = TelemetryRecord::new(stamp.as_str(), self.network_id, rssi);
        let json = record.to_json()?;

        console.line(RECORD_LABEL);
        console.line(json.as_str());

        delay.delay_ms(self.cadence_ms).await;
        Ok(())
    }

    /// Run cycles forever. This is the device's single steady state.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`tick`](Self::tick); see there.
    pub async fn run<T, S, C, D>(
        &mut self,
        time: &mut T,
        sampler: &mut S,
        console: &mut C,
        delay: &mut D,
    ) -> Result<Never>
    where
        T: TimeSource,
        S: SignalSampler,
        C: Console,
        D: DelayNs,
    {
        loop {
            self.tick(time, sampler, console, delay).await?;
        }
    }
}

#[cfg(test)]
#[expect(
    clippy::arithmetic_side_effects,
    clippy::unwrap_used,
    reason = "test code"
)]
mod tests {
    use embassy_futures::block_on;
    use embedded_hal_async::delay::DelayNs;

    use super::{RECORD_LABEL, SignalSampler, SnapshotEmitter, TelemetryRecord, TimeSource};
    use crate::Result;
    use crate::console::Console;
    use crate::wall_clock::TimeOfDay;

    struct FixedTime(&'static str);

    impl TimeSource for FixedTime {
        async fn refresh(&mut self) {}

        fn time_of_day(&mut self) -> Result<TimeOfDay> {
            let mut out = TimeOfDay::new();
            out.push_str(self.0).unwrap();
            Ok(out)
        }
    }

    struct FixedSignal(i32);

    impl SignalSampler for FixedSignal {
        async fn rssi_dbm(&mut self) -> i32 {
            self.0
        }
    }

    #[derive(Default)]
    struct RecordingConsole {
        lines: std::vec::Vec<std::string::String>,
    }

    impl Console for RecordingConsole {
        fn line(&mut self, text: &str) {
            self.lines.push(text.into());
        }

        fn progress(&mut self, _text: &str) {}
    }

    #[derive(Default)]
    struct RecordingDelay {
        waits_ns: std::vec::Vec<u64>,
        pending_ns: u64,
    }

    impl RecordingDelay {
        fn finish_wait(&mut self) {
            if self.pending_ns > 0 {
                self.waits_ns.push(self.pending_ns);
                self.pending_ns = 0;
            }
        }
    }

    impl DelayNs for RecordingDelay {
        async fn delay_ns(&mut self, ns: u32) {
            self.pending_ns += u64::from(ns);
        }
    }

    #[test]
    fn record_serializes_with_fixed_key_order() {
        let record = TelemetryRecord::new("14:05:09", "TestNet", -42);
        assert_eq!(
            record.to_json().unwrap().as_str(),
            r#"{"Time":"14:05:09","AP_ID":"TestNet","RSSI":-42,"LowBattery":false}"#
        );
    }

    #[test]
    fn low_battery_is_always_false() {
        let record = TelemetryRecord::new("00:00:00", "Net", 0);
        assert!(!record.low_battery);
        assert!(record.to_json().unwrap().contains(r#""LowBattery":false"#));
    }

    #[test]
    fn identical_records_serialize_identically() {
        let a = TelemetryRecord::new("14:05:09", "TestNet", -42);
        let b = TelemetryRecord::new("14:05:09", "TestNet", -42);
        assert_eq!(a, b);
        assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
    }

    #[test]
    fn tick_emits_label_then_record() {
        let mut emitter = SnapshotEmitter::new("TestNet", 5_000);
        let mut time = FixedTime("14:05:09");
        let mut sampler = FixedSignal(-42);
        let mut console = RecordingConsole::default();
        let mut delay = RecordingDelay::default();

        block_on(emitter.tick(&mut time, &mut sampler, &mut console, &mut delay)).unwrap();

        assert_eq!(
            console.lines,
            [
                RECORD_LABEL,
                r#"{"Time":"14:05:09","AP_ID":"TestNet","RSSI":-42,"LowBattery":false}"#,
            ]
        );
    }

    #[test]
    fn tick_waits_one_cadence_interval_after_emitting() {
        let mut emitter = SnapshotEmitter::new("TestNet", 5_000);
        let mut time = FixedTime("14:05:09");
        let mut sampler = FixedSignal(-42);
        let mut console = RecordingConsole::default();
        let mut delay = RecordingDelay::default();

        for _ in 0..3 {
            block_on(emitter.tick(&mut time, &mut sampler, &mut console, &mut delay)).unwrap();
            delay.finish_wait();
        }

        assert_eq!(delay.waits_ns, [5_000_000_000; 3]);
    }
}
