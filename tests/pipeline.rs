//! Host-side pipeline tests: join supervision feeding the snapshot
//! emitter, with scripted link status, a shared mock clock, and recorded
//! console output.

#![expect(
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing,
    clippy::unwrap_used,
    reason = "test code"
)]

use std::cell::Cell;
use std::rc::Rc;

use embassy_futures::block_on;
use embedded_hal_async::delay::DelayNs;
use pico_telemetry::{
    Console, JoinOutcome, JoinPolicy, JoinSupervisor, LinkStatus, Result, SignalSampler,
    SnapshotEmitter, TimeOfDay, TimeSource, UnixSeconds, WallClock,
};

/// Shared monotonic millisecond counter, advanced only by [`MockDelay`].
type MockMillis = Rc<Cell<u64>>;

struct MockDelay {
    now: MockMillis,
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.now.set(self.now.get() + u64::from(ns) / 1_000_000);
    }
}

/// Time source backed by a [`WallClock`] reading the shared mock counter.
struct MockClockTime {
    clock: WallClock,
    now: MockMillis,
}

impl MockClockTime {
    fn synced_at_boot(unix: i64, now: MockMillis) -> Self {
        let mut clock = WallClock::new(0);
        clock.set_from_unix(UnixSeconds(unix), 0);
        Self { clock, now }
    }
}

impl TimeSource for MockClockTime {
    async fn refresh(&mut self) {}

    fn time_of_day(&mut self) -> Result<TimeOfDay> {
        self.clock.time_of_day(self.now.get())
    }
}

struct FixedSignal(i32);

impl SignalSampler for FixedSignal {
    async fn rssi_dbm(&mut self) -> i32 {
        self.0
    }
}

struct ScriptedLink {
    polls_until_up: u32,
    checks: u32,
}

impl LinkStatus for ScriptedLink {
    fn is_up(&mut self) -> bool {
        self.checks += 1;
        self.checks > self.polls_until_up
    }
}

/// Records lines and progress fragments in emission order.
#[derive(Default)]
struct RecordingConsole {
    output: Vec<String>,
}

impl Console for RecordingConsole {
    fn line(&mut self, text: &str) {
        self.output.push(format!("line:{text}"));
    }

    fn progress(&mut self, text: &str) {
        self.output.push(format!("progress:{text}"));
    }
}

impl RecordingConsole {
    fn record_lines(&self) -> Vec<&str> {
        self.output
            .iter()
            .filter_map(|entry| entry.strip_prefix("line:"))
            .filter(|line| line.starts_with('{'))
            .collect()
    }
}

/// 14:05:09 UTC as seconds since midnight.
const UNIX_14_05_09: i64 = 14 * 3600 + 5 * 60 + 9;

#[test]
fn join_then_emit_end_to_end() {
    let now: MockMillis = Rc::new(Cell::new(0));
    let mut delay = MockDelay { now: Rc::clone(&now) };
    let mut console = RecordingConsole::default();

    let supervisor = JoinSupervisor::new(JoinPolicy::unbounded(500));
    let mut link = ScriptedLink {
        polls_until_up: 3,
        checks: 0,
    };

    let outcome = block_on(supervisor.supervise(&mut link, &mut console, &mut delay));
    assert_eq!(outcome, JoinOutcome::Connected);

    // Nothing was emitted while the link was still coming up.
    assert!(console.record_lines().is_empty());

    let mut time = MockClockTime::synced_at_boot(UNIX_14_05_09, Rc::clone(&now));
    let mut sampler = FixedSignal(-42);
    let mut emitter = SnapshotEmitter::new("TestNet", 5_000);
    block_on(emitter.tick(&mut time, &mut sampler, &mut console, &mut delay)).unwrap();

    // Join ran at 500ms per poll, so the first record reflects the
    // post-join clock, not 14:05:09 plus zero.
    assert_eq!(now.get(), 3 * 500 + 5_000);
    assert_eq!(
        console.output,
        [
            "progress:Connecting to Wi-Fi",
            "progress:.",
            "progress:.",
            "progress:.",
            "line:",
            "line:Wi-Fi connected",
            "line:JSON Verisi:",
            r#"line:{"Time":"14:05:10","AP_ID":"TestNet","RSSI":-42,"LowBattery":false}"#,
        ]
    );
}

#[test]
fn records_are_spaced_one_cadence_apart() {
    let now: MockMillis = Rc::new(Cell::new(0));
    let mut delay = MockDelay { now: Rc::clone(&now) };
    let mut console = RecordingConsole::default();

    let mut time = MockClockTime::synced_at_boot(UNIX_14_05_09, Rc::clone(&now));
    let mut sampler = FixedSignal(-42);
    let mut emitter = SnapshotEmitter::new("TestNet", 5_000);

    for _ in 0..3 {
        block_on(emitter.tick(&mut time, &mut sampler, &mut console, &mut delay)).unwrap();
    }

    let times: Vec<&str> = console
        .record_lines()
        .iter()
        .map(|line| &line[9..17])
        .collect();
    assert_eq!(times, ["14:05:09", "14:05:14", "14:05:19"]);
}

#[test]
fn emitted_record_matches_serial_contract() {
    let now: MockMillis = Rc::new(Cell::new(0));
    let mut delay = MockDelay { now: Rc::clone(&now) };
    let mut console = RecordingConsole::default();

    let mut time = MockClockTime::synced_at_boot(UNIX_14_05_09, Rc::clone(&now));
    let mut sampler = FixedSignal(-42);
    let mut emitter = SnapshotEmitter::new("TestNet", 5_000);
    block_on(emitter.tick(&mut time, &mut sampler, &mut console, &mut delay)).unwrap();

    assert_eq!(
        console.record_lines(),
        [r#"{"Time":"14:05:09","AP_ID":"TestNet","RSSI":-42,"LowBattery":false}"#]
    );
}
