//! Telemetry node firmware for the Raspberry Pi Pico W.
//!
//! Joins the Wi-Fi network named at build time, synchronizes the clock over
//! NTP, and emits one JSON telemetry record every five seconds.
//!
//! Credentials come from `.env` / environment variables at build time; see
//! `build.rs` for the `WIFI_SSID`, `WIFI_PASS`, and `UTC_OFFSET_MINUTES`
//! plumbing.

#![no_std]
#![no_main]
#![allow(clippy::future_not_send, reason = "single-threaded")]

use defmt::info;
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_futures::join::join;
use embassy_time::Delay;
use panic_probe as _;
use pico_telemetry::wifi::{self, WifiLink, WifiSignal};
use pico_telemetry::{
    DefmtConsole, JoinPolicy, JoinSupervisor, Never, NtpTime, Result, SnapshotEmitter,
    TelemetryConfig,
};

#[embassy_executor::main]
pub async fn main(spawner: Spawner) -> ! {
    let err = inner_main(spawner).await.unwrap_err();
    core::panic!("{err}");
}

fn node_config() -> TelemetryConfig {
    let mut config = TelemetryConfig::new(env!("WIFI_SSID"), env!("WIFI_PASS"));
    config.utc_offset_minutes = env!("UTC_OFFSET_MINUTES").parse().unwrap_or(180);
    config
}

async fn inner_main(spawner: Spawner) -> Result<Never> {
    info!("Starting telemetry node");

    let p = embassy_rp::init(embassy_rp::config::Config::default());
    let config = node_config();

    let (mut control, stack) = wifi::start(
        p.PIN_23,  // CYW43 power
        p.PIN_25,  // CYW43 chip select
        p.PIO0,    // CYW43 PIO interface
        p.PIN_24,  // CYW43 clock
        p.PIN_29,  // CYW43 data pin
        p.DMA_CH0, // CYW43 DMA channel
        spawner,
    )
    .await?;

    let mut console = DefmtConsole::new();
    let mut delay = Delay;

    // Association runs in the background while the supervisor polls the
    // stack and prints progress; both complete once DHCP is configured.
    let supervisor = JoinSupervisor::new(JoinPolicy::unbounded(config.join_poll_ms));
    let mut link = WifiLink::new(stack);
    let (_outcome, ()) = join(
        supervisor.supervise(&mut link, &mut console, &mut delay),
        wifi::join_network(&mut control, stack, config.ssid, config.password),
    )
    .await;

    let mut time = NtpTime::new(
        stack,
        config.ntp_server,
        config.utc_offset_minutes,
        config.sync_interval_ms,
    );
    let mut sampler = WifiSignal::new(control);
    let mut emitter = SnapshotEmitter::new(config.ssid, config.cadence_ms);

    emitter
        .run(&mut time, &mut sampler, &mut console, &mut delay)
        .await
}
