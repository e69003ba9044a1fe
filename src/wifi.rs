//! CYW43 Wi-Fi bring-up for the Raspberry Pi Pico W.
//!
//! [`start`] powers the radio over PIO SPI, spawns the driver and network
//! stack tasks, and hands back a [`cyw43::Control`] plus the DHCP-configured
//! [`Stack`]. Association is separate: [`join_network`] retries the
//! credential exchange until it sticks, which lets the join supervisor poll
//! [`WifiLink`] and print progress while association runs.

#![allow(clippy::future_not_send, reason = "single-threaded")]

use cyw43::{Control, IoctlType, JoinOptions};
use cyw43_pio::{DEFAULT_CLOCK_DIVIDER, PioSpi};
use defmt::info;
use embassy_executor::Spawner;
use embassy_net::{Config, Stack, StackResources};
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{DMA_CH0, PIN_23, PIN_24, PIN_25, PIN_29, PIO0};
use embassy_rp::pio::{InterruptHandler, Pio};
use embassy_rp::{Peri, bind_interrupts};
use embassy_time::Timer;
use static_cell::StaticCell;

use crate::Result;
use crate::join::LinkStatus;
use crate::telemetry::SignalSampler;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => InterruptHandler<PIO0>;
});

// WLC firmware ioctl command for the current RSSI.
const WLC_GET_RSSI: u32 = 127;

/// RSSI reported while no sample has been read yet or a read fails.
const RSSI_UNKNOWN: i32 = 0;

/// Power the radio and start the driver and network-stack tasks.
///
/// The returned stack is configured for DHCP but has no connectivity until
/// [`join_network`] completes.
///
/// # Errors
///
/// Returns [`Error::TaskSpawn`](crate::Error::TaskSpawn) if a background
/// task cannot be spawned.
pub async fn start(
    pin_23: Peri<'static, PIN_23>,
    pin_25: Peri<'static, PIN_25>,
    pio0: Peri<'static, PIO0>,
    pin_24: Peri<'static, PIN_24>,
    pin_29: Peri<'static, PIN_29>,
    dma_ch0: Peri<'static, DMA_CH0>,
    spawner: Spawner,
) -> Result<(Control<'static>, &'static Stack<'static>)> {
    let fw = cyw43_firmware::CYW43_43439A0;
    let clm = cyw43_firmware::CYW43_43439A0_CLM;

    let pwr = Output::new(pin_23, Level::Low);
    let cs = Output::new(pin_25, Level::High);
    let mut pio = Pio::new(pio0, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        pin_24,
        pin_29,
        dma_ch0,
    );

    static STATE: StaticCell<cyw43::State> = StaticCell::new();
    let state = STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw).await;
    spawner.spawn(wifi_task(runner)?);

    control.init(clm).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;

    let config = Config::dhcpv4(embassy_net::DhcpConfig::default());
    let seed = 0x7c8f_3a2e_9d14_6b5a;

    static RESOURCES: StaticCell<StackResources<5>> = StaticCell::new();
    static STACK: StaticCell<Stack<'static>> = StaticCell::new();
    let (stack_val, runner) = embassy_net::new(
        net_device,
        config,
        RESOURCES.init(StackResources::<5>::new()),
        seed,
    );
    let stack = STACK.init(stack_val);
    spawner.spawn(net_task(runner)?);

    Ok((control, stack))
}

/// Associate with the network and wait for a DHCP lease.
///
/// Retries the join once per second until the radio accepts it. Returns
/// only once `stack` reports a usable IPv4 configuration, which is also
/// the condition [`WifiLink`] polls.
pub async fn join_network(
    control: &mut Control<'static>,
    stack: &'static Stack<'static>,
    ssid: &str,
    password: &str,
) {
    loop {
        match control
            .join(ssid, JoinOptions::new(password.as_bytes()))
            .await
        {
            Ok(()) => break,
            Err(err) => {
                info!("join failed: {}; retrying", err.status);
                Timer::after_secs(1).await;
            }
        }
    }

    stack.wait_config_up().await;
    if let Some(config) = stack.config_v4() {
        info!("IP address: {}", config.address);
    }
}

/// Link status backed by the network stack's DHCP state.
pub struct WifiLink {
    stack: &'static Stack<'static>,
}

impl WifiLink {
    /// Watch `stack` for a usable IPv4 configuration.
    #[must_use]
    pub const fn new(stack: &'static Stack<'static>) -> Self {
        Self { stack }
    }
}

impl LinkStatus for WifiLink {
    fn is_up(&mut self) -> bool {
        self.stack.is_config_up()
    }
}

/// Signal sampler backed by the radio firmware's RSSI reading.
pub struct WifiSignal {
    control: Control<'static>,
    last_dbm: i32,
}

impl WifiSignal {
    /// Sample RSSI through `control`. Takes ownership; nothing else needs
    /// the control handle once the network is joined.
    #[must_use]
    pub const fn new(control: Control<'static>) -> Self {
        Self {
            control,
            last_dbm: RSSI_UNKNOWN,
        }
    }
}

impl SignalSampler for WifiSignal {
    async fn rssi_dbm(&mut self) -> i32 {
        let mut buf = [0u8; 4];
        let read = self
            .control
            .ioctl(IoctlType::Get, WLC_GET_RSSI, 0, &mut buf)
            .await;
        if read >= buf.len() {
            self.last_dbm = i32::from_le_bytes(buf);
        }
        // A failed read repeats the previous sample.
        self.last_dbm
    }
}

#[embassy_executor::task]
async fn wifi_task(
    runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>,
) -> ! {
    runner.run().await
}

#[embassy_executor::task]
async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}
