//! Horae - e-paper wall clock firmware
//!
//! Main firmware binary for RP2040-based clock boards. Every wake is one
//! pass through `begin` → `render_cycle` → `suspend`: bring the devices up,
//! draw the time, arm the RTC for the next minute and cut power.
//!
//! Named after the Horae, the Greek goddesses of the hours - a clock that
//! only lives for one minute at a time.

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{self, Adc, Channel};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::UART0;
use embassy_rp::spi::{self, Spi};
use embassy_rp::uart::{self, BufferedInterruptHandler, BufferedUart};
use embassy_time::{Delay, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use horae_core::config::{ClockConfig, NetworkConfig};
use horae_core::traits::{Button, PowerControl, Touch};
use horae_core::{CycleController, Devices};
use horae_drivers::battery::{AdcBattery, AdcBatteryConfig};
use horae_drivers::clock::Bm8563;
use horae_drivers::display::{ssd1683, EpaperDisplay, Framebuffer, Ssd1683};
use horae_drivers::input::{DebounceConfig, DebouncedButton};
use horae_drivers::network::{EspAtConfig, EspAtNetwork};
use horae_drivers::power::{LatchPower, LatchPowerConfig};
use horae_drivers::touch::Gt911;
use horae_hal::SharedI2c;
use horae_hal_rp2040::adc::RpAdcChannel;
use horae_hal_rp2040::gpio::{RpInput, RpOutput};
use horae_hal_rp2040::i2c::RpI2c;
use horae_hal_rp2040::spi::RpSpi;
use horae_hal_rp2040::uart::RpUart;

use crate::board::*;

mod board;
mod config;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

/// Button samples taken while the board comes up
const WAKE_INPUT_SAMPLES: u8 = 8;

/// Interval between button samples
const WAKE_INPUT_INTERVAL_MS: u64 = 5;

// Static cells (must live forever for driver references)
static I2C_BUS: StaticCell<RefCell<I2cBus>> = StaticCell::new();
static FRAME: StaticCell<[u8; FRAME_LEN]> = StaticCell::new();
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 1024]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Horae firmware starting...");

    let p = embassy_rp::init(Default::default());

    // Take the hold line first so releasing the button does not cut power
    let hold = RpOutput::new(Output::new(p.PIN_15, Level::High));
    info!("Peripherals initialized");

    // RTC and touch controller share I2C0
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = I2C.frequency;
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config);
    let i2c_bus: &'static RefCell<I2cBus> = I2C_BUS.init(RefCell::new(RpI2c::new(i2c)));

    // A press or touch during bring-up asks for a clean panel
    let mut button: BoardButton = DebouncedButton::new(
        RpInput::new(Input::new(p.PIN_14, Pull::Up)),
        DebounceConfig::default(),
    );
    let mut touch: BoardTouch = Gt911::new(SharedI2c::new(i2c_bus));
    let user_input = poll_user_input(&mut button, &mut touch).await;

    #[cfg(feature = "sdcard")]
    let config = {
        let mut sd_config = spi::Config::default();
        sd_config.frequency = SD_SPI.frequency;
        let sd_spi = Spi::new_blocking(p.SPI0, p.PIN_18, p.PIN_19, p.PIN_16, sd_config);
        let sd_cs = Output::new(p.PIN_17, Level::High);
        match embedded_hal_bus::spi::ExclusiveDevice::new(sd_spi, sd_cs, Delay) {
            Ok(device) => {
                let card = embedded_sdmmc::SdCard::new(device, Delay);
                let stamp = file_timestamp(i2c_bus);
                let mut storage: BoardStorage = horae_drivers::storage::SdStorage::new(
                    card,
                    horae_drivers::storage::FixedTime(stamp),
                );
                config::load(&mut storage)
            }
            Err(_) => config::load_embedded(),
        }
    };
    #[cfg(not(feature = "sdcard"))]
    let config = config::load_embedded();

    let Some(display) = build_display(
        p.SPI1, p.PIN_10, p.PIN_11, p.PIN_9, p.PIN_8, p.PIN_12, p.PIN_13,
    ) else {
        error!("Framebuffer does not match the panel");
        idle().await
    };

    let mut uart_config = uart::Config::default();
    uart_config.baudrate = WIFI_UART.baudrate;
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 1024]);
    let uart = BufferedUart::new(
        p.UART0,
        p.PIN_0,
        p.PIN_1,
        Irqs,
        tx_buf,
        rx_buf,
        uart_config,
    );

    let devices = Devices {
        display,
        clock: Bm8563::new(SharedI2c::new(i2c_bus)),
        battery: AdcBattery::new(
            RpAdcChannel::new(
                Adc::new_blocking(p.ADC, adc::Config::default()),
                Channel::new_pin(p.PIN_26, Pull::None),
                VREF_MV,
            ),
            RpInput::new(Input::new(p.PIN_22, Pull::Up)),
            AdcBatteryConfig::default(),
        ),
        // Second handle on the RTC, used only for its countdown timer
        power: LatchPower::new(
            hold,
            Bm8563::new(SharedI2c::new(i2c_bus)),
            RpOutput::new(Output::new(p.PIN_20, Level::Low)),
            RpOutput::new(Output::new(p.PIN_21, Level::Low)),
            Delay,
            LatchPowerConfig::default(),
        ),
        network: EspAtNetwork::new(RpUart::new(uart), Delay, esp_at_config(&config.network)),
    };
    info!("Devices constructed");

    run_cycle(devices, config, user_input).await
}

/// One wake: bring everything up, draw, sleep
async fn run_cycle(
    devices: Devices<BoardDisplay, BoardClock, BoardBattery, BoardPower, BoardNetwork>,
    config: ClockConfig,
    user_input: bool,
) -> ! {
    let fallback_sleep_s = config.power.fallback_sleep_s as u32;
    let mut controller = CycleController::new(devices, config);
    if user_input {
        info!("Woken by user input, full refresh");
        controller.request_full_refresh();
    }

    if let Err(e) = controller.begin() {
        error!("Init failed: {:?}", e);
        // Nothing else is drawn; try again after the fallback sleep
        let mut devices = controller.into_devices();
        devices.power.enable_wake_on_button();
        if devices.power.sleep_for(fallback_sleep_s).is_err() {
            warn!("Wake timer not armed");
        }
        let reason = devices.power.power_off();
        error!("Still running after power off: {:?}", reason);
        idle().await
    }
    if !controller.clock_available() {
        warn!("RTC unavailable, showing clock error");
    }
    info!("Devices up");

    match controller.render_cycle() {
        Ok(report) => {
            info!(
                "Rendered {:?} scope={:?} resync={:?} battery_redrawn={} committed={}",
                report.time, report.scope, report.resync, report.battery_redrawn, report.committed
            );
            if !report.committed {
                warn!("Panel refresh failed");
            }
        }
        Err(e) => error!("Render out of order: {:?}", e),
    }

    info!("Suspending");
    let e = controller.suspend();
    error!("Suspend returned: {:?}", e);
    idle().await
}

/// Sample the button and touch panel for a few milliseconds
///
/// The press that woke the board is usually still held here.
async fn poll_user_input(button: &mut BoardButton, touch: &mut BoardTouch) -> bool {
    let _ = button.init();
    let touch_up = touch.init().is_ok();

    let mut pressed = false;
    for _ in 0..WAKE_INPUT_SAMPLES {
        pressed |= button.was_pressed();
        Timer::after_millis(WAKE_INPUT_INTERVAL_MS).await;
    }
    let touched = touch_up && touch.is_touched();
    if touched {
        let point = touch.current_point();
        debug!("Touch at {}, {}", point.x, point.y);
    }
    pressed || touched
}

#[allow(clippy::too_many_arguments)]
fn build_display(
    spi: embassy_rp::Peri<'static, embassy_rp::peripherals::SPI1>,
    sck: embassy_rp::Peri<'static, embassy_rp::peripherals::PIN_10>,
    mosi: embassy_rp::Peri<'static, embassy_rp::peripherals::PIN_11>,
    cs: embassy_rp::Peri<'static, embassy_rp::peripherals::PIN_9>,
    dc: embassy_rp::Peri<'static, embassy_rp::peripherals::PIN_8>,
    rst: embassy_rp::Peri<'static, embassy_rp::peripherals::PIN_12>,
    busy: embassy_rp::Peri<'static, embassy_rp::peripherals::PIN_13>,
) -> Option<BoardDisplay> {
    let mut spi_config = spi::Config::default();
    spi_config.frequency = PANEL_SPI.frequency;
    let spi = Spi::new_blocking_txonly(spi, sck, mosi, spi_config);

    let panel: BoardPanel = Ssd1683::new(
        RpSpi::new(spi),
        RpOutput::new(Output::new(cs, Level::High)),
        RpOutput::new(Output::new(dc, Level::Low)),
        RpOutput::new(Output::new(rst, Level::High)),
        RpInput::new(Input::new(busy, Pull::None)),
        Delay,
    );

    let frame: &'static mut [u8] = FRAME.init([0u8; FRAME_LEN]);
    let fb: BoardFramebuffer = Framebuffer::new(frame, ssd1683::WIDTH, ssd1683::HEIGHT).ok()?;
    Some(EpaperDisplay::new(panel, fb))
}

/// Driver settings from the `[network]` config section
fn esp_at_config(network: &NetworkConfig) -> EspAtConfig {
    EspAtConfig {
        utc_offset_hours: network.utc_offset_hours,
        connect_attempts: network.connect_attempts,
        sync_attempts: network.sync_attempts,
        baudrate: WIFI_UART.baudrate,
        ..EspAtConfig::default()
    }
}

/// Time stamped on files written this wake
#[cfg(feature = "sdcard")]
fn file_timestamp(i2c_bus: &'static RefCell<I2cBus>) -> horae_core::Timestamp {
    use horae_core::traits::Clock;

    let mut rtc = Bm8563::new(SharedI2c::new(i2c_bus));
    let _ = rtc.init();
    rtc.now()
        .ok()
        .filter(horae_core::Timestamp::is_valid)
        .unwrap_or(horae_core::Timestamp::new(2022, 1, 1, 0, 0, 0))
}

/// Park the core; the panel already says what went wrong
async fn idle() -> ! {
    loop {
        Timer::after_secs(3600).await;
    }
}
