//! Board wiring
//!
//! | Function            | Peripheral | Pins                                  |
//! |---------------------|------------|---------------------------------------|
//! | RTC + touch         | I2C0       | SDA GPIO4, SCL GPIO5                  |
//! | E-paper panel       | SPI1       | SCK GPIO10, MOSI GPIO11               |
//! |                     | GPIO       | CS GPIO9, DC GPIO8, RST GPIO12, BUSY GPIO13 |
//! | SD card             | SPI0       | SCK GPIO18, MOSI GPIO19, MISO GPIO16, CS GPIO17 |
//! | Wi-Fi co-processor  | UART0      | TX GPIO0, RX GPIO1                    |
//! | Button              | GPIO       | GPIO14, active low                    |
//! | Power hold          | GPIO       | GPIO15, high keeps the board on       |
//! | Button wake gate    | GPIO       | GPIO20                                |
//! | Touch wake gate     | GPIO       | GPIO21                                |
//! | Charge status       | GPIO       | GPIO22, active low                    |
//! | Battery voltage     | ADC0       | GPIO26, 1:2 divider                   |

use embassy_rp::peripherals::{I2C0, SPI1};
use embassy_time::Delay;
use horae_drivers::battery::AdcBattery;
use horae_drivers::clock::Bm8563;
use horae_drivers::display::{ssd1683, EpaperDisplay, Framebuffer, Ssd1683};
use horae_drivers::input::DebouncedButton;
use horae_drivers::network::EspAtNetwork;
use horae_drivers::power::LatchPower;
use horae_drivers::touch::Gt911;
use horae_hal::i2c::I2cConfig;
use horae_hal::spi::SpiConfig;
use horae_hal::uart::UartConfig;
use horae_hal::SharedI2c;
use horae_hal_rp2040::adc::RpAdcChannel;
use horae_hal_rp2040::gpio::{RpInput, RpOutput};
use horae_hal_rp2040::i2c::RpI2c;
use horae_hal_rp2040::spi::RpSpi;
use horae_hal_rp2040::uart::RpUart;

/// ADC reference voltage
pub const VREF_MV: u16 = 3300;

/// RTC and touch controller bus
pub const I2C: I2cConfig = I2cConfig::FAST;

/// Panel bus
pub const PANEL_SPI: SpiConfig = SpiConfig {
    frequency: 4_000_000,
};

/// SD card bus, slow enough for card initialization
#[cfg(feature = "sdcard")]
pub const SD_SPI: SpiConfig = SpiConfig { frequency: 400_000 };

/// Wi-Fi co-processor link (ESP-AT default)
pub const WIFI_UART: UartConfig = UartConfig { baudrate: 115_200 };

/// Bytes in one panel frame
pub const FRAME_LEN: usize = (ssd1683::WIDTH / 8 * ssd1683::HEIGHT) as usize;

pub type I2cBus = RpI2c<'static, I2C0>;
pub type BoardI2c = SharedI2c<'static, I2cBus>;

pub type BoardClock = Bm8563<BoardI2c>;
pub type BoardTouch = Gt911<BoardI2c>;
pub type BoardButton = DebouncedButton<RpInput<'static>>;
pub type BoardBattery = AdcBattery<RpAdcChannel<'static>, RpInput<'static>>;
pub type BoardPower =
    LatchPower<RpOutput<'static>, Bm8563<BoardI2c>, RpOutput<'static>, RpOutput<'static>, Delay>;
pub type BoardNetwork = EspAtNetwork<RpUart, Delay>;
pub type BoardPanel = Ssd1683<
    RpSpi<'static, SPI1>,
    RpOutput<'static>,
    RpOutput<'static>,
    RpOutput<'static>,
    RpInput<'static>,
    Delay,
>;
pub type BoardDisplay = EpaperDisplay<BoardPanel, &'static mut [u8]>;
pub type BoardFramebuffer = Framebuffer<&'static mut [u8]>;

#[cfg(feature = "sdcard")]
pub type BoardStorage = horae_drivers::storage::SdStorage<
    embedded_sdmmc::SdCard<
        embedded_hal_bus::spi::ExclusiveDevice<
            embassy_rp::spi::Spi<'static, embassy_rp::peripherals::SPI0, embassy_rp::spi::Blocking>,
            embassy_rp::gpio::Output<'static>,
            Delay,
        >,
        Delay,
    >,
    horae_drivers::storage::FixedTime,
>;
