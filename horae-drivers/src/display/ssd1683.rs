//! SSD1683 e-paper controller (400x300, SPI)
//!
//! Write-only 4-wire SPI with separate DC, RST and BUSY lines. Commands are
//! sent with DC low, their parameters with DC high; BUSY is high while the
//! controller is working.
//!
//! The panel sits on the always-on rail. After every refresh the controller
//! enters deep sleep mode 1, which keeps its RAM, so pixels outside the next
//! update window still match what the panel shows.

use embedded_hal::delay::DelayNs;
use horae_core::layout::RefreshMode;
use horae_core::traits::DisplayError;
use horae_hal::{InputPin, OutputPin, SpiBus};

use super::framebuffer::Window;
use super::Panel;

/// SSD1683 commands
pub mod cmd {
    /// Gate count and scan direction
    pub const DRIVER_OUTPUT_CONTROL: u8 = 0x01;
    /// Enter deep sleep
    pub const DEEP_SLEEP: u8 = 0x10;
    /// RAM address increment direction
    pub const DATA_ENTRY_MODE: u8 = 0x11;
    /// Software reset
    pub const SOFT_RESET: u8 = 0x12;
    /// Temperature sensor selection
    pub const TEMP_SENSOR_CONTROL: u8 = 0x18;
    /// Run the sequence selected by DISPLAY_UPDATE_CTRL2
    pub const MASTER_ACTIVATION: u8 = 0x20;
    /// Update sequence selection
    pub const DISPLAY_UPDATE_CTRL2: u8 = 0x22;
    /// Write black/white RAM (new image)
    pub const WRITE_RAM_BW: u8 = 0x24;
    /// Write red RAM (previous image for partial updates)
    pub const WRITE_RAM_RED: u8 = 0x26;
    /// Border waveform
    pub const BORDER_WAVEFORM: u8 = 0x3C;
    /// RAM X start/end, in bytes
    pub const SET_RAM_X_RANGE: u8 = 0x44;
    /// RAM Y start/end
    pub const SET_RAM_Y_RANGE: u8 = 0x45;
    /// RAM X address counter
    pub const SET_RAM_X_COUNTER: u8 = 0x4E;
    /// RAM Y address counter
    pub const SET_RAM_Y_COUNTER: u8 = 0x4F;
}

/// DATA_ENTRY_MODE: X and Y increment, X first
const DATA_ENTRY_XY_INC: u8 = 0x03;
/// TEMP_SENSOR_CONTROL: internal sensor
const TEMP_SENSOR_INTERNAL: u8 = 0x80;
/// BORDER_WAVEFORM: follow LUT, white border
const BORDER_WHITE: u8 = 0x05;
/// DISPLAY_UPDATE_CTRL2: clock and analog on, load temperature and LUT, full waveform
const UPDATE_FULL: u8 = 0xF7;
/// DISPLAY_UPDATE_CTRL2: same with the partial (mode 2) waveform
const UPDATE_PARTIAL: u8 = 0xFF;
/// DEEP_SLEEP: mode 1, RAM retained
const DEEP_SLEEP_MODE_1: u8 = 0x01;

/// Panel geometry
pub const WIDTH: u32 = 400;
pub const HEIGHT: u32 = 300;

/// Longest a full refresh is allowed to keep BUSY high
pub const BUSY_TIMEOUT_MS: u32 = 10_000;

/// Reset pulse and recovery time
const RESET_DELAY_MS: u32 = 10;

/// SSD1683 panel driver
pub struct Ssd1683<S, CS, DC, RST, BUSY, D> {
    spi: S,
    cs: CS,
    dc: DC,
    rst: RST,
    busy: BUSY,
    delay: D,
    /// In deep sleep; needs a hardware reset before the next command
    asleep: bool,
}

impl<S, CS, DC, RST, BUSY, D> Ssd1683<S, CS, DC, RST, BUSY, D>
where
    S: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
    D: DelayNs,
{
    pub fn new(spi: S, cs: CS, dc: DC, rst: RST, busy: BUSY, delay: D) -> Self {
        Self {
            spi,
            cs,
            dc,
            rst,
            busy,
            delay,
            // The controller may have been left asleep by the previous wake
            asleep: true,
        }
    }

    fn write(&mut self, dc_high: bool, bytes: &[u8]) -> Result<(), DisplayError> {
        self.dc.set_state(dc_high);
        self.cs.set_low();
        let result = self.spi.write(bytes).map_err(|_| DisplayError::Bus);
        self.cs.set_high();
        result
    }

    fn command(&mut self, command: u8, data: &[u8]) -> Result<(), DisplayError> {
        self.write(false, &[command])?;
        if data.is_empty() {
            Ok(())
        } else {
            self.write(true, data)
        }
    }

    fn hardware_reset(&mut self) {
        self.rst.set_low();
        self.delay.delay_ms(RESET_DELAY_MS);
        self.rst.set_high();
        self.delay.delay_ms(RESET_DELAY_MS);
    }

    /// Poll BUSY every millisecond until it drops
    fn busy_wait(&mut self) -> Result<(), DisplayError> {
        let mut waited = 0;
        while self.busy.is_high() {
            if waited >= BUSY_TIMEOUT_MS {
                return Err(DisplayError::Timeout);
            }
            self.delay.delay_ms(1);
            waited += 1;
        }
        Ok(())
    }

    /// Reset the controller and program the panel geometry
    fn wake(&mut self) -> Result<(), DisplayError> {
        self.hardware_reset();
        self.busy_wait()?;
        self.command(cmd::SOFT_RESET, &[])?;
        self.busy_wait()?;

        let last_row = (HEIGHT - 1) as u16;
        self.command(
            cmd::DRIVER_OUTPUT_CONTROL,
            &[(last_row & 0xFF) as u8, (last_row >> 8) as u8, 0x00],
        )?;
        self.command(cmd::DATA_ENTRY_MODE, &[DATA_ENTRY_XY_INC])?;
        self.command(cmd::BORDER_WAVEFORM, &[BORDER_WHITE])?;
        self.command(cmd::TEMP_SENSOR_CONTROL, &[TEMP_SENSOR_INTERNAL])?;
        self.asleep = false;
        Ok(())
    }

    fn set_ram_area(&mut self, window: &Window) -> Result<(), DisplayError> {
        let x_start = (window.x / 8) as u8;
        let x_end = ((window.x + window.w) / 8 - 1) as u8;
        let y_start = window.y as u16;
        let y_end = (window.y + window.h - 1) as u16;

        self.command(cmd::SET_RAM_X_RANGE, &[x_start, x_end])?;
        self.command(
            cmd::SET_RAM_Y_RANGE,
            &[
                (y_start & 0xFF) as u8,
                (y_start >> 8) as u8,
                (y_end & 0xFF) as u8,
                (y_end >> 8) as u8,
            ],
        )?;
        self.command(cmd::SET_RAM_X_COUNTER, &[x_start])?;
        self.command(
            cmd::SET_RAM_Y_COUNTER,
            &[(y_start & 0xFF) as u8, (y_start >> 8) as u8],
        )
    }

    /// Stream the rows of `window` into one of the RAM banks
    fn write_window(
        &mut self,
        ram: u8,
        frame: &[u8],
        window: &Window,
    ) -> Result<(), DisplayError> {
        self.set_ram_area(window)?;
        self.write(false, &[ram])?;

        let stride = (WIDTH / 8) as usize;
        let start = (window.x / 8) as usize;
        let len = (window.w / 8) as usize;
        for row in window.y..window.y + window.h {
            let offset = row as usize * stride + start;
            let bytes = frame.get(offset..offset + len).ok_or(DisplayError::Bus)?;
            self.write(true, bytes)?;
        }
        Ok(())
    }

    fn sleep(&mut self) -> Result<(), DisplayError> {
        self.command(cmd::DEEP_SLEEP, &[DEEP_SLEEP_MODE_1])?;
        self.asleep = true;
        Ok(())
    }
}

impl<S, CS, DC, RST, BUSY, D> Panel for Ssd1683<S, CS, DC, RST, BUSY, D>
where
    S: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
    D: DelayNs,
{
    const WIDTH: u32 = WIDTH;
    const HEIGHT: u32 = HEIGHT;

    fn init(&mut self) -> Result<(), DisplayError> {
        self.cs.set_high();
        self.wake()
    }

    fn update(
        &mut self,
        frame: &[u8],
        window: Window,
        mode: RefreshMode,
    ) -> Result<(), DisplayError> {
        if window.w == 0 || window.h == 0 {
            return Ok(());
        }
        let aligned = window.x % 8 == 0 && window.w % 8 == 0;
        if !aligned || window.x + window.w > WIDTH || window.y + window.h > HEIGHT {
            return Err(DisplayError::Bus);
        }
        if self.asleep {
            self.wake()?;
        }

        self.write_window(cmd::WRITE_RAM_BW, frame, &window)?;
        let sequence = match mode {
            RefreshMode::Slow => UPDATE_FULL,
            RefreshMode::Fast => UPDATE_PARTIAL,
        };
        self.command(cmd::DISPLAY_UPDATE_CTRL2, &[sequence])?;
        self.command(cmd::MASTER_ACTIVATION, &[])?;
        self.busy_wait()?;

        // The partial waveform diffs against this bank
        self.write_window(cmd::WRITE_RAM_RED, frame, &window)?;
        self.sleep()
    }
}
