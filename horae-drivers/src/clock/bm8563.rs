//! BM8563 real-time clock (I2C)
//!
//! PCF8563-compatible RTC kept alive by its own backup cell while the rest of
//! the board is unpowered. Besides timekeeping it provides the countdown
//! timer whose interrupt line switches the board back on.
//!
//! # Register Map
//!
//! Time registers are packed BCD starting at 0x02 (seconds, minutes, hours,
//! day, weekday, month, year). Bit 7 of the seconds register is the
//! voltage-low flag: once set the time can no longer be trusted until it is
//! written again. Bit 7 of the month register selects the century; set
//! means 20xx.

use horae_core::traits::{Clock, ClockError, InitError, PowerError};
use horae_core::Timestamp;
use horae_hal::I2cBus;

use crate::bcd;
use crate::power::WakeTimer;

/// Fixed 7-bit I2C address
pub const ADDRESS: u8 = 0x51;

/// BM8563 register addresses
pub mod reg {
    /// Control/status 1 (STOP, TESTC)
    pub const CTRL1: u8 = 0x00;
    /// Control/status 2 (interrupt enables and flags)
    pub const CTRL2: u8 = 0x01;
    /// Seconds and VL flag, first of the seven time registers
    pub const SECONDS: u8 = 0x02;
    /// Timer control (enable and source clock)
    pub const TIMER_CTRL: u8 = 0x0E;
    /// Timer countdown value
    pub const TIMER: u8 = 0x0F;
}

/// CTRL2: timer interrupt enable
const CTRL2_TIE: u8 = 1 << 0;
/// CTRL2: timer flag, latched when the countdown expires
const CTRL2_TF: u8 = 1 << 2;
/// SECONDS: clock integrity lost (backup supply dropped out)
const SECONDS_VL: u8 = 1 << 7;
/// MONTH: century bit, set for 2000-2099
const MONTH_CENTURY: u8 = 1 << 7;
/// TIMER_CTRL: timer enable
const TIMER_TE: u8 = 1 << 7;
/// TIMER_CTRL: 1 Hz source
const TIMER_TD_1HZ: u8 = 0b10;
/// TIMER_CTRL: 1/60 Hz source
const TIMER_TD_1_60HZ: u8 = 0b11;

/// Longest countdown in seconds at each timer source
const MAX_TIMER_SECONDS: u32 = 255;
const MAX_TIMER_MINUTES: u32 = 255;

/// BM8563 driver
///
/// A chip that does not answer at `init` leaves the driver unavailable
/// instead of failing: the clock then reports [`ClockError::Unavailable`]
/// and the cycle shows an error in place of the time.
///
/// The wake timer does not need `init`, so a second instance on a
/// [`horae_hal::SharedI2c`] handle can be handed to the power control.
pub struct Bm8563<I> {
    i2c: I,
    available: bool,
}

impl<I: I2cBus> Bm8563<I> {
    pub fn new(i2c: I) -> Self {
        Self {
            i2c,
            available: false,
        }
    }

    /// Release the bus
    pub fn release(self) -> I {
        self.i2c
    }

    /// True if the wake timer has expired since it was last armed
    pub fn timer_fired(&mut self) -> Result<bool, ClockError> {
        Ok(self.read_reg(reg::CTRL2)? & CTRL2_TF != 0)
    }

    fn read_reg(&mut self, register: u8) -> Result<u8, ClockError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(ADDRESS, &[register], &mut buf)
            .map_err(|_| ClockError::Bus)?;
        Ok(buf[0])
    }

    fn write_reg(&mut self, register: u8, value: u8) -> Result<(), ClockError> {
        self.i2c
            .write(ADDRESS, &[register, value])
            .map_err(|_| ClockError::Bus)
    }

    fn configure_timer(&mut self, ctrl: u8, count: u8) -> Result<(), ClockError> {
        // Stop first so a running countdown cannot fire mid-update
        self.write_reg(reg::TIMER_CTRL, 0)?;
        self.write_reg(reg::TIMER, count)?;
        self.write_reg(reg::TIMER_CTRL, ctrl)?;

        let ctrl2 = self.read_reg(reg::CTRL2)? & !CTRL2_TF;
        let ctrl2 = if ctrl & TIMER_TE != 0 {
            ctrl2 | CTRL2_TIE
        } else {
            ctrl2 & !CTRL2_TIE
        };
        self.write_reg(reg::CTRL2, ctrl2)
    }
}

/// Decode the seven time registers starting at SECONDS
fn decode(regs: &[u8; 7]) -> Result<Timestamp, ClockError> {
    if regs[0] & SECONDS_VL != 0 {
        return Err(ClockError::IntegrityLost);
    }
    let century = if regs[5] & MONTH_CENTURY != 0 {
        2000
    } else {
        1900
    };
    let time = Timestamp::new(
        century + bcd::to_bin(regs[6]) as u16,
        bcd::to_bin(regs[5] & 0x1F),
        bcd::to_bin(regs[3] & 0x3F),
        bcd::to_bin(regs[2] & 0x3F),
        bcd::to_bin(regs[1] & 0x7F),
        bcd::to_bin(regs[0] & 0x7F),
    );
    if time.is_valid() {
        Ok(time)
    } else {
        Err(ClockError::InvalidTime)
    }
}

/// Encode a timestamp into the seven time registers
fn encode(time: &Timestamp) -> Result<[u8; 7], ClockError> {
    if !time.is_valid() || !(1900..=2099).contains(&time.year) {
        return Err(ClockError::InvalidTime);
    }
    let century = if time.year >= 2000 { MONTH_CENTURY } else { 0 };
    Ok([
        bcd::from_bin(time.second),
        bcd::from_bin(time.minute),
        bcd::from_bin(time.hour),
        bcd::from_bin(time.day),
        weekday(time.year, time.month, time.day),
        bcd::from_bin(time.month) | century,
        bcd::from_bin((time.year % 100) as u8),
    ])
}

/// Day of week, 0 = Sunday (Sakamoto)
fn weekday(year: u16, month: u8, day: u8) -> u8 {
    const OFFSETS: [u16; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];
    let y = if month < 3 { year - 1 } else { year };
    let m = (month.clamp(1, 12) - 1) as usize;
    ((y + y / 4 - y / 100 + y / 400 + OFFSETS[m] + day as u16) % 7) as u8
}

/// Timer control value and count for a countdown of `seconds`
///
/// Counts in seconds up to 255 s, in whole minutes (rounded up) beyond.
fn timer_setting(seconds: u32) -> Result<(u8, u8), PowerError> {
    match seconds {
        0 => Err(PowerError::DurationOutOfRange),
        s if s <= MAX_TIMER_SECONDS => Ok((TIMER_TE | TIMER_TD_1HZ, s as u8)),
        s => {
            let minutes = s.div_ceil(60);
            if minutes > MAX_TIMER_MINUTES {
                Err(PowerError::DurationOutOfRange)
            } else {
                Ok((TIMER_TE | TIMER_TD_1_60HZ, minutes as u8))
            }
        }
    }
}

impl<I: I2cBus> Clock for Bm8563<I> {
    fn init(&mut self) -> Result<(), InitError> {
        // Normal mode, then drop any stale timer flag so INT is released
        self.available = self
            .write_reg(reg::CTRL1, 0)
            .and_then(|_| self.read_reg(reg::CTRL2))
            .and_then(|ctrl2| self.write_reg(reg::CTRL2, ctrl2 & !CTRL2_TF))
            .is_ok();
        Ok(())
    }

    fn now(&mut self) -> Result<Timestamp, ClockError> {
        if !self.available {
            return Err(ClockError::Unavailable);
        }
        let mut regs = [0u8; 7];
        self.i2c
            .write_read(ADDRESS, &[reg::SECONDS], &mut regs)
            .map_err(|_| ClockError::Bus)?;
        decode(&regs)
    }

    fn set_now(&mut self, time: Timestamp) -> Result<(), ClockError> {
        if !self.available {
            return Err(ClockError::Unavailable);
        }
        let regs = encode(&time)?;
        let mut frame = [0u8; 8];
        frame[0] = reg::SECONDS;
        frame[1..].copy_from_slice(&regs);
        self.i2c
            .write(ADDRESS, &frame)
            .map_err(|_| ClockError::Bus)
    }

    fn is_available(&self) -> bool {
        self.available
    }
}

impl<I: I2cBus> WakeTimer for Bm8563<I> {
    fn arm(&mut self, seconds: u32) -> Result<(), PowerError> {
        let (ctrl, count) = timer_setting(seconds)?;
        self.configure_timer(ctrl, count)
            .map_err(|_| PowerError::TimerUnavailable)
    }

    fn disarm(&mut self) -> Result<(), PowerError> {
        self.configure_timer(0, 0)
            .map_err(|_| PowerError::TimerUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::RegisterBus;

    fn rtc() -> Bm8563<RegisterBus<1>> {
        let mut rtc = Bm8563::new(RegisterBus::new(ADDRESS));
        rtc.init().unwrap();
        rtc
    }

    #[test]
    fn test_missing_chip_is_unavailable_not_fatal() {
        let mut bus = RegisterBus::<1>::new(ADDRESS);
        bus.fail = true;
        let mut rtc = Bm8563::new(bus);

        assert_eq!(rtc.init(), Ok(()));
        assert!(!rtc.is_available());
        assert_eq!(rtc.now(), Err(ClockError::Unavailable));
        assert_eq!(rtc.arm(30), Err(PowerError::TimerUnavailable));
    }

    #[test]
    fn test_read_time() {
        let mut rtc = rtc();
        // 2024-05-17 14:37:50, Friday
        rtc.i2c
            .set(reg::SECONDS as u16, &[0x50, 0x37, 0x14, 0x17, 0x05, 0x85, 0x24]);

        assert_eq!(rtc.now(), Ok(Timestamp::new(2024, 5, 17, 14, 37, 50)));
    }

    #[test]
    fn test_unused_bits_ignored() {
        let mut rtc = rtc();
        rtc.i2c
            .set(reg::SECONDS as u16, &[0x15, 0x80, 0xC2, 0xC1, 0xF8, 0x81, 0x25]);

        assert_eq!(rtc.now(), Ok(Timestamp::new(2025, 1, 1, 2, 0, 15)));
    }

    #[test]
    fn test_voltage_low_reported() {
        let mut rtc = rtc();
        rtc.i2c
            .set(reg::SECONDS as u16, &[0x80 | 0x10, 0x00, 0x02, 0x01, 0x00, 0x81, 0x25]);

        assert_eq!(rtc.now(), Err(ClockError::IntegrityLost));
    }

    #[test]
    fn test_out_of_range_fields_reported() {
        let mut rtc = rtc();
        // Month 0 after a power-on reset
        rtc.i2c.set(reg::SECONDS as u16, &[0x00; 7]);
        assert_eq!(rtc.now(), Err(ClockError::InvalidTime));

        // Minute 61
        rtc.i2c
            .set(reg::SECONDS as u16, &[0x00, 0x61, 0x02, 0x01, 0x00, 0x81, 0x25]);
        assert_eq!(rtc.now(), Err(ClockError::InvalidTime));
    }

    #[test]
    fn test_set_then_read() {
        let mut rtc = rtc();
        let time = Timestamp::new(2024, 2, 29, 23, 59, 58);

        rtc.set_now(time).unwrap();

        // Thursday
        assert_eq!(rtc.i2c.get(0x06), 4);
        assert_eq!(rtc.i2c.get(0x07), 0x82);
        assert_eq!(rtc.now(), Ok(time));
    }

    #[test]
    fn test_set_clears_voltage_low() {
        let mut rtc = rtc();
        rtc.i2c.set(reg::SECONDS as u16, &[0x80; 7]);

        rtc.set_now(Timestamp::new(2024, 1, 1, 0, 0, 0)).unwrap();

        assert_eq!(rtc.i2c.get(reg::SECONDS as u16) & SECONDS_VL, 0);
        assert!(rtc.now().is_ok());
    }

    #[test]
    fn test_set_rejects_invalid_time() {
        let mut rtc = rtc();
        assert_eq!(
            rtc.set_now(Timestamp::new(2024, 13, 1, 0, 0, 0)),
            Err(ClockError::InvalidTime)
        );
        assert_eq!(
            rtc.set_now(Timestamp::new(2100, 1, 1, 0, 0, 0)),
            Err(ClockError::InvalidTime)
        );
    }

    #[test]
    fn test_weekday() {
        assert_eq!(weekday(2024, 5, 17), 5);
        assert_eq!(weekday(2000, 1, 1), 6);
        assert_eq!(weekday(2016, 8, 4), 4);
    }

    #[test]
    fn test_timer_setting() {
        assert_eq!(timer_setting(45), Ok((0x82, 45)));
        assert_eq!(timer_setting(255), Ok((0x82, 255)));
        assert_eq!(timer_setting(256), Ok((0x83, 5)));
        assert_eq!(timer_setting(3600), Ok((0x83, 60)));
        assert_eq!(timer_setting(0), Err(PowerError::DurationOutOfRange));
        assert_eq!(
            timer_setting(256 * 60),
            Err(PowerError::DurationOutOfRange)
        );
    }

    #[test]
    fn test_arm_enables_interrupt_and_clears_flag() {
        let mut rtc = rtc();
        rtc.i2c.set(reg::CTRL2 as u16, &[CTRL2_TF]);

        rtc.arm(45).unwrap();

        assert_eq!(rtc.i2c.get(reg::TIMER as u16), 45);
        assert_eq!(rtc.i2c.get(reg::TIMER_CTRL as u16), 0x82);
        assert_eq!(rtc.i2c.get(reg::CTRL2 as u16), CTRL2_TIE);
        assert_eq!(rtc.timer_fired(), Ok(false));

        rtc.disarm().unwrap();
        assert_eq!(rtc.i2c.get(reg::TIMER_CTRL as u16), 0);
        assert_eq!(rtc.i2c.get(reg::CTRL2 as u16), 0);
    }

    #[test]
    fn test_init_releases_stale_interrupt() {
        let mut bus = RegisterBus::<1>::new(ADDRESS);
        bus.set(reg::CTRL2 as u16, &[CTRL2_TF | CTRL2_TIE]);
        let mut rtc = Bm8563::new(bus);

        rtc.init().unwrap();

        assert!(rtc.is_available());
        assert_eq!(rtc.i2c.get(reg::CTRL2 as u16), CTRL2_TIE);
    }
}
