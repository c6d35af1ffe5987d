//! Wi-Fi over an ESP-AT co-processor
//!
//! An ESP32/ESP8266 running Espressif's AT firmware on a UART. It only ever
//! associates as a station and asks its built-in SNTP client for the time;
//! no sockets are opened.
//!
//! Reads are polled with a 1 ms delay between empty reads. Every received
//! byte is charged its transfer time at the line rate, so a module that never
//! stops talking still runs out of time.

use embedded_hal::delay::DelayNs;
use heapless::Vec;
use horae_core::traits::{Clock, InitError, Network};
use horae_core::Timestamp;
use horae_hal::Uart;

use super::at::{self, AtError, Final};

/// Longest response line kept; longer lines are truncated
const MAX_LINE_LEN: usize = 96;

/// Poll interval while waiting for response bytes
const POLL_INTERVAL_MS: u32 = 1;

/// `AT` probes sent while waiting for the module to boot
const INIT_PROBES: u8 = 3;

/// ESP-AT driver configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EspAtConfig {
    /// Offset applied by the module's SNTP client (-12 to +14)
    pub utc_offset_hours: i8,
    /// Association attempts per `connect`
    pub connect_attempts: u8,
    /// Time queries per `sync_time`
    pub sync_attempts: u8,
    /// Wait before each time query
    pub sync_interval_ms: u32,
    /// Timeout for ordinary commands
    pub command_timeout_ms: u32,
    /// Timeout for `AT+CWJAP`
    pub join_timeout_ms: u32,
    /// Earliest year accepted as a real SNTP answer
    pub min_year: u16,
    /// UART line rate, used to charge received bytes against timeouts
    pub baudrate: u32,
}

impl Default for EspAtConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: 8,
            connect_attempts: 2,
            sync_attempts: 10,
            sync_interval_ms: 2000,
            command_timeout_ms: 2000,
            join_timeout_ms: 20_000,
            min_year: 2022,
            baudrate: 115_200,
        }
    }
}

/// Time spent on one command: idle polls plus bytes received
struct Budget {
    elapsed_us: u64,
    limit_us: u64,
    byte_us: u64,
}

impl Budget {
    fn new(timeout_ms: u32, baudrate: u32) -> Self {
        Self {
            elapsed_us: 0,
            limit_us: timeout_ms as u64 * 1000,
            // 8N1: ten bit times per byte
            byte_us: 10_000_000_u64.div_ceil(baudrate.max(1) as u64),
        }
    }

    fn charge_bytes(&mut self, n: usize) {
        self.elapsed_us += n as u64 * self.byte_us;
    }

    fn charge_ms(&mut self, ms: u32) {
        self.elapsed_us += ms as u64 * 1000;
    }

    fn exhausted(&self) -> bool {
        self.elapsed_us >= self.limit_us
    }
}

/// Network access through an ESP-AT module
pub struct EspAtNetwork<U, D> {
    uart: U,
    delay: D,
    config: EspAtConfig,
}

impl<U: Uart, D: DelayNs> EspAtNetwork<U, D> {
    pub fn new(uart: U, delay: D, config: EspAtConfig) -> Self {
        Self {
            uart,
            delay,
            config,
        }
    }

    /// Release the UART and delay
    pub fn release(self) -> (U, D) {
        (self.uart, self.delay)
    }

    /// Send a command and wait for its final result
    pub fn command(&mut self, cmd: &str, timeout_ms: u32) -> Result<(), AtError> {
        self.command_with(cmd, timeout_ms, |_| {})
    }

    /// Send a command, passing each information line to `on_line`
    ///
    /// Echoed commands and unsolicited lines are passed through as well;
    /// callers match on the prefix they expect.
    pub fn command_with<F>(
        &mut self,
        cmd: &str,
        timeout_ms: u32,
        mut on_line: F,
    ) -> Result<(), AtError>
    where
        F: FnMut(&str),
    {
        let mut budget = Budget::new(timeout_ms, self.config.baudrate);
        self.discard_input(&mut budget)?;
        self.uart
            .write_blocking(cmd.as_bytes())
            .and_then(|_| self.uart.write_blocking(b"\r\n"))
            .and_then(|_| self.uart.flush())
            .map_err(|_| AtError::Uart)?;

        let mut line: Vec<u8, MAX_LINE_LEN> = Vec::new();
        loop {
            if budget.exhausted() {
                return Err(AtError::Timeout);
            }
            let byte = match self.uart.try_read_byte().map_err(|_| AtError::Uart)? {
                Some(byte) => {
                    budget.charge_bytes(1);
                    byte
                }
                None => {
                    self.delay.delay_ms(POLL_INTERVAL_MS);
                    budget.charge_ms(POLL_INTERVAL_MS);
                    continue;
                }
            };

            match byte {
                b'\r' => {}
                b'\n' => {
                    let text = core::str::from_utf8(&line).unwrap_or("");
                    match at::final_result(text) {
                        Some(Final::Ok) => return Ok(()),
                        Some(Final::Error) => return Err(AtError::Rejected),
                        None if !text.is_empty() => on_line(text),
                        None => {}
                    }
                    line.clear();
                }
                // Truncate: the tail of an overlong line is never needed
                b => {
                    let _ = line.push(b);
                }
            }
        }
    }

    /// Drop anything the module sent before the next command
    ///
    /// Discarded bytes count against the command's budget.
    fn discard_input(&mut self, budget: &mut Budget) -> Result<(), AtError> {
        let mut scratch = [0u8; 32];
        while !budget.exhausted() {
            let n = self
                .uart
                .read_available(&mut scratch)
                .map_err(|_| AtError::Uart)?;
            if n == 0 {
                break;
            }
            budget.charge_bytes(n);
        }
        Ok(())
    }

    /// Ask the module for its current SNTP time
    fn query_time(&mut self) -> Result<Option<Timestamp>, AtError> {
        let mut time = None;
        self.command_with("AT+CIPSNTPTIME?", self.config.command_timeout_ms, |line| {
            if let Some(t) = at::parse_sntp_time(line) {
                time = Some(t);
            }
        })?;
        Ok(time)
    }
}

impl<U: Uart, D: DelayNs> Network for EspAtNetwork<U, D> {
    fn init(&mut self) -> Result<(), InitError> {
        let timeout = self.config.command_timeout_ms;
        let alive = (0..INIT_PROBES).any(|_| self.command("AT", timeout).is_ok());
        if !alive {
            return Err(InitError::NotFound);
        }
        self.command("ATE0", timeout)
            .and_then(|_| self.command("AT+CWMODE=1", timeout))
            .map_err(|e| match e {
                AtError::Timeout => InitError::Timeout,
                AtError::Rejected => InitError::WrongDevice,
                AtError::Uart | AtError::Overflow => InitError::Bus,
            })
    }

    fn connect(&mut self, ssid: &str, credential: &str) -> bool {
        let Ok(cmd) = at::join_command(ssid, credential) else {
            return false;
        };
        let timeout = self.config.join_timeout_ms;
        (0..self.config.connect_attempts).any(|_| self.command(&cmd, timeout).is_ok())
    }

    /// Configure SNTP, then poll until a plausible time arrives
    ///
    /// The clock is only written once the module reports a year at or after
    /// `min_year`; until its first sync it answers with the 1970 epoch.
    fn sync_time<C: Clock>(&mut self, server: &str, clock: &mut C) -> bool {
        let Ok(cmd) = at::sntp_config_command(self.config.utc_offset_hours, server) else {
            return false;
        };
        if self.command(&cmd, self.config.command_timeout_ms).is_err() {
            return false;
        }

        for _ in 0..self.config.sync_attempts {
            self.delay.delay_ms(self.config.sync_interval_ms);
            match self.query_time() {
                Ok(Some(time)) if time.is_plausible(self.config.min_year) => {
                    return clock.set_now(time).is_ok();
                }
                _ => {}
            }
        }
        false
    }
}
