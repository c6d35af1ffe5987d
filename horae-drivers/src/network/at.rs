//! ESP-AT text protocol helpers
//!
//! Pure formatting and parsing for the handful of commands the network
//! driver sends, kept apart from the UART plumbing so they can be tested on
//! their own.
//!
//! # Protocol
//!
//! Commands are ASCII lines terminated by `\r\n`. The module answers with
//! zero or more information lines (`+CMD:...`) followed by a final result
//! line: `OK`, `ERROR`, `FAIL` or `SEND FAIL`.

use core::fmt::Write;

use heapless::String;
use horae_core::Timestamp;

/// Longest command line the driver builds
pub const MAX_COMMAND_LEN: usize = 200;

/// Command line buffer
pub type Command = String<MAX_COMMAND_LEN>;

/// Errors talking to the module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AtError {
    /// UART transfer failed
    Uart,
    /// No final result line in time
    Timeout,
    /// The module answered `ERROR` or `FAIL`
    Rejected,
    /// A command or response line did not fit its buffer
    Overflow,
}

/// Final result line of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Final {
    Ok,
    Error,
}

/// Classify a response line as a final result, if it is one
pub fn final_result(line: &str) -> Option<Final> {
    match line {
        "OK" => Some(Final::Ok),
        "ERROR" | "FAIL" | "SEND FAIL" => Some(Final::Error),
        _ => None,
    }
}

/// Append `value` quoted, escaping the characters ESP-AT treats specially
///
/// `"`, `,` and `\` are prefixed with a backslash.
pub fn push_quoted<const N: usize>(out: &mut String<N>, value: &str) -> Result<(), AtError> {
    out.push('"').map_err(|_| AtError::Overflow)?;
    for c in value.chars() {
        if matches!(c, '"' | ',' | '\\') {
            out.push('\\').map_err(|_| AtError::Overflow)?;
        }
        out.push(c).map_err(|_| AtError::Overflow)?;
    }
    out.push('"').map_err(|_| AtError::Overflow)
}

/// `AT+CWJAP="<ssid>","<password>"`
pub fn join_command(ssid: &str, password: &str) -> Result<Command, AtError> {
    let mut cmd = Command::new();
    cmd.push_str("AT+CWJAP=").map_err(|_| AtError::Overflow)?;
    push_quoted(&mut cmd, ssid)?;
    cmd.push(',').map_err(|_| AtError::Overflow)?;
    push_quoted(&mut cmd, password)?;
    Ok(cmd)
}

/// `AT+CIPSNTPCFG=1,<utc_offset>,"<server>"`
pub fn sntp_config_command(utc_offset_hours: i8, server: &str) -> Result<Command, AtError> {
    let mut cmd = Command::new();
    write!(cmd, "AT+CIPSNTPCFG=1,{},", utc_offset_hours).map_err(|_| AtError::Overflow)?;
    push_quoted(&mut cmd, server)?;
    Ok(cmd)
}

/// Information line prefix carrying the SNTP time
pub const SNTP_TIME_PREFIX: &str = "+CIPSNTPTIME:";

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Parse `+CIPSNTPTIME:Thu Aug 04 14:48:05 2016`
///
/// The module reports local time (the offset given to `AT+CIPSNTPCFG` is
/// already applied). Before the first successful sync it reports a date in
/// 1970; that still parses, and the caller decides whether it is plausible.
pub fn parse_sntp_time(line: &str) -> Option<Timestamp> {
    let rest = line.strip_prefix(SNTP_TIME_PREFIX)?.trim();
    let mut fields = rest.split_ascii_whitespace();

    let _weekday = fields.next()?;
    let month_name = fields.next()?;
    let day: u8 = fields.next()?.parse().ok()?;
    let clock = fields.next()?;
    let year: u16 = fields.next()?.parse().ok()?;
    if fields.next().is_some() {
        return None;
    }

    let month = MONTHS.iter().position(|m| *m == month_name)? as u8 + 1;

    let mut hms = clock.split(':');
    let hour: u8 = hms.next()?.parse().ok()?;
    let minute: u8 = hms.next()?.parse().ok()?;
    let second: u8 = hms.next()?.parse().ok()?;
    if hms.next().is_some() {
        return None;
    }

    let time = Timestamp::new(year, month, day, hour, minute, second);
    time.is_valid().then_some(time)
}
