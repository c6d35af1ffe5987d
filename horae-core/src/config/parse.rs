//! Parser for the clock's TOML configuration file
//!
//! This is a minimal parser that handles only the subset the clock needs.
//! It does NOT support the full TOML spec and it does not allocate.
//!
//! Supported:
//! - `[section]` headers
//! - `key = value` pairs (basic strings, integers, booleans)
//! - `\"` and `\\` escapes inside strings
//! - Comments (`# ...`), whole-line or trailing
//!
//! Keys that are not listed in [`ClockConfig`] are rejected, so a typo never
//! silently falls back to a default. Missing keys keep their defaults.

use core::ops::RangeInclusive;
use core::str::FromStr;

use heapless::String;

use super::types::ClockConfig;
use crate::layout::Rotation;

/// What went wrong while parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseErrorKind {
    /// Malformed `[section]` header
    InvalidSection,
    /// Section name is not one the clock knows
    UnknownSection,
    /// Key is not valid in its section
    UnknownKey,
    /// Line is neither a header nor `key = value`
    MissingValue,
    /// Value has the wrong type or is malformed
    InvalidValue,
    /// Value parsed but is outside the accepted range
    OutOfRange,
    /// String value does not fit its buffer
    TooLong,
}

/// Parse error with the 1-based line it occurred on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParseError {
    pub line: u16,
    pub kind: ParseErrorKind,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Network,
    Resync,
    Display,
    Layout,
    Power,
}

/// Parse a configuration file
///
/// Starts from [`ClockConfig::default`] and overrides whatever the file sets.
pub fn parse_config(input: &str) -> Result<ClockConfig, ParseError> {
    let mut config = ClockConfig::default();
    let mut section = Section::Root;

    for (index, raw) in input.lines().enumerate() {
        let line = u16::try_from(index + 1).unwrap_or(u16::MAX);
        let at = |kind| ParseError { line, kind };

        let content = strip_comment(raw).trim();
        if content.is_empty() {
            continue;
        }

        if let Some(header) = content.strip_prefix('[') {
            let name = header
                .strip_suffix(']')
                .ok_or(at(ParseErrorKind::InvalidSection))?;
            section = parse_section_header(name).map_err(at)?;
            continue;
        }

        let (key, value) = parse_key_value(content).ok_or(at(ParseErrorKind::MissingValue))?;
        apply_value(&mut config, section, key, value).map_err(at)?;
    }

    Ok(config)
}

/// Cut a trailing comment, ignoring `#` inside strings
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

fn parse_section_header(name: &str) -> Result<Section, ParseErrorKind> {
    let name = name.trim();
    if name.is_empty() || name.contains(['[', ']', ' ']) {
        return Err(ParseErrorKind::InvalidSection);
    }
    match name {
        "network" => Ok(Section::Network),
        "resync" => Ok(Section::Resync),
        "display" => Ok(Section::Display),
        "layout" => Ok(Section::Layout),
        "power" => Ok(Section::Power),
        _ => Err(ParseErrorKind::UnknownSection),
    }
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Parse a basic double-quoted string
fn parse_string<const N: usize>(value: &str) -> Result<String<N>, ParseErrorKind> {
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or(ParseErrorKind::InvalidValue)?;

    let mut out = String::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        let c = match c {
            '\\' => match chars.next() {
                Some('"') => '"',
                Some('\\') => '\\',
                Some('t') => '\t',
                _ => return Err(ParseErrorKind::InvalidValue),
            },
            '"' => return Err(ParseErrorKind::InvalidValue),
            c => c,
        };
        out.push(c).map_err(|_| ParseErrorKind::TooLong)?;
    }
    Ok(out)
}

fn parse_int<T: FromStr + PartialOrd>(
    value: &str,
    range: RangeInclusive<T>,
) -> Result<T, ParseErrorKind> {
    let n: T = value.parse().map_err(|_| ParseErrorKind::InvalidValue)?;
    if range.contains(&n) {
        Ok(n)
    } else {
        Err(ParseErrorKind::OutOfRange)
    }
}

fn parse_bool(value: &str) -> Result<bool, ParseErrorKind> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseErrorKind::InvalidValue),
    }
}

fn parse_rotation(value: &str) -> Result<Rotation, ParseErrorKind> {
    let degrees: u16 = value.parse().map_err(|_| ParseErrorKind::InvalidValue)?;
    Rotation::from_degrees(degrees).ok_or(ParseErrorKind::OutOfRange)
}

/// Coordinates may sit slightly off-panel but not absurdly so
const COORD_RANGE: RangeInclusive<i32> = -2048..=2048;
const SIZE_RANGE: RangeInclusive<u32> = 0..=2048;

fn apply_value(
    config: &mut ClockConfig,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ParseErrorKind> {
    match section {
        Section::Root => return Err(ParseErrorKind::UnknownKey),
        Section::Network => {
            let net = &mut config.network;
            match key {
                "ssid" => net.ssid = parse_string(value)?,
                "password" => net.password = parse_string(value)?,
                "ntp_server" => net.ntp_server = parse_string(value)?,
                "utc_offset_hours" => net.utc_offset_hours = parse_int(value, -12..=14)?,
                "connect_attempts" => net.connect_attempts = parse_int(value, 1..=20)?,
                "sync_attempts" => net.sync_attempts = parse_int(value, 1..=60)?,
                _ => return Err(ParseErrorKind::UnknownKey),
            }
        }
        Section::Resync => match key {
            "hour" => config.resync.hour = parse_int(value, 0..=23)?,
            "minute" => config.resync.minute = parse_int(value, 0..=59)?,
            _ => return Err(ParseErrorKind::UnknownKey),
        },
        Section::Display => match key {
            "rotation" => config.display.rotation = parse_rotation(value)?,
            "full_refresh_every_min" => {
                config.display.full_refresh_every_min = parse_int(value, 0..=60)?
            }
            _ => return Err(ParseErrorKind::UnknownKey),
        },
        Section::Layout => {
            let layout = &mut config.layout;
            match key {
                "clock_x" => layout.clock_region.x = parse_int(value, COORD_RANGE)?,
                "clock_y" => layout.clock_region.y = parse_int(value, COORD_RANGE)?,
                "clock_w" => layout.clock_region.w = parse_int(value, SIZE_RANGE)?,
                "clock_h" => layout.clock_region.h = parse_int(value, SIZE_RANGE)?,
                "battery_x" => layout.battery_anchor.x = parse_int(value, COORD_RANGE)?,
                "battery_y" => layout.battery_anchor.y = parse_int(value, COORD_RANGE)?,
                "error_x" => layout.error_anchor.x = parse_int(value, COORD_RANGE)?,
                "error_y" => layout.error_anchor.y = parse_int(value, COORD_RANGE)?,
                "diagnostic_x" => layout.diagnostic_anchor.x = parse_int(value, COORD_RANGE)?,
                "diagnostic_y" => layout.diagnostic_anchor.y = parse_int(value, COORD_RANGE)?,
                _ => return Err(ParseErrorKind::UnknownKey),
            }
        }
        Section::Power => match key {
            "fallback_sleep_s" => config.power.fallback_sleep_s = parse_int(value, 1..=3600)?,
            "wake_on_button" => config.power.wake_on_button = parse_bool(value)?,
            "wake_on_touch" => config.power.wake_on_touch = parse_bool(value)?,
            _ => return Err(ParseErrorKind::UnknownKey),
        },
    }
    Ok(())
}
