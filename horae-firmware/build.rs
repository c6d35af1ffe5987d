//! Build script for horae-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates horae.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate horae.toml at compile time
///
/// Mirrors the ranges the on-target parser enforces.
fn validate_config() {
    println!("cargo:rerun-if-changed=horae.toml");

    let config_path = Path::new("horae.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: horae.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds horae.toml as its default configuration.    ║\n\
            ║  Please create one in the horae-firmware directory.              ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read horae.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in horae.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_network(&config, &mut errors);
    validate_resync(&config, &mut errors);
    validate_display(&config, &mut errors);
    validate_layout(&config, &mut errors);
    validate_power(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid configuration in horae.toml                      ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=horae.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

const SECTIONS: [&str; 5] = ["network", "resync", "display", "layout", "power"];

/// Only known sections, each a table, no top-level keys
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        return;
    };
    for (name, value) in root {
        if !SECTIONS.contains(&name.as_str()) {
            if value.is_table() {
                errors.push(format!("unknown section [{}]", name));
            } else {
                errors.push(format!("'{}' must be inside a section", name));
            }
        } else if !value.is_table() {
            errors.push(format!("[{}] must be a table", name));
        }
    }
}

/// Check that every key of `section` is known
fn check_keys(config: &toml::Value, section: &str, known: &[&str], errors: &mut Vec<String>) {
    let Some(table) = config.get(section).and_then(|s| s.as_table()) else {
        return;
    };
    for key in table.keys() {
        if !known.contains(&key.as_str()) {
            errors.push(format!("[{}] unknown key '{}'", section, key));
        }
    }
}

fn check_int(
    config: &toml::Value,
    section: &str,
    key: &str,
    range: RangeInclusive<i64>,
    errors: &mut Vec<String>,
) {
    match config.get(section).and_then(|s| s.get(key)) {
        None => {}
        Some(toml::Value::Integer(n)) if range.contains(n) => {}
        Some(toml::Value::Integer(_)) => errors.push(format!(
            "[{}] {} must be {}-{}",
            section,
            key,
            range.start(),
            range.end()
        )),
        Some(_) => errors.push(format!("[{}] {} must be an integer", section, key)),
    }
}

fn check_string(
    config: &toml::Value,
    section: &str,
    key: &str,
    max_len: usize,
    errors: &mut Vec<String>,
) {
    match config.get(section).and_then(|s| s.get(key)) {
        None => {}
        Some(toml::Value::String(s)) if s.len() <= max_len => {}
        Some(toml::Value::String(_)) => errors.push(format!(
            "[{}] {} is longer than {} bytes",
            section, key, max_len
        )),
        Some(_) => errors.push(format!("[{}] {} must be a string", section, key)),
    }
}

fn check_bool(config: &toml::Value, section: &str, key: &str, errors: &mut Vec<String>) {
    match config.get(section).and_then(|s| s.get(key)) {
        None | Some(toml::Value::Boolean(_)) => {}
        Some(_) => errors.push(format!("[{}] {} must be true or false", section, key)),
    }
}

fn validate_network(config: &toml::Value, errors: &mut Vec<String>) {
    check_keys(
        config,
        "network",
        &[
            "ssid",
            "password",
            "ntp_server",
            "utc_offset_hours",
            "connect_attempts",
            "sync_attempts",
        ],
        errors,
    );
    check_string(config, "network", "ssid", 32, errors);
    check_string(config, "network", "password", 64, errors);
    check_string(config, "network", "ntp_server", 64, errors);
    check_int(config, "network", "utc_offset_hours", -12..=14, errors);
    check_int(config, "network", "connect_attempts", 1..=20, errors);
    check_int(config, "network", "sync_attempts", 1..=60, errors);
}

fn validate_resync(config: &toml::Value, errors: &mut Vec<String>) {
    check_keys(config, "resync", &["hour", "minute"], errors);
    check_int(config, "resync", "hour", 0..=23, errors);
    check_int(config, "resync", "minute", 0..=59, errors);
}

fn validate_display(config: &toml::Value, errors: &mut Vec<String>) {
    check_keys(
        config,
        "display",
        &["rotation", "full_refresh_every_min"],
        errors,
    );
    check_int(config, "display", "full_refresh_every_min", 0..=60, errors);

    if let Some(toml::Value::Integer(deg)) = config.get("display").and_then(|d| d.get("rotation"))
    {
        if ![0, 90, 180, 270].contains(deg) {
            errors.push("[display] rotation must be 0, 90, 180 or 270".to_string());
        }
    }
}

fn validate_layout(config: &toml::Value, errors: &mut Vec<String>) {
    const COORDS: [&str; 8] = [
        "clock_x",
        "clock_y",
        "battery_x",
        "battery_y",
        "error_x",
        "error_y",
        "diagnostic_x",
        "diagnostic_y",
    ];
    const SIZES: [&str; 2] = ["clock_w", "clock_h"];

    let known: Vec<&str> = COORDS.iter().chain(SIZES.iter()).copied().collect();
    check_keys(config, "layout", &known, errors);
    for key in COORDS {
        check_int(config, "layout", key, -2048..=2048, errors);
    }
    for key in SIZES {
        check_int(config, "layout", key, 0..=2048, errors);
    }
}

fn validate_power(config: &toml::Value, errors: &mut Vec<String>) {
    check_keys(
        config,
        "power",
        &["fallback_sleep_s", "wake_on_button", "wake_on_touch"],
        errors,
    );
    check_int(config, "power", "fallback_sleep_s", 1..=3600, errors);
    check_bool(config, "power", "wake_on_button", errors);
    check_bool(config, "power", "wake_on_touch", errors);
}
