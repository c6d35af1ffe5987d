//! Configuration
//!
//! Board-agnostic configuration types, plus the parser for the TOML subset
//! the firmware reads from `horae.toml`.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError, ParseErrorKind};
pub use types::*;
