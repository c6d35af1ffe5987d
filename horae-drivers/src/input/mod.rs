//! User input implementations

pub mod button;

pub use button::{DebounceConfig, DebouncedButton};
