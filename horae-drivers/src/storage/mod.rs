//! Storage implementations

pub mod sdcard;

pub use sdcard::{FixedTime, SdStorage};
