//! Real-time clock implementations

pub mod bm8563;

pub use bm8563::Bm8563;
