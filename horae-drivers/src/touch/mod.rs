//! Touch controller implementations

pub mod gt911;

pub use gt911::Gt911;
