//! Packed BCD helpers for RTC registers

/// Decode a packed BCD byte
pub fn to_bin(value: u8) -> u8 {
    (value >> 4) * 10 + (value & 0x0F)
}

/// Encode `value` (0-99) as packed BCD
pub fn from_bin(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}
