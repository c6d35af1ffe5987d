//! Host-side bus doubles shared by the driver tests

extern crate std;

use std::collections::BTreeMap;
use std::vec::Vec;

use horae_hal::I2cBus;

/// I2C device modelled as a register file with an auto-incrementing pointer
///
/// `ADDR_BYTES` is the register address width: 1 for the RTC, 2 for the
/// touch controller (big-endian).
pub struct RegisterBus<const ADDR_BYTES: usize> {
    pub address: u8,
    pub regs: BTreeMap<u16, u8>,
    /// Every write as (register, data)
    pub writes: Vec<(u16, Vec<u8>)>,
    pub fail: bool,
}

impl<const ADDR_BYTES: usize> RegisterBus<ADDR_BYTES> {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            regs: BTreeMap::new(),
            writes: Vec::new(),
            fail: false,
        }
    }

    pub fn set(&mut self, reg: u16, data: &[u8]) {
        for (i, b) in data.iter().enumerate() {
            self.regs.insert(reg + i as u16, *b);
        }
    }

    pub fn get(&self, reg: u16) -> u8 {
        self.regs.get(&reg).copied().unwrap_or(0)
    }

    fn split(data: &[u8]) -> (u16, &[u8]) {
        if ADDR_BYTES == 2 {
            (u16::from_be_bytes([data[0], data[1]]), &data[2..])
        } else {
            (data[0] as u16, &data[1..])
        }
    }
}

impl<const ADDR_BYTES: usize> I2cBus for RegisterBus<ADDR_BYTES> {
    type Error = ();

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), ()> {
        if self.fail || address != self.address {
            return Err(());
        }
        let (reg, payload) = Self::split(data);
        self.set(reg, payload);
        self.writes.push((reg, payload.to_vec()));
        Ok(())
    }

    fn write_read(&mut self, address: u8, write: &[u8], read: &mut [u8]) -> Result<(), ()> {
        if self.fail || address != self.address {
            return Err(());
        }
        let (reg, _) = Self::split(write);
        for (i, b) in read.iter_mut().enumerate() {
            *b = self.get(reg + i as u16);
        }
        Ok(())
    }
}
