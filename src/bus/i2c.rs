#[cfg(target_os = "linux")]
use i2cdev::linux::{LinuxI2CDevice, LinuxI2CError};
#[cfg(target_os = "linux")]
use i2cdev::core::I2CDevice;

use super::{BusSelector, RegisterBus};
use crate::errors::BusError;
use tracing::debug;

/// I2C bus error type - platform specific
#[cfg(target_os = "linux")]
pub type I2CError = LinuxI2CError;

#[cfg(not(target_os = "linux"))]
#[derive(Debug)]
pub struct I2CError(String);

#[cfg(not(target_os = "linux"))]
impl std::fmt::Display for I2CError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "I2C not supported on this platform: {}", self.0)
    }
}

#[cfg(not(target_os = "linux"))]
impl std::error::Error for I2CError {}

/// One device on a Linux I2C adapter
#[cfg(target_os = "linux")]
pub struct I2CBus {
    device: LinuxI2CDevice,
    path: String,
    address: u8,
    debug: bool,
}

#[cfg(not(target_os = "linux"))]
pub struct I2CBus {
    path: String,
    address: u8,
    debug: bool,
}

impl I2CBus {
    fn trace_read(&self, reg: u8, data: &[u8]) {
        if self.debug {
            debug!("[i2c {} @{:#04x}] read {:#04x} -> {:02x?}", self.path, self.address, reg, data);
        }
    }

    fn trace_write(&self, reg: u8, value: u8) {
        if self.debug {
            debug!("[i2c {} @{:#04x}] write {:#04x} <- {:#04x}", self.path, self.address, reg, value);
        }
    }
}

#[cfg(target_os = "linux")]
impl I2CBus {
    /// Open the adapter picked by `selector` and bind it to `address`.
    /// With `debug` set, every register transfer is logged.
    pub fn open(selector: &BusSelector, address: u8, debug: bool) -> Result<Self, BusError> {
        let path = selector.resolve();
        let device = LinuxI2CDevice::new(&path, address as u16)?;
        debug!("[i2c] opened {} for device {:#04x}", path, address);
        Ok(Self { device, path, address, debug })
    }
}

#[cfg(target_os = "linux")]
impl RegisterBus for I2CBus {
    fn read_byte(&mut self, reg: u8) -> Result<u8, BusError> {
        let byte = self.device.smbus_read_byte_data(reg)?;
        self.trace_read(reg, &[byte]);
        Ok(byte)
    }

    fn read_bytes(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), BusError> {
        if buf.len() == 1 {
            // Use SMBus read byte data for single byte reads
            buf[0] = self.device.smbus_read_byte_data(reg)?;
        } else {
            let data = self.device.smbus_read_i2c_block_data(reg, buf.len() as u8)?;
            if data.len() != buf.len() {
                return Err(BusError::ShortRead {
                    reg,
                    expected: buf.len(),
                    actual: data.len(),
                });
            }
            buf.copy_from_slice(&data);
        }
        self.trace_read(reg, buf);
        Ok(())
    }

    fn write_byte(&mut self, reg: u8, value: u8) -> Result<(), BusError> {
        self.trace_write(reg, value);
        self.device.smbus_write_byte_data(reg, value)?;
        Ok(())
    }
}

#[cfg(not(target_os = "linux"))]
impl I2CBus {
    pub fn open(selector: &BusSelector, address: u8, _debug: bool) -> Result<Self, BusError> {
        Err(BusError::Unsupported(format!(
            "cannot open {} for device {:#04x}; I2C is only supported on Linux",
            selector.resolve(),
            address
        )))
    }
}

#[cfg(not(target_os = "linux"))]
impl RegisterBus for I2CBus {
    fn read_byte(&mut self, reg: u8) -> Result<u8, BusError> {
        self.trace_read(reg, &[]);
        Err(BusError::I2c(I2CError("I2C is only supported on Linux".to_string())))
    }

    fn read_bytes(&mut self, reg: u8, _buf: &mut [u8]) -> Result<(), BusError> {
        self.trace_read(reg, &[]);
        Err(BusError::I2c(I2CError("I2C is only supported on Linux".to_string())))
    }

    fn write_byte(&mut self, reg: u8, value: u8) -> Result<(), BusError> {
        self.trace_write(reg, value);
        Err(BusError::I2c(I2CError("I2C is only supported on Linux".to_string())))
    }
}
