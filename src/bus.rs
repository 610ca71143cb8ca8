pub mod i2c;
#[cfg(test)]
pub mod mock;

use crate::errors::BusError;

/// Register-level access to a single device on an I2C bus.
///
/// Implementations are bound to one device address; drivers only ever name
/// registers. Every call blocks until the transfer completes.
pub trait RegisterBus {
    /// Read one register
    fn read_byte(&mut self, reg: u8) -> Result<u8, BusError>;

    /// Read `buf.len()` bytes starting at `reg`. Chip-specific auto-increment
    /// flags must already be applied to `reg` by the caller.
    fn read_bytes(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), BusError>;

    /// Write one register
    fn write_byte(&mut self, reg: u8, value: u8) -> Result<(), BusError>;
}

impl<B: RegisterBus + ?Sized> RegisterBus for Box<B> {
    fn read_byte(&mut self, reg: u8) -> Result<u8, BusError> {
        (**self).read_byte(reg)
    }

    fn read_bytes(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), BusError> {
        (**self).read_bytes(reg, buf)
    }

    fn write_byte(&mut self, reg: u8, value: u8) -> Result<(), BusError> {
        (**self).write_byte(reg, value)
    }
}

/// Bus type enum for different communication interfaces
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusType {
    I2C,
}

impl BusType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i2c" => Some(BusType::I2C),
            _ => None,
        }
    }
}

/// Which I2C adapter to open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusSelector {
    /// First of `/dev/i2c-1`, `/dev/i2c-0` that exists
    Auto,
    /// `/dev/i2c-<n>`
    Number(u8),
    /// Explicit device node
    Path(String),
}

/// Candidate adapters tried by `BusSelector::Auto`, in order. Bus 1 is the
/// user-facing header bus on every Raspberry Pi after revision 1.
pub const AUTO_BUS_CANDIDATES: &[&str] = &["/dev/i2c-1", "/dev/i2c-0"];

impl BusSelector {
    /// Resolve to a device node path
    pub fn resolve(&self) -> String {
        self.resolve_with(|p| std::path::Path::new(p).exists())
    }

    fn resolve_with(&self, exists: impl Fn(&str) -> bool) -> String {
        match self {
            BusSelector::Auto => AUTO_BUS_CANDIDATES
                .iter()
                .find(|p| exists(p))
                .unwrap_or(&AUTO_BUS_CANDIDATES[0])
                .to_string(),
            BusSelector::Number(n) => format!("/dev/i2c-{}", n),
            BusSelector::Path(p) => p.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_type_from_str() {
        assert_eq!(BusType::from_str("I2C"), Some(BusType::I2C));
        assert_eq!(BusType::from_str("serial"), None);
    }

    #[test]
    fn test_selector_number_and_path() {
        assert_eq!(BusSelector::Number(3).resolve(), "/dev/i2c-3");
        assert_eq!(BusSelector::Path("/dev/custom".to_string()).resolve(), "/dev/custom");
    }

    #[test]
    fn test_auto_selector_prefers_bus_one() {
        assert_eq!(BusSelector::Auto.resolve_with(|_| true), "/dev/i2c-1");
        assert_eq!(BusSelector::Auto.resolve_with(|p| p == "/dev/i2c-0"), "/dev/i2c-0");
        assert_eq!(BusSelector::Auto.resolve_with(|_| false), "/dev/i2c-1");
    }
}
