//! In-memory register file standing in for a device in unit tests

use super::RegisterBus;
use crate::errors::BusError;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Transaction log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    ReadByte { reg: u8 },
    ReadBytes { reg: u8, len: usize },
    WriteByte { reg: u8, value: u8 },
}

#[derive(Debug)]
struct MockState {
    registers: [u8; 256],
    transactions: Vec<Transaction>,
    fail_reg: Option<u8>,
}

/// Mock register bus
///
/// Clones share state, so a test can keep a handle after moving the bus
/// into a driver. Block reads strip `burst_flag` from the start register
/// and return consecutive register contents.
#[derive(Debug, Clone)]
pub struct MockBus {
    state: Arc<Mutex<MockState>>,
    burst_flag: u8,
}

impl MockBus {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                registers: [0; 256],
                transactions: Vec::new(),
                fail_reg: None,
            })),
            burst_flag: 0,
        }
    }

    /// Treat `flag` as an address auto-increment bit on block reads
    pub fn with_burst_flag(mut self, flag: u8) -> Self {
        self.burst_flag = flag;
        self
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_register(&self, reg: u8, value: u8) {
        self.state().registers[reg as usize] = value;
    }

    pub fn set_registers(&self, start: u8, values: &[u8]) {
        let mut state = self.state();
        for (i, v) in values.iter().enumerate() {
            state.registers[start as usize + i] = *v;
        }
    }

    pub fn register(&self, reg: u8) -> u8 {
        self.state().registers[reg as usize]
    }

    /// Make any transfer touching `reg` fail
    pub fn fail_on(&self, reg: u8) {
        self.state().fail_reg = Some(reg);
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.state().transactions.clone()
    }

    pub fn clear_transactions(&self) {
        self.state().transactions.clear();
    }

    fn check(state: &MockState, reg: u8) -> Result<(), BusError> {
        match state.fail_reg {
            Some(r) if r == reg => Err(BusError::Transfer { reg, reason: "injected fault".to_string() }),
            _ => Ok(()),
        }
    }
}

impl RegisterBus for MockBus {
    fn read_byte(&mut self, reg: u8) -> Result<u8, BusError> {
        let mut state = self.state();
        state.transactions.push(Transaction::ReadByte { reg });
        Self::check(&state, reg)?;
        Ok(state.registers[reg as usize])
    }

    fn read_bytes(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), BusError> {
        let burst_flag = self.burst_flag;
        let mut state = self.state();
        state.transactions.push(Transaction::ReadBytes { reg, len: buf.len() });
        let start = (reg & !burst_flag) as usize;
        for offset in 0..buf.len() {
            Self::check(&state, (start + offset) as u8)?;
        }
        buf.copy_from_slice(&state.registers[start..start + buf.len()]);
        Ok(())
    }

    fn write_byte(&mut self, reg: u8, value: u8) -> Result<(), BusError> {
        let mut state = self.state();
        state.transactions.push(Transaction::WriteByte { reg, value });
        Self::check(&state, reg)?;
        state.registers[reg as usize] = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_burst_read_strips_flag() {
        let mut bus = MockBus::new().with_burst_flag(0x80);
        bus.set_registers(0x28, &[1, 2, 3]);

        let mut buf = [0u8; 3];
        bus.read_bytes(0x28 | 0x80, &mut buf).unwrap();

        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(bus.transactions(), vec![Transaction::ReadBytes { reg: 0xA8, len: 3 }]);
    }

    #[test]
    fn test_mock_fault_injection() {
        let mut bus = MockBus::new();
        bus.fail_on(0x20);
        assert!(bus.write_byte(0x20, 0x0F).is_err());
        assert!(bus.read_byte(0x21).is_ok());
    }
}
