use super::{SensorDataFrame, SensorDriver};
use crate::bus::RegisterBus;
use crate::decode;
use crate::errors::{SensorError, SensorResult};
use crate::registers::{registers, Register};
use tracing::{debug, trace};

/// Default 7-bit address (SA0 pulled high)
pub const DEFAULT_ADDRESS: u8 = 0x5D;

/// Expected WHO_AM_I response, 0b1011_1011
pub const CHIP_ID: u8 = 0xBB;

/// CTRL_REG1: PD (active) | ODR2:ODR1 (continuous 12.5 Hz / 12.5 Hz)
const CTRL_REG1_DEFAULT: u8 = 0b1110_0000;

/// Pressure counts per millibar
const PRESSURE_LSB_PER_MBAR: f64 = 4096.0;

/// Temperature counts per °C and the zero-count offset
const TEMP_LSB_PER_DEG: f64 = 480.0;
const TEMP_OFFSET_DEG: f64 = 42.5;

registers! {
    /// LPS331AP register map
    BaroReg, BARO_REGS {
        RefPXl = 0x08 => rw,
        RefPL = 0x09 => rw,
        RefPH = 0x0A => rw,
        WhoAmI = 0x0F => r,
        ResConf = 0x10 => rw,
        CtrlReg1 = 0x20 => rw,
        CtrlReg2 = 0x21 => rw,
        CtrlReg3 = 0x22 => rw,
        IntCfgReg = 0x23 => rw,
        IntSourceReg = 0x24 => r,
        ThsPLowReg = 0x25 => rw,
        ThsPHighReg = 0x26 => rw,
        StatusReg = 0x27 => r,
        PressOutXl = 0x28 => r,
        PressOutL = 0x29 => r,
        PressOutH = 0x2A => r,
        TempOutL = 0x2B => r,
        TempOutH = 0x2C => r,
        AmpCtrl = 0x30 => rw,
        DeltaPressXl = 0x3C => rw,
        DeltaPressL = 0x3D => rw,
    }
}

/// LPS331AP pressure and temperature sensor
pub struct Lps331ap<B> {
    id: String,
    bus: B,
}

impl<B: RegisterBus> Lps331ap<B> {
    /// Take ownership of `bus`, verify the chip identity and enable
    /// continuous measurement.
    pub fn new(id: impl Into<String>, mut bus: B) -> SensorResult<Self> {
        let id = id.into();
        let who_am_i = bus.read_byte(BaroReg::WhoAmI.addr())?;
        if who_am_i != CHIP_ID {
            return Err(SensorError::IdentityMismatch {
                sensor: id,
                expected: CHIP_ID,
                actual: who_am_i,
            });
        }
        debug!("[{}] LPS331AP identified", id);

        let mut baro = Self { id, bus };
        baro.enable_default()?;
        Ok(baro)
    }

    /// Power up in continuous mode
    pub fn enable_default(&mut self) -> SensorResult<()> {
        debug!("[{}] write CtrlReg1({:#04x}) = {:#04x}", self.id, BaroReg::CtrlReg1.addr(), CTRL_REG1_DEFAULT);
        self.bus.write_byte(BaroReg::CtrlReg1.addr(), CTRL_REG1_DEFAULT)?;
        Ok(())
    }

    /// Signed 24-bit pressure counts
    pub fn read_pressure_raw(&mut self) -> SensorResult<i32> {
        let xl = self.bus.read_byte(BaroReg::PressOutXl.addr())?;
        let l = self.bus.read_byte(BaroReg::PressOutL.addr())?;
        let h = self.bus.read_byte(BaroReg::PressOutH.addr())?;
        let raw = decode::i24_from_le(xl, l, h);
        trace!("[{}] raw pressure {}", self.id, raw);
        Ok(raw)
    }

    pub fn read_pressure_millibars(&mut self) -> SensorResult<f64> {
        Ok(self.read_pressure_raw()? as f64 / PRESSURE_LSB_PER_MBAR)
    }

    /// Pressure in hundredths of a millibar (Pa), rounded
    pub fn read_pressure(&mut self) -> SensorResult<i64> {
        Ok((self.read_pressure_millibars()? * 100.0).round() as i64)
    }

    /// Signed 16-bit temperature counts
    pub fn read_temperature_raw(&mut self) -> SensorResult<i16> {
        let l = self.bus.read_byte(BaroReg::TempOutL.addr())?;
        let h = self.bus.read_byte(BaroReg::TempOutH.addr())?;
        Ok(decode::i16_from_le(l, h))
    }

    /// Temperature in °C, one decimal place
    pub fn read_temperature(&mut self) -> SensorResult<f64> {
        let raw = self.read_temperature_raw()?;
        Ok(decode::round_to(TEMP_OFFSET_DEG + raw as f64 / TEMP_LSB_PER_DEG, 1))
    }

    /// Log every register of the map at debug level
    pub fn dump_registers(&mut self) -> SensorResult<()> {
        for reg in BARO_REGS {
            let value = self.bus.read_byte(reg.addr())?;
            debug!("[{}] {:<13}({:#04x}) = {:#04x} 0b{:08b}", self.id, reg.name(), reg.addr(), value, value);
        }
        Ok(())
    }

    pub fn release(self) -> B {
        self.bus
    }
}

impl<B: RegisterBus + Send> SensorDriver for Lps331ap<B> {
    fn read(&mut self) -> SensorResult<SensorDataFrame> {
        let pressure = self.read_pressure()?;
        let temp = self.read_temperature()?;
        Ok(SensorDataFrame {
            pressure: Some(pressure as f32),
            temp: Some(temp as f32),
            ..Default::default()
        })
    }

    fn id(&self) -> &str {
        &self.id
    }
}
