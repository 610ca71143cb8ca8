use super::{SensorDataFrame, SensorDriver};
use crate::bus::RegisterBus;
use crate::decode;
use crate::errors::{SensorError, SensorResult};
use crate::registers::{registers, Register};
use serde::Deserialize;
use tracing::{debug, info, trace};

/// Default 7-bit address (SDO pulled high)
pub const DEFAULT_ADDRESS: u8 = 0x6B;

/// Expected WHO_AM_I response, 0b1101_0100
pub const CHIP_ID: u8 = 0xD4;

/// Maximum number of data-ready poll attempts.
///
/// Carried for parity with the chip's reference settings only: no read path
/// polls or retries, and nothing consumes this value.
pub const MAX_POLL_ATTEMPTS: u32 = 100;

/// Degrees/s to radians/s multiplier
pub const DPS_TO_RADS: f64 = 0.017453293;

/// Register sub-address bit enabling auto-increment on multi-byte reads
pub const AUTO_INCREMENT: u8 = 0x80;

/// CTRL_REG1: PD (normal mode) | ZEN | YEN | XEN
const CTRL_REG1_NORMAL_XYZ: u8 = 0b0000_1111;

registers! {
    /// L3GD20 register map
    GyroReg, GYRO_REGS {
        WhoAmI = 0x0F => r,
        CtrlReg1 = 0x20 => rw,
        CtrlReg2 = 0x21 => rw,
        CtrlReg3 = 0x22 => rw,
        CtrlReg4 = 0x23 => rw,
        CtrlReg5 = 0x24 => rw,
        Reference = 0x25 => rw,
        OutTemp = 0x26 => r,
        StatusReg = 0x27 => r,
        OutXL = 0x28 => r,
        OutXH = 0x29 => r,
        OutYL = 0x2A => r,
        OutYH = 0x2B => r,
        OutZL = 0x2C => r,
        OutZH = 0x2D => r,
        FifoCtrlReg = 0x2E => rw,
        FifoSrcReg = 0x2F => r,
        Int1Cfg = 0x30 => rw,
        Int1Src = 0x31 => r,
        TshXH = 0x32 => rw,
        TshXL = 0x33 => rw,
        TshYH = 0x34 => rw,
        TshYL = 0x35 => rw,
        TshZH = 0x36 => rw,
        TshZL = 0x37 => rw,
        Int1Duration = 0x38 => rw,
    }
}

/// Gyroscope full-scale selection (CTRL_REG4 FS1:FS0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum FullScaleRange {
    #[serde(rename = "250dps")]
    Dps250,
    #[serde(rename = "500dps")]
    Dps500,
    #[default]
    #[serde(rename = "2000dps")]
    Dps2000,
}

impl FullScaleRange {
    /// Bit pattern written to CTRL_REG4
    pub fn bits(self) -> u8 {
        match self {
            FullScaleRange::Dps250 => 0x00,
            FullScaleRange::Dps500 => 0x10,
            FullScaleRange::Dps2000 => 0x20,
        }
    }

    /// Degrees/s per LSB
    pub fn sensitivity(self) -> f64 {
        match self {
            FullScaleRange::Dps250 => 0.00875,
            FullScaleRange::Dps500 => 0.0175,
            FullScaleRange::Dps2000 => 0.070,
        }
    }
}

/// Per-axis zero-rate offsets in degrees/s, subtracted after scaling.
///
/// The defaults were measured on one physical unit; recalibrate per board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GyroCalibration {
    pub offset: [f64; 3],
}

impl Default for GyroCalibration {
    fn default() -> Self {
        Self { offset: [-2.94, 1.12, -1.4] }
    }
}

/// L3GD20 3-axis gyroscope
pub struct L3gd20<B> {
    id: String,
    bus: B,
    range: Option<FullScaleRange>,
    calibration: GyroCalibration,
}

impl<B: RegisterBus> L3gd20<B> {
    /// Take ownership of `bus` and verify the chip identity.
    ///
    /// The range stays unset until [`configure`](Self::configure) is called.
    pub fn new(id: impl Into<String>, mut bus: B) -> SensorResult<Self> {
        let id = id.into();
        let who_am_i = bus.read_byte(GyroReg::WhoAmI.addr())?;
        if who_am_i != CHIP_ID {
            return Err(SensorError::IdentityMismatch {
                sensor: id,
                expected: CHIP_ID,
                actual: who_am_i,
            });
        }
        debug!("[{}] L3GD20 identified", id);

        Ok(Self {
            id,
            bus,
            range: None,
            calibration: GyroCalibration::default(),
        })
    }

    pub fn with_calibration(mut self, calibration: GyroCalibration) -> Self {
        self.calibration = calibration;
        self
    }

    pub fn calibration(&self) -> GyroCalibration {
        self.calibration
    }

    /// Range last written to the chip, if any
    pub fn range(&self) -> Option<FullScaleRange> {
        self.range
    }

    /// Switch to normal mode with all axes enabled, then select `range`.
    pub fn configure(&mut self, range: FullScaleRange) -> SensorResult<()> {
        self.write_register(GyroReg::CtrlReg1, CTRL_REG1_NORMAL_XYZ)?;
        self.write_register(GyroReg::CtrlReg4, range.bits())?;
        self.range = Some(range);
        info!("[{}] configured for {:?}", self.id, range);
        Ok(())
    }

    /// Sign-extended axis counts, unscaled
    pub fn read_raw(&mut self) -> SensorResult<[i16; 3]> {
        let mut buf = [0u8; 6];
        self.bus.read_bytes(GyroReg::OutXL.addr() | AUTO_INCREMENT, &mut buf)?;
        let raw = [
            decode::i16_from_le(buf[0], buf[1]),
            decode::i16_from_le(buf[2], buf[3]),
            decode::i16_from_le(buf[4], buf[5]),
        ];
        trace!("[{}] raw rate {:?}", self.id, raw);
        Ok(raw)
    }

    /// Calibrated angular rate in degrees/s, rounded to whole units
    pub fn read(&mut self) -> SensorResult<[f64; 3]> {
        let range = self.range.ok_or_else(|| SensorError::NotConfigured {
            sensor: self.id.clone(),
        })?;
        let raw = self.read_raw()?;
        Ok(scale_rate(raw, range, &self.calibration))
    }

    /// [`read`](Self::read) converted to radians/s
    pub fn read_radians(&mut self) -> SensorResult<[f64; 3]> {
        Ok(self.read()?.map(|v| v * DPS_TO_RADS))
    }

    /// [`read_radians`](Self::read_radians) converted back through 180/π
    pub fn read_degrees(&mut self) -> SensorResult<[f64; 3]> {
        Ok(self.read_radians()?.map(|v| v.to_degrees()))
    }

    /// Die temperature from OUT_TEMP as `(256 - raw) / 10`.
    ///
    /// The register byte is inverted linearly, not sign-extended.
    pub fn read_temperature(&mut self) -> SensorResult<f64> {
        let raw = self.bus.read_byte(GyroReg::OutTemp.addr())?;
        Ok((256.0 - raw as f64) / 10.0)
    }

    /// Log every register of the map at debug level
    pub fn dump_registers(&mut self) -> SensorResult<()> {
        for reg in GYRO_REGS {
            let value = self.bus.read_byte(reg.addr())?;
            debug!("[{}] {:<13}({:#04x}) = {:#04x} 0b{:08b}", self.id, reg.name(), reg.addr(), value, value);
        }
        Ok(())
    }

    /// Give the transport back
    pub fn release(self) -> B {
        self.bus
    }

    fn write_register(&mut self, reg: GyroReg, value: u8) -> SensorResult<()> {
        debug_assert!(reg.is_writable(), "{} is read-only", reg.name());
        debug!("[{}] write {:<9}({:#04x}) = {:#04x}", self.id, reg.name(), reg.addr(), value);
        self.bus.write_byte(reg.addr(), value)?;
        Ok(())
    }
}

/// Scale raw counts by the range sensitivity, remove the calibration offset
/// and round to whole degrees/s.
pub fn scale_rate(raw: [i16; 3], range: FullScaleRange, calibration: &GyroCalibration) -> [f64; 3] {
    let sensitivity = range.sensitivity();
    let mut out = [0.0; 3];
    for axis in 0..3 {
        out[axis] = (raw[axis] as f64 * sensitivity - calibration.offset[axis]).round();
    }
    out
}

impl<B: RegisterBus + Send> SensorDriver for L3gd20<B> {
    fn read(&mut self) -> SensorResult<SensorDataFrame> {
        let rate = L3gd20::read(self)?;
        let temp = self.read_temperature()?;
        Ok(SensorDataFrame {
            gyro: Some(rate.map(|v| v as f32)),
            temp: Some(temp as f32),
            ..Default::default()
        })
    }

    fn id(&self) -> &str {
        &self.id
    }
}
