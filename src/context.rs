use crate::calibration::Calibration;
use crate::compensation::{self, Reading};
use crate::oversampling::{Channel, InvalidRate, OversamplingRatio, OversamplingSetting};

/// The two raw conversions making up one sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawReading {
    /// D1
    pub pressure: u32,
    /// D2
    pub temperature: u32,
}

/// Per-device state: calibration, active oversampling per channel and the
/// last compensated reading.
///
/// One of these exists per physical sensor. It owns no bus, so it can be
/// kept separately from the transport if needed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SensorContext {
    calibration: Option<Calibration>, // None until the PROM passes its CRC
    pressure_osr: OversamplingSetting,
    temperature_osr: OversamplingSetting,
    last_reading: Option<Reading>,
}

impl Default for SensorContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorContext {
    /// Uncalibrated, both channels at OSR 4096.
    pub fn new() -> Self {
        Self {
            calibration: None,
            pressure_osr: Channel::Pressure.setting(OversamplingRatio::OSR4096),
            temperature_osr: Channel::Temperature.setting(OversamplingRatio::OSR4096),
            last_reading: None,
        }
    }

    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    /// Calibration only comes out of a CRC-checked PROM, so this stays
    /// inside the crate.
    pub(crate) fn set_calibration(&mut self, calibration: Calibration) {
        self.calibration = Some(calibration);
    }

    pub fn clear_calibration(&mut self) {
        self.calibration = None;
        self.last_reading = None;
    }

    pub fn oversampling(&self, channel: Channel) -> OversamplingSetting {
        match channel {
            Channel::Pressure => self.pressure_osr,
            Channel::Temperature => self.temperature_osr,
        }
    }

    pub fn set_oversampling_ratio(&mut self, channel: Channel, ratio: OversamplingRatio) {
        self.store_oversampling(channel, channel.setting(ratio));
    }

    fn store_oversampling(&mut self, channel: Channel, setting: OversamplingSetting) {
        match channel {
            Channel::Pressure => self.pressure_osr = setting,
            Channel::Temperature => self.temperature_osr = setting,
        }
    }

    /// Selects a channel's oversampling by sample count. On an unsupported
    /// count the current setting is kept.
    pub fn set_oversampling(&mut self, channel: Channel, rate: u32) -> Result<(), InvalidRate> {
        let setting = channel.resolve(rate)?;
        self.store_oversampling(channel, setting);
        Ok(())
    }

    /// Compensates `raw` and remembers the result. `None` while uncalibrated.
    pub fn compensate(&mut self, raw: RawReading) -> Option<Reading> {
        let calibration = self.calibration.as_ref()?;
        let reading = compensation::compensate(raw.temperature, raw.pressure, calibration);
        self.last_reading = Some(reading);
        Some(reading)
    }

    pub fn last_reading(&self) -> Option<Reading> {
        self.last_reading
    }
}
