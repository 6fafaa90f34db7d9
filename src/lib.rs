//! Platform agnostic driver for the MS5611-01BA03 barometric pressure sensor.
//!
//! The driver loads the factory calibration from PROM (rejecting it if the
//! 4-bit CRC does not match), runs D1/D2 conversions at a per-channel
//! oversampling ratio and applies the datasheet's first and second order
//! compensation.
//!
//! ```ignore
//! use ms561101ba::{MS5611_01BA, DEFAULT_ADDRESS};
//!
//! let mut sensor = MS5611_01BA::new_i2c(i2c, DEFAULT_ADDRESS, delay);
//! sensor.init()?;
//! sensor.set_oversampling_pressure(1024)?;
//! let reading = sensor.read()?;
//! // reading.temperature is in 0.01 C, reading.pressure in Pa
//! ```
//!
//! # Features
//!
//! - `defmt`: log through `defmt` and derive `defmt::Format` on public types.
//! - `log`: log through the `log` facade.
#![cfg_attr(not(test), no_std)]

#[cfg(all(feature = "defmt", feature = "log"))]
compile_error!("Features \"defmt\" and \"log\" are mutually exclusive and cannot be enabled together");

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use embedded_hal::spi::SpiDevice;

pub mod bus;
pub mod calibration;
mod command;
pub mod compensation;
pub mod context;
pub mod conversion;
pub mod error;
pub mod oversampling;

pub use bus::{Bus, I2cBus, SpiBus, ALTERNATE_ADDRESS, DEFAULT_ADDRESS};
pub use calibration::{Calibration, PromImage};
pub use compensation::Reading;
pub use context::{RawReading, SensorContext};
pub use error::DeviceError;
pub use oversampling::{Channel, InvalidRate, OversamplingRatio, OversamplingSetting};

use command::Command;

/// Time the sensor needs after a reset to reload its PROM.
const RESET_DELAY_US: u32 = 3000;

#[allow(non_camel_case_types)]
pub struct MS5611_01BA<B, D> {
    bus: B,
    delay: D,
    context: SensorContext,
}

impl<I2C, D> MS5611_01BA<I2cBus<I2C>, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Sensor on I2C at `address` (see [`DEFAULT_ADDRESS`] and [`ALTERNATE_ADDRESS`]).
    pub fn new_i2c(i2c: I2C, address: u8, delay: D) -> Self {
        Self::new(I2cBus::new(i2c, address), delay)
    }
}

impl<SPI, D> MS5611_01BA<SpiBus<SPI>, D>
where
    SPI: SpiDevice,
    D: DelayNs,
{
    /// Sensor on SPI. Clock speed must not exceed 20MHz, mode 0 or 3.
    pub fn new_spi(spi: SPI, delay: D) -> Self {
        Self::new(SpiBus::new(spi), delay)
    }
}

impl<B, D> MS5611_01BA<B, D>
where
    B: Bus,
    D: DelayNs,
{
    /// Create a new instance of the MS5611_01BA03.
    ///
    /// Does not touch the bus; call [`init`](Self::init) before reading.
    /// Both channels default to OSR4096.
    pub fn new(bus: B, delay: D) -> Self {
        Self::with_context(bus, delay, SensorContext::new())
    }

    /// Reuses state kept from an earlier instance.
    pub fn with_context(bus: B, delay: D, context: SensorContext) -> Self {
        Self {
            bus,
            delay,
            context,
        }
    }

    /// Release the bus and delay, consuming the driver.
    pub fn release(self) -> (B, D) {
        (self.bus, self.delay)
    }

    pub fn context(&self) -> &SensorContext {
        &self.context
    }

    /// Sends the reset sequence and waits for the PROM to reload.
    pub fn reset(&mut self) -> Result<(), DeviceError<B::Error>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("reset");
        #[cfg(feature = "log")]
        log::debug!("reset");

        self.bus.write_command(Command::Reset.value())?;
        self.delay.delay_us(RESET_DELAY_US);
        Ok(())
    }

    /// Every module is individually factory calibrated at two temperatures and two pressures. As a result, 6 coefficients
    /// necessary to compensate for process variations and temperature variations are calculated and stored in the 128-
    /// bit PROM of each module. These must be read before any conversion can be compensated.
    ///
    /// On a CRC failure the previous calibration, if any, is dropped and the
    /// driver is uncalibrated.
    pub fn calibrate(&mut self) -> Result<Calibration, DeviceError<B::Error>> {
        self.context.clear_calibration();
        let calibration = Calibration::load(&mut self.bus)?;
        self.context.set_calibration(calibration);
        Ok(calibration)
    }

    /// Bring-up: reset, load calibration, both channels back to OSR4096.
    pub fn init(&mut self) -> Result<(), DeviceError<B::Error>> {
        self.reset()?;
        self.calibrate()?;
        self.context
            .set_oversampling_ratio(Channel::Pressure, OversamplingRatio::OSR4096);
        self.context
            .set_oversampling_ratio(Channel::Temperature, OversamplingRatio::OSR4096);

        #[cfg(feature = "defmt")]
        defmt::info!("MS5611 initialised");
        #[cfg(feature = "log")]
        log::info!("MS5611 initialised");
        Ok(())
    }

    pub fn calibration(&self) -> Option<&Calibration> {
        self.context.calibration()
    }

    pub fn set_oversampling_ratio(&mut self, channel: Channel, ratio: OversamplingRatio) {
        #[cfg(feature = "defmt")]
        defmt::debug!("{} oversampling set to {=u32}", channel, ratio.rate());
        #[cfg(feature = "log")]
        log::debug!("{:?} oversampling set to {}", channel, ratio.rate());

        self.context.set_oversampling_ratio(channel, ratio);
    }

    fn set_oversampling(&mut self, channel: Channel, rate: u32) -> Result<(), DeviceError<B::Error>> {
        match self.context.set_oversampling(channel, rate) {
            Ok(()) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("{} oversampling set to {=u32}", channel, rate);
                #[cfg(feature = "log")]
                log::debug!("{:?} oversampling set to {}", channel, rate);
                Ok(())
            }
            Err(InvalidRate(rate)) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("rejected {} oversampling rate {=u32}", channel, rate);
                #[cfg(feature = "log")]
                log::warn!("rejected {:?} oversampling rate {}", channel, rate);
                Err(DeviceError::InvalidRate(rate))
            }
        }
    }

    /// Sets the pressure oversampling by sample count (256..=4096, powers of two).
    pub fn set_oversampling_pressure(&mut self, rate: u32) -> Result<(), DeviceError<B::Error>> {
        self.set_oversampling(Channel::Pressure, rate)
    }

    /// Sets the temperature oversampling by sample count (256..=4096, powers of two).
    pub fn set_oversampling_temperature(&mut self, rate: u32) -> Result<(), DeviceError<B::Error>> {
        self.set_oversampling(Channel::Temperature, rate)
    }

    pub fn oversampling_pressure(&self) -> u32 {
        self.context.oversampling(Channel::Pressure).rate()
    }

    pub fn oversampling_temperature(&self) -> u32 {
        self.context.oversampling(Channel::Temperature).rate()
    }

    /// Runs one conversion on `channel` with its active oversampling.
    pub fn read_raw_channel(&mut self, channel: Channel) -> Result<u32, DeviceError<B::Error>> {
        let setting = self.context.oversampling(channel);
        conversion::convert(&mut self.bus, &mut self.delay, &setting)
    }

    /// Pressure conversion, then temperature conversion.
    pub fn read_raw(&mut self) -> Result<RawReading, DeviceError<B::Error>> {
        let pressure = self.read_raw_channel(Channel::Pressure)?;
        let temperature = self.read_raw_channel(Channel::Temperature)?;
        Ok(RawReading {
            pressure,
            temperature,
        })
    }

    /// Reads both channels and returns the compensated reading.
    ///
    /// Fails with [`DeviceError::Uncalibrated`] before any bus traffic if
    /// calibration has not been loaded.
    pub fn read(&mut self) -> Result<Reading, DeviceError<B::Error>> {
        if self.context.calibration().is_none() {
            return Err(DeviceError::Uncalibrated);
        }
        let raw = self.read_raw()?;
        self.context.compensate(raw).ok_or(DeviceError::Uncalibrated)
    }

    /// Last reading returned by [`read`](Self::read).
    pub fn last_reading(&self) -> Option<Reading> {
        self.context.last_reading()
    }
}
