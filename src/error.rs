use core::fmt;

/// Everything that can go wrong talking to the sensor.
///
/// Generic over the error type of the underlying bus.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError<E> {
    /// The SPI / I2C transaction failed.
    Bus(E),
    /// PROM contents failed the 4-bit CRC check, or carried an all-zero CRC.
    ///
    /// The calibration words cannot be trusted. Usually bus noise or the wrong
    /// device on the address.
    InvalidCRC { expected: u8, computed: u8 },
    /// The requested oversampling rate is not one of 256, 512, 1024, 2048 or 4096.
    InvalidRate(u32),
    /// Compensation was requested before calibration was loaded.
    Uncalibrated,
}

impl<E> From<E> for DeviceError<E> {
    fn from(error: E) -> Self {
        DeviceError::Bus(error)
    }
}

impl<E: fmt::Debug> fmt::Display for DeviceError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::Bus(e) => write!(f, "bus error: {e:?}"),
            DeviceError::InvalidCRC { expected, computed } => write!(
                f,
                "PROM CRC mismatch: stored {expected:#x}, computed {computed:#x}"
            ),
            DeviceError::InvalidRate(rate) => write!(f, "unsupported oversampling rate {rate}"),
            DeviceError::Uncalibrated => f.write_str("calibration has not been loaded"),
        }
    }
}
