//! Datasheet fixed-point compensation.
//!
//! Variable names follow the MS5611-01BA03 datasheet. All intermediate terms
//! are `i64`; products like `D1 * SENS` do not fit in 32 bits.

use crate::calibration::Calibration;

/// Compensated output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    /// Hundredths of a degree celsius.
    pub temperature: i32,
    /// Pascal, i.e. hundredths of a millibar.
    pub pressure: i32,
}

impl Reading {
    pub fn temperature_celsius(&self) -> f32 {
        self.temperature as f32 / 100.0
    }

    pub fn pressure_mbar(&self) -> f32 {
        self.pressure as f32 / 100.0
    }
}

/// Second order correction terms, all zero at or above 20 °C.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SecondOrder {
    pub t2: i64,
    pub off2: i64,
    pub sens2: i64,
}

impl SecondOrder {
    /// `temp` is the first order temperature, `d_t` the raw temperature
    /// difference from the reference.
    pub fn new(temp: i64, d_t: i64) -> Self {
        // Low temperature (< 20C)
        if temp >= 2000 {
            return SecondOrder::default();
        }
        let t2 = (d_t * d_t) >> 31;
        let mut off2 = (5 * (temp - 2000).pow(2)) >> 1;
        let mut sens2 = off2 >> 1;

        // Very low temperature (< -15C)
        if temp < -1500 {
            let tmp = (temp + 1500).pow(2);
            off2 += 7 * tmp;
            sens2 += (11 * tmp) >> 1;
        }
        SecondOrder { t2, off2, sens2 }
    }
}

/// Mask for the 24 bit ADC result.
const ADC_MASK: u32 = 0x00FF_FFFF;

/// Turns raw D1 (pressure) and D2 (temperature) conversions into a
/// [`Reading`].
///
/// The ADC only produces 24 bits; anything above that is ignored.
pub fn compensate(raw_temperature: u32, raw_pressure: u32, calibration: &Calibration) -> Reading {
    let d1 = (raw_pressure & ADC_MASK) as i64;
    let d2 = (raw_temperature & ADC_MASK) as i64;

    let d_t = d2 - ((calibration.t_ref as i64) << 8);
    let mut temp = 2000 + ((calibration.temp_sens as i64 * d_t) >> 23);
    let mut off = ((calibration.off_t1 as i64) << 16) + ((calibration.tco as i64 * d_t) >> 7);
    let mut sens = ((calibration.sens_t1 as i64) << 15) + ((calibration.tcs as i64 * d_t) >> 8);

    let correction = SecondOrder::new(temp, d_t);
    temp -= correction.t2;
    off -= correction.off2;
    sens -= correction.sens2;

    let pressure = (((d1 * sens) >> 21) - off) >> 15;

    // 24 bit inputs and 16 bit coefficients keep both results well inside i32.
    Reading {
        temperature: temp as i32,
        pressure: pressure as i32,
    }
}
