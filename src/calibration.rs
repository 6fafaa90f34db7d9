use crate::bus::Bus;
use crate::command::{Command, PROM_WORDS};
use crate::error::DeviceError;

/// Factory calibration data read from PROM
///
/// Only obtainable from a PROM image that passed its CRC check, through
/// [`PromImage::validate`] or [`Calibration::load`].
///
/// ```compile_fail
/// let calibration = ms561101ba::Calibration::new(&[0u16; 8]);
/// ```
///
/// ```compile_fail
/// let calibration = ms561101ba::Calibration {
///     sens_t1: 0,
///     off_t1: 0,
///     tcs: 0,
///     tco: 0,
///     t_ref: 0,
///     temp_sens: 0,
/// };
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    /// C1: Pressure sensitivity | SENST1
    pub(crate) sens_t1: u16,
    /// C2: Pressure offset | OFFT1
    pub(crate) off_t1: u16,
    /// C3: Temperature coefficient of pressure sensitivity | TCS
    pub(crate) tcs: u16,
    /// C4: Temperature coefficient of pressure offset | TCO
    pub(crate) tco: u16,
    /// C5: Reference temperature | TREF
    pub(crate) t_ref: u16,
    /// C6: Temperature coefficient of the temperature | TEMPSENS
    pub(crate) temp_sens: u16,
    // We don't store PROM[0] (manufacturer info) or PROM[7] (serial/CRC) here
}

/// The raw 128 bit PROM, as read off the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PromImage(pub [u16; PROM_WORDS]);

impl PromImage {
    /// Reads all eight words, one PROM read command per word.
    pub fn read<B: Bus>(bus: &mut B) -> Result<Self, B::Error> {
        let mut words = [0u16; PROM_WORDS];
        for (address, word) in (0u8..).zip(words.iter_mut()) {
            *word = bus.read_word(Command::ReadPROM(address).value())?;
        }
        Ok(PromImage(words))
    }

    /// CRC stored in the low nibble of the last word.
    pub fn stored_crc(&self) -> u8 {
        (self.0[PROM_WORDS - 1] & 0x000F) as u8
    }

    /// 4-bit CRC from application note AN520.
    ///
    /// The low byte of the last word (which carries the stored CRC) is
    /// treated as zero.
    pub fn crc4(&self) -> u8 {
        let mut words = self.0;
        words[PROM_WORDS - 1] &= 0xFF00;

        let mut n_rem: u16 = 0;
        for byte in words.iter().flat_map(|word| word.to_be_bytes()) {
            n_rem ^= byte as u16;
            for _ in 0..8 {
                if n_rem & 0x8000 != 0 {
                    n_rem = (n_rem << 1) ^ 0x3000;
                } else {
                    n_rem <<= 1;
                }
            }
        }
        ((n_rem >> 12) & 0x000F) as u8
    }

    /// Checks the CRC and hands back the six coefficients.
    ///
    /// A stored CRC of zero is always rejected, even if the computed
    /// remainder happens to be zero as well.
    pub fn validate<E>(&self) -> Result<Calibration, DeviceError<E>> {
        let expected = self.stored_crc();
        let computed = self.crc4();
        if expected == 0 || expected != computed {
            return Err(DeviceError::InvalidCRC { expected, computed });
        }
        Ok(Calibration::new(&self.0))
    }
}

impl Calibration {
    pub(crate) fn new(buf: &[u16; PROM_WORDS]) -> Calibration {
        Calibration {
            sens_t1: buf[1],
            off_t1: buf[2],
            tcs: buf[3],
            tco: buf[4],
            t_ref: buf[5],
            temp_sens: buf[6],
        }
    }

    /// C1
    pub fn sens_t1(&self) -> u16 {
        self.sens_t1
    }

    /// C2
    pub fn off_t1(&self) -> u16 {
        self.off_t1
    }

    /// C3
    pub fn tcs(&self) -> u16 {
        self.tcs
    }

    /// C4
    pub fn tco(&self) -> u16 {
        self.tco
    }

    /// C5
    pub fn t_ref(&self) -> u16 {
        self.t_ref
    }

    /// C6
    pub fn temp_sens(&self) -> u16 {
        self.temp_sens
    }

    /// Reads and CRC-checks the PROM.
    ///
    /// Only the six coefficients survive; the PROM image is dropped. There is
    /// no retry here; on a CRC failure the caller decides whether to reset
    /// and try again.
    pub fn load<B: Bus>(bus: &mut B) -> Result<Calibration, DeviceError<B::Error>> {
        let prom = PromImage::read(bus)?;
        match prom.validate() {
            Ok(calibration) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("PROM CRC ok, calibration {}", calibration);
                #[cfg(feature = "log")]
                log::debug!("PROM CRC ok, calibration {:?}", calibration);
                Ok(calibration)
            }
            Err(e) => {
                #[cfg(any(feature = "defmt", feature = "log"))]
                if let DeviceError::InvalidCRC { expected, computed } = e {
                    #[cfg(feature = "defmt")]
                    defmt::warn!(
                        "PROM integrity check failed (stored {=u8:#x}, computed {=u8:#x})",
                        expected,
                        computed
                    );
                    #[cfg(feature = "log")]
                    log::warn!(
                        "PROM integrity check failed (stored {:#x}, computed {:#x})",
                        expected,
                        computed
                    );
                }
                Err(e)
            }
        }
    }
}
