use crate::command::Command;

/// The ADC channel a conversion is started on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// D1, digital pressure.
    Pressure,
    /// D2, digital temperature.
    Temperature,
}

/// Oversampling Ratio
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OversamplingRatio {
    OSR256,
    OSR512,
    OSR1024,
    OSR2048,
    #[default]
    OSR4096,
}

impl OversamplingRatio {
    /// All ratios, lowest first. Matches the row order of the conversion tables.
    pub const ALL: [OversamplingRatio; 5] = [
        OversamplingRatio::OSR256,
        OversamplingRatio::OSR512,
        OversamplingRatio::OSR1024,
        OversamplingRatio::OSR2048,
        OversamplingRatio::OSR4096,
    ];

    /// Offset OR-ed onto the D1/D2 conversion base command.
    pub const fn value(&self) -> u8 {
        match *self {
            OversamplingRatio::OSR256 => 0x00,
            OversamplingRatio::OSR512 => 0x02,
            OversamplingRatio::OSR1024 => 0x04,
            OversamplingRatio::OSR2048 => 0x06,
            OversamplingRatio::OSR4096 => 0x08,
        }
    }

    /// Number of internal samples averaged per conversion.
    pub const fn rate(&self) -> u32 {
        match *self {
            OversamplingRatio::OSR256 => 256,
            OversamplingRatio::OSR512 => 512,
            OversamplingRatio::OSR1024 => 1024,
            OversamplingRatio::OSR2048 => 2048,
            OversamplingRatio::OSR4096 => 4096,
        }
    }

    /// Gets the maximum conversion time in MICROSECONDS.
    pub const fn delay_us(&self) -> u32 {
        // 0.60 / 1.17 / 2.28 / 4.54 / 9.04 ms
        match *self {
            OversamplingRatio::OSR256 => 600,
            OversamplingRatio::OSR512 => 1170,
            OversamplingRatio::OSR1024 => 2280,
            OversamplingRatio::OSR2048 => 4540,
            OversamplingRatio::OSR4096 => 9040,
        }
    }

    /// Maps a sample count back onto a ratio. Anything but the five
    /// supported counts is rejected.
    pub fn from_rate(rate: u32) -> Result<Self, InvalidRate> {
        match rate {
            256 => Ok(OversamplingRatio::OSR256),
            512 => Ok(OversamplingRatio::OSR512),
            1024 => Ok(OversamplingRatio::OSR1024),
            2048 => Ok(OversamplingRatio::OSR2048),
            4096 => Ok(OversamplingRatio::OSR4096),
            other => Err(InvalidRate(other)),
        }
    }
}

/// A requested sample rate that the sensor cannot do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidRate(pub u32);

/// One resolved row of a conversion table.
///
/// This is a plain copy of the table entry so it can be stored per channel
/// without borrowing the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OversamplingSetting {
    pub ratio: OversamplingRatio,
    /// Conversion command byte written to the sensor.
    pub command: u8,
    /// Time to wait between the command and the ADC read.
    pub conversion_us: u32,
}

impl OversamplingSetting {
    const fn pressure(ratio: OversamplingRatio) -> Self {
        Self {
            ratio,
            command: Command::D1Conversion(ratio).value(),
            conversion_us: ratio.delay_us(),
        }
    }

    const fn temperature(ratio: OversamplingRatio) -> Self {
        Self {
            ratio,
            command: Command::D2Conversion(ratio).value(),
            conversion_us: ratio.delay_us(),
        }
    }

    pub fn rate(&self) -> u32 {
        self.ratio.rate()
    }
}

/// D1 conversion commands, 0x40..=0x48.
pub const PRESSURE_OSR: [OversamplingSetting; 5] = [
    OversamplingSetting::pressure(OversamplingRatio::OSR256),
    OversamplingSetting::pressure(OversamplingRatio::OSR512),
    OversamplingSetting::pressure(OversamplingRatio::OSR1024),
    OversamplingSetting::pressure(OversamplingRatio::OSR2048),
    OversamplingSetting::pressure(OversamplingRatio::OSR4096),
];

/// D2 conversion commands, 0x50..=0x58. Same timing as pressure.
pub const TEMPERATURE_OSR: [OversamplingSetting; 5] = [
    OversamplingSetting::temperature(OversamplingRatio::OSR256),
    OversamplingSetting::temperature(OversamplingRatio::OSR512),
    OversamplingSetting::temperature(OversamplingRatio::OSR1024),
    OversamplingSetting::temperature(OversamplingRatio::OSR2048),
    OversamplingSetting::temperature(OversamplingRatio::OSR4096),
];

impl Channel {
    fn table(&self) -> &'static [OversamplingSetting; 5] {
        match *self {
            Channel::Pressure => &PRESSURE_OSR,
            Channel::Temperature => &TEMPERATURE_OSR,
        }
    }

    /// Table row for an already validated ratio.
    pub fn setting(&self, ratio: OversamplingRatio) -> OversamplingSetting {
        let table = self.table();
        match ratio {
            OversamplingRatio::OSR256 => table[0],
            OversamplingRatio::OSR512 => table[1],
            OversamplingRatio::OSR1024 => table[2],
            OversamplingRatio::OSR2048 => table[3],
            OversamplingRatio::OSR4096 => table[4],
        }
    }

    /// Looks up the conversion command and delay for a raw sample count.
    ///
    /// Has no side effects; storing the result as the active setting is up
    /// to the caller.
    pub fn resolve(&self, rate: u32) -> Result<OversamplingSetting, InvalidRate> {
        OversamplingRatio::from_rate(rate).map(|ratio| self.setting(ratio))
    }
}
