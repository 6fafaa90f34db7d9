use crate::oversampling::OversamplingRatio;

/// Number of 16 bit words in the PROM.
pub const PROM_WORDS: usize = 8;

pub enum Command {
    Reset,
    /// PROM word address, 0..=7.
    ReadPROM(u8),
    D1Conversion(OversamplingRatio),
    D2Conversion(OversamplingRatio),
    ReadADC, // 24 bit pressure / temperature
}

impl Command {
    pub const fn value(&self) -> u8 {
        match *self {
            Command::Reset => 0x1E,
            Command::ReadPROM(word) => 0xA0 | ((word & 0x07) << 1),
            Command::D1Conversion(ratio) => 0x40 | ratio.value(),
            Command::D2Conversion(ratio) => 0x50 | ratio.value(),
            Command::ReadADC => 0x00,
        }
    }
}
