//! Transport between the driver and the sensor.
//!
//! The sensor only needs three primitives: a single command byte write, a
//! 16 bit PROM word read and a multi-byte register read. [`Bus`] captures
//! those so the rest of the driver does not care whether it sits on I2C or
//! SPI.

use embedded_hal::i2c::I2c;
use embedded_hal::spi::{Operation, SpiDevice};

/// I2C address when CSB is low.
pub const DEFAULT_ADDRESS: u8 = 0x77;
/// I2C address when CSB is high.
pub const ALTERNATE_ADDRESS: u8 = 0x76;

pub trait Bus {
    type Error;

    /// Writes a single command byte.
    fn write_command(&mut self, command: u8) -> Result<(), Self::Error>;

    /// Reads a big-endian 16 bit word at `offset`.
    fn read_word(&mut self, offset: u8) -> Result<u16, Self::Error>;

    /// Reads `data.len()` bytes from `register`.
    fn read_block(&mut self, register: u8, data: &mut [u8]) -> Result<(), Self::Error>;
}

pub struct I2cBus<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cBus<I2C>
where
    I2C: I2c,
{
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> Bus for I2cBus<I2C>
where
    I2C: I2c,
{
    type Error = I2C::Error;

    fn write_command(&mut self, command: u8) -> Result<(), Self::Error> {
        self.i2c.write(self.address, &[command])
    }

    fn read_word(&mut self, offset: u8) -> Result<u16, Self::Error> {
        let mut buf = [0u8; 2];
        self.i2c.write_read(self.address, &[offset], &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    fn read_block(&mut self, register: u8, data: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.write_read(self.address, &[register], data)
    }
}

/// Clock speed must not exceed 20MHz. Accepts mode 0 or 3.
pub struct SpiBus<SPI> {
    spi: SPI,
}

impl<SPI> SpiBus<SPI>
where
    SPI: SpiDevice,
{
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> Bus for SpiBus<SPI>
where
    SPI: SpiDevice,
{
    type Error = SPI::Error;

    fn write_command(&mut self, command: u8) -> Result<(), Self::Error> {
        self.spi.write(&[command])
    }

    fn read_word(&mut self, offset: u8) -> Result<u16, Self::Error> {
        let mut buf = [0u8; 2];
        self.read_block(offset, &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    fn read_block(&mut self, register: u8, data: &mut [u8]) -> Result<(), Self::Error> {
        self.spi
            .transaction(&mut [Operation::Write(&[register]), Operation::Read(data)])
    }
}
