use embedded_hal::delay::DelayNs;

use crate::bus::Bus;
use crate::command::Command;
use crate::error::DeviceError;
use crate::oversampling::OversamplingSetting;

/// Starts a conversion, waits it out and reads the 24 bit ADC result.
///
/// Reading the ADC before the conversion has finished returns 0 without any
/// error from the device, so the wait is not optional. `DelayNs` promises at
/// least the requested time; the table values are already the datasheet
/// maximums.
///
/// Nothing is kept on failure: a failed write or read is returned as is.
pub fn convert<B, D>(
    bus: &mut B,
    delay: &mut D,
    setting: &OversamplingSetting,
) -> Result<u32, DeviceError<B::Error>>
where
    B: Bus,
    D: DelayNs,
{
    #[cfg(feature = "defmt")]
    defmt::trace!(
        "conversion {=u8:#x}, waiting {=u32} us",
        setting.command,
        setting.conversion_us
    );
    #[cfg(feature = "log")]
    log::trace!(
        "conversion {:#x}, waiting {} us",
        setting.command,
        setting.conversion_us
    );

    bus.write_command(setting.command)?;
    delay.delay_us(setting.conversion_us);

    let mut buf = [0u8; 3];
    bus.read_block(Command::ReadADC.value(), &mut buf)?;
    Ok(u32::from_be_bytes([0, buf[0], buf[1], buf[2]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{I2cBus, DEFAULT_ADDRESS};
    use crate::oversampling::{Channel, OversamplingRatio};
    use core::cell::RefCell;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    use std::rc::Rc;

    #[derive(Debug, PartialEq)]
    enum Event {
        Command(u8),
        /// ADC read, with the fake clock at the time of the read.
        Read { register: u8, at_ns: u64 },
    }

    #[derive(Default)]
    struct Clock {
        now_ns: u64,
        events: Vec<Event>,
    }

    /// Bus and delay sharing one fake clock so the ordering and spacing of
    /// operations can be checked.
    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Clock>>);

    impl Bus for Recorder {
        type Error = ErrorKind;

        fn write_command(&mut self, command: u8) -> Result<(), Self::Error> {
            self.0.borrow_mut().events.push(Event::Command(command));
            Ok(())
        }

        fn read_word(&mut self, _offset: u8) -> Result<u16, Self::Error> {
            Err(ErrorKind::Other)
        }

        fn read_block(&mut self, register: u8, data: &mut [u8]) -> Result<(), Self::Error> {
            let mut clock = self.0.borrow_mut();
            let at_ns = clock.now_ns;
            clock.events.push(Event::Read { register, at_ns });
            data.copy_from_slice(&[0x8A, 0xA2, 0x1A][..data.len()]);
            Ok(())
        }
    }

    impl DelayNs for Recorder {
        fn delay_ns(&mut self, ns: u32) {
            self.0.borrow_mut().now_ns += ns as u64;
        }
    }

    #[test]
    fn waits_before_reading_adc() {
        for ratio in OversamplingRatio::ALL {
            for channel in [Channel::Pressure, Channel::Temperature] {
                let setting = channel.setting(ratio);
                let recorder = Recorder::default();
                let mut bus = recorder.clone();
                let mut delay = recorder.clone();

                let raw = convert(&mut bus, &mut delay, &setting).unwrap();
                assert_eq!(raw, 0x8AA21A);

                let clock = recorder.0.borrow();
                assert_eq!(clock.events.len(), 2);
                assert_eq!(clock.events[0], Event::Command(setting.command));
                match clock.events[1] {
                    Event::Read { register, at_ns } => {
                        assert_eq!(register, 0x00);
                        let min_ns = setting.conversion_us as u64 * 1000;
                        assert!(at_ns >= min_ns);
                        assert!(at_ns <= min_ns + min_ns / 10);
                    }
                    ref other => panic!("unexpected event {:?}", other),
                }
            }
        }
    }

    #[test]
    fn assembles_big_endian_24_bit_value() {
        let setting = Channel::Pressure.setting(OversamplingRatio::OSR4096);
        let i2c = I2cMock::new(&[
            I2cTransaction::write(DEFAULT_ADDRESS, vec![0x48]),
            I2cTransaction::write_read(DEFAULT_ADDRESS, vec![0x00], vec![0x12, 0x34, 0x56]),
        ]);
        let mut bus = I2cBus::new(i2c, DEFAULT_ADDRESS);
        assert_eq!(convert(&mut bus, &mut NoopDelay::new(), &setting).unwrap(), 0x123456);
        bus.release().done();
    }

    #[test]
    fn failed_command_skips_read() {
        let setting = Channel::Temperature.setting(OversamplingRatio::OSR256);
        let i2c = I2cMock::new(&[
            I2cTransaction::write(DEFAULT_ADDRESS, vec![0x50]).with_error(ErrorKind::Other)
        ]);
        let mut bus = I2cBus::new(i2c, DEFAULT_ADDRESS);
        assert_eq!(
            convert(&mut bus, &mut NoopDelay::new(), &setting),
            Err(DeviceError::Bus(ErrorKind::Other))
        );
        bus.release().done();
    }

    #[test]
    fn failed_read_is_not_zero() {
        let setting = Channel::Temperature.setting(OversamplingRatio::OSR1024);
        let i2c = I2cMock::new(&[
            I2cTransaction::write(DEFAULT_ADDRESS, vec![0x54]),
            I2cTransaction::write_read(DEFAULT_ADDRESS, vec![0x00], vec![0, 0, 0])
                .with_error(ErrorKind::Other),
        ]);
        let mut bus = I2cBus::new(i2c, DEFAULT_ADDRESS);
        assert_eq!(
            convert(&mut bus, &mut NoopDelay::new(), &setting),
            Err(DeviceError::Bus(ErrorKind::Other))
        );
        bus.release().done();
    }
}
