use embedded_hal::i2c::I2c;

/// Trait for byte-addressed register access on a device.
///
/// The chip driver only ever reads and writes single registers, so the
/// bus abstraction stays that small. Bring-up of the bus itself happens
/// before a `RegisterBus` is handed to a driver.
pub trait RegisterBus {
    /// Error type for bus failures.
    type Error: std::fmt::Debug;

    /// Write `value` to `register`.
    fn write(&mut self, register: u8, value: u8) -> Result<(), Self::Error>;

    /// Read the current value of `register`.
    fn read(&mut self, register: u8) -> Result<u8, Self::Error>;
}

/// [`RegisterBus`] over any `embedded-hal` I2C bus, talking to the
/// device at a fixed 7-bit address.
#[derive(Debug)]
pub struct I2cRegisterBus<I> {
    i2c: I,
    address: u8,
}

impl<I: I2c> I2cRegisterBus<I> {
    pub fn new(i2c: I, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Give back the underlying I2C bus.
    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2c> RegisterBus for I2cRegisterBus<I> {
    type Error = I::Error;

    fn write(&mut self, register: u8, value: u8) -> Result<(), Self::Error> {
        self.i2c.write(self.address, &[register, value])
    }

    fn read(&mut self, register: u8) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.i2c.write_read(self.address, &[register], &mut buf)?;
        Ok(buf[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    /// Fake I2C device exposing 256 byte registers.
    struct FakeI2c {
        address: u8,
        registers: [u8; 256],
    }

    impl ErrorType for FakeI2c {
        type Error = ErrorKind;
    }

    impl I2c for FakeI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if address != self.address {
                return Err(ErrorKind::NoAcknowledge(
                    embedded_hal::i2c::NoAcknowledgeSource::Address,
                ));
            }
            let mut pointer = 0usize;
            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        if let Some((&reg, data)) = bytes.split_first() {
                            pointer = reg as usize;
                            for &b in data {
                                self.registers[pointer] = b;
                                pointer = (pointer + 1) % 256;
                            }
                        }
                    }
                    Operation::Read(buf) => {
                        for b in buf.iter_mut() {
                            *b = self.registers[pointer];
                            pointer = (pointer + 1) % 256;
                        }
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_write_then_read_register() {
        let mut bus = I2cRegisterBus::new(
            FakeI2c {
                address: 0x30,
                registers: [0; 256],
            },
            0x30,
        );

        bus.write(0x12, 0xAB).unwrap();
        assert_eq!(bus.read(0x12).unwrap(), 0xAB);
        assert_eq!(bus.read(0x13).unwrap(), 0x00);
    }

    #[test]
    fn test_wrong_address_is_transport_error() {
        let mut bus = I2cRegisterBus::new(
            FakeI2c {
                address: 0x30,
                registers: [0; 256],
            },
            0x31,
        );

        assert!(bus.write(0x00, 0x01).is_err());
        assert!(bus.read(0x00).is_err());
    }

    #[test]
    fn test_release_returns_bus() {
        let bus = I2cRegisterBus::new(
            FakeI2c {
                address: 0x30,
                registers: [7; 256],
            },
            0x30,
        );
        assert_eq!(bus.release().registers[0], 7);
    }
}
