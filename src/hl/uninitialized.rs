use embedded_hal::{digital::OutputPin, i2c};

use crate::{ll, Error, Ready, Uninitialized, LMP91000};

impl<I2C, MENB> LMP91000<I2C, MENB, Uninitialized> {
    /// Create a new instance of `LMP91000`
    ///
    /// Requires the I2C bus and the MENB pin that are connected to the
    /// LMP91000. The pin must already be configured as a push-pull output.
    pub fn new(i2c: I2C, menb: MENB) -> Self {
        LMP91000 {
            ll: ll::LMP91000::new(i2c, menb),
            state: Uninitialized,
        }
    }

    /// Initialize the LMP91000 driver
    ///
    /// Drives MENB high, so the device ignores the bus until the first
    /// register access. No I2C traffic is generated.
    pub fn begin(mut self) -> Result<LMP91000<I2C, MENB, Ready>, Error<I2C, MENB>>
    where
        I2C: i2c::ErrorType,
        MENB: OutputPin,
    {
        self.ll.idle_strobe()?;

        Ok(LMP91000 {
            ll: self.ll,
            state: Ready,
        })
    }
}
