//! High-level interface to the LMP91000
//!
//! The entry point to this API is the [LMP91000] struct. Please refer to the
//! documentation there for more details.
//!
//! This module implements a high-level interface to the LMP91000. This is the
//! recommended way to access the LMP91000 using this crate, unless you need
//! the greater flexibility provided by the [register-level interface].
//!
//! [register-level interface]: ../ll/index.html

use core::fmt;

use crate::ll;

mod ready;
mod uninitialized;

/// Entry point to the LMP91000 driver API
///
/// The driver starts out [`Uninitialized`]. Call [`LMP91000::begin`] once to
/// put MENB into its idle state and get a [`Ready`] driver, which is the only
/// state that talks to the device.
pub struct LMP91000<I2C, MENB, State> {
    ll: ll::LMP91000<I2C, MENB>,
    state: State,
}

impl<I2C, MENB, State> LMP91000<I2C, MENB, State> {
    /// Provides direct access to the register-level API
    ///
    /// Be aware that by using the register-level API, you can bypass the lock
    /// protocol that the high-level API follows. Don't use the register-level
    /// and high-level APIs in tandem, unless you know what you're doing.
    pub fn ll(&mut self) -> &mut ll::LMP91000<I2C, MENB> {
        &mut self.ll
    }

    /// Releases the I2C bus and the MENB pin
    pub fn release(self) -> (I2C, MENB) {
        self.ll.release()
    }
}

// Can't be derived without putting requirements on `I2C` and `MENB`.
impl<I2C, MENB, State> fmt::Debug for LMP91000<I2C, MENB, State>
where
    State: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LMP91000 {{ state: ")?;
        self.state.fmt(f)?;
        write!(f, ", .. }}")?;

        Ok(())
    }
}

/// Indicates that the `LMP91000` instance is not initialized yet
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Uninitialized;

/// Indicates that the `LMP91000` instance is ready to be used
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ready;
