//! Driver crate for the LMP91000 potentiostat analog front-end
//!
//! The LMP91000 is a configurable analog front-end for electrochemical
//! sensors. All of its behaviour is set through a handful of 8-bit registers
//! reached over I2C, while a dedicated MENB pin has to be held low for the
//! duration of every transfer.
//!
//! The recommended way to use this driver is the [high-level interface]. If
//! you require a higher degree of flexibility, you can use the
//! [register-level interface] instead.
//!
//! This driver is built on top of [`embedded-hal`], which means it is portable
//! and can be used on any platform that implements the `embedded-hal` API.
//! All I/O is blocking unless the `async` feature is enabled, in which case
//! the bus is driven through [`embedded-hal-async`].
//!
#![cfg_attr(not(feature = "async"), doc = "```no_run")]
#![cfg_attr(feature = "async", doc = "```ignore")]
//! # use embedded_hal::{digital::OutputPin, i2c::I2c};
//! use lmp91000::{configs::{OpMode, TiaGain}, Config, LMP91000};
//!
//! # fn example<I: I2c, P: OutputPin>(i2c: I, menb: P) -> Result<(), lmp91000::Error<I, P>> {
//! let mut lmp = LMP91000::new(i2c, menb).begin()?;
//!
//! lmp.configure(&Config {
//!     tia_gain: TiaGain::R35k,
//!     op_mode: OpMode::ThreeLead,
//!     ..Config::default()
//! })?;
//! # Ok(())
//! # }
//! ```
//!
//! [high-level interface]: hl/index.html
//! [register-level interface]: ll/index.html
//! [`embedded-hal`]: https://crates.io/crates/embedded-hal
//! [`embedded-hal-async`]: https://crates.io/crates/embedded-hal-async
#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(feature = "async")]
use maybe_async::must_be_async as maybe_async_attr;
#[cfg(not(feature = "async"))]
use maybe_async::must_be_sync as maybe_async_attr;

#[cfg(not(feature = "async"))]
use embedded_hal as bus_type;
#[cfg(feature = "async")]
use embedded_hal_async as bus_type;

pub mod codec;
pub mod configs;
pub mod hl;
pub mod ll;

/// The 7-bit I2C address of the LMP91000
pub const I2C_ADDRESS: u8 = 0x48;

pub use crate::{
    configs::Config,
    hl::{Ready, Uninitialized, LMP91000},
    ll::Error,
};
