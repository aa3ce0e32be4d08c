//! Low-level interface to the LMP91000
//!
//! This module implements a register-level interface to the LMP91000. Users
//! of this library should typically not need to use this. Please consider
//! using the [high-level interface] instead.
//!
//! Every register access is framed by the MENB strobe: the pin is driven low
//! before the bus transfer and driven high again afterwards, on every exit
//! path, including transfers that fail.
//!
//! **NOTE**: Field write methods accept a `u8`, which is wider than every
//! field on this device. Passing a value that does not fit in the field is a
//! bug, and debug builds will panic on it. Release builds do not mask the
//! value, so the excess bits end up in neighbouring fields.
//!
//! [high-level interface]: ../hl/index.html

use core::{fmt, marker::PhantomData};

use embedded_hal::{digital, digital::OutputPin, i2c};

use crate::{bus_type, codec, maybe_async_attr, I2C_ADDRESS};

/// Entry point to the LMP91000 driver's low-level API
///
/// Please consider using [hl::LMP91000] instead.
///
/// [hl::LMP91000]: ../hl/struct.LMP91000.html
pub struct LMP91000<I2C, MENB> {
    i2c: I2C,
    menb: MENB,
}

impl<I2C, MENB> LMP91000<I2C, MENB> {
    /// Create a new instance of `LMP91000`
    ///
    /// Requires the I2C bus and the MENB pin that are connected to the
    /// LMP91000.
    pub fn new(i2c: I2C, menb: MENB) -> Self {
        LMP91000 { i2c, menb }
    }

    /// Allow access to the I2C bus
    pub fn bus(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    /// Allow access to the MENB pin
    pub fn menb(&mut self) -> &mut MENB {
        &mut self.menb
    }

    /// Releases the I2C bus and the MENB pin
    pub fn release(self) -> (I2C, MENB) {
        (self.i2c, self.menb)
    }
}

impl<I2C, MENB> LMP91000<I2C, MENB>
where
    I2C: i2c::ErrorType,
    MENB: OutputPin,
{
    /// Drives MENB to its inactive level
    pub fn idle_strobe(&mut self) -> Result<(), Error<I2C, MENB>> {
        self.menb.set_high().map_err(Error::Strobe)
    }
}

impl<I2C, MENB> LMP91000<I2C, MENB>
where
    I2C: bus_type::i2c::I2c,
    MENB: OutputPin,
{
    /// Reads the raw byte of the register at `addr`
    ///
    /// Selects the register with a one-byte write, then reads one byte back.
    #[maybe_async_attr]
    pub async fn read_raw(&mut self, addr: u8) -> Result<u8, Error<I2C, MENB>> {
        let mut buffer = [0];

        let strobe = Strobe::assert(&mut self.menb).map_err(Error::Strobe)?;
        self.i2c
            .write(I2C_ADDRESS, &[addr])
            .await
            .map_err(Error::Bus)?;
        self.i2c
            .read(I2C_ADDRESS, &mut buffer)
            .await
            .map_err(Error::Bus)?;
        strobe.release().map_err(Error::Strobe)?;

        #[cfg(feature = "defmt")]
        defmt::trace!("read  0x{=u8:02x} -> 0x{=u8:02x}", addr, buffer[0]);

        Ok(buffer[0])
    }

    /// Writes `value` as the full byte of the register at `addr`
    #[maybe_async_attr]
    pub async fn write_raw(&mut self, addr: u8, value: u8) -> Result<(), Error<I2C, MENB>> {
        #[cfg(feature = "defmt")]
        defmt::trace!("write 0x{=u8:02x} <- 0x{=u8:02x}", addr, value);

        let strobe = Strobe::assert(&mut self.menb).map_err(Error::Strobe)?;
        self.i2c
            .write(I2C_ADDRESS, &[addr, value])
            .await
            .map_err(Error::Bus)?;
        strobe.release().map_err(Error::Strobe)
    }

    /// Reads the field of `width` bits at `offset` from the register at `addr`
    #[maybe_async_attr]
    pub async fn get_field(
        &mut self,
        addr: u8,
        width: u8,
        offset: u8,
    ) -> Result<u8, Error<I2C, MENB>> {
        let byte = self.read_raw(addr).await?;

        Ok(codec::extract(byte, width, offset))
    }

    /// Replaces the field of `width` bits at `offset` in the register at
    /// `addr`, keeping every other bit of the register
    ///
    /// This is a read-modify-write. It is not atomic with respect to other
    /// users of the device.
    #[maybe_async_attr]
    pub async fn set_field(
        &mut self,
        addr: u8,
        value: u8,
        width: u8,
        offset: u8,
    ) -> Result<(), Error<I2C, MENB>> {
        let byte = self.read_raw(addr).await?;
        let byte = codec::merge(byte, value, width, offset);

        self.write_raw(addr, byte).await
    }
}

/// Holds MENB at its active level for the duration of one bus transfer
///
/// Dropping the guard drives MENB high again. [`Strobe::release`] does the
/// same but reports a pin error, which `Drop` has to discard.
struct Strobe<'p, P>
where
    P: OutputPin,
{
    pin: Option<&'p mut P>,
}

impl<'p, P> Strobe<'p, P>
where
    P: OutputPin,
{
    fn assert(pin: &'p mut P) -> Result<Self, P::Error> {
        pin.set_low()?;

        Ok(Strobe { pin: Some(pin) })
    }

    fn release(mut self) -> Result<(), P::Error> {
        match self.pin.take() {
            Some(pin) => pin.set_high(),
            None => Ok(()),
        }
    }
}

impl<P> Drop for Strobe<'_, P>
where
    P: OutputPin,
{
    fn drop(&mut self) {
        if let Some(pin) = self.pin.take() {
            // The transfer already failed, that error is the one to report.
            let _ = pin.set_high();
        }
    }
}

/// Provides access to a register
///
/// You can get an instance for a given register using one of the methods on
/// [`LMP91000`].
pub struct RegAccessor<'s, R, I2C, MENB>(&'s mut LMP91000<I2C, MENB>, PhantomData<R>);

impl<R, I2C, MENB> RegAccessor<'_, R, I2C, MENB>
where
    I2C: bus_type::i2c::I2c,
    MENB: OutputPin,
{
    /// Read from the register
    #[maybe_async_attr]
    pub async fn read(&mut self) -> Result<R::Read, Error<I2C, MENB>>
    where
        R: Register + Readable,
    {
        let byte = self.0.read_raw(R::ADDR).await?;

        Ok(R::read(byte))
    }

    /// Write to the register
    ///
    /// The written byte starts out as all zeros. Fields that are not set by
    /// `f` are written as zero.
    #[maybe_async_attr]
    pub async fn write<F>(&mut self, f: F) -> Result<(), Error<I2C, MENB>>
    where
        R: Register + Writable,
        F: FnOnce(&mut R::Write) -> &mut R::Write,
    {
        let mut w = R::write(0);
        f(&mut w);

        self.0.write_raw(R::ADDR, R::bits(&w)).await
    }

    /// Modify the register
    ///
    /// Reads the register, lets `f` change some of its fields and writes the
    /// result back. Fields that `f` leaves alone keep their current value.
    #[maybe_async_attr]
    pub async fn modify<F>(&mut self, f: F) -> Result<(), Error<I2C, MENB>>
    where
        R: Register + Readable + Writable,
        F: for<'w> FnOnce(&R::Read, &'w mut R::Write) -> &'w mut R::Write,
    {
        let byte = self.0.read_raw(R::ADDR).await?;
        let r = R::read(byte);
        let mut w = R::write(byte);

        f(&r, &mut w);

        self.0.write_raw(R::ADDR, R::bits(&w)).await
    }
}

/// An error that can occur when communicating with the LMP91000
pub enum Error<I2C, MENB>
where
    I2C: i2c::ErrorType,
    MENB: digital::ErrorType,
{
    /// The I2C transfer failed
    ///
    /// This is the bus error, passed on without translation. It covers
    /// address and data NACKs as well as arbitration loss.
    Bus(I2C::Error),

    /// Driving the MENB pin failed
    Strobe(MENB::Error),
}

// We can't derive this implementation, as the compiler will complain that the
// associated error type doesn't implement `Debug`.
impl<I2C, MENB> fmt::Debug for Error<I2C, MENB>
where
    I2C: i2c::ErrorType,
    I2C::Error: fmt::Debug,
    MENB: digital::ErrorType,
    MENB::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Bus(error) => write!(f, "Bus({:?})", error),
            Error::Strobe(error) => write!(f, "Strobe({:?})", error),
        }
    }
}

impl<I2C, MENB> fmt::Display for Error<I2C, MENB>
where
    I2C: i2c::ErrorType,
    I2C::Error: fmt::Debug,
    MENB: digital::ErrorType,
    MENB::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl<I2C, MENB> std::error::Error for Error<I2C, MENB>
where
    I2C: i2c::ErrorType,
    I2C::Error: fmt::Debug,
    MENB: digital::ErrorType,
    MENB::Error: fmt::Debug,
{
}

#[cfg(feature = "defmt")]
impl<I2C, MENB> defmt::Format for Error<I2C, MENB>
where
    I2C: i2c::ErrorType,
    MENB: digital::ErrorType,
{
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Bus(error) => {
                defmt::write!(f, "Bus({})", defmt::Debug2Format(&i2c::Error::kind(error)))
            }
            Error::Strobe(_) => defmt::write!(f, "Strobe()"),
        }
    }
}

/// Implemented for all registers
///
/// This is a mostly internal trait that should not be implemented or used
/// directly by users of this crate. It is exposed through the public API
/// though, so it can't be made private.
pub trait Register {
    /// The register address
    const ADDR: u8;

    /// Whether writes only take effect while the lock bit is cleared
    const LOCKABLE: bool;
}

/// Marker trait for registers that can be read from
///
/// This is a mostly internal trait that should not be implemented or used
/// directly by users of this crate. It is exposed through the public API
/// though, so it can't be made private.
pub trait Readable {
    /// The type that is used to read from the register
    type Read;

    /// Wrap a raw register byte in the read type
    fn read(bits: u8) -> Self::Read;
}

/// Marker trait for registers that can be written to
///
/// This is a mostly internal trait that should not be implemented or used
/// directly by users of this crate. It is exposed through the public API
/// though, so it can't be made private.
pub trait Writable {
    /// The type that is used to write to the register
    type Write;

    /// Return the write type, starting from `bits`
    fn write(bits: u8) -> Self::Write;

    /// Return the byte the write type currently holds
    fn bits(w: &Self::Write) -> u8;
}

/// Generates register implementations
macro_rules! impl_register {
    (
        $(
            $addr:expr,
            $rw:tt,
            $lockable:expr,
            $name:ident($name_lower:ident) {
            #[$doc:meta]
            $(
                $field:ident,
                $first_bit:expr,
                $last_bit:expr;
                #[$field_doc:meta]
            )*
            }
        )*
    ) => {
        $(
            #[$doc]
            #[allow(non_camel_case_types)]
            pub struct $name;

            impl Register for $name {
                const ADDR:     u8   = $addr;
                const LOCKABLE: bool = $lockable;
            }

            #[$doc]
            pub mod $name_lower {
                use core::fmt;

                /// Used to read from the register
                pub struct R(pub(crate) u8);

                impl R {
                    $(
                        #[$field_doc]
                        #[inline(always)]
                        pub fn $field(&self) -> u8 {
                            const WIDTH:  u8 = $last_bit - $first_bit + 1;
                            const OFFSET: u8 = $first_bit;

                            crate::codec::extract(self.0, WIDTH, OFFSET)
                        }
                    )*

                    /// The raw register byte
                    #[inline(always)]
                    pub fn bits(&self) -> u8 {
                        self.0
                    }
                }

                impl fmt::Debug for R {
                    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                        write!(f, "0x{:02x}", self.0)
                    }
                }

                #[cfg(feature = "defmt")]
                impl defmt::Format for R {
                    fn format(&self, f: defmt::Formatter) {
                        defmt::write!(f, "0x{=u8:02x}", self.0);
                    }
                }

                /// Used to write to the register
                pub struct W(pub(crate) u8);

                impl W {
                    $(
                        #[$field_doc]
                        #[inline(always)]
                        pub fn $field(&mut self, value: u8) -> &mut Self {
                            const WIDTH:  u8 = $last_bit - $first_bit + 1;
                            const OFFSET: u8 = $first_bit;

                            self.0 = crate::codec::merge(self.0, value, WIDTH, OFFSET);
                            self
                        }
                    )*

                    /// The raw register byte
                    #[inline(always)]
                    pub fn bits(&self) -> u8 {
                        self.0
                    }
                }
            }

            impl_rw!($rw, $name, $name_lower);
        )*

        impl<I2C, MENB> LMP91000<I2C, MENB> {
            $(
                #[$doc]
                pub fn $name_lower(&mut self) -> RegAccessor<$name, I2C, MENB> {
                    RegAccessor(self, PhantomData)
                }
            )*
        }
    }
}

// Helper macro, used internally by `impl_register!`
macro_rules! impl_rw {
    (RO, $name:ident, $name_lower:ident) => {
        impl_rw!(@R, $name, $name_lower);
    };
    (RW, $name:ident, $name_lower:ident) => {
        impl_rw!(@R, $name, $name_lower);
        impl_rw!(@W, $name, $name_lower);
    };

    (@R, $name:ident, $name_lower:ident) => {
        impl Readable for $name {
            type Read = $name_lower::R;

            fn read(bits: u8) -> Self::Read {
                $name_lower::R(bits)
            }
        }
    };
    (@W, $name:ident, $name_lower:ident) => {
        impl Writable for $name {
            type Write = $name_lower::W;

            fn write(bits: u8) -> Self::Write {
                $name_lower::W(bits)
            }

            fn bits(w: &Self::Write) -> u8 {
                w.0
            }
        }
    };
}

// All registers are implemented in this macro invocation. It follows the
// following syntax:
// <addr>, <RO/RW>, <lockable>, <NAME(name)> { /// <doc>
//     <field>, <first-bit-index>, <last-bit-index>; /// <doc>
//     ...
// }
//
// Bits that belong to no field are reserved.

impl_register! {
    0x00, RO, false, STATUS(status) { /// Status register
        ready, 0, 0; /// Device ready to accept I2C commands
    }
    0x01, RW, false, LOCK(lock) { /// Protection register
        lock, 0, 0; /// TIACN and REFCN are read-only while set
    }
    0x10, RW, true, TIACN(tiacn) { /// TIA control register
        r_load,   0, 1; /// Load resistance selection
        tia_gain, 2, 4; /// TIA feedback resistance selection
    }
    0x11, RW, true, REFCN(refcn) { /// Reference control register
        bias,       0, 3; /// Bias selection as a fraction of the reference
        bias_sign,  4, 4; /// Bias polarity, set for positive
        int_z,      5, 6; /// Internal zero selection
        ref_source, 7, 7; /// Reference source, set for external
    }
    0x12, RW, false, MODECN(modecn) { /// Mode control register
        op_mode,   0, 2; /// Mode of operation selection
        fet_short, 7, 7; /// Shorting FET feature, set to enable
    }
}
