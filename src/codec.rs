//! Bit arithmetic for register fields
//!
//! Every setting of the LMP91000 lives in a span of bits within a single
//! 8-bit register. The functions here move a field value in and out of its
//! span without touching the rest of the byte. They perform no I/O.

/// Returns the mask covering `width` bits starting at bit `offset`
#[inline(always)]
pub const fn mask(width: u8, offset: u8) -> u8 {
    (((1u16 << width) - 1) << offset) as u8
}

/// Reads the field of `width` bits at `offset` out of `byte`
///
/// The result is the raw field code. Codes that have no meaning for the
/// field's type are returned as-is; interpreting them is up to the caller.
#[inline(always)]
pub const fn extract(byte: u8, width: u8, offset: u8) -> u8 {
    (byte & mask(width, offset)) >> offset
}

/// Places `value` into the field of `width` bits at `offset` in `byte`
///
/// All bits outside the field are preserved. `value` must fit in `width`
/// bits. Wider values are a caller bug and are not masked here, debug builds
/// assert on them.
#[inline(always)]
pub fn merge(byte: u8, value: u8, width: u8, offset: u8) -> u8 {
    debug_assert!(
        (value as u16) < (1u16 << width),
        "field value does not fit in its width"
    );

    (byte & !mask(width, offset)) | (value << offset)
}
