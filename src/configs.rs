//! Configuration of the analog front-end
//!
//! This module houses the typed settings that the LMP91000 registers hold,
//! and the [`Config`] snapshot that [`configure`] applies in one go.
//!
//! [`configure`]: ../hl/struct.LMP91000.html#method.configure

use crate::ll::{self, Readable as _, Writable as _};

/// Complete configuration of the lock-protected front-end
///
/// Covers every field of the TIACN, REFCN and MODECN registers. Together
/// those fields account for every bit [`configure`] writes, so applying a
/// `Config` never depends on what the registers held before.
///
/// [`configure`]: ../hl/struct.LMP91000.html#method.configure
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// TIA feedback resistance
    pub tia_gain: TiaGain,
    /// Load resistance on the working electrode
    pub r_load: RLoad,
    /// Where the reference voltage comes from
    pub ref_source: RefSource,
    /// Internal zero, as a fraction of the reference
    pub int_zero: IntZero,
    /// Polarity of the bias
    pub bias_sign: BiasSign,
    /// Bias, as a fraction of the reference
    pub bias: Bias,
    /// Whether the shorting FET is enabled
    pub fet_short: bool,
    /// Mode of operation
    pub op_mode: OpMode,
}

impl Config {
    /// Creates a configuration from a value for every setting
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tia_gain: TiaGain,
        r_load: RLoad,
        ref_source: RefSource,
        int_zero: IntZero,
        bias_sign: BiasSign,
        bias: Bias,
        fet_short: bool,
        op_mode: OpMode,
    ) -> Self {
        Config {
            tia_gain,
            r_load,
            ref_source,
            int_zero,
            bias_sign,
            bias,
            fet_short,
            op_mode,
        }
    }

    /// Assembles the TIACN, REFCN and MODECN bytes for this configuration
    ///
    /// Each byte is built from zero, so reserved bits are written as zero.
    pub fn to_registers(&self) -> [u8; 3] {
        let mut tiacn = ll::TIACN::write(0);
        tiacn
            .r_load(self.r_load.bits())
            .tia_gain(self.tia_gain.bits());

        let mut refcn = ll::REFCN::write(0);
        refcn
            .bias(self.bias.bits())
            .bias_sign(self.bias_sign.bits())
            .int_z(self.int_zero.bits())
            .ref_source(self.ref_source.bits());

        let mut modecn = ll::MODECN::write(0);
        modecn
            .op_mode(self.op_mode.bits())
            .fet_short(self.fet_short as u8);

        [tiacn.bits(), refcn.bits(), modecn.bits()]
    }

    /// Decodes a configuration from the TIACN, REFCN and MODECN bytes
    ///
    /// Reserved bits are ignored. Reserved field codes are kept as raw
    /// values, see [`Bias::Reserved`] and [`OpMode::Reserved`].
    pub fn from_registers([tiacn, refcn, modecn]: [u8; 3]) -> Self {
        let tiacn = ll::TIACN::read(tiacn);
        let refcn = ll::REFCN::read(refcn);
        let modecn = ll::MODECN::read(modecn);

        Config {
            tia_gain: TiaGain::from_bits(tiacn.tia_gain()),
            r_load: RLoad::from_bits(tiacn.r_load()),
            ref_source: RefSource::from_bits(refcn.ref_source()),
            int_zero: IntZero::from_bits(refcn.int_z()),
            bias_sign: BiasSign::from_bits(refcn.bias_sign()),
            bias: Bias::from_bits(refcn.bias()),
            fet_short: modecn.fet_short() == 1,
            op_mode: OpMode::from_bits(modecn.op_mode()),
        }
    }
}

impl Default for Config {
    /// The power-on state of the device
    ///
    /// TIACN 0x03, REFCN 0x20, MODECN 0x00.
    fn default() -> Self {
        Config {
            tia_gain: Default::default(),
            r_load: Default::default(),
            ref_source: Default::default(),
            int_zero: Default::default(),
            bias_sign: Default::default(),
            bias: Default::default(),
            fet_short: false,
            op_mode: Default::default(),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// TIA feedback resistance (TIACN bits 4:2)
pub enum TiaGain {
    /// External resistor between C1 and C2
    External = 0b000,
    /// 2.75 kΩ
    R2k75 = 0b001,
    /// 3.5 kΩ
    R3k5 = 0b010,
    /// 7 kΩ
    R7k = 0b011,
    /// 14 kΩ
    R14k = 0b100,
    /// 35 kΩ
    R35k = 0b101,
    /// 120 kΩ
    R120k = 0b110,
    /// 350 kΩ
    R350k = 0b111,
}

impl Default for TiaGain {
    fn default() -> Self {
        TiaGain::External
    }
}

impl TiaGain {
    /// The field code
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Decodes the field code. Only the low 3 bits are considered.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0b000 => TiaGain::External,
            0b001 => TiaGain::R2k75,
            0b010 => TiaGain::R3k5,
            0b011 => TiaGain::R7k,
            0b100 => TiaGain::R14k,
            0b101 => TiaGain::R35k,
            0b110 => TiaGain::R120k,
            _ => TiaGain::R350k,
        }
    }

    /// Nominal feedback resistance in ohms, `None` for the external resistor
    pub fn ohms(self) -> Option<u32> {
        match self {
            TiaGain::External => None,
            TiaGain::R2k75 => Some(2_750),
            TiaGain::R3k5 => Some(3_500),
            TiaGain::R7k => Some(7_000),
            TiaGain::R14k => Some(14_000),
            TiaGain::R35k => Some(35_000),
            TiaGain::R120k => Some(120_000),
            TiaGain::R350k => Some(350_000),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Load resistance (TIACN bits 1:0)
pub enum RLoad {
    /// 10 Ω
    R10 = 0b00,
    /// 33 Ω
    R33 = 0b01,
    /// 50 Ω
    R50 = 0b10,
    /// 100 Ω
    R100 = 0b11,
}

impl Default for RLoad {
    fn default() -> Self {
        RLoad::R100
    }
}

impl RLoad {
    /// The field code
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Decodes the field code. Only the low 2 bits are considered.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => RLoad::R10,
            0b01 => RLoad::R33,
            0b10 => RLoad::R50,
            _ => RLoad::R100,
        }
    }

    /// Nominal load resistance in ohms
    pub fn ohms(self) -> u16 {
        match self {
            RLoad::R10 => 10,
            RLoad::R33 => 33,
            RLoad::R50 => 50,
            RLoad::R100 => 100,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Reference voltage source (REFCN bit 7)
pub enum RefSource {
    /// Internal reference, derived from the supply
    Internal = 0,
    /// External reference on the VREF pin
    External = 1,
}

impl Default for RefSource {
    fn default() -> Self {
        RefSource::Internal
    }
}

impl RefSource {
    /// The field code
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Decodes the field code. Only the low bit is considered.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 1 {
            0 => RefSource::Internal,
            _ => RefSource::External,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Internal zero selection (REFCN bits 6:5)
pub enum IntZero {
    /// 20% of the reference
    Pct20 = 0b00,
    /// 50% of the reference
    Pct50 = 0b01,
    /// 67% of the reference
    Pct67 = 0b10,
    /// Internal zero circuitry bypassed
    Bypass = 0b11,
}

impl Default for IntZero {
    fn default() -> Self {
        IntZero::Pct50
    }
}

impl IntZero {
    /// The field code
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Decodes the field code. Only the low 2 bits are considered.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => IntZero::Pct20,
            0b01 => IntZero::Pct50,
            0b10 => IntZero::Pct67,
            _ => IntZero::Bypass,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Bias polarity (REFCN bit 4)
pub enum BiasSign {
    /// VWE - VRE is negative
    Negative = 0,
    /// VWE - VRE is positive
    Positive = 1,
}

impl Default for BiasSign {
    fn default() -> Self {
        BiasSign::Negative
    }
}

impl BiasSign {
    /// The field code
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Decodes the field code. Only the low bit is considered.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 1 {
            0 => BiasSign::Negative,
            _ => BiasSign::Positive,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Bias magnitude as a fraction of the reference (REFCN bits 3:0)
pub enum Bias {
    /// 0%
    Pct0,
    /// 1%
    Pct1,
    /// 2%
    Pct2,
    /// 4%
    Pct4,
    /// 6%
    Pct6,
    /// 8%
    Pct8,
    /// 10%
    Pct10,
    /// 12%
    Pct12,
    /// 14%
    Pct14,
    /// 16%
    Pct16,
    /// 18%
    Pct18,
    /// 20%
    Pct20,
    /// 22%
    Pct22,
    /// 24%
    Pct24,
    /// A code the datasheet doesn't define (0b1110 or 0b1111)
    Reserved(u8),
}

impl Default for Bias {
    fn default() -> Self {
        Bias::Pct0
    }
}

impl Bias {
    /// The field code
    ///
    /// For [`Bias::Reserved`], this is the raw code masked to the 4-bit
    /// field, so a hand-built code can never reach neighbouring fields.
    pub fn bits(self) -> u8 {
        match self {
            Bias::Pct0 => 0x0,
            Bias::Pct1 => 0x1,
            Bias::Pct2 => 0x2,
            Bias::Pct4 => 0x3,
            Bias::Pct6 => 0x4,
            Bias::Pct8 => 0x5,
            Bias::Pct10 => 0x6,
            Bias::Pct12 => 0x7,
            Bias::Pct14 => 0x8,
            Bias::Pct16 => 0x9,
            Bias::Pct18 => 0xA,
            Bias::Pct20 => 0xB,
            Bias::Pct22 => 0xC,
            Bias::Pct24 => 0xD,
            Bias::Reserved(bits) => bits & 0xF,
        }
    }

    /// Decodes the field code. Only the low 4 bits are considered.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0xF {
            0x0 => Bias::Pct0,
            0x1 => Bias::Pct1,
            0x2 => Bias::Pct2,
            0x3 => Bias::Pct4,
            0x4 => Bias::Pct6,
            0x5 => Bias::Pct8,
            0x6 => Bias::Pct10,
            0x7 => Bias::Pct12,
            0x8 => Bias::Pct14,
            0x9 => Bias::Pct16,
            0xA => Bias::Pct18,
            0xB => Bias::Pct20,
            0xC => Bias::Pct22,
            0xD => Bias::Pct24,
            bits => Bias::Reserved(bits),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Mode of operation (MODECN bits 2:0)
pub enum OpMode {
    /// Deep sleep
    DeepSleep,
    /// 2-lead ground referred galvanic cell
    TwoLead,
    /// Standby
    Standby,
    /// 3-lead amperometric cell
    ThreeLead,
    /// Temperature measurement, TIA off
    TiaOff,
    /// Temperature measurement, TIA on
    TiaOn,
    /// A code the datasheet doesn't define (0b100 or 0b101)
    Reserved(u8),
}

impl Default for OpMode {
    fn default() -> Self {
        OpMode::DeepSleep
    }
}

impl OpMode {
    /// The field code
    ///
    /// For [`OpMode::Reserved`], this is the raw code masked to the 3-bit
    /// field, so a hand-built code can never reach neighbouring fields.
    pub fn bits(self) -> u8 {
        match self {
            OpMode::DeepSleep => 0x0,
            OpMode::TwoLead => 0x1,
            OpMode::Standby => 0x2,
            OpMode::ThreeLead => 0x3,
            OpMode::TiaOff => 0x6,
            OpMode::TiaOn => 0x7,
            OpMode::Reserved(bits) => bits & 0b111,
        }
    }

    /// Decodes the field code. Only the low 3 bits are considered.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0x0 => OpMode::DeepSleep,
            0x1 => OpMode::TwoLead,
            0x2 => OpMode::Standby,
            0x3 => OpMode::ThreeLead,
            0x6 => OpMode::TiaOff,
            0x7 => OpMode::TiaOn,
            bits => OpMode::Reserved(bits),
        }
    }
}
