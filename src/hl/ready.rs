use embedded_hal::digital::OutputPin;

use crate::{
    bus_type,
    configs::{Bias, BiasSign, IntZero, OpMode, RLoad, RefSource, TiaGain},
    ll::{Register as _, MODECN, REFCN, TIACN},
    maybe_async_attr, Config, Error, Ready, LMP91000,
};

impl<I2C, MENB> LMP91000<I2C, MENB, Ready>
where
    I2C: bus_type::i2c::I2c,
    MENB: OutputPin,
{
    /// Returns true if the device is ready to accept I2C commands
    #[maybe_async_attr]
    pub async fn is_ready(&mut self) -> Result<bool, Error<I2C, MENB>> {
        Ok(self.ll.status().read().await?.ready() == 0b1)
    }

    /// Returns true if TIACN and REFCN are write-protected
    #[maybe_async_attr]
    pub async fn is_locked(&mut self) -> Result<bool, Error<I2C, MENB>> {
        Ok(self.ll.lock().read().await?.lock() == 0b1)
    }

    /// Sets or clears the write protection of TIACN and REFCN
    ///
    /// The reserved bits of the lock register are left as they are.
    #[maybe_async_attr]
    pub async fn set_locked(&mut self, locked: bool) -> Result<(), Error<I2C, MENB>> {
        self.ll.lock().modify(|_, w| w.lock(locked as u8)).await
    }

    /// Returns the TIA feedback resistance
    #[maybe_async_attr]
    pub async fn tia_gain(&mut self) -> Result<TiaGain, Error<I2C, MENB>> {
        let tiacn = self.ll.tiacn().read().await?;

        Ok(TiaGain::from_bits(tiacn.tia_gain()))
    }

    /// Sets the TIA feedback resistance
    ///
    /// TIACN is lock-protected, this only takes effect while unlocked.
    #[maybe_async_attr]
    pub async fn set_tia_gain(&mut self, gain: TiaGain) -> Result<(), Error<I2C, MENB>> {
        self.ll.tiacn().modify(|_, w| w.tia_gain(gain.bits())).await
    }

    /// Returns the load resistance
    #[maybe_async_attr]
    pub async fn r_load(&mut self) -> Result<RLoad, Error<I2C, MENB>> {
        let tiacn = self.ll.tiacn().read().await?;

        Ok(RLoad::from_bits(tiacn.r_load()))
    }

    /// Sets the load resistance
    ///
    /// TIACN is lock-protected, this only takes effect while unlocked.
    #[maybe_async_attr]
    pub async fn set_r_load(&mut self, load: RLoad) -> Result<(), Error<I2C, MENB>> {
        self.ll.tiacn().modify(|_, w| w.r_load(load.bits())).await
    }

    /// Returns the reference voltage source
    #[maybe_async_attr]
    pub async fn ref_source(&mut self) -> Result<RefSource, Error<I2C, MENB>> {
        let refcn = self.ll.refcn().read().await?;

        Ok(RefSource::from_bits(refcn.ref_source()))
    }

    /// Sets the reference voltage source
    ///
    /// REFCN is lock-protected, this only takes effect while unlocked.
    #[maybe_async_attr]
    pub async fn set_ref_source(&mut self, source: RefSource) -> Result<(), Error<I2C, MENB>> {
        self.ll.refcn().modify(|_, w| w.ref_source(source.bits())).await
    }

    /// Returns the internal zero selection
    #[maybe_async_attr]
    pub async fn int_zero(&mut self) -> Result<IntZero, Error<I2C, MENB>> {
        let refcn = self.ll.refcn().read().await?;

        Ok(IntZero::from_bits(refcn.int_z()))
    }

    /// Sets the internal zero selection
    ///
    /// REFCN is lock-protected, this only takes effect while unlocked.
    #[maybe_async_attr]
    pub async fn set_int_zero(&mut self, int_zero: IntZero) -> Result<(), Error<I2C, MENB>> {
        self.ll.refcn().modify(|_, w| w.int_z(int_zero.bits())).await
    }

    /// Returns the bias polarity
    #[maybe_async_attr]
    pub async fn bias_sign(&mut self) -> Result<BiasSign, Error<I2C, MENB>> {
        let refcn = self.ll.refcn().read().await?;

        Ok(BiasSign::from_bits(refcn.bias_sign()))
    }

    /// Sets the bias polarity
    ///
    /// REFCN is lock-protected, this only takes effect while unlocked.
    #[maybe_async_attr]
    pub async fn set_bias_sign(&mut self, sign: BiasSign) -> Result<(), Error<I2C, MENB>> {
        self.ll.refcn().modify(|_, w| w.bias_sign(sign.bits())).await
    }

    /// Returns the bias magnitude
    #[maybe_async_attr]
    pub async fn bias(&mut self) -> Result<Bias, Error<I2C, MENB>> {
        let bias = Bias::from_bits(self.ll.refcn().read().await?.bias());

        #[cfg(feature = "defmt")]
        if let Bias::Reserved(code) = bias {
            defmt::warn!("REFCN holds reserved bias code {=u8}", code);
        }

        Ok(bias)
    }

    /// Sets the bias magnitude
    ///
    /// REFCN is lock-protected, this only takes effect while unlocked.
    #[maybe_async_attr]
    pub async fn set_bias(&mut self, bias: Bias) -> Result<(), Error<I2C, MENB>> {
        self.ll.refcn().modify(|_, w| w.bias(bias.bits())).await
    }

    /// Returns true if the shorting FET is enabled
    #[maybe_async_attr]
    pub async fn fet_short(&mut self) -> Result<bool, Error<I2C, MENB>> {
        Ok(self.ll.modecn().read().await?.fet_short() == 0b1)
    }

    /// Enables or disables the shorting FET
    #[maybe_async_attr]
    pub async fn set_fet_short(&mut self, enabled: bool) -> Result<(), Error<I2C, MENB>> {
        self.ll.modecn().modify(|_, w| w.fet_short(enabled as u8)).await
    }

    /// Returns the mode of operation
    #[maybe_async_attr]
    pub async fn op_mode(&mut self) -> Result<OpMode, Error<I2C, MENB>> {
        let mode = OpMode::from_bits(self.ll.modecn().read().await?.op_mode());

        #[cfg(feature = "defmt")]
        if let OpMode::Reserved(code) = mode {
            defmt::warn!("MODECN holds reserved mode code {=u8}", code);
        }

        Ok(mode)
    }

    /// Sets the mode of operation
    #[maybe_async_attr]
    pub async fn set_op_mode(&mut self, mode: OpMode) -> Result<(), Error<I2C, MENB>> {
        self.ll.modecn().modify(|_, w| w.op_mode(mode.bits())).await
    }

    /// Applies a complete configuration
    ///
    /// Runs the following sequence:
    ///
    /// 1. Unlock, whatever the current lock state is.
    /// 2. Write TIACN, REFCN and MODECN, in that order, each as one full byte
    ///    assembled from `config`.
    /// 3. Lock again.
    ///
    /// Every step is attempted even if an earlier one failed, and nothing is
    /// rolled back. If any step failed, the error of the last failing step is
    /// returned. The device may then hold a mix of old and new settings;
    /// re-run `configure` or use [`read_config`] to find out.
    ///
    /// [`read_config`]: #method.read_config
    #[maybe_async_attr]
    pub async fn configure(&mut self, config: &Config) -> Result<(), Error<I2C, MENB>> {
        let [tiacn, refcn, modecn] = config.to_registers();
        let writes = [
            (TIACN::ADDR, tiacn),
            (REFCN::ADDR, refcn),
            (MODECN::ADDR, modecn),
        ];

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "configure: TIACN=0x{=u8:02x} REFCN=0x{=u8:02x} MODECN=0x{=u8:02x}",
            tiacn,
            refcn,
            modecn
        );

        let mut result = self.set_locked(false).await;
        for (addr, value) in writes {
            let write = self.ll.write_raw(addr, value).await;
            if write.is_err() {
                result = write;
            }
        }
        let relock = self.set_locked(true).await;
        if relock.is_err() {
            result = relock;
        }

        #[cfg(feature = "defmt")]
        if result.is_err() {
            defmt::warn!("configure: sequence did not complete");
        }

        result
    }

    /// Reads TIACN, REFCN and MODECN and decodes them into a [`Config`]
    #[maybe_async_attr]
    pub async fn read_config(&mut self) -> Result<Config, Error<I2C, MENB>> {
        let tiacn = self.ll.read_raw(TIACN::ADDR).await?;
        let refcn = self.ll.read_raw(REFCN::ADDR).await?;
        let modecn = self.ll.read_raw(MODECN::ADDR).await?;

        Ok(Config::from_registers([tiacn, refcn, modecn]))
    }
}

#[cfg(all(test, not(feature = "async")))]
mod test {
    use super::*;

    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::{
        digital::{Mock as PinMock, State as PinState, Transaction as PinTransaction},
        i2c::{Mock as I2cMock, Transaction as I2cTransaction},
    };

    use crate::I2C_ADDRESS;

    fn read(addr: u8, value: u8) -> [I2cTransaction; 2] {
        [
            I2cTransaction::write(I2C_ADDRESS, vec![addr]),
            I2cTransaction::read(I2C_ADDRESS, vec![value]),
        ]
    }

    fn write(addr: u8, value: u8) -> I2cTransaction {
        I2cTransaction::write(I2C_ADDRESS, vec![addr, value])
    }

    /// A ready driver expecting `bus`, with one MENB strobe per transfer
    fn ready(
        bus: &[I2cTransaction],
        transfers: usize,
    ) -> (LMP91000<I2cMock, PinMock, Ready>, I2cMock, PinMock) {
        let i2c = I2cMock::new(bus);

        let mut pin = vec![PinTransaction::set(PinState::High)];
        for _ in 0..transfers {
            pin.push(PinTransaction::set(PinState::Low));
            pin.push(PinTransaction::set(PinState::High));
        }
        let menb = PinMock::new(&pin);

        let lmp = LMP91000::new(i2c.clone(), menb.clone()).begin().unwrap();

        (lmp, i2c, menb)
    }

    #[test]
    fn begin_only_idles_menb() {
        let (lmp, mut i2c, mut menb) = ready(&[], 0);

        assert_eq!(format!("{:?}", lmp), "LMP91000 { state: Ready, .. }");

        i2c.done();
        menb.done();
    }

    #[test]
    fn is_ready_reads_status_bit() {
        let bus = [read(0x00, 0x01), read(0x00, 0xfe)].concat();
        let (mut lmp, mut i2c, mut menb) = ready(&bus, 2);

        assert!(lmp.is_ready().unwrap());
        assert!(!lmp.is_ready().unwrap());

        i2c.done();
        menb.done();
    }

    #[test]
    fn gain_and_load_share_tiacn() {
        let bus = [
            &read(0x10, 0x00)[..],
            &[write(0x10, 0b0001_0000)],
            &read(0x10, 0b0001_0000),
            &[write(0x10, 0b0001_0001)],
            &read(0x10, 0b0001_0001),
            &read(0x10, 0b0001_0001),
        ]
        .concat();
        let (mut lmp, mut i2c, mut menb) = ready(&bus, 6);

        lmp.set_tia_gain(TiaGain::R14k).unwrap();
        lmp.set_r_load(RLoad::R33).unwrap();

        assert_eq!(lmp.tia_gain().unwrap(), TiaGain::R14k);
        assert_eq!(lmp.r_load().unwrap(), RLoad::R33);

        i2c.done();
        menb.done();
    }

    #[test]
    fn fet_short_and_mode_share_modecn() {
        let bus = [
            &read(0x12, 0x00)[..],
            &[write(0x12, 0x80)],
            &read(0x12, 0x80),
            &[write(0x12, 0x87)],
            &read(0x12, 0x87),
        ]
        .concat();
        let (mut lmp, mut i2c, mut menb) = ready(&bus, 5);

        lmp.set_fet_short(true).unwrap();
        lmp.set_op_mode(OpMode::TiaOn).unwrap();

        assert!(lmp.fet_short().unwrap());

        i2c.done();
        menb.done();
    }

    #[test]
    fn refcn_fields_are_independent() {
        let bus = [
            &read(0x11, 0x20)[..],
            &[write(0x11, 0xa0)],
            &read(0x11, 0xa0),
            &[write(0x11, 0xb0)],
            &read(0x11, 0xb0),
            &[write(0x11, 0xb5)],
            &read(0x11, 0xb5),
            &[write(0x11, 0xd5)],
            &read(0x11, 0xd5),
            &read(0x11, 0xd5),
            &read(0x11, 0xd5),
            &read(0x11, 0xd5),
        ]
        .concat();
        let (mut lmp, mut i2c, mut menb) = ready(&bus, 12);

        lmp.set_ref_source(RefSource::External).unwrap();
        lmp.set_bias_sign(BiasSign::Positive).unwrap();
        lmp.set_bias(Bias::Pct8).unwrap();
        lmp.set_int_zero(IntZero::Pct67).unwrap();

        assert_eq!(lmp.ref_source().unwrap(), RefSource::External);
        assert_eq!(lmp.bias_sign().unwrap(), BiasSign::Positive);
        assert_eq!(lmp.bias().unwrap(), Bias::Pct8);
        assert_eq!(lmp.int_zero().unwrap(), IntZero::Pct67);

        i2c.done();
        menb.done();
    }

    #[test]
    fn reserved_codes_are_read_back_raw() {
        let bus = [read(0x12, 0x85), read(0x11, 0x0f)].concat();
        let (mut lmp, mut i2c, mut menb) = ready(&bus, 2);

        assert_eq!(lmp.op_mode().unwrap(), OpMode::Reserved(5));
        assert_eq!(lmp.bias().unwrap(), Bias::Reserved(0xf));

        i2c.done();
        menb.done();
    }

    #[test]
    fn set_locked_keeps_reserved_bits() {
        let bus = [
            &read(0x01, 0xf1)[..],
            &[write(0x01, 0xf0)],
            &read(0x01, 0xf0),
            &read(0x01, 0xf0),
            &[write(0x01, 0xf1)],
        ]
        .concat();
        let (mut lmp, mut i2c, mut menb) = ready(&bus, 5);

        lmp.set_locked(false).unwrap();
        assert!(!lmp.is_locked().unwrap());
        lmp.set_locked(true).unwrap();

        i2c.done();
        menb.done();
    }

    #[test]
    fn configure_unlocks_writes_in_order_and_relocks() {
        let config = Config {
            tia_gain: TiaGain::R14k,
            r_load: RLoad::R33,
            ref_source: RefSource::External,
            int_zero: IntZero::Pct20,
            bias_sign: BiasSign::Positive,
            bias: Bias::Pct2,
            fet_short: false,
            op_mode: OpMode::ThreeLead,
        };

        let bus = [
            &read(0x01, 0x01)[..],
            &[write(0x01, 0x00)],
            &[write(0x10, 0x11)],
            &[write(0x11, 0x92)],
            &[write(0x12, 0x03)],
            &read(0x01, 0x00),
            &[write(0x01, 0x01)],
            &read(0x01, 0x01),
        ]
        .concat();
        let (mut lmp, mut i2c, mut menb) = ready(&bus, 8);

        lmp.configure(&config).unwrap();
        assert!(lmp.is_locked().unwrap());

        i2c.done();
        menb.done();
    }

    #[test]
    fn configure_reports_refcn_failure_and_finishes_the_sequence() {
        let bus = [
            &read(0x01, 0x01)[..],
            &[write(0x01, 0x00)],
            &[write(0x10, 0x03)],
            &[write(0x11, 0x20).with_error(ErrorKind::Other)],
            &[write(0x12, 0x00)],
            &read(0x01, 0x00),
            &[write(0x01, 0x01)],
        ]
        .concat();
        let (mut lmp, mut i2c, mut menb) = ready(&bus, 7);

        let error = lmp.configure(&Config::default()).unwrap_err();
        assert!(matches!(error, Error::Bus(ErrorKind::Other)));

        i2c.done();
        menb.done();
    }

    #[test]
    fn configure_writes_registers_even_when_unlock_fails() {
        let bus = [
            &[I2cTransaction::write(I2C_ADDRESS, vec![0x01]).with_error(ErrorKind::Other)][..],
            &[write(0x10, 0x03)],
            &[write(0x11, 0x20)],
            &[write(0x12, 0x00)],
            &read(0x01, 0x01),
            &[write(0x01, 0x01)],
        ]
        .concat();
        let (mut lmp, mut i2c, mut menb) = ready(&bus, 6);

        let error = lmp.configure(&Config::default()).unwrap_err();
        assert!(matches!(error, Error::Bus(ErrorKind::Other)));

        i2c.done();
        menb.done();
    }

    #[test]
    fn configure_returns_the_last_error() {
        let bus = [
            &read(0x01, 0x01)[..],
            &[write(0x01, 0x00)],
            &[write(0x10, 0x03)],
            &[write(0x11, 0x20).with_error(ErrorKind::ArbitrationLoss)],
            &[write(0x12, 0x00)],
            &[I2cTransaction::write(I2C_ADDRESS, vec![0x01]).with_error(ErrorKind::Bus)],
        ]
        .concat();
        let (mut lmp, mut i2c, mut menb) = ready(&bus, 6);

        let error = lmp.configure(&Config::default()).unwrap_err();
        assert!(matches!(error, Error::Bus(ErrorKind::Bus)));

        i2c.done();
        menb.done();
    }

    #[test]
    fn reserved_codes_cannot_spill_into_neighbouring_fields() {
        let bus = [
            &read(0x12, 0x80)[..],
            &[write(0x12, 0x85)],
            &read(0x11, 0x90),
            &[write(0x11, 0x9e)],
        ]
        .concat();
        let (mut lmp, mut i2c, mut menb) = ready(&bus, 4);

        lmp.set_op_mode(OpMode::Reserved(0x85)).unwrap();
        lmp.set_bias(Bias::Reserved(0x1e)).unwrap();

        i2c.done();
        menb.done();
    }

    #[test]
    fn read_config_decodes_control_registers() {
        let bus = [read(0x10, 0x11), read(0x11, 0x92), read(0x12, 0x83)].concat();
        let (mut lmp, mut i2c, mut menb) = ready(&bus, 3);

        let config = lmp.read_config().unwrap();

        assert_eq!(config.tia_gain, TiaGain::R14k);
        assert_eq!(config.r_load, RLoad::R33);
        assert_eq!(config.ref_source, RefSource::External);
        assert_eq!(config.int_zero, IntZero::Pct20);
        assert_eq!(config.bias_sign, BiasSign::Positive);
        assert_eq!(config.bias, Bias::Pct2);
        assert!(config.fet_short);
        assert_eq!(config.op_mode, OpMode::ThreeLead);

        i2c.done();
        menb.done();
    }

    #[test]
    fn release_returns_bus_and_pin() {
        let bus = read(0x00, 0x01);
        let (mut lmp, _, _) = ready(&bus, 1);

        assert!(lmp.is_ready().unwrap());

        let (mut i2c, mut menb) = lmp.release();
        i2c.done();
        menb.done();
    }
}
