use crate::address::Address;
use crate::calibration::{Calibration, CalibrationContext, UnCalibrated};
use crate::configuration::{
    AccumulatorReset, AdcConfiguration, AdcRange, Configuration, DeviceConfiguration, Reset,
};
use crate::diagnostics::{AlertConfiguration, DiagnosticFlags};
use crate::errors::{
    ConfigurationReadError, InitializationError, InitializationErrorReason, MeasurementError,
};
use crate::measurements::{
    BusVoltage, Charge, Current, DieTemperature, Energy, Measurements, Power, ShuntVoltage,
};
use crate::register::{
    fields, DeviceId, ManufacturerId, ReadRegister, RegisterName, WriteRegister,
};
use crate::thresholds::Threshold;
use byteorder::{BigEndian, ByteOrder};
use core::fmt::{Debug, Formatter};
use embedded_hal_async::i2c::I2c;

/// Embedded HAL compatible driver for the INA228
pub struct INA228<I2C, Calib> {
    i2c: I2C,
    address: Address,
    calib: Calib,
    /// Shunt range the device is configured for, needed to decode the shunt voltage
    adc_range: AdcRange,
    #[cfg(feature = "paranoid")]
    config: Option<Configuration>,
}

impl<I2C, Calib> Debug for INA228<I2C, Calib> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("INA228")
            .field("address", &self.address)
            .field("adc_range", &self.adc_range)
            .finish_non_exhaustive()
    }
}

impl<I2C> INA228<I2C, UnCalibrated>
where
    I2C: I2c,
{
    /// Open an INA228 without calibration
    ///
    /// Performs a reset and if the `paranoid` feature is active checks that the device identifies
    /// as an INA228.
    ///
    /// # Errors
    /// If the device returns an unexpected response a `InitializationError` is returned.
    pub async fn new(
        i2c: I2C,
        address: Address,
    ) -> Result<Self, InitializationError<I2C, I2C::Error>> {
        Self::new_calibrated(i2c, address, UnCalibrated).await
    }
}

impl<I2C, Calib> INA228<I2C, Calib>
where
    I2C: I2c,
    Calib: Calibration,
{
    /// Open an INA228, perform a reset, check the device and apply the provided calibration
    ///
    /// # Errors
    /// If the device returns an unexpected response a `InitializationError` is returned, it hands
    /// back the I2C device.
    pub async fn new_calibrated(
        i2c: I2C,
        address: Address,
        calibration: Calib,
    ) -> Result<Self, InitializationError<I2C, I2C::Error>> {
        let mut new = INA228::new_unchecked(i2c, address, calibration);

        match new.init().await {
            Ok(()) => Ok(new),
            Err(e) => Err(InitializationError::new(e, new.destroy())),
        }
    }

    /// Bring the device into a known state
    /// - Perform a reset and wait until the configuration reads back as default
    /// - If paranoid: check the IDs and that the accumulators were cleared
    /// - Write the calibration
    async fn init(&mut self) -> Result<(), InitializationErrorReason<I2C::Error>> {
        self.reset_device().await?;

        #[cfg(feature = "paranoid")]
        {
            let manufacturer: ManufacturerId = self.read().await?;
            if manufacturer != ManufacturerId::TEXAS_INSTRUMENTS {
                return Err(InitializationErrorReason::UnexpectedManufacturer(
                    manufacturer.0,
                ));
            }

            let device: DeviceId = self.read().await?;
            if !device.is_ina228() {
                return Err(InitializationErrorReason::UnexpectedDevice(device.die));
            }

            for reg in [RegisterName::Energy, RegisterName::Charge] {
                if self.read_raw(reg).await? != 0 {
                    return Err(InitializationErrorReason::RegisterNotZeroAfterReset(reg));
                }
            }
        }

        self.write_calibration(true).await?;

        Ok(())
    }

    /// Create a new `INA228` assuming the device is already initialized
    ///
    /// Nothing is written to the device. The shunt range is assumed to be ±163.84mV until the
    /// configuration is read or written.
    pub const fn new_unchecked(i2c: I2C, address: Address, calib: Calib) -> Self {
        INA228 {
            i2c,
            address,
            calib,
            adc_range: AdcRange::Fsr163mv84,
            #[cfg(feature = "paranoid")]
            config: None,
        }
    }

    /// Destroy the driver returning the underlying I2C device
    ///
    /// This does leave the device in it's current state.
    pub fn destroy(self) -> I2C {
        self.i2c
    }

    /// Perform a system reset and restore the calibration
    ///
    /// All registers return to their defaults, this includes thresholds, alert configuration and
    /// both accumulators.
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error or the device does not come
    /// back with its default configuration.
    pub async fn reset(&mut self) -> Result<(), InitializationErrorReason<I2C::Error>> {
        self.reset_device().await?;
        self.write_calibration(true).await?;
        Ok(())
    }

    async fn reset_device(&mut self) -> Result<(), InitializationErrorReason<I2C::Error>> {
        const MAX_RESET_READ_RETRIES: u8 = 10;

        #[cfg(feature = "paranoid")]
        {
            self.config = None;
        }

        self.write(DeviceConfiguration {
            reset: Reset::Reset,
            ..DeviceConfiguration::default()
        })
        .await?;
        self.adc_range = AdcRange::default();

        let mut attempt = 0;
        loop {
            // RST decodes as `Run` either way, so look at the raw bit
            let raw = self.read_raw(RegisterName::Config).await?;
            let conf = Configuration {
                device: <DeviceConfiguration as ReadRegister>::from_bits(raw),
                adc: self.read().await?,
            };

            if fields::RESET.extract(raw) == 0 && conf == Configuration::default() {
                #[cfg(feature = "paranoid")]
                {
                    self.config = Some(Configuration::default());
                }
                return Ok(());
            }

            if attempt > MAX_RESET_READ_RETRIES {
                return Err(InitializationErrorReason::ConfigurationNotDefaultAfterReset);
            }

            attempt += 1;
        }
    }

    async fn read_configuration(&mut self) -> Result<Configuration, I2C::Error> {
        let device: DeviceConfiguration = self.read().await?;
        let adc: AdcConfiguration = self.read().await?;
        Ok(Configuration { device, adc })
    }

    /// Read the current [`Configuration`]
    ///
    /// The shunt range used to decode shunt voltages is updated to what the device reports.
    ///
    /// # Errors
    /// Returns Err() when the underlying I2C device returns an error.
    ///
    /// *With feature `paranoid`*:
    ///
    /// If the read configuration does not match the last saved configuration an error is returned
    /// and the saved configuration is updated to the read configuration.
    pub async fn configuration(
        &mut self,
    ) -> Result<Configuration, ConfigurationReadError<I2C::Error>> {
        let read = self.read_configuration().await?;
        self.adc_range = read.device.adc_range;

        #[cfg(feature = "paranoid")]
        {
            let saved = *self.config.get_or_insert(read);
            if read != saved {
                self.config = Some(read);
                return Err(ConfigurationReadError::ConfigurationMismatch { read, saved });
            }
        }

        Ok(read)
    }

    /// Set a new [`Configuration`]
    ///
    /// `CONFIG` is written before `ADC_CONFIG`. If the shunt range changes the calibration is
    /// written again, since it depends on the range.
    ///
    /// Setting `reset` performs a system reset, use [`Self::reset`] for that instead.
    ///
    /// # Errors
    /// Returns Err() when the underlying I2C device returns an error.
    pub async fn set_configuration(&mut self, conf: Configuration) -> Result<(), I2C::Error> {
        let result = self.write_configuration(conf).await;

        #[cfg(feature = "paranoid")]
        {
            self.config = match result {
                // Both reset flags clear themselves and never read back as set
                Ok(()) => Some(Configuration {
                    device: DeviceConfiguration {
                        reset: Reset::Run,
                        reset_accumulators: AccumulatorReset::Keep,
                        ..conf.device
                    },
                    adc: conf.adc,
                }),
                // We don't know anything about the current conf
                Err(_) => None,
            };
        }

        #[cfg_attr(not(feature = "paranoid"), allow(clippy::let_and_return))]
        result
    }

    async fn write_configuration(&mut self, conf: Configuration) -> Result<(), I2C::Error> {
        self.write(conf.device).await?;
        self.write(conf.adc).await?;

        let range_changed = self.adc_range != conf.device.adc_range;
        self.adc_range = conf.device.adc_range;
        if range_changed {
            self.write_calibration(false).await?;
        }

        Ok(())
    }

    /// Clear the ENERGY and CHARGE accumulators
    ///
    /// Reads `CONFIG`, sets the accumulator reset bit and writes it back, all other bits keep
    /// their value.
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn reset_accumulators(&mut self) -> Result<(), I2C::Error> {
        #[allow(clippy::cast_possible_truncation)]
        let config = self.read_raw(RegisterName::Config).await? as u16;
        self.write_raw(
            RegisterName::Config,
            AccumulatorReset::Clear.apply_to_reg(config),
        )
        .await
    }

    /// Trigger a new conversion
    ///
    /// This writes the current ADC configuration again. In one of the triggered modes this starts
    /// a single conversion, in continuous mode the running conversion restarts.
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returned an error.
    pub async fn trigger(&mut self) -> Result<(), I2C::Error> {
        let saved = {
            #[cfg(feature = "paranoid")]
            {
                self.config.map(|c| c.adc)
            }
            #[cfg(not(feature = "paranoid"))]
            {
                None
            }
        };

        let adc = match saved {
            Some(adc) => adc,
            None => self.read::<AdcConfiguration>().await?,
        };

        self.write(adc).await
    }

    /// Set a new [`Calibration`]
    ///
    /// Both the shunt calibration and the temperature coefficient are written.
    ///
    /// # Errors
    /// Returns Err() when the underlying I2C device returns an error.
    pub async fn calibrate(&mut self, value: Calib) -> Result<(), I2C::Error> {
        self.calib = value;
        self.write_calibration(false).await
    }

    /// Write the calibration for the current shunt range
    ///
    /// After a reset both registers are zero so writing a zero can be skipped.
    async fn write_calibration(&mut self, after_reset: bool) -> Result<(), I2C::Error> {
        let shunt_calibration = self.calib.shunt_calibration(self.adc_range);
        if !after_reset || shunt_calibration.bits() != 0 {
            self.write(shunt_calibration).await?;
        }

        let coefficient = self.calib.temperature_coefficient();
        if !after_reset || coefficient.ppm_per_celsius() != 0 {
            self.write(coefficient).await?;
        }

        Ok(())
    }

    fn context(&self) -> Result<CalibrationContext, MeasurementError<I2C::Error>> {
        self.calib.context().ok_or(MeasurementError::NotCalibrated)
    }

    /// Read the measurements of the last conversion if there is a new one
    ///
    /// Returns `Ok(None)` if no conversion finished since the diagnostic register was last read.
    /// Reading the diagnostic register clears the conversion complete flag, so every conversion is
    /// reported at most once. Current and power are only read if a calibration is set.
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error. If the device reports a
    /// math overflow [`MeasurementError::MathOverflow`] carries the voltages and temperature,
    /// current and power are left out as they are not valid.
    pub async fn next_measurement(
        &mut self,
    ) -> Result<Option<Measurements>, MeasurementError<I2C::Error>> {
        let flags = self.diagnostics().await?;
        if !flags.contains(DiagnosticFlags::CONVERSION_COMPLETE) {
            return Ok(None);
        }

        let mut measurements = Measurements {
            shunt_voltage: self.shunt_voltage().await?,
            bus_voltage: self.bus_voltage().await?,
            die_temperature: self.die_temperature().await?,
            current: None,
            power: None,
        };

        if flags.contains(DiagnosticFlags::MATH_OVERFLOW) {
            return Err(MeasurementError::MathOverflow(measurements));
        }

        if let Some(context) = self.calib.context() {
            measurements.current = Some(Current::from_register(self.read().await?, context));
            measurements.power = Some(Power::from_register(self.read().await?, context));
        }

        Ok(Some(measurements))
    }

    /// Read the last measured shunt voltage
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn shunt_voltage(&mut self) -> Result<ShuntVoltage, I2C::Error> {
        Ok(ShuntVoltage::from_register(
            self.read().await?,
            self.adc_range,
        ))
    }

    /// Read the last measured bus voltage
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn bus_voltage(&mut self) -> Result<BusVoltage, I2C::Error> {
        Ok(BusVoltage::from_register(self.read().await?))
    }

    /// Read the last measured die temperature
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn die_temperature(&mut self) -> Result<DieTemperature, I2C::Error> {
        Ok(DieTemperature::from_register(self.read().await?))
    }

    /// Read the last calculated current
    ///
    /// # Errors
    /// Returns [`MeasurementError::NotCalibrated`] without touching the bus if no calibration is
    /// set, otherwise only errors of the I2C device.
    pub async fn current(&mut self) -> Result<Current, MeasurementError<I2C::Error>> {
        let context = self.context()?;
        Ok(Current::from_register(self.read().await?, context))
    }

    /// Read the last calculated power
    ///
    /// # Errors
    /// See [`Self::current`].
    pub async fn power(&mut self) -> Result<Power, MeasurementError<I2C::Error>> {
        let context = self.context()?;
        Ok(Power::from_register(self.read().await?, context))
    }

    /// Read the energy accumulated since the last reset
    ///
    /// # Errors
    /// See [`Self::current`].
    pub async fn energy(&mut self) -> Result<Energy, MeasurementError<I2C::Error>> {
        let context = self.context()?;
        Ok(Energy::from_register(self.read().await?, context))
    }

    /// Read the charge accumulated since the last reset
    ///
    /// # Errors
    /// See [`Self::current`].
    pub async fn charge(&mut self) -> Result<Charge, MeasurementError<I2C::Error>> {
        let context = self.context()?;
        Ok(Charge::from_register(self.read().await?, context))
    }

    /// Read the diagnostic flags
    ///
    /// This clears the conversion complete flag and, if the alert is latched, the alert pin.
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn diagnostics(&mut self) -> Result<DiagnosticFlags, I2C::Error> {
        self.read().await
    }

    /// Read the alert configuration
    ///
    /// This reads the diagnostic register and has the same side effects as [`Self::diagnostics`].
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn alert_configuration(&mut self) -> Result<AlertConfiguration, I2C::Error> {
        Ok(self.diagnostics().await?.into())
    }

    /// Write the alert configuration, the status flags are never written
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn set_alert_configuration(
        &mut self,
        conf: AlertConfiguration,
    ) -> Result<(), I2C::Error> {
        self.write(conf).await
    }

    /// Read a limit register
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    #[allow(clippy::cast_possible_truncation)]
    pub async fn threshold(&mut self, threshold: Threshold) -> Result<u16, I2C::Error> {
        Ok(self.read_raw(threshold.register()).await? as u16)
    }

    /// Write a limit register, see [`crate::thresholds`] for unit conversions
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn set_threshold(
        &mut self,
        threshold: Threshold,
        bits: u16,
    ) -> Result<(), I2C::Error> {
        self.write_raw(threshold.register(), bits).await
    }

    /// Read the manufacturer ID, 0x5449 for Texas Instruments
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn manufacturer_id(&mut self) -> Result<ManufacturerId, I2C::Error> {
        self.read().await
    }

    /// Read die ID and revision
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn device_id(&mut self) -> Result<DeviceId, I2C::Error> {
        self.read().await
    }

    /// Read a register as it is, `width` bytes big endian
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn read_raw(&mut self, reg: RegisterName) -> Result<u64, I2C::Error> {
        let len = reg.width().bytes();
        let mut buf = [0u8; 5];
        self.i2c
            .write_read(self.address.as_byte(), &[reg.address()], &mut buf[..len])
            .await?;
        Ok(BigEndian::read_uint(&buf[..len], len))
    }

    /// Write a register as it is
    ///
    /// Writes to read only registers are ignored by the device. Writing `CONFIG` or `ADC_CONFIG`
    /// this way is not tracked by the driver, use [`Self::set_configuration`] for that.
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn write_raw(&mut self, reg: RegisterName, bits: u16) -> Result<(), I2C::Error> {
        let [hi, lo] = bits.to_be_bytes();
        self.i2c
            .write(self.address.as_byte(), &[reg.address(), hi, lo])
            .await
    }

    async fn read<Reg: ReadRegister>(&mut self) -> Result<Reg, I2C::Error> {
        Ok(Reg::from_bits(self.read_raw(Reg::NAME).await?))
    }

    /// Write the value contained in the register to the address dictated by its type
    async fn write<Reg: WriteRegister>(&mut self, reg: Reg) -> Result<(), I2C::Error> {
        self.write_raw(Reg::NAME, reg.as_bits()).await
    }
}
