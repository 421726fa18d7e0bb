//! The power supply client.

use std::collections::HashMap;

use log::debug;

use crate::catalog::{Catalog, DeviceRatings, ParamInfo};
use crate::error::{Error, Result};
use crate::register::{
    MemoryGroup, ParamName, ProtectionStatus, RegisterKey, RegulationMode, SettingName, State,
};
use crate::scaling::{self, FIXED_POINT_DIVISOR};
use crate::transport::ModbusTransport;
use crate::validate;

/// A connected DPS power supply.
///
/// Construction performs discovery: the model and input-voltage registers are
/// read once and the operating limits derived from them populate the register
/// catalog. A `DpsPsu` value is therefore always ready for use; if discovery
/// fails no value is produced.
///
/// For its methods we use the nomenclature that "set" means to write a
/// configuration value and "get" means to read one back, where "get" on a
/// measured quantity returns the live display value.
///
/// Every operation issues blocking register transactions on the shared serial
/// line; `&mut self` throughout keeps access exclusive. Failed transactions
/// surface immediately, nothing is retried.
pub struct DpsPsu<T: ModbusTransport> {
    transport: T,
    catalog: Catalog,
    ratings: DeviceRatings,
}

impl<T: ModbusTransport> DpsPsu<T> {
    /// Connect through the given transport and run discovery.
    pub fn new(mut transport: T) -> Result<Self> {
        let model_raw = Self::discovery_read(&mut transport, ParamName::Model)?;
        let input_raw = Self::discovery_read(&mut transport, ParamName::VIn)?;

        let ratings =
            DeviceRatings::from_registers(model_raw, input_raw as f64 / FIXED_POINT_DIVISOR);
        debug!(
            "discovered DPS{:02}{:02} on a {} V input",
            ratings.voltage_rating, ratings.current_rating, ratings.input_voltage
        );

        let catalog = Catalog::new(&ratings);
        Ok(Self {
            transport,
            catalog,
            ratings,
        })
    }

    fn discovery_read(transport: &mut T, name: ParamName) -> Result<u16> {
        transport
            .read_holding_registers(name.into(), 1)
            .and_then(|registers| registers.first().copied().ok_or(Error::InvalidResponse))
            .map_err(|e| Error::Init(Box::new(e)))
    }

    /// The operating limits discovered at connect time.
    pub fn ratings(&self) -> &DeviceRatings {
        &self.ratings
    }

    /// Metadata for a parameter or stored setting. No device I/O.
    pub fn parameter_info(&self, key: impl Into<RegisterKey>) -> Result<&ParamInfo> {
        self.catalog.lookup(key).map(|(_, info)| info)
    }

    /// Read one register and return its physical value.
    pub fn get_parameter(&mut self, key: impl Into<RegisterKey>) -> Result<f64> {
        let (address, info) = self.catalog.lookup(key)?;
        let raw = self
            .transport
            .read_holding_registers(address, 1)?
            .first()
            .copied()
            .ok_or(Error::InvalidResponse)?;
        Ok(scaling::decode(raw, info))
    }

    /// Validate and write one register.
    pub fn set_parameter(&mut self, key: impl Into<RegisterKey>, value: f64) -> Result<()> {
        let (address, info) = self.catalog.lookup(key)?;
        let integer = validate::check_write(info, value)?;
        let raw = scaling::encode(value, info)?;
        debug!(
            "write {:#06x} <- raw {} ({})",
            address,
            raw,
            if integer { "integer" } else { "scaled" }
        );
        self.transport.write_holding_register(address, raw)
    }

    /// Read a stored setting from a memory group.
    pub fn get_setting(&mut self, group: MemoryGroup, name: SettingName) -> Result<f64> {
        self.get_parameter(RegisterKey::Setting(group, name))
    }

    /// Validate and write a stored setting in a memory group.
    pub fn set_setting(&mut self, group: MemoryGroup, name: SettingName, value: f64) -> Result<()> {
        self.set_parameter(RegisterKey::Setting(group, name), value)
    }

    /// Read every parameter register in one transaction.
    pub fn get_all_parameters(&mut self) -> Result<HashMap<ParamName, f64>> {
        self.read_block(ParamName::VSet, 13)
    }

    /// Read the live variables (everything except the device identity).
    pub fn get_all_variables(&mut self) -> Result<HashMap<ParamName, f64>> {
        self.read_block(ParamName::VSet, 11)
    }

    /// Read the measured quantities: output voltage, current, power, and
    /// input voltage.
    pub fn get_all_measurements(&mut self) -> Result<HashMap<ParamName, f64>> {
        self.read_block(ParamName::VOut, 4)
    }

    /// Read the two set-points.
    pub fn get_set_values(&mut self) -> Result<HashMap<ParamName, f64>> {
        self.read_block(ParamName::VSet, 2)
    }

    /// Read the state flags: key lock, protection, CV/CC, and output.
    pub fn get_full_state_info(&mut self) -> Result<HashMap<ParamName, f64>> {
        self.read_block(ParamName::Lock, 4)
    }

    /// Read the device identity: model and firmware version.
    pub fn get_device_info(&mut self) -> Result<HashMap<ParamName, f64>> {
        self.read_block(ParamName::Model, 2)
    }

    /// One contiguous read of `count` registers decoded slot by slot.
    fn read_block(&mut self, start: ParamName, count: u16) -> Result<HashMap<ParamName, f64>> {
        let start_address = u16::from(start);
        let registers = self.transport.read_holding_registers(start_address, count)?;
        if registers.len() < count as usize {
            return Err(Error::InvalidResponse);
        }

        let mut values = HashMap::with_capacity(count as usize);
        for (i, &raw) in registers.iter().take(count as usize).enumerate() {
            let address = start_address + i as u16;
            let name = ParamName::try_from(address)?;
            values.insert(name, scaling::decode(raw, self.catalog.info(address)?));
        }
        Ok(values)
    }

    /// Set the output voltage in volts, with 10 mV resolution.
    pub fn set_voltage(&mut self, voltage: f64) -> Result<()> {
        self.set_parameter(ParamName::VSet, voltage)
    }

    /// Set the output current limit in amps, with 10 mA resolution.
    pub fn set_current(&mut self, current: f64) -> Result<()> {
        self.set_parameter(ParamName::ISet, current)
    }

    /// Return the measured output voltage in volts.
    pub fn get_voltage(&mut self) -> Result<f64> {
        self.get_parameter(ParamName::VOut)
    }

    /// Return the measured output current in amps.
    pub fn get_current(&mut self) -> Result<f64> {
        self.get_parameter(ParamName::IOut)
    }

    /// Return the measured output power in watts.
    pub fn get_power(&mut self) -> Result<f64> {
        self.get_parameter(ParamName::Power)
    }

    /// Return the measured input voltage in volts.
    pub fn get_input_voltage(&mut self) -> Result<f64> {
        self.get_parameter(ParamName::VIn)
    }

    /// Enable or disable the output.
    pub fn set_output(&mut self, state: impl Into<State>) -> Result<()> {
        self.set_parameter(ParamName::OnOff, state.into() as u16 as f64)
    }

    /// Read whether the output is enabled.
    pub fn get_output_state(&mut self) -> Result<State> {
        let value = self.get_parameter(ParamName::OnOff)?;
        Ok(State::from(value != 0.0))
    }

    /// Enable or disable the key lock of the front panel.
    pub fn set_key_lock(&mut self, state: impl Into<State>) -> Result<()> {
        self.set_parameter(ParamName::Lock, state.into() as u16 as f64)
    }

    /// Return the active regulation mode (CV or CC).
    pub fn get_regulation_mode(&mut self) -> Result<RegulationMode> {
        let value = self.get_parameter(ParamName::CvCc)?;
        Ok(RegulationMode::from(value as u16))
    }

    /// Return which protection has tripped, if any.
    pub fn get_protection_status(&mut self) -> Result<ProtectionStatus> {
        let value = self.get_parameter(ParamName::Protect)?;
        Ok(ProtectionStatus::from(value as u16))
    }

    /// Return the model number, e.g. `50.15` for a DPS5015.
    pub fn get_model(&mut self) -> Result<f64> {
        self.get_parameter(ParamName::Model)
    }

    /// Read the firmware version number.
    pub fn get_firmware_version(&mut self) -> Result<u16> {
        let value = self.get_parameter(ParamName::Version)?;
        Ok(value as u16)
    }
}
