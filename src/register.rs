//! This module defines the register address space of the DPS power supplies.
//!
//! The map has two halves: a block of global parameters at 0x00 - 0x0C, and
//! ten memory groups (M0 - M9) of stored presets, each group 0x10 registers
//! wide with 8 registers in use.

use strum_macros::{EnumCount as EnumCountMacro, EnumIter};

use crate::error::{Error, Result};

/// Global device parameters, one per holding register.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, EnumIter, EnumCountMacro)]
#[repr(u16)]
pub enum ParamName {
    /// __R/W__ - Voltage setting.
    ///
    /// Value is u16 in units of 10 mV. E.g. 5.0V => `500`.
    VSet = 0x00,
    /// __R/W__ - Current limit setting.
    ///
    /// Value is u16 in units of 10 mA. E.g. 1.5A => `150`.
    ISet = 0x01,
    /// __R__ - Output voltage display value.
    VOut = 0x02,
    /// __R__ - Output current display value.
    IOut = 0x03,
    /// __R__ - Output power display value.
    Power = 0x04,
    /// __R__ - Input voltage display value.
    VIn = 0x05,
    /// __R/W__ - Key lock.
    /// * `0` - Unlocked.
    /// * `1` - Locked.
    Lock = 0x06,
    /// __R__ - Protection status.
    ///
    /// See [`ProtectionStatus`] for the possible codes.
    Protect = 0x07,
    /// __R__ - Constant voltage / constant current state.
    /// * `0` - CV.
    /// * `1` - CC.
    ///
    /// See [`RegulationMode`].
    CvCc = 0x08,
    /// __R/W__ - Switched output.
    /// * `0` - Off.
    /// * `1` - On.
    OnOff = 0x09,
    /// __R/W__ - Backlight brightness level.
    ///
    /// Range = 0-5. 0 is darkest, 5 is brightest.
    Backlight = 0x0A,
    /// __R__ - Product model. A DPS5015 reports `5015`.
    Model = 0x0B,
    /// __R__ - Firmware version number.
    Version = 0x0C,
}

impl From<ParamName> for u16 {
    fn from(value: ParamName) -> Self {
        value as u16
    }
}

impl TryFrom<u16> for ParamName {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self> {
        use ParamName as PN;
        match value {
            0x00 => Ok(PN::VSet),
            0x01 => Ok(PN::ISet),
            0x02 => Ok(PN::VOut),
            0x03 => Ok(PN::IOut),
            0x04 => Ok(PN::Power),
            0x05 => Ok(PN::VIn),
            0x06 => Ok(PN::Lock),
            0x07 => Ok(PN::Protect),
            0x08 => Ok(PN::CvCc),
            0x09 => Ok(PN::OnOff),
            0x0A => Ok(PN::Backlight),
            0x0B => Ok(PN::Model),
            0x0C => Ok(PN::Version),
            other => Err(Error::UnknownRegister(other)),
        }
    }
}

/// Each memory group is allotted this many addresses.
pub static GROUP_STRIDE: u16 = 0x10;

/// Registers stored per memory group, as offsets from the group base address.
///
/// Base address of group = {group number} * [`GROUP_STRIDE`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, EnumIter, EnumCountMacro)]
#[repr(u16)]
pub enum SettingName {
    /// __R/W__ - Preset voltage setting.
    VSet = 0x00,
    /// __R/W__ - Preset current limit setting.
    ISet = 0x01,
    /// __R/W__ - Over-voltage protection level.
    OverVoltage = 0x02,
    /// __R/W__ - Over-current protection level.
    OverCurrent = 0x03,
    /// __R/W__ - Over-power protection level.
    OverPower = 0x04,
    /// __R/W__ - Backlight brightness level. Range = 0-5.
    Backlight = 0x05,
    /// __R/W__ - Memory preset recalled at startup. Range = 0-9.
    MemoryPreset = 0x06,
    /// __R/W__ - Output state applied at power-on.
    PowerOnOutput = 0x07,
}

impl SettingName {
    /// Return the address of this register within the given memory group.
    pub fn address_in_group(&self, group: MemoryGroup) -> u16 {
        group as u16 * GROUP_STRIDE + *self as u16
    }
}

impl From<SettingName> for u16 {
    fn from(value: SettingName) -> Self {
        value as u16
    }
}

impl TryFrom<u16> for SettingName {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self> {
        use SettingName as SN;
        match value {
            0x00 => Ok(SN::VSet),
            0x01 => Ok(SN::ISet),
            0x02 => Ok(SN::OverVoltage),
            0x03 => Ok(SN::OverCurrent),
            0x04 => Ok(SN::OverPower),
            0x05 => Ok(SN::Backlight),
            0x06 => Ok(SN::MemoryPreset),
            0x07 => Ok(SN::PowerOnOutput),
            other => Err(Error::UnknownRegister(other)),
        }
    }
}

/// This enum represents all possible memory groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum MemoryGroup {
    Group0 = 0x00,
    Group1 = 0x01,
    Group2 = 0x02,
    Group3 = 0x03,
    Group4 = 0x04,
    Group5 = 0x05,
    Group6 = 0x06,
    Group7 = 0x07,
    Group8 = 0x08,
    Group9 = 0x09,
}

/// A register reference as accepted at the public API boundary.
///
/// Lookups take either a symbolic name or a raw address; the raw form is
/// checked against the known address space on resolution. Where a group-0
/// setting address coincides with a parameter address, the parameter
/// interpretation wins (group 0 holds the live values).
#[derive(Debug, Clone, Copy)]
pub enum RegisterKey {
    Param(ParamName),
    Setting(MemoryGroup, SettingName),
    Address(u16),
}

impl From<ParamName> for RegisterKey {
    fn from(name: ParamName) -> Self {
        RegisterKey::Param(name)
    }
}

impl From<(MemoryGroup, SettingName)> for RegisterKey {
    fn from((group, name): (MemoryGroup, SettingName)) -> Self {
        RegisterKey::Setting(group, name)
    }
}

impl From<u16> for RegisterKey {
    fn from(address: u16) -> Self {
        RegisterKey::Address(address)
    }
}

/// Used to be less ambiguous on whether something is on or off.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    /// Disabled.
    #[default]
    Off = 0x00,
    /// Enabled.
    On = 0x01,
}

impl From<State> for bool {
    fn from(value: State) -> Self {
        match value {
            State::Off => false,
            State::On => true,
        }
    }
}

impl From<bool> for State {
    fn from(value: bool) -> Self {
        match value {
            true => State::On,
            false => State::Off,
        }
    }
}

/// Represents the two possible power supply regulation modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegulationMode {
    /// Constant voltage regulation mode.
    Cv,
    /// Constant current regulation mode.
    Cc,
}

impl From<u16> for RegulationMode {
    fn from(value: u16) -> Self {
        match value {
            0x00 => RegulationMode::Cv,
            _ => RegulationMode::Cc,
        }
    }
}

impl From<RegulationMode> for u16 {
    fn from(value: RegulationMode) -> Self {
        match value {
            RegulationMode::Cv => 0x00,
            RegulationMode::Cc => 0x01,
        }
    }
}

/// Protection status register codes.
#[derive(Debug, EnumIter, PartialEq, Eq, Clone, Copy)]
#[repr(u16)]
pub enum ProtectionStatus {
    /// 0: No protection tripped.
    None = 0x00,
    /// 1: OVP over-voltage protection.
    OverVoltage = 0x01,
    /// 2: OCP over-current protection.
    OverCurrent = 0x02,
    /// 3: OPP over-power protection.
    OverPower = 0x03,
}

impl From<u16> for ProtectionStatus {
    fn from(value: u16) -> Self {
        use ProtectionStatus as PS;
        match value {
            0x01 => PS::OverVoltage,
            0x02 => PS::OverCurrent,
            0x03 => PS::OverPower,
            // Default to no alarms active if outside of expected values.
            _ => PS::None,
        }
    }
}
