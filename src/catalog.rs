//! Register metadata and the operating limits discovered at connect time.
//!
//! The catalog maps every known register to a [`ParamInfo`] record. Access
//! flags, units, and the fixed small ranges are static; the voltage, current,
//! and protection bounds depend on the connected device and are derived from
//! a [`DeviceRatings`] value during client construction. The catalog is
//! immutable once built.

use strum::EnumCount;

use crate::error::{Error, Result};
use crate::register::{ParamName, RegisterKey, SettingName, GROUP_STRIDE};
use crate::scaling::round_to;

/// The settable voltage is bounded by the input rail minus converter headroom.
const INPUT_HEADROOM: f64 = 1.1;
/// Over-voltage protection may sit slightly above the rated voltage.
const OVP_MARGIN: f64 = 1.02;
/// Over-current and over-power protection margin above the rated values.
const OCP_MARGIN: f64 = 1.0133;

/// Metadata for one holding register.
///
/// `range` is `None` for read-only registers; for every writable register it
/// is populated when the catalog is built. `decimals` is the display
/// precision applied on decode, carried per register because the device
/// rounds measured quantities but not set-points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamInfo {
    pub readable: bool,
    pub writable: bool,
    pub unit: &'static str,
    pub description: &'static str,
    pub range: Option<(f64, f64)>,
    pub integer: bool,
    pub decimals: Option<u32>,
}

fn scaled(
    writable: bool,
    unit: &'static str,
    description: &'static str,
    range: Option<(f64, f64)>,
    decimals: Option<u32>,
) -> ParamInfo {
    ParamInfo {
        readable: true,
        writable,
        unit,
        description,
        range,
        integer: false,
        decimals,
    }
}

fn integer(
    writable: bool,
    description: &'static str,
    range: Option<(f64, f64)>,
) -> ParamInfo {
    ParamInfo {
        readable: true,
        writable,
        unit: "",
        description,
        range,
        integer: true,
        decimals: None,
    }
}

/// Operating limits of the connected device, read once during discovery.
///
/// The model register encodes the rated voltage and current as a two-part
/// decimal: a DPS5015 (50 V / 15 A class) reports `5015`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceRatings {
    /// Rated output voltage class in volts.
    pub voltage_rating: u16,
    /// Rated output current class in amps.
    pub current_rating: u16,
    /// Measured input voltage in volts.
    pub input_voltage: f64,
}

impl DeviceRatings {
    /// Derive the ratings from the raw model register and the measured input
    /// voltage.
    pub fn from_registers(model_raw: u16, input_voltage: f64) -> Self {
        Self {
            voltage_rating: model_raw / 100,
            current_rating: model_raw % 100,
            input_voltage,
        }
    }

    /// Highest settable output voltage given the present input rail.
    pub fn max_set_voltage(&self) -> f64 {
        round_to(self.input_voltage / INPUT_HEADROOM, 2)
    }

    /// Highest settable current limit.
    pub fn max_set_current(&self) -> f64 {
        self.current_rating as f64
    }

    /// Highest accepted over-voltage protection level.
    pub fn over_voltage_limit(&self) -> f64 {
        round_to(self.voltage_rating as f64 * OVP_MARGIN, 2)
    }

    /// Highest accepted over-current protection level.
    pub fn over_current_limit(&self) -> f64 {
        round_to(self.current_rating as f64 * OCP_MARGIN, 2)
    }

    /// Highest accepted over-power protection level.
    pub fn over_power_limit(&self) -> f64 {
        let rated_power = self.voltage_rating as f64 * self.current_rating as f64;
        round_to(rated_power * OCP_MARGIN, 2)
    }
}

/// The complete register table: 13 global parameters plus the 8 stored
/// settings shared by all ten memory groups.
///
/// Built in one step from [`DeviceRatings`]; the same ratings always produce
/// an identical catalog.
#[derive(Debug)]
pub struct Catalog {
    params: [ParamInfo; ParamName::COUNT],
    settings: [ParamInfo; SettingName::COUNT],
}

impl Catalog {
    pub fn new(ratings: &DeviceRatings) -> Self {
        let v_set = Some((0.0, ratings.max_set_voltage()));
        let i_set = Some((0.0, ratings.max_set_current()));
        let on_off = Some((0.0, 1.0));
        let backlight = Some((0.0, 5.0));

        // Ordered by register address.
        let params = [
            scaled(true, "V", "Set voltage", v_set, None),
            scaled(true, "A", "Set current", i_set, None),
            scaled(false, "V", "Output voltage", None, Some(2)),
            scaled(false, "A", "Output current", None, Some(2)),
            scaled(false, "W", "Output power", None, Some(2)),
            scaled(false, "V", "Input voltage", None, None),
            integer(true, "Key lock", on_off),
            integer(false, "Protection status", None),
            integer(false, "CV/CC mode", None),
            integer(true, "Output on/off", on_off),
            integer(true, "Backlight level", backlight),
            scaled(false, "", "Model number", None, Some(2)),
            integer(false, "Firmware version", None),
        ];

        // Ordered by offset within a memory group.
        let settings = [
            scaled(true, "V", "Preset voltage", v_set, None),
            scaled(true, "A", "Preset current", i_set, None),
            scaled(
                true,
                "V",
                "Over-voltage protection",
                Some((0.0, ratings.over_voltage_limit())),
                None,
            ),
            scaled(
                true,
                "A",
                "Over-current protection",
                Some((0.0, ratings.over_current_limit())),
                None,
            ),
            scaled(
                true,
                "W",
                "Over-power protection",
                Some((0.0, ratings.over_power_limit())),
                None,
            ),
            integer(true, "Preset backlight level", backlight),
            integer(true, "Startup memory preset", Some((0.0, 9.0))),
            integer(true, "Power-on output state", on_off),
        ];

        Self { params, settings }
    }

    /// Metadata for a global parameter.
    pub fn param(&self, name: ParamName) -> &ParamInfo {
        &self.params[u16::from(name) as usize]
    }

    /// Metadata for a stored setting (identical across memory groups).
    pub fn setting(&self, name: SettingName) -> &ParamInfo {
        &self.settings[u16::from(name) as usize]
    }

    /// Normalize a register key to its address and metadata.
    ///
    /// Symbolic keys carry their own metadata: a setting key yields the
    /// setting record even in group 0, where the addresses coincide with the
    /// parameter block. Raw addresses fall back to [`Catalog::info`].
    pub fn lookup(&self, key: impl Into<RegisterKey>) -> Result<(u16, &ParamInfo)> {
        match key.into() {
            RegisterKey::Param(name) => Ok((name.into(), self.param(name))),
            RegisterKey::Setting(group, name) => {
                Ok((name.address_in_group(group), self.setting(name)))
            }
            RegisterKey::Address(address) => Ok((address, self.info(address)?)),
        }
    }

    /// Normalize a register key to its address, rejecting addresses outside
    /// the known map.
    pub fn resolve(&self, key: impl Into<RegisterKey>) -> Result<u16> {
        self.lookup(key).map(|(address, _)| address)
    }

    /// Metadata for a raw register address.
    ///
    /// The parameter block shadows the group-0 settings where the two
    /// overlap; group 0 holds the live values either way.
    pub fn info(&self, address: u16) -> Result<&ParamInfo> {
        if let Ok(name) = ParamName::try_from(address) {
            return Ok(self.param(name));
        }
        let group = address / GROUP_STRIDE;
        let offset = address % GROUP_STRIDE;
        if group <= 9 {
            if let Ok(name) = SettingName::try_from(offset) {
                return Ok(self.setting(name));
            }
        }
        Err(Error::UnknownRegister(address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::MemoryGroup;
    use strum::IntoEnumIterator;

    fn reference_ratings() -> DeviceRatings {
        // DPS5015 fed from a 48 V rail.
        DeviceRatings::from_registers(5015, 48.0)
    }

    #[test]
    fn ratings_parse_model_register() {
        let ratings = reference_ratings();
        assert_eq!(ratings.voltage_rating, 50);
        assert_eq!(ratings.current_rating, 15);
    }

    #[test]
    fn ratings_derive_bounds() {
        let ratings = reference_ratings();
        assert_eq!(ratings.max_set_voltage(), 43.64);
        assert_eq!(ratings.max_set_current(), 15.0);
        assert_eq!(ratings.over_voltage_limit(), 51.0);
        assert_eq!(ratings.over_current_limit(), 15.2);
        let opp = ratings.over_power_limit();
        assert!(opp > 759.9 && opp < 760.0);
    }

    #[test]
    fn every_writable_register_has_a_range() {
        let catalog = Catalog::new(&reference_ratings());
        for name in ParamName::iter() {
            let info = catalog.param(name);
            assert_eq!(info.writable, info.range.is_some(), "{:?}", name);
        }
        for name in SettingName::iter() {
            assert!(catalog.setting(name).range.is_some(), "{:?}", name);
        }
    }

    #[test]
    fn resolve_accepts_names_and_addresses() {
        let catalog = Catalog::new(&reference_ratings());
        assert_eq!(catalog.resolve(ParamName::Model).unwrap(), 0x0B);
        assert_eq!(catalog.resolve(0x0Bu16).unwrap(), 0x0B);
        assert_eq!(
            catalog
                .resolve((MemoryGroup::Group3, SettingName::OverVoltage))
                .unwrap(),
            0x32
        );
    }

    #[test]
    fn resolve_rejects_unknown_addresses() {
        let catalog = Catalog::new(&reference_ratings());
        // Past the last memory group.
        assert!(matches!(
            catalog.resolve(0xFFu16),
            Err(Error::UnknownRegister(0xFF))
        ));
        // Gap between the parameter block and the unused tail of group 0.
        assert!(matches!(
            catalog.resolve(0x0Du16),
            Err(Error::UnknownRegister(0x0D))
        ));
        // Unused tail of a memory group.
        assert!(matches!(
            catalog.resolve(0x38u16),
            Err(Error::UnknownRegister(0x38))
        ));
    }

    #[test]
    fn parameter_block_shadows_group_zero() {
        let catalog = Catalog::new(&reference_ratings());
        // Raw address 0x02 is the output-voltage parameter, not the group-0
        // over-voltage setting.
        let info = catalog.info(0x02).unwrap();
        assert!(!info.writable);
        assert_eq!(info.description, "Output voltage");
    }

    #[test]
    fn symbolic_setting_keys_keep_their_meaning_in_group_zero() {
        let catalog = Catalog::new(&reference_ratings());
        let (address, info) = catalog
            .lookup((MemoryGroup::Group0, SettingName::OverVoltage))
            .unwrap();
        assert_eq!(address, 0x02);
        assert!(info.writable);
        assert_eq!(info.description, "Over-voltage protection");
    }

    #[test]
    fn identical_ratings_build_identical_catalogs() {
        let a = Catalog::new(&reference_ratings());
        let b = Catalog::new(&reference_ratings());
        for name in ParamName::iter() {
            assert_eq!(a.param(name), b.param(name));
        }
        for name in SettingName::iter() {
            assert_eq!(a.setting(name), b.setting(name));
        }
    }
}
