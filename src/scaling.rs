//! Fixed-point conversion between raw register values and physical units.
//!
//! The DPS register map stores every continuous quantity as a u16 with two
//! implied decimal digits; flag and code registers hold plain integers. The
//! functions here are pure and hold no state, so they are safe to call from
//! anywhere.

use crate::catalog::ParamInfo;
use crate::error::{Error, Result};

/// Divisor of every fixed-point register (two implied decimals).
pub const FIXED_POINT_DIVISOR: f64 = 100.0;

/// Convert a raw register value to its physical value.
///
/// Integer registers pass through unchanged. Fixed-point registers are scaled
/// and, where the register declares a display precision, rounded to it.
/// Set-point registers carry no precision and come back unrounded, matching
/// the front panel.
pub fn decode(raw: u16, info: &ParamInfo) -> f64 {
    if info.integer {
        return raw as f64;
    }
    let value = raw as f64 / FIXED_POINT_DIVISOR;
    match info.decimals {
        Some(digits) => round_to(value, digits),
        None => value,
    }
}

/// Convert a physical value to the raw register value, rounding to the
/// nearest representable step.
///
/// Fails with [`Error::EncodingOverflow`] when the scaled value does not fit
/// a 16-bit unsigned register (negative values included).
pub fn encode(value: f64, info: &ParamInfo) -> Result<u16> {
    let scaled = if info.integer {
        value.round()
    } else {
        (value * FIXED_POINT_DIVISOR).round()
    };
    if !(0.0..=u16::MAX as f64).contains(&scaled) {
        return Err(Error::EncodingOverflow(value));
    }
    Ok(scaled as u16)
}

/// Round to the given number of decimal places.
pub fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}
