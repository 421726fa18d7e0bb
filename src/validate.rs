//! The write gate applied before any register write.

use crate::catalog::ParamInfo;
use crate::error::{Error, Result};

/// Check a candidate write against the register's metadata.
///
/// Three checks run in a fixed order and the first failure aborts: access
/// (read-only registers reject everything), type (integer registers reject
/// fractional values), range (inclusive bounds, which must be known). On
/// success the integer-encoding flag is returned for the caller to pick the
/// codec path.
pub(crate) fn check_write(info: &ParamInfo, value: f64) -> Result<bool> {
    if !info.writable {
        return Err(Error::NotWritable(info.description));
    }
    if info.integer && value.fract() != 0.0 {
        return Err(Error::TypeMismatch(info.description, value));
    }
    match info.range {
        Some((min, max)) if (min..=max).contains(&value) => Ok(info.integer),
        Some((min, max)) => Err(Error::OutOfRange { value, min, max }),
        // A register with no known range accepts nothing.
        None => Err(Error::OutOfRange {
            value,
            min: 0.0,
            max: 0.0,
        }),
    }
}
