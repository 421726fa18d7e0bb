//! Our error types for the DPS power supplies.

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Custom error type for DPS power supply communications.
#[derive(Error, Debug)]
pub enum Error {
    /// The address is not part of the parameter block or any memory group.
    #[error("unknown register address {0:#06x}")]
    UnknownRegister(u16),
    /// Write attempted on a read-only register.
    #[error("{0} is read-only")]
    NotWritable(&'static str),
    /// Non-integral value written to an integer register.
    #[error("{0} takes integer values, got {1}")]
    TypeMismatch(&'static str, f64),
    /// Value outside the operating range derived at connect time.
    #[error("value {value} outside permitted range [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },
    /// The scaled value does not fit a 16-bit holding register.
    #[error("value {0} does not fit a 16-bit register")]
    EncodingOverflow(f64),
    /// Reading the model or input-voltage register failed during discovery.
    /// No client is produced in this case.
    #[error("device discovery failed: {0}")]
    Init(Box<Error>),
    #[error("serial communication error: {0:?}")]
    Serial(embedded_io::ErrorKind),
    #[error("modbus protocol error: {0}")]
    Modbus(rmodbus::ErrorKind),
    #[error("invalid response received")]
    InvalidResponse,
    #[error("response buffer overflow")]
    BufferOverflow,
}

impl From<rmodbus::ErrorKind> for Error {
    fn from(err: rmodbus::ErrorKind) -> Self {
        Error::Modbus(err)
    }
}
