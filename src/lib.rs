//! This crate provides an interface for communicating with and controlling
//! the RuiDeng/RD DPS series of programmable DC power supplies.
//!
//! The supplies expose their front-panel state as Modbus RTU holding
//! registers. Rather than asking callers to remember register addresses, the
//! crate maps a closed set of symbolic parameter and setting names to typed,
//! unit-aware values, and validates every write against the operating limits
//! the device reports at connect time.
//!
//! PSU models this should work with:
//! * DPS3005
//! * DPS5005
//! * DPS3012
//! * DPS5015
//! * DPS5020
//!
//! The serial port used for PSU comms should be configured like so:
//! * Baud rate: 9600
//! * Data bits: 8
//! * Stop bits: 1
//! * Parity: None
//! * Response timeout: 500 ms
//!
//! Any interface implementing [`embedded_io::Read`] and
//! [`embedded_io::Write`] can carry the RTU transport; see
//! [`transport::RtuTransport`]. Other transports (or test fakes) plug in
//! through [`transport::ModbusTransport`].

pub mod catalog;
pub mod error;
pub mod psu;
pub mod register;
pub mod scaling;
pub mod transport;
mod validate;

#[cfg(test)]
mod mock_serial;
#[cfg(test)]
mod mock_transport;
