//! Register-level transport used by the client.
//!
//! [`ModbusTransport`] is the seam between the parameter layer and the wire:
//! the client only ever reads or writes 16-bit holding registers through it.
//! [`RtuTransport`] is the shipped implementation, speaking Modbus RTU over
//! any interface which implements [`embedded_io::Read`] and
//! [`embedded_io::Write`]. Tests inject a register-level fake instead.

use embedded_io::Error as _;
use log::trace;

use crate::error::{Error, Result};

/// Raw holding-register access to the power supply.
pub trait ModbusTransport {
    /// Read `count` consecutive holding registers starting at `address`.
    fn read_holding_registers(&mut self, address: u16, count: u16) -> Result<Vec<u16>>;

    /// Write a single holding register.
    fn write_holding_register(&mut self, address: u16, value: u16) -> Result<()>;
}

/// Modbus RTU transport over a serial interface.
///
/// `L` sizes the internal frame buffers; the default fits the largest frame
/// the DPS register map can produce.
pub struct RtuTransport<S: embedded_io::Read + embedded_io::Write, const L: usize = 128> {
    interface: S,
    /// Default for the DPS supplies is 0x01.
    unit_id: u8,
}

impl<S: embedded_io::Read + embedded_io::Write, const L: usize> RtuTransport<S, L> {
    /// Create a new RTU transport over the given interface and unit ID.
    pub fn new(interface: S, unit_id: u8) -> Self {
        Self { interface, unit_id }
    }

    /// Accumulate a response until `expected` bytes arrived, the line went
    /// quiet with partial data, or the interface failed.
    fn receive(&mut self, buff: &mut heapless::Vec<u8, L>, expected: usize) -> Result<()> {
        let mut chunk = [0u8; 8];
        loop {
            match self.interface.read(&mut chunk) {
                Ok(0) => {
                    // End of stream; let the parser judge what we have.
                    if buff.is_empty() {
                        return Err(Error::Serial(embedded_io::ErrorKind::TimedOut));
                    }
                    return Ok(());
                }
                Ok(bytes_read) => {
                    if buff.extend_from_slice(&chunk[0..bytes_read]).is_err() {
                        return Err(Error::BufferOverflow);
                    }
                    if buff.len() >= expected {
                        return Ok(());
                    }
                }
                Err(e) => {
                    // A timeout with partial data means the device is done
                    // talking; anything else is propagated.
                    if matches!(
                        e.kind(),
                        embedded_io::ErrorKind::Other | embedded_io::ErrorKind::TimedOut
                    ) && !buff.is_empty()
                    {
                        return Ok(());
                    }
                    return Err(Error::Serial(e.kind()));
                }
            }
        }
    }
}

impl<S: embedded_io::Read + embedded_io::Write, const L: usize> ModbusTransport
    for RtuTransport<S, L>
{
    fn read_holding_registers(&mut self, address: u16, count: u16) -> Result<Vec<u16>> {
        let mut buff: heapless::Vec<u8, L> = heapless::Vec::new();
        let mut req = rmodbus::client::ModbusRequest::new(self.unit_id, rmodbus::ModbusProto::Rtu);
        req.generate_get_holdings(address, count, &mut buff)?;

        self.interface
            .write_all(&buff)
            .map_err(|e| Error::Serial(e.kind()))?;

        // Reuse the same buffer when reading back.
        buff.clear();

        // unit id + function + byte count + payload + CRC.
        let expected = 5 + 2 * count as usize;
        self.receive(&mut buff, expected)?;

        let mut registers: heapless::Vec<u16, 64> = heapless::Vec::new();
        req.parse_u16(&buff, &mut registers)
            .map_err(|_| Error::InvalidResponse)?;

        if registers.len() < count as usize {
            return Err(Error::InvalidResponse);
        }
        trace!("read {:#06x} x{} -> {:?}", address, count, &registers[..]);
        Ok(registers.iter().copied().collect())
    }

    fn write_holding_register(&mut self, address: u16, value: u16) -> Result<()> {
        let mut request: heapless::Vec<u8, L> = heapless::Vec::new();
        let mut response: heapless::Vec<u8, L> = heapless::Vec::new();

        let mut req = rmodbus::client::ModbusRequest::new(self.unit_id, rmodbus::ModbusProto::Rtu);
        req.generate_set_holding(address, value, &mut request)?;

        self.interface
            .write_all(&request)
            .map_err(|e| Error::Serial(e.kind()))?;

        self.receive(&mut response, request.len())?;

        // The device echoes a successful single-register write.
        if request.as_slice() != response.as_slice() {
            return Err(Error::InvalidResponse);
        }
        trace!("write {:#06x} <- {}", address, value);
        Ok(())
    }
}
