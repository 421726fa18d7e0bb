//! Register-level fake power supply used by the client unit tests.

use crate::error::{Error, Result};
use crate::register::GROUP_STRIDE;
use crate::transport::ModbusTransport;

/// In-memory DPS device: 13 parameter registers plus ten memory groups of 8
/// stored settings each. Register values are raw u16 words, exactly as they
/// would travel over the wire.
pub struct MockDps {
    params: [u16; 13],
    settings: [[u16; 8]; 10],
    fail_reads: bool,
}

impl MockDps {
    /// A device of the given voltage/current class fed by `v_in` volts.
    ///
    /// `MockDps::new(50, 15, 48)` models a DPS5015 on a 48 V rail.
    pub fn new(v_max: u16, i_max: u16, v_in: u16) -> Self {
        let model = v_max * 100 + i_max;
        let params = [
            500,        // set voltage, 5.00 V
            100,        // set current, 1.00 A
            0,          // output voltage
            0,          // output current
            0,          // output power
            v_in * 100, // input voltage
            0,          // key lock
            0,          // protection status
            0,          // CV/CC
            0,          // output off
            4,          // backlight
            model,
            127, // firmware version
        ];
        let group = [500, 100, 5100, 1520, 9999, 4, 0, 0];
        Self {
            params,
            settings: [group; 10],
            fail_reads: false,
        }
    }

    /// Make every register read fail, to exercise the discovery error path.
    pub fn failing() -> Self {
        let mut mock = Self::new(50, 15, 48);
        mock.fail_reads = true;
        mock
    }

    /// Overwrite a register directly, bypassing access checks.
    pub fn set_raw(&mut self, address: u16, value: u16) {
        *self.slot_mut(address).unwrap() = value;
    }

    fn slot_mut(&mut self, address: u16) -> Result<&mut u16> {
        if (address as usize) < self.params.len() {
            return Ok(&mut self.params[address as usize]);
        }
        let group = (address / GROUP_STRIDE) as usize;
        let offset = (address % GROUP_STRIDE) as usize;
        if group < self.settings.len() && offset < self.settings[group].len() {
            return Ok(&mut self.settings[group][offset]);
        }
        Err(Error::UnknownRegister(address))
    }
}

impl ModbusTransport for MockDps {
    fn read_holding_registers(&mut self, address: u16, count: u16) -> Result<Vec<u16>> {
        if self.fail_reads {
            return Err(Error::Serial(embedded_io::ErrorKind::TimedOut));
        }
        (address..address + count)
            .map(|a| self.slot_mut(a).map(|slot| *slot))
            .collect()
    }

    fn write_holding_register(&mut self, address: u16, value: u16) -> Result<()> {
        *self.slot_mut(address)? = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn models_a_device_class() {
        let mut mock = MockDps::new(50, 15, 48);
        assert_eq!(mock.read_holding_registers(0x0B, 1).unwrap(), vec![5015]);
        assert_eq!(mock.read_holding_registers(0x05, 1).unwrap(), vec![4800]);
    }

    #[test]
    fn block_reads_cross_registers() {
        let mut mock = MockDps::new(50, 15, 48);
        let block = mock.read_holding_registers(0x00, 13).unwrap();
        assert_eq!(block.len(), 13);
        assert_eq!(block[0], 500);
        assert_eq!(block[12], 127);
    }

    #[test]
    fn writes_stick() {
        let mut mock = MockDps::new(50, 15, 48);
        mock.write_holding_register(0x00, 1234).unwrap();
        assert_eq!(mock.read_holding_registers(0x00, 1).unwrap(), vec![1234]);

        // Memory group 3, over-voltage setting.
        mock.write_holding_register(0x32, 5000).unwrap();
        assert_eq!(mock.read_holding_registers(0x32, 1).unwrap(), vec![5000]);
    }

    #[test]
    fn unknown_address_is_rejected() {
        let mut mock = MockDps::new(50, 15, 48);
        assert!(matches!(
            mock.read_holding_registers(0xFF, 1),
            Err(Error::UnknownRegister(0xFF))
        ));
        assert!(matches!(
            mock.write_holding_register(0x0D, 0),
            Err(Error::UnknownRegister(0x0D))
        ));
    }
}
