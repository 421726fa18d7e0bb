//! Byte-level serial fake used by the RTU transport unit tests.

/// Records written frames and replays a pre-loaded response.
pub struct MockSerial {
    write_buffer: Vec<u8>,
    read_buffer: Vec<u8>,
    read_position: usize,
    fail_reads: bool,
}

#[derive(Debug)]
pub enum MockSerialError {
    /// Simulated hardware fault.
    Simulated,
    /// No data left to read.
    WouldBlock,
}

impl core::fmt::Display for MockSerialError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MockSerialError::Simulated => write!(f, "simulated hardware fault"),
            MockSerialError::WouldBlock => write!(f, "no data available to read"),
        }
    }
}

impl core::error::Error for MockSerialError {}

impl embedded_io::Error for MockSerialError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            MockSerialError::Simulated => embedded_io::ErrorKind::Other,
            MockSerialError::WouldBlock => embedded_io::ErrorKind::TimedOut,
        }
    }
}

impl embedded_io::ErrorType for MockSerial {
    type Error = MockSerialError;
}

impl embedded_io::Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.write_buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl embedded_io::Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.fail_reads {
            return Err(MockSerialError::Simulated);
        }
        if self.read_position >= self.read_buffer.len() {
            return Err(MockSerialError::WouldBlock);
        }
        let available = &self.read_buffer[self.read_position..];
        let n = buf.len().min(available.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.read_position += n;
        Ok(n)
    }
}

impl MockSerial {
    pub fn new() -> Self {
        Self {
            write_buffer: Vec::new(),
            read_buffer: Vec::new(),
            read_position: 0,
            fail_reads: false,
        }
    }

    /// Load the bytes the next reads will return.
    pub fn set_read_data(&mut self, data: &[u8]) {
        self.read_buffer = data.to_vec();
        self.read_position = 0;
    }

    /// Everything written to the port so far.
    pub fn written_data(&self) -> &[u8] {
        &self.write_buffer
    }

    /// Make every subsequent read fail.
    pub fn fail_reads(&mut self) {
        self.fail_reads = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::{Read, Write};

    #[test]
    fn replays_loaded_data_across_reads() {
        let mut mock = MockSerial::new();
        mock.set_read_data(b"Hello World");

        let mut first = [0u8; 5];
        let mut second = [0u8; 6];
        assert_eq!(mock.read(&mut first).unwrap(), 5);
        assert_eq!(mock.read(&mut second).unwrap(), 6);
        assert_eq!(&first, b"Hello");
        assert_eq!(&second, b" World");

        // Exhausted.
        assert!(matches!(
            mock.read(&mut first),
            Err(MockSerialError::WouldBlock)
        ));
    }

    #[test]
    fn records_written_frames() {
        let mut mock = MockSerial::new();
        mock.write(b"Hello, ").unwrap();
        mock.write(b"World!").unwrap();
        assert_eq!(mock.written_data(), b"Hello, World!");
    }

    #[test]
    fn simulated_read_failure() {
        let mut mock = MockSerial::new();
        mock.set_read_data(b"data");
        mock.fail_reads();

        let mut buf = [0u8; 4];
        assert!(matches!(
            mock.read(&mut buf),
            Err(MockSerialError::Simulated)
        ));
    }
}
