use std::io::{Read, Write};
use std::time::Duration;

use serialport::SerialPort;
use tracing::debug;

use crate::core::{Error, Result};
use super::Transport;

/// Read timeout applied to the port; reads only ask for bytes already waiting
const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Sniffer link over a serial port
pub struct SerialTransport {
    /// Open serial port
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Opens a serial device
    pub fn open(device_path: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(device_path, baud_rate)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|e| Error::transport(format!("Failed to open {}: {}", device_path, e)))?;

        debug!(device = device_path, baud_rate, "opened serial port");
        Ok(SerialTransport { port })
    }

    /// Wraps an already opened port
    pub fn from_port(port: Box<dyn SerialPort>) -> Self {
        SerialTransport { port }
    }

    /// Discards anything buffered by the driver in either direction
    pub fn clear(&mut self) -> Result<()> {
        self.port.clear(serialport::ClearBuffer::All)?;
        Ok(())
    }
}

impl Transport for SerialTransport {
    fn bytes_available(&mut self) -> Result<usize> {
        Ok(self.port.bytes_to_read()? as usize)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        Read::read_exact(&mut self.port, buf)?;
        Ok(())
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        Write::write_all(&mut self.port, data)?;
        Write::flush(&mut self.port)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_device() {
        let result = SerialTransport::open("/dev/does-not-exist-sniffer", 3_000_000);
        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[test]
    #[ignore] // Requires sniffer hardware
    fn test_open_device() {
        let mut transport = SerialTransport::open("/dev/ttyACM0", 3_000_000).unwrap();
        transport.clear().unwrap();
        assert_eq!(transport.bytes_available().unwrap(), 0);
    }
}
