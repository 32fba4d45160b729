use std::fmt;
use std::time::Duration;

use serde::{Serialize, Deserialize};

use super::error::{Error, Result};

/// Status byte reported by the device in a generic response
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum StatusCode {
    /// Command accepted
    Ok = 0x00,
    /// Device-side timeout
    Timeout = 0x01,
    /// Device saw a bad frame check sequence
    FcsFailed = 0x02,
    /// Opcode not understood
    InvalidCommand = 0x03,
    /// Command not allowed in the current device state
    InvalidState = 0x04,
}

impl StatusCode {
    /// Returns the device-facing name of the status
    pub fn name(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Timeout => "Timeout",
            StatusCode::FcsFailed => "FCS failed",
            StatusCode::InvalidCommand => "Invalid Command",
            StatusCode::InvalidState => "Invalid State",
        }
    }

    /// Returns true for the success status
    pub fn is_ok(&self) -> bool {
        *self == StatusCode::Ok
    }
}

impl TryFrom<u8> for StatusCode {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self> {
        match byte {
            0x00 => Ok(StatusCode::Ok),
            0x01 => Ok(StatusCode::Timeout),
            0x02 => Ok(StatusCode::FcsFailed),
            0x03 => Ok(StatusCode::InvalidCommand),
            0x04 => Ok(StatusCode::InvalidState),
            other => Err(Error::UnknownStatus(other)),
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity reported by the device in its ping response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Radio chip identifier
    pub chip_id: u16,
    /// Radio chip revision
    pub chip_revision: u8,
    /// Sniffer firmware identifier
    pub firmware_id: u8,
    /// Sniffer firmware revision
    pub firmware_revision: u16,
}

impl DeviceIdentity {
    /// Minimum ping payload length: reserved byte plus identity fields
    pub const PAYLOAD_LEN: usize = 7;

    /// Parses the identity fields out of a ping response payload
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        if payload.len() < Self::PAYLOAD_LEN {
            return Err(Error::MalformedIdentity(payload.len()));
        }

        // Byte 0 is reserved
        Ok(DeviceIdentity {
            chip_id: u16::from_le_bytes([payload[1], payload[2]]),
            chip_revision: payload[3],
            firmware_id: payload[4],
            firmware_revision: u16::from_le_bytes([payload[5], payload[6]]),
        })
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ChipID = {:x}, Chip Rev = {:x}, FWID = {:x}, FWRev = {:x}",
            self.chip_id, self.chip_revision, self.firmware_id, self.firmware_revision,
        )
    }
}

/// Timing parameters for a protocol session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How long to wait for a generic response
    #[serde(serialize_with = "super::serde::serialize_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_duration")]
    pub response_timeout: Duration,
    /// Delay between polls while no frame is ready
    #[serde(serialize_with = "super::serde::serialize_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_duration")]
    pub poll_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            response_timeout: super::DEFAULT_RESPONSE_TIMEOUT,
            poll_interval: super::DEFAULT_POLL_INTERVAL,
        }
    }
}

impl SessionConfig {
    /// Checks that the timing parameters are usable
    pub fn validate(&self) -> Result<()> {
        if self.response_timeout.is_zero() {
            return Err(Error::config("response timeout must be non-zero"));
        }
        if self.poll_interval > self.response_timeout {
            return Err(Error::config("poll interval exceeds response timeout"));
        }
        Ok(())
    }
}

/// Configuration for a serial-attached sniffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnifferConfig {
    /// Serial device path, e.g. `/dev/ttyACM0` or `COM90`
    pub port: String,
    /// Serial baud rate
    pub baud_rate: u32,
    /// Session timing
    #[serde(default)]
    pub session: SessionConfig,
}

impl Default for SnifferConfig {
    fn default() -> Self {
        SnifferConfig {
            port: String::new(),
            baud_rate: super::DEFAULT_BAUD_RATE,
            session: SessionConfig::default(),
        }
    }
}

impl SnifferConfig {
    /// Creates a configuration for the given port with default settings
    pub fn new(port: impl Into<String>) -> Self {
        SnifferConfig {
            port: port.into(),
            ..Default::default()
        }
    }

    /// Checks the configuration before opening the device
    pub fn validate(&self) -> Result<()> {
        if self.port.is_empty() {
            return Err(Error::config("serial port not set"));
        }
        if self.baud_rate == 0 {
            return Err(Error::config("baud rate must be non-zero"));
        }
        self.session.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(StatusCode::try_from(0x00).unwrap(), StatusCode::Ok);
        assert_eq!(StatusCode::try_from(0x02).unwrap(), StatusCode::FcsFailed);
        assert_eq!(StatusCode::try_from(0x04).unwrap(), StatusCode::InvalidState);
        assert!(matches!(StatusCode::try_from(0x05), Err(Error::UnknownStatus(0x05))));
        assert!(matches!(StatusCode::try_from(0xff), Err(Error::UnknownStatus(0xff))));
    }

    #[test]
    fn test_status_code_ordering() {
        assert!(StatusCode::Ok < StatusCode::Timeout);
        assert!(StatusCode::InvalidCommand < StatusCode::InvalidState);
        assert_eq!(StatusCode::FcsFailed as u8, 2);
    }

    #[test]
    fn test_identity_from_payload() {
        let identity = DeviceIdentity::from_payload(&[0x00, 0x34, 0x12, 0x05, 0x07, 0x02, 0x00]).unwrap();
        assert_eq!(identity.chip_id, 0x1234);
        assert_eq!(identity.chip_revision, 5);
        assert_eq!(identity.firmware_id, 7);
        assert_eq!(identity.firmware_revision, 2);
        assert_eq!(
            identity.to_string(),
            "ChipID = 1234, Chip Rev = 5, FWID = 7, FWRev = 2"
        );
    }

    #[test]
    fn test_identity_too_short() {
        let err = DeviceIdentity::from_payload(&[0x00, 0x34, 0x12]).unwrap_err();
        assert!(matches!(err, Error::MalformedIdentity(3)));
    }

    #[test]
    fn test_config_defaults() {
        let config = SnifferConfig::new("/dev/ttyACM0");
        assert_eq!(config.baud_rate, 3_000_000);
        assert_eq!(config.session.response_timeout, Duration::from_secs(10));
        assert_eq!(config.session.poll_interval, Duration::from_millis(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(matches!(SnifferConfig::default().validate(), Err(Error::Config(_))));

        let mut config = SnifferConfig::new("COM90");
        config.session.response_timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = SnifferConfig::new("COM90");
        config.baud_rate = 0;
        assert!(config.validate().is_err());
    }
}
