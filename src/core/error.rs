use std::io;
use thiserror::Error;

use super::types::StatusCode;

/// Errors produced while talking to a sniffer device
#[derive(Error, Debug)]
pub enum Error {
    #[error("Transport error: {0}")]
    Transport(#[from] io::Error),

    #[error("Timed out waiting for a response")]
    Timeout,

    #[error("FCS error: expected 0x{expected:02x}, got 0x{actual:02x}")]
    ChecksumMismatch {
        /// Checksum computed over the received frame
        expected: u8,
        /// Checksum byte carried by the frame
        actual: u8,
    },

    #[error("Invalid EOF marker: 0x{0:04x}")]
    MalformedTrailer(u16),

    #[error("Payload too large: {0} bytes")]
    PayloadTooLarge(usize),

    #[error("Unexpected response payload: {0:02x?}")]
    UnexpectedPayloadShape(Vec<u8>),

    #[error("Device rejected command: {0}")]
    DeviceRejected(StatusCode),

    #[error("Unknown status code: 0x{0:02x}")]
    UnknownStatus(u8),

    #[error("Malformed identity payload: {0} bytes")]
    MalformedIdentity(usize),

    #[error("No sniffer device answered the ping")]
    DeviceNotFound,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Error::Transport(io::Error::new(io::ErrorKind::Other, msg.into()))
    }

    /// Creates a new invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Creates a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Returns true if the error means the link itself is unusable
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::DeviceNotFound)
    }
}

impl From<serialport::Error> for Error {
    fn from(err: serialport::Error) -> Self {
        Error::Transport(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::config("missing port");
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(err.to_string(), "Configuration error: missing port");
    }

    #[test]
    fn test_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::Other, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Transport(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_protocol_error_messages() {
        let err = Error::ChecksumMismatch { expected: 0x42, actual: 0x43 };
        assert_eq!(err.to_string(), "FCS error: expected 0x42, got 0x43");

        let err = Error::DeviceRejected(StatusCode::InvalidState);
        assert_eq!(err.to_string(), "Device rejected command: Invalid State");
        assert!(!err.is_fatal());

        let err = Error::MalformedTrailer(0x4541);
        assert_eq!(err.to_string(), "Invalid EOF marker: 0x4541");
    }
}
