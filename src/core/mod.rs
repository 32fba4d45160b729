//! Core types shared by the codec, session and device layers
//!
//! This module contains the error type, status codes, device identity and
//! configuration used throughout the library.

pub mod error;
pub mod types;
pub mod serde;

use std::time::Duration;

pub use self::error::{Error, Result};
pub use self::types::{
    DeviceIdentity,
    SessionConfig,
    SnifferConfig,
    StatusCode,
};

/// Default serial baud rate of the sniffer firmware
pub const DEFAULT_BAUD_RATE: u32 = 3_000_000;

/// Default bound on waiting for a generic response
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default delay between polls when no frame is ready
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);
