//! sniffer_link: command/response driver for serial-attached radio packet sniffers
//!
//! This library frames and checks every message exchanged with the sniffer
//! firmware, correlates commands with the device's generic response, and
//! exposes the firmware's configuration and capture commands as typed calls.
//!
//! ```no_run
//! use sniffer_link::{Sniffer, SnifferConfig};
//!
//! let mut sniffer = Sniffer::open(&SnifferConfig::new("/dev/ttyACM0"))?;
//! sniffer.set_frequency_mhz(902.2)?;
//! sniffer.set_phy(0)?;
//! sniffer.start_capture()?;
//! # Ok::<(), sniffer_link::Error>(())
//! ```

pub mod core;
pub mod device;
pub mod protocol;
pub mod session;
pub mod transport;
pub mod util;

// Re-export commonly used items
pub use crate::core::{DeviceIdentity, Error, Result, SessionConfig, SnifferConfig, StatusCode};
pub use crate::device::Sniffer;
pub use crate::protocol::{BleAddress, ChannelTable, Command, Frame};
pub use crate::session::Session;
pub use crate::transport::{MemoryTransport, SerialTransport, Transport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
