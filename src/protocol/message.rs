use std::fmt;
use std::str::FromStr;

use bytes::Bytes;

use crate::core::{Error, Result};
use super::{opcode, RESPONSE};

/// One decoded protocol frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command or response opcode
    pub kind: u8,
    /// Raw payload bytes
    pub payload: Bytes,
    /// Checksum byte, absent for the checksum-less class
    pub checksum: Option<u8>,
}

impl Frame {
    /// Creates a frame, computing its checksum when the kind requires one
    pub fn new(kind: u8, payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();
        let checksum = if super::is_checksum_less(kind) {
            None
        } else {
            Some(super::codec::frame_checksum(kind, &payload))
        };
        Frame { kind, payload, checksum }
    }

    /// Returns true for the generic response frame
    pub fn is_response(&self) -> bool {
        self.kind == RESPONSE
    }
}

/// Commands understood by the sniffer firmware
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Presence check, answered with the device identity
    Ping,
    /// Start capturing
    Start,
    /// Stop capturing
    Stop,
    /// Pause an ongoing capture
    Pause,
    /// Resume a paused capture
    Resume,
    /// Set the center frequency
    ConfigureFrequency {
        /// Integer megahertz
        mhz: u16,
        /// Fractional megahertz scaled by 65536
        fraction: u16,
    },
    /// Select a radio PHY by index
    ConfigurePhy(u8),
    /// Load a channel hopping table
    ConfigureChannelTable(ChannelTable),
    /// Follow connections from one BLE initiator
    ConfigureInitiatorAddress(BleAddress),
}

impl Command {
    /// Builds a frequency command from a value in megahertz
    ///
    /// The fractional part is rounded to the nearest 1/65536 MHz.
    pub fn frequency_mhz(freq: f64) -> Result<Self> {
        if !freq.is_finite() || freq < 0.0 || freq >= 65536.0 {
            return Err(Error::invalid_argument(format!("frequency {} MHz out of range", freq)));
        }

        let mut mhz = freq.trunc() as u32;
        let mut fraction = ((freq - freq.trunc()) * 65536.0).round() as u32;
        if fraction >= 65536 {
            mhz += 1;
            fraction = 0;
        }
        let mhz = u16::try_from(mhz)
            .map_err(|_| Error::invalid_argument(format!("frequency {} MHz out of range", freq)))?;

        Ok(Command::ConfigureFrequency { mhz, fraction: fraction as u16 })
    }

    /// Returns the opcode used as the frame kind
    pub fn opcode(&self) -> u8 {
        match self {
            Command::Ping => opcode::PING,
            Command::Start => opcode::START,
            Command::Stop => opcode::STOP,
            Command::Pause => opcode::PAUSE,
            Command::Resume => opcode::RESUME,
            Command::ConfigureFrequency { .. } => opcode::CFG_FREQUENCY,
            Command::ConfigurePhy(_) => opcode::CFG_PHY,
            Command::ConfigureChannelTable(_) => opcode::CFG_CHANNEL_TABLE,
            Command::ConfigureInitiatorAddress(_) => opcode::CFG_INITIATOR_ADDRESS,
        }
    }

    /// Returns the command payload as sent on the wire
    pub fn payload(&self) -> Vec<u8> {
        match self {
            Command::Ping | Command::Start | Command::Stop | Command::Pause | Command::Resume => {
                Vec::new()
            }
            Command::ConfigureFrequency { mhz, fraction } => {
                let mut payload = Vec::with_capacity(4);
                payload.extend_from_slice(&mhz.to_le_bytes());
                payload.extend_from_slice(&fraction.to_le_bytes());
                payload
            }
            Command::ConfigurePhy(index) => vec![*index],
            Command::ConfigureChannelTable(table) => table.to_payload(),
            Command::ConfigureInitiatorAddress(address) => address.to_payload().to_vec(),
        }
    }

    /// Converts the command into a frame
    pub fn to_frame(&self) -> Frame {
        Frame::new(self.opcode(), self.payload())
    }
}

/// Ordered list of channel indices the sniffer hops through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelTable(Vec<u8>);

impl ChannelTable {
    /// Maximum number of entries, bounded by the one-byte count field
    pub const MAX_CHANNELS: usize = u8::MAX as usize;

    /// Creates a table from channel indices
    pub fn new(channels: impl Into<Vec<u8>>) -> Result<Self> {
        let channels = channels.into();
        if channels.is_empty() {
            return Err(Error::invalid_argument("channel table is empty"));
        }
        if channels.len() > Self::MAX_CHANNELS {
            return Err(Error::invalid_argument(format!(
                "channel table has {} entries, maximum is {}",
                channels.len(),
                Self::MAX_CHANNELS
            )));
        }
        Ok(ChannelTable(channels))
    }

    /// Returns the channel indices
    pub fn channels(&self) -> &[u8] {
        &self.0
    }

    fn to_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(1 + self.0.len());
        payload.push(self.0.len() as u8);
        payload.extend_from_slice(&self.0);
        payload
    }
}

/// 48-bit BLE device address, stored most significant byte first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BleAddress(pub [u8; 6]);

impl BleAddress {
    /// Returns the address in over-the-air order, least significant byte first
    pub fn to_payload(&self) -> [u8; 6] {
        let mut bytes = self.0;
        bytes.reverse();
        bytes
    }
}

impl FromStr for BleAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut bytes = [0u8; 6];
        let mut parts = s.split(':');
        for byte in bytes.iter_mut() {
            let part = parts
                .next()
                .ok_or_else(|| Error::invalid_argument(format!("BLE address too short: {}", s)))?;
            if part.len() != 2 {
                return Err(Error::invalid_argument(format!("invalid BLE address: {}", s)));
            }
            *byte = u8::from_str_radix(part, 16)
                .map_err(|_| Error::invalid_argument(format!("invalid BLE address: {}", s)))?;
        }
        if parts.next().is_some() {
            return Err(Error::invalid_argument(format!("BLE address too long: {}", s)));
        }
        Ok(BleAddress(bytes))
    }
}

impl fmt::Display for BleAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}", a, b, c, d, e, g)
    }
}
