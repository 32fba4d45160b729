//! Protocol implementation module
//!
//! This module defines the sniffer wire frame, the command set and the
//! frame encoding/decoding.
//!
//! ```text
//! +-----------+------+-----------+-----------------+-----+-----------+
//! | 0x40 0x53 | kind | len (LE)  | payload[0..len] | fcs | 0x40 0x45 |
//! +-----------+------+-----------+-----------------+-----+-----------+
//! ```
//!
//! The `fcs` byte is omitted for kinds whose top two bits are both set.

pub mod codec;
pub mod message;

pub use self::codec::{checksum, encode_frame, FrameCodec};
pub use self::message::{BleAddress, ChannelTable, Command, Frame};

/// Start-of-frame marker
pub const SOF: [u8; 2] = [0x40, 0x53];

/// End-of-frame marker
pub const EOF: [u8; 2] = [0x40, 0x45];

/// Kind of the generic response frame
pub const RESPONSE: u8 = 0x80;

/// Mask selecting the frame class bits of a kind byte
pub const CLASS_MASK: u8 = 0xC0;

/// Largest payload a frame can carry
pub const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize;

/// Bytes before the payload: SOF, kind and length
pub const HEADER_SIZE: usize = 5;

/// Command opcodes
pub mod opcode {
    pub const PING: u8 = 0x40;
    pub const START: u8 = 0x41;
    pub const STOP: u8 = 0x42;
    pub const PAUSE: u8 = 0x43;
    pub const RESUME: u8 = 0x44;
    pub const CFG_FREQUENCY: u8 = 0x45;
    pub const CFG_PHY: u8 = 0x47;
    pub const CFG_CHANNEL_TABLE: u8 = 0x50;
    pub const CFG_INITIATOR_ADDRESS: u8 = 0x70;
}

/// Returns true if frames of this kind carry no checksum byte
///
/// Streamed capture data and error reports use this class.
pub fn is_checksum_less(kind: u8) -> bool {
    kind & CLASS_MASK == CLASS_MASK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_less_class() {
        assert!(is_checksum_less(0xC0));
        assert!(is_checksum_less(0xC1));
        assert!(is_checksum_less(0xFF));
        assert!(!is_checksum_less(RESPONSE));
        assert!(!is_checksum_less(opcode::STOP));
        assert!(!is_checksum_less(0x7F));
    }
}
