use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

use crate::core::{Error, Result};
use super::message::{Command, Frame};
use super::{is_checksum_less, EOF, HEADER_SIZE, MAX_PAYLOAD_SIZE, SOF};

/// 8-bit wraparound sum of the given bytes
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, b| sum.wrapping_add(*b))
}

/// Checksum of a frame: kind, both length bytes and the payload
pub(crate) fn frame_checksum(kind: u8, payload: &[u8]) -> u8 {
    let [len_lo, len_hi] = (payload.len() as u16).to_le_bytes();
    checksum(&[kind, len_lo, len_hi]).wrapping_add(checksum(payload))
}

/// Encodes a kind and payload into a complete wire frame
pub fn encode_frame(kind: u8, payload: &[u8]) -> Result<Vec<u8>> {
    let mut dst = BytesMut::new();
    encode_into(kind, payload, &mut dst)?;
    Ok(dst.to_vec())
}

fn encode_into(kind: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(Error::PayloadTooLarge(payload.len()));
    }

    let has_checksum = !is_checksum_less(kind);
    dst.reserve(HEADER_SIZE + payload.len() + has_checksum as usize + EOF.len());

    dst.put_slice(&SOF);
    dst.put_u8(kind);
    dst.put_u16_le(payload.len() as u16);
    dst.put_slice(payload);
    if has_checksum {
        dst.put_u8(frame_checksum(kind, payload));
    }
    dst.put_slice(&EOF);

    Ok(())
}

/// Stream codec for sniffer frames
///
/// Decoding resynchronizes on the start-of-frame marker: bytes preceding it
/// are dropped. When a frame fails validation only its start marker is
/// dropped, so the next call rescans the bytes it claimed.
#[derive(Clone, Debug, Default)]
pub struct FrameCodec;

impl FrameCodec {
    /// Creates a new frame codec
    pub fn new() -> Self {
        FrameCodec
    }

    /// Drops bytes in front of the next start marker
    ///
    /// Returns false when no complete marker is buffered yet.
    fn sync(src: &mut BytesMut) -> bool {
        match src.windows(SOF.len()).position(|w| w == SOF) {
            Some(0) => true,
            Some(start) => {
                trace!(discarded = start, "skipping bytes before start of frame");
                src.advance(start);
                true
            }
            None => {
                // A trailing first marker byte may be completed by the next read
                let keep = usize::from(src.last() == Some(&SOF[0]));
                let discard = src.len() - keep;
                if discard > 0 {
                    trace!(discarded = discard, "no start of frame in buffer");
                    src.advance(discard);
                }
                false
            }
        }
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if !Self::sync(src) || src.len() < HEADER_SIZE {
            return Ok(None);
        }

        let kind = src[2];
        let length = u16::from_le_bytes([src[3], src[4]]) as usize;
        let has_checksum = !is_checksum_less(kind);
        let frame_len = HEADER_SIZE + length + has_checksum as usize + EOF.len();

        if src.len() < frame_len {
            // Need more data to read the full frame
            src.reserve(frame_len - src.len());
            return Ok(None);
        }

        let payload_end = HEADER_SIZE + length;
        let checksum = if has_checksum {
            let actual = src[payload_end];
            let expected = frame_checksum(kind, &src[HEADER_SIZE..payload_end]);
            if actual != expected {
                src.advance(SOF.len());
                return Err(Error::ChecksumMismatch { expected, actual });
            }
            Some(actual)
        } else {
            None
        };

        let trailer_start = frame_len - EOF.len();
        let trailer = u16::from_le_bytes([src[trailer_start], src[trailer_start + 1]]);
        if trailer != u16::from_le_bytes(EOF) {
            src.advance(SOF.len());
            return Err(Error::MalformedTrailer(trailer));
        }

        let mut raw = src.split_to(frame_len);
        raw.advance(HEADER_SIZE);
        let payload = raw.split_to(length).freeze();

        trace!(kind, length, "decoded frame");
        Ok(Some(Frame { kind, payload, checksum }))
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = Error;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<()> {
        encode_into(item.kind, &item.payload, dst)
    }
}

impl<'a> Encoder<&'a Command> for FrameCodec {
    type Error = Error;

    fn encode(&mut self, item: &'a Command, dst: &mut BytesMut) -> Result<()> {
        encode_into(item.opcode(), &item.payload(), dst)
    }
}
