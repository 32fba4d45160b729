use std::collections::VecDeque;
use std::fmt;
use std::io;

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::core::{DeviceIdentity, Result, StatusCode};
use crate::protocol::{encode_frame, opcode, FrameCodec, RESPONSE};
use super::Transport;

type Responder = Box<dyn FnMut(&[u8]) -> Vec<u8> + Send>;

/// In-memory link standing in for a device
///
/// Bytes pushed with [`MemoryTransport::push_rx`] become readable by the
/// session. An optional responder sees every write and returns the bytes the
/// "device" sends back.
pub struct MemoryTransport {
    /// Bytes waiting to be read
    rx: VecDeque<u8>,
    /// Everything written so far
    written: Vec<u8>,
    /// Scripted device behavior
    responder: Option<Responder>,
    /// Upper bound on bytes reported per availability query
    chunk_size: Option<usize>,
}

impl MemoryTransport {
    /// Creates a silent link
    pub fn new() -> Self {
        MemoryTransport {
            rx: VecDeque::new(),
            written: Vec::new(),
            responder: None,
            chunk_size: None,
        }
    }

    /// Creates a link whose device answers each write with `responder`'s output
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: FnMut(&[u8]) -> Vec<u8> + Send + 'static,
    {
        MemoryTransport {
            responder: Some(Box::new(responder)),
            ..Self::new()
        }
    }

    /// Creates a link to a well-behaved emulated sniffer
    ///
    /// Ping is answered with `identity`, every other command with an OK status.
    pub fn emulator(identity: DeviceIdentity) -> Self {
        let mut codec = FrameCodec::new();
        let mut pending = BytesMut::new();
        Self::with_responder(move |data| {
            pending.extend_from_slice(data);
            let mut reply = Vec::new();
            while let Ok(Some(frame)) = codec.decode(&mut pending) {
                let payload = if frame.kind == opcode::PING {
                    identity_payload(&identity)
                } else {
                    vec![StatusCode::Ok as u8]
                };
                if let Ok(bytes) = encode_frame(RESPONSE, &payload) {
                    reply.extend(bytes);
                }
            }
            reply
        })
    }

    /// Limits how many bytes each availability query reports
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size.max(1));
        self
    }

    /// Queues bytes as if sent by the device
    pub fn push_rx(&mut self, data: &[u8]) {
        self.rx.extend(data);
    }

    /// Number of device bytes not yet read
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Everything written to the device so far
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Returns and clears the written bytes
    pub fn take_written(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.written)
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryTransport")
            .field("pending", &self.rx.len())
            .field("written", &self.written.len())
            .field("responder", &self.responder.is_some())
            .finish()
    }
}

impl Transport for MemoryTransport {
    fn bytes_available(&mut self) -> Result<usize> {
        let available = self.rx.len();
        Ok(self.chunk_size.map_or(available, |chunk| available.min(chunk)))
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        if buf.len() > self.rx.len() {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "not enough bytes buffered").into());
        }
        let len = buf.len();
        for (dst, src) in buf.iter_mut().zip(self.rx.drain(..len)) {
            *dst = src;
        }
        Ok(())
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.written.extend_from_slice(data);
        if let Some(responder) = self.responder.as_mut() {
            let reply = responder(data);
            self.rx.extend(reply);
        }
        Ok(())
    }
}

/// Ping response payload: reserved byte, then the identity fields
fn identity_payload(identity: &DeviceIdentity) -> Vec<u8> {
    let mut payload = vec![0x00];
    payload.extend_from_slice(&identity.chip_id.to_le_bytes());
    payload.push(identity.chip_revision);
    payload.push(identity.firmware_id);
    payload.extend_from_slice(&identity.firmware_revision.to_le_bytes());
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Error;

    #[test]
    fn test_read_and_write() {
        let mut transport = MemoryTransport::new();
        transport.push_rx(&[1, 2, 3]);
        assert_eq!(transport.bytes_available().unwrap(), 3);

        let mut buf = [0u8; 2];
        transport.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [1, 2]);
        assert_eq!(transport.pending(), 1);

        let mut buf = [0u8; 2];
        assert!(matches!(transport.read_exact(&mut buf), Err(Error::Transport(_))));

        transport.write_all(&[9, 8]).unwrap();
        assert_eq!(transport.take_written(), vec![9, 8]);
        assert!(transport.written().is_empty());
    }

    #[test]
    fn test_chunked_availability() {
        let mut transport = MemoryTransport::new().with_chunk_size(2);
        transport.push_rx(&[1, 2, 3, 4, 5]);
        assert_eq!(transport.bytes_available().unwrap(), 2);
    }

    #[test]
    fn test_emulator_answers_ping() {
        let identity = DeviceIdentity {
            chip_id: 0x1234,
            chip_revision: 5,
            firmware_id: 7,
            firmware_revision: 2,
        };
        let mut transport = MemoryTransport::emulator(identity);

        transport.write_all(&encode_frame(opcode::PING, &[]).unwrap()).unwrap();
        let expected = encode_frame(RESPONSE, &[0x00, 0x34, 0x12, 0x05, 0x07, 0x02, 0x00]).unwrap();
        assert_eq!(transport.pending(), expected.len());

        let mut reply = vec![0u8; expected.len()];
        transport.read_exact(&mut reply).unwrap();
        assert_eq!(reply, expected);

        transport.write_all(&encode_frame(opcode::STOP, &[]).unwrap()).unwrap();
        let mut reply = vec![0u8; transport.pending()];
        transport.read_exact(&mut reply).unwrap();
        assert_eq!(reply, encode_frame(RESPONSE, &[0x00]).unwrap());
    }
}
