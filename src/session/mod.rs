//! Protocol session
//!
//! A session owns one transport and correlates each command with the next
//! generic response read from it. Responses carry no request identifier, so
//! exactly one command may be outstanding at a time.

use std::time::{Duration, Instant};

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, info, trace, warn};

use crate::core::{DeviceIdentity, Error, Result, SessionConfig, StatusCode};
use crate::protocol::{Command, Frame, FrameCodec};
use crate::transport::Transport;
use crate::util::PollPolicy;

/// Initial capacity of the receive buffer
const RECV_BUFFER_SIZE: usize = 4096;

/// Command/response session over a transport
pub struct Session<T: Transport> {
    /// Link to the device
    transport: T,
    /// Frame codec
    codec: FrameCodec,
    /// Bytes read but not yet decoded
    buffer: BytesMut,
    /// Timing configuration
    config: SessionConfig,
}

impl<T: Transport> Session<T> {
    /// Wraps a transport without talking to the device
    pub fn new(transport: T, config: SessionConfig) -> Self {
        Session {
            transport,
            codec: FrameCodec::new(),
            buffer: BytesMut::with_capacity(RECV_BUFFER_SIZE),
            config,
        }
    }

    /// Opens a session and brings the device to a known idle state
    ///
    /// Pings the device, then stops any capture in progress. A device that
    /// never answers the ping is reported as [`Error::DeviceNotFound`].
    pub fn connect(transport: T, config: SessionConfig) -> Result<(Self, DeviceIdentity)> {
        config.validate()?;
        let mut session = Session::new(transport, config);

        let identity = match session.ping() {
            Err(Error::Timeout) => return Err(Error::DeviceNotFound),
            result => result?,
        };
        info!(%identity, "found sniffer");

        session.send_and_await_ack(&Command::Stop)?;
        Ok((session, identity))
    }

    /// Encodes and writes a command; no acknowledgement is awaited
    pub fn send(&mut self, command: &Command) -> Result<()> {
        let mut frame = BytesMut::new();
        self.codec.encode(command, &mut frame)?;
        debug!(?command, "sending command");
        trace!(bytes = ?&frame[..], "tx");
        self.transport.write_all(&frame)
    }

    /// Sends a command and checks the device's status reply
    pub fn send_and_await_ack(&mut self, command: &Command) -> Result<()> {
        self.send(command)?;
        let response = self.await_response(self.config.response_timeout)?;
        check_status(&response.payload).map_err(|e| {
            if let Error::DeviceRejected(status) = &e {
                warn!(?command, %status, "device rejected command");
            }
            e
        })
    }

    /// Checks that the device is present and returns its identity
    pub fn ping(&mut self) -> Result<DeviceIdentity> {
        self.send(&Command::Ping)?;
        let response = self.await_response(self.config.response_timeout)?;
        DeviceIdentity::from_payload(&response.payload)
    }

    /// Waits for the next generic response frame
    ///
    /// Frames of any other kind arriving meanwhile are dropped, as are frames
    /// failing validation. If no response arrives in time, the last
    /// validation error is returned in place of [`Error::Timeout`].
    pub fn await_response(&mut self, timeout: Duration) -> Result<Frame> {
        let policy = self.poll_policy().with_timeout(timeout);
        let deadline = Instant::now() + timeout;
        let mut corrupt = None;
        match policy.poll(|| self.next_response(deadline, &mut corrupt))? {
            Some(frame) => Ok(frame),
            None => Err(corrupt.unwrap_or(Error::Timeout)),
        }
    }

    /// Waits up to `timeout` for a frame of any kind
    pub fn read_frame(&mut self, timeout: Duration) -> Result<Option<Frame>> {
        let policy = self.poll_policy().with_timeout(timeout);
        policy.poll(|| self.poll_frame())
    }

    /// Reads whatever the transport has and tries to decode one frame
    pub fn poll_frame(&mut self) -> Result<Option<Frame>> {
        self.fill_buffer()?;
        self.codec.decode(&mut self.buffer)
    }

    /// Drops any partially received data
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Number of received bytes not yet decoded
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Session timing configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Shared access to the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Exclusive access to the transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Ends the session, returning the transport
    pub fn into_transport(self) -> T {
        self.transport
    }

    fn poll_policy(&self) -> PollPolicy {
        PollPolicy::from(&self.config)
    }

    /// Decodes buffered frames until a response shows up or `deadline` passes
    fn next_response(&mut self, deadline: Instant, corrupt: &mut Option<Error>) -> Result<Option<Frame>> {
        loop {
            match self.poll_frame() {
                Ok(Some(frame)) if frame.is_response() => return Ok(Some(frame)),
                Ok(Some(frame)) => {
                    debug!(kind = frame.kind, length = frame.payload.len(), "skipping frame while awaiting response");
                }
                Ok(None) => return Ok(None),
                Err(e @ (Error::ChecksumMismatch { .. } | Error::MalformedTrailer(_))) => {
                    warn!(error = %e, "discarding corrupt frame while awaiting response");
                    *corrupt = Some(e);
                }
                Err(e) => return Err(e),
            }
            // A device streaming capture data must not hold the wait open
            if Instant::now() >= deadline {
                return Ok(None);
            }
        }
    }

    /// Moves all available transport bytes into the receive buffer
    fn fill_buffer(&mut self) -> Result<usize> {
        let available = self.transport.bytes_available()?;
        if available == 0 {
            return Ok(0);
        }

        let start = self.buffer.len();
        self.buffer.resize(start + available, 0);
        if let Err(e) = self.transport.read_exact(&mut self.buffer[start..]) {
            self.buffer.truncate(start);
            return Err(e);
        }
        trace!(bytes = ?&self.buffer[start..], "rx");
        Ok(available)
    }
}

/// Translates a generic response payload into an outcome
fn check_status(payload: &[u8]) -> Result<()> {
    let [byte] = payload else {
        return Err(Error::UnexpectedPayloadShape(payload.to_vec()));
    };
    match StatusCode::try_from(*byte)? {
        StatusCode::Ok => Ok(()),
        status => Err(Error::DeviceRejected(status)),
    }
}
