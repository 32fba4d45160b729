//! Sniffer device operations
//!
//! [`Sniffer`] wraps a connected [`Session`] and exposes one method per
//! firmware command.

use std::time::Duration;

use tracing::debug;

use crate::core::{DeviceIdentity, Result, SessionConfig, SnifferConfig};
use crate::protocol::{BleAddress, ChannelTable, Command, Frame};
use crate::session::Session;
use crate::transport::{SerialTransport, Transport};

/// A connected radio packet sniffer
pub struct Sniffer<T: Transport> {
    /// Protocol session with the device
    session: Session<T>,
    /// Identity reported when connecting
    identity: DeviceIdentity,
}

impl Sniffer<SerialTransport> {
    /// Opens the configured serial port and connects to the sniffer on it
    pub fn open(config: &SnifferConfig) -> Result<Self> {
        config.validate()?;
        let transport = SerialTransport::open(&config.port, config.baud_rate)?;
        Sniffer::connect(transport, config.session.clone())
    }
}

impl<T: Transport> Sniffer<T> {
    /// Connects over an existing transport, leaving the device stopped
    pub fn connect(transport: T, config: SessionConfig) -> Result<Self> {
        let (session, identity) = Session::connect(transport, config)?;
        Ok(Sniffer { session, identity })
    }

    /// Identity reported by the device at connection time
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Pings the device again, refreshing the stored identity
    pub fn ping(&mut self) -> Result<DeviceIdentity> {
        self.identity = self.session.ping()?;
        Ok(self.identity)
    }

    /// Starts capturing on the configured PHY and frequency
    pub fn start_capture(&mut self) -> Result<()> {
        self.session.send_and_await_ack(&Command::Start)
    }

    /// Stops the capture, returning the device to idle
    pub fn stop_capture(&mut self) -> Result<()> {
        self.session.send_and_await_ack(&Command::Stop)
    }

    /// Suspends the capture without dropping its configuration
    pub fn pause_capture(&mut self) -> Result<()> {
        self.session.send_and_await_ack(&Command::Pause)
    }

    /// Continues a paused capture
    pub fn resume_capture(&mut self) -> Result<()> {
        self.session.send_and_await_ack(&Command::Resume)
    }

    /// Selects the radio PHY by firmware index
    pub fn set_phy(&mut self, index: u8) -> Result<()> {
        self.session.send_and_await_ack(&Command::ConfigurePhy(index))
    }

    /// Tunes the radio to `freq` megahertz
    pub fn set_frequency_mhz(&mut self, freq: f64) -> Result<()> {
        let command = Command::frequency_mhz(freq)?;
        debug!(freq, ?command, "tuning");
        self.session.send_and_await_ack(&command)
    }

    /// Loads the channel hopping table
    pub fn set_channel_table(&mut self, table: &ChannelTable) -> Result<()> {
        self.session
            .send_and_await_ack(&Command::ConfigureChannelTable(table.clone()))
    }

    /// Restricts BLE capture to connections from `address`
    pub fn set_initiator_address(&mut self, address: BleAddress) -> Result<()> {
        self.session
            .send_and_await_ack(&Command::ConfigureInitiatorAddress(address))
    }

    /// Waits up to `timeout` for the next frame from the device
    ///
    /// Used to collect capture data after [`Sniffer::start_capture`]; the
    /// payload is returned as received.
    pub fn read_frame(&mut self, timeout: Duration) -> Result<Option<Frame>> {
        self.session.read_frame(timeout)
    }

    /// The underlying protocol session
    pub fn session(&mut self) -> &mut Session<T> {
        &mut self.session
    }

    /// Gives up the device, returning the session
    pub fn into_session(self) -> Session<T> {
        self.session
    }
}
