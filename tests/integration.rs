use std::time::{Duration, Instant};

use sniffer_link::protocol::{encode_frame, opcode, RESPONSE};
use sniffer_link::{
    ChannelTable, DeviceIdentity, Error, MemoryTransport, SessionConfig, Sniffer, StatusCode,
};

fn config() -> SessionConfig {
    SessionConfig {
        response_timeout: Duration::from_millis(100),
        poll_interval: Duration::from_millis(1),
    }
}

fn identity() -> DeviceIdentity {
    DeviceIdentity {
        chip_id: 0x2652,
        chip_revision: 0x21,
        firmware_id: 0x01,
        firmware_revision: 0x0103,
    }
}

#[test]
fn test_sweep_over_emulated_device() {
    let transport = MemoryTransport::emulator(identity()).with_chunk_size(5);
    let mut sniffer = Sniffer::connect(transport, config()).unwrap();
    assert_eq!(sniffer.identity(), &identity());

    for phy in 0..3u8 {
        for channel in 0..4u32 {
            sniffer.stop_capture().unwrap();
            sniffer.set_frequency_mhz(902.2 + 0.2 * channel as f64).unwrap();
            sniffer.set_phy(phy).unwrap();
            sniffer.start_capture().unwrap();
        }
    }

    sniffer
        .set_channel_table(&ChannelTable::new(vec![37, 38, 39]).unwrap())
        .unwrap();
    sniffer.set_initiator_address("AA:BB:CC:DD:EE:FF".parse().unwrap()).unwrap();
    assert_eq!(sniffer.ping().unwrap(), identity());
}

#[test]
fn test_capture_stream_with_noise() {
    let transport = MemoryTransport::emulator(identity());
    let mut sniffer = Sniffer::connect(transport, config()).unwrap();
    sniffer.start_capture().unwrap();

    let transport = sniffer.session().transport_mut();
    transport.push_rx(&[0x00, 0x40, 0x00]);
    transport.push_rx(&encode_frame(0xC1, &[0x01, 0x02, 0x03]).unwrap());
    transport.push_rx(&encode_frame(0xC1, &[]).unwrap());

    let first = sniffer.read_frame(Duration::from_millis(20)).unwrap().unwrap();
    assert_eq!(&first.payload[..], &[0x01, 0x02, 0x03]);
    assert_eq!(first.checksum, None);
    let second = sniffer.read_frame(Duration::from_millis(20)).unwrap().unwrap();
    assert!(second.payload.is_empty());

    // Capture data still in flight does not confuse the next command
    sniffer
        .session()
        .transport_mut()
        .push_rx(&encode_frame(0xC1, &[0x09]).unwrap());
    sniffer.stop_capture().unwrap();
}

#[test]
fn test_unresponsive_device() {
    let start = Instant::now();
    let result = Sniffer::connect(MemoryTransport::new(), config());
    assert!(matches!(result, Err(Error::DeviceNotFound)));
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[test]
fn test_device_rejects_after_connect() {
    let mut exchanges = 0;
    let transport = MemoryTransport::with_responder(move |data| {
        exchanges += 1;
        let payload = match data[2] {
            opcode::PING => vec![0x00, 0x52, 0x26, 0x21, 0x01, 0x03, 0x01],
            opcode::STOP => vec![StatusCode::Ok as u8],
            _ if exchanges % 2 == 0 => vec![StatusCode::FcsFailed as u8],
            _ => vec![0x07],
        };
        encode_frame(RESPONSE, &payload).unwrap()
    });
    let mut sniffer = Sniffer::connect(transport, config()).unwrap();

    assert!(matches!(sniffer.set_phy(1), Err(Error::UnknownStatus(0x07))));
    assert!(matches!(
        sniffer.set_phy(1),
        Err(Error::DeviceRejected(StatusCode::FcsFailed))
    ));
    sniffer.stop_capture().unwrap();
}
