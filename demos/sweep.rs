use std::time::Duration;

use sniffer_link::{Sniffer, SnifferConfig};
use tracing::Level;

/// PHY indices supported by the sniffer firmware
const PHY_COUNT: u8 = 9;

/// Channels swept per PHY
const CHANNEL_COUNT: u32 = 129;

/// First channel center frequency
const BASE_FREQUENCY_MHZ: f64 = 902.2;

/// Spacing between channels
const CHANNEL_SPACING_MHZ: f64 = 0.2;

/// Listening windows per channel
const WINDOWS_PER_CHANNEL: usize = 3;

fn main() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let port = match std::env::args().nth(1) {
        Some(port) => port,
        None => {
            eprintln!("usage: sweep <serial-port> [baud-rate]");
            std::process::exit(2);
        }
    };

    let mut config = SnifferConfig::new(port);
    if let Some(baud) = std::env::args().nth(2) {
        match baud.parse() {
            Ok(baud) => config.baud_rate = baud,
            Err(e) => {
                eprintln!("invalid baud rate {}: {}", baud, e);
                std::process::exit(2);
            }
        }
    }

    if let Err(e) = run(&config) {
        eprintln!("Sweep failed: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &SnifferConfig) -> sniffer_link::Result<()> {
    let mut sniffer = Sniffer::open(config)?;
    println!("Found sniffer: {}", sniffer.identity());

    for phy in 0..PHY_COUNT {
        for channel in 0..CHANNEL_COUNT {
            println!("Phy = {:x}, Channel {}", phy, channel);
            sniffer.stop_capture()?;
            sniffer.set_frequency_mhz(BASE_FREQUENCY_MHZ + CHANNEL_SPACING_MHZ * channel as f64)?;
            sniffer.set_phy(phy)?;
            sniffer.start_capture()?;

            let mut received = 0;
            for _ in 0..WINDOWS_PER_CHANNEL {
                match sniffer.read_frame(Duration::from_secs(1)) {
                    Ok(Some(frame)) => {
                        println!("  kind=0x{:02x} payload={:02x?}", frame.kind, &frame.payload[..]);
                        received += 1;
                    }
                    Ok(None) => {}
                    // Corrupt capture frames are reported but do not end the sweep
                    Err(e) if !e.is_fatal() => eprintln!("  {}", e),
                    Err(e) => return Err(e),
                }
            }
            println!("  {} frame(s)", received);
        }
    }

    sniffer.stop_capture()
}
