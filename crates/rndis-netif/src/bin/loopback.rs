#![forbid(unsafe_code)]

//! Runs the RNDIS driver against an in-memory device and stack.
//!
//! Useful for checking configuration and log output without hardware:
//! `RUST_LOG=rndis_netif=trace RNDIS_NETIF_MAX_RX_FRAMES_PER_POLL=2 cargo run --bin rndis-netif-loopback`

use std::process::ExitCode;

use netif_driver::{MacAddr, MemoryNetif, NetifDriver, Pbuf};
use rndis_netif::{install_device, GlobalRndisDriver, QueueRndisDevice, RndisNetifConfig};

const POLL_CYCLES: usize = 4;

fn demo_frame(src: MacAddr, seq: u8) -> Vec<u8> {
    let mut frame = Vec::with_capacity(64);
    frame.extend_from_slice(&[0xff; 6]);
    frame.extend_from_slice(&src.octets());
    frame.extend_from_slice(&0x88b5u16.to_be_bytes()); // local experimental ethertype
    frame.resize(60, seq);
    frame
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match RndisNetifConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("invalid config: {err}");
            return ExitCode::FAILURE;
        }
    };

    let device_mac = MacAddr([0x02, 0x52, 0x4e, 0x44, 0x49, 0x53]);
    let peer_mac = MacAddr([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
    let mut device = QueueRndisDevice::new(device_mac);
    device.set_up(true);
    for seq in 0..5 {
        device.push_rx_frame(demo_frame(peer_mac, seq));
    }
    if let Err(err) = install_device(device) {
        tracing::error!("{err}");
        return ExitCode::FAILURE;
    }

    let mut driver = GlobalRndisDriver::global(config);
    let pad = driver.config().pad_size;
    let mut netif = MemoryNetif::new(pad);
    let mut reflected = 0usize;

    let mac = driver.get_system_mac();
    if let Err(err) = driver.init(&mac) {
        tracing::error!("driver init failed: {err}");
        return ExitCode::FAILURE;
    }
    tracing::info!(%mac, mtu = driver.mtu(), max_frame_len = driver.max_frame_len(), "driver up");

    for cycle in 0..POLL_CYCLES {
        driver.poll(&mut netif);
        let counts = driver.proc_input_with_counts(&mut netif);
        tracing::info!(cycle, frames = counts.frames, bytes = counts.bytes, "receive poll");

        // Reflect everything received back out through the device.
        for mut frame in netif.drain_rx_frames() {
            frame.copy_within(6..12, 0);
            frame[6..12].copy_from_slice(&mac.octets());
            match driver.output(&Pbuf::from_frame(pad, &frame)) {
                Ok(()) => {
                    reflected += 1;
                    tracing::debug!(len = frame.len(), "frame reflected");
                }
                Err(err) => tracing::warn!("reflect failed: {err}"),
            }
        }
    }

    let next_rx_len = rndis_netif::with_device(|dev| dev.peek_len()).unwrap_or(0);
    tracing::info!(reflected, next_rx_len, "loopback finished");
    driver.deinit();
    ExitCode::SUCCESS
}
