//! In-memory RNDIS device.
//!
//! `QueueRndisDevice` behaves like an enumerated USB RNDIS adapter without any USB underneath:
//! inbound frames are queued with [`QueueRndisDevice::push_rx_frame`], transmitted packets are
//! recorded for [`QueueRndisDevice::drain_tx_packets`], and send results can be scripted to
//! exercise failure paths.

use std::collections::VecDeque;

use bytemuck::{Pod, Zeroable};
use netif_driver::MacAddr;

use crate::device::{DeviceSendError, RndisDevice};

/// `REMOTE_NDIS_PACKET_MSG` message type.
pub const RNDIS_MSG_PACKET: u32 = 0x0000_0001;

/// Size of the `REMOTE_NDIS_PACKET_MSG` header that precedes every data frame on the bulk pipe.
pub const RNDIS_PACKET_MSG_HEADER_LEN: usize = core::mem::size_of::<PacketMsgHeader>();

/// `REMOTE_NDIS_PACKET_MSG` header, little-endian on the wire.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct PacketMsgHeader {
    message_type: u32,
    message_length: u32,
    /// Offset of the frame from the start of `data_offset` itself.
    data_offset: u32,
    data_length: u32,
    oob_data_offset: u32,
    oob_data_length: u32,
    num_oob_data_elements: u32,
    per_packet_info_offset: u32,
    per_packet_info_length: u32,
    vc_handle: u32,
    reserved: u32,
}

impl PacketMsgHeader {
    fn for_payload(payload_len: u32) -> Self {
        let header_len = RNDIS_PACKET_MSG_HEADER_LEN as u32;
        Self {
            message_type: RNDIS_MSG_PACKET.to_le(),
            message_length: (header_len + payload_len).to_le(),
            data_offset: (header_len - 8).to_le(),
            data_length: payload_len.to_le(),
            ..Self::zeroed()
        }
    }
}

/// One packet handed to [`RndisDevice::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentPacket {
    /// The whole transmit buffer, header space included.
    pub bytes: Vec<u8>,
    pub payload_len: usize,
}

impl SentPacket {
    /// The Ethernet frame that followed the header space.
    pub fn payload(&self) -> &[u8] {
        &self.bytes[self.bytes.len().saturating_sub(self.payload_len)..]
    }
}

#[derive(Debug)]
pub struct QueueRndisDevice {
    mac: MacAddr,
    up: bool,
    header_len: usize,
    rx_frames: VecDeque<Vec<u8>>,
    tx_packets: Vec<SentPacket>,
    send_statuses: VecDeque<i32>,
    probes: u64,
}

impl QueueRndisDevice {
    /// A down device with the standard RNDIS packet header length.
    pub fn new(mac: MacAddr) -> Self {
        Self::with_header_len(mac, RNDIS_PACKET_MSG_HEADER_LEN)
    }

    pub fn with_header_len(mac: MacAddr, header_len: usize) -> Self {
        Self {
            mac,
            up: false,
            header_len,
            rx_frames: VecDeque::new(),
            tx_packets: Vec::new(),
            send_statuses: VecDeque::new(),
            probes: 0,
        }
    }

    pub fn set_up(&mut self, up: bool) {
        self.up = up;
    }

    pub fn set_mac(&mut self, mac: MacAddr) {
        self.mac = mac;
    }

    pub fn push_rx_frame(&mut self, frame: Vec<u8>) {
        self.rx_frames.push_back(frame);
    }

    pub fn pending_rx_frames(&self) -> usize {
        self.rx_frames.len()
    }

    /// Make upcoming sends return these raw statuses, in order. Once the script runs out, sends
    /// succeed with the payload length.
    pub fn script_send_statuses<I: IntoIterator<Item = i32>>(&mut self, statuses: I) {
        self.send_statuses.extend(statuses);
    }

    /// Number of length-only probes seen so far.
    pub fn probe_count(&self) -> u64 {
        self.probes
    }

    pub fn tx_packets(&self) -> &[SentPacket] {
        &self.tx_packets
    }

    pub fn drain_tx_packets(&mut self) -> Vec<SentPacket> {
        std::mem::take(&mut self.tx_packets)
    }
}

impl RndisDevice for QueueRndisDevice {
    fn mac_address(&self) -> MacAddr {
        self.mac
    }

    fn is_up(&self) -> bool {
        self.up
    }

    fn recv(&mut self, dst: Option<&mut [u8]>) -> usize {
        let Some(dst) = dst else {
            self.probes += 1;
            return self.rx_frames.front().map_or(0, Vec::len);
        };
        let Some(frame) = self.rx_frames.pop_front() else {
            return 0;
        };
        let n = frame.len().min(dst.len());
        dst[..n].copy_from_slice(&frame[..n]);
        n
    }

    fn send(&mut self, packet: &mut [u8], payload_len: usize) -> Result<usize, DeviceSendError> {
        let default_status = i32::try_from(payload_len).unwrap_or(i32::MAX);
        let status = self.send_statuses.pop_front().unwrap_or(default_status);
        let written = DeviceSendError::check(status)?;

        let header_fits = packet.len() >= RNDIS_PACKET_MSG_HEADER_LEN;
        if self.header_len >= RNDIS_PACKET_MSG_HEADER_LEN && header_fits {
            let header = PacketMsgHeader::for_payload(payload_len as u32);
            packet[..RNDIS_PACKET_MSG_HEADER_LEN].copy_from_slice(bytemuck::bytes_of(&header));
        }
        self.tx_packets.push(SentPacket {
            bytes: packet.to_vec(),
            payload_len,
        });
        Ok(written)
    }

    fn packet_header_len(&self) -> usize {
        self.header_len
    }
}
