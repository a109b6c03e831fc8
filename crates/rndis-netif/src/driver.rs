use netif_driver::{LinkTransition, MacAddr, NetError, Netif, NetifDriver, Pbuf, ETHERNET_MTU};

use crate::config::RndisNetifConfig;
use crate::device::RndisDevice;
use crate::global::GlobalRndis;
use crate::txbuf::{HeapTxAllocator, TxAllocator};

/// Largest RNDIS data transfer the adapter accepts on the bulk pipe.
pub const RNDIS_WIRE_FRAME_LIMIT: usize = 1580;

/// Per-frame allowance for the `REMOTE_NDIS_PACKET_MSG` header.
pub const RNDIS_FRAME_OVERHEAD: usize = 44;

/// Maximum Ethernet frame length reported to the stack.
pub const MAX_FRAME_LEN: usize = RNDIS_WIRE_FRAME_LIMIT - RNDIS_FRAME_OVERHEAD;

/// What one receive poll did.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputCounts {
    /// Frames accepted by the stack.
    pub frames: usize,
    /// Frame bytes accepted by the stack (pad excluded).
    pub bytes: usize,
    /// Frames the stack refused; their buffers were freed.
    pub rejected: usize,
    /// The drain stopped early because no pbuf could be allocated.
    pub alloc_deferred: bool,
}

/// Link-layer driver bridging a USB RNDIS device to a host network stack.
///
/// The adapter keeps no state of its own beyond configuration: link state is read from the
/// stack's cache each poll, inbound pbufs belong to the stack, and transmit buffers live only for
/// the duration of one [`NetifDriver::output`] call.
#[derive(Debug)]
pub struct RndisNetifDriver<D, A = HeapTxAllocator> {
    device: D,
    tx_alloc: A,
    config: RndisNetifConfig,
}

/// The driver as the stack normally sees it: bound to the process-wide device.
pub type GlobalRndisDriver = RndisNetifDriver<GlobalRndis>;

impl GlobalRndisDriver {
    pub fn global(config: RndisNetifConfig) -> Self {
        Self::with_config(GlobalRndis, config)
    }
}

impl<D: RndisDevice> RndisNetifDriver<D> {
    pub fn new(device: D) -> Self {
        Self::with_config(device, RndisNetifConfig::default())
    }

    pub fn with_config(device: D, config: RndisNetifConfig) -> Self {
        Self::with_allocator(device, HeapTxAllocator, config)
    }
}

impl<D: RndisDevice, A: TxAllocator> RndisNetifDriver<D, A> {
    pub fn with_allocator(device: D, tx_alloc: A, config: RndisNetifConfig) -> Self {
        Self {
            device,
            tx_alloc,
            config,
        }
    }

    pub fn config(&self) -> &RndisNetifConfig {
        &self.config
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn tx_allocator(&self) -> &A {
        &self.tx_alloc
    }

    /// Drain inbound frames from the device into `netif`.
    ///
    /// Does nothing while the stack considers the link down. Stops when the device has nothing
    /// queued, the per-poll budget is spent, or the stack runs out of pbufs. In the last two
    /// cases the remaining frames stay queued in the device for the next poll.
    pub fn proc_input_with_counts(&mut self, netif: &mut dyn Netif) -> InputCounts {
        let mut counts = InputCounts::default();
        if !netif.is_link_up() {
            return counts;
        }

        let pad = self.config.pad_size;
        loop {
            if let Some(max) = self.config.max_rx_frames_per_poll {
                if counts.frames + counts.rejected >= max {
                    break;
                }
            }

            let frame_len = self.device.peek_len();
            if frame_len == 0 {
                break;
            }

            let Some(mut pbuf) = netif.alloc_pbuf(frame_len.saturating_add(pad)) else {
                tracing::warn!(frame_len, "failed to allocate pbuf");
                counts.alloc_deferred = true;
                break;
            };

            let Some(dst) = pbuf.payload_mut().get_mut(pad..) else {
                tracing::warn!(frame_len, len = pbuf.len(), "pbuf too short for pad region");
                netif.free_pbuf(pbuf);
                break;
            };
            let copied = self.device.recv(Some(dst));
            if copied == 0 {
                tracing::warn!(frame_len, "probed frame vanished before it could be copied");
                netif.free_pbuf(pbuf);
                break;
            }
            pbuf.set_len(copied + pad);

            match netif.input(pbuf) {
                Ok(()) => {
                    tracing::trace!(len = copied, "frame passed to stack");
                    counts.frames += 1;
                    counts.bytes += copied;
                }
                Err(rejected) => {
                    tracing::warn!(
                        len = copied,
                        error = %rejected.error,
                        "stack input failed; dropping frame"
                    );
                    netif.free_pbuf(rejected.pbuf);
                    counts.rejected += 1;
                }
            }
        }

        counts
    }

    /// Report a link change to `netif` if the device disagrees with the stack's cached state.
    pub fn poll_with_transition(&mut self, netif: &mut dyn Netif) -> Option<LinkTransition> {
        let up = self.device.is_up();
        if netif.is_link_up() == up {
            return None;
        }
        if up {
            tracing::info!("setting link up");
            netif.set_link_up();
            Some(LinkTransition::Up)
        } else {
            tracing::info!("setting link down");
            netif.set_link_down();
            Some(LinkTransition::Down)
        }
    }
}

impl<D: RndisDevice, A: TxAllocator> NetifDriver for RndisNetifDriver<D, A> {
    fn get_system_mac(&mut self) -> MacAddr {
        self.device.mac_address()
    }

    fn has_hardware(&mut self) -> bool {
        tracing::debug!("driver_has_hardware");
        self.device.is_up()
    }

    fn proc_input(&mut self, netif: &mut dyn Netif) {
        let _ = self.proc_input_with_counts(netif);
    }

    fn poll(&mut self, netif: &mut dyn Netif) {
        let _ = self.poll_with_transition(netif);
    }

    fn output(&mut self, pbuf: &Pbuf) -> Result<(), NetError> {
        let pad = self.config.pad_size;
        let payload_len = pbuf.tot_len().saturating_sub(pad);
        let header_len = self.device.packet_header_len();

        let packet = header_len
            .checked_add(payload_len)
            .and_then(|len| self.tx_alloc.alloc(len));
        let Some(mut packet) = packet else {
            tracing::warn!(header_len, payload_len, "failed to allocate packet for sending");
            return Err(NetError::OutOfMemory);
        };

        pbuf.copy_partial(&mut packet.as_mut_slice()[header_len..], pad);
        let result = self.device.send(packet.as_mut_slice(), payload_len);
        self.tx_alloc.release(packet);

        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                tracing::warn!(payload_len, %err, "RNDIS send failed");
                Err(NetError::Transmit { status: err.code })
            }
        }
    }

    fn set_mac(&mut self, mac: &MacAddr) {
        tracing::debug!(%mac, "driver_set_mac: ignored, device address is authoritative");
    }

    fn mtu(&self) -> usize {
        ETHERNET_MTU
    }

    fn max_frame_len(&self) -> usize {
        MAX_FRAME_LEN
    }
}
