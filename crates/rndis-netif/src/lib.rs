//! Network-interface driver for USB RNDIS adapters.
//!
//! [`RndisNetifDriver`] implements the host stack's [`netif_driver::NetifDriver`] contract on top
//! of an [`RndisDevice`]: it drains inbound frames into stack-owned pbufs, flattens outbound pbuf
//! chains into a single aligned transmit buffer with room for the device's packet header, and
//! turns device up/down changes into edge-triggered link notifications.
//!
//! Everything USB (enumeration, the RNDIS control channel, bulk transfers) stays behind the
//! [`RndisDevice`] trait. The single physical adapter is normally installed once with
//! [`install_device`] and reached through [`GlobalRndis`].
#![forbid(unsafe_code)]

pub mod config;
pub mod device;
pub mod driver;
pub mod global;
pub mod queue;
pub mod txbuf;

pub use config::{ConfigError, RndisNetifConfig};
pub use device::{DeviceSendError, RndisDevice};
pub use driver::{
    GlobalRndisDriver, InputCounts, RndisNetifDriver, MAX_FRAME_LEN, RNDIS_FRAME_OVERHEAD,
    RNDIS_WIRE_FRAME_LIMIT,
};
pub use global::{install_device, is_installed, with_device, GlobalDeviceError, GlobalRndis};
pub use queue::{QueueRndisDevice, SentPacket, RNDIS_PACKET_MSG_HEADER_LEN};
pub use txbuf::{HeapTxAllocator, TxAllocator, TxBuffer, TX_BUFFER_ALIGN};
