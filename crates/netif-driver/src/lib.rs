//! Link-layer driver contract shared by host network stacks and the drivers they poll.
//!
//! The stack owns every packet buffer ([`Pbuf`]) and the cached link state; a driver only moves
//! frames between its hardware and the stack through the [`Netif`] capability, and exposes the
//! entry points the stack calls through [`NetifDriver`].
//!
//! The contract is polled and single-threaded: the stack calls
//! [`NetifDriver::proc_input`], [`NetifDriver::poll`] and [`NetifDriver::output`] from its own run
//! loop, and a driver never calls back into the stack except from inside one of those calls.
#![forbid(unsafe_code)]

pub mod driver;
pub mod error;
pub mod memory;
pub mod netif;
pub mod pbuf;

use core::fmt;

pub use driver::NetifDriver;
pub use error::NetError;
pub use memory::{MemoryNetif, MemoryNetifStats};
pub use netif::{InputRejected, LinkTransition, Netif};
pub use pbuf::Pbuf;

/// Length of an Ethernet hardware address.
pub const ETH_HWADDR_LEN: usize = 6;

/// Leading bytes the stack reserves in every packet buffer so the IP header lands word-aligned
/// after the 14-byte Ethernet header.
pub const ETH_PAD_SIZE: usize = 2;

/// Standard Ethernet payload ceiling.
pub const ETHERNET_MTU: usize = 1500;

/// Ethernet header (14) + MTU + FCS (4).
pub const MAX_ETH_FRAME_LEN: usize = 1518;

/// Ethernet MAC address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddr(pub [u8; ETH_HWADDR_LEN]);

impl MacAddr {
    pub const ZERO: MacAddr = MacAddr([0; ETH_HWADDR_LEN]);

    pub fn octets(&self) -> [u8; ETH_HWADDR_LEN] {
        self.0
    }
}

impl From<[u8; ETH_HWADDR_LEN]> for MacAddr {
    fn from(octets: [u8; ETH_HWADDR_LEN]) -> Self {
        Self(octets)
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}
