use thiserror::Error;

use crate::{NetError, Pbuf};

/// A link state change reported by a driver to the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkTransition {
    Up,
    Down,
}

/// An inbound packet the stack refused.
///
/// The stack does not take ownership of a buffer it rejects; it is handed back here so the
/// driver can release it through [`Netif::free_pbuf`].
#[derive(Debug, Error)]
#[error("stack input failed: {error}")]
pub struct InputRejected {
    pub error: NetError,
    pub pbuf: Pbuf,
}

/// The host network stack as seen by a link-layer driver.
///
/// Implementations own the buffer pool and the cached link state. Drivers read the cached state
/// through [`Netif::is_link_up`] and never keep their own copy.
pub trait Netif {
    /// Allocate an inbound buffer of exactly `len` bytes (pad region included).
    ///
    /// The buffer must be a single segment: drivers write the whole frame through
    /// [`Pbuf::payload_mut`].
    fn alloc_pbuf(&mut self, len: usize) -> Option<Pbuf>;

    /// Hand a received frame to the stack's input path.
    ///
    /// On success the stack owns the buffer. On failure it is returned inside the error.
    fn input(&mut self, pbuf: Pbuf) -> Result<(), InputRejected>;

    /// Release a buffer previously obtained from [`Netif::alloc_pbuf`].
    fn free_pbuf(&mut self, pbuf: Pbuf);

    /// The stack's cached link state.
    fn is_link_up(&self) -> bool;

    fn set_link_up(&mut self);

    fn set_link_down(&mut self);
}

impl<T: Netif + ?Sized> Netif for &mut T {
    fn alloc_pbuf(&mut self, len: usize) -> Option<Pbuf> {
        <T as Netif>::alloc_pbuf(&mut **self, len)
    }

    fn input(&mut self, pbuf: Pbuf) -> Result<(), InputRejected> {
        <T as Netif>::input(&mut **self, pbuf)
    }

    fn free_pbuf(&mut self, pbuf: Pbuf) {
        <T as Netif>::free_pbuf(&mut **self, pbuf)
    }

    fn is_link_up(&self) -> bool {
        <T as Netif>::is_link_up(&**self)
    }

    fn set_link_up(&mut self) {
        <T as Netif>::set_link_up(&mut **self)
    }

    fn set_link_down(&mut self) {
        <T as Netif>::set_link_down(&mut **self)
    }
}

impl<T: Netif + ?Sized> Netif for Box<T> {
    fn alloc_pbuf(&mut self, len: usize) -> Option<Pbuf> {
        <T as Netif>::alloc_pbuf(&mut **self, len)
    }

    fn input(&mut self, pbuf: Pbuf) -> Result<(), InputRejected> {
        <T as Netif>::input(&mut **self, pbuf)
    }

    fn free_pbuf(&mut self, pbuf: Pbuf) {
        <T as Netif>::free_pbuf(&mut **self, pbuf)
    }

    fn is_link_up(&self) -> bool {
        <T as Netif>::is_link_up(&**self)
    }

    fn set_link_up(&mut self) {
        <T as Netif>::set_link_up(&mut **self)
    }

    fn set_link_down(&mut self) {
        <T as Netif>::set_link_down(&mut **self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryNetif;

    fn drive(netif: &mut dyn Netif) {
        netif.set_link_up();
        let pbuf = netif.alloc_pbuf(4).unwrap();
        netif.input(pbuf).unwrap();
    }

    #[test]
    fn netif_is_implemented_for_box_and_mut_ref() {
        let mut boxed: Box<dyn Netif> = Box::new(MemoryNetif::new(0));
        drive(&mut boxed);
        assert!(boxed.is_link_up());

        let mut inner = MemoryNetif::new(0);
        let mut by_ref = &mut inner;
        drive(&mut by_ref);
        assert!(inner.is_link_up());
        assert_eq!(inner.drain_rx_frames(), vec![vec![0u8; 4]]);
    }
}
