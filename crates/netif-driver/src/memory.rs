//! In-memory [`Netif`] implementation.
//!
//! `MemoryNetif` stands in for a real protocol stack during bring-up and in tests: accepted
//! frames are queued (pad stripped) for [`MemoryNetif::drain_rx_frames`], link notifications are
//! recorded, and the buffer pool can be throttled to exercise allocation failure paths.

use std::collections::VecDeque;

use crate::{InputRejected, LinkTransition, NetError, Netif, Pbuf};

/// Counters kept by [`MemoryNetif`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryNetifStats {
    /// Successful [`Netif::alloc_pbuf`] calls.
    pub allocs: u64,
    /// [`Netif::alloc_pbuf`] calls refused by the allocation budget or the allocator.
    pub alloc_failures: u64,
    /// Buffers returned through [`Netif::free_pbuf`].
    pub frees: u64,
    /// Buffers accepted by [`Netif::input`].
    pub inputs: u64,
    /// Buffers refused by [`Netif::input`].
    pub rejected: u64,
}

#[derive(Debug)]
pub struct MemoryNetif {
    pad_size: usize,
    link_up: bool,
    alloc_budget: Option<usize>,
    reject_inputs: usize,
    alloc_sizes: Vec<usize>,
    rx_frames: VecDeque<Vec<u8>>,
    link_events: Vec<LinkTransition>,
    stats: MemoryNetifStats,
}

impl MemoryNetif {
    /// Create a link-down interface whose buffers carry `pad_size` leading pad bytes.
    pub fn new(pad_size: usize) -> Self {
        Self {
            pad_size,
            link_up: false,
            alloc_budget: None,
            reject_inputs: 0,
            alloc_sizes: Vec::new(),
            rx_frames: VecDeque::new(),
            link_events: Vec::new(),
            stats: MemoryNetifStats::default(),
        }
    }

    pub fn pad_size(&self) -> usize {
        self.pad_size
    }

    /// Overwrite the cached link state without recording a link event.
    pub fn force_link(&mut self, up: bool) {
        self.link_up = up;
    }

    /// Allow only `budget` more successful allocations (`None` = unlimited).
    pub fn set_alloc_budget(&mut self, budget: Option<usize>) {
        self.alloc_budget = budget;
    }

    /// Reject the next `count` calls to [`Netif::input`].
    pub fn reject_next_inputs(&mut self, count: usize) {
        self.reject_inputs = count;
    }

    pub fn stats(&self) -> MemoryNetifStats {
        self.stats
    }

    /// Buffers handed out and neither accepted by input nor freed.
    pub fn outstanding_pbufs(&self) -> u64 {
        self.stats
            .allocs
            .saturating_sub(self.stats.inputs + self.stats.frees)
    }

    /// Sizes requested by successful allocations, in order.
    pub fn alloc_sizes(&self) -> &[usize] {
        &self.alloc_sizes
    }

    pub fn link_events(&self) -> &[LinkTransition] {
        &self.link_events
    }

    pub fn drain_link_events(&mut self) -> Vec<LinkTransition> {
        std::mem::take(&mut self.link_events)
    }

    /// Accepted frames with the pad region stripped, oldest first.
    pub fn drain_rx_frames(&mut self) -> Vec<Vec<u8>> {
        self.rx_frames.drain(..).collect()
    }
}

impl Netif for MemoryNetif {
    fn alloc_pbuf(&mut self, len: usize) -> Option<Pbuf> {
        if let Some(budget) = self.alloc_budget.as_mut() {
            if *budget == 0 {
                self.stats.alloc_failures += 1;
                return None;
            }
            *budget -= 1;
        }
        let Some(pbuf) = Pbuf::try_alloc(len) else {
            self.stats.alloc_failures += 1;
            return None;
        };
        self.stats.allocs += 1;
        self.alloc_sizes.push(len);
        Some(pbuf)
    }

    fn input(&mut self, pbuf: Pbuf) -> Result<(), InputRejected> {
        if self.reject_inputs > 0 {
            self.reject_inputs -= 1;
            self.stats.rejected += 1;
            return Err(InputRejected {
                error: NetError::Rejected,
                pbuf,
            });
        }
        self.stats.inputs += 1;
        let mut frame = pbuf.to_vec();
        frame.drain(..self.pad_size.min(frame.len()));
        self.rx_frames.push_back(frame);
        Ok(())
    }

    fn free_pbuf(&mut self, _pbuf: Pbuf) {
        self.stats.frees += 1;
    }

    fn is_link_up(&self) -> bool {
        self.link_up
    }

    fn set_link_up(&mut self) {
        self.link_up = true;
        self.link_events.push(LinkTransition::Up);
    }

    fn set_link_down(&mut self) {
        self.link_up = false;
        self.link_events.push(LinkTransition::Down);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_budget_limits_successful_allocations() {
        let mut netif = MemoryNetif::new(2);
        netif.set_alloc_budget(Some(1));
        assert!(netif.alloc_pbuf(10).is_some());
        assert!(netif.alloc_pbuf(10).is_none());
        netif.set_alloc_budget(None);
        assert!(netif.alloc_pbuf(12).is_some());

        let stats = netif.stats();
        assert_eq!(stats.allocs, 2);
        assert_eq!(stats.alloc_failures, 1);
        assert_eq!(netif.alloc_sizes(), &[10, 12]);
        assert_eq!(netif.outstanding_pbufs(), 2);
    }

    #[test]
    fn input_strips_pad_and_rejection_returns_buffer() {
        let mut netif = MemoryNetif::new(2);
        netif.reject_next_inputs(1);

        let err = netif
            .input(Pbuf::from_frame(2, &[1, 2, 3]))
            .unwrap_err();
        assert_eq!(err.error, NetError::Rejected);
        assert_eq!(err.pbuf.tot_len(), 5);

        netif.input(Pbuf::from_frame(2, &[4, 5])).unwrap();
        assert_eq!(netif.drain_rx_frames(), vec![vec![4, 5]]);
        assert!(netif.drain_rx_frames().is_empty());
        assert_eq!(netif.stats().rejected, 1);
        assert_eq!(netif.stats().inputs, 1);
    }

    #[test]
    fn link_changes_are_recorded_but_forced_state_is_not() {
        let mut netif = MemoryNetif::new(0);
        netif.force_link(true);
        assert!(netif.is_link_up());
        netif.set_link_down();
        netif.set_link_up();
        assert_eq!(
            netif.drain_link_events(),
            vec![LinkTransition::Down, LinkTransition::Up]
        );
        assert!(netif.link_events().is_empty());
    }
}
