//! Contiguous, cache-line aligned transmit buffers.
//!
//! Outbound pbuf chains are flattened into one [`TxBuffer`] per frame so the device can hand a
//! single DMA-friendly region to the bulk OUT pipe.

use bytemuck::{Pod, Zeroable};

/// Alignment of every [`TxBuffer`], matching the USB controller's DMA cache-line requirement.
pub const TX_BUFFER_ALIGN: usize = 32;

#[repr(C, align(32))]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct TxBlock([u8; TX_BUFFER_ALIGN]);

/// A zero-initialized byte buffer whose first byte is [`TX_BUFFER_ALIGN`]-aligned.
#[derive(Debug)]
pub struct TxBuffer {
    blocks: Vec<TxBlock>,
    len: usize,
}

impl TxBuffer {
    /// Returns `None` if the allocator cannot satisfy the request.
    pub fn try_alloc(len: usize) -> Option<Self> {
        let count = len.div_ceil(TX_BUFFER_ALIGN);
        let mut blocks = Vec::new();
        blocks.try_reserve_exact(count).ok()?;
        blocks.resize(count, TxBlock::zeroed());
        Some(Self { blocks, len })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        &bytemuck::cast_slice(&self.blocks)[..self.len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut bytemuck::cast_slice_mut(&mut self.blocks)[..self.len]
    }
}

/// Source of transmit buffers.
///
/// Every buffer obtained from [`TxAllocator::alloc`] is handed back through
/// [`TxAllocator::release`] exactly once.
pub trait TxAllocator {
    fn alloc(&mut self, len: usize) -> Option<TxBuffer>;

    fn release(&mut self, buf: TxBuffer);
}

/// Allocates from the global heap and frees on release.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapTxAllocator;

impl TxAllocator for HeapTxAllocator {
    fn alloc(&mut self, len: usize) -> Option<TxBuffer> {
        TxBuffer::try_alloc(len)
    }

    fn release(&mut self, buf: TxBuffer) {
        drop(buf);
    }
}

impl<T: TxAllocator + ?Sized> TxAllocator for &mut T {
    fn alloc(&mut self, len: usize) -> Option<TxBuffer> {
        <T as TxAllocator>::alloc(&mut **self, len)
    }

    fn release(&mut self, buf: TxBuffer) {
        <T as TxAllocator>::release(&mut **self, buf)
    }
}
