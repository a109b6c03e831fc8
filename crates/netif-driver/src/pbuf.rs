//! Stack-owned packet buffers.
//!
//! A [`Pbuf`] is a chain of byte segments. Inbound buffers handed to a driver by
//! [`crate::Netif::alloc_pbuf`] are a single zero-filled segment; outbound buffers passed to
//! [`crate::NetifDriver::output`] may be chained (e.g. headers and payload built separately by
//! different protocol layers).
//!
//! Both directions carry the stack's leading pad region ([`crate::ETH_PAD_SIZE`]) as the first
//! bytes of the chain. It is not frame payload.

/// A chain of packet buffer segments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pbuf {
    segments: Vec<Vec<u8>>,
    tot_len: usize,
}

impl Pbuf {
    /// Allocate a single zero-filled segment of `len` bytes.
    ///
    /// Returns `None` if the allocator cannot satisfy the request.
    pub fn try_alloc(len: usize) -> Option<Self> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(len).ok()?;
        buf.resize(len, 0);
        Some(Self {
            segments: vec![buf],
            tot_len: len,
        })
    }

    /// Build a chain from pre-filled segments.
    pub fn from_segments<I>(segments: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        let segments: Vec<Vec<u8>> = segments.into_iter().collect();
        let tot_len = segments.iter().map(Vec::len).sum();
        Self { segments, tot_len }
    }

    /// Build a single-segment buffer holding `pad` zero bytes followed by `frame`.
    pub fn from_frame(pad: usize, frame: &[u8]) -> Self {
        let mut buf = vec![0u8; pad + frame.len()];
        buf[pad..].copy_from_slice(frame);
        Self::from_segments([buf])
    }

    /// Length of the first segment (lwIP `p->len`).
    pub fn len(&self) -> usize {
        self.segments.first().map_or(0, Vec::len)
    }

    /// Length of the whole chain (lwIP `p->tot_len`).
    pub fn tot_len(&self) -> usize {
        self.tot_len
    }

    pub fn is_empty(&self) -> bool {
        self.tot_len == 0
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Bytes of the first segment.
    pub fn payload(&self) -> &[u8] {
        match self.segments.first() {
            Some(seg) => seg.as_slice(),
            None => &[],
        }
    }

    /// Mutable bytes of the first segment.
    pub fn payload_mut(&mut self) -> &mut [u8] {
        match self.segments.first_mut() {
            Some(seg) => seg.as_mut_slice(),
            None => &mut [],
        }
    }

    /// Shrink the first segment to `len` bytes and recompute `tot_len`.
    ///
    /// Segments never grow, so `len` is clamped to the first segment's current size.
    pub fn set_len(&mut self, len: usize) {
        let Some(first) = self.segments.first_mut() else {
            return;
        };
        first.truncate(len);
        self.tot_len = self.segments.iter().map(Vec::len).sum();
    }

    /// Copy bytes out of the chain starting at byte `offset`, filling as much of `dst` as the
    /// chain allows. Returns the number of bytes copied.
    pub fn copy_partial(&self, dst: &mut [u8], offset: usize) -> usize {
        let mut skip = offset;
        let mut copied = 0;
        for seg in &self.segments {
            if copied == dst.len() {
                break;
            }
            if skip >= seg.len() {
                skip -= seg.len();
                continue;
            }
            let src = &seg[skip..];
            skip = 0;
            let n = src.len().min(dst.len() - copied);
            dst[copied..copied + n].copy_from_slice(&src[..n]);
            copied += n;
        }
        copied
    }

    /// Flatten the chain into one vector.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.tot_len);
        for seg in &self.segments {
            out.extend_from_slice(seg);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::Pbuf;

    #[test]
    fn try_alloc_returns_zeroed_single_segment() {
        let p = Pbuf::try_alloc(62).unwrap();
        assert_eq!(p.len(), 62);
        assert_eq!(p.tot_len(), 62);
        assert_eq!(p.segment_count(), 1);
        assert!(p.payload().iter().all(|&b| b == 0));
    }

    #[test]
    fn set_len_clamps_to_allocated_size() {
        let mut p = Pbuf::try_alloc(10).unwrap();
        p.set_len(4);
        assert_eq!((p.len(), p.tot_len()), (4, 4));
        p.set_len(100);
        assert_eq!((p.len(), p.tot_len()), (4, 4));
    }

    #[test]
    fn copy_partial_walks_segment_boundaries() {
        let p = Pbuf::from_segments([vec![0, 0, 1, 2], vec![3], vec![], vec![4, 5, 6]]);
        assert_eq!(p.tot_len(), 8);
        assert_eq!(p.len(), 4);

        let mut dst = [0u8; 6];
        assert_eq!(p.copy_partial(&mut dst, 2), 6);
        assert_eq!(dst, [1, 2, 3, 4, 5, 6]);

        let mut short = [0u8; 2];
        assert_eq!(p.copy_partial(&mut short, 4), 2);
        assert_eq!(short, [3, 4]);
    }

    #[test]
    fn copy_partial_past_end_copies_nothing() {
        let p = Pbuf::from_frame(2, &[9, 9]);
        let mut dst = [0u8; 4];
        assert_eq!(p.copy_partial(&mut dst, 4), 0);
        assert_eq!(p.copy_partial(&mut dst, 3), 1);
        assert_eq!(dst[0], 9);
    }

    #[test]
    fn empty_chain_is_harmless() {
        let mut p = Pbuf::from_segments(Vec::<Vec<u8>>::new());
        p.set_len(3);
        assert!(p.is_empty());
        assert_eq!(p.len(), 0);
        assert!(p.payload_mut().is_empty());
        assert_eq!(p.copy_partial(&mut [0u8; 3], 0), 0);
    }
}
