use netif_driver::{MacAddr, NetError, NetifDriver, Pbuf};
use rndis_netif::{
    HeapTxAllocator, QueueRndisDevice, RndisNetifConfig, RndisNetifDriver, TxAllocator, TxBuffer,
    RNDIS_PACKET_MSG_HEADER_LEN, TX_BUFFER_ALIGN,
};

const MAC: MacAddr = MacAddr([0x02, 0x52, 0x4e, 0x44, 0x49, 0x53]);
const PAD: usize = 2;

/// Wraps the heap allocator and records what passes through it.
#[derive(Default)]
struct CountingAllocator {
    inner: HeapTxAllocator,
    fail: bool,
    alloc_sizes: Vec<usize>,
    aligned: Vec<bool>,
    releases: usize,
}

impl TxAllocator for CountingAllocator {
    fn alloc(&mut self, len: usize) -> Option<TxBuffer> {
        self.alloc_sizes.push(len);
        if self.fail {
            return None;
        }
        let buf = self.inner.alloc(len)?;
        self.aligned.push(buf.as_slice().as_ptr() as usize % TX_BUFFER_ALIGN == 0);
        Some(buf)
    }

    fn release(&mut self, buf: TxBuffer) {
        self.releases += 1;
        self.inner.release(buf);
    }
}

fn driver(dev: QueueRndisDevice) -> RndisNetifDriver<QueueRndisDevice, CountingAllocator> {
    RndisNetifDriver::with_allocator(dev, CountingAllocator::default(), RndisNetifConfig::default())
}

fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| i as u8).collect()
}

#[test]
fn frame_is_copied_after_header_space() {
    let mut driver = driver(QueueRndisDevice::new(MAC));
    let frame = payload(100);

    assert_eq!(driver.output(&Pbuf::from_frame(PAD, &frame)), Ok(()));

    let alloc = driver.tx_allocator();
    assert_eq!(alloc.alloc_sizes, vec![RNDIS_PACKET_MSG_HEADER_LEN + 100]);
    assert_eq!(alloc.aligned, vec![true]);
    assert_eq!(alloc.releases, 1);

    let sent = driver.device().tx_packets();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].bytes.len(), 44 + 100);
    assert_eq!(sent[0].payload_len, 100);
    assert_eq!(sent[0].payload(), &frame[..]);
    // The device filled in its REMOTE_NDIS_PACKET_MSG header.
    assert_eq!(&sent[0].bytes[..4], &1u32.to_le_bytes());
    assert_eq!(&sent[0].bytes[4..8], &144u32.to_le_bytes());
}

#[test]
fn chained_pbuf_is_flattened() {
    let mut driver = driver(QueueRndisDevice::new(MAC));
    let frame = payload(90);
    let mut first = vec![0u8; PAD];
    first.extend_from_slice(&frame[..14]);
    let pbuf = Pbuf::from_segments([first, frame[14..40].to_vec(), frame[40..].to_vec()]);
    assert_eq!(pbuf.segment_count(), 3);

    assert_eq!(driver.output(&pbuf), Ok(()));
    assert_eq!(driver.device().tx_packets()[0].payload(), &frame[..]);
    assert_eq!(driver.tx_allocator().releases, 1);
}

#[test]
fn send_failure_is_a_transmit_error() {
    let mut dev = QueueRndisDevice::new(MAC);
    dev.script_send_statuses([-1]);
    let mut driver = driver(dev);

    let result = driver.output(&Pbuf::from_frame(PAD, &payload(100)));
    assert_eq!(result, Err(NetError::Transmit { status: -1 }));

    let alloc = driver.tx_allocator();
    assert_eq!(alloc.alloc_sizes, vec![44 + 100]);
    assert_eq!(alloc.releases, 1);
    assert!(driver.device().tx_packets().is_empty());

    // The script is spent; the next send goes through.
    assert_eq!(driver.output(&Pbuf::from_frame(PAD, &payload(100))), Ok(()));
    assert_eq!(driver.tx_allocator().releases, 2);
}

#[test]
fn allocation_failure_is_out_of_memory() {
    let alloc = CountingAllocator {
        fail: true,
        ..CountingAllocator::default()
    };
    let mut driver = RndisNetifDriver::with_allocator(
        QueueRndisDevice::new(MAC),
        alloc,
        RndisNetifConfig::default(),
    );

    let err = driver.output(&Pbuf::from_frame(PAD, &payload(64))).unwrap_err();
    assert!(err.is_out_of_memory());
    assert_eq!(driver.tx_allocator().releases, 0);
    assert!(driver.device().tx_packets().is_empty());
}

#[test]
fn header_length_comes_from_device() {
    let mut driver = driver(QueueRndisDevice::with_header_len(MAC, 0));
    let frame = payload(60);

    assert_eq!(driver.output(&Pbuf::from_frame(PAD, &frame)), Ok(()));
    assert_eq!(driver.tx_allocator().alloc_sizes, vec![60]);
    assert_eq!(driver.device().tx_packets()[0].bytes, frame);
}

#[test]
fn descriptor_shorter_than_pad_sends_empty_payload() {
    let mut driver = driver(QueueRndisDevice::new(MAC));

    assert_eq!(driver.output(&Pbuf::from_segments([vec![0u8; 1]])), Ok(()));
    assert_eq!(driver.tx_allocator().alloc_sizes, vec![44]);
    assert_eq!(driver.device().tx_packets()[0].payload_len, 0);
}
