use netif_driver::MacAddr;
use thiserror::Error;

/// A failed [`RndisDevice::send`], carrying the device's raw negative status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("RNDIS send failed with status {code}")]
pub struct DeviceSendError {
    pub code: i32,
}

impl DeviceSendError {
    /// Interpret a C-style signed send status: non-negative is a byte count, negative an error.
    pub fn check(status: i32) -> Result<usize, DeviceSendError> {
        usize::try_from(status).map_err(|_| DeviceSendError { code: status })
    }
}

/// The USB RNDIS device as consumed by the driver adapter.
///
/// Enumeration, the control channel, and bulk transfer scheduling all live behind this trait.
/// Every call is expected to return immediately, either with data or with a "nothing ready"
/// answer.
pub trait RndisDevice {
    /// Hardware address reported by the device. May be all zeroes before the device has been
    /// queried; that is the device's concern.
    fn mac_address(&self) -> MacAddr;

    /// Whether the device is enumerated and its data path is open.
    fn is_up(&self) -> bool;

    /// Receive the next inbound frame.
    ///
    /// With `dst = None` this is a length-only probe: it returns the size of the next queued
    /// frame (0 if none) and leaves the frame queued. With `Some(dst)` the frame is copied into
    /// `dst`, dequeued, and the copied length returned.
    fn recv(&mut self, dst: Option<&mut [u8]>) -> usize;

    /// Transmit one frame.
    ///
    /// `packet` is `packet_header_len() + payload_len` bytes: header space the device fills
    /// in, followed by the Ethernet frame.
    fn send(&mut self, packet: &mut [u8], payload_len: usize) -> Result<usize, DeviceSendError>;

    /// Bytes the device needs in front of every outbound frame.
    fn packet_header_len(&self) -> usize;

    /// Length of the next queued inbound frame, or 0.
    fn peek_len(&mut self) -> usize {
        self.recv(None)
    }
}

impl<T: RndisDevice + ?Sized> RndisDevice for &mut T {
    fn mac_address(&self) -> MacAddr {
        <T as RndisDevice>::mac_address(&**self)
    }

    fn is_up(&self) -> bool {
        <T as RndisDevice>::is_up(&**self)
    }

    fn recv(&mut self, dst: Option<&mut [u8]>) -> usize {
        <T as RndisDevice>::recv(&mut **self, dst)
    }

    fn send(&mut self, packet: &mut [u8], payload_len: usize) -> Result<usize, DeviceSendError> {
        <T as RndisDevice>::send(&mut **self, packet, payload_len)
    }

    fn packet_header_len(&self) -> usize {
        <T as RndisDevice>::packet_header_len(&**self)
    }

    fn peek_len(&mut self) -> usize {
        <T as RndisDevice>::peek_len(&mut **self)
    }
}

impl<T: RndisDevice + ?Sized> RndisDevice for Box<T> {
    fn mac_address(&self) -> MacAddr {
        <T as RndisDevice>::mac_address(&**self)
    }

    fn is_up(&self) -> bool {
        <T as RndisDevice>::is_up(&**self)
    }

    fn recv(&mut self, dst: Option<&mut [u8]>) -> usize {
        <T as RndisDevice>::recv(&mut **self, dst)
    }

    fn send(&mut self, packet: &mut [u8], payload_len: usize) -> Result<usize, DeviceSendError> {
        <T as RndisDevice>::send(&mut **self, packet, payload_len)
    }

    fn packet_header_len(&self) -> usize {
        <T as RndisDevice>::packet_header_len(&**self)
    }

    fn peek_len(&mut self) -> usize {
        <T as RndisDevice>::peek_len(&mut **self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_maps_sign_to_result() {
        assert_eq!(DeviceSendError::check(0), Ok(0));
        assert_eq!(DeviceSendError::check(1514), Ok(1514));
        assert_eq!(
            DeviceSendError::check(-1),
            Err(DeviceSendError { code: -1 })
        );
        assert_eq!(
            DeviceSendError::check(i32::MIN).unwrap_err().to_string(),
            format!("RNDIS send failed with status {}", i32::MIN)
        );
    }
}
