//! The process-wide RNDIS device handle.
//!
//! Only one physical adapter is supported, so the device lives in a `static` that is set once
//! during bring-up (after USB enumeration has produced it) and is never torn down. The stack's
//! poll loop reaches it through [`GlobalRndis`].
//!
//! The mutex makes the handle safe to touch from more than one thread, but the driver contract
//! still assumes a single poll thread: interleaving `proc_input` and `output` from different
//! threads is serialized per call, not per poll cycle.

use std::sync::{Mutex, OnceLock};

use netif_driver::MacAddr;
use thiserror::Error;

use crate::device::{DeviceSendError, RndisDevice};

type SharedDevice = Mutex<Box<dyn RndisDevice + Send>>;

static DEVICE: OnceLock<SharedDevice> = OnceLock::new();

/// Status reported by [`GlobalRndis::send`] while no device is installed.
pub const STATUS_NO_DEVICE: i32 = -19;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GlobalDeviceError {
    #[error("an RNDIS device is already installed")]
    AlreadyInstalled,
}

/// Install the process-wide device. Fails if one is already installed.
pub fn install_device<D>(device: D) -> Result<(), GlobalDeviceError>
where
    D: RndisDevice + Send + 'static,
{
    DEVICE
        .set(Mutex::new(Box::new(device)))
        .map_err(|_| GlobalDeviceError::AlreadyInstalled)?;
    tracing::debug!("RNDIS device installed");
    Ok(())
}

pub fn is_installed() -> bool {
    DEVICE.get().is_some()
}

/// Run `f` against the installed device, or return `None` if there is none yet.
pub fn with_device<R>(f: impl FnOnce(&mut dyn RndisDevice) -> R) -> Option<R> {
    let device = DEVICE.get()?;
    let mut guard = device.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    Some(f(&mut **guard))
}

/// Handle to the process-wide device.
///
/// Before a device is installed it behaves like an absent adapter: down, nothing to receive, a
/// zero MAC, and every send fails with [`STATUS_NO_DEVICE`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalRndis;

impl RndisDevice for GlobalRndis {
    fn mac_address(&self) -> MacAddr {
        with_device(|dev| dev.mac_address()).unwrap_or(MacAddr::ZERO)
    }

    fn is_up(&self) -> bool {
        with_device(|dev| dev.is_up()).unwrap_or(false)
    }

    fn recv(&mut self, dst: Option<&mut [u8]>) -> usize {
        with_device(|dev| dev.recv(dst)).unwrap_or(0)
    }

    fn send(&mut self, packet: &mut [u8], payload_len: usize) -> Result<usize, DeviceSendError> {
        with_device(|dev| dev.send(packet, payload_len)).unwrap_or(Err(DeviceSendError {
            code: STATUS_NO_DEVICE,
        }))
    }

    fn packet_header_len(&self) -> usize {
        with_device(|dev| dev.packet_header_len()).unwrap_or(0)
    }
}
