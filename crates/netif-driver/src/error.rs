use thiserror::Error;

/// Errors crossing the driver/stack boundary.
///
/// The boundary only distinguishes "out of memory" from "generic failure"; variants beyond
/// [`NetError::OutOfMemory`] exist for diagnostics and all map to the generic class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NetError {
    /// A packet buffer could not be obtained.
    #[error("out of memory")]
    OutOfMemory,

    /// The device refused or failed to transmit a frame.
    ///
    /// `status` is the raw (negative) device status and is informational only.
    #[error("transmit failed (device status {status})")]
    Transmit { status: i32 },

    /// The stack's input path refused an inbound packet.
    #[error("inbound packet rejected by the stack")]
    Rejected,
}

impl NetError {
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, NetError::OutOfMemory)
    }
}
