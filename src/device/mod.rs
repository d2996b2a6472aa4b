//! Reader device abstraction for pluggable emulation backends
//!
//! The emulation session drives one device through a blocking,
//! frame-at-a-time interface: initialize as a target, then alternate
//! receive/send until the session ends. A backend for a physical reader
//! implements the same trait; the shipped backend moves frames as hex
//! lines over a byte pipe, which is enough to exercise NFC-reading
//! software against the emulated tag.

pub mod hexpipe;

#[cfg(test)]
pub mod mock;

use thiserror::Error;

use crate::target::TargetDescriptor;

/// Errors from the device layer
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("device I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("peer sent an unreadable frame: {0}")]
    BadFrame(String),

    #[error("link closed by the peer")]
    Disconnected,

    #[error("device operation aborted")]
    Aborted,
}

/// Requests cancellation of whatever device operation is in flight.
///
/// Handles are held by the signal path and must be callable from another
/// thread while the session loop is blocked in the device.
pub trait DeviceAbort: Send + Sync {
    fn abort(&self);
}

/// A reader device operated as an emulated tag target
pub trait TargetDevice: Send {
    /// Human-readable device name for startup logging
    fn name(&self) -> &str;

    /// Present `target` to initiators and block until one selects it,
    /// returning the first received command frame.
    fn target_init(&mut self, target: &TargetDescriptor) -> Result<Vec<u8>, DeviceError>;

    /// Block until the next command frame arrives.
    fn receive(&mut self) -> Result<Vec<u8>, DeviceError>;

    /// Send one response frame back to the initiator.
    fn send(&mut self, frame: &[u8]) -> Result<(), DeviceError>;

    /// Handle that can interrupt this device from another thread.
    fn abort_handle(&self) -> Box<dyn DeviceAbort>;
}
