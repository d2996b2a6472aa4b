//! Emulation session
//!
//! Owns the device handle, the target descriptor and the command handler
//! for one emulation run, and drives the serial frame loop: receive a
//! command, hand it to the tag handler, send the response. The loop runs
//! until the initiator halts the session, the operator aborts it, the
//! link closes, or a command fails.

use tracing::{info, warn};

use emutag_shared::{CommandError, TagHandler};

use crate::device::{DeviceAbort, DeviceError, TargetDevice};
use crate::target::TargetDescriptor;

/// Response buffer capacity offered to the handler, the largest frame an
/// ISO14443 initiator can ask for
pub const MAX_RESPONSE_LEN: usize = 262;

/// Why a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    /// Initiator sent HALT
    Halted,
    /// Operator requested an abort (interrupt signal)
    Aborted,
    /// The device link closed
    Disconnected,
    /// A command failed; reported upward, ends the run like the reader
    /// library's own engine would
    CommandFailed(CommandError),
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndReason::Halted => write!(f, "halted by initiator"),
            EndReason::Aborted => write!(f, "aborted by operator"),
            EndReason::Disconnected => write!(f, "link closed"),
            EndReason::CommandFailed(err) => write!(f, "command failed: {err}"),
        }
    }
}

/// Outcome of a completed session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Command frames answered successfully
    pub frames_handled: u64,
    pub end: EndReason,
}

/// One emulation run over one device
pub struct EmulationSession {
    device: Box<dyn TargetDevice>,
    target: TargetDescriptor,
    handler: TagHandler,
}

impl EmulationSession {
    pub fn new(device: Box<dyn TargetDevice>, target: TargetDescriptor, handler: TagHandler) -> Self {
        Self { device, target, handler }
    }

    pub fn device_name(&self) -> &str {
        self.device.name()
    }

    /// Abort handle for the signal path; interrupts the in-flight device
    /// operation from another thread.
    pub fn abort_handle(&self) -> Box<dyn DeviceAbort> {
        self.device.abort_handle()
    }

    /// Run the session to completion.
    ///
    /// `Err` is reserved for device failures that prevent or break the
    /// run; every protocol-level outcome, including a failed command,
    /// comes back as a `SessionSummary`.
    pub fn run(mut self) -> Result<SessionSummary, DeviceError> {
        info!(target = %self.target, "emulating Type 2 Tag, waiting for an initiator");

        let mut frames_handled = 0u64;
        let mut response = [0u8; MAX_RESPONSE_LEN];

        let mut frame = match self.device.target_init(&self.target) {
            Ok(frame) => frame,
            Err(err) => return Self::end_without_session(frames_handled, err),
        };

        loop {
            match self.handler.handle(&frame, &mut response) {
                Ok(len) => {
                    self.device.send(&response[..len])?;
                    frames_handled += 1;
                }
                Err(err) if err.is_session_end() => {
                    info!(frames_handled, "halt received, session closed");
                    return Ok(SessionSummary { frames_handled, end: EndReason::Halted });
                }
                Err(err) => {
                    // Boundary convention: negated errno, as the reader
                    // library reports it
                    warn!(code = -err.errno(), "{err}");
                    return Ok(SessionSummary {
                        frames_handled,
                        end: EndReason::CommandFailed(err),
                    });
                }
            }

            frame = match self.device.receive() {
                Ok(frame) => frame,
                Err(err) => return Self::end_without_session(frames_handled, err),
            };
        }
    }

    fn end_without_session(
        frames_handled: u64,
        err: DeviceError,
    ) -> Result<SessionSummary, DeviceError> {
        let end = match err {
            DeviceError::Aborted => EndReason::Aborted,
            DeviceError::Disconnected => EndReason::Disconnected,
            err => return Err(err),
        };
        Ok(SessionSummary { frames_handled, end })
    }
}
