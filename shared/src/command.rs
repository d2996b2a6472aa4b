//! Type 2 Tag command frames
//!
//! A command frame is an opcode byte followed by opcode-specific
//! parameters. Only READ and HALT are acted on; WRITE and SECTOR_SELECT
//! exist so an unsupported command can be named in diagnostics.

use thiserror::Error;

/// READ: returns four blocks starting at the addressed block
pub const READ: u8 = 0x30;
/// HALT: the initiator is done with the tag
pub const HALT: u8 = 0x50;
/// WRITE: not supported by this emulator
pub const WRITE: u8 = 0xA2;
/// SECTOR_SELECT: not supported by this emulator
pub const SECTOR_SELECT: u8 = 0xC2;

/// A decoded command frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// READ of the 16-byte window starting at `block`
    Read { block: u8 },
    /// HALT, ending the session
    Halt,
}

impl Command {
    /// Decode a raw command frame.
    ///
    /// Unknown opcodes come back as `Unsupported` carrying the raw first
    /// byte. Frames too short for their opcode are `Malformed` instead of
    /// being read past their end.
    pub fn parse(frame: &[u8]) -> Result<Self, CommandError> {
        let opcode = *frame.first().ok_or(CommandError::Malformed("empty frame"))?;
        match opcode {
            READ => {
                let block = *frame
                    .get(1)
                    .ok_or(CommandError::Malformed("READ without a block index"))?;
                Ok(Command::Read { block })
            }
            HALT => Ok(Command::Halt),
            other => Err(CommandError::Unsupported(other)),
        }
    }
}

/// Errors produced by command decoding and handling.
///
/// `ConnectionAborted` is not a true failure: it is how a HALT is
/// surfaced to the emulation engine, which ends the session cleanly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("output buffer too small: need {needed} bytes, have {available}")]
    InsufficientBuffer { needed: usize, available: usize },

    #[error("session halted by the initiator")]
    ConnectionAborted,

    #[error("unsupported command 0x{0:02X}")]
    Unsupported(u8),

    #[error("malformed command frame: {0}")]
    Malformed(&'static str),

    #[error("block {block} out of range for a {blocks}-block image")]
    OutOfRange { block: u8, blocks: usize },
}

impl CommandError {
    /// Platform-style error code used at the device boundary, where the
    /// convention is a negated errno value.
    pub fn errno(&self) -> i32 {
        match self {
            CommandError::InsufficientBuffer { .. } => 28, // ENOSPC
            CommandError::ConnectionAborted => 103,        // ECONNABORTED
            CommandError::Unsupported(_) => 95,            // ENOTSUP
            CommandError::Malformed(_) => 22,              // EINVAL
            CommandError::OutOfRange { .. } => 22,         // EINVAL
        }
    }

    /// True for the HALT control signal, which ends a session without
    /// being an error to report.
    pub fn is_session_end(&self) -> bool {
        matches!(self, CommandError::ConnectionAborted)
    }
}
