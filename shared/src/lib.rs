//! Emutag Shared Tag Model
//!
//! This crate provides the NFC Forum Type 2 Tag memory model and the
//! command handler used by the emutag emulator binary. It is pure logic:
//! the reader device and the emulation session live in the binary crate.

pub mod command;
pub mod handler;
pub mod memory;

pub use command::{Command, CommandError};
pub use handler::TagHandler;
pub use memory::{CapabilityContainer, MemoryImage, MemoryImageError};

/// Type 2 Tag layout parameters
pub mod tag {
    /// Bytes per memory block
    pub const BLOCK_SIZE: usize = 4;

    /// Minimum number of blocks in a valid image (serial, lock and CC area)
    pub const MIN_BLOCKS: usize = 4;

    /// Block holding the Capability Container
    pub const CC_BLOCK: usize = 3;

    /// First block of the user data area
    pub const DATA_AREA_FIRST_BLOCK: usize = 4;

    /// A READ response always carries four consecutive blocks
    pub const READ_RESPONSE_LEN: usize = 16;
}
