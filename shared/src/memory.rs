//! Type 2 Tag memory image
//!
//! The image is a flat byte buffer addressed in 4-byte blocks:
//!
//! ```text
//! block 0..=1   manufacturer data / serial number
//! block 2       internal + static lock bytes
//! block 3       Capability Container (CC)
//! block 4..     user data area
//! ```
//!
//! The image is immutable for the lifetime of the emulator; the handler
//! only ever reads from it.

use thiserror::Error;

use crate::tag::{BLOCK_SIZE, CC_BLOCK, MIN_BLOCKS, READ_RESPONSE_LEN};

/// Errors rejecting an invalid image at construction time
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryImageError {
    #[error("image length {0} is not a multiple of the {BLOCK_SIZE}-byte block size")]
    UnalignedLength(usize),

    #[error("image has {0} blocks, need at least {MIN_BLOCKS}")]
    TooFewBlocks(usize),
}

/// A fixed Type 2 Tag memory image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryImage {
    bytes: Vec<u8>,
}

impl MemoryImage {
    /// Build an image from raw bytes, validating block alignment and the
    /// minimum size (serial + lock + CC blocks must exist).
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, MemoryImageError> {
        let bytes = bytes.into();
        if bytes.len() % BLOCK_SIZE != 0 {
            return Err(MemoryImageError::UnalignedLength(bytes.len()));
        }
        let blocks = bytes.len() / BLOCK_SIZE;
        if blocks < MIN_BLOCKS {
            return Err(MemoryImageError::TooFewBlocks(blocks));
        }
        Ok(Self { bytes })
    }

    /// Total image length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of 4-byte blocks
    pub fn block_count(&self) -> usize {
        self.bytes.len() / BLOCK_SIZE
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The 16-byte window starting at `block`, as returned by a READ.
    ///
    /// Returns `None` when the window would run past the end of the image;
    /// callers must treat that as an out-of-range request rather than
    /// reading adjacent memory.
    pub fn read_window(&self, block: u8) -> Option<&[u8]> {
        let start = block as usize * BLOCK_SIZE;
        let end = start.checked_add(READ_RESPONSE_LEN)?;
        self.bytes.get(start..end)
    }

    /// Decode the Capability Container from block 3.
    pub fn capability_container(&self) -> CapabilityContainer {
        let cc_offset = CC_BLOCK * BLOCK_SIZE;
        let cc: [u8; 4] = self.bytes[cc_offset..cc_offset + BLOCK_SIZE]
            .try_into()
            .expect("image shorter than the CC block");
        CapabilityContainer::from_block(cc)
    }

    /// The 28-byte demo image the emulator ships by default: zeroed serial,
    /// locked data area, CC announcing a read-only 48-byte data area, and
    /// "Hello World!" as user data.
    pub fn demo_hello_world() -> Self {
        #[rustfmt::skip]
        const IMAGE: [u8; 28] = [
            0x00, 0x00, 0x00, 0x00, // block 0
            0x00, 0x00, 0x00, 0x00, // block 1
            0x00, 0x00, 0xFF, 0xFF, // block 2, static lock bytes: all locked
            0xE1, 0x10, 0x06, 0x0F, // block 3, CC: v1.0, 48-byte area, read-only
            0x48, 0x65, 0x6C, 0x6C, // "Hell"
            0x6F, 0x20, 0x57, 0x6F, // "o Wo"
            0x72, 0x6C, 0x64, 0x21, // "rld!"
        ];
        Self { bytes: IMAGE.to_vec() }
    }

    /// A 64-byte demo image whose data area holds an NDEF message with a
    /// Smart Poster pointing at <https://libnfc.org>, wrapped in the usual
    /// TLV (0x03, length 0x21) and padded with zeros to fill the 48-byte
    /// area announced by the CC.
    pub fn demo_ndef_uri() -> Self {
        #[rustfmt::skip]
        const IMAGE: [u8; 64] = [
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0xFF, 0xFF,
            0xE1, 0x10, 0x06, 0x0F,

            0x03, 0x21, 0xD1, 0x02, // NDEF TLV, Smart Poster record
            0x1C, 0x53, 0x70, 0x91,
            0x01, 0x09, 0x54, 0x02,
            0x65, 0x6E, 0x4C, 0x69, // "enLi"

            0x62, 0x6E, 0x66, 0x63, // "bnfc"
            0x51, 0x01, 0x0B, 0x55,
            0x03, 0x6C, 0x69, 0x62, // URI: "libnfc.org"
            0x6E, 0x66, 0x63, 0x2E,

            0x6F, 0x72, 0x67, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
        ];
        Self { bytes: IMAGE.to_vec() }
    }
}

/// Decoded view of the Capability Container block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityContainer {
    /// Magic byte, 0xE1 for an NDEF-formatted tag
    pub magic: u8,
    /// Mapping version, major in the high nibble (0x10 = 1.0)
    pub version: u8,
    /// Data area size in bytes (raw CC byte times 8)
    pub data_area_size: usize,
    /// Raw access byte; high nibble read access, low nibble write access
    pub access: u8,
}

impl CapabilityContainer {
    /// NDEF magic number
    pub const MAGIC_NDEF: u8 = 0xE1;

    pub fn from_block(cc: [u8; 4]) -> Self {
        Self {
            magic: cc[0],
            version: cc[1],
            data_area_size: cc[2] as usize * 8,
            access: cc[3],
        }
    }

    pub fn is_ndef(&self) -> bool {
        self.magic == Self::MAGIC_NDEF
    }

    /// Write access prohibited (low nibble 0xF)
    pub fn is_read_only(&self) -> bool {
        self.access & 0x0F == 0x0F
    }
}
