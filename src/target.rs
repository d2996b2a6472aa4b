//! Emulated target identity
//!
//! The descriptor is handed to the device layer once, at startup; the
//! device (or the reader library behind it) uses it for anti-collision
//! and selection before any command frame reaches the handler.

/// Target technology. Only ISO14443A is emulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Modulation {
    #[default]
    Iso14443a,
}

impl std::fmt::Display for Modulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Modulation::Iso14443a => write!(f, "ISO14443A"),
        }
    }
}

/// ISO14443A identity of the emulated tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDescriptor {
    pub modulation: Modulation,
    /// Answer To Request A
    pub atqa: [u8; 2],
    /// Unique identifier (4, 7 or 10 bytes)
    pub uid: Vec<u8>,
    /// Select acknowledge
    pub sak: u8,
    /// Answer To Select; empty for a Type 2 Tag
    pub ats: Vec<u8>,
}

impl TargetDescriptor {
    /// The fixed identity of the emulated Type 2 Tag. The leading 0x08 in
    /// the UID marks it as randomly generated, which keeps readers from
    /// treating it as a real manufacturer serial.
    pub fn type2_demo() -> Self {
        Self {
            modulation: Modulation::Iso14443a,
            atqa: [0x00, 0x04],
            uid: vec![0x08, 0x00, 0xB0, 0x0B],
            sak: 0x00,
            ats: Vec::new(),
        }
    }
}

impl std::fmt::Display for TargetDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ATQA={} UID={} SAK={:02x}",
            self.modulation,
            hex::encode(self.atqa),
            hex::encode(&self.uid),
            self.sak
        )
    }
}
