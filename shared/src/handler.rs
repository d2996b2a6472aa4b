//! Tag command handler
//!
//! One invocation per received command frame, driven serially by the
//! emulation engine. Each call is independent; the only shared state is
//! the read-only memory image.

use tracing::{debug, trace, warn};

use crate::command::{Command, CommandError};
use crate::memory::MemoryImage;
use crate::tag::READ_RESPONSE_LEN;

/// Answers Type 2 Tag commands against a fixed memory image
#[derive(Debug, Clone)]
pub struct TagHandler {
    image: MemoryImage,
}

impl TagHandler {
    pub fn new(image: MemoryImage) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &MemoryImage {
        &self.image
    }

    /// Handle one command frame, writing any response into `response` and
    /// returning the number of response bytes.
    ///
    /// READ requires a response buffer of at least 16 bytes; the capacity
    /// is checked before the block index, so an undersized buffer always
    /// reports `InsufficientBuffer`. HALT never produces output and comes
    /// back as `ConnectionAborted`, the session-end signal.
    pub fn handle(&self, frame: &[u8], response: &mut [u8]) -> Result<usize, CommandError> {
        trace!(frame = %hex::encode(frame), "command in");

        match Command::parse(frame)? {
            Command::Read { block } => {
                if response.len() < READ_RESPONSE_LEN {
                    return Err(CommandError::InsufficientBuffer {
                        needed: READ_RESPONSE_LEN,
                        available: response.len(),
                    });
                }
                let window = self.image.read_window(block).ok_or_else(|| {
                    warn!(block, blocks = self.image.block_count(), "READ out of range");
                    CommandError::OutOfRange {
                        block,
                        blocks: self.image.block_count(),
                    }
                })?;
                response[..READ_RESPONSE_LEN].copy_from_slice(window);
                debug!(block, response = %hex::encode(&response[..READ_RESPONSE_LEN]), "READ");
                Ok(READ_RESPONSE_LEN)
            }
            Command::Halt => {
                debug!("HALT received");
                Err(CommandError::ConnectionAborted)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command;

    fn demo_handler() -> TagHandler {
        TagHandler::new(MemoryImage::demo_hello_world())
    }

    #[test]
    fn test_read_returns_exact_window_for_all_valid_blocks() {
        let handler = demo_handler();
        let image_len = handler.image().len();
        for block in 0u8..=255 {
            let start = block as usize * 4;
            if start + 16 > image_len {
                continue;
            }
            let mut response = [0u8; 16];
            let n = handler
                .handle(&[command::READ, block], &mut response)
                .expect("valid READ");
            assert_eq!(n, 16);
            assert_eq!(&response, &handler.image().as_bytes()[start..start + 16]);
        }
    }

    #[test]
    fn test_read_block_zero() {
        let handler = demo_handler();
        let mut response = [0u8; 16];
        let n = handler.handle(&[0x30, 0x00], &mut response).unwrap();
        assert_eq!(n, 16);
        assert_eq!(&response, &handler.image().as_bytes()[..16]);
    }

    #[test]
    fn test_read_block_three_spans_cc_and_user_data() {
        let handler = demo_handler();
        let mut response = [0u8; 16];
        let n = handler.handle(&[0x30, 0x03], &mut response).unwrap();
        assert_eq!(n, 16);
        assert_eq!(&response[..4], &[0xE1, 0x10, 0x06, 0x0F]);
        assert_eq!(&response[4..], b"Hello World!");
    }

    #[test]
    fn test_read_with_small_buffer_fails_insufficient() {
        let handler = demo_handler();
        let mut response = [0u8; 8];
        let err = handler.handle(&[0x30, 0x00], &mut response).unwrap_err();
        assert_eq!(
            err,
            CommandError::InsufficientBuffer { needed: 16, available: 8 }
        );
        // Capacity is checked before the index, so even a wild index
        // reports the buffer first
        let err = handler.handle(&[0x30, 0xFF], &mut response).unwrap_err();
        assert_eq!(
            err,
            CommandError::InsufficientBuffer { needed: 16, available: 8 }
        );
    }

    #[test]
    fn test_read_out_of_range_is_rejected() {
        let handler = demo_handler();
        let mut response = [0u8; 16];
        let err = handler.handle(&[0x30, 0x04], &mut response).unwrap_err();
        assert_eq!(err, CommandError::OutOfRange { block: 4, blocks: 7 });
        assert_eq!(response, [0u8; 16], "no bytes written on rejection");
    }

    #[test]
    fn test_halt_aborts_with_no_output() {
        let handler = demo_handler();
        let mut response = [0u8; 16];
        let err = handler.handle(&[0x50], &mut response).unwrap_err();
        assert_eq!(err, CommandError::ConnectionAborted);
        assert_eq!(response, [0u8; 16]);
    }

    #[test]
    fn test_write_is_unsupported() {
        let handler = demo_handler();
        let mut response = [0u8; 16];
        let err = handler
            .handle(&[0xA2, 0x00, 0xDE, 0xAD, 0xBE, 0xEF], &mut response)
            .unwrap_err();
        assert_eq!(err, CommandError::Unsupported(0xA2));
    }

    #[test]
    fn test_sector_select_is_unsupported() {
        let handler = demo_handler();
        let mut response = [0u8; 16];
        let err = handler.handle(&[0xC2, 0xFF], &mut response).unwrap_err();
        assert_eq!(err, CommandError::Unsupported(0xC2));
    }

    #[test]
    fn test_image_is_never_mutated() {
        let handler = demo_handler();
        let before = handler.image().clone();
        let mut response = [0u8; 16];
        let frames: &[&[u8]] = &[
            &[0x30, 0x00],
            &[0x30, 0x03],
            &[0xA2, 0x00, 0x01, 0x02, 0x03, 0x04],
            &[0xC2, 0x01],
            &[0x30, 0xFF],
            &[0x50],
            &[],
        ];
        for frame in frames {
            let _ = handler.handle(frame, &mut response);
        }
        assert_eq!(handler.image(), &before);
    }
}
