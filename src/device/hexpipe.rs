//! Hex-line pipe backend
//!
//! Frames travel as one hex-encoded line per frame over any
//! `BufRead`/`Write` pair, stdio by default. Blank lines and lines
//! starting with `#` are skipped on the way in, so command scripts can be
//! annotated. Every response goes back out as a hex line.
//!
//! There is no anti-collision on a pipe: the target descriptor is only
//! logged, and the first line received counts as the first command frame
//! from an already-selected initiator.

use std::io::{self, BufRead, BufReader, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::device::{DeviceAbort, DeviceError, TargetDevice};
use crate::target::TargetDescriptor;

pub struct HexPipeDevice<R, W> {
    name: String,
    reader: R,
    writer: W,
    aborted: Arc<AtomicBool>,
}

impl HexPipeDevice<BufReader<io::Stdin>, io::Stdout> {
    /// Pipe device over the process's stdin/stdout
    pub fn stdio() -> Self {
        Self::new("hexpipe(stdio)", BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> HexPipeDevice<R, W> {
    pub fn new(name: impl Into<String>, reader: R, writer: W) -> Self {
        Self {
            name: name.into(),
            reader,
            writer,
            aborted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Next command frame: first non-blank, non-comment line, hex-decoded.
    ///
    /// An abort request takes effect at the next line boundary; a blocked
    /// read ends when the peer closes the pipe.
    fn read_frame(&mut self) -> Result<Vec<u8>, DeviceError> {
        loop {
            if self.aborted.load(Ordering::SeqCst) {
                return Err(DeviceError::Aborted);
            }
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Err(DeviceError::Disconnected);
            }
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
            return hex::decode(&compact)
                .map_err(|err| DeviceError::BadFrame(format!("{trimmed:?}: {err}")));
        }
    }
}

impl<R: BufRead + Send, W: Write + Send> TargetDevice for HexPipeDevice<R, W> {
    fn name(&self) -> &str {
        &self.name
    }

    fn target_init(&mut self, target: &TargetDescriptor) -> Result<Vec<u8>, DeviceError> {
        info!(%target, "target registered on {}", self.name);
        self.read_frame()
    }

    fn receive(&mut self) -> Result<Vec<u8>, DeviceError> {
        self.read_frame()
    }

    fn send(&mut self, frame: &[u8]) -> Result<(), DeviceError> {
        debug!(frame = %hex::encode(frame), "frame out");
        writeln!(self.writer, "{}", hex::encode(frame))?;
        self.writer.flush()?;
        Ok(())
    }

    fn abort_handle(&self) -> Box<dyn DeviceAbort> {
        Box::new(PipeAbort(self.aborted.clone()))
    }
}

struct PipeAbort(Arc<AtomicBool>);

impl DeviceAbort for PipeAbort {
    fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}
