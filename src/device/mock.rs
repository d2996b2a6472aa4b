//! Scripted device for engine tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::device::{DeviceAbort, DeviceError, TargetDevice};
use crate::target::TargetDescriptor;

/// Plays back a fixed list of command frames and records every response
pub struct MockDevice {
    script: VecDeque<Vec<u8>>,
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
    aborted: Arc<AtomicBool>,
}

impl MockDevice {
    pub fn new<I, F>(script: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<Vec<u8>>,
    {
        Self {
            script: script.into_iter().map(Into::into).collect(),
            sent: Arc::new(Mutex::new(Vec::new())),
            aborted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared view of the frames the engine sent back
    pub fn sent_frames(&self) -> Arc<Mutex<Vec<Vec<u8>>>> {
        self.sent.clone()
    }

    fn next_frame(&mut self) -> Result<Vec<u8>, DeviceError> {
        if self.aborted.load(Ordering::SeqCst) {
            return Err(DeviceError::Aborted);
        }
        self.script.pop_front().ok_or(DeviceError::Disconnected)
    }
}

impl TargetDevice for MockDevice {
    fn name(&self) -> &str {
        "mock"
    }

    fn target_init(&mut self, _target: &TargetDescriptor) -> Result<Vec<u8>, DeviceError> {
        self.next_frame()
    }

    fn receive(&mut self) -> Result<Vec<u8>, DeviceError> {
        self.next_frame()
    }

    fn send(&mut self, frame: &[u8]) -> Result<(), DeviceError> {
        self.sent.lock().unwrap().push(frame.to_vec());
        Ok(())
    }

    fn abort_handle(&self) -> Box<dyn DeviceAbort> {
        struct MockAbort(Arc<AtomicBool>);
        impl DeviceAbort for MockAbort {
            fn abort(&self) {
                self.0.store(true, Ordering::SeqCst);
            }
        }
        Box::new(MockAbort(self.aborted.clone()))
    }
}
