//! Deterministic camera backend for tests and the CLI mock path.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::backend::{FrameSource, LiveStream, RawFrame};
use super::CameraError;

/// Scripted camera backend producing solid-color test frames.
///
/// Counts acquisition attempts, successful opens, and stream stops so tests
/// can assert the no-leaked-handle property (opens == stops once a session
/// is over).
pub struct MockCamera {
    width: u32,
    height: u32,
    fill: [u8; 4],
    persistent_failure: Option<CameraError>,
    scripted_failures: Mutex<VecDeque<CameraError>>,
    attempts: AtomicUsize,
    opens: AtomicUsize,
    stops: Arc<AtomicUsize>,
}

impl MockCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            fill: [30, 140, 60, 255],
            persistent_failure: None,
            scripted_failures: Mutex::new(VecDeque::new()),
            attempts: AtomicUsize::new(0),
            opens: AtomicUsize::new(0),
            stops: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Backend that fails every acquisition with the given error.
    pub fn failing(error: CameraError) -> Self {
        Self {
            persistent_failure: Some(error),
            ..Self::new(0, 0)
        }
    }

    /// Queue an error for the next acquisition attempt only.
    pub fn fail_next(&self, error: CameraError) {
        self.scripted_failures
            .lock()
            .expect("mock failure queue poisoned")
            .push_back(error);
    }

    /// Acquisition attempts made, successful or not.
    pub fn attempt_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Streams successfully opened.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Streams stopped.
    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FrameSource for MockCamera {
    async fn open(&self) -> Result<Box<dyn LiveStream>, CameraError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self
            .scripted_failures
            .lock()
            .expect("mock failure queue poisoned")
            .pop_front()
        {
            return Err(err);
        }
        if let Some(err) = &self.persistent_failure {
            return Err(err.clone());
        }

        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockStream {
            width: self.width,
            height: self.height,
            fill: self.fill,
            stopped: false,
            stops: Arc::clone(&self.stops),
        }))
    }
}

struct MockStream {
    width: u32,
    height: u32,
    fill: [u8; 4],
    stopped: bool,
    stops: Arc<AtomicUsize>,
}

#[async_trait]
impl LiveStream for MockStream {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    async fn read_frame(&mut self) -> Result<RawFrame, CameraError> {
        if self.stopped {
            return Err(CameraError::DeviceUnavailable);
        }

        let pixel_count = self.width as usize * self.height as usize;
        let mut pixels = Vec::with_capacity(pixel_count * 4);
        for _ in 0..pixel_count {
            pixels.extend_from_slice(&self.fill);
        }
        Ok(RawFrame {
            width: self.width,
            height: self.height,
            pixels,
        })
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_attempts_and_opens() {
        let camera = MockCamera::new(8, 8);
        camera.fail_next(CameraError::DeviceUnavailable);

        assert!(camera.open().await.is_err());
        assert!(camera.open().await.is_ok());

        assert_eq!(camera.attempt_count(), 2);
        assert_eq!(camera.open_count(), 1);
    }

    #[tokio::test]
    async fn frames_match_dimensions() {
        let camera = MockCamera::new(8, 6);
        let mut stream = camera.open().await.unwrap();
        let frame = stream.read_frame().await.unwrap();
        assert_eq!((frame.width, frame.height), (8, 6));
        assert_eq!(frame.pixels.len(), frame.expected_len());
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let camera = MockCamera::new(8, 8);
        let mut stream = camera.open().await.unwrap();
        stream.stop();
        stream.stop();
        assert_eq!(camera.stop_count(), 1);
        assert!(stream.read_frame().await.is_err());
    }
}
