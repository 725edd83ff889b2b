//! Hardware seam for live video capture.
//!
//! [`FrameSource`] is the boundary to the OS/driver layer: opening a stream
//! is where permission prompts and device discovery happen. A production
//! backend (V4L2, browser media APIs, ...) plugs in here; the in-tree
//! [`MockCamera`](super::MockCamera) exercises the same contract headlessly.

use std::sync::Arc;

use async_trait::async_trait;

use super::CameraError;

/// A single decoded frame read from a live stream.
///
/// Pixels are tightly packed RGBA8 at the frame's actual dimensions, which
/// may differ from the dimensions negotiated at open time.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RawFrame {
    /// Number of bytes a well-formed frame of these dimensions must carry.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// An open video stream bound to its negotiated dimensions.
#[async_trait]
pub trait LiveStream: Send {
    /// Frame dimensions negotiated when the stream was opened.
    fn dimensions(&self) -> (u32, u32);

    /// Read the most recent frame.
    async fn read_frame(&mut self) -> Result<RawFrame, CameraError>;

    /// Stop the underlying tracks. Must be idempotent.
    fn stop(&mut self);
}

/// Factory for live streams.
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Request access to the device and open a video stream.
    async fn open(&self) -> Result<Box<dyn LiveStream>, CameraError>;
}

#[async_trait]
impl<S: FrameSource + ?Sized> FrameSource for Arc<S> {
    async fn open(&self) -> Result<Box<dyn LiveStream>, CameraError> {
        (**self).open().await
    }
}
