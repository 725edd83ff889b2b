//! Live camera management.
//!
//! [`CameraDevice`] wraps a single live video-capture resource behind the
//! [`FrameSource`] seam: acquire, read preview frames, snapshot a PNG still,
//! release. It holds at most one live handle at a time, and `release` is
//! idempotent. A leaked open stream is a correctness bug, so the device also
//! releases on drop.

mod backend;
mod mock;

pub use backend::{FrameSource, LiveStream, RawFrame};
pub use mock::MockCamera;

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbaImage};
use thiserror::Error;
use tracing::debug;

use crate::artifact::ImageArtifact;

/// Failure categories for camera acquisition and capture.
///
/// All of these are recoverable via retry; none is fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("no camera device found")]
    DeviceNotFound,

    #[error("camera device unavailable")]
    DeviceUnavailable,

    #[error("camera error: {0}")]
    Other(String),
}

/// An open reference to an acquired stream plus its negotiated dimensions.
pub struct LiveHandle {
    stream: Box<dyn LiveStream>,
    width: u32,
    height: u32,
}

impl LiveHandle {
    /// Dimensions negotiated when the stream was opened.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Manages exactly one live video resource at a time.
pub struct CameraDevice<S: FrameSource> {
    backend: S,
    live: Option<LiveHandle>,
}

impl<S: FrameSource> CameraDevice<S> {
    pub fn new(backend: S) -> Self {
        Self {
            backend,
            live: None,
        }
    }

    /// Open a stream, releasing any previously acquired one first.
    ///
    /// Returns the negotiated frame dimensions on success.
    pub async fn acquire(&mut self) -> Result<(u32, u32), CameraError> {
        self.release();

        let stream = self.backend.open().await?;
        let (width, height) = stream.dimensions();
        debug!(width, height, "camera stream acquired");
        self.live = Some(LiveHandle {
            stream,
            width,
            height,
        });
        Ok((width, height))
    }

    /// Whether a live handle is currently open.
    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    /// Negotiated dimensions of the live stream, if any.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.live.as_ref().map(LiveHandle::dimensions)
    }

    /// Read a preview frame from the live stream.
    pub async fn frame(&mut self) -> Result<RawFrame, CameraError> {
        let handle = self
            .live
            .as_mut()
            .ok_or_else(|| CameraError::Other("no live stream is open".into()))?;
        handle.stream.read_frame().await
    }

    /// Capture the current frame as a PNG-encoded artifact.
    ///
    /// The still is encoded at the frame's own dimensions, never a
    /// hard-coded size.
    pub async fn snapshot(&mut self) -> Result<ImageArtifact, CameraError> {
        let frame = self.frame().await?;
        encode_png(&frame).map(ImageArtifact::from_capture_png)
    }

    /// Stop the live stream, if any. No-op when nothing is open.
    pub fn release(&mut self) {
        if let Some(mut handle) = self.live.take() {
            handle.stream.stop();
            debug!("camera stream released");
        }
    }
}

impl<S: FrameSource> Drop for CameraDevice<S> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Encode a raw RGBA frame as PNG bytes.
fn encode_png(frame: &RawFrame) -> Result<Vec<u8>, CameraError> {
    if frame.pixels.len() != frame.expected_len() {
        return Err(CameraError::Other(format!(
            "frame buffer is {} bytes, expected {} for {}x{}",
            frame.pixels.len(),
            frame.expected_len(),
            frame.width,
            frame.height
        )));
    }

    let img = RgbaImage::from_raw(frame.width, frame.height, frame.pixels.clone())
        .ok_or_else(|| CameraError::Other("frame buffer does not match its dimensions".into()))?;

    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| CameraError::Other(format!("PNG encoding failed: {e}")))?;
    Ok(buf.into_inner())
}
