//! Image acquisition state machine.
//!
//! [`ImageSource`] unifies "pick a file" and "operate a live camera" into
//! one lifecycle that produces a single normalized [`ImageArtifact`] per
//! acquisition:
//!
//! ```text
//! Idle --select_file--> Uploading --ok--> Ready     --clear--> Idle
//!                                  --err--> Idle
//! Idle --enter_capture_mode--> CameraRequesting --ok--> CameraLive --shoot--> Ready
//!                                               --err--> CameraDenied --retry--> CameraRequesting
//! ```
//!
//! The state is owned by the machine instead of living in view-layer
//! variables, so the whole lifecycle is testable headlessly. Every
//! transition that leaves the capture sub-state releases the live camera
//! handle first, unconditionally, including on drop.

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::artifact::{ImageArtifact, ImageOrigin, ValidationError};
use crate::camera::{CameraDevice, CameraError, FrameSource};

/// Buffered capacity of the event channel. Slow subscribers lose the oldest
/// events rather than blocking transitions.
const EVENT_CAPACITY: usize = 32;

/// Observable acquisition states.
#[derive(Debug)]
pub enum SourceState {
    /// No artifact and no camera activity.
    Idle,
    /// Selected file bytes are being decoded.
    Uploading,
    /// Camera permission and stream acquisition are in flight.
    CameraRequesting,
    /// A live stream is open and can be shot.
    CameraLive,
    /// One normalized artifact is available.
    Ready(ImageArtifact),
    /// Acquisition failed; retry is offered, never automatic.
    CameraDenied(CameraError),
}

impl SourceState {
    /// Short machine-readable name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Uploading => "uploading",
            Self::CameraRequesting => "camera-requesting",
            Self::CameraLive => "camera-live",
            Self::Ready(_) => "ready",
            Self::CameraDenied(_) => "camera-denied",
        }
    }
}

/// Camera-facing phase reported through [`SourceEvent::CameraStateChanged`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraPhase {
    Off,
    Requesting,
    Live,
    Denied,
}

/// Notifications emitted as the machine moves between states.
#[derive(Debug, Clone)]
pub enum SourceEvent {
    /// A new artifact reached `Ready`.
    ArtifactReady { origin: ImageOrigin },
    /// The capture sub-state changed.
    CameraStateChanged(CameraPhase),
    /// A reported, recoverable failure (validation or camera).
    Error(String),
}

/// The acquisition state machine.
///
/// Owns the camera device for the capture path; the upload path goes
/// through [`ImageArtifact::from_upload`]. At most one artifact exists at a
/// time; producing a new one supersedes the previous one, which is tracked
/// by a monotonic generation counter so callers can drop results computed
/// for a superseded artifact.
pub struct ImageSource<S: FrameSource> {
    camera: CameraDevice<S>,
    state: SourceState,
    generation: u64,
    has_permission: Option<bool>,
    events: broadcast::Sender<SourceEvent>,
}

impl<S: FrameSource> ImageSource<S> {
    pub fn new(backend: S) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            camera: CameraDevice::new(backend),
            state: SourceState::Idle,
            generation: 0,
            has_permission: None,
            events,
        }
    }

    pub fn state(&self) -> &SourceState {
        &self.state
    }

    /// The current artifact, if the machine is `Ready`.
    pub fn artifact(&self) -> Option<&ImageArtifact> {
        match &self.state {
            SourceState::Ready(artifact) => Some(artifact),
            _ => None,
        }
    }

    /// Monotonic counter identifying the current artifact epoch.
    ///
    /// Bumped whenever an artifact is produced or superseded; a diagnosis
    /// issued under an older generation must be discarded on arrival.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Remembered permission outcome: `None` until the first prompt,
    /// preserved across [`clear`](Self::clear), reset by
    /// [`retake`](Self::retake).
    pub fn has_permission(&self) -> Option<bool> {
        self.has_permission
    }

    /// Subscribe to state-machine events.
    pub fn subscribe(&self) -> broadcast::Receiver<SourceEvent> {
        self.events.subscribe()
    }

    /// Decode selected file bytes into the one ready artifact.
    ///
    /// Allowed from any state; an open camera stream is released first. On
    /// decode failure the machine returns to `Idle` and the validation
    /// error is reported to the caller, never thrown past it.
    pub async fn select_file(&mut self, bytes: Vec<u8>) -> Result<(), ValidationError> {
        self.exit_capture();
        self.state = SourceState::Uploading;

        match ImageArtifact::from_upload(bytes) {
            Ok(artifact) => {
                self.produce(artifact);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "rejected selected file");
                self.state = SourceState::Idle;
                self.emit(SourceEvent::Error(err.to_string()));
                Err(err)
            }
        }
    }

    /// Switch to capture intent and attempt to open the camera.
    ///
    /// Any previously open stream is released first. Success lands in
    /// `CameraLive`; failure lands in `CameraDenied` with the error both
    /// recorded and returned.
    pub async fn enter_capture_mode(&mut self) -> Result<(), CameraError> {
        self.exit_capture();
        self.request_camera().await
    }

    /// One fresh acquisition attempt after a denial.
    ///
    /// Only valid from `CameraDenied`; performs exactly one attempt per
    /// call.
    pub async fn retry(&mut self) -> Result<(), CameraError> {
        match self.state {
            SourceState::CameraDenied(_) => self.request_camera().await,
            _ => Err(CameraError::Other(
                "retry is only valid after a denied acquisition".into(),
            )),
        }
    }

    /// Forget the remembered permission outcome and re-enter capture mode,
    /// forcing a fresh permission prompt.
    pub async fn retake(&mut self) -> Result<(), CameraError> {
        self.has_permission = None;
        self.enter_capture_mode().await
    }

    /// Capture a still from the live stream.
    ///
    /// The live resource is released the instant a still is produced. A
    /// capture failure also releases it and lands in `CameraDenied`, keeping
    /// the retry path open instead of leaving a live state over a dead
    /// stream.
    pub async fn shoot(&mut self) -> Result<(), CameraError> {
        if !matches!(self.state, SourceState::CameraLive) {
            return Err(CameraError::Other("no live camera stream to shoot".into()));
        }

        let captured = self.camera.snapshot().await;
        self.camera.release();

        match captured {
            Ok(artifact) => {
                self.produce(artifact);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "snapshot failed");
                self.state = SourceState::CameraDenied(err.clone());
                self.emit(SourceEvent::CameraStateChanged(CameraPhase::Denied));
                self.emit(SourceEvent::Error(err.to_string()));
                Err(err)
            }
        }
    }

    /// Discard the current artifact and return to `Idle`.
    ///
    /// The remembered permission outcome is preserved so re-entering
    /// capture mode does not force a fresh prompt. The machine is reusable
    /// indefinitely.
    pub fn clear(&mut self) {
        self.exit_capture();
    }

    /// Abandon the capture intent, releasing any open stream.
    pub fn leave_capture_mode(&mut self) {
        self.exit_capture();
    }

    async fn request_camera(&mut self) -> Result<(), CameraError> {
        self.supersede_if_ready();
        self.state = SourceState::CameraRequesting;
        self.emit(SourceEvent::CameraStateChanged(CameraPhase::Requesting));

        match self.camera.acquire().await {
            Ok((width, height)) => {
                debug!(width, height, "camera live");
                self.has_permission = Some(true);
                self.state = SourceState::CameraLive;
                self.emit(SourceEvent::CameraStateChanged(CameraPhase::Live));
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "camera acquisition failed");
                if err == CameraError::PermissionDenied {
                    self.has_permission = Some(false);
                }
                self.state = SourceState::CameraDenied(err.clone());
                self.emit(SourceEvent::CameraStateChanged(CameraPhase::Denied));
                self.emit(SourceEvent::Error(err.to_string()));
                Err(err)
            }
        }
    }

    /// Release the camera and settle in `Idle`, superseding any artifact.
    fn exit_capture(&mut self) {
        let was_camera = matches!(
            self.state,
            SourceState::CameraRequesting | SourceState::CameraLive | SourceState::CameraDenied(_)
        );
        if was_camera {
            debug!(from = self.state.name(), "leaving capture state");
        }
        self.supersede_if_ready();
        self.camera.release();
        self.state = SourceState::Idle;
        if was_camera {
            self.emit(SourceEvent::CameraStateChanged(CameraPhase::Off));
        }
    }

    fn supersede_if_ready(&mut self) {
        if matches!(self.state, SourceState::Ready(_)) {
            self.generation += 1;
        }
    }

    fn produce(&mut self, artifact: ImageArtifact) {
        self.generation += 1;
        let origin = artifact.origin();
        debug!(%origin, generation = self.generation, "artifact ready");
        self.state = SourceState::Ready(artifact);
        self.emit(SourceEvent::ArtifactReady { origin });
    }

    fn emit(&self, event: SourceEvent) {
        // No subscribers is fine; events are optional observability.
        let _ = self.events.send(event);
    }
}
