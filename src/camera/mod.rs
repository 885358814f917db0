//! Camera capture pipeline
//!
//! A meal scan goes through `Idle -> Streaming -> Captured -> Analyzing ->
//! Closed`. The pipeline owns the live [`MediaStream`] and releases it as
//! soon as a still is captured, when the scan is closed, and when the
//! pipeline is dropped.

pub mod file_source;

pub use file_source::FileCameraSource;

use crate::error::{FitbotError, Result};
use crate::gateway::{self, AiGateway};
use crate::tracker::FoodEstimate;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Shown when the first stream cannot be acquired
pub const CAMERA_ACCESS_ERROR: &str =
    "Could not access the camera. Please ensure you have granted permission.";

/// Shown when a retake cannot reacquire the stream
pub const CAMERA_RESTART_ERROR: &str = "Could not restart the camera.";

/// Something that can hand out live video streams
#[async_trait]
pub trait CameraSource: Send + Sync {
    /// Acquire a new stream
    async fn acquire(&self) -> Result<Box<dyn MediaStream>>;
}

/// A live video stream
pub trait MediaStream: Send {
    /// Grab the current frame as JPEG bytes
    fn capture_frame(&mut self) -> Result<Vec<u8>>;

    /// Stop all tracks; further captures fail
    fn stop(&mut self);

    fn is_active(&self) -> bool;
}

/// Where a scan currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Streaming,
    Captured,
    Analyzing,
    Closed,
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CaptureState::Idle => "idle",
            CaptureState::Streaming => "streaming",
            CaptureState::Captured => "captured",
            CaptureState::Analyzing => "analyzing",
            CaptureState::Closed => "closed",
        };
        write!(f, "{}", label)
    }
}

/// One meal scan
pub struct CapturePipeline {
    source: Arc<dyn CameraSource>,
    stream: Option<Box<dyn MediaStream>>,
    frame: Option<Vec<u8>>,
    error: Option<String>,
    state: watch::Sender<CaptureState>,
}

impl fmt::Debug for CapturePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturePipeline")
            .field("state", &self.state())
            .field("has_stream", &self.stream.is_some())
            .field("frame_bytes", &self.frame.as_ref().map(Vec::len))
            .field("error", &self.error)
            .finish()
    }
}

impl CapturePipeline {
    pub fn new(source: Arc<dyn CameraSource>) -> Self {
        let (state, _rx) = watch::channel(CaptureState::Idle);
        Self {
            source,
            stream: None,
            frame: None,
            error: None,
            state,
        }
    }

    pub fn state(&self) -> CaptureState {
        *self.state.borrow()
    }

    /// Observe state transitions (e.g. to show an "analyzing" indicator)
    pub fn subscribe(&self) -> watch::Receiver<CaptureState> {
        self.state.subscribe()
    }

    /// Message describing the last camera failure
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The captured JPEG still, if any
    pub fn frame(&self) -> Option<&[u8]> {
        self.frame.as_deref()
    }

    fn transition(&self, next: CaptureState) {
        let previous = self.state.send_replace(next);
        tracing::debug!(%previous, %next, "Capture state changed");
    }

    fn release_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
        }
    }

    fn require(&self, expected: CaptureState, action: &str) -> Result<()> {
        let state = self.state();
        if state != expected {
            return Err(FitbotError::Camera(format!(
                "Cannot {} while {}",
                action, state
            ))
            .into());
        }
        Ok(())
    }

    /// Start the camera
    ///
    /// On failure the pipeline stays `Idle` with [`CAMERA_ACCESS_ERROR`] set
    /// and can still be closed.
    pub async fn open(&mut self) -> Result<()> {
        self.require(CaptureState::Idle, "open the camera")?;
        self.acquire(CAMERA_ACCESS_ERROR).await
    }

    async fn acquire(&mut self, failure_message: &str) -> Result<()> {
        match self.source.acquire().await {
            Ok(stream) => {
                self.stream = Some(stream);
                self.error = None;
                self.transition(CaptureState::Streaming);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Error accessing camera: {}", e);
                self.error = Some(failure_message.to_string());
                self.transition(CaptureState::Idle);
                Err(FitbotError::Camera(failure_message.to_string()).into())
            }
        }
    }

    /// Freeze the current frame and release the stream
    pub fn capture(&mut self) -> Result<&[u8]> {
        self.require(CaptureState::Streaming, "capture")?;

        let frame = match self.stream.as_mut() {
            Some(stream) => stream.capture_frame()?,
            None => return Err(FitbotError::Camera("No active camera stream".into()).into()),
        };
        self.release_stream();

        tracing::info!(bytes = frame.len(), "Captured meal photo");
        self.transition(CaptureState::Captured);
        Ok(self.frame.insert(frame).as_slice())
    }

    /// Discard the still and restart the camera
    ///
    /// On failure the pipeline drops back to `Idle` with
    /// [`CAMERA_RESTART_ERROR`] set.
    pub async fn retake(&mut self) -> Result<()> {
        self.require(CaptureState::Captured, "retake")?;
        self.frame = None;
        self.acquire(CAMERA_RESTART_ERROR).await
    }

    /// Send the still to the AI gateway, then close the scan
    ///
    /// The pipeline is closed afterwards whatever the outcome. Failures are
    /// returned as the message to show the user.
    pub async fn analyze(
        &mut self,
        gateway: &AiGateway,
    ) -> std::result::Result<Vec<FoodEstimate>, String> {
        if let Err(e) = self.require(CaptureState::Captured, "analyze") {
            return Err(e.to_string());
        }
        let frame = match self.frame.take() {
            Some(frame) => frame,
            None => return Err("No photo captured".to_string()),
        };

        self.transition(CaptureState::Analyzing);
        let outcome = gateway
            .analyze_food_image(&frame)
            .await
            .map_err(|e| gateway::scan_error_message(&e));

        self.finish();
        outcome
    }

    /// Close the scan, releasing any stream
    ///
    /// Rejected (returns `false`) while an analysis is in flight.
    pub fn close(&mut self) -> bool {
        match self.state() {
            CaptureState::Analyzing => {
                tracing::debug!("Ignoring close while analyzing");
                false
            }
            CaptureState::Closed => true,
            _ => {
                self.finish();
                true
            }
        }
    }

    fn finish(&mut self) {
        self.release_stream();
        self.frame = None;
        self.transition(CaptureState::Closed);
    }
}

impl Drop for CapturePipeline {
    fn drop(&mut self) {
        self.release_stream();
    }
}
