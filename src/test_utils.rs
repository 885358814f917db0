//! Test utilities for FitBot
//!
//! Shared fakes for the notification and camera seams.

use crate::camera::{CameraSource, MediaStream};
use crate::error::{FitbotError, Result};
use crate::reminder::{NotificationSink, Permission};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Notification sink that records everything it is asked to show
#[derive(Debug)]
pub struct RecordingNotifier {
    permission: Mutex<Permission>,
    request_outcome: Permission,
    requests: AtomicUsize,
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    /// A sink whose prompt leaves the permission unchanged
    pub fn new(permission: Permission) -> Self {
        Self::with_request_outcome(permission, permission)
    }

    /// A sink that starts at `current` and answers prompts with `outcome`
    pub fn with_request_outcome(current: Permission, outcome: Permission) -> Self {
        Self {
            permission: Mutex::new(current),
            request_outcome: outcome,
            requests: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Notifications shown so far as `(title, body)`
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// How many times permission was requested
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    fn permission(&self) -> Permission {
        *self
            .permission
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    async fn request_permission(&self) -> Permission {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let mut current = self
            .permission
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *current = self.request_outcome;
        *current
    }

    fn notify(&self, title: &str, body: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}

#[derive(Debug, Default)]
struct FakeCameraState {
    denied: AtomicBool,
    acquisitions: AtomicUsize,
    active_streams: AtomicUsize,
}

/// Camera that hands out streams producing [`FakeCamera::FRAME`]
///
/// Clones share state, so a test can keep one handle while the pipeline
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct FakeCamera {
    state: Arc<FakeCameraState>,
}

impl FakeCamera {
    /// Bytes every capture returns
    pub const FRAME: &'static [u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0xFF, 0xD9];

    pub fn new() -> Self {
        Self::default()
    }

    /// A camera the user has not granted access to
    pub fn denied() -> Self {
        let camera = Self::new();
        camera.deny();
        camera
    }

    /// Fail every later acquisition
    pub fn deny(&self) {
        self.state.denied.store(true, Ordering::SeqCst);
    }

    /// Streams acquired and not yet stopped
    pub fn active_streams(&self) -> usize {
        self.state.active_streams.load(Ordering::SeqCst)
    }

    /// Successful acquisitions so far
    pub fn acquisitions(&self) -> usize {
        self.state.acquisitions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CameraSource for FakeCamera {
    async fn acquire(&self) -> Result<Box<dyn MediaStream>> {
        if self.state.denied.load(Ordering::SeqCst) {
            return Err(FitbotError::Camera("Permission denied".to_string()).into());
        }
        self.state.acquisitions.fetch_add(1, Ordering::SeqCst);
        self.state.active_streams.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeStream {
            state: self.state.clone(),
            active: true,
        }))
    }
}

struct FakeStream {
    state: Arc<FakeCameraState>,
    active: bool,
}

impl MediaStream for FakeStream {
    fn capture_frame(&mut self) -> Result<Vec<u8>> {
        if !self.active {
            return Err(FitbotError::Camera("Stream stopped".to_string()).into());
        }
        Ok(FakeCamera::FRAME.to_vec())
    }

    fn stop(&mut self) {
        if self.active {
            self.active = false;
            self.state.active_streams.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

impl Drop for FakeStream {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[tokio::test]
    async fn test_recording_notifier_prompt_updates_permission() {
        let sink =
            RecordingNotifier::with_request_outcome(Permission::Default, Permission::Granted);
        assert_eq!(sink.permission(), Permission::Default);
        assert_eq!(sink.request_permission().await, Permission::Granted);
        assert_eq!(sink.permission(), Permission::Granted);
        assert_eq!(sink.requests(), 1);
    }

    #[tokio::test]
    async fn test_fake_stream_counts_release_once() {
        let camera = FakeCamera::new();
        let mut stream = camera.acquire().await.unwrap();
        assert_eq!(camera.active_streams(), 1);
        stream.stop();
        stream.stop();
        assert_eq!(camera.active_streams(), 0);
        assert!(stream.capture_frame().is_err());
        drop(stream);
        assert_eq!(camera.active_streams(), 0);
    }
}
