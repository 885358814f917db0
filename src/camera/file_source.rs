//! Camera source backed by an image file
//!
//! Terminals have no camera, so the CLI "films" a photo on disk. Each
//! capture decodes the file, downsizes it to fit `max_dimension`, and
//! re-encodes it as JPEG, which is what the vision model receives.

use super::{CameraSource, MediaStream};
use crate::error::{FitbotError, Result};
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Camera that streams a single still image from disk
#[derive(Debug, Clone)]
pub struct FileCameraSource {
    path: PathBuf,
    max_dimension: u32,
}

impl FileCameraSource {
    pub fn new(path: impl Into<PathBuf>, max_dimension: u32) -> Self {
        Self {
            path: path.into(),
            max_dimension,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CameraSource for FileCameraSource {
    async fn acquire(&self) -> Result<Box<dyn MediaStream>> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            FitbotError::Camera(format!("Failed to open {}: {}", self.path.display(), e))
        })?;

        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "Opened image stream");
        Ok(Box::new(FileStream {
            bytes,
            max_dimension: self.max_dimension,
            active: true,
        }))
    }
}

struct FileStream {
    bytes: Vec<u8>,
    max_dimension: u32,
    active: bool,
}

impl MediaStream for FileStream {
    fn capture_frame(&mut self) -> Result<Vec<u8>> {
        if !self.active {
            return Err(FitbotError::Camera("Stream has been stopped".into()).into());
        }
        encode_jpeg(&self.bytes, self.max_dimension)
    }

    fn stop(&mut self) {
        self.active = false;
        self.bytes.clear();
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Decode any supported image and re-encode it as JPEG no larger than
/// `max_dimension` on either side
pub fn encode_jpeg(bytes: &[u8], max_dimension: u32) -> Result<Vec<u8>> {
    let mut img = image::load_from_memory(bytes).map_err(FitbotError::from)?;

    if img.width() > max_dimension || img.height() > max_dimension {
        img = img.thumbnail(max_dimension, max_dimension);
    }

    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut out = Cursor::new(Vec::new());
    rgb.write_to(&mut out, ImageFormat::Jpeg).map_err(FitbotError::from)?;
    Ok(out.into_inner())
}
