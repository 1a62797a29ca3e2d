//! Client-side image capture: encoding selected files and the view state
//! machine that drives the analyze flow.
//!
//! The state is a plain value changed only through [`CaptureState::apply`].
//! Phases move `Idle -> ImagesSelected -> Analyzing -> ResultShown |
//! ErrorShown`; an image edit after a result or error returns to
//! `ImagesSelected`, and a new attempt goes straight back to `Analyzing`.
//! An empty image list always means `Idle` once no analysis is in flight.
//!
//! The embedded page (`page.rs`) carries a JavaScript copy of this reducer;
//! the two must change together.

use std::path::Path;

use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::verdict::AnalysisVerdict;

/// Fixed message shown for any failed analysis.
pub const ERROR_MESSAGE: &str = "Failed to analyze parking signs. Please try again.";

/// A file the user picked, before encoding.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub name: String,
    /// Declared media type, when the picker supplied one.
    pub media_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, media_type: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.map(str::to_string),
            bytes,
        }
    }

    /// Read a file from disk; its media type is sniffed later.
    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Ok(Self {
            name: path.display().to_string(),
            media_type: None,
            bytes,
        })
    }
}

/// One encoded photograph, embeddable directly in JSON or an `<img>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    data_uri: String,
}

impl CapturedImage {
    pub fn from_bytes(media_type: &str, bytes: &[u8]) -> Self {
        Self {
            data_uri: format!(
                "data:{media_type};base64,{}",
                general_purpose::STANDARD.encode(bytes)
            ),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.data_uri
    }

    pub fn into_string(self) -> String {
        self.data_uri
    }
}

fn mime_for(format: ImageFormat) -> Option<&'static str> {
    let mime = match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::Ico => "image/x-icon",
        ImageFormat::Avif => "image/avif",
        _ => return None,
    };
    Some(mime)
}

/// Encode a picked file, or `None` when it is not an image.
///
/// A declared media type is trusted as-is; without one the content is
/// sniffed.
pub fn encode_image(file: &ImageFile) -> Option<CapturedImage> {
    let media_type = match &file.media_type {
        Some(declared) if declared.starts_with("image/") => declared.as_str(),
        Some(_) => return None,
        None => image::guess_format(&file.bytes).ok().and_then(mime_for)?,
    };
    Some(CapturedImage::from_bytes(media_type, &file.bytes))
}

/// Encode every file concurrently, handing each image to `on_ready` as soon
/// as its encoding finishes. Non-images are dropped.
pub async fn encode_all(files: Vec<ImageFile>, mut on_ready: impl FnMut(CapturedImage)) {
    let mut tasks = JoinSet::new();
    for file in files {
        tasks.spawn_blocking(move || {
            let encoded = encode_image(&file);
            if encoded.is_none() {
                debug!(file = %file.name, "Skipping non-image file");
            }
            encoded
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Some(image)) => on_ready(image),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Image encoding task failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    ImagesSelected,
    Analyzing,
    ResultShown(AnalysisVerdict),
    ErrorShown,
}

/// Everything that can happen to the capture view.
#[derive(Debug, Clone)]
pub enum Action {
    ImageAdded(CapturedImage),
    ImageRemoved(usize),
    AnalysisStarted,
    AnalysisSucceeded(AnalysisVerdict),
    AnalysisFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureState {
    images: Vec<CapturedImage>,
    phase: Phase,
}

impl Default for CaptureState {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureState {
    pub fn new() -> Self {
        Self {
            images: Vec::new(),
            phase: Phase::Idle,
        }
    }

    pub fn images(&self) -> &[CapturedImage] {
        &self.images
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase == Phase::Analyzing
    }

    /// Whether the analyze action is enabled.
    pub fn can_analyze(&self) -> bool {
        !self.images.is_empty() && !self.is_busy()
    }

    pub fn verdict(&self) -> Option<&AnalysisVerdict> {
        match &self.phase {
            Phase::ResultShown(verdict) => Some(verdict),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&'static str> {
        (self.phase == Phase::ErrorShown).then_some(ERROR_MESSAGE)
    }

    /// Apply one action. Actions that make no sense in the current phase
    /// leave the state untouched.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::ImageAdded(image) => {
                self.images.push(image);
                self.after_edit();
            }
            Action::ImageRemoved(index) => {
                if index < self.images.len() {
                    self.images.remove(index);
                    self.after_edit();
                }
            }
            Action::AnalysisStarted => {
                if self.can_analyze() {
                    self.phase = Phase::Analyzing;
                }
            }
            Action::AnalysisSucceeded(verdict) => {
                if self.is_busy() {
                    self.phase = Phase::ResultShown(verdict);
                    self.settle_if_empty();
                }
            }
            Action::AnalysisFailed => {
                if self.is_busy() {
                    self.phase = Phase::ErrorShown;
                    self.settle_if_empty();
                }
            }
        }
    }

    /// Every image was removed mid-flight: nothing is left to show a
    /// verdict for.
    fn settle_if_empty(&mut self) {
        if self.images.is_empty() {
            self.phase = Phase::Idle;
        }
    }

    fn after_edit(&mut self) {
        if self.is_busy() {
            return;
        }
        self.phase = if self.images.is_empty() {
            Phase::Idle
        } else {
            Phase::ImagesSelected
        };
    }
}
