//! Upload validation and the immutable source image.
//!
//! An upload passes three gates, cheapest first:
//!
//! 1. **Type**: the byte signature must identify an image (`infer`).
//! 2. **Shape**: the header dimensions must be landscape (width > height).
//!    This is read without decoding pixels, so a portrait photo is rejected
//!    before any real work happens.
//! 3. **Decode**: the full pixel data must decode.
//!
//! Only then is a [`SourceImage`] created.

use crate::imaging::{BackendError, ImageBackend, LayoutError, validate_landscape};
use image::DynamicImage;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Please select an image file ({0})")]
    InvalidFileType(String),
    #[error("Please upload a panorama image with a horizontal aspect ratio (width > height): {0}")]
    InvalidAspectRatio(#[from] LayoutError),
    #[error("There was an error reading the file: {0}")]
    FileReadFailure(#[from] BackendError),
}

/// A validated landscape image. Immutable once created.
#[derive(Debug, Clone)]
pub struct SourceImage {
    width: u32,
    height: u32,
    mime_type: &'static str,
    pixels: Arc<DynamicImage>,
}

impl SourceImage {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }

    /// Shared handle to the pixels, for handing to a worker thread.
    pub fn shared_pixels(&self) -> Arc<DynamicImage> {
        Arc::clone(&self.pixels)
    }
}

/// Detect the MIME type from the byte signature; only images pass.
pub fn sniff_image_type(bytes: &[u8]) -> Result<&'static str, SourceError> {
    if bytes.is_empty() {
        return Err(SourceError::InvalidFileType("file is empty".into()));
    }
    let kind = infer::get(bytes)
        .ok_or_else(|| SourceError::InvalidFileType("unrecognised file type".into()))?;
    if kind.matcher_type() != infer::MatcherType::Image {
        return Err(SourceError::InvalidFileType(kind.mime_type().to_string()));
    }
    Ok(kind.mime_type())
}

/// Check type and shape from the header alone. Returns `(width, height)`.
pub fn probe_source(backend: &impl ImageBackend, bytes: &[u8]) -> Result<(u32, u32), SourceError> {
    probe(backend, bytes).map(|(_, dims)| dims)
}

fn probe(
    backend: &impl ImageBackend,
    bytes: &[u8],
) -> Result<(&'static str, (u32, u32)), SourceError> {
    let mime_type = sniff_image_type(bytes)?;
    let dims = backend.identify(bytes)?;
    validate_landscape(dims.width, dims.height)?;
    Ok((mime_type, (dims.width, dims.height)))
}

/// Validate and decode an upload.
pub fn load_source(backend: &impl ImageBackend, bytes: &[u8]) -> Result<SourceImage, SourceError> {
    let (mime_type, _) = probe(backend, bytes)?;

    let pixels = backend.decode(bytes)?;
    let (width, height) = (pixels.width(), pixels.height());
    validate_landscape(width, height)?;

    log::debug!("decoded {mime_type} source {width}x{height}");

    Ok(SourceImage {
        width,
        height,
        mime_type,
        pixels: Arc::new(pixels),
    })
}
