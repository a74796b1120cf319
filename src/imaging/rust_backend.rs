//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageReader::into_dimensions` (header only) |
//! | Decode (JPEG, PNG, TIFF, WebP, BMP, GIF) | `image::ImageReader::decode` |
//! | Resample | `DynamicImage::resize_exact` / `imageops::resize` with `Lanczos3` |
//! | Band cut | `imageops::crop_imm` |
//! | Full-view inset | `imageops::replace` + hand-drawn hairline |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::InsetRect;
use super::params::{ComposeParams, Quality, SliceParams};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageReader, Rgb, RgbImage};
use std::io::Cursor;

/// Pure Rust backend using the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend {
    filter: FilterType,
}

impl RustBackend {
    pub fn new() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, BackendError> {
    Ok(ImageReader::new(Cursor::new(bytes)).with_guessed_format()?)
}

/// Draw a 1px rectangle on the ring just outside `inset`, clipped to the canvas.
fn draw_hairline(canvas: &mut RgbImage, inset: &InsetRect, color: Rgb<u8>) {
    let (cw, ch) = (canvas.width() as i64, canvas.height() as i64);
    let left = inset.x as i64 - 1;
    let top = inset.y as i64 - 1;
    let right = inset.x as i64 + inset.width as i64;
    let bottom = inset.y as i64 + inset.height as i64;

    let mut plot = |x: i64, y: i64| {
        if (0..cw).contains(&x) && (0..ch).contains(&y) {
            canvas.put_pixel(x as u32, y as u32, color);
        }
    };

    for x in left..=right {
        plot(x, top);
        plot(x, bottom);
    }
    for y in top..=bottom {
        plot(left, y);
        plot(right, y);
    }
}

impl ImageBackend for RustBackend {
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError> {
        let (width, height) = reader(bytes)?
            .into_dimensions()
            .map_err(|e| BackendError::Decode(format!("Failed to read dimensions: {e}")))?;
        Ok(Dimensions { width, height })
    }

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError> {
        reader(bytes)?
            .decode()
            .map_err(|e| BackendError::Decode(format!("Failed to decode image: {e}")))
    }

    fn slice(
        &self,
        source: &DynamicImage,
        params: &SliceParams,
    ) -> Result<Vec<RgbImage>, BackendError> {
        if params.count.checked_mul(params.tile_width) != Some(params.scaled_width) {
            return Err(BackendError::ProcessingFailed(format!(
                "{} tiles of width {} do not tile a {}px canvas",
                params.count, params.tile_width, params.scaled_width
            )));
        }

        let scaled = source
            .resize_exact(params.scaled_width, params.scaled_height, self.filter)
            .to_rgb8();

        let tiles = (0..params.count)
            .map(|i| {
                let band = imageops::crop_imm(
                    &scaled,
                    i * params.tile_width,
                    0,
                    params.tile_width,
                    params.scaled_height,
                )
                .to_image();
                if params.scaled_height == params.tile_height {
                    band
                } else {
                    // The band spans the full canvas height and is squeezed
                    // (or stretched) into the tile.
                    imageops::resize(&band, params.tile_width, params.tile_height, self.filter)
                }
            })
            .collect();

        Ok(tiles)
    }

    fn compose(
        &self,
        source: &DynamicImage,
        params: &ComposeParams,
    ) -> Result<RgbImage, BackendError> {
        let inset = &params.inset;
        if inset.x + inset.width > params.canvas_width
            || inset.y + inset.height > params.canvas_height
        {
            return Err(BackendError::ProcessingFailed(format!(
                "inset {}x{} at ({}, {}) exceeds {}x{} canvas",
                inset.width,
                inset.height,
                inset.x,
                inset.y,
                params.canvas_width,
                params.canvas_height
            )));
        }

        let mut canvas = RgbImage::from_pixel(
            params.canvas_width,
            params.canvas_height,
            Rgb(params.background),
        );
        let panorama = source
            .resize_exact(inset.width, inset.height, self.filter)
            .to_rgb8();
        imageops::replace(&mut canvas, &panorama, inset.x as i64, inset.y as i64);
        draw_hairline(&mut canvas, inset, Rgb(params.border));

        Ok(canvas)
    }

    fn encode_jpeg(&self, tile: &RgbImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
        let mut buf = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buf, quality.value());
        tile.write_with_encoder(encoder)
            .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {e}")))?;
        Ok(buf)
    }
}
