//! High-level image operations.
//!
//! These functions combine calculations with backend execution: they take a
//! [`SlicingPlan`] and render configuration, derive the drawing parameters,
//! and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{SlicingPlan, calculate_full_view_inset};
use super::params::{ComposeParams, Quality, SliceParams};
use image::DynamicImage;
use rayon::prelude::*;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// One encoded carousel tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice {
    /// 1-based position, left to right.
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub jpeg: Vec<u8>,
}

/// The whole panorama letterboxed on a slice-sized tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullViewComposite {
    pub width: u32,
    pub height: u32,
    pub jpeg: Vec<u8>,
}

/// Rendering settings shared by slices and the full view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    pub quality: Quality,
    /// Full-view margin as a fraction of the tile width.
    pub margin: f64,
    pub background: [u8; 3],
    pub border: [u8; 3],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            quality: Quality::default(),
            margin: 0.08,
            background: [0xFF, 0xFF, 0xFF],
            border: [0xEE, 0xEE, 0xEE],
        }
    }
}

/// Render and encode every slice of the plan.
///
/// Tiles are encoded in parallel; the result keeps left-to-right order.
pub fn render_slices(
    backend: &impl ImageBackend,
    source: &DynamicImage,
    plan: &SlicingPlan,
    quality: Quality,
) -> Result<Vec<Slice>> {
    let tiles = backend.slice(source, &SliceParams::from(plan))?;
    if tiles.len() != plan.slice_count as usize {
        return Err(BackendError::ProcessingFailed(format!(
            "backend produced {} tiles, plan needs {}",
            tiles.len(),
            plan.slice_count
        )));
    }

    tiles
        .par_iter()
        .enumerate()
        .map(|(i, tile)| {
            backend.encode_jpeg(tile, quality).map(|jpeg| Slice {
                index: i as u32 + 1,
                width: tile.width(),
                height: tile.height(),
                jpeg,
            })
        })
        .collect()
}

/// Plan the full-view composite without drawing it.
pub fn plan_full_view(
    source: (u32, u32),
    plan: &SlicingPlan,
    config: &RenderConfig,
) -> ComposeParams {
    let canvas = (plan.slice_width, plan.slice_height);
    ComposeParams {
        canvas_width: canvas.0,
        canvas_height: canvas.1,
        inset: calculate_full_view_inset(source, canvas, config.margin),
        background: config.background,
        border: config.border,
    }
}

/// Draw and encode the full-view composite.
pub fn compose_full_view(
    backend: &impl ImageBackend,
    source: &DynamicImage,
    plan: &SlicingPlan,
    config: &RenderConfig,
) -> Result<FullViewComposite> {
    let params = plan_full_view((source.width(), source.height()), plan, config);
    let tile = backend.compose(source, &params)?;
    Ok(FullViewComposite {
        width: tile.width(),
        height: tile.height(),
        jpeg: backend.encode_jpeg(&tile, config.quality)?,
    })
}
