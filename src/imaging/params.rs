//! Parameter types for image operations.
//!
//! These structs describe *what* to draw, not *how*. They are the interface
//! between the [`operations`](super::operations) module (which turns a
//! [`SlicingPlan`] into concrete drawing instructions) and the
//! [`backend`](super::backend) (which does the pixel work). Keeping them apart
//! lets tests swap in a recording mock backend.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG quality (1–100, default 95). Clamped on construction.
//! - [`SliceParams`]: Scaled canvas size plus the band geometry to cut from it.
//! - [`ComposeParams`]: Full-view tile: canvas, inset rectangle, fill and border colors.

use super::calculations::{InsetRect, SlicingPlan};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// Parameters for rendering the slice tiles of one plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceParams {
    /// The whole source is resampled to this size first.
    pub scaled_width: u32,
    pub scaled_height: u32,
    /// Each band of the scaled canvas is drawn into a tile of this size.
    pub tile_width: u32,
    pub tile_height: u32,
    pub count: u32,
}

impl From<&SlicingPlan> for SliceParams {
    fn from(plan: &SlicingPlan) -> Self {
        Self {
            scaled_width: plan.scaled_width,
            scaled_height: plan.scaled_height,
            tile_width: plan.slice_width,
            tile_height: plan.slice_height,
            count: plan.slice_count,
        }
    }
}

/// Parameters for the letterboxed full-view tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposeParams {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Where the resampled source lands on the canvas.
    pub inset: InsetRect,
    pub background: [u8; 3],
    /// Color of the 1px hairline drawn just outside the inset.
    pub border: [u8; 3],
}
