//! Pure calculation functions for slicing geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//! The slicing plan is the heart of the tool: every other stage is a
//! mechanical application of the numbers computed here.

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("image has zero height")]
    EmptyImage,
    #[error("image is {width}x{height}; a panorama must be wider than it is tall")]
    NotLandscape { width: u32, height: u32 },
}

/// Which per-slice resolution to target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SliceMode {
    /// Fixed slice resolution (1080x1440 with the default layout).
    #[default]
    Standard,
    /// Slice height equals the source height, so nothing is upscaled.
    HighRes,
}

impl SliceMode {
    pub fn from_high_res(high_res: bool) -> Self {
        if high_res {
            SliceMode::HighRes
        } else {
            SliceMode::Standard
        }
    }

    pub fn is_high_res(self) -> bool {
        self == SliceMode::HighRes
    }
}

/// Constants that shape every plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutParams {
    /// Target slice aspect ratio as (width, height).
    pub aspect: (u32, u32),
    /// Slice width in standard mode.
    pub standard_width: u32,
    /// A plan never has fewer slices than this.
    pub min_slices: u32,
}

impl LayoutParams {
    fn ratio(&self) -> f64 {
        self.aspect.0 as f64 / self.aspect.1 as f64
    }

    /// Slice height in standard mode: `round(standard_width / ratio)`.
    pub fn standard_height(&self) -> u32 {
        (self.standard_width as f64 / self.ratio()).round() as u32
    }

    /// Per-slice `(width, height)` for a source of the given height.
    pub fn slice_dimensions(&self, original_height: u32, mode: SliceMode) -> (u32, u32) {
        match mode {
            SliceMode::Standard => (self.standard_width, self.standard_height()),
            SliceMode::HighRes => {
                let h = original_height;
                // A very tall aspect ratio on a short image would round to zero.
                (((h as f64 * self.ratio()).round() as u32).max(1), h)
            }
        }
    }
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            aspect: (3, 4),
            standard_width: 1080,
            min_slices: 2,
        }
    }
}

/// How a panorama is scaled and cut into equal tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlicingPlan {
    /// Width of the resampled panorama; always `slice_count * slice_width`.
    pub scaled_width: u32,
    /// Height of the resampled panorama.
    pub scaled_height: u32,
    pub slice_count: u32,
    pub slice_width: u32,
    pub slice_height: u32,
}

/// Reject sources the calculator cannot handle.
///
/// A square image is not a panorama and fails here too.
pub fn validate_landscape(width: u32, height: u32) -> Result<(), LayoutError> {
    if height == 0 {
        return Err(LayoutError::EmptyImage);
    }
    if width <= height {
        return Err(LayoutError::NotLandscape { width, height });
    }
    Ok(())
}

/// Compute the slicing plan for a source image.
///
/// The source must already have passed [`validate_landscape`].
///
/// The slice count starts from how many whole slices fit at the natural
/// scale, then:
/// - below `min_slices` it is forced up to the minimum and the height is
///   re-derived from the source aspect ratio,
/// - a leftover wider than half a slice earns one more slice (and a taller
///   canvas so the image fills it),
/// - a smaller leftover is dropped and the canvas keeps the slice height.
///
/// # Examples
/// ```
/// # use pano_slicer::imaging::{LayoutParams, SliceMode, calculate_slicing_plan};
/// let plan = calculate_slicing_plan((3000, 1000), SliceMode::Standard, &LayoutParams::default());
/// assert_eq!(plan.slice_count, 4);
/// assert_eq!((plan.scaled_width, plan.scaled_height), (4320, 1440));
/// ```
pub fn calculate_slicing_plan(
    original: (u32, u32),
    mode: SliceMode,
    params: &LayoutParams,
) -> SlicingPlan {
    let (orig_w, orig_h) = original;
    debug_assert!(orig_h > 0 && orig_w > orig_h, "source must be landscape");

    let (slice_width, slice_height) = params.slice_dimensions(orig_h, mode);

    let scale = slice_height as f64 / orig_h as f64;
    let base_scaled_width = (orig_w as f64 * scale).round() as u32;

    let full_slices = base_scaled_width / slice_width;
    let remainder = base_scaled_width - full_slices * slice_width;

    let (slice_count, scaled_width, scaled_height) = if full_slices < params.min_slices {
        let count = params.min_slices;
        let width = count * slice_width;
        // Keeps the source aspect ratio, so the canvas is taller than a slice.
        let height = (width as f64 / orig_w as f64 * orig_h as f64).round() as u32;
        (count, width, height)
    } else if remainder as f64 > slice_width as f64 / 2.0 {
        let count = full_slices + 1;
        let width = count * slice_width;
        let height = (orig_h as f64 * (width as f64 / orig_w as f64)).round() as u32;
        (count, width, height)
    } else {
        let count = full_slices;
        (count, count * slice_width, slice_height)
    };

    SlicingPlan {
        scaled_width,
        scaled_height,
        slice_count,
        slice_width,
        slice_height,
    }
}

/// Placement of the letterboxed panorama inside the full-view tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsetRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Fit the whole source inside a `canvas`-sized tile with a margin of
/// `margin_fraction * canvas width` on every side, centered.
///
/// Whichever axis is tighter relative to the source aspect ratio constrains
/// the fit; the other axis gets extra letterbox space.
pub fn calculate_full_view_inset(
    source: (u32, u32),
    canvas: (u32, u32),
    margin_fraction: f64,
) -> InsetRect {
    let (src_w, src_h) = source;
    let (canvas_w, canvas_h) = canvas;

    let margin = (canvas_w as f64 * margin_fraction).round();
    let available_w = (canvas_w as f64 - margin * 2.0).max(1.0);
    let available_h = (canvas_h as f64 - margin * 2.0).max(1.0);

    let src_aspect = src_w as f64 / src_h as f64;
    let (inset_w, inset_h) = if src_aspect > available_w / available_h {
        (available_w, available_w / src_aspect)
    } else {
        (available_h * src_aspect, available_h)
    };

    let x = ((canvas_w as f64 - inset_w) / 2.0).round() as u32;
    let y = ((canvas_h as f64 - inset_h) / 2.0).round() as u32;

    InsetRect {
        x,
        y,
        width: (inset_w.round() as u32).max(1),
        height: (inset_h.round() as u32).max(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn standard(w: u32, h: u32) -> SlicingPlan {
        calculate_slicing_plan((w, h), SliceMode::Standard, &LayoutParams::default())
    }

    fn high_res(w: u32, h: u32) -> SlicingPlan {
        calculate_slicing_plan((w, h), SliceMode::HighRes, &LayoutParams::default())
    }

    // =========================================================================
    // validate_landscape tests
    // =========================================================================

    #[test]
    fn validate_accepts_landscape() {
        assert_eq!(validate_landscape(2, 1), Ok(()));
    }

    #[test]
    fn validate_rejects_square() {
        assert_eq!(
            validate_landscape(1000, 1000),
            Err(LayoutError::NotLandscape {
                width: 1000,
                height: 1000
            })
        );
    }

    #[test]
    fn validate_rejects_portrait() {
        assert!(validate_landscape(800, 1200).is_err());
    }

    #[test]
    fn validate_rejects_zero_height() {
        assert_eq!(validate_landscape(10, 0), Err(LayoutError::EmptyImage));
    }

    // =========================================================================
    // LayoutParams tests
    // =========================================================================

    #[test]
    fn standard_height_is_1440() {
        assert_eq!(LayoutParams::default().standard_height(), 1440);
    }

    #[test]
    fn high_res_slice_width_rounds() {
        // 1001 * 0.75 = 750.75
        assert_eq!(
            LayoutParams::default().slice_dimensions(1001, SliceMode::HighRes),
            (751, 1001)
        );
    }

    // =========================================================================
    // calculate_slicing_plan tests
    // =========================================================================

    #[test]
    fn plan_exact_fit_at_native_scale() {
        // f = 1, base 4320, four whole slices, nothing left over
        assert_eq!(
            standard(4320, 1440),
            SlicingPlan {
                scaled_width: 4320,
                scaled_height: 1440,
                slice_count: 4,
                slice_width: 1080,
                slice_height: 1440,
            }
        );
    }

    #[test]
    fn plan_upscaled_exact_fit() {
        // f = 1.44, base 4320 → same plan as 4320x1440
        assert_eq!(standard(3000, 1000), standard(4320, 1440));
    }

    #[test]
    fn plan_hits_minimum_exactly() {
        // base 2160 = 2 * 1080
        let plan = standard(1500, 1000);
        assert_eq!(plan.slice_count, 2);
        assert_eq!((plan.scaled_width, plan.scaled_height), (2160, 1440));
    }

    #[test]
    fn plan_rounds_up_large_remainder() {
        // base 2880: two slices + 720 left (> 540) → three slices
        let plan = standard(2000, 1000);
        assert_eq!(plan.slice_count, 3);
        assert_eq!(plan.scaled_width, 3240);
        // 1000 * 3240 / 2000
        assert_eq!(plan.scaled_height, 1620);
    }

    #[test]
    fn plan_rounds_down_small_remainder() {
        // base 3600: three slices + 360 left (<= 540) → drop it
        let plan = standard(2500, 1000);
        assert_eq!(plan.slice_count, 3);
        assert_eq!((plan.scaled_width, plan.scaled_height), (3240, 1440));
    }

    #[test]
    fn plan_remainder_of_exactly_half_rounds_down() {
        // base 2700: two slices + 540 left, not strictly more than half
        let plan = standard(1875, 1000);
        assert_eq!(plan.slice_count, 2);
        assert_eq!(plan.scaled_height, 1440);
    }

    #[test]
    fn plan_minimum_branch_rederives_height() {
        // base 1728: one slice only → forced to two. The canvas keeps the
        // source aspect ratio and ends up taller than a slice; each band is
        // squeezed back into a 1440px tile when rendered.
        let plan = standard(1200, 1000);
        assert_eq!(plan.slice_count, 2);
        assert_eq!(plan.scaled_width, 2160);
        assert_eq!(plan.scaled_height, 1800);
        assert_ne!(plan.scaled_height, plan.slice_height);
    }

    #[test]
    fn plan_high_res_uses_native_height() {
        let plan = high_res(6000, 2000);
        assert_eq!((plan.slice_width, plan.slice_height), (1500, 2000));
        assert_eq!(plan.slice_count, 4);
        assert_eq!((plan.scaled_width, plan.scaled_height), (6000, 2000));
    }

    #[test]
    fn plan_high_res_rounds_up() {
        // slice 751x1001, base 3001 → 3 whole + 748 left (> 375.5)
        let plan = high_res(3001, 1001);
        assert_eq!(plan.slice_count, 4);
        assert_eq!(plan.scaled_width, 3004);
        assert_eq!(plan.scaled_height, 1002);
    }

    #[test]
    fn plan_tiny_landscape_scales_up() {
        // f = 1440, base 2880: two slices + 720 left (> 540) → three slices
        let plan = standard(2, 1);
        assert_eq!(
            (plan.slice_count, plan.scaled_width, plan.scaled_height),
            (3, 3240, 1620)
        );
    }

    #[test]
    fn high_res_slice_width_never_rounds_to_zero() {
        let params = LayoutParams {
            aspect: (1, 3),
            ..LayoutParams::default()
        };
        // 1 * 1/3 rounds to 0
        assert_eq!(params.slice_dimensions(1, SliceMode::HighRes), (1, 1));

        let plan = calculate_slicing_plan((5, 1), SliceMode::HighRes, &params);
        assert_eq!(plan.slice_count, 5);
        assert_eq!((plan.scaled_width, plan.scaled_height), (5, 1));
    }

    #[test]
    fn plan_respects_custom_minimum() {
        let params = LayoutParams {
            min_slices: 5,
            ..LayoutParams::default()
        };
        let plan = calculate_slicing_plan((4320, 1440), SliceMode::Standard, &params);
        assert_eq!(plan.slice_count, 5);
        assert_eq!(plan.scaled_width, 5400);
    }

    proptest! {
        #[test]
        fn plan_invariants_hold_for_any_landscape(
            h in 1u32..5000,
            extra in 1u32..40000,
            high in any::<bool>(),
        ) {
            let w = h + extra;
            let mode = SliceMode::from_high_res(high);
            let plan = calculate_slicing_plan((w, h), mode, &LayoutParams::default());

            prop_assert!(plan.slice_count >= 2);
            prop_assert_eq!(plan.scaled_width, plan.slice_count * plan.slice_width);
            if high {
                prop_assert_eq!(plan.slice_height, h);
            } else {
                prop_assert_eq!((plan.slice_width, plan.slice_height), (1080, 1440));
            }
            prop_assert_eq!(plan, calculate_slicing_plan((w, h), mode, &LayoutParams::default()));
        }
    }

    // =========================================================================
    // calculate_full_view_inset tests
    // =========================================================================

    #[test]
    fn inset_wide_panorama_is_width_constrained() {
        // margin 86, available 908x1268; 3:1 source → 908 x 302.67
        let inset = calculate_full_view_inset((3000, 1000), (1080, 1440), 0.08);
        assert_eq!(inset.width, 908);
        assert_eq!(inset.height, 303);
        assert_eq!(inset.x, 86);
        // (1440 - 302.67) / 2 = 568.67
        assert_eq!(inset.y, 569);
    }

    #[test]
    fn inset_is_horizontally_centered() {
        let inset = calculate_full_view_inset((8000, 1000), (1500, 2000), 0.08);
        assert_eq!(inset.x * 2 + inset.width, 1500);
    }

    #[test]
    fn inset_narrow_source_is_height_constrained() {
        // 1:2 source in a 100x100 canvas with no margin → 50 x 100
        let inset = calculate_full_view_inset((1, 2), (100, 100), 0.0);
        assert_eq!((inset.width, inset.height), (50, 100));
        assert_eq!((inset.x, inset.y), (25, 0));
    }
}
