//! Image processing: slicing geometry, with the `image` crate doing the pixels.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **Plan** | [`calculate_slicing_plan`] (pure arithmetic) |
//! | **Slice** | `resize_exact` (Lanczos3) + `crop_imm` |
//! | **Full view** | `resize_exact` + `imageops::replace` on a white canvas |
//! | **Encode** | `JpegEncoder`, quality 95 |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for plan and inset math (unit testable)
//! - **Parameters**: Data structures describing drawing operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{
    InsetRect, LayoutError, LayoutParams, SliceMode, SlicingPlan, calculate_full_view_inset,
    calculate_slicing_plan, validate_landscape,
};
pub use operations::{
    FullViewComposite, RenderConfig, Slice, compose_full_view, plan_full_view, render_slices,
};
pub use params::{ComposeParams, Quality, SliceParams};
pub use rust_backend::RustBackend;
