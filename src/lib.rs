//! # Pano Slicer
//!
//! Cuts a landscape panorama into equal 3:4 portrait tiles for a swipeable
//! Instagram carousel, adds a letterboxed "full view" tile showing the whole
//! image, and bundles everything into a zip archive.
//!
//! # Pipeline
//!
//! ```text
//! bytes ─▶ source (sniff, probe, decode) ─▶ plan ─▶ render tiles + full view ─▶ package (zip)
//! ```
//!
//! Every step is driven by a [`session::Session`], a small state machine that
//! owns the loaded image and the rendered results.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | State machine: upload, toggle mode, process, download, reset |
//! | [`source`] | Upload validation (file type, landscape check) and decoding |
//! | [`imaging`] | Layout maths, the image backend, tile rendering and full-view composition |
//! | [`package`] | Zip archive assembly |
//! | [`naming`] | Archive layout: folder, entry names, README text |
//! | [`config`] | `config.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Calculations Separate From Pixels
//!
//! The slicing plan is a pure function of the original dimensions and the
//! mode. All the arithmetic lives in [`imaging`]'s calculations and is tested
//! without touching an image; the backend only executes what the plan says.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, Lanczos3 resampling and JPEG encoding all use the `image` crate.
//! No system libraries are needed, so the binary runs anywhere.
//!
//! ## Mode Belongs To The Results
//!
//! The archive folder (`standard_slices/` or `high_res_slices/`) is taken from
//! the mode the slices were rendered in. Changing the mode after processing
//! discards the old slices instead of packaging them under the wrong folder.

pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod package;
pub mod session;
pub mod source;

#[cfg(test)]
pub(crate) mod test_helpers;
