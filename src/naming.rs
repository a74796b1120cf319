//! Centralized naming for everything that lands in the archive.
//!
//! ```text
//! instagram_carousel_slices.zip
//! ├── standard_slices/           # or high_res_slices/
//! │   ├── slice_00_full_view.jpg
//! │   ├── slice_01.jpg
//! │   └── slice_NN.jpg
//! └── README.txt
//! ```
//!
//! Slice numbers are zero-padded to two digits so the files sort in carousel
//! order; a hundred slices or more simply widen the number.

use crate::imaging::SliceMode;

/// Default archive filename.
pub const ARCHIVE_NAME: &str = "instagram_carousel_slices.zip";

/// Name of the full-view entry inside the slice folder.
pub const FULL_VIEW_NAME: &str = "slice_00_full_view.jpg";

/// Name of the note at the archive root.
pub const README_NAME: &str = "README.txt";

/// Folder holding the images, chosen by mode.
pub fn folder_name(mode: SliceMode) -> &'static str {
    match mode {
        SliceMode::HighRes => "high_res_slices",
        SliceMode::Standard => "standard_slices",
    }
}

/// `slice_01.jpg` for index 1.
pub fn slice_file_name(index: u32) -> String {
    format!("slice_{:02}.jpg", index)
}

/// Full archive path of a slice entry.
pub fn slice_entry(mode: SliceMode, index: u32) -> String {
    format!("{}/{}", folder_name(mode), slice_file_name(index))
}

/// Full archive path of the full-view entry.
pub fn full_view_entry(mode: SliceMode) -> String {
    format!("{}/{}", folder_name(mode), FULL_VIEW_NAME)
}

/// The README placed next to the slice folder.
///
/// Everything is fixed text except the name of the last slice.
pub fn readme_text(slice_count: u32) -> String {
    let last = slice_file_name(slice_count);
    format!(
        "\
Instagram Panorama Slicer - Created by FUTC (@FUTC.Photography on Instagram)

IF YOU LIKE THIS TOOL, PLEASE CONSIDER SUPPORTING ME BY CHECKING OUT MY LIGHTROOM PRESET PACKS (this link includes a heavy discount): https://futc.gumroad.com/l/analogvibes2/panosplitter

This package contains:
- {full}: A complete view of your panorama that fits Instagram's 3:4 aspect ratio
- slice_01.jpg to {last}: Individual slices of your panorama

For best results on Instagram:
1. Make an instagram carousel post adding slice_01.jpg through {last} in order
2. Add {full} either as the first or last image in the carousel
",
        full = FULL_VIEW_NAME,
        last = last,
    )
}
