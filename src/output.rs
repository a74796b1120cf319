//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Plan
//!
//! ```text
//! Image Details
//!     Original size: 3000×1000
//!     Mode: standard
//!     Scaled size: 4320×1440
//!     Slices: 4
//!     Slice resolution: 1080×1440
//! ```
//!
//! ## Slice
//!
//! ```text
//! standard_slices/
//!     Full View 1080×1440
//!     01 1080×1440
//!     02 1080×1440
//!
//! Saved instagram_carousel_slices.zip (5 entries, 1.2 MB) → out.zip
//! ```
//!
//! Each section has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::imaging::{SliceMode, SlicingPlan};
use crate::naming;
use crate::package::Archive;
use crate::session::ProcessedRun;
use serde::Serialize;
use std::path::Path;

/// Machine-readable form of the plan command.
#[derive(Debug, Clone, Serialize)]
pub struct PlanSummary {
    pub original_width: u32,
    pub original_height: u32,
    pub mode: SliceMode,
    #[serde(flatten)]
    pub plan: SlicingPlan,
}

impl PlanSummary {
    pub fn new(original: (u32, u32), mode: SliceMode, plan: SlicingPlan) -> Self {
        Self {
            original_width: original.0,
            original_height: original.1,
            mode,
            plan,
        }
    }
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn size(width: u32, height: u32) -> String {
    format!("{width}×{height}")
}

fn mode_label(mode: SliceMode) -> &'static str {
    match mode {
        SliceMode::Standard => "standard",
        SliceMode::HighRes => "high-res",
    }
}

/// Human-readable byte count: `512 B`, `14.2 KB`, `3.4 MB`.
fn format_bytes(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

// ============================================================================
// Plan
// ============================================================================

pub fn format_plan(summary: &PlanSummary) -> Vec<String> {
    let plan = &summary.plan;
    vec![
        "Image Details".to_string(),
        format!(
            "{}Original size: {}",
            indent(1),
            size(summary.original_width, summary.original_height)
        ),
        format!("{}Mode: {}", indent(1), mode_label(summary.mode)),
        format!(
            "{}Scaled size: {}",
            indent(1),
            size(plan.scaled_width, plan.scaled_height)
        ),
        format!("{}Slices: {}", indent(1), plan.slice_count),
        format!(
            "{}Slice resolution: {}",
            indent(1),
            size(plan.slice_width, plan.slice_height)
        ),
    ]
}

pub fn print_plan(summary: &PlanSummary) {
    for line in format_plan(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Slice
// ============================================================================

/// The rendered tiles, full view first, under their archive folder.
pub fn format_slices(run: &ProcessedRun) -> Vec<String> {
    let mut lines = Vec::with_capacity(run.slices.len() + 2);
    lines.push(format!("{}/", naming::folder_name(run.mode)));
    lines.push(format!(
        "{}Full View {}",
        indent(1),
        size(run.full_view.width, run.full_view.height)
    ));
    for slice in &run.slices {
        lines.push(format!(
            "{}{:02} {}",
            indent(1),
            slice.index,
            size(slice.width, slice.height)
        ));
    }
    lines
}

pub fn print_slices(run: &ProcessedRun) {
    for line in format_slices(run) {
        println!("{}", line);
    }
}

pub fn format_archive(archive: &Archive, path: &Path) -> String {
    format!(
        "Saved {} ({} entries, {}) → {}",
        archive.file_name,
        archive.entries.len(),
        format_bytes(archive.bytes.len()),
        path.display()
    )
}

pub fn print_archive(archive: &Archive, path: &Path) {
    println!();
    println!("{}", format_archive(archive, path));
}
