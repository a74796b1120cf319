//! Zip packaging of a processed run.
//!
//! The archive layout is described in [`naming`](crate::naming). JPEG entries
//! are stored as-is (they are already compressed); the README is deflated.

use crate::imaging::{FullViewComposite, Slice, SliceMode};
use crate::naming;
use std::io::{Cursor, Write};
use std::path::Path;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Error, Debug)]
pub enum PackageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Nothing to package")]
    Empty,
}

/// An in-memory zip archive ready to be saved.
#[derive(Debug, Clone)]
pub struct Archive {
    /// Suggested filename, e.g. `instagram_carousel_slices.zip`.
    pub file_name: String,
    /// Entry paths in archive order.
    pub entries: Vec<String>,
    pub bytes: Vec<u8>,
}

impl Archive {
    /// Write the archive to `path`.
    pub fn write_to(&self, path: &Path) -> Result<(), PackageError> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

/// Bundle the full view (as slice 0), every slice and the README.
pub fn package(
    file_name: &str,
    mode: SliceMode,
    full_view: &FullViewComposite,
    slices: &[Slice],
) -> Result<Archive, PackageError> {
    if slices.is_empty() {
        return Err(PackageError::Empty);
    }

    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let mut entries = Vec::with_capacity(slices.len() + 2);

    let full_view_entry = naming::full_view_entry(mode);
    zip.start_file(full_view_entry.as_str(), stored)?;
    zip.write_all(&full_view.jpeg)?;
    entries.push(full_view_entry);

    for slice in slices {
        let entry = naming::slice_entry(mode, slice.index);
        zip.start_file(entry.as_str(), stored)?;
        zip.write_all(&slice.jpeg)?;
        entries.push(entry);
    }

    zip.start_file(naming::README_NAME, deflated)?;
    zip.write_all(naming::readme_text(slices.len() as u32).as_bytes())?;
    entries.push(naming::README_NAME.to_string());

    let bytes = zip.finish()?.into_inner();
    log::debug!("packaged {} entries, {} bytes", entries.len(), bytes.len());

    Ok(Archive {
        file_name: file_name.to_string(),
        entries,
        bytes,
    })
}
