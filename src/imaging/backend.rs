//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the five operations every backend must
//! support: identify, decode, slice, compose and encode.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use a recording mock so session and operation logic can be
//! checked without pushing real pixels around.

use super::params::{ComposeParams, Quality, SliceParams};
use image::{DynamicImage, RgbImage};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// Backends are shared with blocking worker threads and rayon, hence
/// `Send + Sync`.
pub trait ImageBackend: Send + Sync {
    /// Read image dimensions from the header without decoding pixels.
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError>;

    /// Decode the full image.
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError>;

    /// Resample the source to the scaled canvas and cut it into tiles,
    /// left to right.
    fn slice(
        &self,
        source: &DynamicImage,
        params: &SliceParams,
    ) -> Result<Vec<RgbImage>, BackendError>;

    /// Draw the letterboxed full-view tile.
    fn compose(
        &self,
        source: &DynamicImage,
        params: &ComposeParams,
    ) -> Result<RgbImage, BackendError>;

    /// Encode a tile as JPEG.
    fn encode_jpeg(&self, tile: &RgbImage, quality: Quality) -> Result<Vec<u8>, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock backend that records operations and returns blank images of the
    /// requested sizes. Uses Mutex (not RefCell) so it is Sync.
    pub struct MockBackend {
        pub dimensions: Dimensions,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify,
        Decode,
        Slice {
            scaled_width: u32,
            scaled_height: u32,
            tile_width: u32,
            tile_height: u32,
            count: u32,
        },
        Compose {
            canvas_width: u32,
            canvas_height: u32,
        },
        Encode {
            width: u32,
            height: u32,
            quality: u8,
        },
    }

    impl MockBackend {
        pub fn with_dimensions(width: u32, height: u32) -> Self {
            Self {
                dimensions: Dimensions { width, height },
                operations: Mutex::new(Vec::new()),
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        fn record(&self, op: RecordedOp) {
            self.operations.lock().unwrap().push(op);
        }
    }

    impl ImageBackend for MockBackend {
        fn identify(&self, _bytes: &[u8]) -> Result<Dimensions, BackendError> {
            self.record(RecordedOp::Identify);
            Ok(self.dimensions)
        }

        fn decode(&self, _bytes: &[u8]) -> Result<DynamicImage, BackendError> {
            self.record(RecordedOp::Decode);
            Ok(DynamicImage::new_rgb8(
                self.dimensions.width,
                self.dimensions.height,
            ))
        }

        fn slice(
            &self,
            _source: &DynamicImage,
            params: &SliceParams,
        ) -> Result<Vec<RgbImage>, BackendError> {
            self.record(RecordedOp::Slice {
                scaled_width: params.scaled_width,
                scaled_height: params.scaled_height,
                tile_width: params.tile_width,
                tile_height: params.tile_height,
                count: params.count,
            });
            Ok((0..params.count)
                .map(|_| RgbImage::new(params.tile_width, params.tile_height))
                .collect())
        }

        fn compose(
            &self,
            _source: &DynamicImage,
            params: &ComposeParams,
        ) -> Result<RgbImage, BackendError> {
            self.record(RecordedOp::Compose {
                canvas_width: params.canvas_width,
                canvas_height: params.canvas_height,
            });
            Ok(RgbImage::new(params.canvas_width, params.canvas_height))
        }

        fn encode_jpeg(&self, tile: &RgbImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
            self.record(RecordedOp::Encode {
                width: tile.width(),
                height: tile.height(),
                quality: quality.value(),
            });
            // SOI + EOI markers; enough to be recognisable in archives.
            Ok(vec![0xFF, 0xD8, 0xFF, 0xD9])
        }
    }

    #[test]
    fn mock_records_identify() {
        let backend = MockBackend::with_dimensions(800, 600);

        let result = backend.identify(&[]).unwrap();
        assert_eq!(result.width, 800);
        assert_eq!(result.height, 600);

        assert_eq!(backend.get_operations(), vec![RecordedOp::Identify]);
    }

    #[test]
    fn mock_slice_returns_requested_tiles() {
        let backend = MockBackend::with_dimensions(30, 10);
        let source = backend.decode(&[]).unwrap();

        let tiles = backend
            .slice(
                &source,
                &SliceParams {
                    scaled_width: 24,
                    scaled_height: 8,
                    tile_width: 6,
                    tile_height: 8,
                    count: 4,
                },
            )
            .unwrap();

        assert_eq!(tiles.len(), 4);
        assert!(tiles.iter().all(|t| t.dimensions() == (6, 8)));
        assert!(matches!(
            backend.get_operations()[1],
            RecordedOp::Slice { count: 4, .. }
        ));
    }
}
