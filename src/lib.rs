#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod config;
pub mod diagnostics;
pub mod image;
pub mod segmenter;
pub mod types;

// Building blocks of the tracker; public for tools and tests.
pub mod angle;
pub mod filters;
pub mod region;
pub mod shape;
pub mod tracking;

// --- High-level re-exports -------------------------------------------------

// Main entry point and results.
pub use crate::segmenter::{SegmentationParams, VesselSegmenter};
pub use crate::types::{CenterRadius, SegmentationResult};

// Diagnostics returned by the segmenter.
pub use crate::diagnostics::{SegmentationReport, TrackingTrace};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use vessel_tracker::prelude::*;
///
/// # fn main() {
/// let volume = VolumeF32::new([64, 64, 64]);
/// let segmenter = VesselSegmenter::new(SegmentationParams::default());
/// let result = segmenter.segment(&volume, [10, 32, 32], [20, 32, 32], None);
/// println!("labeled={} centres={}", result.labeled_voxels(), result.centers.len());
/// # }
/// ```
pub mod prelude {
    pub use crate::image::{LabelVolume, VolumeF32};
    pub use crate::types::{Frame, Index3};
    pub use crate::{SegmentationParams, SegmentationResult, VesselSegmenter};
}
