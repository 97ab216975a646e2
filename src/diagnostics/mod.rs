//! Diagnostics data model returned by [`crate::VesselSegmenter`].
//!
//! `SegmentationReport` bundles the segmentation output with a
//! `TrackingTrace`: seed resolution, branch and termination statistics,
//! bifurcation analyses, the smoothing summary and stage timings. The trace
//! is serializable (camelCase) for tooling.

pub mod timing;
pub mod trace;

pub use timing::{StageTiming, TimingBreakdown};
pub use trace::{
    BifurcationEvent, SeedStage, SmoothingStage, StepDecision, StepRecord, TerminationCounts,
    TerminationReason, TrackingTrace,
};

use crate::types::SegmentationResult;

/// Result of a run together with its trace.
#[derive(Clone, Debug)]
pub struct SegmentationReport {
    pub result: SegmentationResult,
    pub trace: TrackingTrace,
}
