//! Seeded vessel segmentation.
//!
//! Overview
//! - Copies an optional prior label volume into the output and, if given,
//!   moves the seed along the seed → direction-seed line to the first
//!   unlabelled voxel.
//! - Estimates the first radius by climbing the in-region distance map of a
//!   window around the seed. Failure here ends the run with no new labels.
//! - Estimates the seed frame, orients its axis towards the direction seed and
//!   starts the [`Tracker`] one step behind the seed.
//! - Fills balls along the committed centres ([`smooth_output`]).
//!
//! Modules
//! - [`params`] – configuration types, deserializable from JSON.

pub mod params;

pub use params::{BifurcationParams, SeedParams, SegmentationParams, SmoothingParams, TrackingParams};

use crate::angle::{direction_to_offset, unit_vector_between};
use crate::diagnostics::timing::elapsed_ms;
use crate::diagnostics::{SegmentationReport, SeedStage, TimingBreakdown};
use crate::image::{LabelVolume, VolumeF32};
use crate::tracking::{
    estimate_first_radius, estimate_frame, resolve_seed, smooth_output, BranchEntry, Tracker,
    TrackingState,
};
use crate::types::{sub_index, CenterRadius, Index3, SegmentationResult};
use log::{debug, warn};
use std::time::Instant;

/// Entry point: segments the vessel tree reachable from one seed.
#[derive(Clone, Debug, Default)]
pub struct VesselSegmenter {
    params: SegmentationParams,
}

impl VesselSegmenter {
    pub fn new(params: SegmentationParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SegmentationParams {
        &self.params
    }

    pub fn set_params(&mut self, params: SegmentationParams) {
        self.params = params;
    }

    /// Segments from `seed`, heading towards `direction_seed`.
    pub fn segment(
        &self,
        volume: &VolumeF32,
        seed: Index3,
        direction_seed: Index3,
        prior: Option<&LabelVolume>,
    ) -> SegmentationResult {
        self.segment_with_diagnostics(volume, seed, direction_seed, prior)
            .result
    }

    /// Like [`segment`](Self::segment), also returning the tracking trace.
    pub fn segment_with_diagnostics(
        &self,
        volume: &VolumeF32,
        seed: Index3,
        direction_seed: Index3,
        prior: Option<&LabelVolume>,
    ) -> SegmentationReport {
        let params = &self.params;
        debug!(
            "VesselSegmenter::segment start dims={:?} seed={:?} direction_seed={:?} diameter=[{}, {}]",
            volume.dims, seed, direction_seed, params.diameter_minimum, params.diameter_maximum
        );
        let total_start = Instant::now();
        let mut state = TrackingState::new(volume.dims, params.output_label, params.generate_centerline);
        state.trace.seed = SeedStage {
            requested: seed,
            direction_seed,
            ..Default::default()
        };

        let seed_start = Instant::now();
        let initial_direction = unit_vector_between(seed, direction_seed);
        let mut seed = seed;
        match prior {
            Some(p) if p.dims == volume.dims => {
                state.merge_prior(p);
                seed = resolve_seed(&state.labels, seed, direction_seed);
                debug!("VesselSegmenter::segment prior merged, seed -> {:?}", seed);
            }
            Some(p) => warn!(
                "VesselSegmenter::segment ignoring prior labels: extents {:?} differ from volume {:?}",
                p.dims, volume.dims
            ),
            None => {}
        }
        state.trace.seed.resolved = Some(seed);

        let radius = match estimate_first_radius(volume, seed, params) {
            Ok(r) => r,
            Err(e) => {
                warn!("VesselSegmenter::segment no output: {}", e);
                state.trace.seed.failure = Some(e.to_string());
                let seed_ms = elapsed_ms(seed_start);
                let mut timings = TimingBreakdown::with_total(elapsed_ms(total_start));
                timings.push("seed", seed_ms);
                return finish(state, Vec::new(), timings);
            }
        };
        state.trace.seed.initial_radius = Some(radius);
        let frame = estimate_frame(volume, seed, radius).aligned_to(&initial_direction);
        let start = sub_index(seed, direction_to_offset(&frame.axis));
        let seed_ms = elapsed_ms(seed_start);
        debug!(
            "VesselSegmenter::segment first radius={:.3} axis=({:.3}, {:.3}, {:.3}) start={:?}",
            radius, frame.axis.x, frame.axis.y, frame.axis.z, start
        );

        let tracking_start = Instant::now();
        Tracker::new(volume, params).run(
            &mut state,
            BranchEntry {
                center: start,
                radius,
                frame,
            },
        );
        let tracking_ms = elapsed_ms(tracking_start);

        let smoothing_start = Instant::now();
        let (centers, smoothing) = smooth_output(
            volume,
            &mut state.labels,
            &mut state.log,
            params.output_label,
            &params.smoothing,
        );
        state.trace.smoothing = smoothing;
        let smoothing_ms = elapsed_ms(smoothing_start);

        let mut timings = TimingBreakdown::with_total(elapsed_ms(total_start));
        timings.push("seed", seed_ms);
        timings.push("tracking", tracking_ms);
        timings.push("smoothing", smoothing_ms);
        debug!(
            "VesselSegmenter::segment done branches={} steps={} bifurcations={} labeled={} total_ms={:.3}",
            state.trace.branches_started,
            state.trace.steps_committed,
            state.trace.bifurcations.len(),
            state.labels.count_nonzero(),
            timings.total_ms
        );
        finish(state, centers, timings)
    }
}

fn finish(
    state: TrackingState,
    centers: Vec<CenterRadius>,
    timings: TimingBreakdown,
) -> SegmentationReport {
    let TrackingState {
        labels,
        centerline,
        mut trace,
        ..
    } = state;
    trace.timings = timings;
    SegmentationReport {
        result: SegmentationResult {
            labels,
            centerline,
            centers,
        },
        trace,
    }
}
