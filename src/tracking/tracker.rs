//! Cross-section tracker.
//!
//! Each step moves one voxel along the previous axis, re-estimates the frame,
//! samples the perpendicular plane and segments it. The deepest point of the
//! section becomes the next centre and its depth the next radius. Steps are
//! rejected by radius bounds, growth ratio and overlap; committed steps are
//! checked for a sudden radius change, which hands the branch over to the
//! bifurcation explorer.
//!
//! Branches are processed from an explicit worklist. Children of a
//! bifurcation are tracked depth-first in the order they were admitted.

use super::bifurcation::{explore_bifurcation, BifurcationSite};
use super::cross_section::sample_cross_section;
use super::frame::estimate_frame;
use super::state::{BranchEntry, BranchState, TrackingState};
use crate::angle::{angle_between_deg, direction_to_offset};
use crate::diagnostics::{StepDecision, StepRecord, TerminationReason};
use crate::image::VolumeF32;
use crate::region::{RegionDistanceSegmenter, RegionOptions};
use crate::segmenter::SegmentationParams;
use crate::shape::roundness;
use crate::types::offset_index;
use log::debug;

/// Result of a single tracker step.
#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome {
    Continue,
    /// The branch ended at a bifurcation; the admitted children follow.
    Branch(Vec<BranchEntry>),
    Terminate(TerminationReason),
}

/// Tracks branches through one volume with one parameter set.
pub struct Tracker<'a> {
    volume: &'a VolumeF32,
    params: &'a SegmentationParams,
    section_segmenter: RegionDistanceSegmenter,
}

impl<'a> Tracker<'a> {
    pub fn new(volume: &'a VolumeF32, params: &'a SegmentationParams) -> Self {
        let t = &params.tracking;
        let options =
            RegionOptions::with_threshold(t.section_threshold).with_sigmoid(t.section_sigmoid_offset);
        Self {
            volume,
            params,
            section_segmenter: RegionDistanceSegmenter::new(options),
        }
    }

    /// Tracks `start` and every branch spawned from it.
    pub fn run(&self, state: &mut TrackingState, start: BranchEntry) {
        let mut pending = vec![start];
        while let Some(entry) = pending.pop() {
            let branch_id = state.trace.branches_started;
            state.trace.branches_started += 1;
            debug!(
                "Tracker::run branch={} start={:?} radius={:.2}",
                branch_id, entry.center, entry.radius
            );
            let mut branch = BranchState::new(entry);
            loop {
                match self.step(state, &mut branch, branch_id) {
                    StepOutcome::Continue => {}
                    StepOutcome::Branch(children) => {
                        pending.extend(children.into_iter().rev());
                        break;
                    }
                    StepOutcome::Terminate(_) => break,
                }
            }
        }
    }

    /// Advances `branch` by one cross-section.
    pub fn step(
        &self,
        state: &mut TrackingState,
        branch: &mut BranchState,
        branch_id: usize,
    ) -> StepOutcome {
        let t = &self.params.tracking;
        let prev = *branch.front();
        let depth = branch.depth();
        let candidate = offset_index(prev.center, direction_to_offset(&prev.frame.axis));
        let mut record = StepRecord {
            branch: branch_id,
            depth,
            candidate,
            center: None,
            radius: None,
            roundness: None,
            overlap: None,
            variance: None,
            decision: StepDecision::Continue,
        };

        if !self.volume.contains(candidate) {
            state.log.pop_front_n(1);
            return self.finish(state, record, StepOutcome::Terminate(TerminationReason::OutOfBounds));
        }

        let mut frame =
            estimate_frame(self.volume, candidate, prev.radius).aligned_to(&prev.frame.axis);
        if depth > 1 && angle_between_deg(&frame.axis, &prev.frame.axis) > t.max_frame_deviation_deg
        {
            frame = prev.frame;
        }

        let section = sample_cross_section(self.volume, candidate, prev.radius, &frame);
        let region = match self
            .section_segmenter
            .run(&section.image, section.center_pixel())
        {
            Ok(region) => region,
            Err(e) => {
                debug!("Tracker::step region failed at {:?}: {}", candidate, e);
                return self.finish(state, record, StepOutcome::Terminate(TerminationReason::NoRegion));
            }
        };
        let side = section.side();
        let round = roundness(&region.mask, side, side);
        let (max_idx, max_distance) = region.max_distance();
        let radius = max_distance as f64;
        record.roundness = Some(round);
        record.radius = Some(radius);

        if !self.params.accepts_radius(radius) {
            state.log.pop_front_n(1);
            return self.finish(
                state,
                record,
                StepOutcome::Terminate(TerminationReason::RadiusOutOfRange),
            );
        }
        if radius >= t.growth_ratio_deep * prev.radius && depth > t.growth_depth {
            state.log.pop_front_n(2);
            return self.finish(
                state,
                record,
                StepOutcome::Terminate(TerminationReason::ImplausibleGrowth),
            );
        }
        if radius >= t.growth_ratio_any * prev.radius {
            state.log.pop_front_n(1);
            return self.finish(
                state,
                record,
                StepOutcome::Terminate(TerminationReason::ImplausibleGrowth),
            );
        }

        let (mut total, mut overlap) = (0usize, 0usize);
        for (i, &m) in region.mask.iter().enumerate() {
            let Some(voxel) = section.voxel_at(i).filter(|_| m) else {
                continue;
            };
            match state.written.get(voxel) {
                Some(true) => overlap += 1,
                Some(false) => {
                    state.written.set(voxel, true);
                }
                None => continue,
            }
            total += 1;
        }
        let overlap_ratio = if total > 0 {
            overlap as f64 / total as f64
        } else {
            0.0
        };
        record.overlap = Some(overlap_ratio);
        if overlap_ratio > t.max_overlap && depth > 1 {
            state.log.pop_front_n(1);
            return self.finish(state, record, StepOutcome::Terminate(TerminationReason::Overlap));
        }

        let Some(center) = section.voxel_at(max_idx) else {
            return self.finish(
                state,
                record,
                StepOutcome::Terminate(TerminationReason::MissingCenter),
            );
        };
        record.center = Some(center);

        branch.push_front(BranchEntry {
            center,
            radius,
            frame,
        });
        state.log.push_front(center, radius);
        state.trace.steps_committed += 1;
        if state.labels.get(center) == Some(0) {
            if let Some(centerline) = state.centerline.as_mut() {
                centerline.set(center, radius as f32);
            }
        }

        let depth = branch.depth();
        if depth >= t.max_branch_depth {
            return self.finish(state, record, StepOutcome::Terminate(TerminationReason::MaxDepth));
        }
        if depth <= t.warmup_depth {
            return self.finish(state, record, StepOutcome::Continue);
        }

        // Skip the newest radius; short branches also leave out the oldest.
        let window = if depth <= t.variance_window {
            depth.saturating_sub(2)
        } else {
            t.variance_window.saturating_sub(1)
        }
        .max(1);
        let mean = branch.radii().skip(1).take(window).sum::<f64>() / window as f64;
        let variance = (mean - radius).powi(2);
        record.variance = Some(variance);

        if variance < t.straight_variance && round >= t.straight_roundness {
            return self.finish(state, record, StepOutcome::Continue);
        }
        if variance > t.runaway_variance {
            state.log.pop_front_n(2);
            return self.finish(
                state,
                record,
                StepOutcome::Terminate(TerminationReason::RunawayVariance),
            );
        }

        let site = if prev.radius > radius {
            state.log.pop_front_n(3);
            BifurcationSite {
                trunk: prev.center,
                trunk_radius: prev.radius,
                previous: center,
                trunk_frame: frame,
            }
        } else {
            state.log.pop_front_n(2);
            BifurcationSite {
                trunk: center,
                trunk_radius: radius,
                previous: prev.center,
                trunk_frame: frame,
            }
        };
        debug!(
            "Tracker::step branch={} depth={} variance={:.2} roundness={:.3} -> bifurcation at {:?}",
            branch_id, depth, variance, round, site.trunk
        );
        let children = explore_bifurcation(self.volume, self.params, state, &site);
        self.finish(state, record, StepOutcome::Branch(children))
    }

    fn finish(
        &self,
        state: &mut TrackingState,
        mut record: StepRecord,
        outcome: StepOutcome,
    ) -> StepOutcome {
        let reason = match &outcome {
            StepOutcome::Continue => None,
            StepOutcome::Branch(_) => Some(TerminationReason::Bifurcation),
            StepOutcome::Terminate(reason) => Some(*reason),
        };
        if let Some(reason) = reason {
            state.trace.terminations.record(reason);
            debug!(
                "Tracker branch={} depth={} stopped: {:?}",
                record.branch, record.depth, reason
            );
            record.decision = StepDecision::Terminate(reason);
        }
        if self.params.debug {
            state.trace.steps.push(record);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Frame;
    use nalgebra::Vector3;

    fn tube_x(dims: [usize; 3], radius: f64) -> VolumeF32 {
        let mut v = VolumeF32::new(dims);
        let (cy, cz) = ((dims[1] / 2) as f64, (dims[2] / 2) as f64);
        for i in 0..v.len() {
            let p = v.index_of(i);
            let d2 = (p[1] as f64 - cy).powi(2) + (p[2] as f64 - cz).powi(2);
            if d2 <= radius * radius {
                v.data[i] = 200.0;
            }
        }
        v
    }

    /// Branch whose newest entry sits at `[15, 15, 15]`; `radii` are newest first
    /// and older entries step back along -x.
    fn branch_along_x(radii: &[f64]) -> BranchState {
        let entry = |k: usize| BranchEntry {
            center: [15 - k as i32, 15, 15],
            radius: radii[k],
            frame: Frame::identity(),
        };
        let mut branch = BranchState::new(entry(radii.len() - 1));
        for k in (0..radii.len() - 1).rev() {
            branch.push_front(entry(k));
        }
        branch
    }

    /// Tracking state whose log already holds `n` unrelated entries.
    fn state_with_log(dims: [usize; 3], n: usize) -> TrackingState {
        let mut state = TrackingState::new(dims, 1, false);
        for k in 0..n {
            state.log.push_front([0, 0, k as i32], 1.0);
        }
        state
    }

    #[test]
    fn leaving_the_volume_terminates_immediately() {
        let v = tube_x([16, 16, 16], 3.0);
        let params = SegmentationParams::default();
        let tracker = Tracker::new(&v, &params);
        let mut state = TrackingState::new(v.dims, 1, false);
        state.log.push_front([15, 8, 8], 3.0);
        let mut branch = BranchState::new(BranchEntry {
            center: [15, 8, 8],
            radius: 3.0,
            frame: Frame::identity(),
        });
        let out = tracker.step(&mut state, &mut branch, 0);
        assert_eq!(out, StepOutcome::Terminate(TerminationReason::OutOfBounds));
        assert!(state.log.is_empty());
        assert_eq!(state.trace.terminations.out_of_bounds, 1);
        assert_eq!(state.labels.count_nonzero(), 0);
    }

    #[test]
    fn step_inside_a_tube_commits_the_axis_voxel() {
        let v = tube_x([24, 30, 30], 5.0);
        let params = SegmentationParams {
            debug: true,
            ..Default::default()
        };
        let tracker = Tracker::new(&v, &params);
        let mut state = TrackingState::new(v.dims, 1, false);
        let mut branch = BranchState::new(BranchEntry {
            center: [5, 15, 15],
            radius: 5.0,
            frame: Frame::identity(),
        });
        let out = tracker.step(&mut state, &mut branch, 0);
        assert_eq!(out, StepOutcome::Continue);
        assert_eq!(branch.depth(), 2);
        assert_eq!(branch.front().center, [6, 15, 15]);
        let r = branch.front().radius;
        assert!((r - 5.0).abs() < 1.0, "radius={}", r);
        assert_eq!(state.log.len(), 1);
        assert_eq!(state.trace.steps.len(), 1);
        assert!(state.written.get([6, 15, 15]).unwrap_or(false));
        assert!(angle_between_deg(&branch.front().frame.axis, &Vector3::x()) < 1.0);
    }

    #[test]
    fn tube_is_followed_to_the_border() {
        let v = tube_x([48, 30, 30], 5.0);
        let params = SegmentationParams::default();
        let tracker = Tracker::new(&v, &params);
        let mut state = TrackingState::new(v.dims, 1, true);
        tracker.run(
            &mut state,
            BranchEntry {
                center: [11, 15, 15],
                radius: 5.0,
                frame: Frame::identity(),
            },
        );
        assert_eq!(state.trace.branches_started, 1);
        assert_eq!(state.trace.terminations.out_of_bounds, 1);
        assert_eq!(state.trace.terminations.total(), 1);
        assert!(state.log.iter().all(|e| e.center[1] == 15 && e.center[2] == 15));
        assert!(state.log.iter().all(|e| (e.radius - 5.0).abs() < 1.0));
        assert_eq!(state.log.front().map(|e| e.center[0]), Some(46));
        let centerline = state.centerline.as_ref().map(|c| c.get([20, 15, 15]));
        assert!(matches!(centerline, Some(Some(r)) if r > 3.0));
    }

    // A step from x=15 in a radius-5 tube measures a radius of about 4.6.

    #[test]
    fn radius_outside_the_bounds_pops_one_entry() {
        let v = tube_x([40, 30, 30], 5.0);
        let params = SegmentationParams {
            diameter_maximum: 6.0,
            ..Default::default()
        };
        let tracker = Tracker::new(&v, &params);
        let mut state = state_with_log(v.dims, 2);
        let mut branch = branch_along_x(&[5.0]);
        let out = tracker.step(&mut state, &mut branch, 0);
        assert_eq!(out, StepOutcome::Terminate(TerminationReason::RadiusOutOfRange));
        assert_eq!(state.log.len(), 1);
        assert_eq!(state.trace.steps_committed, 0);
    }

    #[test]
    fn doubling_on_a_deep_branch_pops_two_entries() {
        let v = tube_x([40, 30, 30], 5.0);
        let params = SegmentationParams::default();
        let tracker = Tracker::new(&v, &params);

        let mut state = state_with_log(v.dims, 3);
        let mut branch = branch_along_x(&[2.0; 4]);
        let out = tracker.step(&mut state, &mut branch, 0);
        assert_eq!(out, StepOutcome::Terminate(TerminationReason::ImplausibleGrowth));
        assert_eq!(state.log.len(), 1);

        // the same jump on a fresh branch is below the any-depth ratio
        let mut state = state_with_log(v.dims, 0);
        let mut branch = branch_along_x(&[2.0]);
        assert_eq!(tracker.step(&mut state, &mut branch, 0), StepOutcome::Continue);
    }

    #[test]
    fn tripling_at_any_depth_pops_one_entry() {
        let v = tube_x([40, 30, 30], 5.0);
        let params = SegmentationParams::default();
        let tracker = Tracker::new(&v, &params);
        let mut state = state_with_log(v.dims, 2);
        let mut branch = branch_along_x(&[1.0]);
        let out = tracker.step(&mut state, &mut branch, 0);
        assert_eq!(out, StepOutcome::Terminate(TerminationReason::ImplausibleGrowth));
        assert_eq!(state.log.len(), 1);
        assert_eq!(state.trace.terminations.implausible_growth, 1);
    }

    #[test]
    fn written_section_stops_all_but_the_first_step() {
        let v = tube_x([40, 30, 30], 5.0);
        let params = SegmentationParams::default();
        let tracker = Tracker::new(&v, &params);
        let claim = |state: &mut TrackingState| {
            for y in 0..30 {
                for z in 0..30 {
                    state.written.set([16, y, z], true);
                }
            }
        };

        let mut state = state_with_log(v.dims, 1);
        claim(&mut state);
        let mut branch = branch_along_x(&[5.0, 5.0]);
        let out = tracker.step(&mut state, &mut branch, 0);
        assert_eq!(out, StepOutcome::Terminate(TerminationReason::Overlap));
        assert!(state.log.is_empty());

        let mut state = state_with_log(v.dims, 0);
        claim(&mut state);
        let mut branch = branch_along_x(&[5.0]);
        assert_eq!(tracker.step(&mut state, &mut branch, 0), StepOutcome::Continue);
        assert_eq!(state.log.front().map(|e| e.center), Some([16, 15, 15]));
    }

    #[test]
    fn branch_stops_at_the_depth_limit_after_committing() {
        let v = tube_x([40, 30, 30], 5.0);
        let mut params = SegmentationParams::default();
        params.tracking.max_branch_depth = 2;
        let tracker = Tracker::new(&v, &params);
        let mut state = state_with_log(v.dims, 0);
        let mut branch = branch_along_x(&[5.0]);
        let out = tracker.step(&mut state, &mut branch, 0);
        assert_eq!(out, StepOutcome::Terminate(TerminationReason::MaxDepth));
        assert_eq!(branch.depth(), 2);
        assert_eq!(state.log.len(), 1);
        assert_eq!(state.trace.steps_committed, 1);
    }

    #[test]
    fn runaway_variance_pops_two_entries() {
        let v = tube_x([40, 30, 30], 5.0);
        let params = SegmentationParams::default();
        let tracker = Tracker::new(&v, &params);
        let mut state = state_with_log(v.dims, 4);
        let mut branch = branch_along_x(&[8.0; 4]);
        let out = tracker.step(&mut state, &mut branch, 0);
        assert_eq!(out, StepOutcome::Terminate(TerminationReason::RunawayVariance));
        assert_eq!(state.log.len(), 3);
        assert!(state.trace.bifurcations.is_empty());
    }

    #[test]
    fn narrowing_hands_over_from_the_previous_centre() {
        let v = tube_x([40, 30, 30], 5.0);
        let params = SegmentationParams::default();
        let tracker = Tracker::new(&v, &params);
        let mut state = state_with_log(v.dims, 4);
        let mut branch = branch_along_x(&[6.5; 4]);
        let out = tracker.step(&mut state, &mut branch, 0);
        assert_eq!(out, StepOutcome::Branch(Vec::new()));
        assert_eq!(state.log.len(), 2);
        assert_eq!(state.trace.terminations.bifurcation, 1);
        let event = &state.trace.bifurcations[0];
        assert_eq!(event.trunk, [15, 15, 15]);
        assert_eq!(event.trunk_radius, 6.5);
        // a window of 2.5 × 6.5 does not fit around x=15, y=15
        assert!(event.aborted);
    }

    #[test]
    fn widening_hands_over_from_the_new_centre() {
        let v = tube_x([40, 30, 30], 5.0);
        let params = SegmentationParams::default();
        let tracker = Tracker::new(&v, &params);
        let mut state = state_with_log(v.dims, 4);
        let mut branch = branch_along_x(&[3.0; 4]);
        let out = tracker.step(&mut state, &mut branch, 0);
        assert!(matches!(out, StepOutcome::Branch(_)), "{:?}", out);
        assert_eq!(state.log.len(), 3);
        let event = &state.trace.bifurcations[0];
        assert_eq!(event.trunk, [16, 15, 15]);
        assert!(!event.aborted);
        assert!((event.trunk_radius - 5.0).abs() < 1.0);
    }

    #[test]
    fn bifurcation_measures_against_the_frame_of_the_triggering_step() {
        let v = tube_x([40, 30, 30], 5.0);
        let params = SegmentationParams::default();
        let tracker = Tracker::new(&v, &params);
        // earlier entries lean 20° off the tube; the new frame is accepted
        let (s, c) = 20f64.to_radians().sin_cos();
        let tilted = Frame {
            axis: Vector3::new(c, s, 0.0),
            cross1: Vector3::new(-s, c, 0.0),
            cross2: Vector3::z(),
        };
        let entry = |k: i32| BranchEntry {
            center: [15 - k, 15, 15],
            radius: 6.5,
            frame: tilted,
        };
        let mut branch = BranchState::new(entry(3));
        for k in (0..3).rev() {
            branch.push_front(entry(k));
        }
        let mut state = state_with_log(v.dims, 4);
        let out = tracker.step(&mut state, &mut branch, 0);
        assert!(matches!(out, StepOutcome::Branch(_)), "{:?}", out);

        let committed = branch.front().frame.axis;
        assert!(angle_between_deg(&committed, &Vector3::x()) < 1.0);
        let measured = Vector3::from(state.trace.bifurcations[0].trunk_axis);
        assert_eq!(measured, committed);
        assert!(angle_between_deg(&measured, &tilted.axis) > 15.0);
    }
}
