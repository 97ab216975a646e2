//! Bifurcation explorer.
//!
//! Around a trunk point the vesselness of a cubic window is segmented from
//! the trunk; where the resulting region crosses the window faces, the
//! deepest pixel of every face component is a candidate branch start.
//! Candidates are filtered by location, radius and proximity, then admitted
//! by their direction relative to the trunk.

use super::frame::estimate_frame;
use super::state::{BranchEntry, TrackingState};
use crate::angle::angle_between_deg;
use crate::diagnostics::BifurcationEvent;
use crate::image::{rescale_intensity, SubVolume, VolumeF32};
use crate::region::{RegionDistanceSegmenter, RegionOptions, RegionOutput};
use crate::segmenter::SegmentationParams;
use crate::shape::{label_components, thin, vesselness, VesselnessParams};
use crate::types::{direction_between, Frame, Index3};
use log::debug;

/// Where and how a bifurcation search is started.
#[derive(Clone, Copy, Debug)]
pub struct BifurcationSite {
    pub trunk: Index3,
    pub trunk_radius: f64,
    /// Reference point on the trunk, on the other side of the junction
    pub previous: Index3,
    /// Frame accepted at the step that triggered the search
    pub trunk_frame: Frame,
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    /// Global voxel
    center: Index3,
    radius: f64,
}

/// Searches for branches leaving `site` and returns the admitted branch starts.
///
/// The thresholded vesselness region is labelled in `state` (and marked as
/// written) so that the children do not count the junction as overlap.
pub fn explore_bifurcation(
    volume: &VolumeF32,
    params: &SegmentationParams,
    state: &mut TrackingState,
    site: &BifurcationSite,
) -> Vec<BranchEntry> {
    let bp = &params.bifurcation;
    let trunk_radius = site.trunk_radius;
    let half = (bp.region_scale * trunk_radius).floor() as i32 + 1;
    let mut event = BifurcationEvent {
        trunk: site.trunk,
        trunk_radius,
        trunk_axis: site.trunk_frame.axis.into(),
        aborted: false,
        raw_candidates: 0,
        filtered_candidates: 0,
        admitted: 0,
        admitted_centers: Vec::new(),
    };

    if !volume.contains_cube(site.trunk, half) {
        debug!(
            "Bifurcation at {:?} aborted: window half={} leaves the volume",
            site.trunk, half
        );
        event.aborted = true;
        state.trace.bifurcations.push(event);
        return Vec::new();
    }

    let sub = SubVolume::extract_half(volume, site.trunk, half).rescaled();
    let vp = VesselnessParams {
        sigma_min: trunk_radius * bp.sigma_min_ratio,
        sigma_max: trunk_radius * bp.sigma_max_ratio,
        steps: bp.scales,
        gamma: bp.gamma,
    };
    let mut ves = vesselness(&sub.volume, &vp);
    rescale_intensity(&mut ves.data, 0.0, 255.0);

    let segmenter = RegionDistanceSegmenter::new(RegionOptions::with_threshold(bp.vesselness_threshold));
    let c = half as usize;
    let region = match segmenter.run(&ves, [c, c, c]) {
        Ok(region) => region,
        Err(e) => {
            debug!("Bifurcation at {:?} aborted: {}", site.trunk, e);
            event.aborted = true;
            state.trace.bifurcations.push(event);
            return Vec::new();
        }
    };

    if let Some(centerline) = state.centerline.as_mut() {
        let skeleton = thin(&region.mask, ves.dims);
        for (i, _) in skeleton.iter().enumerate().filter(|&(_, &s)| s) {
            centerline.set(sub.to_global(ves.index_of(i)), region.distance[i]);
        }
    }

    let raw = face_candidates(&sub, &region);
    event.raw_candidates = raw.len();
    let filtered: Vec<Candidate> = raw
        .into_iter()
        .filter(|c| {
            volume.contains(c.center)
                && state.labels.get(c.center) == Some(0)
                && c.radius <= trunk_radius
        })
        .collect();
    let filtered = deduplicate(filtered, trunk_radius);
    event.filtered_candidates = filtered.len();

    for (i, _) in region.mask.iter().enumerate().filter(|&(_, &m)| m) {
        let g = sub.to_global(ves.index_of(i));
        state.label_voxel(g);
        state.written.set(g, true);
    }

    let prev_axis = site.trunk_frame.axis;
    let mut admitted = Vec::new();
    for cand in filtered {
        if !params.accepts_radius(cand.radius) {
            continue;
        }
        let outward = direction_between(site.trunk, cand.center);
        let a1 = angle_between_deg(&prev_axis, &outward);
        let a2 = angle_between_deg(&direction_between(site.previous, cand.center), &outward);
        if a2 > bp.max_forward_angle_deg {
            continue;
        }
        let frame = estimate_frame(volume, cand.center, cand.radius).aligned_to(&outward);
        let a3 = angle_between_deg(&frame.axis, &prev_axis);
        if a3 > bp.max_axis_angle_deg {
            continue;
        }
        let narrowing = (trunk_radius - cand.radius) / trunk_radius;
        if a1 > bp.widening_angle_deg && narrowing < 0.0 {
            continue;
        }
        debug!(
            "Bifurcation admitted {:?} radius={:.2} a1={:.1} a2={:.1} a3={:.1}",
            cand.center, cand.radius, a1, a2, a3
        );
        admitted.push(BranchEntry {
            center: cand.center,
            radius: cand.radius,
            frame,
        });
    }

    event.admitted = admitted.len();
    event.admitted_centers = admitted.iter().map(|b| b.center).collect();
    debug!(
        "Bifurcation at {:?} radius={:.2}: raw={} filtered={} admitted={}",
        site.trunk, trunk_radius, event.raw_candidates, event.filtered_candidates, event.admitted
    );
    state.trace.bifurcations.push(event);
    admitted
}

/// Deepest pixel of every region component on each of the six window faces.
fn face_candidates(sub: &SubVolume, region: &RegionOutput) -> Vec<Candidate> {
    let n = region.shape;
    let mut out = Vec::new();
    for face in 0..6 {
        let axis = face / 2;
        let fixed = if face % 2 == 0 { 0 } else { n[axis] - 1 };
        let (ua, va) = match axis {
            0 => (1, 2),
            1 => (0, 2),
            _ => (0, 1),
        };
        let (w, h) = (n[ua], n[va]);
        let local_of = |u: usize, v: usize| {
            let mut p = [0usize; 3];
            p[axis] = fixed;
            p[ua] = u;
            p[va] = v;
            p[0] + n[0] * (p[1] + n[1] * p[2])
        };
        let mask: Vec<bool> = (0..w * h).map(|k| region.mask[local_of(k % w, k / w)]).collect();
        let (labels, count) = label_components(&mask, w, h);
        let mut best: Vec<Option<(f32, usize)>> = vec![None; count as usize + 1];
        for (k, &l) in labels.iter().enumerate().filter(|&(_, &l)| l != 0) {
            let local = local_of(k % w, k / w);
            let d = region.distance[local];
            let slot = &mut best[l as usize];
            if d > slot.map_or(0.0, |(bd, _)| bd) {
                *slot = Some((d, local));
            }
        }
        for (d, local) in best.into_iter().flatten() {
            let p = [
                (local % n[0]) as i32,
                ((local / n[0]) % n[1]) as i32,
                (local / (n[0] * n[1])) as i32,
            ];
            out.push(Candidate {
                center: sub.to_global(p),
                radius: d as f64,
            });
        }
    }
    out
}

/// Collapses candidates closer than the trunk radius, keeping the deeper one.
/// A candidate's radius is the distance-map value at its own voxel.
fn deduplicate(mut cands: Vec<Candidate>, trunk_radius: f64) -> Vec<Candidate> {
    let dist = |a: &Candidate, b: &Candidate| direction_between(a.center, b.center).norm();
    let mut i = 0;
    while i < cands.len() {
        let mut j = i + 1;
        let mut dropped_i = false;
        while j < cands.len() {
            let d = dist(&cands[i], &cands[j]);
            if d <= 0.01 {
                cands.remove(j);
            } else if d < trunk_radius {
                if cands[j].radius > cands[i].radius {
                    cands.remove(i);
                    dropped_i = true;
                    break;
                }
                cands.remove(j);
            } else {
                j += 1;
            }
        }
        if !dropped_i {
            i += 1;
        }
    }
    cands
}
