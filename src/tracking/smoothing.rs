use super::centers::CenterRadiusLog;
use crate::diagnostics::SmoothingStage;
use crate::image::{LabelVolume, VolumeF32};
use crate::segmenter::SmoothingParams;
use crate::types::{offset_index, CenterRadius, Index3};
use log::debug;

/// Offsets of the digital ball of integer radius `r`.
fn ball_offsets(r: i32) -> Vec<Index3> {
    let limit = (r as f64 + 0.5).powi(2);
    let mut out = Vec::new();
    for dz in -r..=r {
        for dy in -r..=r {
            for dx in -r..=r {
                if ((dx * dx + dy * dy + dz * dz) as f64) <= limit {
                    out.push([dx, dy, dz]);
                }
            }
        }
    }
    out
}

/// Drains `log` and fills a ball around every centre.
///
/// Only unlabelled voxels whose input intensity reaches
/// `params.min_intensity` are labelled. Entries with a radius at or above
/// `params.max_radius` are drained without filling. Returns the drained
/// entries in order together with a summary.
pub fn smooth_output(
    volume: &VolumeF32,
    labels: &mut LabelVolume,
    log: &mut CenterRadiusLog,
    label: u16,
    params: &SmoothingParams,
) -> (Vec<CenterRadius>, SmoothingStage) {
    let mut stage = SmoothingStage::default();
    let mut centers = Vec::with_capacity(log.len());
    let mut cached: Option<(i32, Vec<Index3>)> = None;
    for entry in log.drain() {
        stage.entries += 1;
        centers.push(entry);
        if entry.radius >= params.max_radius {
            stage.skipped_large += 1;
            continue;
        }
        stage.applied += 1;
        let r = entry.radius.max(0.0).floor() as i32;
        if cached.as_ref().map(|(cr, _)| *cr) != Some(r) {
            cached = Some((r, ball_offsets(r)));
        }
        let offsets = cached.as_ref().map(|(_, o)| o.as_slice()).unwrap_or(&[]);
        for &o in offsets {
            let p = offset_index(entry.center, o);
            if labels.get(p) != Some(0) {
                continue;
            }
            if volume.value_or_zero(p) >= params.min_intensity {
                labels.set(p, label);
                stage.voxels_labeled += 1;
            }
        }
    }
    debug!(
        "smooth_output: entries={} applied={} skipped={} voxels={}",
        stage.entries, stage.applied, stage.skipped_large, stage.voxels_labeled
    );
    (centers, stage)
}
