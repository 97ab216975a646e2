//! Local vessel frame from the Hessian at a point.
use crate::filters::{hessian_at, sorted_eigen};
use crate::image::{SubVolume, VolumeF32};
use crate::types::{Frame, Index3};
use log::trace;

/// Estimates the local frame at `center` using Gaussian scale `radius`.
///
/// A cube of half-width `floor(radius) + 1` is cut around the point and
/// rescaled to `[0, 255]`; the Hessian at its centre is decomposed and the
/// eigenvectors, ordered by increasing eigenvalue magnitude, become
/// `axis`, `cross1` and `cross2`. The sign of `axis` is arbitrary.
pub fn estimate_frame(volume: &VolumeF32, center: Index3, radius: f64) -> Frame {
    let radius = radius.max(1.0);
    let sub = SubVolume::extract(volume, center, radius).rescaled();
    let h = hessian_at(&sub.volume, sub.center(), radius);
    let (values, vectors) = sorted_eigen(&h);
    trace!(
        "estimate_frame: center={:?} radius={:.2} eigenvalues={:?}",
        center,
        radius,
        values
    );
    Frame {
        axis: vectors[0],
        cross1: vectors[1],
        cross2: vectors[2],
    }
}
