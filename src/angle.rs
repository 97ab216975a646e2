//! Angle and direction utilities for voxel-space vectors.

use crate::types::Index3;
use nalgebra::Vector3;

/// Unsigned angle between two 3D vectors in degrees, in `[0, 180]`.
/// Zero when either vector vanishes.
#[inline]
pub fn angle_between_deg(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let na = a.norm();
    let nb = b.norm();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    let cos = (a.dot(b) / (na * nb)).clamp(-1.0, 1.0);
    let deg = cos.acos().to_degrees();
    if deg.is_nan() {
        0.0
    } else {
        deg
    }
}

/// Scales `v` so that its largest absolute component becomes one.
///
/// Rounding the result always yields one of the 26 neighbour offsets, which is
/// what the tracker relies on when stepping along a direction.
#[inline]
pub fn chebyshev_unit(v: &Vector3<f64>) -> Vector3<f64> {
    let m = v.amax();
    if m > 0.0 {
        v / m
    } else {
        Vector3::zeros()
    }
}

/// Chebyshev-normalised direction from `from` to `to`.
#[inline]
pub fn unit_vector_between(from: Index3, to: Index3) -> Vector3<f64> {
    let d = Vector3::new(
        (to[0] - from[0]) as f64,
        (to[1] - from[1]) as f64,
        (to[2] - from[2]) as f64,
    );
    chebyshev_unit(&d)
}

/// Converts a unit direction into a voxel step by rounding each component to
/// nearest, ties away from zero. A unit vector always has a component of at
/// least `1/√3`, so the step is never zero.
#[inline]
pub fn direction_to_offset(v: &Vector3<f64>) -> Index3 {
    [v.x.round() as i32, v.y.round() as i32, v.z.round() as i32]
}
