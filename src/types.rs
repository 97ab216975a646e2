use crate::angle::angle_between_deg;
use crate::image::{LabelVolume, VolumeF32};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Integer voxel coordinate `[x, y, z]`.
pub type Index3 = [i32; 3];

/// Component-wise `a + b`.
#[inline]
pub fn offset_index(a: Index3, b: Index3) -> Index3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

/// Component-wise `a - b`.
#[inline]
pub fn sub_index(a: Index3, b: Index3) -> Index3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Converts a voxel index into a floating vector.
#[inline]
pub fn index_to_vector(p: Index3) -> Vector3<f64> {
    Vector3::new(p[0] as f64, p[1] as f64, p[2] as f64)
}

/// Vector pointing from `from` to `to`.
#[inline]
pub fn direction_between(from: Index3, to: Index3) -> Vector3<f64> {
    index_to_vector(to) - index_to_vector(from)
}

/// Local orthonormal frame. `axis` follows the vessel, `cross1`/`cross2` span
/// its cross-section. The sign of `axis` carries no meaning until it has been
/// aligned against a reference direction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Frame {
    pub axis: Vector3<f64>,
    pub cross1: Vector3<f64>,
    pub cross2: Vector3<f64>,
}

impl Frame {
    /// Canonical frame aligned with the volume axes.
    pub fn identity() -> Self {
        Self {
            axis: Vector3::x(),
            cross1: Vector3::y(),
            cross2: Vector3::z(),
        }
    }

    /// Returns the frame with `axis` negated. Cross vectors are left untouched.
    pub fn with_flipped_axis(self) -> Self {
        Self {
            axis: -self.axis,
            ..self
        }
    }

    /// Flips `axis` when it points away (more than 90°) from `reference`.
    pub fn aligned_to(self, reference: &Vector3<f64>) -> Self {
        if angle_between_deg(&self.axis, reference) > 90.0 {
            self.with_flipped_axis()
        } else {
            self
        }
    }
}

/// A tracked centre with its estimated radius (voxels).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CenterRadius {
    pub center: Index3,
    pub radius: f64,
}

/// Output of a segmentation run.
#[derive(Clone, Debug)]
pub struct SegmentationResult {
    /// Voxels are either zero or the configured output label.
    pub labels: LabelVolume,
    /// Radius at centreline voxels, present when centreline output is enabled.
    pub centerline: Option<VolumeF32>,
    /// Centres that reached the smoothing pass, in drain order.
    pub centers: Vec<CenterRadius>,
}

impl SegmentationResult {
    /// Number of labelled voxels.
    pub fn labeled_voxels(&self) -> usize {
        self.labels.count_nonzero()
    }
}
