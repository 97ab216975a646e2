//! Multiscale Hessian-based tube enhancement.
//!
//! For each scale the Hessian eigenvalues are sorted by magnitude
//! (`|λ0| ≤ |λ1| ≤ |λ2|`, `λ0` along the vessel). A voxel responds only when
//! both cross-sectional eigenvalues are negative (bright tube on a darker
//! background). The response combines
//! - a shape term `1 - ||λ1| - |λ2|| / (|λ1| + |λ2|)` (circular section → 1),
//! - a structure term `(2/3)·λ0 - λ1 - λ2`,
//! - a noise term `1 - exp(-S² / (2γ²))` with `S² = Σλ²`,
//!
//! and is weighted by `exp(σ)` when positive. Responses are summed over scales.

use crate::filters::{sorted_eigen, HessianField};
use crate::image::VolumeF32;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VesselnessParams {
    pub sigma_min: f64,
    pub sigma_max: f64,
    /// Number of log-spaced scales (>= 1).
    pub steps: usize,
    pub gamma: f64,
}

impl VesselnessParams {
    /// Log-spaced scales from `sigma_min` to `sigma_max`.
    pub fn scales(&self) -> Vec<f64> {
        let steps = self.steps.max(1);
        let lo = self.sigma_min.max(1e-3).ln();
        if steps == 1 {
            return vec![lo.exp()];
        }
        let hi = self.sigma_max.max(1e-3).ln();
        let step = (hi - lo) / (steps - 1) as f64;
        (0..steps).map(|i| (lo + step * i as f64).exp()).collect()
    }
}

/// Single-scale response for sorted eigenvalues.
pub fn vesselness_response(eigenvalues: [f64; 3], sigma: f64, gamma: f64) -> f64 {
    let [l0, l1, l2] = eigenvalues;
    if !(l1 < 0.0 && l2 < 0.0) {
        return 0.0;
    }
    let (a1, a2) = (l1.abs(), l2.abs());
    let shape = 1.0 - (a1 - a2).abs() / (a1 + a2);
    let structure = (2.0 / 3.0) * l0 - l1 - l2;
    let s2 = l0 * l0 + l1 * l1 + l2 * l2;
    let noise = 1.0 - (-s2 / (2.0 * gamma * gamma)).exp();
    let v = shape * structure * noise;
    if v > 0.0 {
        v * sigma.exp()
    } else {
        v
    }
}

/// Accumulated vesselness of `volume` over the configured scales.
pub fn vesselness(volume: &VolumeF32, params: &VesselnessParams) -> VolumeF32 {
    let n = volume.len();
    let mut total = vec![0.0f64; n];
    for sigma in params.scales() {
        let field = HessianField::compute(volume, sigma);
        let eval = |i: usize| {
            let (values, _) = sorted_eigen(&field.at(i));
            vesselness_response(values, sigma, params.gamma)
        };
        #[cfg(feature = "parallel")]
        let scale: Vec<f64> = (0..n).into_par_iter().map(eval).collect();
        #[cfg(not(feature = "parallel"))]
        let scale: Vec<f64> = (0..n).map(eval).collect();
        for (t, v) in total.iter_mut().zip(scale) {
            *t += v;
        }
    }
    VolumeF32 {
        dims: volume.dims,
        data: total.into_iter().map(|v| v as f32).collect(),
    }
}
