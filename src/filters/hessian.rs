//! Gaussian-scale Hessians of scalar volumes.
//!
//! Two entry points:
//! - [`hessian_at`] evaluates the Hessian at a single voxel by reducing a
//!   clamped neighbourhood, which is what the frame estimator needs;
//! - [`HessianField::compute`] convolves a whole (small) volume and is used
//!   by the vesselness filter.
//!
//! Borders replicate the nearest voxel.
use super::gaussian::{DerivativeKernels, SeparableFilter};
use crate::image::VolumeF32;
use crate::types::Index3;
use nalgebra::{Matrix3, SymmetricEigen, Vector3};

/// Derivative orders `(x, y, z)` for the six unique Hessian entries, in the
/// order xx, yy, zz, xy, xz, yz.
const COMPONENTS: [(usize, usize, usize); 6] = [
    (2, 0, 0),
    (0, 2, 0),
    (0, 0, 2),
    (1, 1, 0),
    (1, 0, 1),
    (0, 1, 1),
];

/// Hessian of `volume` at `center`, Gaussian scale `sigma`.
pub fn hessian_at(volume: &VolumeF32, center: Index3, sigma: f64) -> Matrix3<f64> {
    let kernels = DerivativeKernels::new(sigma);
    let r = kernels.radius() as i64;
    let n = (2 * r + 1) as usize;
    let c = [center[0] as i64, center[1] as i64, center[2] as i64];

    // Collapse z first: one plane per derivative order, indexed [x * n + y].
    let mut planes = [vec![0.0f64; n * n], vec![0.0f64; n * n], vec![0.0f64; n * n]];
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                let v = volume.clamped([
                    c[0] + i as i64 - r,
                    c[1] + j as i64 - r,
                    c[2] + k as i64 - r,
                ]) as f64;
                if v == 0.0 {
                    continue;
                }
                for (order, plane) in planes.iter_mut().enumerate() {
                    plane[i * n + j] += kernels.order(order)[k] * v;
                }
            }
        }
    }

    let mut h = [0.0f64; 6];
    for (slot, &(ox, oy, oz)) in COMPONENTS.iter().enumerate() {
        let kx = kernels.order(ox);
        let ky = kernels.order(oy);
        let plane = &planes[oz];
        let mut acc = 0.0;
        for i in 0..n {
            let row: f64 = (0..n).map(|j| ky[j] * plane[i * n + j]).sum();
            acc += kx[i] * row;
        }
        h[slot] = acc;
    }
    Matrix3::new(h[0], h[3], h[4], h[3], h[1], h[5], h[4], h[5], h[2])
}

/// Dense Hessian of a volume at one scale.
#[derive(Clone, Debug)]
pub struct HessianField {
    pub dims: [usize; 3],
    /// Entries in the order xx, yy, zz, xy, xz, yz.
    components: [Vec<f64>; 6],
}

impl HessianField {
    pub fn compute(volume: &VolumeF32, sigma: f64) -> Self {
        let kernels = DerivativeKernels::new(sigma);
        let dims = volume.dims;
        let base: Vec<f64> = volume.data.iter().map(|&v| v as f64).collect();

        let along_z: Vec<Vec<f64>> = (0..3)
            .map(|o| convolve_axis(&base, dims, kernels.order(o), 2))
            .collect();

        let mut components: [Vec<f64>; 6] = Default::default();
        let mut cache: Vec<((usize, usize), Vec<f64>)> = Vec::new();
        for (slot, &(ox, oy, oz)) in COMPONENTS.iter().enumerate() {
            let pos = match cache.iter().position(|(key, _)| *key == (oy, oz)) {
                Some(pos) => pos,
                None => {
                    let yz = convolve_axis(&along_z[oz], dims, kernels.order(oy), 1);
                    cache.push(((oy, oz), yz));
                    cache.len() - 1
                }
            };
            components[slot] = convolve_axis(&cache[pos].1, dims, kernels.order(ox), 0);
        }
        Self { dims, components }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.components[0].len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hessian matrix at linear index `i`.
    #[inline]
    pub fn at(&self, i: usize) -> Matrix3<f64> {
        let c = &self.components;
        Matrix3::new(
            c[0][i], c[3][i], c[4][i], c[3][i], c[1][i], c[5][i], c[4][i], c[5][i], c[2][i],
        )
    }
}

/// Correlates `data` with `taps` along `axis`, replicating border voxels.
fn convolve_axis(data: &[f64], dims: [usize; 3], taps: &[f64], axis: usize) -> Vec<f64> {
    let [nx, ny, nz] = dims;
    let r = (taps.len() / 2) as i64;
    let n_axis = dims[axis] as i64;
    let step = match axis {
        0 => 1,
        1 => nx,
        _ => nx * ny,
    };
    let mut out = vec![0.0f64; data.len()];
    for z in 0..nz {
        for y in 0..ny {
            for x in 0..nx {
                let p = [x, y, z];
                let i = x + nx * (y + ny * z);
                let pos = p[axis] as i64;
                let line_start = i - p[axis] * step;
                let mut acc = 0.0;
                for (t, w) in taps.iter().enumerate() {
                    let q = (pos + t as i64 - r).clamp(0, n_axis - 1) as usize;
                    acc += w * data[line_start + q * step];
                }
                out[i] = acc;
            }
        }
    }
    out
}

/// Eigen-decomposition of a symmetric matrix, sorted by increasing
/// eigenvalue magnitude. Eigenvectors are unit length.
pub fn sorted_eigen(m: &Matrix3<f64>) -> ([f64; 3], [Vector3<f64>; 3]) {
    let eig = SymmetricEigen::new(*m);
    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| {
        eig.eigenvalues[a]
            .abs()
            .partial_cmp(&eig.eigenvalues[b].abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let values = order.map(|k| eig.eigenvalues[k]);
    let vectors = order.map(|k| {
        let v: Vector3<f64> = eig.eigenvectors.column(k).into_owned();
        let n = v.norm();
        if n > 0.0 {
            v / n
        } else {
            v
        }
    });
    (values, vectors)
}
