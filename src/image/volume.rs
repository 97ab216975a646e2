//! Dense 3D voxel grids and sub-volume extraction.
//!
//! Storage is x-fastest, then y, then z. Intensity volumes use `f32`, label
//! volumes `u16`. Reads outside the grid are treated as zero by the callers
//! that need it ([`VolumeF32::value_or_zero`]).
use super::traits::Raster;
use crate::types::Index3;
use nalgebra::Vector3;

#[derive(Clone, Debug, PartialEq)]
pub struct Volume<T> {
    /// Extents `[x, y, z]` in voxels
    pub dims: [usize; 3],
    /// Backing storage in x-fastest order
    pub data: Vec<T>,
}

/// Scalar intensity volume.
pub type VolumeF32 = Volume<f32>;
/// Label volume; zero means unlabelled.
pub type LabelVolume = Volume<u16>;

impl<T: Copy + Default> Volume<T> {
    /// Zero-initialised volume of the given extents.
    pub fn new(dims: [usize; 3]) -> Self {
        Self {
            dims,
            data: vec![T::default(); dims[0] * dims[1] * dims[2]],
        }
    }

    /// Wraps an existing buffer. Returns `None` when the length does not match.
    pub fn from_vec(dims: [usize; 3], data: Vec<T>) -> Option<Self> {
        (data.len() == dims[0] * dims[1] * dims[2]).then_some(Self { dims, data })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn contains(&self, p: Index3) -> bool {
        (0..3).all(|k| p[k] >= 0 && (p[k] as usize) < self.dims[k])
    }

    /// Linear index of an in-bounds voxel.
    #[inline]
    pub fn idx(&self, p: Index3) -> usize {
        p[0] as usize + self.dims[0] * (p[1] as usize + self.dims[1] * p[2] as usize)
    }

    /// Voxel index of a linear offset.
    #[inline]
    pub fn index_of(&self, i: usize) -> Index3 {
        let nx = self.dims[0];
        let ny = self.dims[1];
        [(i % nx) as i32, ((i / nx) % ny) as i32, (i / (nx * ny)) as i32]
    }

    #[inline]
    pub fn get(&self, p: Index3) -> Option<T> {
        self.contains(p).then(|| self.data[self.idx(p)])
    }

    /// Writes `v` at `p`. Returns `false` when `p` is outside the volume.
    #[inline]
    pub fn set(&mut self, p: Index3, v: T) -> bool {
        if !self.contains(p) {
            return false;
        }
        let i = self.idx(p);
        self.data[i] = v;
        true
    }

    /// Value at the voxel nearest to `p` after clamping into the grid.
    #[inline]
    pub fn clamped(&self, p: [i64; 3]) -> T {
        let c = |k: usize| p[k].clamp(0, self.dims[k] as i64 - 1) as usize;
        let (x, y, z) = (c(0), c(1), c(2));
        self.data[x + self.dims[0] * (y + self.dims[1] * z)]
    }

    /// True when the cube of half-width `half` around `center` is fully inside.
    pub fn contains_cube(&self, center: Index3, half: i32) -> bool {
        (0..3).all(|k| {
            center[k] - half >= 0 && ((center[k] + half) as i64) < self.dims[k] as i64
        })
    }
}

impl LabelVolume {
    pub fn count_nonzero(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }
}

impl VolumeF32 {
    /// Intensity at `p`, zero outside the volume.
    #[inline]
    pub fn value_or_zero(&self, p: Index3) -> f32 {
        self.get(p).unwrap_or(0.0)
    }

    /// Trilinear interpolation at a continuous position. `None` when any
    /// coordinate falls outside `[0, extent - 1]`.
    pub fn trilinear(&self, p: &Vector3<f64>) -> Option<f64> {
        let mut base = [0usize; 3];
        let mut frac = [0.0f64; 3];
        for k in 0..3 {
            let n = self.dims[k];
            if n == 0 || !(p[k] >= 0.0 && p[k] <= (n - 1) as f64) {
                return None;
            }
            let b = if n > 1 {
                (p[k].floor() as usize).min(n - 2)
            } else {
                0
            };
            base[k] = b;
            frac[k] = p[k] - b as f64;
        }
        let mut acc = 0.0f64;
        for dz in 0..2usize {
            let wz = if dz == 1 { frac[2] } else { 1.0 - frac[2] };
            if wz == 0.0 {
                continue;
            }
            for dy in 0..2usize {
                let wy = if dy == 1 { frac[1] } else { 1.0 - frac[1] };
                if wy == 0.0 {
                    continue;
                }
                for dx in 0..2usize {
                    let wx = if dx == 1 { frac[0] } else { 1.0 - frac[0] };
                    if wx == 0.0 {
                        continue;
                    }
                    let x = (base[0] + dx).min(self.dims[0] - 1);
                    let y = (base[1] + dy).min(self.dims[1] - 1);
                    let z = (base[2] + dz).min(self.dims[2] - 1);
                    let v = self.data[x + self.dims[0] * (y + self.dims[1] * z)];
                    acc += wx * wy * wz * v as f64;
                }
            }
        }
        Some(acc)
    }
}

impl Raster for VolumeF32 {
    #[inline]
    fn shape(&self) -> [usize; 3] {
        self.dims
    }
    #[inline]
    fn values(&self) -> &[f32] {
        &self.data
    }
}

/// Linearly rescales `values` in place to `[out_min, out_max]`.
/// A constant buffer maps to `out_min`.
pub fn rescale_intensity(values: &mut [f32], out_min: f32, out_max: f32) {
    let (lo, hi) = values
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if !(hi > lo) {
        values.iter_mut().for_each(|v| *v = out_min);
        return;
    }
    let scale = (out_max - out_min) / (hi - lo);
    for v in values.iter_mut() {
        *v = (*v - lo) * scale + out_min;
    }
}

/// Cubic window cut out of a larger volume, remembering where it came from.
#[derive(Clone, Debug)]
pub struct SubVolume {
    /// Global index of the window's first voxel
    pub origin: Index3,
    /// Half-width in voxels; the window side is `2 * half + 1`
    pub half: i32,
    pub volume: VolumeF32,
}

impl SubVolume {
    /// Copies the cube of half-width `floor(radius) + 1` around `center`.
    /// Voxels outside `source` read as zero.
    pub fn extract(source: &VolumeF32, center: Index3, radius: f64) -> Self {
        let half = radius.max(0.0).floor() as i32 + 1;
        Self::extract_half(source, center, half)
    }

    pub fn extract_half(source: &VolumeF32, center: Index3, half: i32) -> Self {
        let side = (2 * half + 1) as usize;
        let origin = [center[0] - half, center[1] - half, center[2] - half];
        let mut volume = VolumeF32::new([side, side, side]);
        let mut i = 0usize;
        for z in 0..side as i32 {
            for y in 0..side as i32 {
                for x in 0..side as i32 {
                    let g = [origin[0] + x, origin[1] + y, origin[2] + z];
                    volume.data[i] = source.value_or_zero(g);
                    i += 1;
                }
            }
        }
        Self {
            origin,
            half,
            volume,
        }
    }

    /// Rescales the window intensities to `[0, 255]`.
    pub fn rescaled(mut self) -> Self {
        rescale_intensity(&mut self.volume.data, 0.0, 255.0);
        self
    }

    /// Local index of the window centre.
    #[inline]
    pub fn center(&self) -> Index3 {
        [self.half, self.half, self.half]
    }

    #[inline]
    pub fn to_global(&self, local: Index3) -> Index3 {
        [
            local[0] + self.origin[0],
            local[1] + self.origin[1],
            local[2] + self.origin[2],
        ]
    }
}
