use crate::image::Raster;

/// Sigmoid intensity remap centred just below the seed's neighbourhood.
///
/// `f(x) = (max - min) / (1 + exp(-(x - β) / α)) + min` with `α = offset` and
/// `β = min(neighbourhood) - offset`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SigmoidRemap {
    pub offset: f32,
}

impl SigmoidRemap {
    pub fn new(offset: f32) -> Self {
        Self { offset }
    }

    /// Minimum over the seed's 3×3 (planar) or 3×3×3 neighbourhood, clipped to
    /// the grid.
    pub fn neighbourhood_minimum<R: Raster>(image: &R, seed: [usize; 3]) -> f32 {
        let shape = image.shape();
        let values = image.values();
        let mut min = f32::INFINITY;
        let zr: i64 = if image.is_planar() { 0 } else { 1 };
        for dz in -zr..=zr {
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let q = [seed[0] as i64 + dx, seed[1] as i64 + dy, seed[2] as i64 + dz];
                    if !image.contains_signed(q) {
                        continue;
                    }
                    let i = q[0] as usize + shape[0] * (q[1] as usize + shape[1] * q[2] as usize);
                    min = min.min(values[i]);
                }
            }
        }
        min
    }

    /// Remapped copy of `image`.
    pub fn apply<R: Raster>(&self, image: &R, seed: [usize; 3], out_min: f32, out_max: f32) -> Vec<f32> {
        let alpha = self.offset.max(f32::EPSILON);
        let beta = Self::neighbourhood_minimum(image, seed) - self.offset;
        let span = out_max - out_min;
        image
            .values()
            .iter()
            .map(|&x| span / (1.0 + (-(x - beta) / alpha).exp()) + out_min)
            .collect()
    }
}
