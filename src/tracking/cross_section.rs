//! Planar resampling of the volume across the vessel.
use crate::image::{rescale_intensity, ImageF32, VolumeF32};
use crate::types::{Frame, Index3};
use nalgebra::Vector3;

/// Square cross-section image together with the voxel behind every pixel.
#[derive(Clone, Debug)]
pub struct CrossSection {
    /// Intensities rescaled to `[0, 255]`
    pub image: ImageF32,
    /// Nearest voxel per pixel, `None` where the sample fell outside the volume
    pub index_map: Vec<Option<Index3>>,
    /// Half-width; the centre pixel is `(half, half)`
    pub half: usize,
}

impl CrossSection {
    /// Side length in pixels.
    #[inline]
    pub fn side(&self) -> usize {
        2 * self.half + 1
    }

    /// Pixel coordinates of the centre.
    #[inline]
    pub fn center_pixel(&self) -> [usize; 3] {
        let (x, y) = self.image.middle();
        [x, y, 0]
    }

    /// Voxel sampled at linear pixel `i`.
    #[inline]
    pub fn voxel_at(&self, i: usize) -> Option<Index3> {
        self.index_map.get(i).copied().flatten()
    }
}

/// Samples the plane spanned by `frame.cross1`/`frame.cross2` through `center`.
///
/// Radii below 2.5 are widened by one voxel before sizing the grid, whose
/// half-width is `floor(2 * radius)`. Rows step along `cross1`, columns along
/// `cross2`.
pub fn sample_cross_section(
    volume: &VolumeF32,
    center: Index3,
    radius: f64,
    frame: &Frame,
) -> CrossSection {
    let radius = if radius < 2.5 { radius + 1.0 } else { radius };
    let half = (2.0 * radius).floor().max(0.0) as usize;
    let side = 2 * half + 1;
    let mut image = ImageF32::new(side, side);
    let mut index_map = vec![None; side * side];
    let c = Vector3::new(center[0] as f64, center[1] as f64, center[2] as f64);
    let h = half as i64;
    for i in -h..=h {
        let row = c + frame.cross1 * i as f64;
        for j in -h..=h {
            let q = row + frame.cross2 * j as f64;
            if let Some(v) = volume.trilinear(&q) {
                let (x, y) = ((j + h) as usize, (i + h) as usize);
                image.set(x, y, v as f32);
                index_map[image.idx(x, y)] = Some([
                    q.x.round() as i32,
                    q.y.round() as i32,
                    q.z.round() as i32,
                ]);
            }
        }
    }
    rescale_intensity(&mut image.data, 0.0, 255.0);
    CrossSection {
        image,
        index_map,
        half,
    }
}
