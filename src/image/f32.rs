//! Planar `f32` grid holding a resampled vessel cross-section.
//!
//! Rows are contiguous (`x` fastest). Implements [`Raster`] as a single
//! z slice, so the region segmenter handles planes and volumes alike.
use super::traits::Raster;

#[derive(Clone, Debug, PartialEq)]
pub struct ImageF32 {
    pub w: usize,
    pub h: usize,
    pub data: Vec<f32>,
}

impl ImageF32 {
    /// Zero-filled plane of `w × h` pixels.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0.0; w * h],
        }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.w && y < self.h);
        x + y * self.w
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    /// Middle pixel; for odd sides this is the exact centre.
    #[inline]
    pub fn middle(&self) -> (usize, usize) {
        (self.w / 2, self.h / 2)
    }
}

impl Raster for ImageF32 {
    #[inline]
    fn shape(&self) -> [usize; 3] {
        [self.w, self.h, 1]
    }

    #[inline]
    fn values(&self) -> &[f32] {
        &self.data
    }
}
