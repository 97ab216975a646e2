//! Seeded region growing with an in-region distance map.
//!
//! Overview
//! - Optionally remaps intensities through a sigmoid centred just below the
//!   seed's neighbourhood minimum ([`SigmoidRemap`]).
//! - Grows the face-connected region of voxels within
//!   `[threshold, intensity_max]` that contains the seed.
//! - Computes a chamfer distance to the region boundary, measured inside the
//!   region ([`distance::chamfer_distance`]).
//!
//! Works on anything implementing [`Raster`], so cross-sections (planar) and
//! sub-volumes share one implementation.

pub mod distance;
mod grow;
mod sigmoid;

pub use sigmoid::SigmoidRemap;

use crate::image::Raster;
use grow::RegionGrower;

/// Reasons why region growing cannot start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionError {
    EmptyImage,
    SeedOutOfBounds { seed: [usize; 3], shape: [usize; 3] },
}

impl std::fmt::Display for RegionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegionError::EmptyImage => write!(f, "image has no voxels"),
            RegionError::SeedOutOfBounds { seed, shape } => {
                write!(f, "seed {:?} outside image of shape {:?}", seed, shape)
            }
        }
    }
}

impl std::error::Error for RegionError {}

/// Thresholds and optional remap for [`RegionDistanceSegmenter`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionOptions {
    /// Lower acceptance bound applied after the optional remap.
    pub threshold: f32,
    /// Output range of the remap; `intensity_max` is also the upper acceptance bound.
    pub intensity_min: f32,
    pub intensity_max: f32,
    /// `None` bypasses the remap.
    pub remap: Option<SigmoidRemap>,
}

impl Default for RegionOptions {
    fn default() -> Self {
        Self {
            threshold: 100.0,
            intensity_min: 0.0,
            intensity_max: 255.0,
            remap: None,
        }
    }
}

impl RegionOptions {
    pub fn with_threshold(threshold: f32) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    pub fn with_sigmoid(mut self, offset: f32) -> Self {
        self.remap = Some(SigmoidRemap::new(offset));
        self
    }
}

/// Region mask and distance map over the full input grid.
#[derive(Clone, Debug)]
pub struct RegionOutput {
    pub shape: [usize; 3],
    pub mask: Vec<bool>,
    pub distance: Vec<f32>,
}

impl RegionOutput {
    /// First voxel (in raster order) holding the largest distance, and that
    /// distance. `(0, 0.0)` for an empty region.
    pub fn max_distance(&self) -> (usize, f32) {
        let mut best = (0usize, f32::NEG_INFINITY);
        for (i, &d) in self.distance.iter().enumerate() {
            if d > best.1 {
                best = (i, d);
            }
        }
        if best.1.is_finite() {
            best
        } else {
            (0, 0.0)
        }
    }
}

/// Grows a thresholded region from a seed and measures depth inside it.
#[derive(Clone, Debug, Default)]
pub struct RegionDistanceSegmenter {
    pub options: RegionOptions,
}

impl RegionDistanceSegmenter {
    pub fn new(options: RegionOptions) -> Self {
        Self { options }
    }

    pub fn run<R: Raster>(&self, image: &R, seed: [usize; 3]) -> Result<RegionOutput, RegionError> {
        let shape = image.shape();
        if image.is_empty() {
            return Err(RegionError::EmptyImage);
        }
        if (0..3).any(|k| seed[k] >= shape[k]) {
            return Err(RegionError::SeedOutOfBounds { seed, shape });
        }
        let seed_idx = image.linear(seed);
        let opts = &self.options;
        let mask = match opts.remap {
            Some(remap) => {
                let remapped = remap.apply(image, seed, opts.intensity_min, opts.intensity_max);
                RegionGrower::new(&remapped, shape, opts.threshold, opts.intensity_max).grow(seed_idx)
            }
            None => RegionGrower::new(image.values(), shape, opts.threshold, opts.intensity_max)
                .grow(seed_idx),
        };
        let distance = distance::chamfer_distance(&mask, shape);
        Ok(RegionOutput {
            shape,
            mask,
            distance,
        })
    }
}
