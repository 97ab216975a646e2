//! Parameter types configuring the segmentation run.
//!
//! The top-level knobs (diameter bounds, label, centreline output) are what a
//! host application normally sets. The nested groups hold the tuned
//! thresholds of the tracker, the bifurcation explorer, the first-radius
//! estimator and the smoothing pass; their defaults reproduce the reference
//! behaviour and rarely need changing.
//!
//! All structs deserialize with per-field defaults, so a JSON file only has to
//! list the values it overrides (see [`crate::config::load_params`]).

use serde::{Deserialize, Serialize};

/// Run-wide parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationParams {
    /// Smallest accepted vessel diameter (voxels).
    pub diameter_minimum: f64,
    /// Largest accepted vessel diameter (voxels).
    pub diameter_maximum: f64,
    /// Value written into labelled voxels.
    pub output_label: u16,
    /// Also produce a centreline volume holding radii.
    pub generate_centerline: bool,
    /// Record a per-step trace in the diagnostics report.
    pub debug: bool,
    pub tracking: TrackingParams,
    pub bifurcation: BifurcationParams,
    pub seeding: SeedParams,
    pub smoothing: SmoothingParams,
}

impl Default for SegmentationParams {
    fn default() -> Self {
        Self {
            diameter_minimum: 1.0,
            diameter_maximum: 24.0,
            output_label: 1,
            generate_centerline: false,
            debug: false,
            tracking: TrackingParams::default(),
            bifurcation: BifurcationParams::default(),
            seeding: SeedParams::default(),
            smoothing: SmoothingParams::default(),
        }
    }
}

impl SegmentationParams {
    #[inline]
    pub fn min_radius(&self) -> f64 {
        self.diameter_minimum / 2.0
    }

    #[inline]
    pub fn max_radius(&self) -> f64 {
        self.diameter_maximum / 2.0
    }

    /// True when `radius` lies within the configured diameter bounds.
    #[inline]
    pub fn accepts_radius(&self, radius: f64) -> bool {
        radius >= self.min_radius() && radius <= self.max_radius()
    }
}

/// Thresholds of the cross-section tracker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingParams {
    /// Region threshold on the rescaled cross-section.
    pub section_threshold: f32,
    /// Sigmoid offset used when segmenting a cross-section.
    pub section_sigmoid_offset: f32,
    /// Re-estimated axes deviating more than this from the previous axis are
    /// replaced by the previous frame (degrees).
    pub max_frame_deviation_deg: f64,
    /// Growth ratio rejected once the branch is deeper than `growth_depth`.
    pub growth_ratio_deep: f64,
    /// Growth ratio rejected at any depth.
    pub growth_ratio_any: f64,
    pub growth_depth: usize,
    /// Largest tolerated fraction of a section already written.
    pub max_overlap: f64,
    pub max_branch_depth: usize,
    /// Branches up to this depth continue without a variance check.
    pub warmup_depth: usize,
    /// Number of most recent radii considered by the variance check.
    pub variance_window: usize,
    pub straight_variance: f64,
    pub straight_roundness: f64,
    /// Variance above which the change is treated as noise and the branch stops.
    pub runaway_variance: f64,
}

impl Default for TrackingParams {
    fn default() -> Self {
        Self {
            section_threshold: 100.0,
            section_sigmoid_offset: 35.0,
            max_frame_deviation_deg: 30.0,
            growth_ratio_deep: 2.0,
            growth_ratio_any: 3.0,
            growth_depth: 3,
            max_overlap: 0.80,
            max_branch_depth: 200,
            warmup_depth: 3,
            variance_window: 6,
            straight_variance: 0.5,
            straight_roundness: 0.85,
            runaway_variance: 8.0,
        }
    }
}

/// Parameters of the bifurcation explorer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BifurcationParams {
    /// Analysis window radius as a multiple of the trunk radius.
    pub region_scale: f64,
    pub sigma_min_ratio: f64,
    pub sigma_max_ratio: f64,
    pub scales: usize,
    pub gamma: f64,
    /// Region threshold on the rescaled vesselness.
    pub vesselness_threshold: f32,
    /// Reject candidates seen from the previous trunk point at a larger angle.
    pub max_forward_angle_deg: f64,
    /// Reject candidates whose own axis turns further from the trunk direction.
    pub max_axis_angle_deg: f64,
    /// Beyond this angle a candidate may not be wider than the trunk.
    pub widening_angle_deg: f64,
}

impl Default for BifurcationParams {
    fn default() -> Self {
        Self {
            region_scale: 2.5,
            sigma_min_ratio: 0.25,
            sigma_max_ratio: 2.0 / 3.0,
            scales: 3,
            gamma: 4.0,
            vesselness_threshold: 25.0,
            max_forward_angle_deg: 135.0,
            max_axis_angle_deg: 135.0,
            widening_angle_deg: 45.0,
        }
    }
}

/// Parameters of the first-radius estimator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedParams {
    /// Added to the maximum radius to size the analysis window.
    pub sub_volume_margin: f64,
    pub threshold: f32,
    pub sigmoid_offset: f32,
}

impl Default for SeedParams {
    fn default() -> Self {
        Self {
            sub_volume_margin: 3.0,
            threshold: 100.0,
            sigmoid_offset: 40.0,
        }
    }
}

/// Parameters of the final smoothing pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingParams {
    /// Entries with a radius at or above this are skipped.
    pub max_radius: f64,
    /// Only voxels at least this bright in the input are filled.
    pub min_intensity: f32,
}

impl Default for SmoothingParams {
    fn default() -> Self {
        Self {
            max_radius: 12.0,
            min_intensity: 100.0,
        }
    }
}
