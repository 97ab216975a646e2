use super::timing::TimingBreakdown;
use crate::types::Index3;
use serde::Serialize;

/// Why a branch stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TerminationReason {
    /// Next centre left the volume.
    OutOfBounds,
    /// Cross-section region could not be grown.
    NoRegion,
    /// Estimated radius outside the diameter bounds.
    RadiusOutOfRange,
    /// Radius grew too fast compared to the previous step.
    ImplausibleGrowth,
    /// Most of the section was already written.
    Overlap,
    /// Branch reached the maximum number of steps.
    MaxDepth,
    /// Radius variance too large to be a bifurcation.
    RunawayVariance,
    /// The deepest section pixel had no voxel behind it.
    MissingCenter,
    /// Branch handed over to the bifurcation explorer.
    Bifurcation,
}

/// One counter per [`TerminationReason`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminationCounts {
    pub out_of_bounds: usize,
    pub no_region: usize,
    pub radius_out_of_range: usize,
    pub implausible_growth: usize,
    pub overlap: usize,
    pub max_depth: usize,
    pub runaway_variance: usize,
    pub missing_center: usize,
    pub bifurcation: usize,
}

impl TerminationCounts {
    pub fn record(&mut self, reason: TerminationReason) {
        let slot = match reason {
            TerminationReason::OutOfBounds => &mut self.out_of_bounds,
            TerminationReason::NoRegion => &mut self.no_region,
            TerminationReason::RadiusOutOfRange => &mut self.radius_out_of_range,
            TerminationReason::ImplausibleGrowth => &mut self.implausible_growth,
            TerminationReason::Overlap => &mut self.overlap,
            TerminationReason::MaxDepth => &mut self.max_depth,
            TerminationReason::RunawayVariance => &mut self.runaway_variance,
            TerminationReason::MissingCenter => &mut self.missing_center,
            TerminationReason::Bifurcation => &mut self.bifurcation,
        };
        *slot += 1;
    }

    pub fn total(&self) -> usize {
        self.out_of_bounds
            + self.no_region
            + self.radius_out_of_range
            + self.implausible_growth
            + self.overlap
            + self.max_depth
            + self.runaway_variance
            + self.missing_center
            + self.bifurcation
    }
}

/// Outcome of the first-radius estimation at the user seed.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedStage {
    pub requested: Index3,
    pub direction_seed: Index3,
    /// Seed after skipping already-labelled voxels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<Index3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

/// One bifurcation analysis.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BifurcationEvent {
    pub trunk: Index3,
    pub trunk_radius: f64,
    /// Trunk direction the candidate angles are measured against.
    pub trunk_axis: [f64; 3],
    /// Analysis window did not fit inside the volume.
    pub aborted: bool,
    /// Candidates found on the window faces.
    pub raw_candidates: usize,
    /// Candidates left after the location, radius and duplicate filters.
    pub filtered_candidates: usize,
    /// Candidates that passed the angular admission test.
    pub admitted: usize,
    pub admitted_centers: Vec<Index3>,
}

/// Summary of the final smoothing pass.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmoothingStage {
    pub entries: usize,
    pub applied: usize,
    pub skipped_large: usize,
    pub voxels_labeled: usize,
}

/// Decision taken at the end of a tracker step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StepDecision {
    Continue,
    Terminate(TerminationReason),
}

/// Per-step record, collected when `debug` is enabled.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub branch: usize,
    pub depth: usize,
    pub candidate: Index3,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<Index3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roundness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variance: Option<f64>,
    pub decision: StepDecision,
}

/// Everything recorded while tracking one seed.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingTrace {
    pub seed: SeedStage,
    pub branches_started: usize,
    pub steps_committed: usize,
    pub terminations: TerminationCounts,
    pub bifurcations: Vec<BifurcationEvent>,
    pub smoothing: SmoothingStage,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<StepRecord>,
    pub timings: TimingBreakdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn termination_counts_accumulate() {
        let mut c = TerminationCounts::default();
        c.record(TerminationReason::Overlap);
        c.record(TerminationReason::Overlap);
        c.record(TerminationReason::Bifurcation);
        assert_eq!(c.overlap, 2);
        assert_eq!(c.bifurcation, 1);
        assert_eq!(c.total(), 3);
    }

    #[test]
    fn trace_serializes_camel_case() {
        let mut trace = TrackingTrace::default();
        trace.terminations.record(TerminationReason::OutOfBounds);
        trace.timings.push("tracking", 1.5);
        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json["terminations"]["outOfBounds"], 1);
        assert_eq!(json["timings"]["stages"][0]["elapsedMs"], 1.5);
        assert!(json.get("steps").is_none());
        assert!(json["seed"].get("failure").is_none());
    }
}
