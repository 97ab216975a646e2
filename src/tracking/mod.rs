//! Seeded centreline tracking.
//!
//! - [`estimate_frame`]: Hessian frame at a voxel.
//! - [`sample_cross_section`]: plane across the vessel with a voxel map.
//! - [`Tracker`]: cross-section stepping with backtracking and bifurcation
//!   hand-over, driven from a worklist of branches.
//! - [`explore_bifurcation`]: vesselness-based search for child branches.
//! - [`estimate_first_radius`] / [`resolve_seed`]: seed preparation.
//! - [`smooth_output`]: ball filling along the committed centres.

pub mod bifurcation;
pub mod centers;
pub mod cross_section;
pub mod frame;
pub mod seed;
pub mod smoothing;
pub mod state;
pub mod tracker;

pub use bifurcation::{explore_bifurcation, BifurcationSite};
pub use centers::CenterRadiusLog;
pub use cross_section::{sample_cross_section, CrossSection};
pub use frame::estimate_frame;
pub use seed::{estimate_first_radius, line_voxels, resolve_seed, SeedError};
pub use smoothing::smooth_output;
pub use state::{BranchEntry, BranchState, TrackingState};
pub use tracker::{StepOutcome, Tracker};
