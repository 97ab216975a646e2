//! Shape descriptors used while tracking: planar roundness of a cross-section
//! region, multiscale vesselness of a sub-volume, and 3D thinning of a region
//! into its centreline.

pub mod labeling;
pub mod roundness;
pub mod thinning;
pub mod vesselness;

pub use labeling::label_components;
pub use roundness::roundness;
pub use thinning::thin;
pub use vesselness::{vesselness, vesselness_response, VesselnessParams};
