//! JSON loading of [`SegmentationParams`].
//!
//! Every key is optional; omitted values keep their defaults.
//!
//! ```json
//! { "diameter_maximum": 20.0, "tracking": { "max_overlap": 0.75 } }
//! ```

use crate::segmenter::SegmentationParams;
use std::fs;
use std::path::Path;

pub fn load_params(path: &Path) -> Result<SegmentationParams, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    parse_params(&contents).map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

/// Parses parameters from a JSON string.
pub fn parse_params(json: &str) -> Result<SegmentationParams, serde_json::Error> {
    serde_json::from_str(json)
}
