use std::env;
use std::path::Path;
use vessel_tracker::config::load_params;
use vessel_tracker::image::VolumeF32;
use vessel_tracker::{SegmentationParams, VesselSegmenter};

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let params = match env::args().nth(1) {
        Some(path) => load_params(Path::new(&path))?,
        None => SegmentationParams::default(),
    };

    // Demo volume: a trunk of radius 6 splitting into two branches of radius 3.
    let dims = [96usize, 64, 36];
    let volume = synthetic_y(dims, 6.0, 3.0, 20f64.to_radians(), 36.0);
    let seed = [8, 32, 18];
    let direction_seed = [16, 32, 18];

    let segmenter = VesselSegmenter::new(params);
    let report = segmenter.segment_with_diagnostics(&volume, seed, direction_seed, None);
    let trace = &report.trace;

    println!(
        "labeled={} centres={} branches={} steps={} bifurcations={} total_ms={:.3}",
        report.result.labeled_voxels(),
        report.result.centers.len(),
        trace.branches_started,
        trace.steps_committed,
        trace.bifurcations.len(),
        trace.timings.total_ms
    );
    if let Some(failure) = &trace.seed.failure {
        println!("seed rejected: {failure}");
    }
    let json = serde_json::to_string_pretty(trace)
        .map_err(|e| format!("Failed to serialize trace: {e}"))?;
    println!("{json}");
    Ok(())
}

fn synthetic_y(dims: [usize; 3], trunk: f64, branch: f64, angle: f64, junction_x: f64) -> VolumeF32 {
    let (cy, cz) = ((dims[1] / 2) as f64, (dims[2] / 2) as f64);
    let j = [junction_x, cy, cz];
    let (s, c) = angle.sin_cos();
    let parts = [
        ([-5.0, cy, cz], j, trunk),
        (j, [junction_x + 100.0 * c, cy + 100.0 * s, cz], branch),
        (j, [junction_x + 100.0 * c, cy - 100.0 * s, cz], branch),
    ];
    let mut volume = VolumeF32::new(dims);
    for i in 0..volume.len() {
        let q = volume.index_of(i);
        let p = [q[0] as f64, q[1] as f64, q[2] as f64];
        if parts.iter().any(|&(a, b, r)| segment_distance(p, a, b) <= r) {
            volume.data[i] = 200.0;
        }
    }
    volume
}

fn segment_distance(p: [f64; 3], a: [f64; 3], b: [f64; 3]) -> f64 {
    let ab = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let ap = [p[0] - a[0], p[1] - a[1], p[2] - a[2]];
    let len2: f64 = ab.iter().map(|v| v * v).sum();
    let t = (ab.iter().zip(&ap).map(|(u, v)| u * v).sum::<f64>() / len2).clamp(0.0, 1.0);
    (0..3).map(|k| (ap[k] - t * ab[k]).powi(2)).sum::<f64>().sqrt()
}
