mod common;

use common::synthetic_volume::{tube_x, y_junction, VESSEL};
use vessel_tracker::image::{LabelVolume, VolumeF32};
use vessel_tracker::tracking::estimate_frame;
use vessel_tracker::{SegmentationParams, VesselSegmenter};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn tube_params() -> SegmentationParams {
    SegmentationParams {
        diameter_minimum: 2.0,
        diameter_maximum: 20.0,
        ..Default::default()
    }
}

#[test]
fn straight_tube_is_tracked_end_to_end() {
    init_logging();
    let volume = tube_x([48, 30, 30], 5.0);
    let segmenter = VesselSegmenter::new(tube_params());
    let report = segmenter.segment_with_diagnostics(&volume, [12, 15, 15], [22, 15, 15], None);
    let result = &report.result;

    assert!(result.centerline.is_none());
    assert!(result.centers.len() > 20, "only {} centres", result.centers.len());
    for c in &result.centers {
        assert_eq!([c.center[1], c.center[2]], [15, 15], "off-axis centre {:?}", c);
        assert!((4.0..=6.0).contains(&c.radius), "radius {:.3}", c.radius);
    }
    for x in 12..=46 {
        assert_eq!(result.labels.get([x, 15, 15]), Some(1), "axis voxel x={} unlabelled", x);
    }
    // Without a bifurcation every label comes from the smoothing balls.
    for (i, &l) in result.labels.data.iter().enumerate() {
        if l != 0 {
            assert_eq!(l, 1);
            assert_eq!(volume.data[i], VESSEL);
        }
    }

    let trace = &report.trace;
    assert_eq!(trace.branches_started, 1);
    assert_eq!(trace.terminations.out_of_bounds, 1);
    assert_eq!(trace.terminations.total(), 1);
    assert!(trace.bifurcations.is_empty());
    assert!(trace.seed.initial_radius.is_some());
    assert!(trace.timings.stage_ms("tracking").is_some());
    assert!(trace.smoothing.applied > 0);
}

#[test]
fn centreline_holds_radii_on_the_axis() {
    let volume = tube_x([48, 30, 30], 5.0);
    let params = SegmentationParams {
        generate_centerline: true,
        ..tube_params()
    };
    let result = VesselSegmenter::new(params).segment(&volume, [12, 15, 15], [22, 15, 15], None);
    let centreline = result.centerline.expect("centreline requested");
    assert_eq!(centreline.dims, volume.dims);
    let r = centreline.get([20, 15, 15]).unwrap_or(0.0);
    assert!(r > 3.0, "centreline radius {:.3}", r);
    assert_eq!(centreline.get([20, 5, 5]), Some(0.0));
}

#[test]
fn y_junction_tracks_both_branches() {
    init_logging();
    let junction_x = 36;
    let volume = y_junction([96, 64, 36], 6.0, 3.0, 20.0, junction_x as f64);
    let segmenter = VesselSegmenter::default();
    let report = segmenter.segment_with_diagnostics(&volume, [8, 32, 18], [16, 32, 18], None);

    let trace = &report.trace;
    assert!(
        trace.bifurcations.iter().any(|e| e.admitted == 2),
        "no junction admitted two branches: {:?}",
        trace.bifurcations
    );
    assert!(trace.branches_started >= 3);

    let (mut trunk, mut up, mut down) = (0, 0, 0);
    for (i, &l) in report.result.labels.data.iter().enumerate() {
        if l == 0 {
            continue;
        }
        assert_eq!(l, 1);
        let p = report.result.labels.index_of(i);
        if p[0] < junction_x - 5 {
            trunk += 1;
        } else if p[0] > junction_x + 15 && p[1] > 37 {
            up += 1;
        } else if p[0] > junction_x + 15 && p[1] < 27 {
            down += 1;
        }
    }
    assert!(trunk > 0 && up > 0 && down > 0, "trunk={} up={} down={}", trunk, up, down);
}

#[test]
fn repeated_runs_are_identical() {
    let volume = tube_x([48, 30, 30], 5.0);
    let segmenter = VesselSegmenter::new(tube_params());
    let a = segmenter.segment(&volume, [12, 15, 15], [22, 15, 15], None);
    let b = segmenter.segment(&volume, [12, 15, 15], [22, 15, 15], None);
    assert_eq!(a.labels, b.labels);
    assert_eq!(a.centers, b.centers);
}

#[test]
fn prior_labels_are_kept_and_seed_skips_them() {
    let volume = tube_x([48, 30, 30], 5.0);
    let mut prior = LabelVolume::new(volume.dims);
    for x in 12..=16 {
        prior.set([x, 15, 15], 5);
    }
    prior.set([40, 3, 3], 7);
    let params = SegmentationParams {
        output_label: 2,
        ..tube_params()
    };
    let report = VesselSegmenter::new(params).segment_with_diagnostics(
        &volume,
        [12, 15, 15],
        [22, 15, 15],
        Some(&prior),
    );
    assert_eq!(report.trace.seed.resolved, Some([17, 15, 15]));
    for (i, &p) in prior.data.iter().enumerate() {
        if p != 0 {
            assert_eq!(report.result.labels.data[i], p);
        }
    }
    assert!(report
        .result
        .labels
        .data
        .iter()
        .all(|&l| matches!(l, 0 | 2 | 5 | 7)));
}

#[test]
fn dark_volume_produces_nothing() {
    let volume = VolumeF32::new([32, 32, 32]);
    let report = VesselSegmenter::default().segment_with_diagnostics(&volume, [16, 16, 16], [20, 16, 16], None);
    assert_eq!(report.result.labeled_voxels(), 0);
    assert!(report.result.centers.is_empty());
    assert!(report.trace.seed.failure.is_some());
    assert_eq!(report.trace.steps_committed, 0);
}

#[test]
fn debug_trace_records_steps_and_serializes() {
    let volume = tube_x([48, 30, 30], 5.0);
    let params = SegmentationParams {
        debug: true,
        ..tube_params()
    };
    let report = VesselSegmenter::new(params).segment_with_diagnostics(&volume, [12, 15, 15], [22, 15, 15], None);
    assert!(!report.trace.steps.is_empty());
    assert_eq!(report.trace.steps.len(), report.trace.steps_committed + report.trace.terminations.total());
    let json = serde_json::to_string(&report.trace).expect("trace serializes");
    assert!(json.contains("\"terminations\""));
    assert!(json.contains("\"outOfBounds\""));
}

#[test]
fn frames_on_the_junction_volume_are_orthonormal() {
    let volume = y_junction([96, 64, 36], 6.0, 3.0, 20.0, 36.0);
    for (p, r) in [([10, 32, 18], 6.0), ([36, 32, 18], 6.0), ([60, 41, 18], 3.0), ([60, 23, 18], 3.0)] {
        let f = estimate_frame(&volume, p, r);
        for v in [&f.axis, &f.cross1, &f.cross2] {
            assert!((v.norm() - 1.0).abs() < 1e-6);
        }
        assert!(f.axis.dot(&f.cross1).abs() < 1e-6);
        assert!(f.axis.dot(&f.cross2).abs() < 1e-6);
        assert!(f.cross1.dot(&f.cross2).abs() < 1e-6);
    }
}
