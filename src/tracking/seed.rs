//! Seed handling: re-pointing the seed past prior labels and estimating the
//! radius the first branch starts with.
use crate::image::{LabelVolume, SubVolume, VolumeF32};
use crate::region::{RegionDistanceSegmenter, RegionError, RegionOptions};
use crate::segmenter::SegmentationParams;
use crate::types::Index3;
use log::debug;

/// Why the first radius could not be estimated.
#[derive(Clone, Debug, PartialEq)]
pub enum SeedError {
    SeedOutsideVolume { seed: Index3, dims: [usize; 3] },
    /// The 3×3×3 neighbourhood of the seed touches the volume border.
    NeighbourhoodOutsideVolume { seed: Index3 },
    Region(RegionError),
    RadiusOutOfRange { radius: f64, min: f64, max: f64 },
}

impl std::fmt::Display for SeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedError::SeedOutsideVolume { seed, dims } => {
                write!(f, "seed {:?} outside volume of extents {:?}", seed, dims)
            }
            SeedError::NeighbourhoodOutsideVolume { seed } => {
                write!(f, "neighbourhood of seed {:?} leaves the volume", seed)
            }
            SeedError::Region(e) => write!(f, "seed region failed: {}", e),
            SeedError::RadiusOutOfRange { radius, min, max } => write!(
                f,
                "first radius {:.3} outside [{:.3}, {:.3}]",
                radius, min, max
            ),
        }
    }
}

impl std::error::Error for SeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SeedError::Region(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RegionError> for SeedError {
    fn from(e: RegionError) -> Self {
        SeedError::Region(e)
    }
}

/// Estimates the vessel radius at `seed`.
///
/// The seed window (half-width `max_radius + margin`) is rescaled and
/// segmented with a sigmoid remap. Starting at the seed, the distance map is
/// climbed towards its ridge: each move goes to the largest value of the
/// 3×3×3 neighbourhood, zeroing the voxel left behind. After the first move
/// the climb stops as soon as the running maximum rose at most twice while
/// scanning the neighbourhood.
pub fn estimate_first_radius(
    volume: &VolumeF32,
    seed: Index3,
    params: &SegmentationParams,
) -> Result<f64, SeedError> {
    if !volume.contains(seed) {
        return Err(SeedError::SeedOutsideVolume {
            seed,
            dims: volume.dims,
        });
    }
    if !volume.contains_cube(seed, 1) {
        return Err(SeedError::NeighbourhoodOutsideVolume { seed });
    }
    let sp = &params.seeding;
    let sub = SubVolume::extract(volume, seed, params.max_radius() + sp.sub_volume_margin).rescaled();
    let segmenter =
        RegionDistanceSegmenter::new(RegionOptions::with_threshold(sp.threshold).with_sigmoid(sp.sigmoid_offset));
    let c = sub.center();
    let start = [c[0] as usize, c[1] as usize, c[2] as usize];
    let region = segmenter.run(&sub.volume, start)?;
    let mut distance = region.distance;

    let dims = sub.volume.dims;
    let mut p = c;
    let mut first = true;
    let mut radius = 0.0f64;
    loop {
        let cur = sub.volume.idx(p);
        let mut best = distance[cur];
        let mut next = None;
        let mut rises = 0usize;
        for dz in -1..=1 {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let q = [p[0] + dx, p[1] + dy, p[2] + dz];
                    if (0..3).any(|k| q[k] < 0 || q[k] as usize >= dims[k]) {
                        continue;
                    }
                    let v = distance[sub.volume.idx(q)];
                    if v > best {
                        best = v;
                        next = Some(q);
                        rises += 1;
                    }
                }
            }
        }
        if !first && rises <= 2 {
            break;
        }
        first = false;
        distance[cur] = 0.0;
        radius = best as f64;
        match next {
            Some(q) => p = q,
            None => break,
        }
    }
    debug!(
        "estimate_first_radius: seed={:?} radius={:.3} ridge={:?}",
        seed,
        radius,
        sub.to_global(p)
    );

    if !params.accepts_radius(radius) {
        return Err(SeedError::RadiusOutOfRange {
            radius,
            min: params.min_radius(),
            max: params.max_radius(),
        });
    }
    Ok(radius)
}

/// Voxels of the digital line from `from` to `to`, both ends included.
pub fn line_voxels(from: Index3, to: Index3) -> Vec<Index3> {
    let d = [
        (to[0] - from[0]).abs(),
        (to[1] - from[1]).abs(),
        (to[2] - from[2]).abs(),
    ];
    let s = [
        (to[0] - from[0]).signum(),
        (to[1] - from[1]).signum(),
        (to[2] - from[2]).signum(),
    ];
    let major = (0..3).max_by_key(|&k| (d[k], std::cmp::Reverse(k))).unwrap_or(0);
    let minors = [(major + 1) % 3, (major + 2) % 3];
    let mut err = [2 * d[minors[0]] - d[major], 2 * d[minors[1]] - d[major]];
    let mut p = from;
    let mut out = Vec::with_capacity(d[major] as usize + 1);
    out.push(p);
    for _ in 0..d[major] {
        p[major] += s[major];
        for (e, &m) in err.iter_mut().zip(&minors) {
            if *e >= 0 {
                p[m] += s[m];
                *e -= 2 * d[major];
            }
            *e += 2 * d[m];
        }
        out.push(p);
    }
    out
}

/// First unlabelled voxel on the line from `seed` towards `direction_seed`.
/// Falls back to `direction_seed` when the whole line is labelled.
pub fn resolve_seed(labels: &LabelVolume, seed: Index3, direction_seed: Index3) -> Index3 {
    line_voxels(seed, direction_seed)
        .into_iter()
        .find(|&p| labels.get(p) == Some(0))
        .unwrap_or(direction_seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball(dims: [usize; 3], center: Index3, radius: f64) -> VolumeF32 {
        let mut v = VolumeF32::new(dims);
        for i in 0..v.len() {
            let p = v.index_of(i);
            let d2: i32 = (0..3).map(|k| (p[k] - center[k]).pow(2)).sum();
            if (d2 as f64) <= radius * radius {
                v.data[i] = 200.0;
            }
        }
        v
    }

    #[test]
    fn line_includes_both_ends() {
        let l = line_voxels([0, 0, 0], [4, 2, -1]);
        assert_eq!(l.first(), Some(&[0, 0, 0]));
        assert_eq!(l.last(), Some(&[4, 2, -1]));
        assert_eq!(l.len(), 5);
        for w in l.windows(2) {
            assert!((0..3).all(|k| (w[1][k] - w[0][k]).abs() <= 1));
        }
        assert_eq!(line_voxels([3, 3, 3], [3, 3, 3]), vec![[3, 3, 3]]);
    }

    #[test]
    fn seed_skips_labelled_voxels() {
        let mut labels = LabelVolume::new([10, 10, 10]);
        for x in 0..4 {
            labels.set([x, 5, 5], 1);
        }
        assert_eq!(resolve_seed(&labels, [1, 5, 5], [8, 5, 5]), [4, 5, 5]);
        for x in 0..10 {
            labels.set([x, 5, 5], 1);
        }
        assert_eq!(resolve_seed(&labels, [1, 5, 5], [8, 5, 5]), [8, 5, 5]);
    }

    #[test]
    fn seed_on_the_border_is_rejected() {
        let v = ball([12, 12, 12], [6, 6, 6], 3.0);
        let params = SegmentationParams::default();
        assert_eq!(
            estimate_first_radius(&v, [0, 6, 6], &params),
            Err(SeedError::NeighbourhoodOutsideVolume { seed: [0, 6, 6] })
        );
        assert!(matches!(
            estimate_first_radius(&v, [12, 6, 6], &params),
            Err(SeedError::SeedOutsideVolume { .. })
        ));
    }

    #[test]
    fn uniform_volume_has_no_radius() {
        let v = VolumeF32::new([20, 20, 20]);
        let params = SegmentationParams::default();
        let err = estimate_first_radius(&v, [10, 10, 10], &params).unwrap_err();
        assert!(matches!(err, SeedError::RadiusOutOfRange { .. }), "{}", err);
    }
}
