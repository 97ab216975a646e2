//! Chamfer distance inside a binary region.
//!
//! Mask voxels touching the background through a face start at 0.5 (the
//! half-voxel to the iso-contour); the remaining mask voxels are reached by
//! forward/backward chamfer sweeps that only travel through the mask. The
//! grid border is not a boundary, so a region that fills the whole grid has
//! no source and reads as the cap (the floor of the grid diagonal).

/// Optimal 2D chamfer weights (edge, diagonal).
const WEIGHTS_2D: [f32; 2] = [0.92888, 1.34356];
/// Optimal 3D chamfer weights (face, edge, corner).
const WEIGHTS_3D: [f32; 3] = [0.92644, 1.34065, 1.65849];

struct Neighbour {
    offset: [i64; 3],
    weight: f32,
}

fn neighbours(planar: bool) -> (Vec<Neighbour>, Vec<Neighbour>) {
    let mut forward = Vec::new();
    let mut backward = Vec::new();
    let zs: &[i64] = if planar { &[0] } else { &[-1, 0, 1] };
    for &dz in zs {
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                let nonzero = [dx, dy, dz].iter().filter(|&&c| c != 0).count();
                if nonzero == 0 {
                    continue;
                }
                let weight = if planar {
                    WEIGHTS_2D[nonzero - 1]
                } else {
                    WEIGHTS_3D[nonzero - 1]
                };
                let n = Neighbour {
                    offset: [dx, dy, dz],
                    weight,
                };
                // Raster order is z, then y, then x.
                if (dz, dy, dx) < (0, 0, 0) {
                    forward.push(n);
                } else {
                    backward.push(n);
                }
            }
        }
    }
    (forward, backward)
}

/// Distance map of `mask` (x-fastest grid of extents `shape`). Zero outside the
/// mask.
pub fn chamfer_distance(mask: &[bool], shape: [usize; 3]) -> Vec<f32> {
    let [nx, ny, nz] = shape;
    let planar = nz == 1;
    let diag = if planar {
        ((nx * nx + ny * ny) as f32).sqrt()
    } else {
        ((nx * nx + ny * ny + nz * nz) as f32).sqrt()
    };
    let cap = diag.floor();

    let inside = |x: i64, y: i64, z: i64| {
        x >= 0 && y >= 0 && z >= 0 && x < nx as i64 && y < ny as i64 && z < nz as i64
    };
    let lin = |x: i64, y: i64, z: i64| x as usize + nx * (y as usize + ny * z as usize);

    let mut dist = vec![0.0f32; mask.len()];
    for (i, &m) in mask.iter().enumerate() {
        if !m {
            continue;
        }
        let (x, y, z) = ((i % nx) as i64, ((i / nx) % ny) as i64, (i / (nx * ny)) as i64);
        let touches_background = [
            (x - 1, y, z),
            (x + 1, y, z),
            (x, y - 1, z),
            (x, y + 1, z),
            (x, y, z - 1),
            (x, y, z + 1),
        ]
        .iter()
        .any(|&(a, b, c)| inside(a, b, c) && !mask[lin(a, b, c)]);
        dist[i] = if touches_background { 0.5 } else { f32::INFINITY };
    }

    let (forward, backward) = neighbours(planar);
    let relax = |dist: &mut [f32], i: usize, set: &[Neighbour]| -> bool {
        let (x, y, z) = ((i % nx) as i64, ((i / nx) % ny) as i64, (i / (nx * ny)) as i64);
        let mut best = dist[i];
        for n in set {
            let (a, b, c) = (x + n.offset[0], y + n.offset[1], z + n.offset[2]);
            if !inside(a, b, c) {
                continue;
            }
            let j = lin(a, b, c);
            if mask[j] {
                let cand = dist[j] + n.weight;
                if cand < best {
                    best = cand;
                }
            }
        }
        if best < dist[i] {
            dist[i] = best;
            true
        } else {
            false
        }
    };

    loop {
        let mut changed = false;
        for i in 0..mask.len() {
            if mask[i] {
                changed |= relax(&mut dist, i, &forward);
            }
        }
        for i in (0..mask.len()).rev() {
            if mask[i] {
                changed |= relax(&mut dist, i, &backward);
            }
        }
        if !changed {
            break;
        }
    }

    for d in dist.iter_mut() {
        if *d > cap {
            *d = cap;
        }
    }
    dist
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_row_distances() {
        // 1 x 7 strip with a 5-pixel run; both ends touch background.
        let mask = [false, true, true, true, true, true, false];
        let d = chamfer_distance(&mask, [7, 1, 1]);
        assert_eq!(d[0], 0.0);
        assert_eq!(d[1], 0.5);
        assert!((d[2] - (0.5 + WEIGHTS_2D[0])).abs() < 1e-6);
        assert!((d[3] - (0.5 + 2.0 * WEIGHTS_2D[0])).abs() < 1e-6);
        assert_eq!(d[2], d[4]);
    }

    #[test]
    fn full_mask_reads_as_cap() {
        let mask = vec![true; 4 * 4 * 4];
        let d = chamfer_distance(&mask, [4, 4, 4]);
        let cap = (48.0f32).sqrt().floor();
        assert!(d.iter().all(|&v| v == cap));
    }

    #[test]
    fn block_centre_is_one_step_inside() {
        let w = 5;
        let mut mask = vec![false; w * w];
        for y in 1..4 {
            for x in 1..4 {
                mask[y * w + x] = true;
            }
        }
        let d = chamfer_distance(&mask, [w, w, 1]);
        assert_eq!(d[w + 1], 0.5);
        assert_eq!(d[2 * w + 1], 0.5);
        assert!((d[2 * w + 2] - (0.5 + WEIGHTS_2D[0])).abs() < 1e-6);
        assert_eq!(d[0], 0.0);
    }

    #[test]
    fn border_is_not_background() {
        // Left column is mask along the grid edge; the gap on the right is the
        // only boundary, so distance grows towards the edge.
        let mask = [true, true, true, false];
        let d = chamfer_distance(&mask, [4, 1, 1]);
        assert_eq!(d[2], 0.5);
        assert!(d[0] > d[1] && d[1] > d[2]);
    }
}
