use vessel_tracker::image::VolumeF32;

pub const VESSEL: f32 = 200.0;

/// Distance from `p` to the segment `a`-`b`.
fn segment_distance(p: [f64; 3], a: [f64; 3], b: [f64; 3]) -> f64 {
    let ab = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let ap = [p[0] - a[0], p[1] - a[1], p[2] - a[2]];
    let len2: f64 = ab.iter().map(|v| v * v).sum();
    let t = (ab.iter().zip(&ap).map(|(u, v)| u * v).sum::<f64>() / len2).clamp(0.0, 1.0);
    (0..3)
        .map(|k| (ap[k] - t * ab[k]).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Fills every voxel within `radius` of one of the capsules with [`VESSEL`].
fn capsules(dims: [usize; 3], parts: &[([f64; 3], [f64; 3], f64)]) -> VolumeF32 {
    let mut v = VolumeF32::new(dims);
    for i in 0..v.len() {
        let q = v.index_of(i);
        let p = [q[0] as f64, q[1] as f64, q[2] as f64];
        if parts
            .iter()
            .any(|&(a, b, r)| segment_distance(p, a, b) <= r)
        {
            v.data[i] = VESSEL;
        }
    }
    v
}

/// Bright cylinder along x through the centre of the y/z extents.
pub fn tube_x(dims: [usize; 3], radius: f64) -> VolumeF32 {
    let (cy, cz) = ((dims[1] / 2) as f64, (dims[2] / 2) as f64);
    let mut v = VolumeF32::new(dims);
    for i in 0..v.len() {
        let p = v.index_of(i);
        let d2 = (p[1] as f64 - cy).powi(2) + (p[2] as f64 - cz).powi(2);
        if d2 <= radius * radius {
            v.data[i] = VESSEL;
        }
    }
    v
}

/// Trunk along x splitting at `junction_x` into two symmetric branches
/// tilted by `angle_deg` in the x/y plane.
pub fn y_junction(
    dims: [usize; 3],
    trunk_radius: f64,
    branch_radius: f64,
    angle_deg: f64,
    junction_x: f64,
) -> VolumeF32 {
    let (cy, cz) = ((dims[1] / 2) as f64, (dims[2] / 2) as f64);
    let j = [junction_x, cy, cz];
    let (s, c) = angle_deg.to_radians().sin_cos();
    let len = 100.0;
    capsules(
        dims,
        &[
            ([-5.0, cy, cz], j, trunk_radius),
            (j, [junction_x + len * c, cy + len * s, cz], branch_radius),
            (j, [junction_x + len * c, cy - len * s, cz], branch_radius),
        ],
    )
}
