//! Topology-preserving 3D binary thinning.
//!
//! Border voxels are peeled in six directional sub-iterations (±x, ±y, ±z)
//! until nothing changes. A voxel is removed only when it is simple (its
//! removal changes neither the 26-connected foreground nor the 6-connected
//! background locally) and is not a curve end point.

const DIRECTIONS: [[i64; 3]; 6] = [
    [0, 0, 1],
    [0, 0, -1],
    [0, 1, 0],
    [0, -1, 0],
    [1, 0, 0],
    [-1, 0, 0],
];

const CENTER: usize = 13;

#[inline]
fn offset_of(k: usize) -> [i64; 3] {
    [(k % 3) as i64 - 1, ((k / 3) % 3) as i64 - 1, (k / 9) as i64 - 1]
}

/// 3×3×3 neighbourhood of `p`, indexed `(dx+1) + 3(dy+1) + 9(dz+1)`.
/// Voxels outside the grid read as background.
fn neighbourhood(mask: &[bool], dims: [usize; 3], p: [i64; 3]) -> [bool; 27] {
    let mut nb = [false; 27];
    for (k, slot) in nb.iter_mut().enumerate() {
        let o = offset_of(k);
        let q = [p[0] + o[0], p[1] + o[1], p[2] + o[2]];
        if (0..3).all(|a| q[a] >= 0 && (q[a] as usize) < dims[a]) {
            *slot = mask[q[0] as usize + dims[0] * (q[1] as usize + dims[1] * q[2] as usize)];
        }
    }
    nb
}

fn count_components(
    members: &[bool; 27],
    adjacent: impl Fn([i64; 3], [i64; 3]) -> bool,
    required: Option<&[usize]>,
) -> usize {
    let mut seen = [false; 27];
    let mut count = 0;
    let mut stack: Vec<usize> = Vec::with_capacity(27);
    for start in 0..27 {
        if !members[start] || seen[start] {
            continue;
        }
        seen[start] = true;
        stack.push(start);
        let mut touches = required.is_none();
        while let Some(k) = stack.pop() {
            if let Some(req) = required {
                touches |= req.contains(&k);
            }
            let ok = offset_of(k);
            for j in 0..27 {
                if members[j] && !seen[j] && adjacent(ok, offset_of(j)) {
                    seen[j] = true;
                    stack.push(j);
                }
            }
        }
        if touches {
            count += 1;
        }
    }
    count
}

fn is_simple(nb: &[bool; 27]) -> bool {
    let mut fg = *nb;
    fg[CENTER] = false;
    let adj26 = |a: [i64; 3], b: [i64; 3]| (0..3).all(|k| (a[k] - b[k]).abs() <= 1);
    if count_components(&fg, adj26, None) != 1 {
        return false;
    }

    let mut bg = [false; 27];
    for (k, slot) in bg.iter_mut().enumerate() {
        let o = offset_of(k);
        let nonzero = o.iter().filter(|&&c| c != 0).count();
        *slot = k != CENTER && nonzero <= 2 && !nb[k];
    }
    let adj6 = |a: [i64; 3], b: [i64; 3]| (0..3).map(|k| (a[k] - b[k]).abs()).sum::<i64>() == 1;
    const FACES: [usize; 6] = [4, 10, 12, 14, 16, 22];
    count_components(&bg, adj6, Some(&FACES)) == 1
}

#[inline]
fn is_end_point(nb: &[bool; 27]) -> bool {
    nb.iter().enumerate().filter(|&(k, &v)| k != CENTER && v).count() <= 1
}

/// One-voxel-wide skeleton of `mask` (x-fastest grid of extents `dims`).
pub fn thin(mask: &[bool], dims: [usize; 3]) -> Vec<bool> {
    let mut out = mask.to_vec();
    let coords = |i: usize| -> [i64; 3] {
        [
            (i % dims[0]) as i64,
            ((i / dims[0]) % dims[1]) as i64,
            (i / (dims[0] * dims[1])) as i64,
        ]
    };
    loop {
        let mut changed = false;
        for dir in DIRECTIONS {
            let candidates: Vec<usize> = (0..out.len())
                .filter(|&i| {
                    if !out[i] {
                        return false;
                    }
                    let p = coords(i);
                    let nb = neighbourhood(&out, dims, p);
                    let border = !nb[CENTER + (dir[0] + 3 * dir[1] + 9 * dir[2]) as usize];
                    border && !is_end_point(&nb) && is_simple(&nb)
                })
                .collect();
            for i in candidates {
                let nb = neighbourhood(&out, dims, coords(i));
                if !is_end_point(&nb) && is_simple(&nb) {
                    out[i] = false;
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }
    out
}
