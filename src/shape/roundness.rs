use super::labeling::label_components;
use std::f64::consts::{PI, SQRT_2};

/// Compactness of the first connected component of a planar mask.
///
/// `2·√(π·area) / perimeter`, clamped to `[0, 1]`. The perimeter is the
/// four-direction Crofton estimate from boundary crossings along rows,
/// columns and both diagonals, which keeps digital disks close to one.
/// Empty masks score zero.
pub fn roundness(mask: &[bool], w: usize, h: usize) -> f64 {
    let (labels, count) = label_components(mask, w, h);
    if count == 0 {
        return 0.0;
    }
    let area = labels.iter().filter(|&&l| l == 1).count();
    let inside = |x: isize, y: isize| -> bool {
        x >= 0 && y >= 0 && (x as usize) < w && (y as usize) < h && labels[y as usize * w + x as usize] == 1
    };

    let mut crossings = [0usize; 4];
    let dirs: [(isize, isize); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];
    for y in -1..=(h as isize) {
        for x in -1..=(w as isize) {
            let here = inside(x, y);
            for (k, (dx, dy)) in dirs.iter().enumerate() {
                if here != inside(x + dx, y + dy) {
                    crossings[k] += 1;
                }
            }
        }
    }
    let perimeter = PI / 8.0
        * (crossings[0] as f64 + crossings[1] as f64 + (crossings[2] + crossings[3]) as f64 / SQRT_2);
    if perimeter <= 0.0 {
        return 0.0;
    }
    (2.0 * (PI * area as f64).sqrt() / perimeter).clamp(0.0, 1.0)
}
