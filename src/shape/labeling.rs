const NEIGH_OFFSETS: [(isize, isize); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

/// 4-connected component labels of a planar mask.
///
/// Labels start at 1 and are assigned in raster order of each component's
/// first pixel; background stays 0. Returns the label image and the number of
/// components.
pub fn label_components(mask: &[bool], w: usize, h: usize) -> (Vec<u32>, u32) {
    let mut labels = vec![0u32; w * h];
    let mut stack: Vec<usize> = Vec::with_capacity(64);
    let mut next = 0u32;
    for start in 0..(w * h) {
        if !mask[start] || labels[start] != 0 {
            continue;
        }
        next += 1;
        labels[start] = next;
        stack.push(start);
        while let Some(idx) = stack.pop() {
            let x = (idx % w) as isize;
            let y = (idx / w) as isize;
            for (dx, dy) in NEIGH_OFFSETS {
                let nx = x + dx;
                let ny = y + dy;
                if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
                    continue;
                }
                let nidx = ny as usize * w + nx as usize;
                if mask[nidx] && labels[nidx] == 0 {
                    labels[nidx] = next;
                    stack.push(nidx);
                }
            }
        }
    }
    (labels, next)
}
