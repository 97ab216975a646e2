/// Face-neighbour offsets in 3D. On planar images the z steps simply fall
/// outside the grid.
const FACE_OFFSETS: [[i64; 3]; 6] = [
    [-1, 0, 0],
    [1, 0, 0],
    [0, -1, 0],
    [0, 1, 0],
    [0, 0, -1],
    [0, 0, 1],
];

/// Stack-based seeded region growing over a flat x-fastest grid.
pub(super) struct RegionGrower<'a> {
    values: &'a [f32],
    shape: [usize; 3],
    lower: f32,
    upper: f32,
    mask: Vec<bool>,
    stack: Vec<usize>,
}

impl<'a> RegionGrower<'a> {
    pub(super) fn new(values: &'a [f32], shape: [usize; 3], lower: f32, upper: f32) -> Self {
        Self {
            values,
            shape,
            lower,
            upper,
            mask: vec![false; values.len()],
            stack: Vec::with_capacity(64),
        }
    }

    #[inline]
    fn accepts(&self, idx: usize) -> bool {
        let v = self.values[idx];
        v >= self.lower && v <= self.upper
    }

    /// Grows the face-connected region of accepted values containing `seed`.
    /// A seed that is itself rejected yields an empty mask.
    pub(super) fn grow(mut self, seed: usize) -> Vec<bool> {
        if !self.accepts(seed) {
            return self.mask;
        }
        self.mask[seed] = true;
        self.stack.push(seed);
        let [nx, ny, nz] = self.shape;
        while let Some(idx) = self.stack.pop() {
            let p = [
                (idx % nx) as i64,
                ((idx / nx) % ny) as i64,
                (idx / (nx * ny)) as i64,
            ];
            for off in FACE_OFFSETS {
                let q = [p[0] + off[0], p[1] + off[1], p[2] + off[2]];
                if q[0] < 0
                    || q[1] < 0
                    || q[2] < 0
                    || q[0] >= nx as i64
                    || q[1] >= ny as i64
                    || q[2] >= nz as i64
                {
                    continue;
                }
                let nidx = q[0] as usize + nx * (q[1] as usize + ny * q[2] as usize);
                if self.mask[nidx] || !self.accepts(nidx) {
                    continue;
                }
                self.mask[nidx] = true;
                self.stack.push(nidx);
            }
        }
        self.mask
    }
}
