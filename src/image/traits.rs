/// Read-only access to a dense scalar grid of up to three dimensions.
///
/// Planar images report a depth of one. Storage is x-fastest, then y, then z.
pub trait Raster {
    /// Extents `[x, y, z]`.
    fn shape(&self) -> [usize; 3];

    /// Backing storage in x-fastest order.
    fn values(&self) -> &[f32];

    fn len(&self) -> usize {
        let [nx, ny, nz] = self.shape();
        nx * ny * nz
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the grid has a single z slice.
    fn is_planar(&self) -> bool {
        self.shape()[2] == 1
    }

    #[inline]
    fn linear(&self, p: [usize; 3]) -> usize {
        let [nx, ny, _] = self.shape();
        p[0] + nx * (p[1] + ny * p[2])
    }

    #[inline]
    fn coords(&self, i: usize) -> [usize; 3] {
        let [nx, ny, _] = self.shape();
        [i % nx, (i / nx) % ny, i / (nx * ny)]
    }

    /// Signed containment test.
    #[inline]
    fn contains_signed(&self, p: [i64; 3]) -> bool {
        let s = self.shape();
        (0..3).all(|k| p[k] >= 0 && (p[k] as usize) < s[k])
    }
}
