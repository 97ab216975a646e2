/// Trait implemented by separable 1D filters applied along one volume axis.
pub trait SeparableFilter {
    /// Return the 1D taps (in left-to-right order), centred on the middle tap.
    fn taps(&self) -> &[f64];

    /// Half-width of the kernel.
    fn radius(&self) -> usize {
        self.taps().len() / 2
    }
}

/// Sampled Gaussian derivative kernel of order 0, 1 or 2.
///
/// Taps are applied as a correlation, `out(x) = Σ k(t) · f(x + t)`.
/// - order 0 sums to one;
/// - order 1 maps a unit ramp to one;
/// - order 2 sums to zero and maps `t²` to two.
#[derive(Clone, Debug)]
pub struct GaussianDerivative {
    pub sigma: f64,
    pub order: usize,
    taps: Vec<f64>,
}

impl GaussianDerivative {
    pub fn new(sigma: f64, order: usize) -> Self {
        let sigma = sigma.max(1e-3);
        let radius = ((3.0 * sigma).ceil() as usize).max(1);
        let ts: Vec<f64> = (0..=2 * radius).map(|i| i as f64 - radius as f64).collect();
        let s2 = sigma * sigma;
        let g: Vec<f64> = ts.iter().map(|t| (-t * t / (2.0 * s2)).exp()).collect();
        let g_sum: f64 = g.iter().sum();
        let g: Vec<f64> = g.iter().map(|v| v / g_sum).collect();

        let taps = match order {
            0 => g,
            1 => {
                let raw: Vec<f64> = ts.iter().zip(&g).map(|(t, v)| t * v).collect();
                let moment: f64 = ts.iter().zip(&raw).map(|(t, v)| t * v).sum();
                raw.iter().map(|v| v / moment).collect()
            }
            _ => {
                let raw: Vec<f64> = ts
                    .iter()
                    .zip(&g)
                    .map(|(t, v)| (t * t / (s2 * s2) - 1.0 / s2) * v)
                    .collect();
                let mean = raw.iter().sum::<f64>() / raw.len() as f64;
                let centred: Vec<f64> = raw.iter().map(|v| v - mean).collect();
                let moment: f64 = ts.iter().zip(&centred).map(|(t, v)| t * t * v).sum();
                centred.iter().map(|v| 2.0 * v / moment).collect()
            }
        };
        Self {
            sigma,
            order: order.min(2),
            taps,
        }
    }
}

impl SeparableFilter for GaussianDerivative {
    #[inline]
    fn taps(&self) -> &[f64] {
        &self.taps
    }
}

/// The three kernel orders needed for a Hessian at one scale.
#[derive(Clone, Debug)]
pub struct DerivativeKernels {
    pub smooth: GaussianDerivative,
    pub first: GaussianDerivative,
    pub second: GaussianDerivative,
}

impl DerivativeKernels {
    pub fn new(sigma: f64) -> Self {
        Self {
            smooth: GaussianDerivative::new(sigma, 0),
            first: GaussianDerivative::new(sigma, 1),
            second: GaussianDerivative::new(sigma, 2),
        }
    }

    #[inline]
    pub fn radius(&self) -> usize {
        self.smooth.radius()
    }

    /// Kernel for derivative `order`.
    #[inline]
    pub fn order(&self, order: usize) -> &[f64] {
        match order {
            0 => self.smooth.taps(),
            1 => self.first.taps(),
            _ => self.second.taps(),
        }
    }
}
