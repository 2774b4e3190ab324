//! Tabulated von Mises sampler for direction errors.
//!
//! The density is evaluated on 720 bins over `[−π, π)` and accumulated into
//! an (unnormalized) CDF the first time a sample is drawn.  Sampling draws
//! `r` uniformly below the last CDF entry and returns the left edge of the
//! bin whose interval contains it, so results are quantized to half a degree.

use std::f64::consts::{PI, TAU};
use std::sync::OnceLock;

use ped_core::AgentRng;

/// Number of CDF bins over the full circle.
pub const BINS: usize = 720;

/// Von Mises distribution centred on zero.
#[derive(Clone, Debug)]
pub struct VonMises {
    concentration: f64,
    cdf:           OnceLock<Vec<f64>>,
}

impl VonMises {
    /// `concentration` is κ.  Zero gives a uniform circle; larger values
    /// pull samples towards zero.
    pub fn new(concentration: f64) -> Self {
        Self { concentration, cdf: OnceLock::new() }
    }

    pub fn concentration(&self) -> f64 {
        self.concentration
    }

    /// Probability density at angle `x`.
    pub fn density(&self, x: f64) -> f64 {
        let k = self.concentration;
        (k * x.cos()).exp() / (TAU * bessel_i0(k))
    }

    /// Left edge of bin `i`.
    #[inline]
    fn bin_angle(i: usize) -> f64 {
        TAU * (i as f64 / BINS as f64) - PI
    }

    fn cdf(&self) -> &[f64] {
        self.cdf.get_or_init(|| {
            let mut cdf = Vec::with_capacity(BINS);
            let mut acc = 0.0;
            for i in 0..BINS {
                acc += self.density(Self::bin_angle(i));
                cdf.push(acc);
            }
            cdf
        })
    }

    /// `true` once the CDF table has been built.
    pub fn is_tabulated(&self) -> bool {
        self.cdf.get().is_some()
    }

    /// Draw an angle in `[−π, π]`.
    pub fn sample(&self, rng: &mut AgentRng) -> f64 {
        let cdf = self.cdf();
        let (Some(&lower), Some(&upper)) = (cdf.first(), cdf.last()) else {
            return 0.0;
        };
        // κ large enough to overflow the density leaves nothing to sample.
        if !(upper > 0.0) || !upper.is_finite() {
            return 0.0;
        }

        let r = rng.gen_range(0.0..upper);
        if r < lower {
            return -PI;
        }
        cdf.windows(2)
            .position(|w| w[0] < r && r < w[1])
            .map_or(PI, Self::bin_angle)
    }
}

/// Modified Bessel function of the first kind, order zero.
///
/// Polynomial approximation from Abramowitz & Stegun 9.8.1 / 9.8.2.
pub fn bessel_i0(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 3.75 {
        let y = (x / 3.75).powi(2);
        1.0 + y * (3.5156229
            + y * (3.0899424
            + y * (1.2067492
            + y * (0.2659732
            + y * (0.0360768
            + y * 0.0045813)))))
    } else {
        let y = 3.75 / ax;
        (ax.exp() / ax.sqrt())
            * (0.39894228
            + y * (0.01328592
            + y * (0.00225319
            + y * (-0.00157565
            + y * (0.00916281
            + y * (-0.02057706
            + y * (0.02635537
            + y * (-0.01647633
            + y * 0.00392377))))))))
    }
}
