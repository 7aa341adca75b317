#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::misc::ln_gammafn;
use crate::traits::*;
use rand::Rng;
use std::f64::consts::PI;
use std::fmt;

/// [Student's T distribution](https://en.wikipedia.org/wiki/Student%27s_t-distribution)
/// with location and scale, over x in (-∞, ∞).
///
/// This is the predictive distribution of the t-process regression: the
/// heavy-tailed law obtained by marginalizing an unknown variance under an
/// Inverse-Gamma prior. `StudentsT::new(v, 0.0, 1.0)` recovers the standard
/// Student's t.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct StudentsT {
    /// Degrees of freedom, ν, in (0, ∞)
    v: f64,
    /// Location of the distribution
    loc: f64,
    /// Scale of the distribution, in (0, ∞)
    scale: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum StudentsTError {
    /// The v parameter is infinite or NaN
    VNotFinite { v: f64 },
    /// The v parameter is less than or equal to zero
    VTooLow { v: f64 },
    /// The loc parameter is infinite or NaN
    LocNotFinite { loc: f64 },
    /// The scale parameter is infinite or NaN
    ScaleNotFinite { scale: f64 },
    /// The scale parameter is less than or equal to zero
    ScaleTooLow { scale: f64 },
}

impl StudentsT {
    /// Create a new Student's T distribution with degrees of freedom `v`,
    /// location `loc`, and scale `scale`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stproc::dist::StudentsT;
    ///
    /// let t = StudentsT::new(4.2, 1.0, 0.5).unwrap();
    /// assert_eq!(t.v(), 4.2);
    ///
    /// // invalid parameters are rejected
    /// assert!(StudentsT::new(0.0, 1.0, 0.5).is_err());
    /// assert!(StudentsT::new(4.2, f64::NAN, 0.5).is_err());
    /// assert!(StudentsT::new(4.2, 1.0, -1.0).is_err());
    /// ```
    pub fn new(v: f64, loc: f64, scale: f64) -> Result<Self, StudentsTError> {
        if !v.is_finite() {
            Err(StudentsTError::VNotFinite { v })
        } else if v <= 0.0 {
            Err(StudentsTError::VTooLow { v })
        } else if !loc.is_finite() {
            Err(StudentsTError::LocNotFinite { loc })
        } else if !scale.is_finite() {
            Err(StudentsTError::ScaleNotFinite { scale })
        } else if scale <= 0.0 {
            Err(StudentsTError::ScaleTooLow { scale })
        } else {
            Ok(StudentsT { v, loc, scale })
        }
    }

    /// Creates a new StudentsT without checking whether the parameters are
    /// valid.
    #[inline]
    #[must_use]
    pub fn new_unchecked(v: f64, loc: f64, scale: f64) -> Self {
        StudentsT { v, loc, scale }
    }

    /// Get the degrees of freedom, v
    #[inline]
    pub fn v(&self) -> f64 {
        self.v
    }

    /// Get the location parameter
    #[inline]
    pub fn loc(&self) -> f64 {
        self.loc
    }

    /// Get the scale parameter
    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl Default for StudentsT {
    fn default() -> Self {
        StudentsT {
            v: 2.0,
            loc: 0.0,
            scale: 1.0,
        }
    }
}

impl fmt::Display for StudentsT {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Student's({}, loc: {}, scale: {})",
            self.v, self.loc, self.scale
        )
    }
}

macro_rules! impl_traits {
    ($kind:ty) => {
        impl HasDensity<$kind> for StudentsT {
            fn ln_f(&self, x: &$kind) -> f64 {
                // TODO: could cache ln(pi*v) and ln_gamma(v/2)
                let vp1 = (self.v + 1.0) / 2.0;
                let z = (f64::from(*x) - self.loc) / self.scale;
                let xterm = -vp1 * (z * z / self.v).ln_1p();
                let zterm = 0.5_f64.mul_add(
                    -(self.v * PI).ln(),
                    ln_gammafn(vp1) - ln_gammafn(self.v / 2.0),
                );
                zterm + xterm - self.scale.ln()
            }
        }

        impl Sampleable<$kind> for StudentsT {
            fn draw<R: Rng>(&self, rng: &mut R) -> $kind {
                let t = rand_distr::StudentT::new(self.v).unwrap();
                self.scale.mul_add(rng.sample(t), self.loc) as $kind
            }

            fn sample<R: Rng>(&self, n: usize, rng: &mut R) -> Vec<$kind> {
                let t = rand_distr::StudentT::new(self.v).unwrap();
                (0..n)
                    .map(|_| self.scale.mul_add(rng.sample(t), self.loc) as $kind)
                    .collect()
            }
        }

        impl Support<$kind> for StudentsT {
            fn supports(&self, x: &$kind) -> bool {
                x.is_finite()
            }
        }

        impl ContinuousDistr<$kind> for StudentsT {}

        impl Mean<$kind> for StudentsT {
            fn mean(&self) -> Option<$kind> {
                if self.v > 1.0 {
                    Some(self.loc as $kind)
                } else {
                    None
                }
            }
        }

        impl Median<$kind> for StudentsT {
            fn median(&self) -> Option<$kind> {
                Some(self.loc as $kind)
            }
        }

        impl Mode<$kind> for StudentsT {
            fn mode(&self) -> Option<$kind> {
                Some(self.loc as $kind)
            }
        }

        impl Variance<$kind> for StudentsT {
            fn variance(&self) -> Option<$kind> {
                if self.v > 2.0 {
                    let var = self.scale * self.scale * self.v / (self.v - 2.0);
                    Some(var as $kind)
                } else {
                    None
                }
            }
        }
    };
}

impl Skewness for StudentsT {
    fn skewness(&self) -> Option<f64> {
        if self.v > 3.0 {
            Some(0.0)
        } else {
            None
        }
    }
}

impl Kurtosis for StudentsT {
    fn kurtosis(&self) -> Option<f64> {
        if self.v > 4.0 {
            Some(6.0 / (self.v - 4.0))
        } else if self.v > 2.0 {
            Some(f64::INFINITY)
        } else {
            None
        }
    }
}

impl_traits!(f64);
impl_traits!(f32);

impl std::error::Error for StudentsTError {}

impl fmt::Display for StudentsTError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VNotFinite { v } => write!(f, "non-finite v: {}", v),
            Self::VTooLow { v } => {
                write!(f, "v ({}) must be greater than zero", v)
            }
            Self::LocNotFinite { loc } => {
                write!(f, "non-finite loc: {}", loc)
            }
            Self::ScaleNotFinite { scale } => {
                write!(f, "non-finite scale: {}", scale)
            }
            Self::ScaleTooLow { scale } => {
                write!(f, "scale ({}) must be greater than zero", scale)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f64;

    const TOL: f64 = 1E-12;

    #[test]
    fn new() {
        let t = StudentsT::new(2.3, 0.1, 1.2).unwrap();
        assert::close(t.v, 2.3, TOL);
        assert::close(t.loc, 0.1, TOL);
        assert::close(t.scale, 1.2, TOL);
    }

    #[test]
    fn new_should_reject_v_leq_zero() {
        assert!(StudentsT::new(f64::MIN_POSITIVE, 0.0, 1.0).is_ok());
        assert!(StudentsT::new(0.0, 0.0, 1.0).is_err());
        assert!(StudentsT::new(-f64::MIN_POSITIVE, 0.0, 1.0).is_err());
        assert!(StudentsT::new(-1.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn new_should_reject_non_finite_params() {
        assert!(StudentsT::new(f64::INFINITY, 0.0, 1.0).is_err());
        assert!(StudentsT::new(-f64::NAN, 0.0, 1.0).is_err());
        assert!(StudentsT::new(2.0, f64::NEG_INFINITY, 1.0).is_err());
        assert!(StudentsT::new(2.0, 0.0, f64::NAN).is_err());
    }

    #[test]
    fn new_should_reject_scale_leq_zero() {
        assert!(StudentsT::new(2.0, 0.0, f64::MIN_POSITIVE).is_ok());
        assert!(StudentsT::new(2.0, 0.0, 0.0).is_err());
        assert!(StudentsT::new(2.0, 0.0, -1.0).is_err());
    }

    #[test]
    fn ln_pdf_standard() {
        let t = StudentsT::new(2.3, 0.0, 1.0).unwrap();
        assert::close(t.ln_pdf(&0.0_f64), -1.024_744_023_893_756_6, TOL);
        assert::close(t.ln_pdf(&1.0_f64), -1.620_416_044_030_352, TOL);
        assert::close(t.ln_pdf(&2.5_f64), -3.191_230_587_916_138, TOL);
        assert::close(t.ln_pdf(&-2.5_f64), -3.191_230_587_916_138, TOL);
    }

    #[test]
    fn ln_pdf_loc_scale() {
        // f(loc + scale·z | loc, scale) = f(z | 0, 1) / scale
        let t = StudentsT::new(2.3, 1.0, 2.0).unwrap();
        let x: f64 = 3.0;
        assert::close(
            t.ln_pdf(&x),
            -1.620_416_044_030_352 - 2.0_f64.ln(),
            TOL,
        );
    }

    #[test]
    fn variance() {
        let v: f64 = StudentsT::new(2.3, 0.0, 1.0).unwrap().variance().unwrap();
        assert::close(v, 7.666_666_666_666_670_5, TOL);

        let v: f64 = StudentsT::new(2.3, 0.0, 2.0).unwrap().variance().unwrap();
        assert::close(v, 4.0 * 7.666_666_666_666_670_5, TOL);

        let v: Option<f64> = StudentsT::new(2.0, 0.0, 1.0).unwrap().variance();
        assert!(v.is_none());
    }

    #[test]
    fn mean_median_mode_are_loc() {
        let t = StudentsT::new(2.3, -0.4, 1.5).unwrap();
        let mean: f64 = t.mean().unwrap();
        let median: f64 = t.median().unwrap();
        let mode: f64 = t.mode().unwrap();
        assert::close(mean, -0.4, TOL);
        assert::close(median, -0.4, TOL);
        assert::close(mode, -0.4, TOL);

        // mean undefined for v <= 1
        let heavy = StudentsT::new(1.0, -0.4, 1.5).unwrap();
        let mean: Option<f64> = heavy.mean();
        assert!(mean.is_none());
    }

    #[test]
    fn sample_returns_finite_values() {
        let mut rng = StdRng::seed_from_u64(0xABCD);
        let t = StudentsT::new(3.0, 0.5, 2.0).unwrap();
        let xs: Vec<f64> = t.sample(100, &mut rng);
        assert_eq!(xs.len(), 100);
        assert!(xs.iter().all(|x| t.supports(x)));
    }

    #[test]
    fn sample_mean_approaches_loc() {
        let mut rng = StdRng::seed_from_u64(0x1234);
        let t = StudentsT::new(10.0, 2.0, 0.5).unwrap();
        let n = 100_000;
        let xs: Vec<f64> = t.sample(n, &mut rng);
        let est = xs.iter().sum::<f64>() / n as f64;
        assert::close(est, 2.0, 1E-1);
    }
}
