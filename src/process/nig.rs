//! The Normal-Inverse-Gamma hyperprior on the mean-offset coefficients and
//! the signal scale.
//!
//! Given residual scale `σ²`, the mean-offset coefficients are
//! `w ~ N(w₀, σ² Λ₀⁻¹)` with diagonal prior precision `Λ₀`, and
//! `σ² ~ InvGamma(α₀, β₀)`. For a reference see section 6 of [Kevin
//! Murphy's whitepaper](https://www.cs.ubc.ca/~murphyk/Papers/bayesGauss.pdf).
use nalgebra::DVector;
use std::fmt;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Hyperprior constants of the hierarchical regression
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct NigParams {
    /// Prior mean w₀ of the mean-offset coefficients
    loc: DVector<f64>,
    /// Diagonal of the prior precision Λ₀, one entry per coefficient
    precision: DVector<f64>,
    /// Prior shape α₀ of the Inverse-Gamma on the signal scale
    shape: f64,
    /// Prior rate β₀ of the Inverse-Gamma on the signal scale
    rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub enum NigParamsError {
    /// A coefficient of the prior mean is infinite or NaN
    LocNotFinite { ix: usize, coef: f64 },
    /// A prior precision entry is infinite or NaN
    PrecisionNotFinite { ix: usize, precision: f64 },
    /// A prior precision entry is less than or equal to zero
    PrecisionTooLow { ix: usize, precision: f64 },
    /// The shape parameter is infinite or NaN
    ShapeNotFinite { shape: f64 },
    /// The shape parameter is less than or equal to zero
    ShapeTooLow { shape: f64 },
    /// The rate parameter is infinite or NaN
    RateNotFinite { rate: f64 },
    /// The rate parameter is less than or equal to zero
    RateTooLow { rate: f64 },
    /// The prior mean and precision have different lengths
    MismatchedDims { loc: usize, precision: usize },
}

impl NigParams {
    /// Create a new prior from a coefficient mean, per-coefficient
    /// precision, and Inverse-Gamma shape and rate.
    pub fn new(
        loc: DVector<f64>,
        precision: DVector<f64>,
        shape: f64,
        rate: f64,
    ) -> Result<Self, NigParamsError> {
        if loc.len() != precision.len() {
            return Err(NigParamsError::MismatchedDims {
                loc: loc.len(),
                precision: precision.len(),
            });
        }
        for (ix, &coef) in loc.iter().enumerate() {
            if !coef.is_finite() {
                return Err(NigParamsError::LocNotFinite { ix, coef });
            }
        }
        for (ix, &p) in precision.iter().enumerate() {
            if !p.is_finite() {
                return Err(NigParamsError::PrecisionNotFinite {
                    ix,
                    precision: p,
                });
            } else if p <= 0.0 {
                return Err(NigParamsError::PrecisionTooLow {
                    ix,
                    precision: p,
                });
            }
        }
        if !shape.is_finite() {
            Err(NigParamsError::ShapeNotFinite { shape })
        } else if shape <= 0.0 {
            Err(NigParamsError::ShapeTooLow { shape })
        } else if !rate.is_finite() {
            Err(NigParamsError::RateNotFinite { rate })
        } else if rate <= 0.0 {
            Err(NigParamsError::RateTooLow { rate })
        } else {
            Ok(NigParams {
                loc,
                precision,
                shape,
                rate,
            })
        }
    }

    /// Create a prior with every coefficient sharing the same mean and
    /// precision.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stproc::process::NigParams;
    ///
    /// let prior = NigParams::isotropic(2, 0.0, 1.0, 1.0, 1.0).unwrap();
    /// assert_eq!(prior.n_features(), 2);
    /// assert_eq!(prior.shape(), 1.0);
    /// ```
    pub fn isotropic(
        n_features: usize,
        loc: f64,
        precision: f64,
        shape: f64,
        rate: f64,
    ) -> Result<Self, NigParamsError> {
        Self::new(
            DVector::from_element(n_features, loc),
            DVector::from_element(n_features, precision),
            shape,
            rate,
        )
    }

    /// Creates a new NigParams without checking whether the parameters are
    /// valid.
    #[inline]
    #[must_use]
    pub fn new_unchecked(
        loc: DVector<f64>,
        precision: DVector<f64>,
        shape: f64,
        rate: f64,
    ) -> Self {
        NigParams {
            loc,
            precision,
            shape,
            rate,
        }
    }

    /// Number of mean-offset coefficients this prior covers
    #[inline]
    pub fn n_features(&self) -> usize {
        self.loc.len()
    }

    /// Get the prior coefficient mean w₀
    #[inline]
    pub fn loc(&self) -> &DVector<f64> {
        &self.loc
    }

    /// Get the diagonal of the prior precision Λ₀
    #[inline]
    pub fn precision(&self) -> &DVector<f64> {
        &self.precision
    }

    /// Get the prior shape α₀
    #[inline]
    pub fn shape(&self) -> f64 {
        self.shape
    }

    /// Get the prior rate β₀
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Sum of the logs of the prior precision diagonal, ln|Λ₀|
    #[inline]
    pub(crate) fn ln_det_precision(&self) -> f64 {
        self.precision.iter().map(|p| p.ln()).sum()
    }
}

impl fmt::Display for NigParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Normal-Inverse-Gamma(p: {}, shape: {}, rate: {})",
            self.n_features(),
            self.shape,
            self.rate
        )
    }
}

impl std::error::Error for NigParamsError {}

impl fmt::Display for NigParamsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocNotFinite { ix, coef } => {
                write!(f, "non-finite prior mean coefficient {} at {}", coef, ix)
            }
            Self::PrecisionNotFinite { ix, precision } => {
                write!(f, "non-finite prior precision {} at {}", precision, ix)
            }
            Self::PrecisionTooLow { ix, precision } => write!(
                f,
                "prior precision ({}) at {} must be greater than zero",
                precision, ix
            ),
            Self::ShapeNotFinite { shape } => {
                write!(f, "non-finite shape: {}", shape)
            }
            Self::ShapeTooLow { shape } => {
                write!(f, "shape ({}) must be greater than zero", shape)
            }
            Self::RateNotFinite { rate } => {
                write!(f, "non-finite rate: {}", rate)
            }
            Self::RateTooLow { rate } => {
                write!(f, "rate ({}) must be greater than zero", rate)
            }
            Self::MismatchedDims { loc, precision } => write!(
                f,
                "prior mean has {} coefficients but precision has {}",
                loc, precision
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_valid_params() {
        let prior = NigParams::new(
            DVector::from_column_slice(&[0.0, 0.5]),
            DVector::from_column_slice(&[1.0, 2.0]),
            1.5,
            2.5,
        )
        .unwrap();
        assert_eq!(prior.n_features(), 2);
        assert::close(prior.rate(), 2.5, 1E-12);
    }

    #[test]
    fn new_rejects_mismatched_dims() {
        let res = NigParams::new(
            DVector::from_column_slice(&[0.0, 0.5]),
            DVector::from_column_slice(&[1.0]),
            1.0,
            1.0,
        );
        assert!(matches!(
            res,
            Err(NigParamsError::MismatchedDims { loc: 2, precision: 1 })
        ));
    }

    #[test]
    fn new_rejects_bad_scalars() {
        assert!(NigParams::isotropic(1, 0.0, 1.0, 0.0, 1.0).is_err());
        assert!(NigParams::isotropic(1, 0.0, 1.0, 1.0, -1.0).is_err());
        assert!(NigParams::isotropic(1, 0.0, 1.0, f64::NAN, 1.0).is_err());
        assert!(NigParams::isotropic(1, 0.0, 1.0, 1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn new_rejects_bad_vectors() {
        assert!(NigParams::isotropic(2, f64::NAN, 1.0, 1.0, 1.0).is_err());
        assert!(NigParams::isotropic(2, 0.0, 0.0, 1.0, 1.0).is_err());
        assert!(NigParams::isotropic(2, 0.0, -2.0, 1.0, 1.0).is_err());
    }

    #[test]
    fn ln_det_precision_sums_logs() {
        let prior = NigParams::new(
            DVector::from_column_slice(&[0.0, 0.0]),
            DVector::from_column_slice(&[2.0, 8.0]),
            1.0,
            1.0,
        )
        .unwrap();
        assert::close(prior.ln_det_precision(), 16.0_f64.ln(), 1E-12);
    }
}
