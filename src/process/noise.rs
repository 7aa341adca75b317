use nalgebra::{DMatrix, DVector};

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use super::ProcessError;

/// Model of observation noise folded into the training covariance
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub enum NoiseModel {
    /// The same noise is applied to all values
    Uniform(f64),
    /// Different noise values are applied to each y-value
    PerPoint(DVector<f64>),
}

impl Default for NoiseModel {
    fn default() -> Self {
        NoiseModel::Uniform(1E-10)
    }
}

impl NoiseModel {
    /// Enact the given noise model onto the given covariance matrix
    pub fn add_noise_to_kernel(
        &self,
        cov: &DMatrix<f64>,
    ) -> Result<DMatrix<f64>, ProcessError> {
        match self {
            NoiseModel::Uniform(noise) => {
                let diag = DVector::from_element(cov.nrows(), noise.powi(2));
                Ok(cov + &DMatrix::from_diagonal(&diag))
            }
            NoiseModel::PerPoint(sigma) => {
                if cov.nrows() == sigma.nrows() {
                    let s = sigma.map(|e| e * e);
                    Ok(cov + &DMatrix::from_diagonal(&s))
                } else {
                    Err(ProcessError::ShapeMismatch {
                        expected: cov.nrows(),
                        got: sigma.nrows(),
                    })
                }
            }
        }
    }

    /// Noise variance entering a single query's predictive variance.
    ///
    /// Per-point noise belongs to specific training observations, so it
    /// contributes nothing at a new location.
    pub fn query_noise_variance(&self) -> f64 {
        match self {
            NoiseModel::Uniform(noise) => noise.powi(2),
            NoiseModel::PerPoint(_) => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_noise_adds_to_diagonal() {
        let cov = DMatrix::from_row_slice(2, 2, &[1.0, 0.5, 0.5, 1.0]);
        let noisy = NoiseModel::Uniform(0.1)
            .add_noise_to_kernel(&cov)
            .unwrap();
        assert::close(noisy[(0, 0)], 1.01, 1E-12);
        assert::close(noisy[(1, 1)], 1.01, 1E-12);
        assert::close(noisy[(0, 1)], 0.5, 1E-12);
    }

    #[test]
    fn per_point_noise_must_match_size() {
        let cov = DMatrix::from_row_slice(2, 2, &[1.0, 0.5, 0.5, 1.0]);
        let sigma = DVector::from_column_slice(&[0.1, 0.2, 0.3]);
        let res = NoiseModel::PerPoint(sigma).add_noise_to_kernel(&cov);
        assert!(matches!(res, Err(ProcessError::ShapeMismatch { .. })));
    }

    #[test]
    fn per_point_noise_is_squared() {
        let cov = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 1.0]);
        let sigma = DVector::from_column_slice(&[0.1, 0.2]);
        let noisy = NoiseModel::PerPoint(sigma)
            .add_noise_to_kernel(&cov)
            .unwrap();
        assert::close(noisy[(0, 0)], 1.01, 1E-12);
        assert::close(noisy[(1, 1)], 1.04, 1E-12);
    }

    #[test]
    fn query_noise_variance() {
        assert::close(
            NoiseModel::Uniform(0.2).query_noise_variance(),
            0.04,
            1E-12,
        );
        let sigma = DVector::from_column_slice(&[0.1, 0.2]);
        assert::close(
            NoiseModel::PerPoint(sigma).query_noise_variance(),
            0.0,
            1E-12,
        );
    }
}
