use super::{e2_norm, Kernel, KernelError};
use nalgebra::base::constraint::{SameNumberOfColumns, ShapeConstraint};
use nalgebra::base::storage::Storage;
use nalgebra::{dvector, DMatrix, DVector, Dim, Matrix};
use std::f64;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Matérn kernel with smoothness fixed at ν = 5/2, in closed form:
///
/// ```math
///     K(\mathbf{x}, \mathbf{x'}) = \left(1 + \sqrt{5} \frac{d}{l}
///         + \frac{5 d^2}{3 l^2}\right)
///         \exp\left(-\sqrt{5} \frac{d}{l}\right)
/// ```
///
/// where `d` is the Euclidean distance between the inputs. Sample paths are
/// twice differentiable, which makes this the usual default covariance for
/// surrogate models of smooth-but-not-too-smooth objectives.
///
/// # Parameters
/// * `length_scale` - Length scale.
///
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct Matern52Kernel {
    length_scale: f64,
}

impl Matern52Kernel {
    /// Create a new Matérn 5/2 kernel with the given length scale
    pub fn new(length_scale: f64) -> Result<Self, KernelError> {
        if length_scale <= 0.0 {
            Err(KernelError::ParameterOutOfBounds {
                name: "length_scale".to_string(),
                given: length_scale,
                bounds: (0.0, f64::INFINITY),
            })
        } else {
            Ok(Self { length_scale })
        }
    }

    /// Create a new `Matern52Kernel` without checking parameters
    #[must_use]
    pub fn new_unchecked(length_scale: f64) -> Self {
        Self { length_scale }
    }

    #[inline]
    fn corr(scaled_e2: f64) -> f64 {
        let t = (5.0 * scaled_e2).sqrt();
        (t * t / 3.0 + t + 1.0) * (-t).exp()
    }
}

impl Default for Matern52Kernel {
    fn default() -> Self {
        Self { length_scale: 1.0 }
    }
}

impl Kernel for Matern52Kernel {
    fn n_parameters(&self) -> usize {
        1
    }

    fn covariance<R1, R2, C1, C2, S1, S2>(
        &self,
        x1: &Matrix<f64, R1, C1, S1>,
        x2: &Matrix<f64, R2, C2, S2>,
    ) -> DMatrix<f64>
    where
        R1: Dim,
        R2: Dim,
        C1: Dim,
        C2: Dim,
        S1: Storage<f64, R1, C1>,
        S2: Storage<f64, R2, C2>,
        ShapeConstraint: SameNumberOfColumns<C1, C2>,
    {
        let m = x1.nrows();
        let n = x2.nrows();

        let mut dm: DMatrix<f64> = DMatrix::zeros(m, n);

        for i in 0..m {
            for j in 0..n {
                let e2 = e2_norm(&x1.row(i), &x2.row(j), self.length_scale);
                dm[(i, j)] = Self::corr(e2);
            }
        }

        dm
    }

    fn is_stationary(&self) -> bool {
        true
    }

    fn diag<R, C, S>(&self, x: &Matrix<f64, R, C, S>) -> DVector<f64>
    where
        R: Dim,
        C: Dim,
        S: Storage<f64, R, C>,
    {
        DVector::repeat(x.nrows(), 1.0)
    }

    fn parameters(&self) -> DVector<f64> {
        dvector![self.length_scale.ln()]
    }

    fn reparameterize(&self, params: &[f64]) -> Result<Self, KernelError> {
        match params {
            [] => Err(KernelError::MissingParameters(1)),
            [value] => Self::new(value.exp()),
            _ => Err(KernelError::ExtraneousParameters(params.len() - 1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matern_simple() {
        let kernel = Matern52Kernel::default();
        assert::close(kernel.parameters()[0], 0.0, 1E-10);
        assert_eq!(
            kernel,
            kernel
                .reparameterize(&[0.0])
                .expect("Should create kernel from params")
        );
        assert!(kernel.is_stationary());
    }

    #[test]
    fn matern_rejects_bad_parameters() {
        assert!(Matern52Kernel::new(0.0).is_err());
        assert!(Matern52Kernel::new(-0.5).is_err());
        assert!(Matern52Kernel::default().reparameterize(&[]).is_err());
        assert!(Matern52Kernel::default()
            .reparameterize(&[0.0, 1.0])
            .is_err());
    }

    #[test]
    fn matern_1d() {
        let xs = DVector::from_column_slice(&[0.0, 1.0]);
        let kernel = Matern52Kernel::default();
        let cov = kernel.covariance(&xs, &xs);

        // (1 + √5 + 5/3) exp(-√5)
        assert::close(cov[(0, 0)], 1.0, 1E-12);
        assert::close(cov[(1, 1)], 1.0, 1E-12);
        assert::close(cov[(0, 1)], 0.523_994_1, 1E-6);
        assert::close(cov[(0, 1)], cov[(1, 0)], 1E-12);
    }

    #[test]
    fn matern_decreases_with_distance() {
        let kernel = Matern52Kernel::new(0.7).unwrap();
        let xs = DVector::from_column_slice(&[0.0, 0.1, 0.5, 2.0, 10.0]);
        let cov = kernel.covariance(&xs, &xs);
        assert!(cov[(0, 1)] > cov[(0, 2)]);
        assert!(cov[(0, 2)] > cov[(0, 3)]);
        assert!(cov[(0, 3)] > cov[(0, 4)]);
        assert!(cov[(0, 4)] > 0.0);
    }

    #[test]
    fn matern_diag_is_unit() {
        let kernel = Matern52Kernel::default();
        let xs = DVector::from_column_slice(&[0.0, 0.3, 0.9]);
        let expected = DVector::from_column_slice(&[1.0, 1.0, 1.0]);
        assert_eq!(kernel.diag(&xs), expected);
    }
}
