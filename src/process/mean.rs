use nalgebra::{dvector, DMatrix, DVector};

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Feature basis for the mean offset of the regression.
///
/// The regression models its output as a kernel-driven deviation around a
/// parametric mean `φ(x)ᵀw`, where `w` carries the Normal half of the
/// Normal-Inverse-Gamma hyperprior. Implementors supply the feature map
/// `φ`; the engine learns `w`.
pub trait MeanFunction: std::fmt::Debug + Clone + PartialEq {
    /// Number of features in the basis (the length of `w`)
    fn n_features(&self) -> usize;

    /// Feature vector φ(x) for a single location
    fn features(&self, x: &DVector<f64>) -> DVector<f64>;

    /// Design matrix over the rows of `xs`: one feature vector per row
    fn design_matrix(&self, xs: &DMatrix<f64>) -> DMatrix<f64> {
        let mut phi = DMatrix::zeros(xs.nrows(), self.n_features());
        for i in 0..xs.nrows() {
            let f = self.features(&xs.row(i).transpose());
            phi.row_mut(i).copy_from(&f.transpose());
        }
        phi
    }
}

/// A constant mean offset: φ(x) = [1]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct ConstantMean;

impl MeanFunction for ConstantMean {
    fn n_features(&self) -> usize {
        1
    }

    fn features(&self, _x: &DVector<f64>) -> DVector<f64> {
        dvector![1.0]
    }
}

/// An affine mean: φ(x) = [1, x₁, …, x_d]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct LinearMean {
    input_dim: usize,
}

impl LinearMean {
    /// Create an affine basis over inputs with `input_dim` coordinates
    #[must_use]
    pub fn new(input_dim: usize) -> Self {
        Self { input_dim }
    }
}

impl MeanFunction for LinearMean {
    fn n_features(&self) -> usize {
        self.input_dim + 1
    }

    fn features(&self, x: &DVector<f64>) -> DVector<f64> {
        debug_assert_eq!(x.len(), self.input_dim);
        let mut f = DVector::zeros(self.input_dim + 1);
        f[0] = 1.0;
        f.rows_mut(1, self.input_dim).copy_from(x);
        f
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_design_matrix_is_ones() {
        let xs = DMatrix::from_column_slice(3, 2, &[0.0; 6]);
        let phi = ConstantMean.design_matrix(&xs);
        assert_eq!(phi, DMatrix::from_element(3, 1, 1.0));
    }

    #[test]
    fn linear_features_prepend_intercept() {
        let mean = LinearMean::new(2);
        assert_eq!(mean.n_features(), 3);
        let f = mean.features(&DVector::from_column_slice(&[0.3, 0.7]));
        assert_eq!(f, DVector::from_column_slice(&[1.0, 0.3, 0.7]));
    }

    #[test]
    fn linear_design_matrix() {
        let mean = LinearMean::new(1);
        let xs = DMatrix::from_column_slice(3, 1, &[0.1, 0.2, 0.3]);
        let phi = mean.design_matrix(&xs);
        let expected = DMatrix::from_row_slice(
            3,
            2,
            &[1.0, 0.1, 1.0, 0.2, 1.0, 0.3],
        );
        assert_eq!(phi, expected);
    }
}
