use nalgebra::base::constraint::{
    SameNumberOfColumns, SameNumberOfRows, ShapeConstraint,
};
use nalgebra::base::storage::Storage;
use nalgebra::{Dim, Matrix};

/// Squared Euclidean distance between `m1` and `m2` after dividing each
/// coordinate by `scale`.
#[inline]
pub fn e2_norm<R1, C1, S1, R2, C2, S2>(
    m1: &Matrix<f64, R1, C1, S1>,
    m2: &Matrix<f64, R2, C2, S2>,
    scale: f64,
) -> f64
where
    R1: Dim,
    C1: Dim,
    S1: Storage<f64, R1, C1>,
    R2: Dim,
    C2: Dim,
    S2: Storage<f64, R2, C2>,
    ShapeConstraint: SameNumberOfRows<R1, R2> + SameNumberOfColumns<C1, C2>,
{
    m1.zip_fold(m2, 0.0, |acc, a, b| {
        let diff = (a - b) / scale;
        diff.mul_add(diff, acc)
    })
}
