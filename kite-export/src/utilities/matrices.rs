use ndarray::ArrayView2;
use num_complex::Complex;

/// Tests a complex matrix for hermiticity, elements are compared to their adjoint partner with an
/// absolute tolerance of `100 * f64::EPSILON`
pub(crate) fn is_hermitian(matrix: ArrayView2<Complex<f64>>) -> bool {
    matrix.is_square()
        && matrix
            .indexed_iter()
            .all(|((i, j), element)| (element - matrix[[j, i]].conj()).norm() < f64::EPSILON * 100_f64)
}
