//! Flat row-major matrix and vector helpers.
//!
//! Everything in this workspace works on plain `&[f64]` slices; a square
//! transform `Q` of dimension `d` is a `d*d` row-major slice. These helpers
//! are the minimum the loss gradients need, not general linear algebra.

/// Dot product of two equal-length vectors.
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "dimension mismatch in dot");
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Euclidean norm.
#[inline]
pub fn l2_norm(v: &[f64]) -> f64 {
    dot(v, v).sqrt()
}

/// `m · x` for a row-major `d×d` matrix `m`.
pub fn matvec(m: &[f64], d: usize, x: &[f64]) -> Vec<f64> {
    debug_assert_eq!(m.len(), d * d, "matrix is not d*d");
    debug_assert_eq!(x.len(), d, "vector is not d");
    (0..d).map(|r| dot(&m[r * d..(r + 1) * d], x)).collect()
}

/// `a · b` for two row-major `d×d` matrices.
pub fn matmul(a: &[f64], b: &[f64], d: usize) -> Vec<f64> {
    debug_assert_eq!(a.len(), d * d);
    debug_assert_eq!(b.len(), d * d);
    let mut out = vec![0.0; d * d];
    for r in 0..d {
        for k in 0..d {
            let ark = a[r * d + k];
            if ark == 0.0 {
                continue;
            }
            for c in 0..d {
                out[r * d + c] += ark * b[k * d + c];
            }
        }
    }
    out
}

/// Symmetrized outer product `x·yᵀ + y·xᵀ` as a row-major `d×d` matrix.
pub fn outer_sym(x: &[f64], y: &[f64]) -> Vec<f64> {
    debug_assert_eq!(x.len(), y.len());
    let d = x.len();
    let mut out = vec![0.0; d * d];
    for r in 0..d {
        for c in 0..d {
            out[r * d + c] = x[r] * y[c] + y[r] * x[c];
        }
    }
    out
}

/// Row-major identity matrix of dimension `d`.
pub fn identity(d: usize) -> Vec<f64> {
    let mut m = vec![0.0; d * d];
    for i in 0..d {
        m[i * d + i] = 1.0;
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matvec_identity_is_noop() {
        let m = identity(3);
        let x = vec![1.0, -2.0, 3.0];
        assert_eq!(matvec(&m, 3, &x), x);
    }

    #[test]
    fn matmul_against_hand_computed() {
        // [1 2; 3 4] · [0 1; 1 0] = [2 1; 4 3]
        let a = vec![1.0, 2.0, 3.0, 4.0];
        let b = vec![0.0, 1.0, 1.0, 0.0];
        assert_eq!(matmul(&a, &b, 2), vec![2.0, 1.0, 4.0, 3.0]);
    }

    #[test]
    fn outer_sym_is_symmetric() {
        let x = vec![1.0, 2.0, 3.0];
        let y = vec![-1.0, 0.5, 2.0];
        let m = outer_sym(&x, &y);
        for r in 0..3 {
            for c in 0..3 {
                assert!((m[r * 3 + c] - m[c * 3 + r]).abs() < 1e-15);
            }
        }
    }
}
