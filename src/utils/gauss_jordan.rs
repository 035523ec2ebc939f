//! Gauss-Jordan elimination with explicit pivoting and backsubstitution.
//!
//! [`solve`] reduces `A` to unit upper-triangular form while applying the
//! same row operations to every right-hand side in `B`, then backsubstitutes.
//! Pivots are chosen among the unprocessed part of the current row and the
//! current column. Row exchanges are applied to `B` immediately; column
//! exchanges permute the unknowns and are undone on the solution at the end.

use ndarray::Array2;

use crate::error::{LmmcError, Result};

/// Solve `A·X = B` in place.
///
/// On success `B` holds `X` and `A` holds the reduced upper-triangular
/// factor. On a singular pivot both matrices are left partially reduced.
///
/// # Arguments
///
/// * `a` - The `n × n` coefficient matrix
/// * `b` - The `n × m` right-hand sides, one per column
///
/// # Returns
///
/// * `Err(LmmcError::SingularMatrix)` if no non-zero pivot exists at some stage
pub fn solve(a: &mut Array2<f64>, b: &mut Array2<f64>) -> Result<()> {
    let n = a.nrows();
    if a.ncols() != n {
        return Err(LmmcError::DimensionMismatch(format!(
            "coefficient matrix must be square, got {}x{}",
            n,
            a.ncols()
        )));
    }
    if b.nrows() != n {
        return Err(LmmcError::DimensionMismatch(format!(
            "right-hand side has {} rows, expected {}",
            b.nrows(),
            n
        )));
    }
    let m = b.ncols();

    // perm[k] is the unknown currently stored at column k
    let mut perm: Vec<usize> = (0..n).collect();

    for k in 0..n {
        let (prow, pcol) = find_pivot(a, k).ok_or(LmmcError::SingularMatrix)?;

        if prow != k {
            swap_rows(a, k, prow);
            swap_rows(b, k, prow);
        } else if pcol != k {
            swap_cols(a, k, pcol);
            perm.swap(k, pcol);
        }

        let pivot = a[[k, k]];
        for j in k..n {
            a[[k, j]] /= pivot;
        }
        for j in 0..m {
            b[[k, j]] /= pivot;
        }

        for i in k + 1..n {
            let factor = a[[i, k]];
            if factor == 0.0 {
                continue;
            }
            for j in k..n {
                a[[i, j]] -= factor * a[[k, j]];
            }
            for j in 0..m {
                b[[i, j]] -= factor * b[[k, j]];
            }
        }
    }

    for c in 0..m {
        for i in (0..n).rev() {
            let mut sum = 0.0;
            for j in i + 1..n {
                sum += a[[i, j]] * b[[j, c]];
            }
            b[[i, c]] -= sum;
        }
    }

    if perm.iter().enumerate().any(|(k, &p)| k != p) {
        let solved = b.clone();
        for (k, &p) in perm.iter().enumerate() {
            b.row_mut(p).assign(&solved.row(k));
        }
    }

    Ok(())
}

/// Compute the inverse of a square matrix by solving against the identity.
pub fn invert(a: &Array2<f64>) -> Result<Array2<f64>> {
    let mut work = a.clone();
    let mut inverse = Array2::eye(a.nrows());
    solve(&mut work, &mut inverse)?;
    Ok(inverse)
}

/// Largest-magnitude candidate in row `k` right of the diagonal, then in
/// column `k` below it. Ties keep the earlier candidate.
fn find_pivot(a: &Array2<f64>, k: usize) -> Option<(usize, usize)> {
    let n = a.nrows();
    let mut best = 0.0;
    let mut at = None;

    for j in k..n {
        let v = a[[k, j]].abs();
        if v > best {
            best = v;
            at = Some((k, j));
        }
    }
    for i in k + 1..n {
        let v = a[[i, k]].abs();
        if v > best {
            best = v;
            at = Some((i, k));
        }
    }

    at
}

fn swap_rows(m: &mut Array2<f64>, r1: usize, r2: usize) {
    for c in 0..m.ncols() {
        m.swap([r1, c], [r2, c]);
    }
}

fn swap_cols(m: &mut Array2<f64>, c1: usize, c2: usize) {
    for r in 0..m.nrows() {
        m.swap([r, c1], [r, c2]);
    }
}
