//! Dense linear solver for the small calibration blocks.
//!
//! Each block has at most six unknowns; plain Gaussian elimination with
//! partial pivoting solves them.

/// Pivot magnitude, relative to the largest coefficient, below which a
/// matrix is treated as singular.
pub const SINGULARITY_THRESHOLD: f64 = 1e-12;

/// Why a linear system could not be solved.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum SolveError {
    /// No usable pivot was found for `column`.
    #[error("matrix is singular at column {column}")]
    Singular {
        /// Column index (zero-based) without a usable pivot.
        column: usize,
    },

    /// The solution contains NaN or infinity at `index`.
    #[error("solution component {index} is not finite")]
    NonFinite {
        /// Index (zero-based) of the offending unknown.
        index: usize,
    },
}

/// Solve `a x = b` for a square `N x N` system.
// Loop indices are bounded by N for arrays of length N.
#[allow(clippy::indexing_slicing, clippy::needless_range_loop)]
pub fn solve<const N: usize>(mut a: [[f64; N]; N], mut b: [f64; N]) -> Result<[f64; N], SolveError> {
    let scale = a
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if scale <= 0.0 || !scale.is_finite() {
        return Err(SolveError::Singular { column: 0 });
    }
    let threshold = SINGULARITY_THRESHOLD * scale;

    for col in 0..N {
        let mut pivot = col;
        for row in (col + 1)..N {
            if a[row][col].abs() > a[pivot][col].abs() {
                pivot = row;
            }
        }
        if a[pivot][col].abs() <= threshold {
            return Err(SolveError::Singular { column: col });
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..N {
            let factor = a[row][col] / a[col][col];
            if factor.abs() <= 0.0 {
                continue;
            }
            for k in col..N {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0; N];
    for row in (0..N).rev() {
        let mut acc = b[row];
        for k in (row + 1)..N {
            acc -= a[row][k] * x[k];
        }
        x[row] = acc / a[row][row];
    }

    match x.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(SolveError::NonFinite { index }),
        None => Ok(x),
    }
}
