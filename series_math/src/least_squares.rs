//! Ordinary least squares through the normal equations

use crate::{MathError, Result, SINGULARITY_TOLERANCE};

/// Coefficients and residuals of a least squares fit
#[derive(Debug, Clone, PartialEq)]
pub struct LeastSquaresFit {
    /// One coefficient per design column
    pub coefficients: Vec<f64>,
    /// `target - design * coefficients`, one per row
    pub residuals: Vec<f64>,
    /// Sum of squared residuals
    pub ssr: f64,
}

/// Fit `target ≈ design * beta` by least squares.
///
/// `design` is row-major: one inner vector per observation, all of the same
/// width. The system is solved with Gaussian elimination and partial
/// pivoting on `X'X`.
pub fn solve_least_squares(design: &[Vec<f64>], target: &[f64]) -> Result<LeastSquaresFit> {
    if design.len() != target.len() {
        return Err(MathError::InvalidInput(format!(
            "Design has {} rows but target has {} values",
            design.len(),
            target.len()
        )));
    }

    let cols = design.first().map(Vec::len).unwrap_or(0);
    if cols == 0 {
        return Err(MathError::InvalidInput(
            "Design matrix has no columns".to_string(),
        ));
    }
    if design.iter().any(|row| row.len() != cols) {
        return Err(MathError::InvalidInput(
            "Design matrix rows have different widths".to_string(),
        ));
    }
    if design.len() < cols {
        return Err(MathError::InsufficientData(format!(
            "{} rows cannot determine {} coefficients",
            design.len(),
            cols
        )));
    }

    // Augmented normal equations [X'X | X'y]
    let mut system = vec![vec![0.0; cols + 1]; cols];
    for (row, &y) in design.iter().zip(target) {
        for i in 0..cols {
            for j in 0..cols {
                system[i][j] += row[i] * row[j];
            }
            system[i][cols] += row[i] * y;
        }
    }

    let scale = (0..cols)
        .map(|i| system[i][i].abs())
        .fold(0.0_f64, f64::max);
    if scale == 0.0 || !scale.is_finite() {
        return Err(MathError::Singular(
            "Design matrix is zero or non-finite".to_string(),
        ));
    }

    for pivot in 0..cols {
        let best = (pivot..cols)
            .max_by(|&a, &b| {
                system[a][pivot]
                    .abs()
                    .total_cmp(&system[b][pivot].abs())
            })
            .unwrap_or(pivot);
        if system[best][pivot].abs() < SINGULARITY_TOLERANCE * scale {
            return Err(MathError::Singular(format!(
                "Normal equations are rank deficient at column {}",
                pivot
            )));
        }
        system.swap(pivot, best);

        for r in (pivot + 1)..cols {
            let factor = system[r][pivot] / system[pivot][pivot];
            if factor == 0.0 {
                continue;
            }
            for c in pivot..=cols {
                system[r][c] -= factor * system[pivot][c];
            }
        }
    }

    let mut coefficients = vec![0.0; cols];
    for i in (0..cols).rev() {
        let tail: f64 = ((i + 1)..cols)
            .map(|j| system[i][j] * coefficients[j])
            .sum();
        coefficients[i] = (system[i][cols] - tail) / system[i][i];
    }

    let residuals: Vec<f64> = design
        .iter()
        .zip(target)
        .map(|(row, &y)| {
            let fitted: f64 = row.iter().zip(&coefficients).map(|(x, b)| x * b).sum();
            y - fitted
        })
        .collect();
    let ssr = residuals.iter().map(|e| e * e).sum();

    Ok(LeastSquaresFit {
        coefficients,
        residuals,
        ssr,
    })
}
