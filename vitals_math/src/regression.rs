//! Least-squares fitting
//!
//! Contains:
//! - Ordinary least-squares line fit over positional indices
//! - A small dense least-squares solver used for autoregressive fits

use crate::{MathError, Result};

/// Straight line `y = intercept + slope * x` fitted over `x = 0..len-1`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    slope: f64,
    intercept: f64,
    len: usize,
}

impl LinearFit {
    /// Fit a line to `values` indexed by position.
    ///
    /// A single value yields a flat line through that value.
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(MathError::InsufficientData(
                "Cannot fit a line to an empty series".to_string(),
            ));
        }

        let len = values.len();
        if len == 1 {
            return Ok(Self {
                slope: 0.0,
                intercept: values[0],
                len,
            });
        }

        let n = len as f64;
        let x_mean = (n - 1.0) / 2.0;
        let y_mean = values.iter().sum::<f64>() / n;

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (i, &y) in values.iter().enumerate() {
            let dx = i as f64 - x_mean;
            numerator += dx * (y - y_mean);
            denominator += dx * dx;
        }

        let slope = numerator / denominator;
        let intercept = y_mean - slope * x_mean;

        Ok(Self {
            slope,
            intercept,
            len,
        })
    }

    /// Slope per index step
    pub fn slope(&self) -> f64 {
        self.slope
    }

    /// Value of the line at `x = 0`
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Number of points the line was fitted to
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; a fit needs at least one point
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Evaluate the line at position `x`
    pub fn value_at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// In-sample fitted values for positions `0..len`
    pub fn fitted(&self) -> Vec<f64> {
        (0..self.len).map(|i| self.value_at(i as f64)).collect()
    }

    /// Values for positions `len..len + horizon`
    pub fn project(&self, horizon: usize) -> Vec<f64> {
        (self.len..self.len + horizon)
            .map(|i| self.value_at(i as f64))
            .collect()
    }

    /// Coefficient of determination against the fitted `values`.
    ///
    /// Returns `None` when the values have no variance.
    pub fn r_squared(&self, values: &[f64]) -> Option<f64> {
        if values.len() != self.len || values.is_empty() {
            return None;
        }
        let y_mean = values.iter().sum::<f64>() / values.len() as f64;

        let mut ss_total = 0.0;
        let mut ss_residual = 0.0;
        for (i, &y) in values.iter().enumerate() {
            ss_total += (y - y_mean).powi(2);
            ss_residual += (y - self.value_at(i as f64)).powi(2);
        }

        if ss_total.abs() < 1e-10 {
            return None;
        }
        Some(1.0 - ss_residual / ss_total)
    }
}

/// Solve `min ||X b - y||²` through the normal equations.
///
/// `rows` holds the design matrix row by row; every row must have the same
/// number of columns. Fails with [`MathError::CalculationError`] when the
/// normal matrix is singular.
pub fn solve_least_squares(rows: &[Vec<f64>], targets: &[f64]) -> Result<Vec<f64>> {
    if rows.is_empty() || rows.len() != targets.len() {
        return Err(MathError::InvalidInput(format!(
            "Design matrix has {} rows but {} targets were given",
            rows.len(),
            targets.len()
        )));
    }

    let k = rows[0].len();
    if k == 0 || rows.iter().any(|row| row.len() != k) {
        return Err(MathError::InvalidInput(
            "Design matrix rows must share a non-zero column count".to_string(),
        ));
    }
    if rows.len() < k {
        return Err(MathError::InsufficientData(format!(
            "Need at least {} rows to fit {} coefficients",
            k, k
        )));
    }

    // Augmented normal system [XᵀX | Xᵀy]
    let mut system = vec![vec![0.0; k + 1]; k];
    for (row, &y) in rows.iter().zip(targets) {
        for i in 0..k {
            for j in 0..k {
                system[i][j] += row[i] * row[j];
            }
            system[i][k] += row[i] * y;
        }
    }

    let scale = system
        .iter()
        .flat_map(|r| r[..k].iter())
        .fold(1.0_f64, |acc, v| acc.max(v.abs()));
    let tolerance = 1e-10 * scale;

    for col in 0..k {
        let pivot = (col..k)
            .max_by(|&a, &b| system[a][col].abs().total_cmp(&system[b][col].abs()))
            .unwrap_or(col);
        if system[pivot][col].abs() < tolerance {
            return Err(MathError::CalculationError(
                "Normal equations are singular".to_string(),
            ));
        }
        system.swap(col, pivot);

        for r in col + 1..k {
            let factor = system[r][col] / system[col][col];
            for c in col..=k {
                system[r][c] -= factor * system[col][c];
            }
        }
    }

    let mut coefficients = vec![0.0; k];
    for i in (0..k).rev() {
        let tail: f64 = (i + 1..k).map(|j| system[i][j] * coefficients[j]).sum();
        coefficients[i] = (system[i][k] - tail) / system[i][i];
    }

    Ok(coefficients)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_fit_perfect_line() {
        let fit = LinearFit::fit(&[10.0, 20.0, 30.0]).unwrap();

        assert_relative_eq!(fit.slope(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(fit.intercept(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(fit.project(1)[0], 40.0, epsilon = 1e-9);
        assert!(fit.r_squared(&[10.0, 20.0, 30.0]).unwrap() > 0.999);
    }

    #[test]
    fn test_linear_fit_single_point_is_flat() {
        let fit = LinearFit::fit(&[72.5]).unwrap();

        assert_eq!(fit.slope(), 0.0);
        assert_eq!(fit.project(3), vec![72.5, 72.5, 72.5]);
    }

    #[test]
    fn test_linear_fit_empty_fails() {
        assert!(matches!(
            LinearFit::fit(&[]),
            Err(MathError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_r_squared_without_variance() {
        let values = [5.0, 5.0, 5.0];
        let fit = LinearFit::fit(&values).unwrap();
        assert!(fit.r_squared(&values).is_none());
    }

    #[test]
    fn test_least_squares_recovers_plane() {
        // y = 1 + 2a - b
        let rows = vec![
            vec![1.0, 0.0, 0.0],
            vec![1.0, 1.0, 0.0],
            vec![1.0, 0.0, 1.0],
            vec![1.0, 2.0, 3.0],
        ];
        let targets = [1.0, 3.0, 0.0, 2.0];

        let beta = solve_least_squares(&rows, &targets).unwrap();
        assert_relative_eq!(beta[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(beta[1], 2.0, epsilon = 1e-9);
        assert_relative_eq!(beta[2], -1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_least_squares_singular() {
        // Second column duplicates the first
        let rows = vec![vec![1.0, 1.0], vec![1.0, 1.0], vec![1.0, 1.0]];
        let result = solve_least_squares(&rows, &[1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(MathError::CalculationError(_))));
    }

    #[test]
    fn test_least_squares_shape_mismatch() {
        let rows = vec![vec![1.0, 2.0], vec![1.0]];
        assert!(solve_least_squares(&rows, &[1.0, 2.0]).is_err());
        assert!(solve_least_squares(&[], &[]).is_err());
    }
}
