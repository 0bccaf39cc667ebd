//! Differencing and integration of ordered series

/// Apply `order` rounds of first differencing.
///
/// Returns an empty vector once the series runs out of values to difference.
pub fn difference(series: &[f64], order: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..order {
        if result.len() <= 1 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Undo `order` rounds of differencing for values that continue `history`.
///
/// `differenced` holds future values on the differenced scale. Each level is
/// rebuilt by a cumulative sum anchored at the last value of the history at
/// that level, starting from the deepest one.
pub fn integrate(differenced: &[f64], history: &[f64], order: usize) -> Vec<f64> {
    let mut result = differenced.to_vec();

    for level in (0..order).rev() {
        let anchor = difference(history, level).last().copied().unwrap_or(0.0);
        let mut running = anchor;
        for value in result.iter_mut() {
            running += *value;
            *value = running;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_difference() {
        let diffs = difference(&[100.0, 110.0, 105.0, 120.0], 1);
        assert_eq!(diffs, vec![10.0, -5.0, 15.0]);
    }

    #[test]
    fn test_second_difference_of_quadratic_is_constant() {
        let squares: Vec<f64> = (1..=6).map(|x| (x * x) as f64).collect();
        let diffs = difference(&squares, 2);
        assert!(diffs.iter().all(|d| (*d - 2.0).abs() < 1e-12));
    }

    #[test]
    fn test_difference_of_short_series_is_empty() {
        assert!(difference(&[5.0], 1).is_empty());
        assert_eq!(difference(&[5.0], 0), vec![5.0]);
    }

    #[test]
    fn test_integrate_first_order() {
        let history = [100.0, 110.0, 105.0];
        let restored = integrate(&[5.0, 5.0], &history, 1);
        assert_eq!(restored, vec![110.0, 115.0]);
    }

    #[test]
    fn test_integrate_second_order_continues_quadratic() {
        let squares: Vec<f64> = (1..=5).map(|x| (x * x) as f64).collect();
        // 6^2 and 7^2 continue with a constant second difference of 2
        let restored = integrate(&[2.0, 2.0], &squares, 2);
        assert_relative_eq!(restored[0], 36.0);
        assert_relative_eq!(restored[1], 49.0);
    }

    #[test]
    fn test_integrate_order_zero_is_identity() {
        assert_eq!(integrate(&[1.0, 2.0], &[9.0], 0), vec![1.0, 2.0]);
    }
}
