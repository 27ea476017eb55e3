//! Ordinary least squares over timestamped measurements
//!
//! Timestamps are epoch milliseconds. Fitting directly on those magnitudes
//! loses precision in the sums of squares, so time is rebased to days since
//! the earliest point before any sum is taken. The resulting slope is
//! converted back to value units per millisecond.

use crate::{MathError, Result, MS_PER_DAY, MS_PER_WEEK};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A measurement that can be placed on a time axis
pub trait TimedValue {
    /// Epoch milliseconds of the measurement
    fn timestamp(&self) -> i64;

    /// Measured value
    fn value(&self) -> f64;
}

impl TimedValue for (i64, f64) {
    fn timestamp(&self) -> i64 {
        self.0
    }

    fn value(&self) -> f64 {
        self.1
    }
}

impl<T: TimedValue + ?Sized> TimedValue for &T {
    fn timestamp(&self) -> i64 {
        (**self).timestamp()
    }

    fn value(&self) -> f64 {
        (**self).value()
    }
}

/// A fitted line `value = intercept + slope * (t - reference_timestamp)`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegressionResult {
    /// Value units per millisecond
    pub slope: f64,
    /// Value at `reference_timestamp`
    pub intercept: f64,
    /// Epoch milliseconds of the earliest fitted point
    pub reference_timestamp: i64,
}

impl RegressionResult {
    /// Sentinel returned by [`fit`] when no line can be fitted.
    ///
    /// A genuine fit can also have a zero slope, so callers decide whether a
    /// trend exists from the sample size rather than by comparing against
    /// this value.
    pub const DEGENERATE: Self = Self {
        slope: 0.0,
        intercept: 0.0,
        reference_timestamp: 0,
    };

    /// Evaluate the fitted line at an epoch-millisecond timestamp
    pub fn value_at(&self, timestamp: i64) -> f64 {
        self.intercept + self.slope * elapsed_ms(self.reference_timestamp, timestamp)
    }

    /// Slope expressed in value units per day
    pub fn slope_per_day(&self) -> f64 {
        self.slope * MS_PER_DAY as f64
    }

    /// Slope expressed in value units per week
    pub fn slope_per_week(&self) -> f64 {
        self.slope * MS_PER_WEEK as f64
    }

    /// Coefficient of determination of this line over `points`
    pub fn r_squared<P: TimedValue>(&self, points: &[P]) -> Result<f64> {
        if points.len() < 2 {
            return Err(MathError::InsufficientData(
                "Not enough data to calculate R-squared. Need at least 2 points.".to_string(),
            ));
        }

        let n = points.len() as f64;
        let y_mean = points.iter().map(|p| p.value()).sum::<f64>() / n;

        let mut ss_total = 0.0;
        let mut ss_residual = 0.0;
        for point in points {
            let y = point.value();
            ss_total += (y - y_mean).powi(2);
            ss_residual += (y - self.value_at(point.timestamp())).powi(2);
        }

        if ss_total.abs() < 1e-10 {
            return Err(MathError::CalculationError(
                "Cannot calculate R-squared: total sum of squares is too small".to_string(),
            ));
        }

        Ok(1.0 - (ss_residual / ss_total))
    }
}

/// Milliseconds from `from` to `to`, exact for any pair of timestamps
fn elapsed_ms(from: i64, to: i64) -> f64 {
    (i128::from(to) - i128::from(from)) as f64
}

/// Fit a least-squares line, reporting why when no line exists.
///
/// Points may arrive in any order; they are sorted by timestamp (then value)
/// before summing, so every permutation of the same sample produces the same
/// result bit for bit.
pub fn try_fit<P: TimedValue>(points: &[P]) -> Result<RegressionResult> {
    if points.len() < 2 {
        return Err(MathError::InsufficientData(format!(
            "Need at least 2 points for a trend, got {}",
            points.len()
        )));
    }

    let mut samples: Vec<(i64, f64)> = points
        .iter()
        .map(|p| (p.timestamp(), p.value()))
        .collect();

    if let Some((ts, v)) = samples.iter().find(|(_, v)| !v.is_finite()) {
        return Err(MathError::InvalidInput(format!(
            "Non-finite value {} at timestamp {}",
            v, ts
        )));
    }

    samples.sort_by(|a, b| match a.0.cmp(&b.0) {
        Ordering::Equal => a.1.total_cmp(&b.1),
        other => other,
    });

    let reference_timestamp = samples[0].0;
    let n = samples.len() as f64;

    let mut sum_t = 0.0;
    let mut sum_v = 0.0;
    let mut sum_tv = 0.0;
    let mut sum_tt = 0.0;
    for &(ts, v) in &samples {
        let t = elapsed_ms(reference_timestamp, ts) / MS_PER_DAY as f64;
        sum_t += t;
        sum_v += v;
        sum_tv += t * v;
        sum_tt += t * t;
    }

    let denominator = n * sum_tt - sum_t * sum_t;
    if denominator <= 0.0 || !denominator.is_finite() {
        return Err(MathError::CalculationError(
            "Cannot calculate slope: all points share one timestamp".to_string(),
        ));
    }

    let slope_days = (n * sum_tv - sum_t * sum_v) / denominator;
    let intercept = (sum_v - slope_days * sum_t) / n;

    if !slope_days.is_finite() || !intercept.is_finite() {
        return Err(MathError::CalculationError(format!(
            "Fit produced non-finite parameters (slope {}, intercept {})",
            slope_days, intercept
        )));
    }

    Ok(RegressionResult {
        slope: slope_days / MS_PER_DAY as f64,
        intercept,
        reference_timestamp,
    })
}

/// Fit a least-squares line, returning [`RegressionResult::DEGENERATE`] when
/// the sample cannot support one.
pub fn fit<P: TimedValue>(points: &[P]) -> RegressionResult {
    match try_fit(points) {
        Ok(result) => result,
        Err(err) => {
            tracing::trace!(points = points.len(), reason = %err, "degenerate regression");
            RegressionResult::DEGENERATE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const T0: i64 = 1_704_067_200_000; // 2024-01-01T00:00:00Z

    fn line(a: f64, b_per_day: f64, days: &[i64]) -> Vec<(i64, f64)> {
        days.iter()
            .map(|&d| (T0 + d * MS_PER_DAY, a + b_per_day * d as f64))
            .collect()
    }

    #[test]
    fn test_recovers_exact_line() {
        let points = line(200.0, -0.25, &[0, 3, 7, 12, 30, 95, 365]);
        let result = fit(&points);

        assert_eq!(result.reference_timestamp, T0);
        assert_relative_eq!(result.intercept, 200.0, max_relative = 1e-9);
        assert_relative_eq!(result.slope_per_day(), -0.25, max_relative = 1e-9);
        assert_relative_eq!(
            result.value_at(T0 + 400 * MS_PER_DAY),
            100.0,
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_reference_is_earliest_point() {
        let mut points = line(80.0, 0.1, &[5, 10, 20]);
        points.reverse();
        let result = fit(&points);

        assert_eq!(result.reference_timestamp, T0 + 5 * MS_PER_DAY);
        assert_relative_eq!(result.intercept, 80.5, max_relative = 1e-9);
    }

    #[test]
    fn test_order_independent() {
        let points = vec![
            (T0, 200.0),
            (T0 + 2 * MS_PER_DAY, 199.1),
            (T0 + 2 * MS_PER_DAY, 198.7),
            (T0 + 9 * MS_PER_DAY, 197.2),
            (T0 + 15 * MS_PER_DAY, 196.9),
        ];
        let mut reordered = points.clone();
        reordered.swap(0, 4);
        reordered.swap(1, 2);

        assert_eq!(fit(&points), fit(&reordered));
    }

    #[test]
    fn test_degenerate_inputs() {
        let empty: Vec<(i64, f64)> = Vec::new();
        assert_eq!(fit(&empty), RegressionResult::DEGENERATE);
        assert_eq!(fit(&[(T0, 180.0)]), RegressionResult::DEGENERATE);

        let same_day = [(T0, 180.0), (T0, 181.0), (T0, 179.5)];
        let result = fit(&same_day);
        assert_eq!(result, RegressionResult::DEGENERATE);
        assert!(!result.slope.is_nan());

        assert!(matches!(
            try_fit(&same_day),
            Err(MathError::CalculationError(_))
        ));
        assert!(matches!(
            try_fit(&[(T0, 180.0)]),
            Err(MathError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let points = [(T0, 180.0), (T0 + MS_PER_DAY, f64::NAN)];
        assert!(matches!(try_fit(&points), Err(MathError::InvalidInput(_))));
        assert_eq!(fit(&points), RegressionResult::DEGENERATE);
    }

    #[test]
    fn test_flat_series_has_zero_slope() {
        let points = line(150.0, 0.0, &[0, 1, 2, 3]);
        let result = try_fit(&points).unwrap();
        assert_eq!(result.slope, 0.0);
        assert_relative_eq!(result.intercept, 150.0);
    }

    #[test]
    fn test_r_squared() {
        let exact = line(10.0, 2.0, &[0, 1, 2, 3]);
        let result = fit(&exact);
        assert!(result.r_squared(&exact).unwrap() > 0.999);

        let noisy = vec![
            (T0, 10.0),
            (T0 + MS_PER_DAY, 13.0),
            (T0 + 2 * MS_PER_DAY, 13.0),
            (T0 + 3 * MS_PER_DAY, 17.0),
        ];
        let r2 = fit(&noisy).r_squared(&noisy).unwrap();
        assert!(r2 > 0.8 && r2 < 1.0);

        let flat = line(5.0, 0.0, &[0, 1]);
        assert!(fit(&flat).r_squared(&flat).is_err());
        assert!(result.r_squared(&exact[..1]).is_err());
    }

    #[test]
    fn test_slope_unit_conversions() {
        let result = RegressionResult {
            slope: -1.0 / MS_PER_DAY as f64,
            intercept: 0.0,
            reference_timestamp: 0,
        };
        assert_relative_eq!(result.slope_per_day(), -1.0);
        assert_relative_eq!(result.slope_per_week(), -7.0);
    }
}
