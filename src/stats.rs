//! Descriptive and inferential summaries of metric series.

use anyhow::bail;
use linregress::fit_low_level_regression_model;
use serde::{Deserialize, Serialize};

/// z-score of a two-sided 95% normal interval.
pub const Z_95: f64 = 1.96;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; `0` for a single value.
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl Summary {
    /// `None` for an empty input.
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len();
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };
        Some(Self {
            count: n,
            mean: mean(values),
            median,
            std: sample_variance(values).sqrt(),
            min: sorted[0],
            max: sorted[n - 1],
        })
    }
}

/// Percentage of `values` at or above `threshold`; `0` when empty.
pub fn share_at_least(values: &[f64], threshold: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().filter(|&&v| v >= threshold).count() as f64 / values.len() as f64 * 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub mean: f64,
    pub std_err: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    /// Mean ± 1.96 standard errors. `None` for an empty input.
    pub fn normal_95(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mean = mean(values);
        let std_err = sample_variance(values).sqrt() / (values.len() as f64).sqrt();
        Some(Self {
            mean,
            std_err,
            lower: mean - Z_95 * std_err,
            upper: mean + Z_95 * std_err,
        })
    }
}

/// Ordinary least squares line through `(x, y)`, typically a metric against
/// season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub slope_std_err: f64,
    pub p_value: f64,
}

impl LinearTrend {
    pub fn fit(x: &[f64], y: &[f64]) -> Result<Self, anyhow::Error> {
        if x.len() != y.len() {
            bail!("x has {} values but y has {}", x.len(), y.len());
        }
        if x.len() < 3 {
            bail!("at least 3 points are needed to fit a trend");
        }

        let data: Vec<f64> = x
            .iter()
            .zip(y)
            .flat_map(|(&x, &y)| [y, 1.0, x])
            .collect();
        let model = fit_low_level_regression_model(&data, x.len(), 3)?;
        Ok(Self {
            slope: model.parameters()[1],
            intercept: model.parameters()[0],
            r_squared: model.rsquared(),
            slope_std_err: model.se()[1],
            p_value: model.p_values()[1],
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// 95% normal interval of the slope.
    pub fn slope_ci95(&self) -> (f64, f64) {
        (
            self.slope - Z_95 * self.slope_std_err,
            self.slope + Z_95 * self.slope_std_err,
        )
    }
}

/// Two-sample Student t-test (equal variances).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TTest {
    /// Positive when `b` has the larger mean.
    pub t: f64,
    pub df: usize,
    /// Two-sided.
    pub p_value: f64,
}

impl TTest {
    /// Fitted as a regression on a group indicator, whose slope t-statistic
    /// is the pooled-variance t.
    pub fn student(a: &[f64], b: &[f64]) -> Result<Self, anyhow::Error> {
        if a.is_empty() || b.is_empty() {
            bail!("both samples must be non-empty");
        }
        let n = a.len() + b.len();
        if n < 3 {
            bail!("at least 3 observations are needed");
        }

        let data: Vec<f64> = a
            .iter()
            .map(|&v| [v, 1.0, 0.0])
            .chain(b.iter().map(|&v| [v, 1.0, 1.0]))
            .flatten()
            .collect();
        let model = fit_low_level_regression_model(&data, n, 3)?;
        let (coef, se) = (model.parameters()[1], model.se()[1]);
        let t = if coef == 0.0 { 0.0 } else { coef / se };
        Ok(Self {
            t,
            df: n - 2,
            p_value: model.p_values()[1],
        })
    }
}

/// Effect size of moving from `a` to `b`: the mean difference over the root
/// mean of the two sample variances. `None` when either sample has fewer than
/// two values or both have zero spread.
pub fn cohens_d(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() < 2 || b.len() < 2 {
        return None;
    }
    let pooled = ((sample_variance(a) + sample_variance(b)) / 2.0).sqrt();
    if pooled == 0.0 {
        return None;
    }
    Some((mean(b) - mean(a)) / pooled)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;

    use super::*;

    const EARLY: [f64; 5] = [93.1, 94.0, 92.7, 93.8, 94.4];
    const LATE: [f64; 6] = [94.2, 95.1, 94.8, 95.6, 94.9, 95.3];

    #[test]
    fn summary_of_velocities() {
        let summary = Summary::of(&EARLY).unwrap();
        assert_eq!(5, summary.count);
        assert_float_absolute_eq!(93.6, summary.mean, 1e-9);
        assert_float_absolute_eq!(93.8, summary.median, 1e-9);
        assert_float_absolute_eq!(0.6892024376045126, summary.std, 1e-9);
        assert_eq!(92.7, summary.min);
        assert_eq!(94.4, summary.max);
        assert!(Summary::of(&[]).is_none());
    }

    #[test]
    fn summary_even_median_and_single_value() {
        assert_float_absolute_eq!(3.5, Summary::of(&[4.0, 1.0, 3.0, 9.0]).unwrap().median);
        let single = Summary::of(&[97.0]).unwrap();
        assert_eq!(0.0, single.std);
    }

    #[test]
    fn share_at_least_is_percentage() {
        assert_float_absolute_eq!(40.0, share_at_least(&EARLY, 94.0));
        assert_eq!(0.0, share_at_least(&[], 95.0));
    }

    #[test]
    fn normal_interval() {
        let ci = ConfidenceInterval::normal_95(&EARLY).unwrap();
        assert_float_absolute_eq!(0.3082207001484495, ci.std_err, 1e-9);
        assert_float_absolute_eq!(93.6 - 1.96 * 0.3082207001484495, ci.lower, 1e-9);
        assert_float_absolute_eq!(93.6 + 1.96 * 0.3082207001484495, ci.upper, 1e-9);
    }

    #[test]
    fn trend_fit() {
        let trend = LinearTrend::fit(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.1, 3.9, 6.2, 7.8, 10.1]).unwrap();
        assert_float_absolute_eq!(1.99, trend.slope, 1e-9);
        assert_float_absolute_eq!(0.05, trend.intercept, 1e-9);
        assert_float_absolute_eq!(0.9973053289009771, trend.r_squared, 1e-9);
        assert_float_absolute_eq!(0.059721576223896594, trend.slope_std_err, 1e-9);
        assert_float_absolute_eq!(5.9415e-5, trend.p_value, 1e-6);
        assert_float_absolute_eq!(0.05 + 1.99 * 6.0, trend.predict(6.0), 1e-9);
        let (lo, hi) = trend.slope_ci95();
        assert!(lo < 1.99 && 1.99 < hi);
    }

    #[test]
    fn trend_rejects_short_or_ragged_input() {
        assert!(LinearTrend::fit(&[2015.0, 2016.0], &[93.0, 93.2]).is_err());
        assert!(LinearTrend::fit(&[2015.0, 2016.0, 2017.0], &[93.0, 93.2]).is_err());
    }

    #[test]
    fn student_t_test() {
        let test = TTest::student(&EARLY, &LATE).unwrap();
        assert_eq!(9, test.df);
        assert_float_absolute_eq!(3.925375015761514, test.t, 1e-6);
        assert_float_absolute_eq!(0.0034824, test.p_value, 1e-5);
    }

    #[test]
    fn identical_samples_have_zero_t() {
        let test = TTest::student(&EARLY, &EARLY).unwrap();
        assert_float_absolute_eq!(0.0, test.t, 1e-9);
        assert_float_absolute_eq!(1.0, test.p_value, 1e-6);
        assert!(TTest::student(&[], &EARLY).is_err());
    }

    #[test]
    fn effect_size() {
        assert_float_absolute_eq!(2.3305046601513433, cohens_d(&EARLY, &LATE).unwrap(), 1e-9);
        assert!(cohens_d(&[1.0], &LATE).is_none());
        assert!(cohens_d(&[1.0, 1.0], &[2.0, 2.0]).is_none());
    }
}
