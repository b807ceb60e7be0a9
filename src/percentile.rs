//! Sliding-window gamma scoring: where a year's rainfall total falls in the
//! distribution fitted to the years before it.

use statrs::distribution::{ContinuousCDF, Gamma};

use crate::error::{Error, Result};

/// Variance below this is treated as a degenerate (constant) sample.
const VARIANCE_EPS: f64 = 1e-10;

/// Skewness below this falls back to the two-parameter fit.
const SKEW_EPS: f64 = 1e-6;

/// Score assigned when the fitting window is degenerate. A constant history
/// carries no drought signal either way, so the year is placed at the median
/// rather than aborting the run; all-zero series from zero-capture clusters
/// land here routinely.
pub const DEGENERATE_SCORE: f64 = 0.5;

/// A fitted gamma distribution: shape, location and scale.
#[derive(Debug, Clone, Copy)]
pub struct GammaFit {
    pub shape: f64,
    pub loc: f64,
    pub scale: f64,
}

impl GammaFit {
    /// Method-of-moments fit. With positive sample skewness `g` the
    /// three-parameter form is used (`shape = 4/g^2`, `scale = sd*g/2`,
    /// `loc = mean - 2*sd/g`); otherwise location is pinned at zero and the
    /// two-parameter form applies. Returns `Ok(None)` for a degenerate
    /// sample (near-constant, or too short to carry a spread), and fails on
    /// non-finite values.
    pub fn from_sample(sample: &[f64]) -> Result<Option<Self>> {
        if let Some(bad) = sample.iter().find(|v| !v.is_finite()) {
            return Err(Error::Fit(format!(
                "fitting sample contains a non-finite value ({bad})"
            )));
        }
        if sample.len() < 2 {
            return Ok(None);
        }

        let n = sample.len() as f64;
        let mean = sample.iter().sum::<f64>() / n;
        let variance = sample.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);

        if variance <= VARIANCE_EPS {
            return Ok(None);
        }

        let sd = variance.sqrt();
        let m2 = sample.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        let m3 = sample.iter().map(|x| (x - mean).powi(3)).sum::<f64>() / n;
        let skew = m3 / m2.powf(1.5);

        let fit = if skew > SKEW_EPS {
            GammaFit {
                shape: 4.0 / skew.powi(2),
                scale: sd * skew / 2.0,
                loc: mean - 2.0 * sd / skew,
            }
        } else {
            if mean <= 0.0 {
                return Err(Error::Fit(format!(
                    "two-parameter fit needs a positive sample mean, got {mean}"
                )));
            }
            GammaFit {
                shape: mean * mean / variance,
                scale: variance / mean,
                loc: 0.0,
            }
        };

        Ok(Some(fit))
    }

    /// Cumulative probability of `x` under the fitted distribution.
    pub fn cdf(&self, x: f64) -> Result<f64> {
        let dist = Gamma::new(self.shape, 1.0 / self.scale)
            .map_err(|e| Error::Fit(format!("invalid fitted parameters: {e}")))?;
        let shifted = x - self.loc;
        if shifted <= 0.0 {
            Ok(0.0)
        } else {
            Ok(dist.cdf(shifted))
        }
    }
}

/// Percentile of `target` against a gamma distribution fitted to `window`.
pub fn percentile(window: &[f64], target: f64) -> Result<f64> {
    match GammaFit::from_sample(window)? {
        Some(fit) => fit.cdf(target),
        None => Ok(DEGENERATE_SCORE),
    }
}

/// Scores every year of a rainfall series against the `window_years` years
/// before it. The window slides one year per step, so the output always has
/// `series.len() - window_years` entries, the first of which belongs to year
/// position `window_years`.
pub fn score_series(series: &[f64], window_years: usize) -> Result<Vec<f64>> {
    if window_years < 1 {
        return Err(Error::config("window length must be at least 1 year"));
    }
    if window_years >= series.len() {
        return Err(Error::config(format!(
            "window of {} years leaves nothing to score in a {}-year series",
            window_years,
            series.len()
        )));
    }

    (window_years..series.len())
        .map(|i| percentile(&series[i - window_years..i], series[i]))
        .collect()
}

// -- Tests -------------------------------------------------------------------
