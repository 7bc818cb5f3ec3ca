//! Sequence-level trend penalty.
//!
//! Systolic pressure, MAP and shock index are smoothed with a trailing rolling
//! mean, differenced, oriented so that deterioration is positive, and
//! normalized against the sequence's own 95th-percentile step size.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ScoringConfig, VitalSample};

/// Trend penalty of one sample, split per contributing series.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct TrendBreakdown {
    pub systolic: f64,
    pub mean_arterial: f64,
    pub shock_index: f64,
}

impl TrendBreakdown {
    pub fn total(&self) -> f64 {
        self.systolic + self.mean_arterial + self.shock_index
    }
}

/// Trailing mean over at most `window` values. The window shrinks at the
/// start of the series; non-finite entries are skipped, and a window holding
/// no finite value yields `NaN`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..values.len())
        .map(|idx| {
            let start = (idx + 1).saturating_sub(window);
            let (sum, count) = values[start..=idx]
                .iter()
                .filter(|value| value.is_finite())
                .fold((0.0_f64, 0usize), |(sum, count), value| (sum + value, count + 1));
            if count == 0 {
                f64::NAN
            } else {
                sum / count as f64
            }
        })
        .collect()
}

/// Step-to-step difference; the first element and any non-finite step are 0.
pub fn first_difference(values: &[f64]) -> Vec<f64> {
    let mut diffs = Vec::with_capacity(values.len());
    if values.is_empty() {
        return diffs;
    }
    diffs.push(0.0);
    for pair in values.windows(2) {
        let diff = pair[1] - pair[0];
        diffs.push(if diff.is_finite() { diff } else { 0.0 });
    }
    diffs
}

/// Approximate 95th percentile of non-negative values.
///
/// Below `exact_below` values the exact order statistic `sorted[floor(0.95 n)]`
/// is used; longer series use `0.8 * max + 0.2 * mean`. A zero (or empty)
/// result is replaced with 1.0 so it can be used as a divisor.
pub fn percentile_95(values: &[f64], exact_below: usize) -> f64 {
    if values.is_empty() {
        return 1.0;
    }

    let estimate = if values.len() < exact_below {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let index = (sorted.len() as f64 * 0.95).floor() as usize;
        sorted[index.min(sorted.len() - 1)]
    } else {
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        0.8 * max + 0.2 * mean
    };

    if estimate > 0.0 {
        estimate
    } else {
        1.0
    }
}

fn smoothed_slope(values: &[f64], window: usize) -> Vec<f64> {
    first_difference(&rolling_mean(values, window))
}

fn scaled(slopes: &[f64], config: &ScoringConfig, share: f64) -> Vec<f64> {
    let magnitudes: Vec<f64> = slopes
        .iter()
        .map(|slope| slope.abs())
        .filter(|magnitude| magnitude.is_finite())
        .collect();
    let p95 = percentile_95(&magnitudes, config.exact_percentile_below);
    slopes
        .iter()
        .map(|slope| {
            let ratio = slope / p95;
            if ratio.is_finite() {
                share * ratio.clamp(0.0, 1.0)
            } else {
                0.0
            }
        })
        .collect()
}

/// Per-sample trend penalties for an ordered sequence of one casualty.
///
/// Falling systolic pressure and MAP, and rising shock index, are penalized.
/// Each series contributes at most `trend_budget / 3`.
pub fn trend_penalties(samples: &[VitalSample], config: &ScoringConfig) -> Vec<TrendBreakdown> {
    if samples.is_empty() {
        return Vec::new();
    }

    let systolic: Vec<f64> = samples.iter().map(|s| s.systolic_mmhg).collect();
    let mean_arterial: Vec<f64> = samples
        .iter()
        .map(VitalSample::mean_arterial_pressure)
        .collect();
    let shock_index: Vec<f64> = samples.iter().map(VitalSample::shock_index).collect();

    let falling_systolic: Vec<f64> = smoothed_slope(&systolic, config.trend_window)
        .into_iter()
        .map(|slope| -slope)
        .collect();
    let falling_map: Vec<f64> = smoothed_slope(&mean_arterial, config.trend_window)
        .into_iter()
        .map(|slope| -slope)
        .collect();
    let rising_si = smoothed_slope(&shock_index, config.trend_window);

    debug!(
        samples = samples.len(),
        exact_percentile = samples.len() < config.exact_percentile_below,
        "computing trend penalties"
    );

    let share = config.trend_budget / 3.0;
    let systolic = scaled(&falling_systolic, config, share);
    let mean_arterial = scaled(&falling_map, config, share);
    let shock_index = scaled(&rising_si, config, share);

    systolic
        .into_iter()
        .zip(mean_arterial)
        .zip(shock_index)
        .map(|((systolic, mean_arterial), shock_index)| TrendBreakdown {
            systolic,
            mean_arterial,
            shock_index,
        })
        .collect()
}
