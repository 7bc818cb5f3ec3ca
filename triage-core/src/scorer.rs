use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::curves::base_risk;
use crate::trend::trend_penalties;
use crate::{AlertColor, ScoredSample, ScoringConfig, VitalSample};

/// Risk components of one sample.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    pub base: f64,
    pub trend: f64,
    pub blood_loss: f64,
    /// `base + trend + blood_loss`, clamped to [0, 100].
    pub total: f64,
}

impl RiskAssessment {
    fn combine(base: f64, trend: f64, blood_loss: f64) -> Self {
        Self {
            base,
            trend,
            blood_loss,
            total: (base + trend + blood_loss).clamp(0.0, 100.0),
        }
    }

    pub fn health_score(&self) -> f64 {
        (100.0 - self.total).clamp(0.0, 100.0)
    }

    pub fn trend_score(&self) -> f64 {
        (100.0 - self.trend).clamp(0.0, 100.0)
    }

    pub fn alert_color(&self) -> AlertColor {
        AlertColor::from_risk(self.total)
    }
}

fn logistic(x: f64, center: f64, width: f64) -> f64 {
    1.0 / (1.0 + (-(x - center) / width).exp())
}

/// Risk boost from cumulative blood loss alone: logistic ramps at 15, 30 and
/// 40 percent adding up to 8, 12 and 18 points. A missing value counts as 0.
pub fn blood_loss_boost(blood_loss_percent: f64) -> f64 {
    let x = if blood_loss_percent.is_nan() {
        0.0
    } else {
        blood_loss_percent
    };
    8.0 * logistic(x, 15.0, 2.0) + 12.0 * logistic(x, 30.0, 2.0) + 18.0 * logistic(x, 40.0, 2.0)
}

/// Score one sample without history; the trend penalty is zero.
pub fn assess_sample(sample: &VitalSample, config: &ScoringConfig) -> RiskAssessment {
    RiskAssessment::combine(
        base_risk(sample, &config.weights),
        0.0,
        blood_loss_boost(sample.blood_loss_percent),
    )
}

/// Alert level of a single live reading, before any history exists.
pub fn classify_sample(sample: &VitalSample, config: &ScoringConfig) -> AlertColor {
    assess_sample(sample, config).alert_color()
}

/// Score an ordered sequence of samples for one casualty.
///
/// Input order is trusted as chronological; nothing is sorted or validated.
pub fn score_sequence(samples: &[VitalSample], config: &ScoringConfig) -> Vec<ScoredSample> {
    if samples.is_empty() {
        return Vec::new();
    }

    let trends = trend_penalties(samples, config);
    let scored: Vec<ScoredSample> = samples
        .iter()
        .zip(trends)
        .map(|(sample, trend)| {
            let assessment = RiskAssessment::combine(
                base_risk(sample, &config.weights),
                trend.total(),
                blood_loss_boost(sample.blood_loss_percent),
            );
            ScoredSample {
                sample: sample.clone(),
                health_score: assessment.health_score(),
                trend_score: assessment.trend_score(),
                alert_color: assessment.alert_color(),
            }
        })
        .collect();

    debug!(
        samples = scored.len(),
        latest = %crate::latest_alert(&scored),
        "scored vital sequence"
    );
    scored
}
