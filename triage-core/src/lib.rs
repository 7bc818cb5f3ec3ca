//! Core risk scoring and alert classification for casualty vital-sign streams.
//!
//! A [`VitalSample`] sequence for one casualty is scored into [`ScoredSample`]s,
//! each carrying a health score, a trend score and a five-level [`AlertColor`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

pub mod curves;
pub mod trend;

mod scorer;

pub use scorer::{
    assess_sample, blood_loss_boost, classify_sample, score_sequence, RiskAssessment,
};

/// Tunables for the scorer. `Default` reproduces the reference model exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    /// Trailing window (samples) of the rolling mean used for trends.
    pub trend_window: usize,
    /// Sequences shorter than this use the exact 95th percentile.
    pub exact_percentile_below: usize,
    /// Maximum trend penalty, split evenly over the three trend series.
    pub trend_budget: f64,
    pub weights: RiskWeights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            trend_window: 5,
            exact_percentile_below: 20,
            trend_budget: 25.0,
            weights: RiskWeights::default(),
        }
    }
}

/// Weights of the per-parameter curves in the base risk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskWeights {
    pub heart_rate: f64,
    pub systolic: f64,
    pub mean_arterial: f64,
    pub resp_rate: f64,
    pub spo2: f64,
    pub shock_index: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            heart_rate: 0.16,
            systolic: 0.20,
            mean_arterial: 0.20,
            resp_rate: 0.08,
            spo2: 0.08,
            shock_index: 0.28,
        }
    }
}

/// One vital-sign reading. Missing readings are `NaN` and contribute no risk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VitalSample {
    /// Unreadable timestamps become `None` instead of rejecting the sample.
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default = "missing_reading", deserialize_with = "deserialize_reading")]
    pub pulse_bpm: f64,
    #[serde(
        rename = "systolic_mmHg",
        default = "missing_reading",
        deserialize_with = "deserialize_reading"
    )]
    pub systolic_mmhg: f64,
    #[serde(
        rename = "diastolic_mmHg",
        default = "missing_reading",
        deserialize_with = "deserialize_reading"
    )]
    pub diastolic_mmhg: f64,
    #[serde(default = "missing_reading", deserialize_with = "deserialize_reading")]
    pub resp_rate_bpm: f64,
    #[serde(
        rename = "SpO2_percent",
        default = "missing_reading",
        deserialize_with = "deserialize_reading"
    )]
    pub spo2_percent: f64,
    /// Cumulative estimated blood loss. Absent means none.
    #[serde(default, deserialize_with = "deserialize_blood_loss")]
    pub blood_loss_percent: f64,
}

impl VitalSample {
    pub fn new(
        pulse_bpm: f64,
        systolic_mmhg: f64,
        diastolic_mmhg: f64,
        resp_rate_bpm: f64,
        spo2_percent: f64,
        blood_loss_percent: f64,
    ) -> Self {
        Self {
            timestamp: None,
            pulse_bpm,
            systolic_mmhg,
            diastolic_mmhg,
            resp_rate_bpm,
            spo2_percent,
            blood_loss_percent,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Mean arterial pressure derived from the systolic/diastolic pair.
    pub fn mean_arterial_pressure(&self) -> f64 {
        curves::mean_arterial_pressure(self.systolic_mmhg, self.diastolic_mmhg)
    }

    /// Pulse over systolic, `NaN` when either is missing or systolic is not positive.
    pub fn shock_index(&self) -> f64 {
        curves::shock_index(self.pulse_bpm, self.systolic_mmhg)
    }
}

impl Default for VitalSample {
    fn default() -> Self {
        Self {
            timestamp: None,
            pulse_bpm: f64::NAN,
            systolic_mmhg: f64::NAN,
            diastolic_mmhg: f64::NAN,
            resp_rate_bpm: f64::NAN,
            spo2_percent: f64::NAN,
            blood_loss_percent: 0.0,
        }
    }
}

/// Parse an RFC 3339 timestamp, or a naive `YYYY-MM-DD[T ]HH:MM:SS[.f]`
/// taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Other(IgnoredAny),
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match Option::<RawTimestamp>::deserialize(deserializer)? {
        Some(RawTimestamp::Text(text)) => {
            let parsed = parse_timestamp(&text);
            if parsed.is_none() {
                tracing::warn!(value = %text, "unparseable timestamp, leaving it empty");
            }
            parsed
        }
        Some(RawTimestamp::Other(_)) | None => None,
    };
    Ok(parsed)
}

fn missing_reading() -> f64 {
    f64::NAN
}

fn deserialize_reading<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

fn deserialize_blood_loss<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// A sample enriched with its scores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredSample {
    #[serde(flatten)]
    pub sample: VitalSample,
    /// `100 - total_risk`, in [0, 100].
    pub health_score: f64,
    /// `100 - trend_penalty`, in [0, 100]. Not comparable with `health_score`.
    pub trend_score: f64,
    pub alert_color: AlertColor,
}

impl ScoredSample {
    /// Total risk recovered from the health score.
    pub fn total_risk(&self) -> f64 {
        100.0 - self.health_score
    }
}

/// Triage alert level, ordered by ascending risk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlertColor {
    White,
    Yellow,
    Orange,
    Red,
    Brown,
}

impl AlertColor {
    pub const ALL: [AlertColor; 5] = [
        AlertColor::White,
        AlertColor::Yellow,
        AlertColor::Orange,
        AlertColor::Red,
        AlertColor::Brown,
    ];

    /// Map a total risk in [0, 100] to its alert level. Lower bounds are inclusive.
    pub fn from_risk(risk: f64) -> Self {
        if risk < 12.0 {
            AlertColor::White
        } else if risk < 30.0 {
            AlertColor::Yellow
        } else if risk < 55.0 {
            AlertColor::Orange
        } else if risk < 78.0 {
            AlertColor::Red
        } else {
            AlertColor::Brown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertColor::White => "white",
            AlertColor::Yellow => "yellow",
            AlertColor::Orange => "orange",
            AlertColor::Red => "red",
            AlertColor::Brown => "brown",
        }
    }
}

impl fmt::Display for AlertColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertColor {
    type Err = TriageError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        AlertColor::ALL
            .into_iter()
            .find(|color| color.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| TriageError::Parse(format!("unknown alert color {value:?}")))
    }
}

/// Most recent alert of a scored sequence; white when nothing was scored.
pub fn latest_alert(scored: &[ScoredSample]) -> AlertColor {
    scored
        .last()
        .map(|entry| entry.alert_color)
        .unwrap_or(AlertColor::White)
}

/// Highest alert reached anywhere in a scored sequence.
pub fn peak_alert(scored: &[ScoredSample]) -> AlertColor {
    scored
        .iter()
        .map(|entry| entry.alert_color)
        .max()
        .unwrap_or(AlertColor::White)
}

/// Errors raised around the scorer (ingestion, export, bridges).
/// The scorer itself always produces a best-effort result.
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("input is missing the minimum required data")]
    MissingData,
    #[error("could not parse input: {0}")]
    Parse(String),
    #[error("i/o failure: {0}")]
    Io(String),
    #[error("other error: {0}")]
    Other(String),
}
