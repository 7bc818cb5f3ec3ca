//! Framework-neutral WASM <-> JavaScript bridge for the triage scorer.

use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use triage_core::{RiskWeights, ScoringConfig, TriageError, VitalSample};
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
struct JsScoringConfig {
    #[serde(default)]
    trend_window: Option<usize>,
    #[serde(default)]
    exact_percentile_below: Option<usize>,
    #[serde(default)]
    trend_budget: Option<f64>,
    #[serde(default)]
    weights: Option<RiskWeights>,
}

impl From<JsScoringConfig> for ScoringConfig {
    fn from(cfg: JsScoringConfig) -> Self {
        let mut base = ScoringConfig::default();
        if let Some(window) = cfg.trend_window {
            base.trend_window = window;
        }
        if let Some(limit) = cfg.exact_percentile_below {
            base.exact_percentile_below = limit;
        }
        if let Some(budget) = cfg.trend_budget {
            base.trend_budget = budget;
        }
        if let Some(weights) = cfg.weights {
            base.weights = weights;
        }
        base
    }
}

fn read_config(config: Option<JsValue>) -> Result<ScoringConfig, JsValue> {
    match config {
        Some(js_cfg) if !js_cfg.is_undefined() && !js_cfg.is_null() => {
            let cfg: JsScoringConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Could not read config: {err}")))?;
            Ok(ScoringConfig::from(cfg))
        }
        _ => Ok(ScoringConfig::default()),
    }
}

/// Score an ordered array of vital samples for one casualty.
#[wasm_bindgen(js_name = scoreSequence)]
pub fn score_sequence(samples: JsValue, config: Option<JsValue>) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let samples = from_value::<Vec<VitalSample>>(samples)
        .map_err(|err| JsValue::from_str(&format!("Could not read vital samples: {err}")))?;
    let cfg = read_config(config)?;

    let scored = triage_core::score_sequence(&samples, &cfg);
    to_value(&scored)
        .map_err(|err| JsValue::from_str(&format!("Could not serialize scores: {err}")))
}

/// Alert color of one live reading without history.
#[wasm_bindgen(js_name = classifySample)]
pub fn classify_sample(sample: JsValue, config: Option<JsValue>) -> Result<String, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let sample = from_value::<VitalSample>(sample)
        .map_err(|err| JsValue::from_str(&format!("Could not read vital sample: {err}")))?;
    let cfg = read_config(config)?;

    Ok(triage_core::classify_sample(&sample, &cfg).to_string())
}

/// Score a CSV export and return the scored samples plus a summary.
#[wasm_bindgen(js_name = scoreCsv)]
pub fn score_csv(csv_text: &str, config: Option<JsValue>) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let cfg = read_config(config)?;
    let samples = triage_csv::read_sequence_str(csv_text)
        .map_err(|err| JsValue::from_str(&format_triage_error(err)))?;
    let scored = triage_core::score_sequence(&samples, &cfg);
    let summary = triage_csv::summarize(&scored);

    to_value(&ScoredCsv { scored, summary })
        .map_err(|err| JsValue::from_str(&format!("Could not serialize scores: {err}")))
}

#[derive(serde::Serialize)]
struct ScoredCsv {
    scored: Vec<triage_core::ScoredSample>,
    summary: triage_csv::SequenceSummary,
}

fn format_triage_error(err: TriageError) -> String {
    format!("Triage error: {err}")
}
