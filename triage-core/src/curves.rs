//! Per-parameter risk curves.
//!
//! Every curve is a piecewise-linear ramp from 0 to 100 anchored at fixed
//! clinical breakpoints, with a capped asymptotic tail past the last one.
//! A `NaN` input contributes no risk.

use crate::{RiskWeights, VitalSample};

/// Heart rate (bpm). Safe at or below 100.
pub fn risk_heart_rate(hr: f64) -> f64 {
    if hr.is_nan() || hr <= 100.0 {
        return 0.0;
    }
    if hr <= 110.0 {
        return 10.0 * (hr - 100.0) / 10.0;
    }
    if hr <= 125.0 {
        return 10.0 + 20.0 * (hr - 110.0) / 15.0;
    }
    if hr <= 140.0 {
        return 30.0 + 25.0 * (hr - 125.0) / 15.0;
    }
    if hr <= 160.0 {
        return 55.0 + 30.0 * (hr - 140.0) / 20.0;
    }
    85.0 + 15.0 * ((hr - 160.0) / 30.0).min(1.0)
}

/// Systolic blood pressure (mmHg). Safe at or above 110.
pub fn risk_systolic(sbp: f64) -> f64 {
    if sbp.is_nan() || sbp >= 110.0 {
        return 0.0;
    }
    if sbp >= 100.0 {
        return 12.0 * (110.0 - sbp) / 10.0;
    }
    if sbp >= 90.0 {
        return 12.0 + 22.0 * (100.0 - sbp) / 10.0;
    }
    if sbp >= 80.0 {
        return 34.0 + 26.0 * (90.0 - sbp) / 10.0;
    }
    if sbp >= 70.0 {
        return 60.0 + 25.0 * (80.0 - sbp) / 10.0;
    }
    85.0 + 15.0 * ((70.0 - sbp) / 20.0).min(1.0)
}

/// Mean arterial pressure (mmHg). Safe at or above 85.
pub fn risk_mean_arterial(map: f64) -> f64 {
    if map.is_nan() || map >= 85.0 {
        return 0.0;
    }
    if map >= 75.0 {
        return 18.0 * (85.0 - map) / 10.0;
    }
    if map >= 65.0 {
        return 18.0 + 24.0 * (75.0 - map) / 10.0;
    }
    if map >= 55.0 {
        return 42.0 + 28.0 * (65.0 - map) / 10.0;
    }
    if map >= 45.0 {
        return 70.0 + 20.0 * (55.0 - map) / 10.0;
    }
    90.0 + 10.0 * ((45.0 - map) / 15.0).min(1.0)
}

/// Respiratory rate (breaths/min). Safe at or below 20.
pub fn risk_resp_rate(rr: f64) -> f64 {
    if rr.is_nan() || rr <= 20.0 {
        return 0.0;
    }
    if rr <= 28.0 {
        return 15.0 * (rr - 20.0) / 8.0;
    }
    if rr <= 36.0 {
        return 15.0 + 25.0 * (rr - 28.0) / 8.0;
    }
    if rr <= 45.0 {
        return 40.0 + 30.0 * (rr - 36.0) / 9.0;
    }
    70.0 + 30.0 * ((rr - 45.0) / 15.0).min(1.0)
}

/// Peripheral oxygen saturation (%). Safe at or above 96.
pub fn risk_spo2(spo2: f64) -> f64 {
    if spo2.is_nan() || spo2 >= 96.0 {
        return 0.0;
    }
    if spo2 >= 93.0 {
        return 12.0 * (96.0 - spo2) / 3.0;
    }
    if spo2 >= 90.0 {
        return 12.0 + 20.0 * (93.0 - spo2) / 3.0;
    }
    if spo2 >= 85.0 {
        return 32.0 + 24.0 * (90.0 - spo2) / 5.0;
    }
    if spo2 >= 80.0 {
        return 56.0 + 24.0 * (85.0 - spo2) / 5.0;
    }
    80.0 + 20.0 * ((80.0 - spo2) / 15.0).min(1.0)
}

/// Shock index (pulse / systolic). Safe at or below 0.8.
pub fn risk_shock_index(si: f64) -> f64 {
    if si.is_nan() || si <= 0.8 {
        return 0.0;
    }
    if si <= 1.0 {
        return 28.0 * (si - 0.8) / 0.2;
    }
    if si <= 1.2 {
        return 28.0 + 32.0 * (si - 1.0) / 0.2;
    }
    if si <= 1.5 {
        return 60.0 + 25.0 * (si - 1.2) / 0.3;
    }
    85.0 + 15.0 * ((si - 1.5) / 0.5).min(1.0)
}

/// `diastolic + (systolic - diastolic) / 3`.
pub fn mean_arterial_pressure(systolic: f64, diastolic: f64) -> f64 {
    diastolic + (systolic - diastolic) / 3.0
}

/// `pulse / systolic`, or `NaN` when undefined.
pub fn shock_index(pulse: f64, systolic: f64) -> f64 {
    if pulse.is_nan() || systolic.is_nan() || systolic <= 0.0 {
        return f64::NAN;
    }
    pulse / systolic
}

/// Weighted sum of the six curves for one sample.
pub fn base_risk(sample: &VitalSample, weights: &RiskWeights) -> f64 {
    let mut risk = 0.0;
    risk += weights.heart_rate * risk_heart_rate(sample.pulse_bpm);
    risk += weights.systolic * risk_systolic(sample.systolic_mmhg);
    risk += weights.mean_arterial * risk_mean_arterial(sample.mean_arterial_pressure());
    risk += weights.resp_rate * risk_resp_rate(sample.resp_rate_bpm);
    risk += weights.spo2 * risk_spo2(sample.spo2_percent);
    risk += weights.shock_index * risk_shock_index(sample.shock_index());
    risk
}
