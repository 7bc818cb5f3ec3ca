use triage_core::curves::{
    base_risk, mean_arterial_pressure, risk_heart_rate, risk_mean_arterial, risk_resp_rate,
    risk_shock_index, risk_spo2, risk_systolic, shock_index,
};
use triage_core::{RiskWeights, VitalSample};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn heart_rate_breakpoints() {
    assert_close(risk_heart_rate(60.0), 0.0);
    assert_close(risk_heart_rate(100.0), 0.0);
    assert_close(risk_heart_rate(105.0), 5.0);
    assert_close(risk_heart_rate(110.0), 10.0);
    assert_close(risk_heart_rate(125.0), 30.0);
    assert_close(risk_heart_rate(140.0), 55.0);
    assert_close(risk_heart_rate(160.0), 85.0);
    assert_close(risk_heart_rate(175.0), 92.5);
    assert_close(risk_heart_rate(190.0), 100.0);
    assert_close(risk_heart_rate(260.0), 100.0);
}

#[test]
fn systolic_breakpoints() {
    assert_close(risk_systolic(130.0), 0.0);
    assert_close(risk_systolic(110.0), 0.0);
    assert_close(risk_systolic(100.0), 12.0);
    assert_close(risk_systolic(90.0), 34.0);
    assert_close(risk_systolic(80.0), 60.0);
    assert_close(risk_systolic(70.0), 85.0);
    assert_close(risk_systolic(50.0), 100.0);
    assert_close(risk_systolic(0.0), 100.0);
}

#[test]
fn mean_arterial_breakpoints() {
    assert_close(risk_mean_arterial(85.0), 0.0);
    assert_close(risk_mean_arterial(75.0), 18.0);
    assert_close(risk_mean_arterial(65.0), 42.0);
    assert_close(risk_mean_arterial(55.0), 70.0);
    assert_close(risk_mean_arterial(45.0), 90.0);
    assert_close(risk_mean_arterial(30.0), 100.0);
}

#[test]
fn resp_rate_breakpoints() {
    assert_close(risk_resp_rate(20.0), 0.0);
    assert_close(risk_resp_rate(28.0), 15.0);
    assert_close(risk_resp_rate(36.0), 40.0);
    assert_close(risk_resp_rate(45.0), 70.0);
    assert_close(risk_resp_rate(60.0), 100.0);
}

#[test]
fn spo2_breakpoints() {
    assert_close(risk_spo2(96.0), 0.0);
    assert_close(risk_spo2(93.0), 12.0);
    assert_close(risk_spo2(90.0), 32.0);
    assert_close(risk_spo2(85.0), 56.0);
    assert_close(risk_spo2(80.0), 80.0);
    assert_close(risk_spo2(65.0), 100.0);
}

#[test]
fn shock_index_breakpoints() {
    assert_close(risk_shock_index(0.8), 0.0);
    assert_close(risk_shock_index(1.0), 28.0);
    assert_close(risk_shock_index(1.2), 60.0);
    assert_close(risk_shock_index(1.5), 85.0);
    assert_close(risk_shock_index(2.0), 100.0);
}

#[test]
fn missing_readings_contribute_nothing() {
    assert_eq!(risk_heart_rate(f64::NAN), 0.0);
    assert_eq!(risk_systolic(f64::NAN), 0.0);
    assert_eq!(risk_mean_arterial(f64::NAN), 0.0);
    assert_eq!(risk_resp_rate(f64::NAN), 0.0);
    assert_eq!(risk_spo2(f64::NAN), 0.0);
    assert_eq!(risk_shock_index(f64::NAN), 0.0);
    assert_eq!(base_risk(&VitalSample::default(), &RiskWeights::default()), 0.0);
}

#[test]
fn derived_pressures() {
    assert_close(mean_arterial_pressure(120.0, 80.0), 93.333_333_333_333_33);
    assert_close(mean_arterial_pressure(70.0, 40.0), 50.0);
    assert_close(shock_index(120.0, 100.0), 1.2);
    assert!(shock_index(120.0, 0.0).is_nan());
    assert!(shock_index(120.0, -5.0).is_nan());
    assert!(shock_index(f64::NAN, 100.0).is_nan());
}

#[test]
fn normal_vitals_have_no_base_risk() {
    let sample = VitalSample::new(75.0, 120.0, 80.0, 16.0, 98.0, 0.0);
    assert_eq!(base_risk(&sample, &RiskWeights::default()), 0.0);
}

#[test]
fn deranged_vitals_saturate_every_curve() {
    let sample = VitalSample::new(160.0, 70.0, 40.0, 45.0, 80.0, 40.0);
    // 0.16*85 + 0.20*85 + 0.20*80 + 0.08*70 + 0.08*80 + 0.28*100
    assert_close(base_risk(&sample, &RiskWeights::default()), 86.6);
}

#[test]
fn default_weights_sum_to_one() {
    let w = RiskWeights::default();
    let sum = w.heart_rate + w.systolic + w.mean_arterial + w.resp_rate + w.spo2 + w.shock_index;
    assert_close(sum, 1.0);
}
