use proptest::prelude::*;
use triage_core::curves::{
    risk_heart_rate, risk_mean_arterial, risk_resp_rate, risk_shock_index, risk_spo2,
    risk_systolic,
};
use triage_core::{assess_sample, score_sequence, ScoringConfig, VitalSample};

fn sample_strategy() -> impl Strategy<Value = VitalSample> {
    (
        30.0f64..220.0,
        40.0f64..180.0,
        20.0f64..120.0,
        4.0f64..70.0,
        60.0f64..100.0,
        0.0f64..60.0,
    )
        .prop_map(|(pulse, sys, dia, rr, spo2, loss)| {
            VitalSample::new(pulse, sys, dia, rr, spo2, loss)
        })
}

proptest! {
    #[test]
    fn rising_curves_never_decrease(a in 0.0f64..300.0, b in 0.0f64..300.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(risk_heart_rate(lo) <= risk_heart_rate(hi));
        prop_assert!(risk_resp_rate(lo) <= risk_resp_rate(hi));
        prop_assert!(risk_shock_index(lo / 100.0) <= risk_shock_index(hi / 100.0));
    }

    #[test]
    fn falling_curves_never_increase(a in 0.0f64..200.0, b in 0.0f64..200.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(risk_systolic(lo) >= risk_systolic(hi));
        prop_assert!(risk_mean_arterial(lo) >= risk_mean_arterial(hi));
        prop_assert!(risk_spo2(lo) >= risk_spo2(hi));
    }

    #[test]
    fn curves_stay_within_bounds(x in -500.0f64..500.0) {
        for risk in [
            risk_heart_rate(x),
            risk_systolic(x),
            risk_mean_arterial(x),
            risk_resp_rate(x),
            risk_spo2(x),
            risk_shock_index(x / 100.0),
        ] {
            prop_assert!((0.0..=100.0).contains(&risk));
        }
    }

    #[test]
    fn health_score_complements_total_risk(sample in sample_strategy()) {
        let assessment = assess_sample(&sample, &ScoringConfig::default());
        prop_assert!((0.0..=100.0).contains(&assessment.total));
        prop_assert!((assessment.health_score() - (100.0 - assessment.total)).abs() < 1e-12);
    }

    #[test]
    fn sequence_risk_dominates_single_risk(samples in prop::collection::vec(sample_strategy(), 1..40)) {
        let config = ScoringConfig::default();
        let scored = score_sequence(&samples, &config);
        prop_assert_eq!(scored.len(), samples.len());
        let last = samples.last().unwrap();
        let single = assess_sample(last, &config);
        prop_assert!(single.total <= scored.last().unwrap().total_risk() + 1e-9);
    }
}
