use std::fs;

use triage_core::{score_sequence, AlertColor, ScoringConfig};
use triage_csv::{read_sequence_str, score_csv_str, summarize};

fn fixture_path(name: &str) -> String {
    format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"))
}

struct Expected {
    timestamp: String,
    health_score: f64,
    trend_score: f64,
    alert_color: AlertColor,
}

fn load_expected() -> Vec<Expected> {
    let text = fs::read_to_string(fixture_path("hemorrhage_expected.csv"))
        .expect("could not read expected scores");
    text.lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let parts: Vec<&str> = line.split(',').collect();
            Expected {
                timestamp: parts[0].to_string(),
                health_score: parts[1].parse().expect("health score"),
                trend_score: parts[2].parse().expect("trend score"),
                alert_color: parts[3].parse().expect("alert color"),
            }
        })
        .collect()
}

#[test]
fn hemorrhage_sequence_matches_golden() {
    let input = fs::read_to_string(fixture_path("hemorrhage_sequence.csv"))
        .expect("could not read sample sequence");
    let samples = read_sequence_str(&input).expect("could not parse sequence");
    let scored = score_sequence(&samples, &ScoringConfig::default());
    let expected = load_expected();

    assert_eq!(scored.len(), expected.len());
    for (actual, expected) in scored.iter().zip(&expected) {
        let timestamp = actual
            .sample
            .timestamp
            .map(|ts| ts.format("%Y-%m-%dT%H:%M:%SZ").to_string())
            .unwrap_or_default();
        assert_eq!(timestamp, expected.timestamp);
        assert!(
            (actual.health_score - expected.health_score).abs() < 1e-6,
            "{timestamp}: health {} != {}",
            actual.health_score,
            expected.health_score
        );
        assert!(
            (actual.trend_score - expected.trend_score).abs() < 1e-6,
            "{timestamp}: trend {} != {}",
            actual.trend_score,
            expected.trend_score
        );
        assert_eq!(actual.alert_color, expected.alert_color, "{timestamp}");
    }
}

#[test]
fn hemorrhage_summary_tracks_escalation() {
    let input = fs::read_to_string(fixture_path("hemorrhage_sequence.csv"))
        .expect("could not read sample sequence");
    let samples = read_sequence_str(&input).expect("could not parse sequence");
    let summary = summarize(&score_sequence(&samples, &ScoringConfig::default()));

    assert_eq!(summary.samples, 30);
    assert_eq!(summary.latest, AlertColor::Brown);
    assert_eq!(summary.peak, AlertColor::Brown);
    assert_eq!(summary.color_counts.get(&AlertColor::White), Some(&7));
    let order: Vec<AlertColor> = summary.escalations.iter().map(|e| e.alert_color).collect();
    assert_eq!(
        order,
        vec![
            AlertColor::Yellow,
            AlertColor::Orange,
            AlertColor::Red,
            AlertColor::Brown
        ]
    );
    assert_eq!(summary.escalations[0].index, 7);
}

#[test]
fn exported_csv_carries_scores() {
    let input = fs::read_to_string(fixture_path("hemorrhage_sequence.csv"))
        .expect("could not read sample sequence");
    let output = score_csv_str(&input, &ScoringConfig::default()).expect("could not score csv");
    let mut lines = output.lines();

    assert_eq!(
        lines.next(),
        Some(
            "timestamp,blood_loss_percent,pulse_bpm,systolic_mmHg,diastolic_mmHg,\
             resp_rate_bpm,SpO2_percent,health_score,trend_score,alert_color"
        )
    );
    let first = lines.next().expect("first row");
    assert!(first.starts_with("2025-08-30T07:38:19Z,0,75,120,80,16,98,"));
    assert!(first.ends_with(",100,white"));
    assert_eq!(lines.count(), 29);
}
