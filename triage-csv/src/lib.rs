//! CSV vital-sign exports to scored sequences, and back.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io;

use chrono::{DateTime, SecondsFormat, Utc};
use csv::{ByteRecord, ReaderBuilder, Trim, WriterBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use triage_core::{
    latest_alert, parse_timestamp, peak_alert, score_sequence, AlertColor, ScoredSample,
    ScoringConfig, TriageError, VitalSample,
};

/// Columns written ahead of the scores, in export order.
pub const INPUT_COLUMNS: [&str; 7] = [
    "timestamp",
    "blood_loss_percent",
    "pulse_bpm",
    "systolic_mmHg",
    "diastolic_mmHg",
    "resp_rate_bpm",
    "SpO2_percent",
];

/// Columns appended by the scorer.
pub const SCORE_COLUMNS: [&str; 3] = ["health_score", "trend_score", "alert_color"];

/// Read a vital-sign sequence from CSV text.
pub fn read_sequence_str(csv_text: &str) -> Result<Vec<VitalSample>, TriageError> {
    read_sequence(csv_text.as_bytes())
}

/// Read a vital-sign sequence from any CSV source with a header row.
///
/// Columns are matched by name, in any order. A blank, unparseable or
/// non-finite reading becomes `NaN` (no risk contribution), a blank blood loss
/// becomes 0 and an unparseable timestamp becomes `None`. Cells that are not
/// valid UTF-8 are decoded lossily. None of these fail the sequence.
pub fn read_sequence<R: io::Read>(reader: R) -> Result<Vec<VitalSample>, TriageError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = reader
        .byte_headers()
        .map_err(|err| TriageError::Parse(err.to_string()))?
        .clone();

    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let columns = ColumnMap::from_headers(&headers);
    if !columns.has_readings() {
        return Err(TriageError::MissingData);
    }

    let mut samples = Vec::new();
    for record in reader.byte_records() {
        let record = record.map_err(|err| TriageError::Parse(err.to_string()))?;
        samples.push(columns.sample_from(&record));
    }

    debug!(samples = samples.len(), "read vital sequence");
    Ok(samples)
}

/// Write scored samples with the input columns followed by the score columns.
pub fn write_scored<W: io::Write>(writer: W, scored: &[ScoredSample]) -> Result<(), TriageError> {
    let mut writer = WriterBuilder::new().from_writer(writer);

    writer
        .write_record(INPUT_COLUMNS.iter().chain(SCORE_COLUMNS.iter()))
        .map_err(|err| TriageError::Io(err.to_string()))?;

    for entry in scored {
        let sample = &entry.sample;
        let row = [
            sample
                .timestamp
                .map(|ts| ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
                .unwrap_or_default(),
            format_reading(sample.blood_loss_percent),
            format_reading(sample.pulse_bpm),
            format_reading(sample.systolic_mmhg),
            format_reading(sample.diastolic_mmhg),
            format_reading(sample.resp_rate_bpm),
            format_reading(sample.spo2_percent),
            format_reading(entry.health_score),
            format_reading(entry.trend_score),
            entry.alert_color.to_string(),
        ];
        writer
            .write_record(&row)
            .map_err(|err| TriageError::Io(err.to_string()))?;
    }

    writer.flush().map_err(|err| TriageError::Io(err.to_string()))
}

/// Render scored samples as CSV text.
pub fn scored_to_string(scored: &[ScoredSample]) -> Result<String, TriageError> {
    let mut buffer = Vec::new();
    write_scored(&mut buffer, scored)?;
    String::from_utf8(buffer).map_err(|err| TriageError::Other(err.to_string()))
}

/// Read, score and re-export a CSV sequence in one step.
pub fn score_csv_str(csv_text: &str, config: &ScoringConfig) -> Result<String, TriageError> {
    let samples = read_sequence_str(csv_text)?;
    let scored = score_sequence(&samples, config);
    scored_to_string(&scored)
}

/// Overview of a scored sequence for alert banners and roster badges.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SequenceSummary {
    pub samples: usize,
    pub latest: AlertColor,
    pub peak: AlertColor,
    pub latest_health_score: Option<f64>,
    pub latest_timestamp: Option<DateTime<Utc>>,
    pub color_counts: BTreeMap<AlertColor, usize>,
    /// First sample reaching each level above white, in order of first occurrence.
    /// A level reached only after a higher one is listed after it.
    pub escalations: Vec<Escalation>,
}

/// First time a sequence reached a given alert level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Escalation {
    pub alert_color: AlertColor,
    pub index: usize,
    pub timestamp: Option<DateTime<Utc>>,
}

pub fn summarize(scored: &[ScoredSample]) -> SequenceSummary {
    let mut color_counts = BTreeMap::new();
    let mut escalations: Vec<Escalation> = Vec::new();

    for (index, entry) in scored.iter().enumerate() {
        *color_counts.entry(entry.alert_color).or_insert(0) += 1;

        let reached = escalations
            .iter()
            .any(|escalation| escalation.alert_color == entry.alert_color);
        if entry.alert_color > AlertColor::White && !reached {
            escalations.push(Escalation {
                alert_color: entry.alert_color,
                index,
                timestamp: entry.sample.timestamp,
            });
        }
    }

    let last = scored.last();
    SequenceSummary {
        samples: scored.len(),
        latest: latest_alert(scored),
        peak: peak_alert(scored),
        latest_health_score: last.map(|entry| entry.health_score),
        latest_timestamp: last.and_then(|entry| entry.sample.timestamp),
        color_counts,
        escalations,
    }
}

#[derive(Debug, Default)]
struct ColumnMap {
    timestamp: Option<usize>,
    blood_loss: Option<usize>,
    pulse: Option<usize>,
    systolic: Option<usize>,
    diastolic: Option<usize>,
    resp_rate: Option<usize>,
    spo2: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &ByteRecord) -> Self {
        let mut columns = Self::default();
        for (idx, header) in headers.iter().enumerate() {
            let slot = match String::from_utf8_lossy(header).to_lowercase().as_str() {
                "timestamp" | "time" | "recorded_at" => &mut columns.timestamp,
                "blood_loss_percent" | "blood_loss" => &mut columns.blood_loss,
                "pulse_bpm" | "pulse" | "heart_rate" | "hr" => &mut columns.pulse,
                "systolic_mmhg" | "systolic" | "sbp" => &mut columns.systolic,
                "diastolic_mmhg" | "diastolic" | "dbp" => &mut columns.diastolic,
                "resp_rate_bpm" | "resp_rate" | "rr" => &mut columns.resp_rate,
                "spo2_percent" | "spo2" => &mut columns.spo2,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(idx);
            }
        }
        columns
    }

    fn has_readings(&self) -> bool {
        [
            self.blood_loss,
            self.pulse,
            self.systolic,
            self.diastolic,
            self.resp_rate,
            self.spo2,
        ]
        .iter()
        .any(Option::is_some)
    }

    fn sample_from(&self, record: &ByteRecord) -> VitalSample {
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        let reading = |column: Option<usize>, name: &str| -> f64 {
            parse_reading(cell(record, column), line, name).unwrap_or(f64::NAN)
        };

        VitalSample {
            timestamp: cell(record, self.timestamp).and_then(|text| {
                let parsed = parse_timestamp(&text);
                if parsed.is_none() {
                    warn!(line, value = %text, "unparseable timestamp, leaving it empty");
                }
                parsed
            }),
            pulse_bpm: reading(self.pulse, "pulse_bpm"),
            systolic_mmhg: reading(self.systolic, "systolic_mmHg"),
            diastolic_mmhg: reading(self.diastolic, "diastolic_mmHg"),
            resp_rate_bpm: reading(self.resp_rate, "resp_rate_bpm"),
            spo2_percent: reading(self.spo2, "SpO2_percent"),
            blood_loss_percent: parse_reading(
                cell(record, self.blood_loss),
                line,
                "blood_loss_percent",
            )
            .unwrap_or(0.0),
        }
    }
}

fn cell(record: &ByteRecord, column: Option<usize>) -> Option<Cow<'_, str>> {
    column
        .and_then(|idx| record.get(idx))
        .filter(|bytes| !bytes.is_empty())
        .map(String::from_utf8_lossy)
}

fn parse_reading(text: Option<Cow<'_, str>>, line: u64, column: &str) -> Option<f64> {
    let text = text?;
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            warn!(line, column, value = %text, "unparseable reading, treating as missing");
            None
        }
    }
}

fn format_reading(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}
