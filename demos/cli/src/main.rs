use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use triage_core::{assess_sample, score_sequence, ScoringConfig, VitalSample};
use triage_csv::{read_sequence, summarize, write_scored};

#[derive(Parser, Debug)]
#[command(
    name = "triage-cli",
    about = "Score casualty vital-sign sequences into triage alert colors."
)]
struct Args {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score a CSV vital-sign sequence for one casualty.
    Score {
        /// Path to the CSV export.
        #[arg(short, long)]
        input: PathBuf,
        /// Where to write the scored sequence (stdout when omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,
        /// Rolling window used for trend smoothing.
        #[arg(long)]
        window: Option<usize>,
    },
    /// Classify a single live reading without history.
    Classify {
        #[arg(long)]
        pulse: f64,
        #[arg(long)]
        systolic: f64,
        #[arg(long)]
        diastolic: f64,
        #[arg(long)]
        resp_rate: f64,
        #[arg(long)]
        spo2: f64,
        #[arg(long, default_value_t = 0.0)]
        blood_loss: f64,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Csv,
    Json,
    Summary,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match args.command {
        Command::Score {
            input,
            output,
            format,
            window,
        } => {
            let mut config = ScoringConfig::default();
            if let Some(window) = window {
                config.trend_window = window;
            }
            score(&input, output.as_deref(), format, &config)
        }
        Command::Classify {
            pulse,
            systolic,
            diastolic,
            resp_rate,
            spo2,
            blood_loss,
        } => {
            let sample = VitalSample::new(pulse, systolic, diastolic, resp_rate, spo2, blood_loss);
            let assessment = assess_sample(&sample, &ScoringConfig::default());
            println!(
                "Alert: {}\nTotal risk: {:.1}\nHealth score: {:.1}",
                assessment.alert_color(),
                assessment.total,
                assessment.health_score()
            );
            Ok(())
        }
    }
}

fn score(
    input: &Path,
    output: Option<&Path>,
    format: Format,
    config: &ScoringConfig,
) -> anyhow::Result<()> {
    let file = File::open(input).with_context(|| format!("Could not open {input:?}"))?;
    let samples = read_sequence(file).with_context(|| format!("Could not read {input:?}"))?;
    let scored = score_sequence(&samples, config);
    let summary = summarize(&scored);
    info!(
        samples = summary.samples,
        latest = %summary.latest,
        peak = %summary.peak,
        "scored sequence"
    );

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Could not create {path:?}"))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    match format {
        Format::Csv => write_scored(&mut writer, &scored)?,
        Format::Json => {
            serde_json::to_writer_pretty(&mut writer, &scored)?;
            writeln!(writer)?;
        }
        Format::Summary => {
            writeln!(
                writer,
                "Samples: {}\nLatest alert: {}\nPeak alert: {}",
                summary.samples, summary.latest, summary.peak
            )?;
            for escalation in &summary.escalations {
                let at = escalation
                    .timestamp
                    .map(|ts| ts.to_rfc3339())
                    .unwrap_or_else(|| format!("sample {}", escalation.index));
                writeln!(writer, "  reached {} at {at}", escalation.alert_color)?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}
