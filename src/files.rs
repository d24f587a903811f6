use std::io::{Read, Write};
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;
use tracing::{debug, info};

use crate::journey;
use crate::metrics;
use crate::mock::Dataset;
use crate::models::{
    HandlerDecomposition, IntentRecord, JourneyFunnel, KpiRecord, ResponseRecord,
    SentimentImprovement, SentimentMovement,
};
use crate::summary::PolarityConfig;

pub fn read_intents<R: Read>(reader: R) -> anyhow::Result<Vec<IntentRecord>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut intents = Vec::new();

    for (line, result) in reader.deserialize::<IntentRecord>().enumerate() {
        let record = result.with_context(|| format!("invalid intent row {}", line + 1))?;
        anyhow::ensure!(
            record.completion_rate.is_finite(),
            "invalid intent row {}: completion_rate must be a finite number",
            line + 1
        );
        intents.push(record);
    }

    Ok(intents)
}

pub fn read_responses<R: Read>(reader: R) -> anyhow::Result<Vec<ResponseRecord>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut responses = Vec::new();

    for (line, result) in reader.deserialize::<ResponseRecord>().enumerate() {
        let record = result.with_context(|| format!("invalid response row {}", line + 1))?;
        anyhow::ensure!(
            record.completion_rate.is_finite(),
            "invalid response row {}: completion_rate must be a finite number",
            line + 1
        );
        responses.push(record);
    }

    Ok(responses)
}

pub fn import_intents(path: &Path) -> anyhow::Result<Vec<IntentRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let intents = read_intents(file)?;
    info!(path = %path.display(), count = intents.len(), "imported intents");
    Ok(intents)
}

pub fn import_responses(path: &Path) -> anyhow::Result<Vec<ResponseRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let responses = read_responses(file)?;
    info!(path = %path.display(), count = responses.len(), "imported responses");
    Ok(responses)
}

/// Polarity overrides layered over the built-in defaults.
pub fn load_polarity(path: Option<&Path>) -> anyhow::Result<PolarityConfig> {
    let Some(path) = path else {
        return Ok(PolarityConfig::default());
    };

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read polarity config {}", path.display()))?;
    let overrides: PolarityConfig = serde_json::from_str(&raw)
        .with_context(|| format!("invalid polarity config {}", path.display()))?;
    let config = PolarityConfig::default().merge(overrides);
    debug!(metrics = config.len(), "loaded polarity config");
    Ok(config)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

#[derive(Debug, Serialize)]
pub struct DashboardSnapshot {
    pub period: String,
    pub generated_on: NaiveDate,
    pub kpis: Vec<KpiRecord>,
    pub top_completed_intents: Vec<IntentRecord>,
    pub top_incomplete_intents: Vec<IntentRecord>,
    pub automated_responses: Vec<ResponseRecord>,
    pub human_responses: Vec<ResponseRecord>,
    pub improvement: SentimentImprovement,
    pub movement: SentimentMovement,
    pub funnel: JourneyFunnel,
    pub decomposition: HandlerDecomposition,
    pub summary_html: String,
}

impl DashboardSnapshot {
    pub fn capture(dataset: &Dataset, generated_on: NaiveDate, summary_html: String) -> Self {
        Self {
            period: dataset.period.label().to_string(),
            generated_on,
            kpis: dataset.kpis.clone(),
            top_completed_intents: metrics::top_intents(&dataset.intents, true),
            top_incomplete_intents: metrics::top_intents(&dataset.intents, false),
            automated_responses: metrics::top_responses(&dataset.responses, true),
            human_responses: metrics::top_responses(&dataset.responses, false),
            improvement: metrics::sentiment_improvement(&dataset.sentiments),
            movement: metrics::sentiment_movement(&dataset.sentiments),
            funnel: journey::call_funnel(&dataset.kpis),
            decomposition: journey::decompose(
                dataset.sentiments.len() as f64,
                &dataset.sentiments,
            ),
            summary_html,
        }
    }
}

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    section: &'a str,
    label: &'a str,
    value: f64,
}

fn write_csv<W: Write>(snapshot: &DashboardSnapshot, writer: W) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    for kpi in &snapshot.kpis {
        writer.serialize(ExportRow {
            section: "kpi",
            label: &kpi.name,
            value: kpi.value,
        })?;
    }
    for (section, intents) in [
        ("top_completed_intent", &snapshot.top_completed_intents),
        ("top_incomplete_intent", &snapshot.top_incomplete_intents),
    ] {
        for intent in intents {
            writer.serialize(ExportRow {
                section,
                label: &intent.name,
                value: intent.completion_rate,
            })?;
        }
    }
    for (section, responses) in [
        ("automated_response", &snapshot.automated_responses),
        ("human_response", &snapshot.human_responses),
    ] {
        for response in responses {
            writer.serialize(ExportRow {
                section,
                label: &response.query,
                value: f64::from(response.frequency),
            })?;
        }
    }
    for (label, value) in [
        ("automated", snapshot.improvement.automated_rate),
        ("human", snapshot.improvement.human_rate),
    ] {
        writer.serialize(ExportRow {
            section: "sentiment_improvement",
            label,
            value,
        })?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_snapshot<W: Write>(
    snapshot: &DashboardSnapshot,
    format: ExportFormat,
    mut writer: W,
) -> anyhow::Result<()> {
    match format {
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, snapshot)?;
            writeln!(writer)?;
        }
        ExportFormat::Csv => write_csv(snapshot, writer)?,
    }
    Ok(())
}

pub fn export_snapshot(
    snapshot: &DashboardSnapshot,
    format: ExportFormat,
    out: &Path,
) -> anyhow::Result<()> {
    let file = std::fs::File::create(out)
        .with_context(|| format!("failed to create {}", out.display()))?;
    let mut writer = std::io::BufWriter::new(file);
    write_snapshot(snapshot, format, &mut writer)?;
    writer.flush()?;
    info!(path = %out.display(), ?format, "exported snapshot");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockSource, Period};
    use crate::summary::{self, Polarity};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    #[test]
    fn reads_intents_from_csv() {
        let data = "name,total,automated_completed,human_completed,completion_rate\n\
                    Password Reset,286,251,35,87.8\n\
                    Billing Issue,183,126,57,68.9\n";
        let intents = read_intents(data.as_bytes()).unwrap();
        assert_eq!(intents.len(), 2);
        assert_eq!(intents[1].name, "Billing Issue");
        assert_eq!(intents[0].completion_rate, 87.8);
    }

    #[test]
    fn reads_responses_from_csv() {
        let data = "query,frequency,automated,completion_rate\n\
                    \"My service is down, when will it be fixed?\",51,false,95.2\n\
                    How do I reset my password?,97,true,91.8\n";
        let responses = read_responses(data.as_bytes()).unwrap();
        assert_eq!(responses.len(), 2);
        assert!(!responses[0].automated);
        assert_eq!(metrics::top_responses(&responses, true)[0].frequency, 97);
    }

    #[test]
    fn rejects_malformed_rows() {
        let data = "query,frequency,automated,completion_rate\nbroken,many,yes,1\n";
        let err = read_responses(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("invalid response row 1"));
    }

    #[test]
    fn rejects_non_finite_completion_rates() {
        let data = "name,total,automated_completed,human_completed,completion_rate\n\
                    Password Reset,286,251,35,87.8\n\
                    Broken,1,1,1,NaN\n";
        let err = read_intents(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("invalid intent row 2"));

        let data = "query,frequency,automated,completion_rate\nbalance,12,true,inf\n";
        let err = read_responses(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("invalid response row 1"));
    }

    #[test]
    fn polarity_file_layers_over_defaults() {
        let path = std::env::temp_dir().join(format!(
            "agent-insights-polarity-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"Avg Handle Time":"lower_is_better"}"#).unwrap();

        let config = load_polarity(Some(&path)).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(config.polarity("Avg Handle Time"), Polarity::LowerIsBetter);
        assert_eq!(config.polarity(summary::ESCALATIONS), Polarity::LowerIsBetter);
        assert_eq!(config.polarity("Unique Users"), Polarity::HigherIsBetter);
    }

    #[test]
    fn unreadable_polarity_file_is_an_error() {
        let path = std::env::temp_dir().join("agent-insights-missing-polarity.json");
        let err = load_polarity(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("failed to read polarity config"));
    }

    #[test]
    fn missing_polarity_file_uses_defaults() {
        let config = load_polarity(None).unwrap();
        assert_eq!(config, PolarityConfig::default());
    }

    #[test]
    fn snapshot_exports_as_json_and_csv() {
        let mut source = MockSource::new(Some(9), today());
        let dataset = source.for_period(Period::Last30Days);
        let snapshot = DashboardSnapshot::capture(&dataset, today(), "<p>ok</p>".to_string());

        let mut json = Vec::new();
        write_snapshot(&snapshot, ExportFormat::Json, &mut json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["period"], "Last 30 Days");
        assert_eq!(value["top_completed_intents"].as_array().unwrap().len(), 5);
        assert_eq!(value["summary_html"], "<p>ok</p>");
        assert_eq!(value["decomposition"]["total_conversations"], 100.0);

        let mut csv_out = Vec::new();
        write_snapshot(&snapshot, ExportFormat::Csv, &mut csv_out).unwrap();
        let text = String::from_utf8(csv_out).unwrap();
        assert!(text.starts_with("section,label,value\n"));
        assert!(text.contains("sentiment_improvement,automated,"));
        assert_eq!(text.lines().filter(|l| l.starts_with("kpi,")).count(), 6);
    }
}
