//! report-runner: headless analysis runner for the document risk engine.
//!
//! Reads extraction output (a JSON field map produced by the external
//! document-understanding service), runs one analysis, prints the
//! resulting risk report, and optionally persists it to a SQLite store.
//!
//! Usage:
//!   report-runner --input extracted.json
//!   report-runner --input extracted.json --config config.json --db reports.db

mod report_store;

use anyhow::{Context, Result};
use docrisk_core::{
    analyzer::DocumentAnalyzer,
    config::AnalysisConfig,
    types::{ExtractedField, FieldType, ModelOpinion},
};
use report_store::ReportStore;
use std::env;

/// The extraction collaborator's boundary shape: field/value records
/// plus an optional external model opinion.
#[derive(serde::Deserialize)]
struct ExtractionInput {
    #[serde(default)]
    document_id: Option<String>,
    fields: Vec<InputField>,
    #[serde(default)]
    model_opinion: Option<ModelOpinion>,
}

#[derive(serde::Deserialize)]
struct InputField {
    name: String,
    value: String,
    #[serde(rename = "type")]
    field_type: FieldType,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let input_path = match arg_value(&args, "--input") {
        Some(path) => path.to_string(),
        None => {
            eprintln!("Usage: report-runner --input <extracted.json> [--config <config.json>] [--db <reports.db>] [--document-id <id>]");
            std::process::exit(2);
        }
    };
    let config_path = arg_value(&args, "--config");
    let db_path = arg_value(&args, "--db");
    let doc_id_override = arg_value(&args, "--document-id");

    // Configuration faults are fatal here, before any run starts.
    let config = match config_path {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    let analyzer = DocumentAnalyzer::new(config).context("configuration rejected")?;

    let input_raw = std::fs::read_to_string(&input_path)
        .with_context(|| format!("Cannot read {input_path}"))?;
    let input: ExtractionInput =
        serde_json::from_str(&input_raw).with_context(|| format!("Cannot parse {input_path}"))?;

    let document_id = doc_id_override
        .map(str::to_string)
        .or(input.document_id)
        .unwrap_or_else(|| format!("doc-{}", uuid::Uuid::new_v4()));

    let fields: Vec<ExtractedField> = input
        .fields
        .into_iter()
        .map(|f| ExtractedField::new(f.name, f.value, f.field_type))
        .collect();

    log::info!("analyzing document {document_id} ({} fields)", fields.len());
    let report = analyzer.analyze(document_id, fields, input.model_opinion);

    println!("document:        {}", report.document_id);
    println!("risk score:      {}/100", report.score);
    println!("risk tier:       {}", report.tier.label());
    println!(
        "fields:          {} valid / {} invalid",
        report.valid_field_count(),
        report.invalid_field_count()
    );
    for finding in &report.findings {
        println!(
            "  [{:?}] {}: {}",
            finding.severity, finding.rule_id, finding.message
        );
    }
    if let Some(opinion) = &report.model_opinion {
        println!("model narrative: {}", opinion.narrative);
    }
    println!();
    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(db) = db_path {
        let store = ReportStore::open(db)?;
        store.migrate()?;
        store.save_report(&report)?;
        log::info!("report for {} saved to {db}", report.document_id);
    }

    Ok(())
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
