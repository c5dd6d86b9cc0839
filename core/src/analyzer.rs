//! The analysis orchestrator — the public entry point of the engine.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Field validators (one verdict per field)
//!   2. Anomaly rules    (fields + verdicts -> findings)
//!   3. Risk aggregation (findings + optional opinion -> score, tier)
//!   4. Report assembly
//!
//! RULES:
//!   - A run never partially fails: a panicking validator or rule is
//!     caught, recorded as a CRITICAL `internal_error:<component>`
//!     finding, and the run continues.
//!   - Configuration faults are rejected at construction, before any
//!     run starts. They are the only errors that prevent a report.
//!   - `analyze` takes `&self`; the analyzer holds no mutable state, so
//!     runs for different documents may execute concurrently.

use crate::{
    aggregator,
    config::AnalysisConfig,
    error::AnalysisResult,
    rules::{RuleContext, RuleRegistry},
    types::{
        AnomalyFinding, DocumentId, ExtractedField, ModelOpinion, RiskReport, Severity,
        ValidationVerdict,
    },
    validators,
};
use chrono::{NaiveDate, Utc};
use std::panic::{self, AssertUnwindSafe};

pub struct DocumentAnalyzer {
    config: AnalysisConfig,
    registry: RuleRegistry,
}

impl DocumentAnalyzer {
    /// Build an analyzer with the built-in rule set.
    /// Fails fast on invalid configuration.
    pub fn new(config: AnalysisConfig) -> AnalysisResult<Self> {
        Self::with_registry(config, RuleRegistry::builtin())
    }

    /// Build an analyzer with a caller-assembled rule registry.
    pub fn with_registry(config: AnalysisConfig, registry: RuleRegistry) -> AnalysisResult<Self> {
        config.validate()?;
        Ok(Self { config, registry })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn rule_count(&self) -> usize {
        self.registry.len()
    }

    /// Run one full analysis and assemble the report.
    pub fn analyze(
        &self,
        document_id: impl Into<DocumentId>,
        fields: Vec<ExtractedField>,
        model_opinion: Option<ModelOpinion>,
    ) -> RiskReport {
        let document_id = document_id.into();
        let generated_at = Utc::now();
        let today = generated_at.date_naive();

        let (verdicts, mut findings) = self.run_validators(&fields, today);
        findings.extend(self.run_rules(&fields, &verdicts));

        let (score, tier) = aggregator::aggregate(&findings, model_opinion.as_ref(), &self.config);

        log::debug!(
            "document {document_id}: {} fields, {} findings, score {score} ({})",
            fields.len(),
            findings.len(),
            tier.label()
        );

        RiskReport {
            document_id,
            score,
            tier,
            verdicts,
            findings,
            model_opinion,
            generated_at,
        }
    }

    /// Validate every field. A panicking validator yields a permissive
    /// verdict plus an internal-error finding; the run continues.
    fn run_validators(
        &self,
        fields: &[ExtractedField],
        today: NaiveDate,
    ) -> (Vec<ValidationVerdict>, Vec<AnomalyFinding>) {
        let mut verdicts = Vec::with_capacity(fields.len());
        let mut faults = Vec::new();

        for field in fields {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                validators::validate(field, today, &self.config)
            }));
            match outcome {
                Ok(verdict) => verdicts.push(verdict),
                Err(payload) => {
                    let detail = panic_message(payload.as_ref());
                    log::warn!("validator fault on field '{}': {detail}", field.name);
                    faults.push(internal_error_finding(
                        "validator",
                        &detail,
                        vec![field.name.clone()],
                    ));
                    verdicts.push(ValidationVerdict::unvalidated(&field.name));
                }
            }
        }
        (verdicts, faults)
    }

    /// Run every registered rule. A panicking rule becomes a CRITICAL
    /// internal-error finding in place of its output.
    fn run_rules(
        &self,
        fields: &[ExtractedField],
        verdicts: &[ValidationVerdict],
    ) -> Vec<AnomalyFinding> {
        let ctx = RuleContext {
            fields,
            verdicts,
            config: &self.config,
        };
        let mut findings = Vec::new();

        for rule in self.registry.iter() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| rule.detect(&ctx)));
            match outcome {
                Ok(rule_findings) => findings.extend(rule_findings),
                Err(payload) => {
                    let detail = panic_message(payload.as_ref());
                    log::warn!("rule '{}' fault: {detail}", rule.rule_id());
                    findings.push(internal_error_finding(rule.rule_id(), &detail, Vec::new()));
                }
            }
        }
        findings
    }
}

fn internal_error_finding(
    component: &str,
    detail: &str,
    related_fields: Vec<String>,
) -> AnomalyFinding {
    AnomalyFinding::new(
        format!("internal_error:{component}"),
        Severity::Critical,
        format!("internal fault in {component}: {detail}"),
        related_fields,
    )
}

/// Extract a printable message from a panic payload.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
