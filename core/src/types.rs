//! Shared data model for a single document analysis run.
//!
//! Everything here is a plain value type: produced once, never mutated.
//! The orchestrator owns the fields for the duration of one run and hands
//! the finished `RiskReport` to the dashboard/persistence collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The canonical document identifier, assigned by the caller.
pub type DocumentId = String;

/// The kind of value an extracted field claims to hold.
/// Closed enumeration — validator dispatch matches on it exhaustively,
/// so adding a variant is a compile-time-checked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    IdentifierCpf,
    IdentifierCnpj,
    Date,
    Monetary,
    Text,
}

/// One field/value pair produced by the external extraction service.
/// The core trusts nothing about the original document format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedField {
    pub name: String,
    pub raw_value: String,
    pub field_type: FieldType,
}

impl ExtractedField {
    pub fn new(
        name: impl Into<String>,
        raw_value: impl Into<String>,
        field_type: FieldType,
    ) -> Self {
        Self {
            name: name.into(),
            raw_value: raw_value.into(),
            field_type,
        }
    }
}

/// Outcome of validating a single field. Exactly one per extracted field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub field_name: String,
    pub is_valid: bool,
    pub reason: Option<String>,
}

impl ValidationVerdict {
    pub fn valid(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            is_valid: true,
            reason: None,
        }
    }

    pub fn invalid(field_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            is_valid: false,
            reason: Some(reason.into()),
        }
    }

    /// Permissive default for field types with no matching validator.
    /// Absence of a rule is not itself fraud evidence.
    pub fn unvalidated(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            is_valid: true,
            reason: Some("unvalidated".to_string()),
        }
    }
}

/// Severity of an anomaly finding. Ordering matters: later variants
/// carry more scoring weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// One anomaly emitted by a detection rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyFinding {
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
    pub related_fields: Vec<String>,
}

impl AnomalyFinding {
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        related_fields: Vec<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            message: message.into(),
            related_fields,
        }
    }
}

/// Advisory risk opinion from the external language-model collaborator.
/// Never authoritative alone — the aggregator caps its influence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelOpinion {
    /// Risk hint in [0, 100]. Out-of-range values are clamped at use.
    pub risk_hint: f64,
    pub narrative: String,
}

/// Final risk classification derived from the aggregate score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskTier {
    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
            RiskTier::Critical => "critical",
        }
    }
}

/// The complete result of one analysis run. Assembled once by the
/// orchestrator, immutable thereafter, serializable for the dashboard
/// and persistence collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskReport {
    pub document_id: DocumentId,
    pub score: u8,
    pub tier: RiskTier,
    pub verdicts: Vec<ValidationVerdict>,
    pub findings: Vec<AnomalyFinding>,
    pub model_opinion: Option<ModelOpinion>,
    pub generated_at: DateTime<Utc>,
}

impl RiskReport {
    pub fn valid_field_count(&self) -> usize {
        self.verdicts.iter().filter(|v| v.is_valid).count()
    }

    pub fn invalid_field_count(&self) -> usize {
        self.verdicts.iter().filter(|v| !v.is_valid).count()
    }
}
