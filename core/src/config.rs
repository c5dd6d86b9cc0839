//! Analysis configuration — weights, thresholds, and required-field policy.
//!
//! The config is handed to the orchestrator at construction and is
//! read-only for the process lifetime. Hot reload means building a new
//! analyzer from a new config and swapping the whole thing atomically;
//! nothing here is ever mutated in place.

use crate::{
    error::{AnalysisError, AnalysisResult},
    types::Severity,
};
use serde::{Deserialize, Serialize};

/// Point weight per finding severity. Base score = sum over findings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeverityWeights {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
    pub critical: u32,
}

impl Default for SeverityWeights {
    fn default() -> Self {
        Self {
            low: 5,
            medium: 15,
            high: 30,
            critical: 50,
        }
    }
}

impl SeverityWeights {
    pub fn weight(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Low => self.low,
            Severity::Medium => self.medium,
            Severity::High => self.high,
            Severity::Critical => self.critical,
        }
    }
}

/// Inclusive lower bounds of the MEDIUM, HIGH, and CRITICAL tiers.
/// Scores below `medium` are LOW.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierThresholds {
    pub medium: u8,
    pub high: u8,
    pub critical: u8,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            medium: 25,
            high: 60,
            critical: 85,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub severity_weights: SeverityWeights,

    #[serde(default)]
    pub tier_thresholds: TierThresholds,

    /// Share of the final score taken from the external model opinion,
    /// in [0, 1]. Rule evidence gets the remaining share. Deterministic
    /// findings must dominate, so keep this well below 0.5.
    #[serde(default = "default_model_weight")]
    pub model_weight: f64,

    /// Field names that must be present in the extracted set.
    /// Part of run configuration, not hardcoded per document type.
    pub required_fields: Vec<String>,

    /// Days a date may lie in the future before it is flagged.
    #[serde(default)]
    pub future_tolerance_days: i64,

    /// Dates older than this many years are flagged as implausible.
    #[serde(default = "default_max_age_years")]
    pub max_age_years: i64,

    /// Upper bound on monetary values. `None` disables the check.
    #[serde(default)]
    pub monetary_ceiling: Option<f64>,

    /// Field names recognized as the document's issue/emission date.
    #[serde(default = "default_issue_date_fields")]
    pub issue_date_fields: Vec<String>,

    /// Field names recognized as the due/expiry date.
    #[serde(default = "default_due_date_fields")]
    pub due_date_fields: Vec<String>,
}

fn default_model_weight() -> f64 {
    0.3
}

fn default_max_age_years() -> i64 {
    10
}

fn default_issue_date_fields() -> Vec<String> {
    vec![
        "issue_date".to_string(),
        "emission_date".to_string(),
        "data_emissao".to_string(),
    ]
}

fn default_due_date_fields() -> Vec<String> {
    vec![
        "due_date".to_string(),
        "expiry_date".to_string(),
        "data_vencimento".to_string(),
    ]
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            severity_weights: SeverityWeights::default(),
            tier_thresholds: TierThresholds::default(),
            model_weight: default_model_weight(),
            required_fields: Vec::new(),
            future_tolerance_days: 0,
            max_age_years: default_max_age_years(),
            monetary_ceiling: None,
            issue_date_fields: default_issue_date_fields(),
            due_date_fields: default_due_date_fields(),
        }
    }
}

impl AnalysisConfig {
    /// Load from a JSON file. In tests, use `AnalysisConfig::default()`.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: AnalysisConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Reject malformed configuration before any run starts.
    /// A fault here is the only error allowed to prevent report production.
    pub fn validate(&self) -> AnalysisResult<()> {
        if !(0.0..=1.0).contains(&self.model_weight) {
            return Err(AnalysisError::config(format!(
                "model_weight {} outside [0, 1]",
                self.model_weight
            )));
        }
        let w = &self.severity_weights;
        if w.low > w.medium || w.medium > w.high || w.high > w.critical {
            return Err(AnalysisError::config(
                "severity weights must be non-decreasing low <= medium <= high <= critical",
            ));
        }
        if w.critical == 0 {
            return Err(AnalysisError::config("critical severity weight must be > 0"));
        }
        let t = &self.tier_thresholds;
        if !(t.medium < t.high && t.high < t.critical) {
            return Err(AnalysisError::config(
                "tier thresholds must be strictly increasing medium < high < critical",
            ));
        }
        if t.critical > 100 {
            return Err(AnalysisError::config(format!(
                "critical tier threshold {} exceeds the 0-100 score scale",
                t.critical
            )));
        }
        if self.future_tolerance_days < 0 {
            return Err(AnalysisError::config("future_tolerance_days must be >= 0"));
        }
        if self.max_age_years <= 0 {
            return Err(AnalysisError::config("max_age_years must be > 0"));
        }
        if let Some(ceiling) = self.monetary_ceiling {
            if !ceiling.is_finite() || ceiling <= 0.0 {
                return Err(AnalysisError::config(format!(
                    "monetary_ceiling {ceiling} must be a finite positive value"
                )));
            }
        }
        if self.required_fields.iter().any(|f| f.trim().is_empty()) {
            return Err(AnalysisError::config("required_fields contains a blank name"));
        }
        Ok(())
    }
}
