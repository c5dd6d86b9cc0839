//! Risk aggregation — findings plus an optional model opinion become one
//! bounded score and a tier.
//!
//! The function is deterministic and idempotent: the same findings and
//! opinion always produce the same (score, tier), and adding a finding
//! never decreases the score.

use crate::{
    config::AnalysisConfig,
    types::{AnomalyFinding, ModelOpinion, RiskTier},
};

/// Combine findings and an optional advisory opinion into a final score.
///
/// Base score is the severity-weighted sum over findings, capped at 100
/// before blending. The model opinion is blended in at the configured
/// weight so a single inflated external judgment cannot flip the tier
/// when rule evidence disagrees strongly.
pub fn aggregate(
    findings: &[AnomalyFinding],
    opinion: Option<&ModelOpinion>,
    config: &AnalysisConfig,
) -> (u8, RiskTier) {
    let base: u32 = findings
        .iter()
        .map(|f| config.severity_weights.weight(f.severity))
        .sum();
    let base = base.min(100) as f64;

    let final_score = match opinion {
        Some(op) => {
            // Untrusted advisory input: clamp the hint before use.
            let hint = op.risk_hint.clamp(0.0, 100.0);
            let rule_weight = 1.0 - config.model_weight;
            (rule_weight * base + config.model_weight * hint).round()
        }
        None => base,
    };
    let score = final_score.clamp(0.0, 100.0) as u8;

    (score, tier_for(score, config))
}

/// Map a score to its tier using the configured inclusive lower bounds.
pub fn tier_for(score: u8, config: &AnalysisConfig) -> RiskTier {
    let t = &config.tier_thresholds;
    if score >= t.critical {
        RiskTier::Critical
    } else if score >= t.high {
        RiskTier::High
    } else if score >= t.medium {
        RiskTier::Medium
    } else {
        RiskTier::Low
    }
}
