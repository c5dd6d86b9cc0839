//! Risk aggregation tests: the literal scoring scenarios plus the
//! determinism, monotonicity, and clamping properties.

use docrisk_core::{
    aggregator,
    config::AnalysisConfig,
    types::{AnomalyFinding, ModelOpinion, RiskTier, Severity},
};

fn finding(severity: Severity) -> AnomalyFinding {
    AnomalyFinding::new("test_rule", severity, "test finding", Vec::new())
}

fn opinion(risk_hint: f64) -> ModelOpinion {
    ModelOpinion {
        risk_hint,
        narrative: "advisory narrative".to_string(),
    }
}

#[test]
fn empty_input_scores_zero_low() {
    let (score, tier) = aggregator::aggregate(&[], None, &AnalysisConfig::default());
    assert_eq!(score, 0);
    assert_eq!(tier, RiskTier::Low);
}

#[test]
fn two_high_findings_hit_the_high_tier_boundary() {
    let findings = vec![finding(Severity::High), finding(Severity::High)];
    let (score, tier) = aggregator::aggregate(&findings, None, &AnalysisConfig::default());
    assert_eq!(score, 60);
    assert_eq!(tier, RiskTier::High);
}

#[test]
fn base_60_blended_with_hint_90_gives_69_high() {
    let findings = vec![finding(Severity::High), finding(Severity::High)];
    let (score, tier) = aggregator::aggregate(
        &findings,
        Some(&opinion(90.0)),
        &AnalysisConfig::default(),
    );
    // round(0.7 * 60 + 0.3 * 90) = 69
    assert_eq!(score, 69);
    assert_eq!(tier, RiskTier::High);
}

#[test]
fn total_weight_at_or_above_85_is_critical() {
    let config = AnalysisConfig::default();
    let exactly_85 = vec![
        finding(Severity::Critical),
        finding(Severity::High),
        finding(Severity::Low),
    ];
    let (score, tier) = aggregator::aggregate(&exactly_85, None, &config);
    assert_eq!(score, 85);
    assert_eq!(tier, RiskTier::Critical);

    let well_over = vec![finding(Severity::Critical); 5];
    let (score, tier) = aggregator::aggregate(&well_over, None, &config);
    assert_eq!(score, 100, "base score must cap at 100");
    assert_eq!(tier, RiskTier::Critical);
}

#[test]
fn aggregation_is_idempotent() {
    let findings = vec![
        finding(Severity::Medium),
        finding(Severity::High),
        finding(Severity::Low),
    ];
    let config = AnalysisConfig::default();
    let op = opinion(42.0);
    let first = aggregator::aggregate(&findings, Some(&op), &config);
    let second = aggregator::aggregate(&findings, Some(&op), &config);
    assert_eq!(first, second);
}

#[test]
fn adding_a_finding_never_decreases_the_score() {
    let config = AnalysisConfig::default();
    let severities = [
        Severity::Low,
        Severity::Critical,
        Severity::Medium,
        Severity::High,
        Severity::Low,
        Severity::Critical,
    ];
    let mut findings = Vec::new();
    let mut previous = 0u8;
    for severity in severities {
        findings.push(finding(severity));
        let (score, _) = aggregator::aggregate(&findings, None, &config);
        assert!(score >= previous, "score dropped from {previous} to {score}");
        previous = score;
    }
}

#[test]
fn out_of_range_hint_is_clamped_before_blending() {
    let findings = vec![finding(Severity::High), finding(Severity::High)];
    let config = AnalysisConfig::default();

    let (inflated, _) = aggregator::aggregate(&findings, Some(&opinion(400.0)), &config);
    let (at_max, _) = aggregator::aggregate(&findings, Some(&opinion(100.0)), &config);
    assert_eq!(inflated, at_max);

    let (deflated, _) = aggregator::aggregate(&findings, Some(&opinion(-50.0)), &config);
    let (at_min, _) = aggregator::aggregate(&findings, Some(&opinion(0.0)), &config);
    assert_eq!(deflated, at_min);
}

#[test]
fn advisory_opinion_alone_cannot_reach_critical() {
    // Strong model hint with zero rule evidence stays below the
    // critical threshold at the default 0.3 blend weight.
    let (score, tier) = aggregator::aggregate(
        &[],
        Some(&opinion(100.0)),
        &AnalysisConfig::default(),
    );
    assert_eq!(score, 30);
    assert_eq!(tier, RiskTier::Medium);
}

#[test]
fn tier_boundaries_are_inclusive_lower_bounds() {
    let config = AnalysisConfig::default();
    assert_eq!(aggregator::tier_for(0, &config), RiskTier::Low);
    assert_eq!(aggregator::tier_for(24, &config), RiskTier::Low);
    assert_eq!(aggregator::tier_for(25, &config), RiskTier::Medium);
    assert_eq!(aggregator::tier_for(59, &config), RiskTier::Medium);
    assert_eq!(aggregator::tier_for(60, &config), RiskTier::High);
    assert_eq!(aggregator::tier_for(84, &config), RiskTier::High);
    assert_eq!(aggregator::tier_for(85, &config), RiskTier::Critical);
    assert_eq!(aggregator::tier_for(100, &config), RiskTier::Critical);
}

#[test]
fn custom_weights_and_blend_are_honored() {
    let config = AnalysisConfig {
        severity_weights: docrisk_core::config::SeverityWeights {
            low: 1,
            medium: 2,
            high: 10,
            critical: 20,
        },
        model_weight: 0.5,
        ..AnalysisConfig::default()
    };
    let findings = vec![finding(Severity::High), finding(Severity::High)];
    let (score, _) = aggregator::aggregate(&findings, Some(&opinion(40.0)), &config);
    // round(0.5 * 20 + 0.5 * 40) = 30
    assert_eq!(score, 30);
}
