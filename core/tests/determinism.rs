//! Determinism: re-running the same input must yield the identical
//! score, tier, verdicts, and findings. Only `generated_at` may differ.

use docrisk_core::{
    analyzer::DocumentAnalyzer,
    config::AnalysisConfig,
    types::{ExtractedField, FieldType, ModelOpinion},
};

fn suspicious_fields() -> Vec<ExtractedField> {
    vec![
        ExtractedField::new("payer_cpf", "529.982.247-25", FieldType::IdentifierCpf),
        ExtractedField::new("payee_cpf", "52998224725", FieldType::IdentifierCpf),
        ExtractedField::new("issue_date", "10/05/2024", FieldType::Date),
        ExtractedField::new("due_date", "01/05/2024", FieldType::Date),
        ExtractedField::new("total_amount", "0,00", FieldType::Monetary),
        ExtractedField::new("signature", "not a date 12/99", FieldType::Text),
    ]
}

#[test]
fn repeated_runs_produce_identical_results() {
    let config = AnalysisConfig {
        required_fields: vec!["cpf".to_string()],
        ..AnalysisConfig::default()
    };
    let analyzer = DocumentAnalyzer::new(config).unwrap();
    let opinion = ModelOpinion {
        risk_hint: 55.0,
        narrative: "several structural anomalies".to_string(),
    };

    let first = analyzer.analyze("doc-det", suspicious_fields(), Some(opinion.clone()));
    let second = analyzer.analyze("doc-det", suspicious_fields(), Some(opinion));

    assert_eq!(first.score, second.score);
    assert_eq!(first.tier, second.tier);
    assert_eq!(
        serde_json::to_string(&first.verdicts).unwrap(),
        serde_json::to_string(&second.verdicts).unwrap()
    );
    assert_eq!(
        serde_json::to_string(&first.findings).unwrap(),
        serde_json::to_string(&second.findings).unwrap()
    );
}

#[test]
fn findings_keep_registration_order_across_runs() {
    let analyzer = DocumentAnalyzer::new(AnalysisConfig::default()).unwrap();
    let report = analyzer.analyze("doc-order", suspicious_fields(), None);

    let ids: Vec<&str> = report.findings.iter().map(|f| f.rule_id.as_str()).collect();
    // duplicate_identifier precedes zero_amount because the registry
    // runs rules in registration order.
    let dup = ids.iter().position(|id| *id == "duplicate_identifier");
    let zero = ids.iter().position(|id| *id == "zero_amount");
    assert!(dup.is_some() && zero.is_some());
    assert!(dup < zero);
}

#[test]
fn two_analyzers_with_the_same_config_agree() {
    let a = DocumentAnalyzer::new(AnalysisConfig::default()).unwrap();
    let b = DocumentAnalyzer::new(AnalysisConfig::default()).unwrap();

    let ra = a.analyze("doc-agree", suspicious_fields(), None);
    let rb = b.analyze("doc-agree", suspicious_fields(), None);
    assert_eq!(ra.score, rb.score);
    assert_eq!(ra.tier, rb.tier);
    assert_eq!(ra.findings.len(), rb.findings.len());
}
