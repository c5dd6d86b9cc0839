//! Anomaly rules engine — a registry of independent detection rules.
//!
//! RULES:
//!   - Every rule implements `AnomalyRule`.
//!   - Rules are pure functions over (fields, verdicts, config); no rule
//!     reads another rule's output or any mutable state.
//!   - The engine runs every registered rule and concatenates results in
//!     registration order. Rules are addable/removable by id without
//!     touching each other.

use crate::{
    config::AnalysisConfig,
    types::{AnomalyFinding, ExtractedField, FieldType, Severity, ValidationVerdict},
    validators,
};
use std::collections::HashMap;

/// Everything a rule may inspect during one run.
pub struct RuleContext<'a> {
    pub fields: &'a [ExtractedField],
    pub verdicts: &'a [ValidationVerdict],
    pub config: &'a AnalysisConfig,
}

impl<'a> RuleContext<'a> {
    pub fn field(&self, name: &str) -> Option<&ExtractedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// First field whose name appears in `names`, in `names` order.
    pub fn first_named(&self, names: &[String]) -> Option<&ExtractedField> {
        names.iter().find_map(|n| self.field(n))
    }
}

/// The contract every detection rule must fulfill.
pub trait AnomalyRule: Send + Sync {
    /// Unique stable identifier, used in findings and for removal.
    fn rule_id(&self) -> &'static str;

    /// Inspect the full input and emit zero or more findings.
    fn detect(&self, ctx: &RuleContext<'_>) -> Vec<AnomalyFinding>;
}

/// Ordered registry of rules, keyed by rule id.
/// Assembled at startup, immutable once handed to the analyzer.
pub struct RuleRegistry {
    rules: Vec<Box<dyn AnomalyRule>>,
}

impl RuleRegistry {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// The minimum required rule set.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(InvalidFieldRule));
        registry.register(Box::new(DateOrderRule));
        registry.register(Box::new(DuplicateIdentifierRule));
        registry.register(Box::new(ZeroAmountRule));
        registry.register(Box::new(MissingRequiredFieldRule));
        registry
    }

    /// Register a rule. A rule with the same id is replaced in place.
    pub fn register(&mut self, rule: Box<dyn AnomalyRule>) {
        if let Some(existing) = self
            .rules
            .iter_mut()
            .find(|r| r.rule_id() == rule.rule_id())
        {
            *existing = rule;
        } else {
            self.rules.push(rule);
        }
    }

    /// Remove a rule by id. Returns whether anything was removed.
    pub fn remove(&mut self, rule_id: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|r| r.rule_id() != rule_id);
        self.rules.len() != before
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn AnomalyRule> {
        self.rules.iter().map(|r| r.as_ref())
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

// ── Built-in rules ───────────────────────────────────────────────────────────

/// One HIGH finding per validation verdict that failed.
pub struct InvalidFieldRule;

impl AnomalyRule for InvalidFieldRule {
    fn rule_id(&self) -> &'static str {
        "invalid_field"
    }

    fn detect(&self, ctx: &RuleContext<'_>) -> Vec<AnomalyFinding> {
        ctx.verdicts
            .iter()
            .filter(|v| !v.is_valid)
            .map(|v| {
                let reason = v.reason.as_deref().unwrap_or("validation failed");
                AnomalyFinding::new(
                    self.rule_id(),
                    Severity::High,
                    format!("field '{}' failed validation: {reason}", v.field_name),
                    vec![v.field_name.clone()],
                )
            })
            .collect()
    }
}

/// MEDIUM when the due/expiry date precedes the issue date.
pub struct DateOrderRule;

impl AnomalyRule for DateOrderRule {
    fn rule_id(&self) -> &'static str {
        "date_order"
    }

    fn detect(&self, ctx: &RuleContext<'_>) -> Vec<AnomalyFinding> {
        let issue = ctx.first_named(&ctx.config.issue_date_fields);
        let due = ctx.first_named(&ctx.config.due_date_fields);
        let (issue, due) = match (issue, due) {
            (Some(i), Some(d)) => (i, d),
            _ => return Vec::new(),
        };
        let issue_date = validators::parse_date(&issue.raw_value);
        let due_date = validators::parse_date(&due.raw_value);
        match (issue_date, due_date) {
            (Some(i), Some(d)) if d < i => vec![AnomalyFinding::new(
                self.rule_id(),
                Severity::Medium,
                format!("due date {d} precedes issue date {i}"),
                vec![issue.name.clone(), due.name.clone()],
            )],
            _ => Vec::new(),
        }
    }
}

/// HIGH when one identifier value appears under two distinct roles,
/// e.g. the same CPF as both payer and payee.
pub struct DuplicateIdentifierRule;

impl AnomalyRule for DuplicateIdentifierRule {
    fn rule_id(&self) -> &'static str {
        "duplicate_identifier"
    }

    fn detect(&self, ctx: &RuleContext<'_>) -> Vec<AnomalyFinding> {
        let mut seen: HashMap<String, &ExtractedField> = HashMap::new();
        let mut findings = Vec::new();

        for field in ctx.fields.iter().filter(|f| {
            matches!(
                f.field_type,
                FieldType::IdentifierCpf | FieldType::IdentifierCnpj
            )
        }) {
            let normalized = validators::digits_of(&field.raw_value);
            if normalized.is_empty() {
                continue;
            }
            match seen.get(&normalized) {
                Some(first) if first.name != field.name => {
                    findings.push(AnomalyFinding::new(
                        self.rule_id(),
                        Severity::High,
                        format!(
                            "identifier '{normalized}' appears as both '{}' and '{}'",
                            first.name, field.name
                        ),
                        vec![first.name.clone(), field.name.clone()],
                    ));
                }
                Some(_) => {}
                None => {
                    seen.insert(normalized, field);
                }
            }
        }
        findings
    }
}

/// LOW when a monetary field is present but zero.
pub struct ZeroAmountRule;

impl AnomalyRule for ZeroAmountRule {
    fn rule_id(&self) -> &'static str {
        "zero_amount"
    }

    fn detect(&self, ctx: &RuleContext<'_>) -> Vec<AnomalyFinding> {
        ctx.fields
            .iter()
            .filter(|f| f.field_type == FieldType::Monetary)
            .filter(|f| validators::parse_monetary(&f.raw_value) == Some(0.0))
            .map(|f| {
                AnomalyFinding::new(
                    self.rule_id(),
                    Severity::Low,
                    format!("monetary field '{}' is zero", f.name),
                    vec![f.name.clone()],
                )
            })
            .collect()
    }
}

/// One CRITICAL per configured required field missing from the set.
pub struct MissingRequiredFieldRule;

impl AnomalyRule for MissingRequiredFieldRule {
    fn rule_id(&self) -> &'static str {
        "missing_required_field"
    }

    fn detect(&self, ctx: &RuleContext<'_>) -> Vec<AnomalyFinding> {
        ctx.config
            .required_fields
            .iter()
            .filter(|required| ctx.field(required).is_none())
            .map(|required| {
                AnomalyFinding::new(
                    self.rule_id(),
                    Severity::Critical,
                    format!("required field '{required}' is missing"),
                    vec![required.clone()],
                )
            })
            .collect()
    }
}
