//! Field validators — pure syntactic/semantic checks on single fields.
//!
//! RULES:
//!   - Dispatch is by `FieldType`, matched exhaustively.
//!   - Malformed input is never an error: it always becomes an
//!     `is_valid = false` verdict with a descriptive reason. Malformed
//!     documents are exactly what must be scored, not rejected.
//!   - No validator touches I/O or ambient state; the reference date is
//!     passed in so concurrent runs and tests stay deterministic.

use crate::{
    config::AnalysisConfig,
    types::{ExtractedField, FieldType, ValidationVerdict},
};
use chrono::{Months, NaiveDate};

const CPF_LEN: usize = 11;
const CNPJ_LEN: usize = 14;

/// Date formats accepted for DATE fields, tried in order.
pub const DATE_FORMATS: [&str; 4] = ["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y", "%m/%d/%Y"];

/// Validate one extracted field against its declared type.
pub fn validate(
    field: &ExtractedField,
    today: NaiveDate,
    config: &AnalysisConfig,
) -> ValidationVerdict {
    match field.field_type {
        FieldType::IdentifierCpf => validate_cpf(field),
        FieldType::IdentifierCnpj => validate_cnpj(field),
        FieldType::Date => validate_date(field, today, config),
        FieldType::Monetary => validate_monetary(field, config),
        FieldType::Text => ValidationVerdict::unvalidated(&field.name),
    }
}

/// Keep only ASCII digits. Identifier comparisons work on this form.
pub fn digits_of(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

// ── Identifiers ──────────────────────────────────────────────────────────────

fn validate_cpf(field: &ExtractedField) -> ValidationVerdict {
    let digits = digits_of(&field.raw_value);
    if digits.len() != CPF_LEN {
        return ValidationVerdict::invalid(
            &field.name,
            format!("CPF has {} digits, expected {CPF_LEN}", digits.len()),
        );
    }
    if all_same_digit(&digits) {
        return ValidationVerdict::invalid(&field.name, "CPF with all-identical digits");
    }
    let d: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();

    // Check digit i (i = 9, 10) over the preceding i digits with
    // descending weights (i + 1) down to 2.
    for i in [9usize, 10] {
        let total: u32 = (0..i).map(|j| d[j] * ((i + 1 - j) as u32)).sum();
        let expected = (total * 10 % 11) % 10;
        if d[i] != expected {
            let which = if i == 9 { "first" } else { "second" };
            return ValidationVerdict::invalid(
                &field.name,
                format!("CPF {which} check digit is {}, expected {expected}", d[i]),
            );
        }
    }
    ValidationVerdict::valid(&field.name)
}

const CNPJ_WEIGHTS_FIRST: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_WEIGHTS_SECOND: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

fn validate_cnpj(field: &ExtractedField) -> ValidationVerdict {
    let digits = digits_of(&field.raw_value);
    if digits.len() != CNPJ_LEN {
        return ValidationVerdict::invalid(
            &field.name,
            format!("CNPJ has {} digits, expected {CNPJ_LEN}", digits.len()),
        );
    }
    if all_same_digit(&digits) {
        return ValidationVerdict::invalid(&field.name, "CNPJ with all-identical digits");
    }
    let d: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();

    let first = cnpj_check_digit(&d[..12], &CNPJ_WEIGHTS_FIRST);
    if d[12] != first {
        return ValidationVerdict::invalid(
            &field.name,
            format!("CNPJ first check digit is {}, expected {first}", d[12]),
        );
    }
    let second = cnpj_check_digit(&d[..13], &CNPJ_WEIGHTS_SECOND);
    if d[13] != second {
        return ValidationVerdict::invalid(
            &field.name,
            format!("CNPJ second check digit is {}, expected {second}", d[13]),
        );
    }
    ValidationVerdict::valid(&field.name)
}

fn cnpj_check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let total: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    let rem = total % 11;
    if rem < 2 {
        0
    } else {
        11 - rem
    }
}

fn all_same_digit(digits: &str) -> bool {
    let mut chars = digits.chars();
    match chars.next() {
        Some(first) => chars.all(|c| c == first),
        None => false,
    }
}

// ── Dates ────────────────────────────────────────────────────────────────────

/// Parse a raw date string against the allowed format list.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

fn validate_date(
    field: &ExtractedField,
    today: NaiveDate,
    config: &AnalysisConfig,
) -> ValidationVerdict {
    let date = match parse_date(&field.raw_value) {
        Some(d) => d,
        None => {
            return ValidationVerdict::invalid(
                &field.name,
                format!("unparsable date '{}'", field.raw_value.trim()),
            )
        }
    };

    // Future dates and ancient dates are anomaly signals, not parse
    // errors; the reasons must stay distinguishable.
    let future_limit = today + chrono::Duration::days(config.future_tolerance_days);
    if date > future_limit {
        return ValidationVerdict::invalid(
            &field.name,
            format!("date {date} is in the future (limit {future_limit})"),
        );
    }
    let horizon = today
        .checked_sub_months(Months::new(12 * config.max_age_years as u32))
        .unwrap_or(NaiveDate::MIN);
    if date < horizon {
        return ValidationVerdict::invalid(
            &field.name,
            format!(
                "date {date} is older than the {}-year horizon",
                config.max_age_years
            ),
        );
    }
    ValidationVerdict::valid(&field.name)
}

// ── Monetary values ──────────────────────────────────────────────────────────

/// Parse a monetary string accepting both comma and dot separators,
/// with optional currency prefix and thousands grouping.
/// Returns `None` for non-numeric content.
pub fn parse_monetary(raw: &str) -> Option<f64> {
    let mut s = raw.trim().to_string();
    for prefix in ["R$", "US$", "$"] {
        if let Some(rest) = s.strip_prefix(prefix) {
            s = rest.trim_start().to_string();
            break;
        }
    }
    if s.is_empty() {
        return None;
    }

    // When both separators appear, the last one is the decimal mark and
    // the other is grouping ("1.234,56" and "1,234.56" both parse).
    let last_comma = s.rfind(',');
    let last_dot = s.rfind('.');
    let normalized = match (last_comma, last_dot) {
        (Some(c), Some(d)) if c > d => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (Some(_), None) => s.replace(',', "."),
        _ => s,
    };

    let value: f64 = normalized.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(value)
}

fn validate_monetary(field: &ExtractedField, config: &AnalysisConfig) -> ValidationVerdict {
    let value = match parse_monetary(&field.raw_value) {
        Some(v) => v,
        None => {
            return ValidationVerdict::invalid(
                &field.name,
                format!("non-numeric monetary value '{}'", field.raw_value.trim()),
            )
        }
    };
    if value < 0.0 {
        return ValidationVerdict::invalid(&field.name, format!("negative amount {value}"));
    }
    if let Some(ceiling) = config.monetary_ceiling {
        if value > ceiling {
            return ValidationVerdict::invalid(
                &field.name,
                format!("amount {value} exceeds the configured ceiling {ceiling}"),
            );
        }
    }
    ValidationVerdict::valid(&field.name)
}
