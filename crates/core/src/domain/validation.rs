use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::domain::quote::{Item, QuoteRequest};
use crate::errors::DomainError;
use crate::pricing::{checked_grand_total, checked_line_total};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

pub fn validate_request(request: &QuoteRequest) -> Result<(), DomainError> {
    let mut violations = Vec::new();
    if let Err(errors) = request.validate() {
        collect_violations("", &errors, &mut violations);
    }
    collect_amount_range_violations(&request.items, &mut violations);

    if violations.is_empty() {
        return Ok(());
    }
    violations.sort_by(|left, right| left.field.cmp(&right.field));
    Err(DomainError::InvalidRequest { violations })
}

/// Line and grand totals must stay within the `Decimal` range.
fn collect_amount_range_violations(items: &[Item], out: &mut Vec<FieldViolation>) {
    let mut line_totals = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match checked_line_total(item) {
            Some(total) => line_totals.push(total),
            None => out.push(FieldViolation {
                field: format!("items[{index}].unit_cost"),
                message: "line total exceeds the supported amount range".to_string(),
            }),
        }
    }

    if line_totals.len() == items.len() && checked_grand_total(line_totals).is_none() {
        out.push(FieldViolation {
            field: "items".to_string(),
            message: "grand total exceeds the supported amount range".to_string(),
        });
    }
}

fn collect_violations(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldViolation>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() { field.to_string() } else { format!("{prefix}.{field}") };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| format!("failed `{}` check", error.code));
                    out.push(FieldViolation { field: path.clone(), message });
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_violations(&path, nested, out),
            ValidationErrorsKind::List(entries) => {
                for (index, nested) in entries {
                    collect_violations(&format!("{path}[{index}]"), nested, out);
                }
            }
        }
    }
}
