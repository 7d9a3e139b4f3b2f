use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ClientInfo {
    #[validate(length(min = 1, message = "client name must not be empty"))]
    pub name: String,
    #[validate(email(message = "contact must be an email address"))]
    pub contact: String,
    #[serde(default)]
    pub lang: Language,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Item {
    pub sku: String,
    #[validate(range(min = 1, message = "qty must be greater than zero"))]
    pub qty: u64,
    #[serde(with = "rust_decimal::serde::float")]
    #[validate(custom(function = "positive_amount"))]
    pub unit_cost: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[validate(custom(function = "margin_percentage"))]
    pub margin_pct: Decimal,
}

/// Inbound quotation request as posted by the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct QuoteRequest {
    #[validate(nested)]
    pub client: ClientInfo,
    #[validate(length(min = 1, max = 3, message = "currency must be 1 to 3 characters"))]
    pub currency: String,
    #[validate(length(min = 1, message = "at least one item is required"), nested)]
    pub items: Vec<Item>,
    #[validate(length(min = 1, message = "delivery terms must not be empty"))]
    pub delivery_terms: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl QuoteRequest {
    /// Notes with blank values collapsed to `None`.
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref().filter(|notes| !notes.is_empty())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemResult {
    pub sku: String,
    pub qty: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_cost: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub margin_pct: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub line_total: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteResult {
    pub line_items: Vec<LineItemResult>,
    #[serde(with = "rust_decimal::serde::float")]
    pub grand_total: Decimal,
    pub email_draft: String,
}

/// The request enriched with pricing output; input to draft generation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuoteDraftPayload {
    #[serde(flatten)]
    pub request: QuoteRequest,
    pub line_items: Vec<LineItemResult>,
    #[serde(with = "rust_decimal::serde::float")]
    pub grand_total: Decimal,
}

fn positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_positive() && !value.is_zero() {
        return Ok(());
    }

    let mut error = ValidationError::new("positive");
    error.message = Some("unit_cost must be greater than zero".into());
    Err(error)
}

fn margin_percentage(value: &Decimal) -> Result<(), ValidationError> {
    if *value >= Decimal::ZERO && *value <= Decimal::ONE_HUNDRED {
        return Ok(());
    }

    let mut error = ValidationError::new("range");
    error.message = Some("margin_pct must be within 0..=100".into());
    Err(error)
}
