//! Line-item pricing.
//!
//! All arithmetic is done on [`Decimal`]. Each line is rounded to cents with
//! [`RoundingStrategy::MidpointAwayFromZero`], and the grand total is the
//! rounded sum of those already-rounded line totals.
//!
//! Amounts beyond the `Decimal` range saturate at [`Decimal::MAX`] instead of
//! panicking. `validate_request` rejects such items before they are priced.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::quote::{Item, LineItemResult};

pub const MONEY_SCALE: u32 = 2;
pub const MONEY_ROUNDING: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingOutcome {
    pub currency: String,
    pub line_items: Vec<LineItemResult>,
    pub grand_total: Decimal,
}

pub trait PricingEngine: Send + Sync {
    fn price(&self, items: &[Item], currency: &str) -> PricingOutcome;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicPricingEngine;

impl PricingEngine for DeterministicPricingEngine {
    fn price(&self, items: &[Item], currency: &str) -> PricingOutcome {
        compute_totals(items, currency)
    }
}

pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, MONEY_ROUNDING)
}

/// `round(unit_cost * (1 + margin_pct / 100) * qty, 2)`, or `None` when the
/// product leaves the `Decimal` range.
pub fn checked_line_total(item: &Item) -> Option<Decimal> {
    let markup = Decimal::ONE.checked_add(item.margin_pct.checked_div(Decimal::ONE_HUNDRED)?)?;
    let total = item.unit_cost.checked_mul(markup)?.checked_mul(Decimal::from(item.qty))?;
    Some(round_money(total))
}

pub fn line_total(item: &Item) -> Decimal {
    checked_line_total(item).unwrap_or(Decimal::MAX)
}

/// Sum of already-rounded line totals, or `None` on overflow.
pub fn checked_grand_total<I>(line_totals: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    line_totals
        .into_iter()
        .try_fold(Decimal::ZERO, |running, total| running.checked_add(total))
        .map(round_money)
}

pub fn compute_totals(items: &[Item], currency: &str) -> PricingOutcome {
    let line_items: Vec<LineItemResult> = items
        .iter()
        .map(|item| LineItemResult {
            sku: item.sku.clone(),
            qty: item.qty,
            unit_cost: item.unit_cost,
            margin_pct: item.margin_pct,
            line_total: line_total(item),
        })
        .collect();

    let grand_total = checked_grand_total(line_items.iter().map(|line| line.line_total))
        .unwrap_or(Decimal::MAX);

    PricingOutcome { currency: currency.to_string(), line_items, grand_total }
}
