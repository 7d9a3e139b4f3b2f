pub mod config;
pub mod domain;
pub mod errors;
pub mod pricing;

pub use domain::quote::{
    ClientInfo, Item, Language, LineItemResult, QuoteDraftPayload, QuoteRequest, QuoteResult,
};
pub use domain::validation::{validate_request, FieldViolation};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use pricing::{compute_totals, DeterministicPricingEngine, PricingEngine, PricingOutcome};
