pub mod quote;
pub mod validation;
