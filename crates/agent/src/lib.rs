//! Draft generation for priced quotations.
//!
//! This crate turns a priced quote into an email draft the sales team can
//! review before sending. Two strategies exist:
//! - **Local template** (`templates`) - deterministic Tera templates in
//!   English and Arabic, used whenever no provider credential is configured.
//! - **Remote provider** (`llm`) - an OpenAI-compatible chat-completion call
//!   that writes the email from the serialized quote.
//!
//! `DraftGenerator` (see `draft`) picks one of the two once, at construction.
//!
//! # Safety Principle
//!
//! The LLM only writes prose. Totals are computed by the deterministic
//! pricing engine in `quotedraft-core` before the provider ever sees them.

pub mod draft;
pub mod llm;
pub mod prompts;
pub mod templates;

pub use draft::{DraftError, DraftGenerator, DraftStrategy};
pub use llm::{ChatCompletionClient, ChatMessage, LlmClient, LlmError, ProviderSettings};
