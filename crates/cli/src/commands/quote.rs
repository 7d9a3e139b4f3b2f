use std::fs;
use std::path::Path;

use quotedraft_agent::DraftGenerator;
use quotedraft_core::config::{AppConfig, ConfigOverrides};
use quotedraft_core::{
    compute_totals, validate_request, QuoteDraftPayload, QuoteRequest, QuoteResult,
};

use crate::commands::{load_options, CommandResult};

const COMMAND: &str = "quote";

pub fn run(file: &Path, offline: bool, config_path: Option<&Path>) -> CommandResult {
    let overrides =
        ConfigOverrides { llm_offline: offline.then_some(true), ..ConfigOverrides::default() };
    let config = match AppConfig::load(load_options(config_path, overrides)) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let raw = match fs::read_to_string(file) {
        Ok(raw) => raw,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "input_read",
                format!("could not read `{}`: {error}", file.display()),
                4,
            );
        }
    };

    let request: QuoteRequest = match serde_json::from_str(&raw) {
        Ok(request) => request,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "input_parse",
                format!("`{}` is not a valid quote request: {error}", file.display()),
                5,
            );
        }
    };

    if let Err(error) = validate_request(&request) {
        return CommandResult::failure(COMMAND, "validation", error.to_string(), 6);
    }

    let pricing = compute_totals(&request.items, &request.currency);
    let payload = QuoteDraftPayload {
        request,
        line_items: pricing.line_items,
        grand_total: pricing.grand_total,
    };

    let generator = match DraftGenerator::from_config(&config.llm) {
        Ok(generator) => generator,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "draft_init",
                format!("draft generator initialization failed: {error}"),
                7,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let email_draft = match runtime.block_on(generator.generate(&payload)) {
        Ok(draft) => draft,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "draft_generation",
                format!("Failed to generate email draft: {error}"),
                8,
            );
        }
    };

    let result = QuoteResult {
        line_items: payload.line_items,
        grand_total: payload.grand_total,
        email_draft,
    };
    match serde_json::to_string_pretty(&result) {
        Ok(output) => CommandResult::success(output),
        Err(error) => CommandResult::failure(COMMAND, "serialization", error.to_string(), 9),
    }
}
