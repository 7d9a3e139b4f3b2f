use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use quotedraft_core::config::{resolve_config_path, AppConfig, ConfigOverrides, LogFormat};
use secrecy::ExposeSecret;
use toml::Value;

use crate::commands::{load_options, CommandResult};

struct ConfigFile {
    path: PathBuf,
    doc: Value,
}

pub fn run(config_path: Option<&Path>) -> CommandResult {
    let config = match AppConfig::load(load_options(config_path, ConfigOverrides::default())) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                2,
            );
        }
    };

    let file = resolve_config_path(config_path).and_then(|path| load_config_file(&path));
    CommandResult::success(render(&config, file.as_ref()))
}

fn render(config: &AppConfig, file: Option<&ConfigFile>) -> String {
    let api_key = config
        .llm
        .api_key
        .as_ref()
        .map(|key| redact_token(key.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());
    let log_format = match config.logging.format {
        LogFormat::Compact => "compact",
        LogFormat::Pretty => "pretty",
        LogFormat::Json => "json",
    };

    let entries: [(&str, String, &[&str]); 11] = [
        ("llm.api_key", api_key, &["QUOTEDRAFT_LLM_API_KEY", "GROQ_API_KEY"]),
        ("llm.base_url", config.llm.base_url.clone(), &["QUOTEDRAFT_LLM_BASE_URL"]),
        ("llm.model", config.llm.model.clone(), &["QUOTEDRAFT_LLM_MODEL"]),
        ("llm.timeout_secs", config.llm.timeout_secs.to_string(), &["QUOTEDRAFT_LLM_TIMEOUT_SECS"]),
        ("llm.offline", config.llm.offline.to_string(), &["QUOTEDRAFT_LLM_OFFLINE"]),
        (
            "server.bind_address",
            config.server.bind_address.clone(),
            &["QUOTEDRAFT_SERVER_BIND_ADDRESS"],
        ),
        ("server.port", config.server.port.to_string(), &["QUOTEDRAFT_SERVER_PORT"]),
        (
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            &["QUOTEDRAFT_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        (
            "logging.level",
            config.logging.level.clone(),
            &["QUOTEDRAFT_LOGGING_LEVEL", "QUOTEDRAFT_LOG_LEVEL"],
        ),
        (
            "logging.format",
            log_format.to_string(),
            &["QUOTEDRAFT_LOGGING_FORMAT", "QUOTEDRAFT_LOG_FORMAT"],
        ),
        ("draft.mode", draft_mode(config).to_string(), &[]),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, value, env_keys) in entries {
        let source = if key == "draft.mode" {
            "derived (llm.api_key, llm.offline)".to_string()
        } else {
            field_source(key, env_keys, file)
        };
        lines.push(render_line(key, &value, source));
    }
    lines.join("\n")
}

fn draft_mode(config: &AppConfig) -> &'static str {
    if config.llm.remote_enabled() {
        "remote"
    } else {
        "template"
    }
}

fn load_config_file(path: &Path) -> Option<ConfigFile> {
    let raw = fs::read_to_string(path).ok()?;
    let doc = raw.parse::<Value>().ok()?;
    Some(ConfigFile { path: path.to_path_buf(), doc })
}

fn field_source(key_path: &str, env_keys: &[&str], file: Option<&ConfigFile>) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(file) = file {
        if contains_path(&file.doc, key_path) {
            return format!("file ({})", file.path.display());
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('_') {
        return format!("{prefix}_***");
    }

    "<redacted>".to_string()
}
