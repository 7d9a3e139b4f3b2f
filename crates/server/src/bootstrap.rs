use std::sync::Arc;

use axum::Router;
use quotedraft_agent::{DraftError, DraftGenerator};
use quotedraft_core::config::AppConfig;
use thiserror::Error;
use tracing::info;

use crate::{health, quote};

pub struct Application {
    pub config: AppConfig,
    pub drafter: Arc<DraftGenerator>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("draft generator initialization failed: {0}")]
    Drafter(#[source] DraftError),
}

pub fn bootstrap(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let drafter = DraftGenerator::from_config(&config.llm).map_err(BootstrapError::Drafter)?;
    info!(
        event_name = "system.bootstrap.drafter_ready",
        correlation_id = "bootstrap",
        draft_mode = drafter.strategy().as_str(),
        "draft generator ready"
    );

    Ok(Application { config, drafter: Arc::new(drafter) })
}

impl Application {
    pub fn router(&self) -> Router {
        quote::router(self.drafter.clone()).merge(health::router(self.drafter.strategy()))
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.config.server.bind_address, self.config.server.port)
    }
}

#[cfg(test)]
mod tests {
    use quotedraft_agent::DraftStrategy;
    use quotedraft_core::config::AppConfig;

    use crate::bootstrap::bootstrap;

    fn config_with_credential() -> AppConfig {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("gsk-test".to_string().into());
        config
    }

    #[test]
    fn bootstrap_defaults_to_template_drafting() {
        let app = bootstrap(AppConfig::default()).expect("bootstrap succeeds");

        assert_eq!(app.drafter.strategy(), DraftStrategy::LocalTemplate);
        assert_eq!(app.listen_address(), "127.0.0.1:8080");
    }

    #[test]
    fn bootstrap_with_credential_selects_remote_drafting() {
        let mut config = config_with_credential();
        config.server.port = 9090;

        let app = bootstrap(config).expect("bootstrap succeeds");

        assert_eq!(app.drafter.strategy(), DraftStrategy::RemoteProvider);
        assert_eq!(app.listen_address(), "127.0.0.1:9090");
    }

    #[test]
    fn offline_setting_keeps_template_drafting_with_a_credential() {
        let mut config = config_with_credential();
        config.llm.offline = true;

        let app = bootstrap(config).expect("bootstrap succeeds");

        assert_eq!(app.drafter.strategy(), DraftStrategy::LocalTemplate);
    }

    #[test]
    fn blank_credential_is_treated_as_absent() {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("   ".to_string().into());

        let app = bootstrap(config).expect("bootstrap succeeds");

        assert_eq!(app.drafter.strategy(), DraftStrategy::LocalTemplate);
    }
}
