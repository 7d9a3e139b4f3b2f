use std::sync::Arc;

use quotedraft_core::config::LlmConfig;
use quotedraft_core::QuoteDraftPayload;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::info;

use crate::llm::{ChatCompletionClient, LlmClient, LlmError};
use crate::prompts::draft_messages;
use crate::templates::TemplateDrafter;

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("template rendering failed: {0}")]
    Template(#[from] tera::Error),
    #[error("could not serialize draft payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error(transparent)]
    Provider(#[from] LlmError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DraftStrategy {
    LocalTemplate,
    RemoteProvider,
}

impl DraftStrategy {
    /// Remote drafting needs a non-blank credential and offline mode off.
    pub fn resolve(credential: Option<&SecretString>, offline: bool) -> Self {
        let has_credential =
            credential.map(|key| !key.expose_secret().trim().is_empty()).unwrap_or(false);
        if has_credential && !offline {
            Self::RemoteProvider
        } else {
            Self::LocalTemplate
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LocalTemplate => "template",
            Self::RemoteProvider => "remote",
        }
    }
}

pub enum DraftGenerator {
    LocalTemplate(TemplateDrafter),
    RemoteProvider(Arc<dyn LlmClient>),
}

impl DraftGenerator {
    pub fn local() -> Result<Self, DraftError> {
        Ok(Self::LocalTemplate(TemplateDrafter::new()?))
    }

    pub fn remote(client: Arc<dyn LlmClient>) -> Self {
        Self::RemoteProvider(client)
    }

    /// Builds the generator for an already resolved strategy. The client is
    /// only retained for [`DraftStrategy::RemoteProvider`].
    pub fn with_client(
        strategy: DraftStrategy,
        client: Arc<dyn LlmClient>,
    ) -> Result<Self, DraftError> {
        match strategy {
            DraftStrategy::LocalTemplate => Self::local(),
            DraftStrategy::RemoteProvider => Ok(Self::remote(client)),
        }
    }

    pub fn from_config(llm: &LlmConfig) -> Result<Self, DraftError> {
        let strategy = DraftStrategy::resolve(llm.credential(), llm.offline);
        let generator = match strategy {
            DraftStrategy::LocalTemplate => Self::local()?,
            DraftStrategy::RemoteProvider => {
                Self::remote(Arc::new(ChatCompletionClient::from_config(llm)?))
            }
        };

        info!(
            event_name = "agent.draft.strategy_selected",
            strategy = strategy.as_str(),
            model = %llm.model,
            "draft generator initialized"
        );
        Ok(generator)
    }

    pub fn strategy(&self) -> DraftStrategy {
        match self {
            Self::LocalTemplate(_) => DraftStrategy::LocalTemplate,
            Self::RemoteProvider(_) => DraftStrategy::RemoteProvider,
        }
    }

    pub async fn generate(&self, payload: &QuoteDraftPayload) -> Result<String, DraftError> {
        match self {
            Self::LocalTemplate(drafter) => Ok(drafter.render(payload)?),
            Self::RemoteProvider(client) => {
                let messages = draft_messages(payload)?;
                Ok(client.complete(&messages).await?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use quotedraft_core::config::AppConfig;
    use quotedraft_core::{
        compute_totals, ClientInfo, Item, Language, QuoteDraftPayload, QuoteRequest,
    };
    use rust_decimal::Decimal;
    use secrecy::SecretString;

    use super::{DraftError, DraftGenerator, DraftStrategy};
    use crate::llm::{ChatMessage, LlmClient, LlmError};

    #[derive(Default)]
    struct RecordingClient {
        calls: AtomicUsize,
        last_messages: Mutex<Vec<ChatMessage>>,
        fail_with_status: Option<u16>,
    }

    #[async_trait]
    impl LlmClient for RecordingClient {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut last) = self.last_messages.lock() {
                *last = messages.to_vec();
            }
            match self.fail_with_status {
                Some(status) => {
                    Err(LlmError::Status { status, body: "upstream down".to_string() })
                }
                None => Ok("Dear Gulf Eng., remote draft".to_string()),
            }
        }
    }

    fn payload() -> QuoteDraftPayload {
        let request = QuoteRequest {
            client: ClientInfo {
                name: "Gulf Eng.".to_string(),
                contact: "omar@client.com".to_string(),
                lang: Language::En,
            },
            currency: "SAR".to_string(),
            items: vec![Item {
                sku: "ALR-OBL-12V".to_string(),
                qty: 40,
                unit_cost: Decimal::new(955, 1),
                margin_pct: Decimal::from(18),
            }],
            delivery_terms: "DAP Dammam, 4 weeks".to_string(),
            notes: Some("Client asked for spec compliance with Tarsheed.".to_string()),
        };
        let pricing = compute_totals(&request.items, &request.currency);
        QuoteDraftPayload {
            request,
            line_items: pricing.line_items,
            grand_total: pricing.grand_total,
        }
    }

    fn key(value: &str) -> SecretString {
        value.to_string().into()
    }

    #[test]
    fn strategy_resolution_requires_a_usable_credential() {
        assert_eq!(DraftStrategy::resolve(None, false), DraftStrategy::LocalTemplate);
        assert_eq!(DraftStrategy::resolve(Some(&key("  ")), false), DraftStrategy::LocalTemplate);
        assert_eq!(DraftStrategy::resolve(Some(&key("gsk")), true), DraftStrategy::LocalTemplate);
        assert_eq!(DraftStrategy::resolve(Some(&key("gsk")), false), DraftStrategy::RemoteProvider);
    }

    #[tokio::test]
    async fn missing_credential_never_calls_the_provider() {
        let client = Arc::new(RecordingClient::default());
        let generator =
            DraftGenerator::with_client(DraftStrategy::resolve(None, false), client.clone())
                .expect("generator builds");

        let draft = generator.generate(&payload()).await.expect("template draft");

        assert_eq!(generator.strategy(), DraftStrategy::LocalTemplate);
        assert!(draft.contains("Dear Gulf Eng."));
        assert!(draft.contains("Grand Total: 4507.6 SAR"));
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn credential_routes_to_the_provider_once() {
        let client = Arc::new(RecordingClient::default());
        let generator = DraftGenerator::with_client(
            DraftStrategy::resolve(Some(&key("gsk-test")), false),
            client.clone(),
        )
        .expect("generator builds");

        let draft = generator.generate(&payload()).await.expect("remote draft");

        assert_eq!(draft, "Dear Gulf Eng., remote draft");
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        let messages = client.last_messages.lock().expect("lock").clone();
        assert_eq!(messages[0].role, "system");
        assert!(messages[1].content.contains("\"grand_total\":4507.6"));
    }

    #[tokio::test]
    async fn provider_failure_is_not_degraded_to_the_template() {
        let client =
            Arc::new(RecordingClient { fail_with_status: Some(503), ..RecordingClient::default() });
        let generator = DraftGenerator::remote(client.clone());

        let error = generator.generate(&payload()).await.expect_err("provider failure surfaces");

        assert!(matches!(error, DraftError::Provider(LlmError::Status { status: 503, .. })));
        assert!(error.to_string().contains("HTTP 503"));
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn default_config_builds_a_local_generator() {
        let generator =
            DraftGenerator::from_config(&AppConfig::default().llm).expect("generator builds");
        assert_eq!(generator.strategy(), DraftStrategy::LocalTemplate);
    }

    #[test]
    fn configured_credential_builds_a_remote_generator() {
        let mut config = AppConfig::default();
        config.llm.api_key = Some(key("gsk-test"));

        let generator = DraftGenerator::from_config(&config.llm).expect("generator builds");
        assert_eq!(generator.strategy(), DraftStrategy::RemoteProvider);
    }
}
