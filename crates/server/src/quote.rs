//! Quotation endpoint.
//!
//! Endpoints:
//! - `POST /quote` - price the requested items and draft the client email

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use quotedraft_agent::DraftGenerator;
use quotedraft_core::{
    validate_request, ApplicationError, DeterministicPricingEngine, InterfaceError, PricingEngine,
    QuoteDraftPayload, QuoteRequest, QuoteResult,
};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct QuoteState {
    drafter: Arc<DraftGenerator>,
    pricing: Arc<dyn PricingEngine>,
}

impl QuoteState {
    pub fn new(drafter: Arc<DraftGenerator>) -> Self {
        Self { drafter, pricing: Arc::new(DeterministicPricingEngine) }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct QuoteError {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    pub correlation_id: String,
}

type QuoteResponse = Result<Json<QuoteResult>, (StatusCode, Json<QuoteError>)>;

pub fn router(drafter: Arc<DraftGenerator>) -> Router {
    Router::new().route("/quote", post(create_quote)).with_state(QuoteState::new(drafter))
}

pub async fn create_quote(
    State(state): State<QuoteState>,
    body: Result<Json<QuoteRequest>, JsonRejection>,
) -> QuoteResponse {
    let correlation_id = Uuid::new_v4().to_string();

    let Json(request) = body.map_err(|rejection| {
        warn!(
            event_name = "server.quote.rejected_body",
            correlation_id = %correlation_id,
            status = rejection.status().as_u16(),
            error = %rejection.body_text(),
            "quote request body could not be parsed"
        );
        let error = InterfaceError::BadRequest {
            message: rejection.body_text(),
            fields: Vec::new(),
            correlation_id: correlation_id.clone(),
        };
        error_response(error)
    })?;

    if let Err(domain) = validate_request(&request) {
        let error = ApplicationError::from(domain).into_interface(&correlation_id);
        warn!(
            event_name = "server.quote.invalid",
            correlation_id = %correlation_id,
            error = %error,
            "quote request failed validation"
        );
        return Err(error_response(error));
    }

    let outcome = state.pricing.price(&request.items, &request.currency);
    info!(
        event_name = "server.quote.priced",
        correlation_id = %correlation_id,
        line_count = outcome.line_items.len(),
        grand_total = %outcome.grand_total,
        currency = %outcome.currency,
        "quote priced"
    );

    let payload = QuoteDraftPayload {
        request,
        line_items: outcome.line_items,
        grand_total: outcome.grand_total,
    };

    let email_draft = match state.drafter.generate(&payload).await {
        Ok(draft) => draft,
        Err(draft_error) => {
            let error = ApplicationError::Integration(format!(
                "Failed to generate email draft: {draft_error}"
            ))
            .into_interface(&correlation_id);
            error!(
                event_name = "server.quote.draft_failed",
                correlation_id = %correlation_id,
                draft_mode = state.drafter.strategy().as_str(),
                error = %draft_error,
                "email draft generation failed"
            );
            return Err(error_response(error));
        }
    };

    info!(
        event_name = "server.quote.completed",
        correlation_id = %correlation_id,
        draft_mode = state.drafter.strategy().as_str(),
        "quote completed"
    );

    Ok(Json(QuoteResult {
        line_items: payload.line_items,
        grand_total: payload.grand_total,
        email_draft,
    }))
}

fn error_response(error: InterfaceError) -> (StatusCode, Json<QuoteError>) {
    let status = match &error {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::UpstreamFailure { .. } => StatusCode::BAD_GATEWAY,
    };
    let correlation_id = error.correlation_id().to_string();
    let (message, fields) = match error {
        InterfaceError::BadRequest { message, fields, .. } => (message, fields),
        InterfaceError::UpstreamFailure { message, .. } => (message, Vec::new()),
    };

    (status, Json(QuoteError { error: message, fields, correlation_id }))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use quotedraft_agent::{ChatMessage, DraftGenerator, DraftStrategy, LlmClient, LlmError};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::router;

    #[derive(Default)]
    struct CountingClient {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl LlmClient for CountingClient {
        async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(LlmError::Status { status: 503, body: "model overloaded".to_string() })
            } else {
                Ok("Dear Gulf Eng., remote draft".to_string())
            }
        }
    }

    fn local_router() -> Router {
        router(Arc::new(DraftGenerator::local().expect("templates compile")))
    }

    fn reference_request() -> Value {
        json!({
            "client": {"name": "Gulf Eng.", "contact": "omar@client.com", "lang": "en"},
            "currency": "SAR",
            "items": [
                {"sku": "ALR-SL-90W", "qty": 120, "unit_cost": 240.0, "margin_pct": 22},
                {"sku": "ALR-OBL-12V", "qty": 40, "unit_cost": 95.5, "margin_pct": 18}
            ],
            "delivery_terms": "DAP Dammam, 4 weeks",
            "notes": "Client asked for spec compliance with Tarsheed."
        })
    }

    async fn post_quote(router: Router, body: String) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/quote")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .expect("request builds");

        let response = router.oneshot(request).await.expect("router responds");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body reads");
        let body = serde_json::from_slice(&bytes).expect("response is JSON");
        (status, body)
    }

    #[tokio::test]
    async fn reference_quote_is_priced_and_drafted() {
        let (status, body) = post_quote(local_router(), reference_request().to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["line_items"][0]["sku"], "ALR-SL-90W");
        assert_eq!(body["line_items"][0]["line_total"], 35136.0);
        assert_eq!(body["line_items"][1]["sku"], "ALR-OBL-12V");
        assert_eq!(body["line_items"][1]["line_total"], 4507.6);
        assert_eq!(body["grand_total"], 39643.6);

        let draft = body["email_draft"].as_str().expect("draft text");
        assert!(draft.starts_with("Dear Gulf Eng.,"));
        assert!(draft.contains("Grand Total: 39643.6 SAR"));
        assert!(draft.contains("Delivery Terms: DAP Dammam, 4 weeks"));
        assert!(draft.contains("Notes: Client asked for spec compliance with Tarsheed."));
    }

    #[tokio::test]
    async fn draft_total_reads_like_the_json_grand_total() {
        let mut request = reference_request();
        request["items"] = json!([
            {"sku": "ALR-SL-90W", "qty": 120, "unit_cost": 240.0, "margin_pct": 22}
        ]);

        let (status, body) = post_quote(local_router(), request.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["grand_total"], 35136.0);
        let draft = body["email_draft"].as_str().expect("draft text");
        let expected = format!("Grand Total: {} SAR", body["grand_total"]);
        assert_eq!(expected, "Grand Total: 35136.0 SAR");
        assert!(draft.contains(&expected));
    }

    #[tokio::test]
    async fn amounts_beyond_the_decimal_range_are_bad_requests() {
        let mut request = reference_request();
        request["items"] = json!([
            {"sku": "HUGE", "qty": 4_000_000_000u64, "unit_cost": 1.0e20, "margin_pct": 100}
        ]);

        let (status, body) = post_quote(local_router(), request.to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["fields"], json!(["items[0].unit_cost"]));
        assert!(body.get("grand_total").is_none());
    }

    #[tokio::test]
    async fn arabic_client_receives_an_arabic_draft() {
        let mut request = reference_request();
        request["client"]["lang"] = json!("ar");
        request["notes"] = Value::Null;

        let (status, body) = post_quote(local_router(), request.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        let draft = body["email_draft"].as_str().expect("draft text");
        assert!(draft.starts_with("عزيزي Gulf Eng.,"));
        assert!(draft.contains("الإجمالي الكلي: 39643.6 SAR"));
        assert!(!draft.contains("ملاحظة"));
    }

    #[tokio::test]
    async fn empty_items_are_rejected_before_pricing() {
        let mut request = reference_request();
        request["items"] = json!([]);

        let (status, body) = post_quote(local_router(), request.to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["fields"], json!(["items"]));
        assert!(body.get("grand_total").is_none());
        assert!(body.get("line_items").is_none());
        assert!(body["correlation_id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn out_of_range_margin_names_the_offending_field() {
        let mut request = reference_request();
        request["items"][1]["margin_pct"] = json!(120);

        let (status, body) = post_quote(local_router(), request.to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["fields"], json!(["items[1].margin_pct"]));
        assert!(body["error"].as_str().is_some_and(|error| error.contains("items[1].margin_pct")));
    }

    #[tokio::test]
    async fn unparseable_bodies_are_bad_requests() {
        let mut missing_currency = reference_request();
        missing_currency.as_object_mut().expect("object").remove("currency");
        let mut unknown_language = reference_request();
        unknown_language["client"]["lang"] = json!("fr");

        let bodies =
            ["{not json".to_string(), missing_currency.to_string(), unknown_language.to_string()];
        for body in bodies {
            let (status, response) = post_quote(local_router(), body).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(response["error"].as_str().is_some_and(|error| !error.is_empty()));
            assert!(response.get("fields").is_none());
        }
    }

    #[tokio::test]
    async fn provider_failure_maps_to_bad_gateway() {
        let client = Arc::new(CountingClient { fail: true, ..CountingClient::default() });
        let router = router(Arc::new(DraftGenerator::remote(client.clone())));

        let (status, body) = post_quote(router, reference_request().to_string()).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let error = body["error"].as_str().expect("error text");
        assert!(error.starts_with("Failed to generate email draft: "));
        assert!(error.contains("503"));
        assert!(body.get("email_draft").is_none());
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn remote_drafting_returns_the_provider_text() {
        let client = Arc::new(CountingClient::default());
        let router = router(Arc::new(DraftGenerator::remote(client.clone())));

        let (status, body) = post_quote(router, reference_request().to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email_draft"], "Dear Gulf Eng., remote draft");
        assert_eq!(body["grand_total"], 39643.6);
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_credential_makes_no_provider_calls() {
        let client = Arc::new(CountingClient::default());
        let generator =
            DraftGenerator::with_client(DraftStrategy::resolve(None, false), client.clone())
                .expect("generator builds");

        let (status, _) =
            post_quote(router(Arc::new(generator)), reference_request().to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }
}
