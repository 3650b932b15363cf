//! HTTP server exposing the comparison endpoint

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

use triptych_core::compare::{CallOverrides, CompareOverrides, ProviderSet};

/// Shared state for all request handlers
#[derive(Clone)]
pub struct AppState {
    pub providers: Arc<ProviderSet>,
}

/// The comparison HTTP server
pub struct Server {
    state: AppState,
    bind: SocketAddr,
}

impl Server {
    pub fn new(bind: SocketAddr, providers: Arc<ProviderSet>) -> Self {
        Self {
            state: AppState { providers },
            bind,
        }
    }

    /// Build the Axum router
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/compare", post(compare_handler))
            .route("/health", get(health_handler))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Start the server (blocks until shutdown)
    pub async fn run(self) -> anyhow::Result<()> {
        let router = self.router();
        let listener = tokio::net::TcpListener::bind(self.bind).await?;
        info!("triptych listening on http://{}", self.bind);

        axum::serve(listener, router).await?;
        Ok(())
    }
}

/// Request body for `POST /api/compare`.
///
/// The original callers send a flat camelCase object; any non-string field
/// value is treated as absent rather than rejected, so a malformed key
/// surfaces as that provider's missing-credential outcome instead of a
/// request-level error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompareBody {
    #[serde(deserialize_with = "lenient_string")]
    pub prompt: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub openai_key: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub openai_model: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub deepseek_key: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub deepseek_model: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub gemini_key: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub gemini_model: Option<String>,
}

impl CompareBody {
    fn into_parts(self) -> (Option<String>, CompareOverrides) {
        let overrides = CompareOverrides {
            openai: CallOverrides {
                api_key: self.openai_key,
                model: self.openai_model,
            },
            deepseek: CallOverrides {
                api_key: self.deepseek_key,
                model: self.deepseek_model,
            },
            gemini: CallOverrides {
                api_key: self.gemini_key,
                model: self.gemini_model,
            },
        };
        (self.prompt, overrides)
    }
}

/// Accept any JSON value, keeping only strings
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_owned))
}

// ── HTTP handlers ──

async fn compare_handler(State(state): State<AppState>, Json(body): Json<CompareBody>) -> Response {
    let (prompt, overrides) = body.into_parts();
    let prompt = prompt.unwrap_or_default();
    debug!("compare request: prompt_len={}", prompt.len());

    match state.providers.compare(&prompt, &overrides).await {
        Ok(comparison) => Json(comparison).into_response(),
        Err(err) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": err.to_string()})),
        )
            .into_response(),
    }
}

async fn health_handler() -> Json<Value> {
    Json(json!({"ok": true}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;
    use triptych_core::providers::{Completion, ProviderError, ProviderId, TextProvider};

    /// Mock provider that returns a fixed completion and counts calls
    struct FixedProvider {
        id: ProviderId,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TextProvider for FixedProvider {
        fn id(&self) -> ProviderId {
            self.id
        }
        fn display_name(&self) -> &str {
            self.id.display_name()
        }
        async fn generate(
            &self,
            _api_key: Option<&str>,
            _model: Option<&str>,
            _prompt: &str,
        ) -> Result<Completion, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Completion {
                text: "hello".to_string(),
                usage: Some(json!({"totalTokenCount": 5})),
            })
        }
    }

    fn test_server() -> (Server, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let set = ProviderSet::new(
            Box::new(FixedProvider {
                id: ProviderId::Openai,
                calls: calls.clone(),
            }),
            Box::new(FixedProvider {
                id: ProviderId::Deepseek,
                calls: calls.clone(),
            }),
            Box::new(FixedProvider {
                id: ProviderId::Gemini,
                calls: calls.clone(),
            }),
        );
        let server = Server::new(
            "127.0.0.1:0".parse().unwrap(),
            Arc::new(set),
        );
        (server, calls)
    }

    fn compare_request(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/compare")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (server, _) = test_server();
        let response = server
            .router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_compare_success_has_all_three_outcomes() {
        let (server, _) = test_server();
        let response = server
            .router()
            .oneshot(compare_request(json!({"prompt": "hi"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        for key in ["openai", "deepseek", "gemini"] {
            assert_eq!(body[key]["ok"], json!(true), "missing outcome for {}", key);
            assert_eq!(body[key]["text"], json!("hello"));
            assert_eq!(body[key]["usage"]["totalTokenCount"], json!(5));
        }
    }

    #[tokio::test]
    async fn test_compare_missing_prompt() {
        let (server, calls) = test_server();
        let response = server
            .router()
            .oneshot(compare_request(json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({"error": "Missing prompt"}));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_compare_blank_prompt() {
        let (server, calls) = test_server();
        let response = server
            .router()
            .oneshot(compare_request(json!({"prompt": "   "})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_compare_non_string_prompt() {
        let (server, calls) = test_server();
        let response = server
            .router()
            .oneshot(compare_request(json!({"prompt": 42})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({"error": "Missing prompt"}));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_body_camel_case_mapping() {
        let body: CompareBody = serde_json::from_value(json!({
            "prompt": "hi",
            "openaiKey": "sk-a",
            "openaiModel": "gpt-4o",
            "deepseekKey": "sk-b",
            "geminiModel": "gemini-1.5-pro"
        }))
        .unwrap();

        let (prompt, overrides) = body.into_parts();
        assert_eq!(prompt.as_deref(), Some("hi"));
        assert_eq!(overrides.openai.api_key.as_deref(), Some("sk-a"));
        assert_eq!(overrides.openai.model.as_deref(), Some("gpt-4o"));
        assert_eq!(overrides.deepseek.api_key.as_deref(), Some("sk-b"));
        assert_eq!(overrides.deepseek.model, None);
        assert_eq!(overrides.gemini.api_key, None);
        assert_eq!(overrides.gemini.model.as_deref(), Some("gemini-1.5-pro"));
    }

    #[test]
    fn test_body_non_string_fields_treated_as_absent() {
        let body: CompareBody = serde_json::from_value(json!({
            "prompt": "hi",
            "openaiKey": 123,
            "geminiKey": null
        }))
        .unwrap();

        let (_, overrides) = body.into_parts();
        assert_eq!(overrides.openai.api_key, None);
        assert_eq!(overrides.gemini.api_key, None);
    }
}
