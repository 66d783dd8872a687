//! Cortex completion adapter.
//!
//! Implements the `cdb-core` CompletionClient port over the OpenAI-compatible
//! `chat/completions` and `models` endpoints.

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    StatusCode,
};
use tracing::warn;

use cdb_core::{
    completion::{CompletionClient, CompletionRequest},
    config::{ApiConfig, Settings},
    errors::Error,
    Result,
};

pub mod types;

use types::{ChatCompletionRequest, ChatCompletionResponse, ModelList};

const CONNECTION_PROBE: &str = "Test mesajı";

#[derive(Clone, Debug)]
pub struct CortexClient {
    base_url: String,
    default_model: String,
    max_tokens: u32,
    temperature: f32,
    fallback_models: Vec<String>,
    http: reqwest::Client,
}

impl CortexClient {
    /// One pooled HTTP client with bearer auth and the configured timeout.
    pub fn new(api: &ApiConfig, settings: &Settings) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api.cortex_api_key.trim()))
            .map_err(|_| {
                Error::Config("api.cortexApiKey contains invalid header characters".to_string())
            })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.request_timeout())
            .build()
            .map_err(|e| Error::Config(format!("http client build failed: {e}")))?;

        Ok(Self {
            base_url: api.base_url.trim_end_matches('/').to_string(),
            default_model: settings.default_model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            fallback_models: settings.models.clone(),
            http,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn request(&self, message: &str, system: Option<&str>, model: &str) -> CompletionRequest {
        CompletionRequest {
            message: message.to_string(),
            system: system.map(str::to_string),
            model: model.to_string(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    /// Exactly one POST; no retries.
    async fn complete(&self, req: CompletionRequest) -> Result<String> {
        let body = ChatCompletionRequest {
            model: &req.model,
            messages: req.messages(),
            max_tokens: req.max_tokens,
            temperature: req.temperature,
        };

        let resp = self
            .http
            .post(self.endpoint("chat/completions"))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(model = %req.model, error = %e, "cortex request failed");
                Error::Unexpected
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(
                model = %req.model,
                %status,
                body = %preview(&text),
                "cortex chat rejected"
            );
            return Err(classify_status(status));
        }

        let parsed: ChatCompletionResponse = resp.json().await.map_err(|e| {
            warn!(model = %req.model, error = %e, "cortex chat body unreadable");
            if e.is_decode() {
                Error::MalformedResponse
            } else {
                Error::Unexpected
            }
        })?;

        parsed.into_first_content().ok_or_else(|| {
            warn!(model = %req.model, "cortex chat response has no choices[0].message.content");
            Error::MalformedResponse
        })
    }

    async fn fetch_models(&self) -> std::result::Result<Vec<String>, String> {
        let resp = self
            .http
            .get(self.endpoint("models"))
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(format!("status {status}: {}", preview(&text)));
        }

        let list: ModelList = resp
            .json()
            .await
            .map_err(|e| format!("unexpected body: {e}"))?;

        let ids = list
            .data
            .into_iter()
            .map(|m| m.id)
            .filter(|id| !id.trim().is_empty())
            .collect::<Vec<_>>();
        if ids.is_empty() {
            return Err("empty model list".to_string());
        }
        Ok(ids)
    }
}

#[async_trait]
impl CompletionClient for CortexClient {
    async fn chat(&self, message: &str, model: &str) -> Result<String> {
        self.complete(self.request(message, None, model)).await
    }

    async fn chat_with_system(&self, message: &str, system: &str, model: &str) -> Result<String> {
        self.complete(self.request(message, Some(system), model))
            .await
    }

    /// Fails open: any problem yields the configured catalog instead.
    async fn list_models(&self) -> Vec<String> {
        match self.fetch_models().await {
            Ok(ids) => ids,
            Err(reason) => {
                warn!(%reason, "model catalog unavailable; using configured list");
                self.fallback_models.clone()
            }
        }
    }

    async fn test_connection(&self) -> bool {
        match self.chat(CONNECTION_PROBE, &self.default_model).await {
            Ok(text) => !text.is_empty(),
            Err(e) => {
                warn!(error = %e, "cortex connection test failed");
                false
            }
        }
    }
}

/// Map a non-success HTTP status to the error surfaced to callers.
pub fn classify_status(status: StatusCode) -> Error {
    match status {
        StatusCode::UNAUTHORIZED => Error::InvalidCredentials,
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited,
        s if s.is_server_error() => Error::UpstreamUnavailable,
        _ => Error::Unexpected,
    }
}

fn preview(s: &str) -> String {
    s.chars().take(200).collect()
}
