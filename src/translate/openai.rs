use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

use super::{ProviderError, TranslateError, Translator, SYSTEM_PROMPT};
use crate::state::TranslationSettings;

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn from_settings(settings: &TranslationSettings, api_key: String) -> Self {
        Self {
            api_key,
            base_url: settings.api_base.clone(),
            model: settings.model.clone(),
            timeout: Duration::from_secs(settings.request_timeout_secs.max(1)),
        }
    }
}

/// Chat-completion client for OpenAI-compatible endpoints.
pub struct OpenAiTranslator {
    config: OpenAiConfig,
    client: reqwest::Client,
}

impl OpenAiTranslator {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("translate-in-place/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { config, client })
    }

    fn build_headers(&self) -> Result<HeaderMap, ProviderError> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", self.config.api_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).map_err(|e| ProviderError::Authentication {
                status: 0,
                message: format!("API key is not a valid header value: {}", e),
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn build_payload(&self, text: &str) -> Value {
        serde_json::json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": text },
            ],
        })
    }

    fn parse_response(body: &Value) -> Result<String, ProviderError> {
        let content = body
            .get("choices")
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                ProviderError::MalformedResponse("no message content in first choice".to_string())
            })?
            .trim();

        if content.is_empty() {
            return Err(ProviderError::MalformedResponse("empty completion".to_string()));
        }
        Ok(content.to_string())
    }

    fn map_error(status: u16, body: &str) -> ProviderError {
        if status == 401 || status == 403 {
            return ProviderError::Authentication {
                status,
                message: body.to_string(),
            };
        }
        ProviderError::Api {
            status,
            message: body.to_string(),
        }
    }

    async fn complete(&self, text: &str) -> Result<String, ProviderError> {
        let headers = self.build_headers()?;
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        tracing::debug!("Sending translation request to model {}", self.config.model);
        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(&self.build_payload(text))
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        let body = response.text().await.map_err(network_error)?;

        if !status.is_success() {
            return Err(Self::map_error(status.as_u16(), &body));
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        let translated = Self::parse_response(&value)?;
        tracing::debug!("Received translated text length: {}", translated.chars().count());
        Ok(translated)
    }
}

fn network_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Network(e.to_string())
    }
}

#[async_trait]
impl Translator for OpenAiTranslator {
    async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        self.complete(text)
            .await
            .map_err(|cause| TranslateError::new(text, cause))
    }
}
