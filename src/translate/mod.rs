pub mod openai;

pub use openai::{OpenAiConfig, OpenAiTranslator};

use async_trait::async_trait;
use thiserror::Error;

const PREVIEW_CHARS: usize = 100;

/// Instruction sent ahead of every piece of captured text.
pub const SYSTEM_PROMPT: &str = "You are a professional translator. Translate the following text into natural, academic, and fluent English. Output ONLY the translation results.";

/// Why the remote call did not produce a translation.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Authentication error ({status}): {message}")]
    Authentication { status: u16, message: String },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout")]
    Timeout,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// A failed translation of one piece of text. Carries enough of the input to
/// be diagnosed from the log alone.
#[derive(Debug, Error)]
#[error("Translation failed for text ({length} chars): {preview}")]
pub struct TranslateError {
    pub length: usize,
    pub preview: String,
    #[source]
    pub cause: ProviderError,
}

impl TranslateError {
    pub fn new(text: &str, cause: ProviderError) -> Self {
        Self {
            length: text.chars().count(),
            preview: preview(text),
            cause,
        }
    }
}

/// First 100 characters of `text`, with `...` appended when cut.
pub fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// The API key held by environment variable `var`, if set and not blank.
pub fn api_key_from_env(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
}

#[async_trait]
pub trait Translator: Send + Sync {
    /// Translates non-empty `text`; the result is trimmed.
    async fn translate(&self, text: &str) -> Result<String, TranslateError>;
}
