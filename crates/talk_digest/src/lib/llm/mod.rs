//! Pluggable summarization backends.
//!
//! Four LLM-backed variants plus a pass-through "disabled" variant,
//! behind the uniform [`Summarizer`] contract. Selection is a single
//! mapping from a configuration string to a constructor, resolved once
//! at run start; credential presence is checked there, so a missing
//! key fails the run before any talk is processed.

pub mod anthropic;
pub mod gemini;
pub mod ollama;
pub mod openai;
pub mod summarizer;

pub use summarizer::Summarizer;

use crate::Error;

use anthropic::AnthropicClient;
use gemini::GeminiClient;
use ollama::OllamaClient;
use openai::OpenAiClient;

/// Transcripts are truncated before prompting to stay inside backend
/// context windows.
const TRANSCRIPT_CHAR_LIMIT: usize = 50_000;

pub const DEFAULT_SUMMARY_WORDS: usize = 800;

/// Backend selection, resolved by the caller from configuration and
/// the environment. The core never reads environment variables.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// One of `anthropic`, `openai`, `gemini`, `ollama`, `disabled`.
    pub name: String,
    pub model: Option<String>,
    pub api_key: Option<String>,
    /// Base URL override, honored by the Ollama backend.
    pub base_url: Option<String>,
    pub target_words: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            name: "anthropic".into(),
            model: None,
            api_key: None,
            base_url: None,
            target_words: DEFAULT_SUMMARY_WORDS,
        }
    }
}

/// The closed set of summarization backends.
pub enum Backend {
    Anthropic(AnthropicClient),
    OpenAi(OpenAiClient),
    Gemini(GeminiClient),
    Ollama(OllamaClient),
    /// Pass-through: schedule descriptions are used verbatim and video
    /// talks get an empty summary.
    Disabled,
}

impl Backend {
    pub fn from_config(config: &BackendConfig) -> Result<Backend, Error> {
        let backend = match config.name.to_lowercase().as_str() {
            "anthropic" => Backend::Anthropic(AnthropicClient::new(
                require_key(config)?,
                config.model.clone(),
                config.target_words,
            )),
            "openai" => Backend::OpenAi(OpenAiClient::new(
                require_key(config)?,
                config.model.clone(),
                config.target_words,
            )),
            "gemini" => Backend::Gemini(GeminiClient::new(
                require_key(config)?,
                config.model.clone(),
                config.target_words,
            )),
            "ollama" => Backend::Ollama(OllamaClient::new(
                config.base_url.clone(),
                config.model.clone(),
                config.target_words,
            )),
            "disabled" => Backend::Disabled,
            other => return Err(Error::UnknownBackend(other.to_string())),
        };
        Ok(backend)
    }
}

fn require_key(config: &BackendConfig) -> Result<String, Error> {
    match config.api_key.as_deref() {
        Some(key) if !key.is_empty() => Ok(key.to_string()),
        _ => Err(Error::Authentication {
            backend: config.name.clone(),
            reason: "API key missing".into(),
        }),
    }
}

impl Summarizer for Backend {
    fn name(&self) -> &'static str {
        match self {
            Backend::Anthropic(c) => c.name(),
            Backend::OpenAi(c) => c.name(),
            Backend::Gemini(c) => c.name(),
            Backend::Ollama(c) => c.name(),
            Backend::Disabled => "disabled",
        }
    }

    fn model(&self) -> &str {
        match self {
            Backend::Anthropic(c) => c.model(),
            Backend::OpenAi(c) => c.model(),
            Backend::Gemini(c) => c.model(),
            Backend::Ollama(c) => c.model(),
            Backend::Disabled => "",
        }
    }

    fn target_words(&self) -> usize {
        match self {
            Backend::Anthropic(c) => c.target_words(),
            Backend::OpenAi(c) => c.target_words(),
            Backend::Gemini(c) => c.target_words(),
            Backend::Ollama(c) => c.target_words(),
            Backend::Disabled => 0,
        }
    }

    fn is_passthrough(&self) -> bool {
        matches!(self, Backend::Disabled)
    }

    async fn summarize(&self, title: &str, text: &str) -> Result<String, Error> {
        match self {
            Backend::Anthropic(c) => c.summarize(title, text).await,
            Backend::OpenAi(c) => c.summarize(title, text).await,
            Backend::Gemini(c) => c.summarize(title, text).await,
            Backend::Ollama(c) => c.summarize(title, text).await,
            Backend::Disabled => Ok(text.to_string()),
        }
    }
}

/// Shared prompt across the LLM backends. Asks for a present-tense
/// summary of roughly `target_words` words, with no preamble and no
/// title restatement.
pub(crate) fn build_prompt(title: &str, text: &str, target_words: usize) -> String {
    let truncated: String = text.chars().take(TRANSCRIPT_CHAR_LIMIT).collect();
    format!(
        "Please provide a succinct summary of around {target_words} words of this video transcript.\n\
         The video title is: {title}\n\
         \n\
         Transcript:\n\
         {truncated}\n\
         \n\
         Focus on the key points and main takeaways.\n\
         Write the summary in present tense, as if you are directly conveying the talk's content \
         while it is being given, not talking about the video or transcript itself.\n\
         In your response, output only the summary text itself:\n\
         - Do NOT include any preamble like 'Summary:' or 'Here is a summary'.\n\
         - Do NOT say phrases like 'in this video', 'the speaker says', or 'this talk'.\n\
         - Do NOT repeat or restate the talk title.\n\
         - Do NOT list the speakers; assume they are handled separately."
    )
}

/// Maps an API error response to the error taxonomy; 429 is surfaced
/// as rate limiting so callers can tell it apart from other API errors.
pub(crate) fn api_error(status: u16, message: String) -> Error {
    if status == 429 {
        Error::RateLimited(message)
    } else {
        Error::Api { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_includes_title_and_target_length() {
        let prompt = build_prompt("My Talk", "transcript body", 250);
        assert!(prompt.contains("around 250 words"));
        assert!(prompt.contains("My Talk"));
        assert!(prompt.contains("transcript body"));
    }

    #[test]
    fn prompt_truncates_long_transcripts() {
        let text = "a".repeat(TRANSCRIPT_CHAR_LIMIT + 100);
        let prompt = build_prompt("T", &text, 800);
        assert!(prompt.len() < text.len() + 700);
    }

    #[test]
    fn missing_api_key_is_an_authentication_error() {
        let config = BackendConfig {
            name: "openai".into(),
            ..Default::default()
        };
        assert!(matches!(
            Backend::from_config(&config),
            Err(Error::Authentication { .. })
        ));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let config = BackendConfig {
            name: "llama-on-a-boat".into(),
            ..Default::default()
        };
        assert!(matches!(
            Backend::from_config(&config),
            Err(Error::UnknownBackend(_))
        ));
    }

    #[test]
    fn ollama_needs_no_credential() {
        let config = BackendConfig {
            name: "ollama".into(),
            ..Default::default()
        };
        let backend = Backend::from_config(&config).unwrap();
        assert_eq!(backend.name(), "ollama");
        assert_eq!(backend.model(), "granite3.3:2b");
    }

    #[test]
    fn disabled_backend_is_passthrough() {
        let config = BackendConfig {
            name: "disabled".into(),
            ..Default::default()
        };
        let backend = Backend::from_config(&config).unwrap();
        assert!(backend.is_passthrough());
    }

    #[test]
    fn rate_limit_status_maps_to_rate_limited() {
        assert!(matches!(
            api_error(429, "slow down".into()),
            Error::RateLimited(_)
        ));
        assert!(matches!(
            api_error(500, "boom".into()),
            Error::Api { status: 500, .. }
        ));
    }
}
