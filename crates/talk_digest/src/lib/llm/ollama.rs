use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;

use crate::{
    http,
    llm::{api_error, build_prompt, Summarizer},
    Error,
};

/// Local Ollama server backend. Needs no credential; requests go to a
/// configurable base URL.
pub struct OllamaClient {
    client: ClientWithMiddleware,
    model: String,
    target_words: usize,
    base_url: String,
}

impl OllamaClient {
    const DEFAULT_MODEL: &'static str = "granite3.3:2b";
    const DEFAULT_BASE_URL: &'static str = "http://localhost:11434";

    pub fn new(base_url: Option<String>, model: Option<String>, target_words: usize) -> Self {
        OllamaClient {
            client: http::retrying_client(),
            model: model.unwrap_or_else(|| Self::DEFAULT_MODEL.into()),
            target_words,
            base_url: base_url
                .unwrap_or_else(|| Self::DEFAULT_BASE_URL.into())
                .trim_end_matches('/')
                .to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

impl Summarizer for OllamaClient {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn target_words(&self) -> usize {
        self.target_words
    }

    async fn summarize(&self, title: &str, text: &str) -> Result<String, Error> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": build_prompt(title, text, self.target_words) }
            ],
            "stream": false,
        });

        let resp = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(api_error(status, message));
        }

        let chat = resp.json::<ChatResponse>().await?;
        chat.message
            .content
            .filter(|content| !content.trim().is_empty())
            .map(|content| content.trim().to_string())
            .ok_or_else(|| Error::Api {
                status: 0,
                message: "unexpected Ollama response format".into(),
            })
    }
}
