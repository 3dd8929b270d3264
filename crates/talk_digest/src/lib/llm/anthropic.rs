use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;

use crate::{
    http,
    llm::{api_error, build_prompt, Summarizer},
    Error,
};

pub struct AnthropicClient {
    client: ClientWithMiddleware,
    api_key: String,
    model: String,
    target_words: usize,
    base_url: String,
}

impl AnthropicClient {
    const DEFAULT_MODEL: &'static str = "claude-3-5-haiku-20241022";
    const API_VERSION: &'static str = "2023-06-01";

    pub fn new(api_key: impl Into<String>, model: Option<String>, target_words: usize) -> Self {
        AnthropicClient {
            client: http::retrying_client(),
            api_key: api_key.into(),
            model: model.unwrap_or_else(|| Self::DEFAULT_MODEL.into()),
            target_words,
            base_url: "https://api.anthropic.com/v1".into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

impl Summarizer for AnthropicClient {
    fn name(&self) -> &'static str {
        "anthropic"
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
            "max_tokens": 1024,
            "messages": [
                { "role": "user", "content": build_prompt(title, text, self.target_words) }
            ],
        });

        let resp = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", Self::API_VERSION)
            .json(&body)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(api_error(status, message));
        }

        let message = resp.json::<MessagesResponse>().await?;
        message
            .content
            .into_iter()
            .find_map(|block| block.text)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| Error::Api {
                status: 0,
                message: "no text block in messages response".into(),
            })
    }
}
