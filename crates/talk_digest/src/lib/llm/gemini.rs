use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;

use crate::{
    http,
    llm::{api_error, build_prompt, Summarizer},
    Error,
};

pub struct GeminiClient {
    client: ClientWithMiddleware,
    api_key: String,
    model: String,
    target_words: usize,
    base_url: String,
}

impl GeminiClient {
    const DEFAULT_MODEL: &'static str = "gemini-2.0-flash-exp";

    pub fn new(api_key: impl Into<String>, model: Option<String>, target_words: usize) -> Self {
        GeminiClient {
            client: http::retrying_client(),
            api_key: api_key.into(),
            model: model.unwrap_or_else(|| Self::DEFAULT_MODEL.into()),
            target_words,
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(default)]
    text: Option<String>,
}

impl Summarizer for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn target_words(&self) -> usize {
        self.target_words
    }

    async fn summarize(&self, title: &str, text: &str) -> Result<String, Error> {
        let body = serde_json::json!({
            "contents": [
                { "parts": [{ "text": build_prompt(title, text, self.target_words) }] }
            ],
        });

        let resp = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(api_error(status, message));
        }

        let generated = resp.json::<GenerateContentResponse>().await?;
        generated
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().find_map(|p| p.text))
            .map(|content| content.trim().to_string())
            .ok_or_else(|| Error::Api {
                status: 0,
                message: "no candidate text in generateContent response".into(),
            })
    }
}
