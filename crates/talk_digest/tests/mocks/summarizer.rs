use std::sync::{Arc, Mutex};

use talk_digest::{Error, Summarizer};

#[derive(Clone)]
pub struct MockSummarizer {
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_with: Option<String>,
}

impl MockSummarizer {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: Some(msg.to_string()),
        }
    }
}

impl Summarizer for MockSummarizer {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-1"
    }

    fn target_words(&self) -> usize {
        100
    }

    async fn summarize(&self, _title: &str, text: &str) -> Result<String, Error> {
        self.calls.lock().unwrap().push(text.to_string());
        if let Some(ref msg) = self.fail_with {
            return Err(Error::Api {
                status: 500,
                message: msg.clone(),
            });
        }
        // Deterministic output so cached and fresh summaries compare equal.
        Ok(format!("summary of: {text}"))
    }
}
