use std::future::Future;

/// Uniform contract across summarization backends: text in,
/// bounded-length summary out.
///
/// `name`, `model`, and `target_words` feed the summary cache
/// fingerprint, so changing any of them invalidates only the summaries
/// that need regenerating.
pub trait Summarizer {
    fn name(&self) -> &'static str;

    fn model(&self) -> &str;

    /// Approximate word count requested for each summary.
    fn target_words(&self) -> usize;

    /// Pass-through backends echo the input text instead of calling an
    /// API; the pipeline skips summary caching for them.
    fn is_passthrough(&self) -> bool {
        false
    }

    fn summarize(
        &self,
        title: &str,
        text: &str,
    ) -> impl Future<Output = Result<String, crate::Error>> + Send;
}

impl<T: Summarizer + Send + Sync> Summarizer for &T {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn model(&self) -> &str {
        (**self).model()
    }

    fn target_words(&self) -> usize {
        (**self).target_words()
    }

    fn is_passthrough(&self) -> bool {
        (**self).is_passthrough()
    }

    async fn summarize(&self, title: &str, text: &str) -> Result<String, crate::Error> {
        (**self).summarize(title, text).await
    }
}
