/// Error taxonomy for the digest pipeline.
///
/// Only `ListingFetch` and `Authentication` are fatal for a run.
/// Everything else is captured per talk and surfaced in the final
/// result instead of aborting the remaining talks.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to fetch source listing: {0}")]
    ListingFetch(String),

    #[error("authentication failed for `{backend}` backend: {reason}")]
    Authentication { backend: String, reason: String },

    #[error("unknown summarizer backend `{0}`")]
    UnknownBackend(String),

    #[error("rate limited by upstream: {0}")]
    RateLimited(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("failed to parse source page: {0}")]
    Parse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
