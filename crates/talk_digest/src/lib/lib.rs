mod error;
mod http;
mod llm;
mod pipeline;
pub mod source;
pub mod tracing;
pub mod transcript;
pub mod types;

pub use error::Error;
pub use llm::{
    anthropic::AnthropicClient, gemini::GeminiClient, ollama::OllamaClient, openai::OpenAiClient,
    Backend, BackendConfig, Summarizer,
};
pub use pipeline::{builder::DigestPipelineBuilder, DigestPipeline};
pub use source::{playlist::PlaylistSource, sched::SchedSource, SourceKind, TalkSource};
pub use transcript::{CaptionClient, TranscriptFetcher};
pub use types::{ListedTalk, ProxyCredential, RunResult, Talk, TalkDetail, TalkFailure, TalkStub};
