use std::path::PathBuf;

use clap::Parser;
use talk_cache::{BustFlags, FsCache};
use talk_digest::{
    tracing::init_tracing_subscriber, Backend, BackendConfig, CaptionClient,
    DigestPipelineBuilder, PlaylistSource, ProxyCredential, RunResult, SchedSource, SourceKind,
    TalkSource,
};

#[derive(Parser)]
#[command(name = "talk-digest", about = "Conference talk summarization pipeline")]
struct Cli {
    /// YouTube playlist URL or sched.com event URL
    source_url: String,

    /// Limit the number of talks to process
    #[arg(short = 'l', long)]
    limit: Option<usize>,

    /// Skip the first N talks before processing
    #[arg(long, default_value = "0")]
    offset: usize,

    /// Seconds to sleep between schedule detail page requests
    #[arg(long, default_value = "0")]
    sleep: u64,

    /// Summarizer backend: anthropic, openai, gemini, ollama, or disabled
    #[arg(long, default_value = "anthropic")]
    summarizer: String,

    /// Model name for the selected backend
    #[arg(long)]
    model: Option<String>,

    /// Approximate number of words in each summary
    #[arg(long, default_value = "800")]
    summary_length: usize,

    /// Do not use the cached source listing for this run
    #[arg(long)]
    cache_bust_listing: bool,

    /// Do not use cached transcripts/descriptions for this run
    #[arg(long)]
    cache_bust_detail: bool,

    /// Do not reuse cached summaries; always regenerate them
    #[arg(long)]
    cache_bust_summary: bool,

    /// Route caption requests through the configured Webshare proxy
    #[arg(long)]
    proxy: bool,

    /// Cache directory (defaults to the per-user cache location)
    #[arg(long, env = "TALK_DIGEST_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Write the resulting JSON mapping here instead of stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing_subscriber()?;

    let kind = SourceKind::detect(&cli.source_url);
    if kind == SourceKind::Playlist && cli.summarizer.eq_ignore_ascii_case("disabled") {
        tracing::warn!(
            "Summarization disabled for a video playlist; talks will carry empty summaries"
        );
    }

    let backend = Backend::from_config(&BackendConfig {
        name: cli.summarizer.clone(),
        model: cli.model.clone(),
        api_key: backend_api_key(&cli.summarizer),
        base_url: std::env::var("OLLAMA_BASE_URL").ok(),
        target_words: cli.summary_length,
    })?;

    let cache = FsCache::new(
        cli.cache_dir.clone().unwrap_or_else(default_cache_dir),
        BustFlags {
            listing: cli.cache_bust_listing,
            detail: cli.cache_bust_detail,
            summary: cli.cache_bust_summary,
        },
    );

    tracing::info!(source = %cli.source_url, backend = %cli.summarizer, "Running pipeline...");

    let result = match kind {
        SourceKind::Sched => {
            run_pipeline(cache, SchedSource::new(&cli.source_url), backend, &cli).await?
        }
        SourceKind::Playlist => {
            let proxy = cli.proxy.then(proxy_credential).flatten();
            let fetcher = CaptionClient::new(proxy.as_ref())?;
            run_pipeline(
                cache,
                PlaylistSource::new(&cli.source_url, fetcher),
                backend,
                &cli,
            )
            .await?
        }
    };

    let json = serde_json::to_string_pretty(&result)?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!(path = %path.display(), "Wrote run result");
        }
        None => println!("{json}"),
    }

    tracing::info!(
        processed = result.len(),
        failed = result.failures().len(),
        "Done"
    );

    if result.succeeded_count() == 0 {
        tracing::error!("No talks were processed successfully");
        std::process::exit(1);
    }
    Ok(())
}

async fn run_pipeline<Src>(
    cache: FsCache,
    source: Src,
    backend: Backend,
    cli: &Cli,
) -> anyhow::Result<RunResult>
where
    Src: TalkSource + Send + Sync + 'static,
{
    let pipeline = DigestPipelineBuilder::new()
        .cache(cache)
        .source(source)
        .summarizer(backend)
        .limit(cli.limit)
        .offset(cli.offset)
        .sleep_secs(cli.sleep)
        .build();

    Ok(pipeline.run().await?)
}

fn backend_api_key(backend: &str) -> Option<String> {
    let var = match backend.to_lowercase().as_str() {
        "anthropic" => "ANTHROPIC_API_KEY",
        "openai" => "OPENAI_API_KEY",
        "gemini" => "GOOGLE_API_KEY",
        _ => return None,
    };
    std::env::var(var).ok()
}

fn proxy_credential() -> Option<ProxyCredential> {
    match (
        std::env::var("WEBSHARE_USERNAME"),
        std::env::var("WEBSHARE_PASSWORD"),
    ) {
        (Ok(username), Ok(password)) if !username.is_empty() && !password.is_empty() => {
            Some(ProxyCredential { username, password })
        }
        _ => {
            tracing::warn!(
                "WEBSHARE_USERNAME and WEBSHARE_PASSWORD must be set, running without proxy"
            );
            None
        }
    }
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("talk-digest")
}
