pub mod builder;

use std::time::Duration;

use futures::{stream, StreamExt};
use talk_cache::{content_fingerprint, CacheDomain, CacheKey, CacheStore};

use crate::{
    source::{SourceKind, TalkSource},
    types::{ListedTalk, RunResult, Talk, TalkDetail, TalkFailure, TalkStub},
    Error, Summarizer,
};

/// Bounded fan-out for concurrent transcript fetches.
pub const DEFAULT_DETAIL_FANOUT: usize = 4;

/// Videos shorter than this are dropped before indexing and never
/// summarized.
const MIN_TALK_DURATION_SECS: u64 = 120;

/// The core acquisition-cache-summarization orchestrator.
///
/// Resolves the talk listing, applies offset/limit/duration filters,
/// drives per-talk detail fetches (concurrent for playlists, throttled
/// serial for schedule pages), summarizes via the configured backend,
/// and assembles the index-ordered result. Per-talk failures are
/// recorded, not raised; only listing and authentication failures
/// abort a run.
pub struct DigestPipeline<C, Src, S>
where
    C: CacheStore + Send + Sync + 'static,
    Src: TalkSource + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
{
    cache: C,
    source: Src,
    summarizer: S,
    limit: Option<usize>,
    offset: usize,
    sleep_secs: u64,
    fanout: usize,
}

impl<C, Src, S> DigestPipeline<C, Src, S>
where
    C: CacheStore + Send + Sync + 'static,
    Src: TalkSource + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
{
    #[tracing::instrument(skip(self), fields(source = %self.source.source_url()))]
    pub async fn run(&self) -> Result<RunResult, Error> {
        let listed = self.resolve_listing().await?;
        let stubs = self.filter_and_index(listed);
        tracing::info!(count = stubs.len(), "Processing talks");

        if stubs.is_empty() {
            tracing::info!("No talks to process");
            return Ok(RunResult::default());
        }

        let detailed = match self.source.kind() {
            SourceKind::Playlist => self.resolve_details_concurrent(stubs).await,
            SourceKind::Sched => self.resolve_details_serial(stubs).await,
        };

        let mut talks = Vec::with_capacity(detailed.len());
        let mut failures = Vec::new();

        for (stub, outcome) in detailed {
            let (detail, detail_failure) = match outcome {
                Ok(detail) => (detail, None),
                Err(e) => {
                    tracing::warn!(title = %stub.title, error = %e, "Detail fetch failed");
                    (TalkDetail::default(), Some(e.to_string()))
                }
            };

            let title = detail.title.clone().unwrap_or_else(|| stub.title.clone());

            let summary = if detail_failure.is_some() {
                String::new()
            } else {
                match self.resolve_summary(&stub, &title, &detail).await {
                    Ok(summary) => summary,
                    Err(e) => {
                        tracing::warn!(title = %title, error = %e, "Summarization failed");
                        failures.push(TalkFailure {
                            index: stub.index,
                            title: title.clone(),
                            url: stub.url.clone(),
                            reason: e.to_string(),
                        });
                        String::new()
                    }
                }
            };

            if let Some(reason) = detail_failure {
                failures.push(TalkFailure {
                    index: stub.index,
                    title: title.clone(),
                    url: stub.url.clone(),
                    reason,
                });
            }

            let description = match self.source.kind() {
                SourceKind::Sched if !detail.text.is_empty() => Some(detail.text.clone()),
                _ => None,
            };

            talks.push(Talk {
                index: stub.index,
                title,
                url: stub.url,
                summary,
                description,
                sched_link: stub.sched_link,
                deck_url: detail.deck_url,
                event_type: detail.event_type,
                video_url: detail.video_url,
            });
        }

        let failed = failures.len();
        let result = RunResult::new(talks, failures);
        tracing::info!(processed = result.len(), failed, "Run complete");
        Ok(result)
    }

    /// Listing resolution: cache first, else scrape and write through.
    /// The cache always holds the full un-offset listing, keyed by the
    /// source URL, so different offset/limit runs share one entry.
    async fn resolve_listing(&self) -> Result<Vec<ListedTalk>, Error> {
        let key = CacheKey::new(CacheDomain::Listing, self.source.source_url());

        if let Some(entry) = self.cache.get(&key) {
            match serde_json::from_str(&entry.payload) {
                Ok(listed) => {
                    tracing::info!("Using cached listing");
                    return Ok(listed);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding unreadable listing cache entry")
                }
            }
        }

        let listed = self
            .source
            .list()
            .await
            .map_err(|e| Error::ListingFetch(e.to_string()))?;

        match serde_json::to_string(&listed) {
            Ok(payload) => self.write_through(&key, &payload),
            Err(e) => tracing::warn!(error = %e, "Failed to serialize listing for cache"),
        }
        Ok(listed)
    }

    /// Drops short videos, applies offset then limit, and assigns the
    /// 1-based run index over the surviving talks.
    fn filter_and_index(&self, listed: Vec<ListedTalk>) -> Vec<TalkStub> {
        listed
            .into_iter()
            .filter(|talk| match talk.duration_secs {
                Some(secs) if secs > 0 && secs < MIN_TALK_DURATION_SECS => {
                    tracing::info!(title = %talk.title, secs, "Skipping short video");
                    false
                }
                _ => true,
            })
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .enumerate()
            .map(|(i, talk)| TalkStub::from_listed(i + 1, talk))
            .collect()
    }

    /// Caption fetches are independent, so playlist details run with a
    /// bounded fan-out. Completion order is unspecified; assembly
    /// re-sorts by index.
    async fn resolve_details_concurrent(
        &self,
        stubs: Vec<TalkStub>,
    ) -> Vec<(TalkStub, Result<TalkDetail, Error>)> {
        stream::iter(stubs.into_iter().map(|stub| async move {
            let outcome = match self.cached_detail(&stub) {
                Some(detail) => Ok(detail),
                None => self.fetch_detail(&stub).await,
            };
            (stub, outcome)
        }))
        .buffer_unordered(self.fanout.max(1))
        .collect()
        .await
    }

    /// Schedule detail pages target one host, so requests are issued
    /// serially with the configured minimum delay between network
    /// fetches. Cache hits don't consume the delay.
    async fn resolve_details_serial(
        &self,
        stubs: Vec<TalkStub>,
    ) -> Vec<(TalkStub, Result<TalkDetail, Error>)> {
        let mut out = Vec::with_capacity(stubs.len());
        let mut needs_delay = false;

        for stub in stubs {
            let outcome = match self.cached_detail(&stub) {
                Some(detail) => Ok(detail),
                None => {
                    if needs_delay && self.sleep_secs > 0 {
                        tokio::time::sleep(Duration::from_secs(self.sleep_secs)).await;
                    }
                    needs_delay = true;
                    self.fetch_detail(&stub).await
                }
            };
            out.push((stub, outcome));
        }
        out
    }

    fn detail_key(stub: &TalkStub) -> CacheKey {
        CacheKey::new(CacheDomain::Detail, &stub.url)
    }

    fn cached_detail(&self, stub: &TalkStub) -> Option<TalkDetail> {
        let entry = self.cache.get(&Self::detail_key(stub))?;
        match serde_json::from_str(&entry.payload) {
            Ok(detail) => {
                tracing::debug!(title = %stub.title, "Using cached detail");
                Some(detail)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable detail cache entry");
                None
            }
        }
    }

    async fn fetch_detail(&self, stub: &TalkStub) -> Result<TalkDetail, Error> {
        let detail = self.source.detail(stub).await?;
        match serde_json::to_string(&detail) {
            Ok(payload) => self.write_through(&Self::detail_key(stub), &payload),
            Err(e) => tracing::warn!(error = %e, "Failed to serialize detail for cache"),
        }
        Ok(detail)
    }

    async fn resolve_summary(
        &self,
        stub: &TalkStub,
        title: &str,
        detail: &TalkDetail,
    ) -> Result<String, Error> {
        if self.summarizer.is_passthrough() {
            return Ok(match self.source.kind() {
                SourceKind::Sched => detail.text.clone(),
                SourceKind::Playlist => String::new(),
            });
        }

        if detail.text.is_empty() {
            tracing::info!(title, "No summarizable content; leaving summary empty");
            return Ok(String::new());
        }

        let key = CacheKey::new(CacheDomain::Summary, &stub.url)
            .param(self.summarizer.name())
            .param(self.summarizer.model())
            .param(self.summarizer.target_words())
            .param(content_fingerprint(&detail.text));

        if let Some(entry) = self.cache.get(&key) {
            tracing::info!(title, "Reusing cached summary");
            return Ok(entry.payload);
        }

        tracing::info!(title, "Generating summary");
        let summary = self.summarizer.summarize(title, &detail.text).await?;
        self.write_through(&key, &summary);
        Ok(summary)
    }

    /// Cache writes are best-effort: a failure is logged and the run
    /// keeps using the in-memory value.
    fn write_through(&self, key: &CacheKey, payload: &str) {
        if let Err(e) = self.cache.put(key, payload) {
            tracing::warn!(error = %e, "Cache write failed; continuing without it");
        }
    }
}
