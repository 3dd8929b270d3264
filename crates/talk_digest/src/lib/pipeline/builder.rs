use talk_cache::CacheStore;

use crate::{
    pipeline::DEFAULT_DETAIL_FANOUT, source::TalkSource, DigestPipeline, Summarizer,
};

/// Typed-state builder for [`DigestPipeline`]: `build` is only
/// available once a cache, source, and summarizer have been supplied.
pub struct DigestPipelineBuilder<C = (), Src = (), S = ()> {
    cache: C,
    source: Src,
    summarizer: S,
    limit: Option<usize>,
    offset: usize,
    sleep_secs: u64,
    fanout: usize,
}

impl DigestPipelineBuilder {
    pub fn new() -> Self {
        Self {
            cache: (),
            source: (),
            summarizer: (),
            limit: None,
            offset: 0,
            sleep_secs: 0,
            fanout: DEFAULT_DETAIL_FANOUT,
        }
    }
}

impl Default for DigestPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, Src, S> DigestPipelineBuilder<C, Src, S> {
    pub fn cache<C2: CacheStore + Send + Sync + 'static>(
        self,
        cache: C2,
    ) -> DigestPipelineBuilder<C2, Src, S> {
        DigestPipelineBuilder {
            cache,
            source: self.source,
            summarizer: self.summarizer,
            limit: self.limit,
            offset: self.offset,
            sleep_secs: self.sleep_secs,
            fanout: self.fanout,
        }
    }

    pub fn source<Src2: TalkSource + Send + Sync + 'static>(
        self,
        source: Src2,
    ) -> DigestPipelineBuilder<C, Src2, S> {
        DigestPipelineBuilder {
            cache: self.cache,
            source,
            summarizer: self.summarizer,
            limit: self.limit,
            offset: self.offset,
            sleep_secs: self.sleep_secs,
            fanout: self.fanout,
        }
    }

    pub fn summarizer<S2: Summarizer + Send + Sync + 'static>(
        self,
        summarizer: S2,
    ) -> DigestPipelineBuilder<C, Src, S2> {
        DigestPipelineBuilder {
            cache: self.cache,
            source: self.source,
            summarizer,
            limit: self.limit,
            offset: self.offset,
            sleep_secs: self.sleep_secs,
            fanout: self.fanout,
        }
    }

    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Minimum delay between detail requests for schedule sources.
    pub fn sleep_secs(mut self, sleep_secs: u64) -> Self {
        self.sleep_secs = sleep_secs;
        self
    }

    /// Fan-out bound for concurrent playlist detail fetches.
    pub fn fanout(mut self, fanout: usize) -> Self {
        self.fanout = fanout;
        self
    }
}

impl<C, Src, S> DigestPipelineBuilder<C, Src, S>
where
    C: CacheStore + Send + Sync + 'static,
    Src: TalkSource + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
{
    pub fn build(self) -> DigestPipeline<C, Src, S> {
        DigestPipeline {
            cache: self.cache,
            source: self.source,
            summarizer: self.summarizer,
            limit: self.limit,
            offset: self.offset,
            sleep_secs: self.sleep_secs,
            fanout: self.fanout,
        }
    }
}
