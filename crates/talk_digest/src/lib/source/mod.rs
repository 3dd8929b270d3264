//! Talk sources.
//!
//! Two variants are supported, selected from the shape of the input
//! URL: a video playlist and a schedule event page. Both expose the
//! same contract: list the talks, then fetch per-talk detail. Cache
//! consultation happens in the pipeline, so sources stay pure network
//! adapters.

pub mod playlist;
pub mod sched;

use std::future::Future;

use crate::{
    types::{ListedTalk, TalkDetail, TalkStub},
    Error,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Video playlist: per-talk detail is a transcript, fetched with
    /// bounded concurrent fan-out.
    Playlist,
    /// Schedule page: per-talk detail is a description page, fetched
    /// serially with a configurable inter-request delay.
    Sched,
}

impl SourceKind {
    /// Selects the source variant from the URL's shape.
    pub fn detect(url: &str) -> SourceKind {
        if url.contains("sched.com") {
            SourceKind::Sched
        } else {
            SourceKind::Playlist
        }
    }
}

pub trait TalkSource {
    fn kind(&self) -> SourceKind;

    /// The source URL, used as the listing cache identifier.
    fn source_url(&self) -> &str;

    /// Scrapes the full, unfiltered listing in source order.
    fn list(&self) -> impl Future<Output = Result<Vec<ListedTalk>, Error>> + Send;

    /// Fetches per-talk detail for one listed talk.
    fn detail(&self, talk: &TalkStub)
        -> impl Future<Output = Result<TalkDetail, Error>> + Send;
}

impl<T: TalkSource + Send + Sync> TalkSource for &T {
    fn kind(&self) -> SourceKind {
        (**self).kind()
    }

    fn source_url(&self) -> &str {
        (**self).source_url()
    }

    async fn list(&self) -> Result<Vec<ListedTalk>, Error> {
        (**self).list().await
    }

    async fn detail(&self, talk: &TalkStub) -> Result<TalkDetail, Error> {
        (**self).detail(talk).await
    }
}

/// Extracts the video identifier from a watch or short-form URL.
pub(crate) fn extract_video_id(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    match parsed.host_str()? {
        "www.youtube.com" | "youtube.com" | "m.youtube.com" => parsed
            .query_pairs()
            .find(|(k, _)| k == "v")
            .map(|(_, v)| v.into_owned()),
        "youtu.be" => parsed
            .path_segments()
            .and_then(|mut segments| segments.next())
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

/// `scheme://host` of a URL, for making scraped relative hrefs absolute.
pub(crate) fn url_origin(url: &str) -> Result<String, Error> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| Error::Parse(format!("invalid source URL `{url}`: {e}")))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| Error::Parse(format!("source URL `{url}` has no host")))?;
    Ok(format!("{}://{}", parsed.scheme(), host))
}
