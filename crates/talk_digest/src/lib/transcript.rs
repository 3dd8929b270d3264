//! Closed-caption retrieval for a single video.
//!
//! Missing captions are an expected outcome and surface as `Ok(None)`,
//! distinct from transport failures, which are retried with bounded
//! backoff by the HTTP layer and then propagated.

use std::{future::Future, sync::LazyLock};

use regex::Regex;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;

use crate::{http, types::ProxyCredential, Error};

static PLAYER_RESPONSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)ytInitialPlayerResponse\s*=\s*(\{.+?\})\s*;(?:\s*var\s|\s*</script>)")
        .unwrap()
});

static CAPTION_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<text[^>]*>(.*?)</text>").unwrap());

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

pub trait TranscriptFetcher {
    /// Returns the caption text for the video, or `None` when no
    /// caption track exists.
    fn fetch(
        &self,
        video_id: &str,
    ) -> impl Future<Output = Result<Option<String>, Error>> + Send;
}

impl<T: TranscriptFetcher + Send + Sync> TranscriptFetcher for &T {
    async fn fetch(&self, video_id: &str) -> Result<Option<String>, Error> {
        (**self).fetch(video_id).await
    }
}

/// Fetches captions from the video watch page's caption track list,
/// optionally routing every request through a proxy credential.
pub struct CaptionClient {
    client: ClientWithMiddleware,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
    #[serde(default)]
    kind: Option<String>,
}

impl CaptionClient {
    const WATCH_URL: &'static str = "https://www.youtube.com/watch";

    pub fn new(proxy: Option<&ProxyCredential>) -> Result<Self, Error> {
        let client = match proxy {
            Some(credential) => {
                tracing::info!("Routing caption requests through proxy");
                http::retrying_client_with_proxy(credential)?
            }
            None => http::retrying_client(),
        };
        Ok(CaptionClient { client })
    }

    async fn fetch_watch_page(&self, video_id: &str) -> Result<String, Error> {
        let html = self
            .client
            .get(Self::WATCH_URL)
            .query(&[("v", video_id)])
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(html)
    }

    /// Picks the best English track: manual captions win over
    /// auto-generated ("asr") ones.
    fn select_track(tracks: Vec<CaptionTrack>) -> Option<CaptionTrack> {
        let mut generated = None;
        for track in tracks {
            if !track.language_code.starts_with("en") {
                continue;
            }
            if track.kind.as_deref() == Some("asr") {
                generated.get_or_insert(track);
            } else {
                return Some(track);
            }
        }
        generated
    }

    fn caption_tracks(html: &str) -> Result<Vec<CaptionTrack>, Error> {
        let Some(captures) = PLAYER_RESPONSE_RE.captures(html) else {
            return Err(Error::Parse(
                "ytInitialPlayerResponse not found in watch page".into(),
            ));
        };
        let player: serde_json::Value = serde_json::from_str(&captures[1])?;

        let tracks = player["captions"]["playerCaptionsTracklistRenderer"]["captionTracks"]
            .as_array()
            .map(|tracks| {
                tracks
                    .iter()
                    .filter_map(|t| serde_json::from_value(t.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();
        Ok(tracks)
    }
}

impl TranscriptFetcher for CaptionClient {
    #[tracing::instrument(skip(self))]
    async fn fetch(&self, video_id: &str) -> Result<Option<String>, Error> {
        let html = self.fetch_watch_page(video_id).await?;
        let tracks = Self::caption_tracks(&html)?;

        let Some(track) = Self::select_track(tracks) else {
            tracing::info!(video_id, "No caption track available");
            return Ok(None);
        };

        let timedtext = self
            .client
            .get(&track.base_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(Some(plain_text_from_timedtext(&timedtext)))
    }
}

/// Strips a timedtext XML document down to whitespace-normalized
/// caption text.
pub(crate) fn plain_text_from_timedtext(xml: &str) -> String {
    let mut parts = Vec::new();
    for captures in CAPTION_TEXT_RE.captures_iter(xml) {
        let decoded = html_escape::decode_html_entities(&captures[1]);
        let trimmed = decoded.trim().to_string();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }
    WHITESPACE_RE
        .replace_all(&parts.join(" "), " ")
        .trim()
        .to_string()
}
