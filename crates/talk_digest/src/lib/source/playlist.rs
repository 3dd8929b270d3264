//! Video playlist source.
//!
//! The listing comes from the `ytInitialData` blob embedded in the
//! playlist page; per-talk detail is the video's caption text, fetched
//! through the [`TranscriptFetcher`].

use std::sync::LazyLock;

use regex::Regex;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    http,
    source::{extract_video_id, SourceKind, TalkSource},
    transcript::TranscriptFetcher,
    types::{ListedTalk, TalkDetail, TalkStub},
    Error,
};

static YT_INITIALDATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<script[^>]*>\s*var\s+ytInitialData\s*=\s*(\{.*?\});\s*</script>").unwrap()
});

const WATCH_BASE_URL: &str = "https://www.youtube.com/watch";

pub struct PlaylistSource<F> {
    url: String,
    client: ClientWithMiddleware,
    fetcher: F,
}

impl<F: TranscriptFetcher> PlaylistSource<F> {
    pub fn new(url: impl Into<String>, fetcher: F) -> Self {
        PlaylistSource {
            url: url.into(),
            client: http::retrying_client(),
            fetcher,
        }
    }
}

impl<F: TranscriptFetcher + Send + Sync> TalkSource for PlaylistSource<F> {
    fn kind(&self) -> SourceKind {
        SourceKind::Playlist
    }

    fn source_url(&self) -> &str {
        &self.url
    }

    #[tracing::instrument(skip(self), fields(url = %self.url))]
    async fn list(&self) -> Result<Vec<ListedTalk>, Error> {
        let html = self
            .client
            .get(&self.url)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let json = extract_initial_data(&html)?;
        let talks = parse_playlist(&json)?;
        tracing::info!(count = talks.len(), "Parsed playlist listing");
        Ok(talks)
    }

    #[tracing::instrument(skip(self, talk), fields(title = %talk.title))]
    async fn detail(&self, talk: &TalkStub) -> Result<TalkDetail, Error> {
        let Some(video_id) = extract_video_id(&talk.url) else {
            return Err(Error::Parse(format!("not a video URL: {}", talk.url)));
        };

        let text = self.fetcher.fetch(&video_id).await?.unwrap_or_default();
        if text.is_empty() {
            tracing::warn!(title = %talk.title, "No captions available");
        }

        Ok(TalkDetail {
            text,
            ..Default::default()
        })
    }
}

fn extract_initial_data(html: &str) -> Result<Value, Error> {
    let captures = YT_INITIALDATA_RE
        .captures(html)
        .ok_or_else(|| Error::Parse("ytInitialData not found in playlist page".into()))?;
    Ok(serde_json::from_str(&captures[1])?)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistVideoRenderer {
    video_id: String,
    title: Value,
    #[serde(default)]
    length_seconds: Option<String>,
}

/// Walks the playlist page JSON down to its `playlistVideoRenderer`
/// entries, in playlist order.
fn parse_playlist(json: &Value) -> Result<Vec<ListedTalk>, Error> {
    let tabs = json["contents"]["twoColumnBrowseResultsRenderer"]["tabs"]
        .as_array()
        .ok_or(Error::Parse(
            "missing ['contents']['twoColumnBrowseResultsRenderer']['tabs']".into(),
        ))?;

    let mut talks = Vec::new();
    for tab in tabs {
        let Some(items) = tab["tabRenderer"]["content"]["sectionListRenderer"]["contents"][0]
            ["itemSectionRenderer"]["contents"][0]["playlistVideoListRenderer"]["contents"]
            .as_array()
        else {
            continue;
        };

        for item in items {
            let Ok(renderer) = serde_json::from_value::<PlaylistVideoRenderer>(
                item["playlistVideoRenderer"].clone(),
            ) else {
                continue;
            };

            let title = renderer.title["runs"][0]["text"]
                .as_str()
                .or_else(|| renderer.title["simpleText"].as_str())
                .unwrap_or("Unknown Title")
                .to_string();

            talks.push(ListedTalk {
                title,
                url: format!("{}?v={}", WATCH_BASE_URL, renderer.video_id),
                sched_link: None,
                duration_secs: renderer
                    .length_seconds
                    .as_deref()
                    .and_then(|s| s.parse().ok()),
            });
        }
    }

    Ok(talks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn video(id: &str, title: &str, length: &str) -> Value {
        json!({
            "playlistVideoRenderer": {
                "videoId": id,
                "title": { "runs": [{ "text": title }] },
                "lengthSeconds": length,
            }
        })
    }

    fn page(videos: Vec<Value>) -> Value {
        json!({
            "contents": {
                "twoColumnBrowseResultsRenderer": {
                    "tabs": [{
                        "tabRenderer": {
                            "content": {
                                "sectionListRenderer": {
                                    "contents": [{
                                        "itemSectionRenderer": {
                                            "contents": [{
                                                "playlistVideoListRenderer": {
                                                    "contents": videos,
                                                }
                                            }]
                                        }
                                    }]
                                }
                            }
                        }
                    }]
                }
            }
        })
    }

    #[test]
    fn parses_videos_in_playlist_order() {
        let json = page(vec![
            video("aaa", "Opening Keynote", "1800"),
            video("bbb", "Closing Keynote", "2400"),
        ]);
        let talks = parse_playlist(&json).unwrap();
        assert_eq!(talks.len(), 2);
        assert_eq!(talks[0].title, "Opening Keynote");
        assert_eq!(talks[0].url, "https://www.youtube.com/watch?v=aaa");
        assert_eq!(talks[0].duration_secs, Some(1800));
        assert_eq!(talks[1].title, "Closing Keynote");
    }

    #[test]
    fn skips_malformed_entries() {
        let mut videos = vec![video("aaa", "Keynote", "1800")];
        videos.push(json!({ "continuationItemRenderer": {} }));
        let talks = parse_playlist(&page(videos)).unwrap();
        assert_eq!(talks.len(), 1);
    }

    #[test]
    fn missing_tabs_is_a_parse_error() {
        let err = parse_playlist(&json!({"contents": {}})).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn initial_data_extracted_from_script_tag() {
        let html = r#"<html><script nonce="x">var ytInitialData = {"contents":{}};</script></html>"#;
        let json = extract_initial_data(html).unwrap();
        assert!(json["contents"].is_object());
    }
}
