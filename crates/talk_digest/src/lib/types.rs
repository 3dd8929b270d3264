use serde::{Deserialize, Serialize};

/// Optional proxy routing configuration, constant for a run. Resolved
/// by the caller (typically from the environment) before the core runs.
#[derive(Debug, Clone)]
pub struct ProxyCredential {
    pub username: String,
    pub password: String,
}

/// A talk as discovered on the source listing page, before any per-talk
/// detail has been fetched and before offset/limit filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListedTalk {
    pub title: String,
    /// Canonical identifier for the talk, also the output mapping key.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sched_link: Option<String>,
    /// Video length in seconds, when the source exposes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u64>,
}

/// A listed talk with its run index assigned. The index is 1-based over
/// the talks that survive filtering, in source order, and is never
/// reassigned afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TalkStub {
    pub index: usize,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sched_link: Option<String>,
}

impl TalkStub {
    pub fn from_listed(index: usize, listed: ListedTalk) -> Self {
        TalkStub {
            index,
            title: listed.title,
            url: listed.url,
            sched_link: listed.sched_link,
        }
    }
}

/// Per-talk detail: the summarizable text (transcript for video
/// sources, organizer description for schedule sources) plus whatever
/// extra metadata the detail page yields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TalkDetail {
    pub text: String,
    /// Fuller title from the detail page, when it improves on the
    /// listing title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

/// A fully processed talk. Immutable once placed into [`RunResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Talk {
    pub index: usize,
    pub title: String,
    pub url: String,
    /// Empty when neither transcript nor description was obtainable.
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sched_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

/// A per-talk failure captured during the run instead of being raised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TalkFailure {
    pub index: usize,
    pub title: String,
    pub url: String,
    pub reason: String,
}

/// The final ordered talk mapping, the sole artifact handed to
/// rendering collaborators. Iteration is always by `index`, regardless
/// of the order in which concurrent fetches completed.
#[derive(Debug, Default, Serialize)]
pub struct RunResult {
    talks: Vec<Talk>,
    failures: Vec<TalkFailure>,
}

impl RunResult {
    pub fn new(mut talks: Vec<Talk>, failures: Vec<TalkFailure>) -> Self {
        talks.sort_by_key(|t| t.index);
        RunResult { talks, failures }
    }

    /// Talks in strictly increasing `index` order.
    pub fn talks(&self) -> impl Iterator<Item = &Talk> {
        self.talks.iter()
    }

    /// Looks a talk up by its canonical URL.
    pub fn get(&self, url: &str) -> Option<&Talk> {
        self.talks.iter().find(|t| t.url == url)
    }

    pub fn failures(&self) -> &[TalkFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.talks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.talks.is_empty()
    }

    /// Number of talks that completed without a recorded failure.
    pub fn succeeded_count(&self) -> usize {
        self.talks
            .iter()
            .filter(|t| !self.failures.iter().any(|f| f.url == t.url))
            .count()
    }
}
