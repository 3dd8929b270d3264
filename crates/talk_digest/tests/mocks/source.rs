use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
    time::Duration,
};

use talk_digest::{
    types::{ListedTalk, TalkDetail, TalkStub},
    Error, SourceKind, TalkSource,
};

/// An in-memory source serving a fixed listing and per-url details,
/// recording every call it receives.
#[derive(Clone)]
pub struct MockSource {
    pub kind: SourceKind,
    pub url: String,
    pub listing: Vec<ListedTalk>,
    pub details: HashMap<String, TalkDetail>,
    pub fail_listing: Option<String>,
    pub fail_detail_for: HashSet<String>,
    /// When non-zero, later talks finish their detail fetch first.
    pub stagger_ms: u64,
    pub list_calls: Arc<Mutex<usize>>,
    pub detail_calls: Arc<Mutex<Vec<String>>>,
}

impl MockSource {
    pub fn playlist(count: usize) -> Self {
        let listing: Vec<ListedTalk> = (1..=count)
            .map(|i| ListedTalk {
                title: format!("Talk {i}"),
                url: format!("https://www.youtube.com/watch?v=vid{i}"),
                sched_link: None,
                duration_secs: Some(1800),
            })
            .collect();
        let details = listing
            .iter()
            .enumerate()
            .map(|(i, t)| {
                (
                    t.url.clone(),
                    TalkDetail {
                        text: format!("Transcript of talk {}", i + 1),
                        ..Default::default()
                    },
                )
            })
            .collect();

        MockSource {
            kind: SourceKind::Playlist,
            url: "https://www.youtube.com/playlist?list=PLtest".into(),
            listing,
            details,
            fail_listing: None,
            fail_detail_for: HashSet::new(),
            stagger_ms: 0,
            list_calls: Arc::new(Mutex::new(0)),
            detail_calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn sched(count: usize) -> Self {
        let listing: Vec<ListedTalk> = (1..=count)
            .map(|i| {
                let url = format!("https://myevent2026.sched.com/event/ev{i}/talk-{i}");
                ListedTalk {
                    title: format!("Talk {i}"),
                    url: url.clone(),
                    sched_link: Some(url),
                    duration_secs: None,
                }
            })
            .collect();
        let details = listing
            .iter()
            .enumerate()
            .map(|(i, t)| {
                (
                    t.url.clone(),
                    TalkDetail {
                        text: format!("Description of talk {}", i + 1),
                        title: Some(format!("Talk {} - Speaker {}", i + 1, i + 1)),
                        event_type: Some("Talk".into()),
                        ..Default::default()
                    },
                )
            })
            .collect();

        MockSource {
            kind: SourceKind::Sched,
            url: "https://myevent2026.sched.com/".into(),
            listing,
            details,
            fail_listing: None,
            fail_detail_for: HashSet::new(),
            stagger_ms: 0,
            list_calls: Arc::new(Mutex::new(0)),
            detail_calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn list_call_count(&self) -> usize {
        *self.list_calls.lock().unwrap()
    }

    pub fn detail_call_count(&self) -> usize {
        self.detail_calls.lock().unwrap().len()
    }
}

impl TalkSource for MockSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn source_url(&self) -> &str {
        &self.url
    }

    async fn list(&self) -> Result<Vec<ListedTalk>, Error> {
        *self.list_calls.lock().unwrap() += 1;
        if let Some(ref msg) = self.fail_listing {
            return Err(Error::Parse(msg.clone()));
        }
        Ok(self.listing.clone())
    }

    async fn detail(&self, talk: &TalkStub) -> Result<TalkDetail, Error> {
        self.detail_calls.lock().unwrap().push(talk.url.clone());

        if self.stagger_ms > 0 {
            let behind = self.listing.len().saturating_sub(talk.index) as u64;
            tokio::time::sleep(Duration::from_millis(self.stagger_ms * behind)).await;
        }

        if self.fail_detail_for.contains(&talk.url) {
            return Err(Error::Api {
                status: 503,
                message: "transcript fetch failed after retries".into(),
            });
        }
        Ok(self.details.get(&talk.url).cloned().unwrap_or_default())
    }
}
