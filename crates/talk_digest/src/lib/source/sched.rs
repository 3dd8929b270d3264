//! Schedule-page source (sched.com events).
//!
//! The listing page yields one `/event/` link per talk; the per-talk
//! detail page carries the full title, organizer description, event
//! type, an optional attached deck, and sometimes a video link. All
//! HTML parsing happens in sync helpers so no document is held across
//! an await point.

use std::{sync::LazyLock, time::Duration};

use itertools::Itertools;
use reqwest_middleware::ClientWithMiddleware;
use scraper::{Html, Selector};

use crate::{
    http,
    source::{url_origin, SourceKind, TalkSource},
    types::{ListedTalk, TalkDetail, TalkStub},
    Error,
};

static EVENT_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href*="/event/"]"#).unwrap());
static NAME_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".name").unwrap());
static DESCRIPTION_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".tip-description").unwrap());
static EVENT_TYPE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".sched-event-type > a").unwrap());
static DECK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.sched-file a[href]").unwrap());
static VIDEO_LINK_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"a[href*="youtube.com/watch"], a[href*="youtu.be/"]"#).unwrap()
});
static VIDEO_IFRAME_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"iframe[src*="youtube.com/embed/"]"#).unwrap());

pub struct SchedSource {
    url: String,
    client: ClientWithMiddleware,
}

impl SchedSource {
    /// The detail page occasionally renders without its `.name`
    /// element; re-fetch a bounded number of times before giving up.
    const DETAIL_ATTEMPTS: usize = 3;

    pub fn new(url: impl Into<String>) -> Self {
        SchedSource {
            url: normalize_event_url(&url.into()),
            client: http::retrying_client(),
        }
    }
}

impl TalkSource for SchedSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Sched
    }

    fn source_url(&self) -> &str {
        &self.url
    }

    #[tracing::instrument(skip(self), fields(url = %self.url))]
    async fn list(&self) -> Result<Vec<ListedTalk>, Error> {
        let html = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let origin = url_origin(&self.url)?;
        let talks = parse_event_links(&html, &origin);
        tracing::info!(count = talks.len(), "Parsed schedule listing");
        Ok(talks)
    }

    #[tracing::instrument(skip(self, talk), fields(url = %talk.url))]
    async fn detail(&self, talk: &TalkStub) -> Result<TalkDetail, Error> {
        let origin = url_origin(&talk.url)?;

        let mut parsed = ParsedEventPage::default();
        for attempt in 1..=Self::DETAIL_ATTEMPTS {
            let html = self
                .client
                .get(&talk.url)
                .send()
                .await?
                .error_for_status()?
                .text()
                .await?;

            parsed = parse_event_page(&html, &origin);
            if parsed.title.is_some() {
                break;
            }
            if attempt < Self::DETAIL_ATTEMPTS {
                tracing::debug!(attempt, "Detail page missing title element, re-fetching");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }

        if parsed.title.is_none() {
            tracing::warn!(url = %talk.url, "Detail page never rendered a title element");
        }

        Ok(TalkDetail {
            text: parsed.description,
            title: parsed.title,
            event_type: parsed.event_type,
            deck_url: parsed.deck_url,
            video_url: parsed.video_url,
        })
    }
}

/// Ensures the listing URL points at the descriptions list view.
fn normalize_event_url(url: &str) -> String {
    if url.contains("/list/descriptions") {
        return url.to_string();
    }
    match url_origin(url) {
        Ok(origin) => format!("{origin}/list/descriptions"),
        Err(_) => url.to_string(),
    }
}

fn absolute_href(href: &str, origin: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{origin}{href}")
    } else {
        format!("{origin}/{href}")
    }
}

fn parse_event_links(html: &str, origin: &str) -> Vec<ListedTalk> {
    let doc = Html::parse_document(html);
    doc.select(&EVENT_LINK_SEL)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            let url = absolute_href(href, origin);
            let title = anchor.text().collect::<String>().trim().to_string();
            Some(ListedTalk {
                title,
                url: url.clone(),
                sched_link: Some(url),
                duration_secs: None,
            })
        })
        .unique_by(|talk| talk.url.clone())
        .collect()
}

#[derive(Debug, Default)]
struct ParsedEventPage {
    title: Option<String>,
    description: String,
    event_type: Option<String>,
    deck_url: Option<String>,
    video_url: Option<String>,
}

fn parse_event_page(html: &str, origin: &str) -> ParsedEventPage {
    let doc = Html::parse_document(html);

    let element_text = |selector: &Selector| {
        doc.select(selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty())
    };

    let title = element_text(&NAME_SEL);
    let description = element_text(&DESCRIPTION_SEL).unwrap_or_default();
    let event_type = element_text(&EVENT_TYPE_SEL);

    let deck_url = doc
        .select(&DECK_SEL)
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(|href| absolute_href(href, origin));

    let video_url = doc
        .select(&VIDEO_LINK_SEL)
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(str::to_string)
        .or_else(|| {
            doc.select(&VIDEO_IFRAME_SEL)
                .next()
                .and_then(|el| el.value().attr("src"))
                .and_then(embed_to_watch_url)
        });

    ParsedEventPage {
        title,
        description,
        event_type,
        deck_url,
        video_url,
    }
}

fn embed_to_watch_url(src: &str) -> Option<String> {
    let id = src
        .split("youtube.com/embed/")
        .nth(1)?
        .split(['?', '&', '/'])
        .next()?;
    if id.is_empty() {
        return None;
    }
    Some(format!("https://www.youtube.com/watch?v={id}"))
}
