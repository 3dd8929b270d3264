mod mocks;

use std::time::Duration;

use mocks::{source::MockSource, summarizer::MockSummarizer};
use talk_cache::{BustFlags, FsCache};
use talk_digest::{Backend, DigestPipeline, DigestPipelineBuilder, Error};

fn build_pipeline(
    cache: FsCache,
    source: MockSource,
    summarizer: MockSummarizer,
) -> DigestPipeline<FsCache, MockSource, MockSummarizer> {
    DigestPipelineBuilder::new()
        .cache(cache)
        .source(source)
        .summarizer(summarizer)
        .build()
}

#[tokio::test]
async fn happy_path_summarizes_every_talk() {
    let dir = tempfile::tempdir().unwrap();
    let cache = FsCache::new(dir.path(), BustFlags::default());
    let source = MockSource::playlist(3);
    let summarizer = MockSummarizer::new();

    let pipeline = build_pipeline(cache, source.clone(), summarizer.clone());
    let result = pipeline.run().await.unwrap();

    assert_eq!(result.len(), 3);
    assert!(result.failures().is_empty());
    assert_eq!(result.succeeded_count(), 3);

    let talk = result
        .get("https://www.youtube.com/watch?v=vid2")
        .expect("talk 2 present");
    assert_eq!(talk.index, 2);
    assert_eq!(talk.summary, "summary of: Transcript of talk 2");

    assert_eq!(source.list_call_count(), 1);
    assert_eq!(source.detail_call_count(), 3);
    assert_eq!(summarizer.calls.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn warm_cache_rerun_issues_no_network_or_backend_calls() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockSource::playlist(3);
    let summarizer = MockSummarizer::new();

    let first = build_pipeline(
        FsCache::new(dir.path(), BustFlags::default()),
        source.clone(),
        summarizer.clone(),
    );
    let r1 = first.run().await.unwrap();

    // Fresh pipeline, same cache directory, shared call counters.
    let second = build_pipeline(
        FsCache::new(dir.path(), BustFlags::default()),
        source.clone(),
        summarizer.clone(),
    );
    let r2 = second.run().await.unwrap();

    assert_eq!(source.list_call_count(), 1, "listing served from cache");
    assert_eq!(source.detail_call_count(), 3, "details served from cache");
    assert_eq!(
        summarizer.calls.lock().unwrap().len(),
        3,
        "summaries served from cache"
    );
    assert_eq!(
        serde_json::to_value(&r1).unwrap(),
        serde_json::to_value(&r2).unwrap(),
        "warm run reproduces the cold run"
    );
}

#[tokio::test]
async fn summary_bust_regenerates_summaries_only() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockSource::playlist(3);
    let summarizer = MockSummarizer::new();

    build_pipeline(
        FsCache::new(dir.path(), BustFlags::default()),
        source.clone(),
        summarizer.clone(),
    )
    .run()
    .await
    .unwrap();

    let busted = FsCache::new(
        dir.path(),
        BustFlags {
            summary: true,
            ..Default::default()
        },
    );
    build_pipeline(busted, source.clone(), summarizer.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(source.list_call_count(), 1, "listing cache untouched");
    assert_eq!(source.detail_call_count(), 3, "detail cache untouched");
    assert_eq!(
        summarizer.calls.lock().unwrap().len(),
        6,
        "every summary regenerated"
    );
}

#[tokio::test]
async fn short_videos_are_dropped_before_detail_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = MockSource::playlist(3);
    source.listing[1].duration_secs = Some(90);
    let short_url = source.listing[1].url.clone();

    let result = build_pipeline(
        FsCache::new(dir.path(), BustFlags::default()),
        source.clone(),
        MockSummarizer::new(),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(result.len(), 2);
    assert!(result.get(&short_url).is_none());
    assert!(
        !source.detail_calls.lock().unwrap().contains(&short_url),
        "short video never detail-fetched"
    );

    // Indexing runs over the survivors, so there is no gap.
    let indexes: Vec<usize> = result.talks().map(|t| t.index).collect();
    assert_eq!(indexes, vec![1, 2]);
}

#[tokio::test]
async fn offset_and_limit_select_a_window() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockSource::sched(20);

    let pipeline = DigestPipelineBuilder::new()
        .cache(FsCache::new(dir.path(), BustFlags::default()))
        .source(source.clone())
        .summarizer(MockSummarizer::new())
        .offset(5)
        .limit(Some(2))
        .build();
    let result = pipeline.run().await.unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(source.detail_call_count(), 2);

    let titles: Vec<&str> = result.talks().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Talk 6 - Speaker 6", "Talk 7 - Speaker 7"]);
    let indexes: Vec<usize> = result.talks().map(|t| t.index).collect();
    assert_eq!(indexes, vec![1, 2]);
}

#[tokio::test]
async fn disabled_backend_passes_descriptions_through() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockSource::sched(2);

    let pipeline = DigestPipelineBuilder::new()
        .cache(FsCache::new(dir.path(), BustFlags::default()))
        .source(source)
        .summarizer(Backend::Disabled)
        .build();
    let result = pipeline.run().await.unwrap();

    assert_eq!(result.len(), 2);
    for (i, talk) in result.talks().enumerate() {
        let description = format!("Description of talk {}", i + 1);
        assert_eq!(talk.summary, description, "description used verbatim");
        assert_eq!(talk.description.as_deref(), Some(description.as_str()));
        assert_eq!(talk.event_type.as_deref(), Some("Talk"));
    }
}

#[tokio::test]
async fn disabled_backend_on_playlist_leaves_summaries_empty() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockSource::playlist(2);

    let pipeline = DigestPipelineBuilder::new()
        .cache(FsCache::new(dir.path(), BustFlags::default()))
        .source(source)
        .summarizer(Backend::Disabled)
        .build();
    let result = pipeline.run().await.unwrap();

    assert_eq!(result.len(), 2);
    assert!(result.failures().is_empty());
    assert!(result.talks().all(|t| t.summary.is_empty()));
    assert!(result.talks().all(|t| t.description.is_none()));
}

#[tokio::test(start_paused = true)]
async fn schedule_throttle_sleeps_between_fetches_but_not_on_cache_hits() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockSource::sched(3);

    let cold = DigestPipelineBuilder::new()
        .cache(FsCache::new(dir.path(), BustFlags::default()))
        .source(source.clone())
        .summarizer(MockSummarizer::new())
        .sleep_secs(2)
        .build();
    let start = tokio::time::Instant::now();
    cold.run().await.unwrap();
    // Three fetches, delay only between them, none before the first.
    assert_eq!(start.elapsed(), Duration::from_secs(4));
    assert_eq!(source.detail_call_count(), 3);

    let warm = DigestPipelineBuilder::new()
        .cache(FsCache::new(dir.path(), BustFlags::default()))
        .source(source.clone())
        .summarizer(MockSummarizer::new())
        .sleep_secs(2)
        .build();
    let start = tokio::time::Instant::now();
    warm.run().await.unwrap();
    assert_eq!(start.elapsed(), Duration::ZERO, "cache hits consume no delay");
    assert_eq!(source.detail_call_count(), 3, "no refetch on the warm run");
}

#[tokio::test]
async fn result_order_is_by_index_despite_completion_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = MockSource::playlist(5);
    // Later talks finish first; assembly must still order by index.
    source.stagger_ms = 20;

    let pipeline = DigestPipelineBuilder::new()
        .cache(FsCache::new(dir.path(), BustFlags::default()))
        .source(source)
        .summarizer(MockSummarizer::new())
        .fanout(8)
        .build();
    let result = pipeline.run().await.unwrap();

    let indexes: Vec<usize> = result.talks().map(|t| t.index).collect();
    assert_eq!(indexes, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn failed_talk_is_recorded_and_the_rest_proceed() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = MockSource::playlist(3);
    let failing_url = "https://www.youtube.com/watch?v=vid2".to_string();
    source.fail_detail_for.insert(failing_url.clone());

    let result = build_pipeline(
        FsCache::new(dir.path(), BustFlags::default()),
        source,
        MockSummarizer::new(),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(result.len(), 3, "failed talk still present in the mapping");
    assert_eq!(result.succeeded_count(), 2);

    let failed = result.get(&failing_url).unwrap();
    assert!(failed.summary.is_empty());

    assert_eq!(result.failures().len(), 1);
    let failure = &result.failures()[0];
    assert_eq!(failure.url, failing_url);
    assert!(failure.reason.contains("transcript fetch failed"));
}

#[tokio::test]
async fn summarizer_failure_keeps_the_talk_with_empty_summary() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockSource::playlist(2);

    let result = build_pipeline(
        FsCache::new(dir.path(), BustFlags::default()),
        source,
        MockSummarizer::failing("model overloaded"),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result.succeeded_count(), 0);
    assert_eq!(result.failures().len(), 2);
    assert!(result.talks().all(|t| t.summary.is_empty()));
    assert!(result.failures()[0].reason.contains("model overloaded"));
}

#[tokio::test]
async fn listing_failure_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = MockSource::playlist(3);
    source.fail_listing = Some("schedule page returned 500".into());

    let err = build_pipeline(
        FsCache::new(dir.path(), BustFlags::default()),
        source,
        MockSummarizer::new(),
    )
    .run()
    .await
    .unwrap_err();

    assert!(matches!(err, Error::ListingFetch(_)));
}

#[tokio::test]
async fn empty_listing_yields_empty_result() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = MockSource::playlist(0);
    source.listing.clear();

    let result = build_pipeline(
        FsCache::new(dir.path(), BustFlags::default()),
        source,
        MockSummarizer::new(),
    )
    .run()
    .await
    .unwrap();

    assert!(result.is_empty());
    assert!(result.failures().is_empty());
}
