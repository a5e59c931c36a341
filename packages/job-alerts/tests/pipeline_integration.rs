//! End-to-end tests for ingestion, dedup and delivery.
//!
//! All sources are mocks; the sqlite tests use in-memory or temp-file
//! databases.

use std::sync::Arc;

use job_alerts::{
    deliver_pending, ingest, FilterMode, FilterPolicy, IdentityScheme, JobRecord, JobStore,
    LocationMatch, MemoryStore, MockNotifier, MockSource, RawPosting, RunContext, SourceAdapter,
    SqliteStore, StoreStats,
};
use proptest::prelude::*;

fn posting(title: &str, company: &str, url: &str) -> RawPosting {
    RawPosting::new(title, url).with_company(company)
}

fn three_postings() -> Vec<RawPosting> {
    vec![
        posting("Backend Intern", "Acme", "https://jobs.lever.co/acme/1"),
        posting("Frontend Intern", "Acme", "https://jobs.lever.co/acme/2"),
        posting("Data Science Intern", "Globex", "https://boards.greenhouse.io/globex/jobs/3"),
    ]
}

fn sources(source: &MockSource) -> Vec<Box<dyn SourceAdapter>> {
    vec![Box::new(source.clone())]
}

#[tokio::test]
async fn test_second_identical_run_inserts_nothing() {
    let store = MemoryStore::new();
    let source = MockSource::new("lever").with_postings(three_postings());
    let ctx = RunContext::new();
    let policy = FilterPolicy::default();

    let first = ingest(&sources(&source), &ctx, &policy, &store).await.unwrap();
    assert_eq!(first.new_jobs(), 3);

    let second = ingest(&sources(&source), &ctx, &policy, &store).await.unwrap();
    assert_eq!(second.new_jobs(), 0);
    assert_eq!(second.duplicates, 3);
    assert_eq!(store.stats().await.unwrap().total, 3);
    assert_eq!(source.calls().len(), 2);
}

#[tokio::test]
async fn test_same_posting_from_two_sources_is_one_record() {
    let store = MemoryStore::new();
    let same = posting("SWE Intern", "Acme", "https://acme.com/careers/1");
    let list: Vec<Box<dyn SourceAdapter>> = vec![
        Box::new(MockSource::new("linkedin").with_posting(same.clone())),
        Box::new(MockSource::new("indeed").with_posting(same)),
    ];

    let result = ingest(&list, &RunContext::new(), &FilterPolicy::default(), &store)
        .await
        .unwrap();

    assert_eq!(result.fetched, 2);
    assert_eq!(result.new_jobs(), 1);
    assert_eq!(result.duplicates, 1);
    assert_eq!(result.new_records[0].source, "linkedin");
}

#[tokio::test]
async fn test_stats_follow_mark_notified() {
    let store = MemoryStore::new();
    let source = MockSource::new("lever").with_postings(three_postings());

    let result = ingest(&sources(&source), &RunContext::new(), &FilterPolicy::default(), &store)
        .await
        .unwrap();
    assert_eq!(
        store.stats().await.unwrap(),
        StoreStats {
            total: 3,
            notified: 0,
            pending: 3,
            sources: 1
        }
    );

    store
        .mark_notified(&result.new_records[0].identity)
        .await
        .unwrap();
    store
        .mark_notified(&result.new_records[1].identity)
        .await
        .unwrap();

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.notified, 2);
}

#[tokio::test]
async fn test_long_description_stored_truncated() {
    let store = SqliteStore::in_memory().await.unwrap();
    let source = MockSource::new("greenhouse").with_posting(
        posting("ML Intern", "Acme", "https://a.co/ml").with_description("é".repeat(800)),
    );

    let result = ingest(&sources(&source), &RunContext::new(), &FilterPolicy::default(), &store)
        .await
        .unwrap();

    let stored = store
        .get(&result.new_records[0].identity)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.description.chars().count(), 500);
}

#[tokio::test]
async fn test_client_side_filtering() {
    let store = MemoryStore::new();
    let source = MockSource::new("greenhouse")
        .with_filter_mode(FilterMode::ClientSide(LocationMatch::Substring))
        .with_postings([
            posting("Backend Engineering Intern", "Acme", "https://a.co/1"),
            posting("Backend Engineer", "Acme", "https://a.co/2"),
            posting("Data Intern", "Acme", "https://a.co/3"),
        ]);
    let ctx = RunContext::new().with_keywords(["backend"]);

    let result = ingest(&sources(&source), &ctx, &FilterPolicy::default(), &store)
        .await
        .unwrap();

    assert_eq!(result.new_jobs(), 1);
    assert_eq!(result.new_records[0].title, "Backend Engineering Intern");
    assert_eq!(result.filtered_out, 2);
}

#[tokio::test]
async fn test_query_matched_source_skips_keyword_filter() {
    let store = MemoryStore::new();
    let source = MockSource::new("linkedin")
        .with_filter_mode(FilterMode::QueryMatched)
        .with_postings([posting("Data Intern", "Acme", "https://a.co/3")]);
    let ctx = RunContext::new()
        .with_keywords(["machine learning"])
        .with_locations(["Seattle"]);

    let result = ingest(&sources(&source), &ctx, &FilterPolicy::default(), &store)
        .await
        .unwrap();

    assert_eq!(result.new_jobs(), 1);
}

#[tokio::test]
async fn test_delivery_marks_only_after_success() {
    let store = SqliteStore::in_memory().await.unwrap();
    let source = MockSource::new("lever").with_postings(three_postings());
    ingest(&sources(&source), &RunContext::new(), &FilterPolicy::default(), &store)
        .await
        .unwrap();

    let notifier = MockNotifier::new().failing();
    let report = deliver_pending(&store, &notifier).await.unwrap();
    assert_eq!(report.delivered, 0);
    assert_eq!(store.list_unnotified().await.unwrap().len(), 3);

    // A later run finds nothing new but the backlog is still delivered
    let rerun = ingest(&sources(&source), &RunContext::new(), &FilterPolicy::default(), &store)
        .await
        .unwrap();
    assert_eq!(rerun.new_jobs(), 0);

    notifier.set_failing(false);
    let report = deliver_pending(&store, &notifier).await.unwrap();
    assert_eq!(report.delivered, 3);
    assert!(store.list_unnotified().await.unwrap().is_empty());

    // Nothing is delivered twice
    let report = deliver_pending(&store, &notifier).await.unwrap();
    assert_eq!(report.pending, 0);
    assert_eq!(notifier.batches().len(), 2);
}

#[tokio::test]
async fn test_notified_is_monotonic() {
    let store = SqliteStore::in_memory().await.unwrap();
    let job = JobRecord::new("SWE Intern", "Acme", "https://a.co/1", "test");

    store.insert_if_absent(&job).await.unwrap();
    store.mark_notified(&job.identity).await.unwrap();
    store.mark_notified(&job.identity).await.unwrap();

    // Re-inserting the same identity cannot reset the flag
    assert!(!store.insert_if_absent(&job).await.unwrap());
    assert!(store.get(&job.identity).await.unwrap().unwrap().notified);
}

#[tokio::test]
async fn test_concurrent_runs_insert_once() {
    let store = Arc::new(MemoryStore::new());
    let source = MockSource::new("lever").with_postings(three_postings());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            let list = sources(&source);
            tokio::spawn(async move {
                ingest(&list, &RunContext::new(), &FilterPolicy::default(), store.as_ref())
                    .await
                    .unwrap()
                    .new_jobs()
            })
        })
        .collect();

    let mut total_new = 0;
    for handle in handles {
        total_new += handle.await.unwrap();
    }

    assert_eq!(total_new, 3);
    assert_eq!(store.stats().await.unwrap().total, 3);
}

#[tokio::test]
async fn test_file_backed_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("jobs.db").display());
    let source = MockSource::new("lever").with_postings(three_postings());

    {
        let store = SqliteStore::new(&url).await.unwrap();
        let result = ingest(&sources(&source), &RunContext::new(), &FilterPolicy::default(), &store)
            .await
            .unwrap();
        assert_eq!(result.new_jobs(), 3);
        store.pool().close().await;
    }

    let store = SqliteStore::new(&url).await.unwrap();
    let result = ingest(&sources(&source), &RunContext::new(), &FilterPolicy::default(), &store)
        .await
        .unwrap();
    assert_eq!(result.new_jobs(), 0);
    assert_eq!(store.stats().await.unwrap().pending, 3);
}

#[tokio::test]
async fn test_legacy_scheme_matches_existing_archive() {
    let store = MemoryStore::new();
    let archived = JobRecord::with_scheme(
        IdentityScheme::Legacy,
        "Backend Intern",
        "Acme",
        "https://jobs.lever.co/acme/1",
        "lever-acme",
    );
    store.insert_if_absent(&archived).await.unwrap();

    let source = MockSource::new("lever").with_postings(three_postings());
    let policy = FilterPolicy::default().with_identity_scheme(IdentityScheme::Legacy);
    let result = ingest(&sources(&source), &RunContext::new(), &policy, &store)
        .await
        .unwrap();

    assert_eq!(result.new_jobs(), 2);
    assert_eq!(result.duplicates, 1);
}

proptest! {
    #[test]
    fn identity_is_deterministic(
        title in ".{0,40}",
        company in ".{0,20}",
        url in "https://[a-z]{1,10}\\.com/[0-9]{1,5}",
    ) {
        for scheme in [IdentityScheme::Delimited, IdentityScheme::Legacy] {
            prop_assert_eq!(
                scheme.identity(&title, &company, &url),
                scheme.identity(&title, &company, &url)
            );
        }
    }

    #[test]
    fn different_titles_give_different_identities(
        a in "[A-Za-z ]{1,30}",
        b in "[A-Za-z ]{1,30}",
        company in "[A-Za-z]{1,15}",
    ) {
        prop_assume!(a != b);
        let url = "https://example.com/job/1";
        prop_assert_ne!(
            IdentityScheme::Delimited.identity(&a, &company, url),
            IdentityScheme::Delimited.identity(&b, &company, url)
        );
    }
}
