//! Integration tests for the in-memory link store
//!
//! These tests drive the public store API the way the HTTP layer does and
//! use a manual clock to exercise expiry deterministically.

use chrono::{Duration, TimeZone, Utc};
use hoplink::models::{ClickContext, NewLink, Validity};
use hoplink::store::{LinkStore, ManualClock, RandomShortcodeGenerator, StoreError};
use std::collections::HashSet;
use std::sync::Arc;

/// Helper to create a store whose clock only moves when told to
fn create_test_store() -> (Arc<LinkStore>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
    ));
    let store = LinkStore::with_parts(
        clock.clone(),
        Arc::new(RandomShortcodeGenerator::default()),
        10,
    );
    (Arc::new(store), clock)
}

fn click_from(ip: &str) -> ClickContext {
    ClickContext {
        referrer: None,
        user_agent: Some("integration-test".to_string()),
        source_ip: Some(ip.to_string()),
    }
}

#[test]
fn test_create_then_lookup_returns_original_url() {
    let (store, _) = create_test_store();

    for (url, validity) in [
        ("https://example.com/a", Validity::Minutes(1)),
        ("http://example.org/path?q=1#frag", Validity::Minutes(60 * 24)),
        ("ftp://files.example.net/pub", Validity::Never),
    ] {
        let created = store.create_short_url(NewLink::new(url, validity)).unwrap();
        let found = store.get_original_url(&created.shortcode).unwrap();

        assert_eq!(found.original_url, url);
        assert_eq!(found.shortcode, created.shortcode);
        assert_eq!(found.expires_at, created.expires_at);
    }
}

#[test]
fn test_generated_shortcodes_are_unique() {
    let (store, _) = create_test_store();

    let codes: HashSet<String> = (0..500)
        .map(|i| {
            store
                .create_short_url(NewLink::new(
                    format!("https://example.com/{i}"),
                    Validity::Never,
                ))
                .unwrap()
                .shortcode
        })
        .collect();

    assert_eq!(codes.len(), 500);
    assert!(codes.iter().all(|c| c.len() == 6));
    assert_eq!(store.len(), 500);
}

#[test]
fn test_custom_shortcode_collision() {
    let (store, _) = create_test_store();
    let link = |url: &str| NewLink::new(url, Validity::Minutes(10)).with_shortcode("launch");

    let first = store.create_short_url(link("https://example.com/1")).unwrap();
    assert_eq!(first.shortcode, "launch");

    let err = store
        .create_short_url(link("https://example.com/2"))
        .unwrap_err();
    assert_eq!(err, StoreError::ShortcodeCollision);

    // The original mapping is untouched
    assert_eq!(
        store.get_original_url("launch").unwrap().original_url,
        "https://example.com/1"
    );
}

#[test]
fn test_invalid_inputs_are_rejected() {
    let (store, _) = create_test_store();

    assert_eq!(
        store
            .create_short_url(NewLink::new("not-a-url", Validity::Never))
            .unwrap_err(),
        StoreError::InvalidUrl
    );
    assert_eq!(
        store
            .create_short_url(NewLink::new("https://example.com", Validity::Never).with_shortcode(
                "x".repeat(21)
            ))
            .unwrap_err(),
        StoreError::InvalidShortcodeFormat
    );
    assert_eq!(
        store
            .create_short_url(NewLink::new("https://example.com", Validity::Minutes(0)))
            .unwrap_err(),
        StoreError::InvalidValidity
    );
    assert!(store.is_empty());
}

#[test]
fn test_expiry_boundary() {
    let (store, clock) = create_test_store();

    let expiring = store
        .create_short_url(NewLink::new("https://example.com/soon", Validity::Minutes(1)))
        .unwrap();
    let forever = store
        .create_short_url(NewLink::new("https://example.com/forever", Validity::Never))
        .unwrap();

    assert!(store.get_original_url(&expiring.shortcode).is_some());

    // Still served at exactly the expiry instant
    clock.advance(Duration::minutes(1));
    assert!(store.get_original_url(&expiring.shortcode).is_some());

    clock.advance(Duration::seconds(1));
    assert!(store.get_original_url(&expiring.shortcode).is_none());
    assert_eq!(
        store.resolve(&expiring.shortcode).unwrap_err(),
        StoreError::Expired
    );

    clock.advance(Duration::days(365 * 100));
    assert!(store.get_original_url(&forever.shortcode).is_some());
    assert!(forever.expires_at.is_none());
}

#[test]
fn test_click_counting() {
    let (store, _) = create_test_store();
    let link = store
        .create_short_url(NewLink::new("https://example.com", Validity::Never))
        .unwrap();

    for _ in 0..7 {
        store.record_click(&link.shortcode, click_from("8.8.8.8"));
    }

    let analytics = store.get_analytics(&link.shortcode).unwrap();
    assert_eq!(analytics.total_clicks, 7);
    assert_eq!(analytics.click_events.len(), 7);
    assert_eq!(store.get_original_url(&link.shortcode).unwrap().click_count, 7);
}

#[test]
fn test_record_click_on_missing_shortcode_is_silent() {
    let (store, _) = create_test_store();

    store.record_click("nothing", click_from("127.0.0.1"));

    assert!(store.is_empty());
    assert!(store.get_analytics("nothing").is_none());
}

#[test]
fn test_analytics_visible_after_expiry() {
    let (store, clock) = create_test_store();
    let link = store
        .create_short_url(NewLink::new("https://example.com", Validity::Minutes(5)))
        .unwrap();
    store.record_click(&link.shortcode, click_from("192.168.0.10"));

    clock.advance(Duration::hours(2));

    assert!(store.get_original_url(&link.shortcode).is_none());
    let analytics = store.get_analytics(&link.shortcode).unwrap();
    assert_eq!(analytics.total_clicks, 1);
    assert_eq!(analytics.click_events[0].location, "Local Network");
}

#[test]
fn test_deletion() {
    let (store, _) = create_test_store();
    let keep = store
        .create_short_url(NewLink::new("https://example.com/keep", Validity::Never))
        .unwrap();
    let gone = store
        .create_short_url(NewLink::new("https://example.com/gone", Validity::Never))
        .unwrap();
    store.record_click(&gone.shortcode, click_from("1.1.1.1"));

    assert!(store.delete_url(&gone.shortcode));
    assert!(store.get_original_url(&gone.shortcode).is_none());
    assert!(store.get_analytics(&gone.shortcode).is_none());

    assert!(!store.delete_url("missing"));
    assert!(!store.delete_url(&gone.shortcode));
    assert_eq!(store.len(), 1);
    assert!(store.get_original_url(&keep.shortcode).is_some());
}

#[test]
fn test_get_all_urls_in_insertion_order_with_validity() {
    let (store, clock) = create_test_store();
    let names = ["first", "second", "third"];
    for (i, name) in names.iter().enumerate() {
        let validity = if i == 1 {
            Validity::Minutes(1)
        } else {
            Validity::Never
        };
        store
            .create_short_url(
                NewLink::new(format!("https://example.com/{name}"), validity).with_shortcode(*name),
            )
            .unwrap();
    }

    let all = store.get_all_urls();
    assert_eq!(
        all.iter().map(|s| s.record.shortcode.as_str()).collect::<Vec<_>>(),
        names
    );
    assert!(all.iter().all(|s| s.is_valid));

    // Listing treats the expiry instant itself as no longer valid
    clock.advance(Duration::minutes(1));
    let all = store.get_all_urls();
    assert!(all[0].is_valid);
    assert!(!all[1].is_valid);
    assert!(all[2].is_valid);
}

#[test]
fn test_aggregate_analytics() {
    let (store, clock) = create_test_store();

    // Created long before the window
    let old = store
        .create_short_url(NewLink::new("https://example.com/old", Validity::Never))
        .unwrap();
    store.record_click(&old.shortcode, click_from("8.8.8.8"));

    clock.advance(Duration::days(30));

    let mut codes = Vec::new();
    for (i, clicks) in [5, 3, 9, 1].into_iter().enumerate() {
        let validity = if i == 3 {
            Validity::Minutes(1)
        } else {
            Validity::Never
        };
        let link = store
            .create_short_url(NewLink::new(format!("https://example.com/{i}"), validity))
            .unwrap();
        for _ in 0..clicks {
            store.record_click(&link.shortcode, click_from("8.8.8.8"));
        }
        codes.push(link.shortcode);
    }

    clock.advance(Duration::days(1));

    let aggregate = store.aggregate_analytics(Default::default());

    assert_eq!(aggregate.total_urls, 5);
    assert_eq!(aggregate.stats.total_urls, 4);
    assert_eq!(aggregate.stats.total_clicks, 18);
    assert_eq!(aggregate.stats.active_urls, 3);
    assert_eq!(aggregate.stats.expired_urls, 1);
    assert_eq!(aggregate.stats.avg_clicks_per_url, 5);

    let top: Vec<u64> = aggregate
        .top_urls
        .iter()
        .map(|s| s.record.click_count)
        .collect();
    assert_eq!(top, vec![9, 5, 3, 1]);
    assert_eq!(aggregate.top_urls[0].record.shortcode, codes[2]);

    // All 18 in-window clicks happened yesterday; the old link's click is excluded
    assert_eq!(aggregate.click_trends.len(), 7);
    let yesterday = &aggregate.click_trends[5];
    assert_eq!(yesterday.clicks, 18);
    assert_eq!(
        aggregate.click_trends.iter().map(|d| d.clicks).sum::<u64>(),
        18
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creation_and_clicks() {
    let (store, _) = create_test_store();
    let target = store
        .create_short_url(NewLink::new("https://example.com/hot", Validity::Never))
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..20 {
        let store = Arc::clone(&store);
        let hot = target.shortcode.clone();
        handles.push(tokio::spawn(async move {
            let mut created = Vec::new();
            for j in 0..10 {
                store.record_click(&hot, click_from("10.0.0.1"));
                let link = store
                    .create_short_url(NewLink::new(
                        format!("https://example.com/{i}/{j}"),
                        Validity::Minutes(30),
                    ))
                    .unwrap();
                created.push(link.shortcode);
            }
            created
        }));
    }

    let mut all_codes = HashSet::new();
    for handle in handles {
        for code in handle.await.unwrap() {
            assert!(all_codes.insert(code), "duplicate shortcode handed out");
        }
    }

    assert_eq!(all_codes.len(), 200);
    assert_eq!(store.len(), 201);

    let analytics = store.get_analytics(&target.shortcode).unwrap();
    assert_eq!(analytics.total_clicks, 200);
    assert_eq!(analytics.click_events.len(), 200);
}
