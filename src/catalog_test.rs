use super::*;
use crate::storage::{KeyValueStore, MemoryStore, RECORDINGS_KEY};
use chrono::{Duration as ChronoDuration, TimeZone};
use std::sync::Arc;

fn recording(id: &str) -> Recording {
    Recording {
        id: RecordingId::new(id),
        name: format!("Recording-{}", id),
        duration: "00:03".into(),
        uri: format!("file:///{}.m4a", id),
    }
}

fn catalog() -> (RecordingsCatalog, Arc<MemoryStore>) {
    let kv = Arc::new(MemoryStore::new());
    let catalog = RecordingsCatalog::new(RecordingStore::new(kv.clone()));
    (catalog, kv)
}

#[tokio::test]
async fn test_refresh_loads_in_insertion_order() {
    let (mut catalog, _kv) = catalog();
    catalog
        .store()
        .save_all(&[recording("2"), recording("1")])
        .await
        .unwrap();

    assert!(catalog.is_empty());
    catalog.refresh().await;

    let ids: Vec<_> = catalog.recordings().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "1"]);
}

#[tokio::test]
async fn test_refresh_with_corrupt_store_is_empty() {
    let (mut catalog, kv) = catalog();
    catalog.append(recording("1")).await.unwrap();
    kv.set(RECORDINGS_KEY, "[{".into()).await.unwrap();

    assert!(catalog.refresh().await.is_empty());
}

#[tokio::test]
async fn test_try_refresh_reports_corrupt_store() {
    let (mut catalog, kv) = catalog();
    catalog.append(recording("1")).await.unwrap();
    kv.set(RECORDINGS_KEY, "[{".into()).await.unwrap();

    assert!(matches!(
        catalog.try_refresh().await,
        Err(StoreError::Parse(_))
    ));
    assert_eq!(catalog.len(), 1);
}

#[tokio::test]
async fn test_append_then_refresh_finds_by_id() {
    let (mut catalog, _kv) = catalog();
    catalog.append(recording("20240307090542017")).await.unwrap();

    let mut fresh = RecordingsCatalog::new(catalog.store().clone());
    fresh.refresh().await;
    assert_eq!(
        fresh.find_by_id("20240307090542017"),
        Some(&recording("20240307090542017"))
    );
    assert!(fresh.find_by_id("missing").is_none());
}

#[tokio::test]
async fn test_append_failure_leaves_memory_unchanged() {
    let (mut catalog, _kv) = catalog();
    catalog.append(recording("1")).await.unwrap();

    assert!(catalog.append(recording("1")).await.is_err());
    assert_eq!(catalog.len(), 1);
}

#[tokio::test]
async fn test_find_by_id_matches_legacy_numeric_ids() {
    let (mut catalog, kv) = catalog();
    kv.set(
        RECORDINGS_KEY,
        r#"[{"id":1700000000000,"name":"n","duration":"00:01","uri":"u"}]"#.into(),
    )
    .await
    .unwrap();
    catalog.refresh().await;

    assert!(catalog.find_by_id("1700000000000").is_some());
    assert!(catalog.contains(&RecordingId::new("1700000000000")));
}

#[tokio::test]
async fn test_filter_by_created_on() {
    let (mut catalog, _kv) = catalog();
    let now = Local::now();
    let yesterday = now - ChronoDuration::days(1);
    let legacy_today = now.timestamp_millis().to_string();

    catalog
        .store()
        .save_all(&[
            recording(RecordingId::from_timestamp(&now).as_str()),
            recording(RecordingId::from_timestamp(&yesterday).as_str()),
            recording(&legacy_today),
            recording("not-a-timestamp"),
        ])
        .await
        .unwrap();
    catalog.refresh().await;

    let today: Vec<_> = catalog
        .todays_recordings()
        .into_iter()
        .map(|r| r.id.to_string())
        .collect();
    assert_eq!(
        today,
        vec![
            RecordingId::from_timestamp(&now).to_string(),
            legacy_today.clone()
        ]
    );

    let earlier = catalog.filter_by_created_on(yesterday.date_naive());
    assert_eq!(earlier.len(), 1);

    let fixed = Local
        .with_ymd_and_hms(2001, 1, 1, 0, 0, 0)
        .earliest()
        .unwrap()
        .date_naive();
    assert!(catalog.filter_by_created_on(fixed).is_empty());
}
