use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use series_chart::data_types::{
    OptionsError, Resolution, SeriesSourceOptions, TimeRange, ValuePoint, ZoneConfig,
};
use series_chart::loader::MemoryLoader;
use series_chart::series_source::{LoadOutcome, SeriesKey, SeriesSource, SourceError};
use series_chart::source_factory::SeriesSourceFactory;
use std::sync::Arc;

fn t(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)
}

fn r(start: i64, end: i64) -> TimeRange {
    TimeRange::new(t(start), t(end)).unwrap()
}

fn points(start: i64, end: i64) -> Vec<ValuePoint> {
    (start..end)
        .map(|m| ValuePoint {
            time: t(m),
            value: m as f64,
        })
        .collect()
}

fn loader() -> Arc<MemoryLoader<ValuePoint>> {
    Arc::new(MemoryLoader::new(points(0, 1000)))
}

fn source(loader: &Arc<MemoryLoader<ValuePoint>>) -> SeriesSource<ValuePoint> {
    SeriesSource::new(
        SeriesKey::new("TEST", Resolution::Minute1),
        ZoneConfig::new(5, 20),
        loader.clone(),
    )
}

/// Callback recording every outcome it receives.
fn recorder() -> (Arc<Mutex<Vec<LoadOutcome>>>, impl FnOnce(&LoadOutcome) + Send + 'static) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (seen, move |outcome: &LoadOutcome| sink.lock().push(outcome.clone()))
}

#[tokio::test]
async fn test_cold_query_plans_load_zone() {
    let loader = loader();
    let source = source(&loader);

    let query = source.query(&r(100, 160));
    assert!(query.items.is_none());
    assert_eq!(query.load, Some(r(80, 180)));
    assert_eq!(loader.call_count(), 0);
}

#[tokio::test]
async fn test_load_fills_cache_and_calls_back_once() {
    let loader = loader();
    let source = source(&loader);
    let (seen, on_loaded) = recorder();

    let task = source.load_items(r(80, 180), on_loaded).unwrap();
    assert!(source.is_loading());
    assert_eq!(source.in_flight(), Some(r(80, 180)));

    let loaded = task.await.unwrap();
    assert_eq!(loaded.range, r(80, 180));
    assert_eq!(loaded.item_count, 100);
    assert!(!source.is_loading());
    assert_eq!(seen.lock().len(), 1);

    let query = source.query(&r(100, 160));
    assert_eq!(query.items.map(|i| i.len()), Some(60));
    assert_eq!(query.load, None);
    assert_eq!(source.get_items(t(100), t(102)).unwrap()[1].value, 101.0);
    assert!(source.get_items(t(102), t(100)).is_none());
}

#[tokio::test]
async fn test_scrolling_near_the_edge_prefetches_missing_part() {
    let loader = loader();
    let source = source(&loader);
    source.load_items(r(80, 180), |_| {}).unwrap().await.unwrap();

    // Buffer zone [115, 183) pokes past the cached end.
    let query = source.query(&r(120, 178));
    assert_eq!(query.items.map(|i| i.len()), Some(58));
    assert_eq!(query.load, Some(r(180, 198)));

    source.load_items(r(180, 198), |_| {}).unwrap().await.unwrap();
    assert_eq!(source.chunk_count(), 1);
    assert_eq!(source.cached_bounds(), Some(r(80, 198)));
    assert_eq!(loader.requests().last().unwrap().range, r(180, 198));
}

#[tokio::test]
async fn test_single_load_in_flight() {
    let loader = loader();
    let source = source(&loader);

    let first = source.load_items(r(0, 10), |_| {}).unwrap();
    assert!(source.load_items(r(20, 30), |_| {}).is_none());
    first.await.unwrap();
    assert!(source.load_items(r(20, 30), |_| {}).is_some());
}

#[tokio::test]
async fn test_dropped_task_releases_slot() {
    let loader = loader();
    let source = source(&loader);

    let task = source.load_items(r(0, 10), |_| {}).unwrap();
    drop(task);
    assert!(!source.is_loading());
    assert_eq!(loader.call_count(), 0);
}

#[tokio::test]
async fn test_failed_load_leaves_cache_untouched() {
    let loader = loader();
    let source = source(&loader);
    source.load_items(r(0, 10), |_| {}).unwrap().await.unwrap();

    loader.set_failing(true);
    let (seen, on_loaded) = recorder();
    let outcome = source.load_items(r(10, 20), on_loaded).unwrap().await;

    assert!(matches!(outcome, Err(SourceError::Load { range, .. }) if range == r(10, 20)));
    assert_eq!(seen.lock().len(), 1);
    assert!(seen.lock()[0].is_err());
    assert!(!source.is_loading());
    assert_eq!(source.cached_bounds(), Some(r(0, 10)));

    // The window can be retried.
    loader.set_failing(false);
    source.load_items(r(10, 20), |_| {}).unwrap().await.unwrap();
    assert_eq!(source.cached_bounds(), Some(r(0, 20)));
}

#[tokio::test]
async fn test_invalidate_discards_late_loads() {
    let loader = Arc::new(
        MemoryLoader::new(points(0, 1000)).with_delay(std::time::Duration::from_millis(20)),
    );
    let source = source(&loader);
    source.load_items(r(0, 10), |_| {}).unwrap().await.unwrap();

    let late = source.load_items(r(10, 20), |_| {}).unwrap();
    source.invalidate();
    assert_eq!(source.chunk_count(), 0);
    assert!(!source.is_loading());

    let fresh = source.load_items(r(50, 60), |_| {}).unwrap();
    let outcome = late.await;
    assert!(matches!(outcome, Err(SourceError::Stale { .. })));
    // The stale task must not release the slot of the fresh one.
    assert!(source.is_loading());
    assert_eq!(source.chunk_count(), 0);

    fresh.await.unwrap();
    assert_eq!(source.cached_bounds(), Some(r(50, 60)));
}

#[tokio::test]
async fn test_horizon_clips_future_slots() {
    let loader = loader();
    let source = source(&loader);
    source.set_horizon(Some(t(150) + Duration::seconds(30)));

    let query = source.query(&r(100, 200));
    assert_eq!(query.load, Some(r(80, 151)));

    source.load_items(r(80, 151), |_| {}).unwrap().await.unwrap();
    let query = source.query(&r(100, 200));
    assert_eq!(query.load, None);
    assert_eq!(query.items.map(|i| i.len()), Some(51));
}

#[tokio::test]
async fn test_push_live_extends_cache() {
    let loader = loader();
    let source = source(&loader);
    source.set_horizon(Some(t(150)));
    source.load_items(r(80, 151), |_| {}).unwrap().await.unwrap();

    assert!(source.push_live(ValuePoint {
        time: t(151),
        value: -1.0
    }));
    assert_eq!(source.cached_bounds(), Some(r(80, 152)));
    assert_eq!(source.item_at_or_before(t(151)).unwrap().value, -1.0);
    assert!(!source.push_live(ValuePoint {
        time: t(160),
        value: -2.0
    }));
}

#[tokio::test]
async fn test_factory_memoizes_sources() {
    let loader = loader();
    let options = SeriesSourceOptions::uniform(ZoneConfig::new(5, 20));
    let factory = SeriesSourceFactory::<ValuePoint>::new(loader.clone(), options).unwrap();

    let a = factory.source("TEST", Resolution::Minute1);
    a.load_items(r(0, 10), |_| {}).unwrap().await.unwrap();

    let again = factory.source("TEST", Resolution::Minute1);
    assert_eq!(again.chunk_count(), 1);
    assert_eq!(factory.source_count(), 1);

    let coarse = factory.source("TEST", Resolution::Minute5);
    assert_eq!(coarse.chunk_count(), 0);
    assert_eq!(factory.source_count(), 2);

    factory.invalidate_all();
    assert_eq!(again.chunk_count(), 0);
}

#[test]
fn test_factory_uses_per_resolution_zones() {
    let options = SeriesSourceOptions::uniform(ZoneConfig::new(5, 20))
        .with_zone(Resolution::Day1, ZoneConfig::new(2, 4));
    let factory = SeriesSourceFactory::<ValuePoint>::new(loader(), options).unwrap();
    assert_eq!(factory.source("X", Resolution::Day1).zones(), ZoneConfig::new(2, 4));
    assert_eq!(factory.source("X", Resolution::Hour1).zones(), ZoneConfig::new(5, 20));
}

#[test]
fn test_factory_rejects_invalid_options() {
    let options = SeriesSourceOptions::uniform(ZoneConfig::new(0, 20));
    let err = SeriesSourceFactory::<ValuePoint>::new(loader(), options).err().unwrap();
    assert_eq!(err, OptionsError::ZeroBufferZone("default".to_string()));

    let options =
        SeriesSourceOptions::default().with_zone(Resolution::Hour1, ZoneConfig::new(10, 5));
    assert!(matches!(
        options.validate(),
        Err(OptionsError::LoadZoneTooSmall { buffer: 10, load: 5, .. })
    ));
}
