use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use series_chart::cache::{CacheChunk, ChunkError, SeriesCache};
use series_chart::data_types::{Resolution, TimeRange, ValuePoint};

fn t(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)
}

fn r(start: i64, end: i64) -> TimeRange {
    TimeRange::new(t(start), t(end)).unwrap()
}

fn p(minute: i64, value: f64) -> ValuePoint {
    ValuePoint {
        time: t(minute),
        value,
    }
}

/// Chunk with one point per minute of `[start, end)`, all holding `value`.
fn chunk(start: i64, end: i64, value: f64) -> CacheChunk<ValuePoint> {
    CacheChunk::new(r(start, end), (start..end).map(|m| p(m, value)).collect()).unwrap()
}

fn values(items: &[ValuePoint]) -> Vec<f64> {
    items.iter().map(|i| i.value).collect()
}

#[test]
fn test_chunk_new_validates_items() {
    let unordered = CacheChunk::new(r(0, 10), vec![p(2, 0.0), p(1, 0.0)]);
    assert_eq!(unordered.unwrap_err(), ChunkError::Unordered { index: 1 });

    let outside = CacheChunk::new(r(0, 10), vec![p(10, 0.0)]);
    assert!(matches!(outside, Err(ChunkError::OutOfRange { .. })));
}

#[test]
fn test_from_loaded_normalizes() {
    let items = vec![p(3, 1.0), p(1, 1.0), p(3, 2.0), p(12, 1.0), p(-1, 1.0)];
    let chunk = CacheChunk::from_loaded(r(0, 10), items);
    assert_eq!(chunk.len(), 2);
    assert_eq!(chunk.items()[0].time, t(1));
    // The last duplicate wins.
    assert_eq!(chunk.items()[1].value, 2.0);
}

#[test]
fn test_merge_rejects_disjoint_chunks() {
    let err = chunk(0, 5, 0.0).merge(chunk(6, 10, 1.0)).unwrap_err();
    assert_eq!(
        err,
        ChunkError::Disjoint {
            left: r(0, 5),
            right: r(6, 10)
        }
    );
}

#[test]
fn test_merge_newer_wins_on_overlap() {
    let older = chunk(0, 10, 0.0);
    // Newer chunk knows [4, 8) but has no item at minute 5.
    let newer = CacheChunk::new(r(4, 8), vec![p(4, 1.0), p(6, 1.0), p(7, 1.0)]).unwrap();
    let merged = older.merge(newer).unwrap();
    assert_eq!(merged.range(), r(0, 10));
    assert_eq!(
        values(merged.items()),
        vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0]
    );
}

#[test]
fn test_touching_chunks_merge() {
    let mut cache = SeriesCache::new();
    cache.insert(chunk(0, 10, 0.0));
    cache.insert(chunk(10, 20, 1.0));
    assert_eq!(cache.chunk_count(), 1);
    assert_eq!(cache.bounds(), Some(r(0, 20)));
    assert_eq!(cache.item_count(), 20);
}

#[test]
fn test_disjoint_chunks_stay_apart_until_bridged() {
    let mut cache = SeriesCache::new();
    cache.insert(chunk(20, 30, 0.0));
    cache.insert(chunk(0, 10, 0.0));
    assert_eq!(cache.chunk_count(), 2);
    assert_eq!(cache.chunks()[0].range(), r(0, 10));
    assert!(cache.get_items(&r(5, 25)).is_none());
    assert_eq!(cache.missing(&r(5, 35)), vec![r(10, 20), r(30, 35)]);

    cache.insert(chunk(8, 22, 1.0));
    assert_eq!(cache.chunk_count(), 1);
    let items = cache.get_items(&r(5, 25)).unwrap();
    assert_eq!(items.len(), 20);
    assert_eq!(items[2].value, 0.0);
    assert_eq!(items[3].value, 1.0);
    assert_eq!(items[17].value, 0.0);
    assert!(cache.missing(&r(0, 30)).is_empty());
}

#[test]
fn test_get_items_edges() {
    let mut cache = SeriesCache::new();
    assert!(cache.get_items(&r(0, 1)).is_none());
    assert_eq!(cache.get_items(&r(3, 3)), Some(&[][..]));

    cache.insert(chunk(0, 10, 0.0));
    // The end is exclusive.
    let items = cache.get_items(&r(0, 10)).unwrap();
    assert_eq!(items.last().unwrap().time, t(9));
    assert!(cache.get_items(&r(0, 11)).is_none());
}

#[test]
fn test_item_at_or_before() {
    let mut cache = SeriesCache::new();
    cache.insert(CacheChunk::new(r(0, 10), vec![p(2, 2.0), p(6, 6.0)]).unwrap());
    assert_eq!(cache.item_at_or_before(t(5)).unwrap().value, 2.0);
    assert_eq!(cache.item_at_or_before(t(6)).unwrap().value, 6.0);
    assert!(cache.item_at_or_before(t(1)).is_none());
    assert!(cache.item_at_or_before(t(10)).is_none());
}

#[test]
fn test_upsert_live_extends_last_chunk() {
    let mut cache = SeriesCache::new();
    assert!(!cache.upsert_live(p(0, 0.0), Resolution::Minute1));

    cache.insert(chunk(0, 10, 0.0));
    // Update of the last slot in place.
    assert!(cache.upsert_live(p(9, 5.0), Resolution::Minute1));
    assert_eq!(cache.item_count(), 10);
    // A new slot right after the end stretches the chunk.
    assert!(cache.upsert_live(p(10, 6.0), Resolution::Minute1));
    assert_eq!(cache.bounds(), Some(r(0, 11)));
    // A slot past the end would open a hole.
    assert!(!cache.upsert_live(p(12, 7.0), Resolution::Minute1));
    assert_eq!(cache.item_count(), 11);
}

#[test]
fn test_random_inserts_keep_cache_consistent() {
    const SPAN: i64 = 200;
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..50 {
        let mut cache = SeriesCache::new();
        // Latest insertion covering each minute, if any.
        let mut expected: Vec<Option<f64>> = vec![None; SPAN as usize];

        for n in 0..20 {
            let start = rng.random_range(0..SPAN - 1);
            let end = rng.random_range(start + 1..=(start + 30).min(SPAN));
            cache.insert(chunk(start, end, n as f64));
            for slot in &mut expected[start as usize..end as usize] {
                *slot = Some(n as f64);
            }

            let chunks = cache.chunks();
            for pair in chunks.windows(2) {
                assert!(
                    pair[0].range().end() < pair[1].range().start(),
                    "chunks {} and {} should have been merged",
                    pair[0].range(),
                    pair[1].range()
                );
            }
            for c in chunks {
                for w in c.items().windows(2) {
                    assert!(w[0].time < w[1].time);
                }
                assert!(c.items().iter().all(|i| c.range().contains(i.time)));
            }
        }

        for (minute, want) in expected.iter().enumerate() {
            let m = minute as i64;
            let got = cache.get_items(&r(m, m + 1)).map(values);
            assert_eq!(got, want.map(|v| vec![v]), "minute {m}");
        }
    }
}
