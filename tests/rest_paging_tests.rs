use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use series_chart::data_types::{Resolution, TimeRange};
use series_chart::loader::{LoadRequest, SeriesLoader};
use series_chart::rest::{RestCandleLoader, RestEndpointConfig};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

type Query = HashMap<String, String>;

fn t(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)
}

fn row(minute: i64) -> String {
    format!(r#"[{}, "1", "2", "0.5", "1.5", "10"]"#, t(minute).timestamp_millis())
}

/// Rows for `minutes` that fall inside the requested `[startTime, endTime]`,
/// capped at `limit`, like a kline endpoint.
fn page_of(minutes: std::ops::Range<i64>, query: &Query) -> String {
    let start: i64 = query["startTime"].parse().unwrap();
    let end: i64 = query["endTime"].parse().unwrap();
    let limit: usize = query["limit"].parse().unwrap();
    let rows: Vec<String> = minutes
        .filter(|m| (start..=end).contains(&t(*m).timestamp_millis()))
        .take(limit)
        .map(row)
        .collect();
    format!("[{}]", rows.join(","))
}

/// Serves `handler`'s body for every request and records each query.
fn serve(handler: impl Fn(&Query) -> String + Send + 'static) -> (String, Arc<Mutex<Vec<Query>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut header = String::new();
                if reader.read_line(&mut header).unwrap() == 0 || header == "\r\n" {
                    break;
                }
            }

            let target = request_line.split_whitespace().nth(1).unwrap_or_default();
            let query: Query = target
                .split_once('?')
                .map(|(_, q)| q)
                .unwrap_or_default()
                .split('&')
                .filter_map(|pair| pair.split_once('='))
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();

            let body = handler(&query);
            log.lock().push(query);
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
    (base_url, seen)
}

fn loader(base_url: String, page_limit: u32) -> RestCandleLoader {
    let config = RestEndpointConfig {
        base_url,
        page_limit,
        ..Default::default()
    };
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    RestCandleLoader::with_client(config, http).unwrap()
}

fn request(start: i64, end: i64) -> LoadRequest {
    LoadRequest {
        symbol: "BTCUSDT".into(),
        resolution: Resolution::Minute1,
        range: TimeRange::new(t(start), t(end)).unwrap(),
    }
}

fn start_times(seen: &Mutex<Vec<Query>>) -> Vec<DateTime<Utc>> {
    seen.lock()
        .iter()
        .map(|q| Utc.timestamp_millis_opt(q["startTime"].parse().unwrap()).unwrap())
        .collect()
}

#[tokio::test]
async fn test_pages_forward_until_short_page() {
    let (base_url, seen) = serve(|q| page_of(0..5, q));
    let candles = loader(base_url, 2).load(&request(0, 10)).await.unwrap();

    let times: Vec<_> = candles.iter().map(|c| c.time).collect();
    assert_eq!(times, (0..5).map(t).collect::<Vec<_>>());
    // Each page starts one slot after the previous page's last row.
    assert_eq!(start_times(&seen), vec![t(0), t(2), t(4)]);

    let seen = seen.lock();
    let first = &seen[0];
    assert_eq!(first["symbol"], "BTCUSDT");
    assert_eq!(first["interval"], "1m");
    assert_eq!(first["limit"], "2");
    assert_eq!(first["endTime"], (t(10).timestamp_millis() - 1).to_string());
}

#[tokio::test]
async fn test_stops_when_range_is_exhausted() {
    let (base_url, seen) = serve(|q| page_of(0..100, q));
    let candles = loader(base_url, 2).load(&request(0, 4)).await.unwrap();

    assert_eq!(candles.len(), 4);
    assert_eq!(start_times(&seen), vec![t(0), t(2)]);
}

#[tokio::test]
async fn test_stops_on_empty_page() {
    let (base_url, seen) = serve(|_| "[]".to_string());
    let candles = loader(base_url, 2).load(&request(0, 10)).await.unwrap();

    assert!(candles.is_empty());
    assert_eq!(seen.lock().len(), 1);
}

#[tokio::test]
async fn test_stops_when_cursor_does_not_advance() {
    // Ignores startTime and keeps answering with the same full page.
    let (base_url, seen) = serve(|_| format!("[{},{}]", row(0), row(1)));
    let candles = loader(base_url, 2).load(&request(0, 10)).await.unwrap();

    assert_eq!(start_times(&seen), vec![t(0), t(2)]);
    assert_eq!(candles.len(), 4);
}

#[tokio::test]
async fn test_malformed_page_fails_the_load() {
    let (base_url, _) = serve(|_| r#"[[1704067200000, "NaN", "2", "0.5", "1.5", "1"]]"#.to_string());
    let err = loader(base_url, 2).load(&request(0, 10)).await.unwrap_err();
    assert!(format!("{err:#}").contains("bad kline page"));
}
