use chrono::{TimeZone, Utc};
use series_chart::rest::{decode_candle_rows, RestCandleLoader, RestEndpointConfig};

#[test]
fn test_decodes_string_and_number_fields() {
    let body = br#"[
        [1704067200000, "42000.5", "42100", "41950.25", "42050", "12.5", 1704067259999, "525000.0", 120, "6.1", "256000.0", "0"],
        [1704067260000, 42050, 42060.0, 42000, 42010, 3]
    ]"#;
    let candles = decode_candle_rows(body).unwrap();
    assert_eq!(candles.len(), 2);

    let first = &candles[0];
    assert_eq!(first.time, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    assert_eq!(first.open, 42000.5);
    assert_eq!(first.low, 41950.25);
    assert_eq!(first.volume, 12.5);

    let second = &candles[1];
    assert_eq!(second.time, Utc.with_ymd_and_hms(2024, 1, 1, 0, 1, 0).unwrap());
    assert_eq!(second.close, 42010.0);
    assert!(!second.is_up());
}

#[test]
fn test_empty_page() {
    assert!(decode_candle_rows(b"[]").unwrap().is_empty());
}

#[test]
fn test_malformed_rows_are_rejected() {
    // Too short.
    assert!(decode_candle_rows(br#"[[1704067200000, "1", "2", "0.5", "1.5"]]"#).is_err());
    // Not numeric.
    assert!(decode_candle_rows(br#"[[1704067200000, "abc", "2", "0.5", "1.5", "1"]]"#).is_err());
    // Non-finite prices.
    assert!(decode_candle_rows(br#"[[1704067200000, "NaN", "inf", "-inf", "nan", "1"]]"#).is_err());
    assert!(decode_candle_rows(br#"[[1704067200000, "1", "2", "0.5", "1.5", "infinity"]]"#).is_err());
    // Fractional open time.
    assert!(decode_candle_rows(br#"[[1704067200000.5, 1, 2, 0.5, 1.5, 1]]"#).is_err());
    // Not an array of rows.
    assert!(decode_candle_rows(br#"{"code": -1121, "msg": "Invalid symbol."}"#).is_err());
}

#[test]
fn test_loader_rejects_zero_page_limit() {
    let config = RestEndpointConfig {
        page_limit: 0,
        ..Default::default()
    };
    assert!(RestCandleLoader::new(config).is_err());
    assert!(RestCandleLoader::new(RestEndpointConfig::default()).is_ok());
}
