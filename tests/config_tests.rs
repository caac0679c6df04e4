use series_chart::config::ChartConfig;
use series_chart::data_types::{Resolution, ZoneConfig};
use series_chart::theme::Color;

#[test]
fn test_defaults_are_valid() {
    let config = ChartConfig::default();
    config.validate().unwrap();
    assert_eq!(config.zoom_levels[0].resolution, Resolution::Minute1);
    assert!(config.endpoint.is_none());
}

#[test]
fn test_partial_json_fills_defaults() {
    let config = ChartConfig::from_json_str(
        r##"{
            "timezone": "Europe/Paris",
            "initial_zoom": 1,
            "source": { "zones": { "1h": { "buffer_zone": 10, "load_zone": 40 } } },
            "theme": { "up": "#00ff00" },
            "endpoint": { "base_url": "http://localhost:9000" }
        }"##,
    )
    .unwrap();

    assert_eq!(config.timezone, chrono_tz::Europe::Paris);
    assert_eq!(config.initial_zoom, 1);
    assert_eq!(config.source.zones_for(Resolution::Hour1), ZoneConfig::new(10, 40));
    assert_eq!(config.source.zones_for(Resolution::Minute1), ZoneConfig::default());
    assert_eq!(config.theme.up, Color::rgb(0, 0xff, 0));
    assert_eq!(config.theme.down, ChartConfig::default().theme.down);

    let endpoint = config.endpoint.unwrap();
    assert_eq!(endpoint.base_url, "http://localhost:9000");
    assert_eq!(endpoint.path, "/api/v3/klines");
    assert_eq!(endpoint.page_limit, 1000);
}

#[test]
fn test_invalid_configs_are_rejected() {
    assert!(ChartConfig::from_json_str(r#"{ "initial_zoom": 42 }"#).is_err());
    assert!(ChartConfig::from_json_str(r#"{ "zoom_levels": [] }"#).is_err());
    let zero_width = r#"{ "zoom_levels": [{ "resolution": "1m", "item_width": 0 }], "initial_zoom": 0 }"#;
    assert!(ChartConfig::from_json_str(zero_width).is_err());
    let zero_buffer = r#"{ "source": { "default": { "buffer_zone": 0, "load_zone": 10 } } }"#;
    assert!(ChartConfig::from_json_str(zero_buffer).is_err());
    assert!(ChartConfig::from_json_str(r#"{ "timezone": "Mars/Olympus" }"#).is_err());
    assert!(ChartConfig::from_json_str(r#"{ "theme": { "up": "green" } }"#).is_err());
}

#[test]
fn test_from_path_reports_the_file() {
    let err = ChartConfig::from_path("/nonexistent/chart.json").unwrap_err();
    assert!(format!("{err:#}").contains("/nonexistent/chart.json"));
}

#[test]
fn test_from_path_reads_json() {
    let path = std::env::temp_dir().join(format!("series_chart_config_{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "time_axis_height": 30 }"#).unwrap();
    let config = ChartConfig::from_path(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(config.time_axis_height, 30.0);
}
