use chrono::{DateTime, Duration, TimeZone, Utc};
use series_chart::data_types::Resolution;
use series_chart::rendering::{Point, Rect};
use series_chart::scales::{ChartScale, ScaleKind};
use series_chart::transform::{PlotTransform, TimeAxisMapping};

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

fn mapping() -> TimeAxisMapping {
    TimeAxisMapping {
        right_edge: noon(),
        plot_width: 600.0,
        resolution: Resolution::Minute1,
        item_width: 10.0,
    }
}

#[test]
fn test_chart_scale_linear() {
    let scale = ChartScale::new_linear((0.0, 100.0), (0.0, 500.0));

    assert_eq!(scale.map(0.0), 0.0);
    assert_eq!(scale.map(50.0), 250.0);
    assert_eq!(scale.map(100.0), 500.0);

    assert_eq!(scale.invert(0.0), 0.0);
    assert_eq!(scale.invert(250.0), 50.0);
    assert_eq!(scale.invert(500.0), 100.0);
}

#[test]
fn test_chart_scale_log() {
    let scale = ChartScale::new(ScaleKind::Log, (1.0, 1000.0), (300.0, 0.0));
    assert_eq!(scale.map(1.0), 300.0);
    assert!((scale.map(10.0) - 200.0).abs() < 1e-3);
    assert!((scale.invert(100.0) - 100.0).abs() < 1e-6);
    let ticks = scale.ticks(5);
    for decade in [1.0, 10.0, 100.0, 1000.0] {
        assert!(ticks.iter().any(|t| (t - decade).abs() < 1e-9), "missing {decade}");
    }
    assert!(ticks.iter().all(|t| (1.0..=1000.0).contains(t)));
}

#[test]
fn test_chart_scale_formatting() {
    let scale = ChartScale::new_linear((0.0, 1.0), (0.0, 100.0));
    assert_eq!(scale.format_tick(0.0), "0");
    assert_eq!(scale.format_tick(0.000123), "0.000123");
    assert_eq!(scale.format_tick(0.5), "0.5000");
    assert_eq!(scale.format_tick(123.456), "123.46");
    assert_eq!(scale.format_tick(1234.56), "1235");
}

#[test]
fn test_mapping_is_anchored_right() {
    let m = mapping();
    assert_eq!(m.ms_per_px(), 6_000.0);
    assert_eq!(m.instant_to_x(noon()), 600.0);
    assert_eq!(m.instant_to_x(noon() - Duration::minutes(30)), 300.0);
    assert_eq!(m.x_to_instant(0.0), noon() - Duration::hours(1));
}

#[test]
fn test_mapping_visible_range_and_slots() {
    let m = mapping();
    let visible = m.visible_range();
    assert_eq!(visible.start(), noon() - Duration::hours(1));
    assert_eq!(visible.end(), noon());

    let slot = m.slot_at_x(5.0);
    assert_eq!(slot, noon() - Duration::hours(1));
    assert_eq!(m.slot_center_x(slot), 5.0);
    assert_eq!(m.slot_at_x(15.0), slot + Duration::minutes(1));
}

#[test]
fn test_plot_transform() {
    let y_scale = ChartScale::new_linear((0.0, 100.0), (200.0, 0.0));
    let bounds = Rect::new(40.0, 20.0, 600.0, 200.0);
    let transform = PlotTransform::new(mapping(), y_scale, bounds);

    let p = transform.data_to_screen(noon() - Duration::minutes(30), 50.0);
    assert_eq!(p, Point::new(340.0, 120.0));
    assert_eq!(transform.slot_center_to_screen(noon() - Duration::minutes(30)), 345.0);

    let (t, v) = transform.screen_to_data(p);
    assert_eq!(t, noon() - Duration::minutes(30));
    assert!((v - 50.0).abs() < 1e-6);
}
