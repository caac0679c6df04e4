use chrono::{DateTime, Duration, TimeZone, Utc};
use series_chart::data_types::{
    Candle, CandlestickConfig, LinePlotConfig, RangePlotConfig, RangePoint, Resolution, ValuePoint,
};
use series_chart::plot_types::{CandlestickPlot, LinePlot, PlotRenderer, RangePlot};
use series_chart::rendering::{DrawCommand, Point, RecordingCanvas, Rect};
use series_chart::scales::ChartScale;
use series_chart::transform::{PlotTransform, TimeAxisMapping};

fn t(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)
}

/// Ten one-minute slots of 10 px over a 0..100 value axis.
fn transform() -> PlotTransform {
    let time = TimeAxisMapping {
        right_edge: t(10),
        plot_width: 100.0,
        resolution: Resolution::Minute1,
        item_width: 10.0,
    };
    PlotTransform::new(
        time,
        ChartScale::new_linear((0.0, 100.0), (100.0, 0.0)),
        Rect::new(0.0, 0.0, 100.0, 100.0),
    )
}

fn candle(minute: i64, open: f64, high: f64, low: f64, close: f64) -> Candle {
    Candle {
        time: t(minute),
        open,
        high,
        low,
        close,
        volume: 1.0,
    }
}

#[test]
fn test_candlestick_geometry() {
    let config = CandlestickConfig::default();
    let plot = CandlestickPlot::new(config.clone());
    let mut canvas = RecordingCanvas::new();
    plot.render(
        &[candle(2, 40.0, 70.0, 30.0, 60.0), candle(4, 60.0, 65.0, 35.0, 40.0)],
        &transform(),
        &mut canvas,
    );

    assert_eq!(
        canvas.commands[0],
        DrawCommand::Line {
            from: Point::new(25.0, 30.0),
            to: Point::new(25.0, 70.0),
            color: config.up_color,
            width: 1.0,
        }
    );
    assert_eq!(
        canvas.commands[1],
        DrawCommand::FillRect {
            rect: Rect::new(21.0, 40.0, 8.0, 20.0),
            color: config.up_color,
        }
    );
    assert!(matches!(
        canvas.commands[3],
        DrawCommand::FillRect { color, .. } if color == config.down_color
    ));
}

#[test]
fn test_candlestick_minimum_sizes() {
    let plot = CandlestickPlot::default();
    assert_eq!(plot.body_width(0.5), 1.0);

    let mut canvas = RecordingCanvas::new();
    plot.render(&[candle(3, 50.0, 50.0, 50.0, 50.0)], &transform(), &mut canvas);
    let body = canvas.rects().next().unwrap();
    assert_eq!(body.height, 1.0);
}

#[test]
fn test_line_breaks_on_missing_values() {
    let values = [1.0, 2.0, f64::NAN, 3.0, 4.0];
    let items: Vec<ValuePoint> = values
        .iter()
        .enumerate()
        .map(|(i, v)| ValuePoint {
            time: t(i as i64),
            value: *v,
        })
        .collect();

    let mut canvas = RecordingCanvas::new();
    LinePlot::new(LinePlotConfig::default()).render(&items, &transform(), &mut canvas);

    let runs: Vec<usize> = canvas
        .commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Polyline { points, .. } => Some(points.len()),
            _ => None,
        })
        .collect();
    assert_eq!(runs, vec![2, 2]);
}

#[test]
fn test_range_band() {
    let items: Vec<RangePoint> = (0..3)
        .map(|m| RangePoint {
            time: t(m),
            low: 10.0,
            high: 20.0,
        })
        .collect();

    let mut canvas = RecordingCanvas::new();
    RangePlot::new(RangePlotConfig::default()).render(&items, &transform(), &mut canvas);

    match &canvas.commands[0] {
        DrawCommand::Polygon { points, .. } => {
            assert_eq!(points.len(), 6);
            assert_eq!(points[0], Point::new(5.0, 80.0));
            assert_eq!(points[5], Point::new(5.0, 90.0));
        }
        other => panic!("expected the band fill first, got {other:?}"),
    }
    assert_eq!(canvas.commands.len(), 3);
}
