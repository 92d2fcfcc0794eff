// Three-panel PNG: price with EMAs, RSI, MACD, under a title band
pub mod labels;
pub mod png;

use crate::model::{ChartSeries, RenderError};
use ab_glyph::FontArc;
use image::{ImageBuffer, Rgb};
use plotters::coord::Shift;
use plotters::prelude::*;
use self::labels::Canvas;
use self::png::encode_png;
use std::ops::Range;

pub const WIDTH: u32 = 900;
pub const HEIGHT: u32 = 1050;
const TITLE_HEIGHT: u32 = 48;
const AXIS_GUTTER: u32 = 72;

static FONT_DATA: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

const PRICE: RGBColor = RGBColor(31, 119, 180);
const EMA50: RGBColor = RGBColor(255, 127, 14);
const EMA200: RGBColor = RGBColor(44, 160, 44);
const RSI: RGBColor = RGBColor(128, 0, 128);
const OVERBOUGHT: RGBColor = RGBColor(214, 39, 40);
const OVERSOLD: RGBColor = RGBColor(44, 160, 44);
const MACD: RGBColor = RGBColor(34, 150, 243);
const MACD_SIGNAL: RGBColor = RGBColor(255, 109, 1);
const ZERO_LINE: RGBColor = RGBColor(128, 128, 128);
const FRAME: RGBColor = RGBColor(200, 200, 200);

type Panel<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Named lines and horizontal reference levels of one panel.
struct PanelLayout<'a> {
    lines: Vec<(&'static str, &'a [f64], RGBColor)>,
    references: Vec<(f64, RGBColor)>,
}

/// Where a panel's plotting area ended up, in image pixels, and its value range.
struct PanelFrame {
    x: Range<i32>,
    y: Range<i32>,
    y_min: f64,
    y_max: f64,
}

impl PanelFrame {
    fn pixel_y(&self, value: f64) -> i32 {
        let height = f64::from(self.y.end - self.y.start);
        let share = (self.y_max - value) / (self.y_max - self.y_min);
        self.y.start + (share * height).round() as i32
    }
}

fn rgb(color: RGBColor) -> Rgb<u8> {
    Rgb([color.0, color.1, color.2])
}

fn draw_err<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::Draw(e.to_string())
}

fn check(series: &ChartSeries) -> Result<usize, RenderError> {
    let named = [
        ("price", &series.price),
        ("ema50", &series.ema50),
        ("ema200", &series.ema200),
        ("rsi", &series.rsi),
        ("macd", &series.macd),
        ("signal", &series.signal),
    ];
    let len = series.price.len();
    for (name, values) in named {
        if values.len() != len {
            return Err(RenderError::LengthMismatch);
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(RenderError::InvalidInput(name));
        }
    }
    Ok(len)
}

/// Value range covering every line and reference, padded so flat input stays visible.
fn y_range<'a>(values: impl Iterator<Item = &'a f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(*v), hi.max(*v))
    });
    if !min.is_finite() {
        return (0.0, 1.0);
    }
    let span = max - min;
    let pad = if span > f64::EPSILON * max.abs().max(1.0) {
        span * 0.05
    } else {
        (max.abs() * 0.01).max(1.0)
    };
    (min - pad, max + pad)
}

fn draw_panel(area: &Panel<'_>, len: usize, layout: &PanelLayout<'_>) -> Result<PanelFrame, RenderError> {
    let x_max = len.saturating_sub(1).max(1) as f64;
    let (y_min, y_max) = y_range(
        layout.lines
            .iter()
            .flat_map(|(_, values, _)| values.iter())
            .chain(layout.references.iter().map(|(y, _)| y)),
    );

    let mut chart = ChartBuilder::on(area)
        .margin(12)
        .margin_left(AXIS_GUTTER)
        .build_cartesian_2d(0f64..x_max, y_min..y_max)
        .map_err(draw_err)?;

    chart
        .plotting_area()
        .draw(&Rectangle::new(
            [(0.0, y_min), (x_max, y_max)],
            ShapeStyle::from(&FRAME).stroke_width(1),
        ))
        .map_err(draw_err)?;

    for (y, color) in &layout.references {
        chart
            .draw_series(LineSeries::new(
                [(0.0, *y), (x_max, *y)],
                ShapeStyle::from(color).stroke_width(1),
            ))
            .map_err(draw_err)?;
    }

    for (_, values, color) in &layout.lines {
        let points: Vec<(f64, f64)> = if values.len() == 1 {
            // a single sample is drawn as a flat line across the panel
            vec![(0.0, values[0]), (x_max, values[0])]
        } else {
            values.iter().enumerate().map(|(i, v)| (i as f64, *v)).collect()
        };
        chart
            .draw_series(LineSeries::new(points, ShapeStyle::from(color).stroke_width(2)))
            .map_err(draw_err)?;
    }

    let (x, y) = chart.plotting_area().get_pixel_range();
    Ok(PanelFrame { x, y, y_min, y_max })
}

/// Legend in the panel's top-left corner, the range ends and every reference level on the axis.
fn annotate(img: &mut Canvas, font: &FontArc, frame: &PanelFrame, layout: &PanelLayout<'_>) {
    let entries: Vec<(&str, Rgb<u8>)> = layout
        .lines
        .iter()
        .map(|(name, _, color)| (*name, rgb(*color)))
        .collect();
    labels::draw_legend(img, font, frame.x.start + 8, frame.y.start + 8, &entries);

    let right = frame.x.start - 6;
    let min_gap = labels::AXIS_SCALE.y.ceil() as i32;
    let mut drawn: Vec<i32> = Vec::new();
    let ticks = [frame.y_max, frame.y_min]
        .into_iter()
        .chain(layout.references.iter().map(|(value, _)| *value));
    for value in ticks {
        let y = frame.pixel_y(value);
        if drawn.iter().any(|other| (other - y).abs() < min_gap) {
            continue;
        }
        labels::draw_axis_value(img, font, right, y, value);
        drawn.push(y);
    }
}

fn draw_chart(symbol: &str, series: &ChartSeries) -> Result<Canvas, RenderError> {
    let len = check(series)?;
    let font = FontArc::try_from_slice(FONT_DATA).map_err(|e| RenderError::Font(e.to_string()))?;

    let panels = [
        PanelLayout {
            lines: vec![
                ("Price", series.price.as_slice(), PRICE),
                ("EMA50", series.ema50.as_slice(), EMA50),
                ("EMA200", series.ema200.as_slice(), EMA200),
            ],
            references: vec![],
        },
        PanelLayout {
            lines: vec![("RSI", series.rsi.as_slice(), RSI)],
            references: vec![(70.0, OVERBOUGHT), (30.0, OVERSOLD)],
        },
        PanelLayout {
            lines: vec![
                ("MACD", series.macd.as_slice(), MACD),
                ("Signal", series.signal.as_slice(), MACD_SIGNAL),
            ],
            references: vec![(0.0, ZERO_LINE)],
        },
    ];

    let mut buffer = vec![0u8; (WIDTH * HEIGHT * 3) as usize];

    // The backend borrows `buffer`; it must be dropped before the pixels are reused.
    let frames = {
        let root = BitMapBackend::with_buffer(&mut buffer, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;
        let (_, body) = root.split_vertically(TITLE_HEIGHT);
        let areas = body.split_evenly((3, 1));

        let mut frames = Vec::with_capacity(panels.len());
        for (area, layout) in areas.iter().zip(&panels) {
            frames.push(draw_panel(area, len, layout)?);
        }
        root.present().map_err(draw_err)?;
        frames
    };

    let mut img: Canvas = ImageBuffer::from_raw(WIDTH, HEIGHT, buffer)
        .ok_or_else(|| RenderError::Draw("bitmap buffer has the wrong size".into()))?;

    labels::draw_title(&mut img, &font, &format!("{symbol} Technical View"), TITLE_HEIGHT);
    for (frame, layout) in frames.iter().zip(&panels) {
        annotate(&mut img, &font, frame, layout);
    }
    Ok(img)
}

/// Renders the titled three-panel chart for `symbol` and returns the PNG bytes.
pub fn render_chart(symbol: &str, series: &ChartSeries) -> Result<Vec<u8>, RenderError> {
    let img = draw_chart(symbol, series)?;
    Ok(encode_png(&img)?)
}
