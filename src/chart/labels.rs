// Text overlays drawn on the finished bitmap
use ab_glyph::{Font, PxScale};
use image::{ImageBuffer, Rgb};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

pub type Canvas = ImageBuffer<Rgb<u8>, Vec<u8>>;

pub const TITLE_SCALE: PxScale = PxScale { x: 26.0, y: 26.0 };
pub const LEGEND_SCALE: PxScale = PxScale { x: 16.0, y: 16.0 };
pub const AXIS_SCALE: PxScale = PxScale { x: 14.0, y: 14.0 };

const TEXT_COLOR: Rgb<u8> = Rgb([33, 33, 33]);
const LEGEND_BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const LEGEND_BORDER: Rgb<u8> = Rgb([200, 200, 200]);

const SWATCH_WIDTH: u32 = 18;
const SWATCH_HEIGHT: u32 = 4;
const GAP: u32 = 6;
const PADDING: u32 = 5;

/// Axis values: whole numbers once they are large, two decimals otherwise.
pub fn format_value(value: f64) -> String {
    if value.abs() >= 1000.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Centers `text` in the band of `band_height` pixels at the top of the image.
pub fn draw_title(img: &mut Canvas, font: &impl Font, text: &str, band_height: u32) {
    let (width, height) = text_size(TITLE_SCALE, font, text);
    let x = img.width().saturating_sub(width) / 2;
    let y = band_height.saturating_sub(height) / 2;
    draw_text_mut(img, TEXT_COLOR, x as i32, y as i32, TITLE_SCALE, font, text);
}

/// One row of colour swatches and names, boxed, with its top-left corner at `(x, y)`.
pub fn draw_legend(
    img: &mut Canvas,
    font: &impl Font,
    x: i32,
    y: i32,
    entries: &[(&str, Rgb<u8>)],
) -> Option<Rect> {
    if entries.is_empty() {
        return None;
    }

    let row_height = LEGEND_SCALE.y.ceil() as u32;
    let widths: Vec<u32> = entries
        .iter()
        .map(|(name, _)| text_size(LEGEND_SCALE, font, name).0)
        .collect();
    let content: u32 = widths.iter().map(|w| SWATCH_WIDTH + GAP + w + 2 * GAP).sum();
    let frame = Rect::at(x, y).of_size(content + PADDING, row_height + 2 * PADDING);

    draw_filled_rect_mut(img, frame, LEGEND_BORDER);
    draw_filled_rect_mut(
        img,
        Rect::at(x + 1, y + 1).of_size(frame.width() - 2, frame.height() - 2),
        LEGEND_BACKGROUND,
    );

    let mut cursor = x + (PADDING + GAP) as i32;
    let swatch_y = y + ((frame.height() - SWATCH_HEIGHT) / 2) as i32;
    for ((name, color), width) in entries.iter().zip(widths) {
        draw_filled_rect_mut(
            img,
            Rect::at(cursor, swatch_y).of_size(SWATCH_WIDTH, SWATCH_HEIGHT),
            *color,
        );
        cursor += (SWATCH_WIDTH + GAP) as i32;
        draw_text_mut(img, TEXT_COLOR, cursor, y + PADDING as i32, LEGEND_SCALE, font, name);
        cursor += (width + 2 * GAP) as i32;
    }
    Some(frame)
}

/// Right-aligns a tick value against `right`, vertically centred on `center_y`.
pub fn draw_axis_value(img: &mut Canvas, font: &impl Font, right: i32, center_y: i32, value: f64) {
    let text = format_value(value);
    let (width, height) = text_size(AXIS_SCALE, font, &text);
    let x = (right - width as i32).max(0);
    let y = (center_y - height as i32 / 2).max(0);
    draw_text_mut(img, TEXT_COLOR, x, y, AXIS_SCALE, font, &text);
}
