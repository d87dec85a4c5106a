//! Bar chart of one numeric field across fetched records.
//!
//! Charting never fails a request: every error is logged and turns into
//! "no chart".

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use crate::records::{FetchedRecords, Record};

/// Field whose values are plotted.
pub const FIELD_TO_PLOT: &str = "field_to_plot";

/// Directory charts are written to unless configured otherwise.
pub const DEFAULT_CHART_DIR: &str = "/tmp";

/// Label under the category axis.
pub const X_LABEL: &str = "Records";

const WIDTH: u32 = 1000;
const HEIGHT: u32 = 600;

// Plot area margins in pixels.
const MARGIN_LEFT: u32 = 100;
const MARGIN_RIGHT: u32 = 40;
const MARGIN_TOP: u32 = 60;
const MARGIN_BOTTOM: u32 = 60;

// Bars take this share of their slot.
const BAR_FILL: f64 = 0.8;

// Glyphs are 8x8; text is drawn at an integer multiple of that.
const GLYPH: i64 = 8;
const TITLE_SCALE: i64 = 2;
const LABEL_SCALE: i64 = 1;

const TARGET_TICKS: f64 = 5.0;
const TICK_LEN: f64 = 6.0;
const MAX_CATEGORY_LABELS: usize = 20;

const BACKGROUND: [u8; 3] = [255, 255, 255];
const BAR_COLOR: [u8; 3] = [31, 119, 180];
const AXIS_COLOR: [u8; 3] = [64, 64, 64];
const TEXT_COLOR: [u8; 3] = [0, 0, 0];

/// Chart rendering errors.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("record {index}: field_to_plot is not numeric: {value}")]
    NonNumeric { index: usize, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encoding error: {0}")]
    Encoding(#[from] png::EncodingError),
}

/// Writes bar charts as PNG files into one directory.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    output_dir: PathBuf,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_CHART_DIR)
    }
}

impl ChartRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Output path for `record_type`. Each render overwrites it.
    ///
    /// Path separators in the record type are replaced so the file always
    /// lands directly in the output directory.
    pub fn chart_path(&self, record_type: &str) -> PathBuf {
        let stem: String = record_type
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
            .collect();
        self.output_dir.join(format!("{stem}_analysis.png"))
    }

    /// Plot [`FIELD_TO_PLOT`] of every record that has it.
    ///
    /// Returns `None` without touching the filesystem when `data` is an
    /// error message, empty, or has no record with the field.
    pub fn render_chart(&self, record_type: &str, data: &FetchedRecords) -> Option<PathBuf> {
        let records = data.as_ref().ok()?;
        if records.is_empty() {
            return None;
        }

        match self.try_render(record_type, records) {
            Ok(path) => path,
            Err(e) => {
                error!(record_type, error = %e, "Graph generation error");
                None
            }
        }
    }

    fn try_render(
        &self,
        record_type: &str,
        records: &[Record],
    ) -> Result<Option<PathBuf>, ChartError> {
        let values = extract_values(records)?;
        if values.is_empty() {
            debug!(record_type, "no records carry field_to_plot, skipping chart");
            return Ok(None);
        }

        let title = format!("Data Analysis for {record_type}");
        let canvas = draw_chart(&title, &values);
        let path = self.chart_path(record_type);
        write_png(&path, &canvas.pixels, &title)?;

        debug!(record_type, bars = values.len(), path = %path.display(), "chart written");
        Ok(Some(path))
    }
}

/// Numeric values of [`FIELD_TO_PLOT`], in record order.
fn extract_values(records: &[Record]) -> Result<Vec<f64>, ChartError> {
    records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| record.get(FIELD_TO_PLOT).map(|v| (index, v)))
        .map(|(index, value)| {
            as_number(value).ok_or_else(|| ChartError::NonNumeric {
                index,
                value: value.to_string(),
            })
        })
        .collect()
}

fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// RGB raster of `WIDTH` x `HEIGHT`.
struct Canvas {
    pixels: Vec<u8>,
}

impl Canvas {
    fn new() -> Self {
        Self {
            pixels: BACKGROUND.repeat((WIDTH * HEIGHT) as usize),
        }
    }

    fn put(&mut self, x: i64, y: i64, color: [u8; 3]) {
        if x < 0 || y < 0 || x >= WIDTH as i64 || y >= HEIGHT as i64 {
            return;
        }
        let offset = ((y as usize) * WIDTH as usize + x as usize) * 3;
        self.pixels[offset..offset + 3].copy_from_slice(&color);
    }

    fn fill_rect(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: [u8; 3]) {
        let clamp_x = |x: f64| x.round().clamp(0.0, WIDTH as f64) as u32;
        let clamp_y = |y: f64| y.round().clamp(0.0, HEIGHT as f64) as u32;
        let (x0, x1) = (clamp_x(x0), clamp_x(x1).max(clamp_x(x0) + 1).min(WIDTH));
        let (y0, y1) = (clamp_y(y0), clamp_y(y1).max(clamp_y(y0) + 1).min(HEIGHT));

        for y in y0..y1 {
            for x in x0..x1 {
                self.put(x as i64, y as i64, color);
            }
        }
    }

    /// Left-to-right text with its top-left corner at (`x`, `y`).
    fn text(&mut self, x: i64, y: i64, text: &str, scale: i64) {
        for (i, ch) in text.chars().enumerate() {
            let origin = x + i as i64 * GLYPH * scale;
            self.glyph(ch, scale, |gx, gy| (origin + gx, y + gy));
        }
    }

    /// Bottom-to-top text with its bottom-left corner at (`x`, `bottom`).
    fn text_up(&mut self, x: i64, bottom: i64, text: &str, scale: i64) {
        for (i, ch) in text.chars().enumerate() {
            let origin = bottom - i as i64 * GLYPH * scale;
            self.glyph(ch, scale, |gx, gy| (x + gy, origin - gx));
        }
    }

    /// Plot one scaled glyph, mapping glyph-space offsets through `place`.
    fn glyph(&mut self, ch: char, scale: i64, place: impl Fn(i64, i64) -> (i64, i64)) {
        for (row, bits) in glyph_rows(ch).iter().enumerate() {
            for col in 0..GLYPH {
                if bits & (1 << col) == 0 {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        let (x, y) = place(col * scale + dx, row as i64 * scale + dy);
                        self.put(x, y, TEXT_COLOR);
                    }
                }
            }
        }
    }
}

fn glyph_rows(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or_default()
}

fn text_width(text: &str, scale: i64) -> i64 {
    text.chars().count() as i64 * GLYPH * scale
}

/// Tick step of 1, 2 or 5 times a power of ten giving about
/// `TARGET_TICKS` intervals over `span`.
fn tick_step(span: f64) -> f64 {
    let raw = span / TARGET_TICKS;
    let magnitude = 10f64.powf(raw.log10().floor());
    let nice = match raw / magnitude {
        n if n <= 1.0 => 1.0,
        n if n <= 2.0 => 2.0,
        n if n <= 5.0 => 5.0,
        _ => 10.0,
    };
    nice * magnitude
}

/// Tick values on the value axis between `lo` and `hi`, inclusive.
fn tick_values(lo: f64, hi: f64) -> (Vec<f64>, f64) {
    let step = tick_step(hi - lo);
    let first = (lo / step - 1e-9).ceil() as i64;
    let last = (hi / step + 1e-9).floor() as i64;
    ((first..=last).map(|k| k as f64 * step).collect(), step)
}

fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 {
        0
    } else {
        (-step.log10()).ceil() as usize
    };
    // Avoid "-0".
    let value = if value.abs() < step * 1e-6 { 0.0 } else { value };
    format!("{value:.decimals$}")
}

/// Draw bars, axes, ticks, title and axis labels.
fn draw_chart(title: &str, values: &[f64]) -> Canvas {
    let mut canvas = Canvas::new();

    let plot_left = MARGIN_LEFT as f64;
    let plot_right = (WIDTH - MARGIN_RIGHT) as f64;
    let plot_top = MARGIN_TOP as f64;
    let plot_bottom = (HEIGHT - MARGIN_BOTTOM) as f64;

    // The value axis always includes zero so bars grow from a baseline.
    let lo = values.iter().copied().fold(0.0_f64, f64::min);
    let hi = values.iter().copied().fold(0.0_f64, f64::max);
    let hi = if hi > lo { hi } else { lo + 1.0 };
    let to_y = |v: f64| plot_bottom - (v - lo) / (hi - lo) * (plot_bottom - plot_top);
    let baseline = to_y(0.0);

    let slot = (plot_right - plot_left) / values.len() as f64;
    let bar_width = (slot * BAR_FILL).max(1.0);
    let label_every = values.len().div_ceil(MAX_CATEGORY_LABELS);

    for (i, &v) in values.iter().enumerate() {
        let center = plot_left + slot * (i as f64 + 0.5);
        let (y0, y1) = if v >= 0.0 {
            (to_y(v), baseline)
        } else {
            (baseline, to_y(v))
        };
        canvas.fill_rect(center - bar_width / 2.0, y0, center + bar_width / 2.0, y1, BAR_COLOR);

        if i % label_every == 0 {
            let label = i.to_string();
            let x = center as i64 - text_width(&label, LABEL_SCALE) / 2;
            canvas.text(x, plot_bottom as i64 + 6, &label, LABEL_SCALE);
        }
    }

    // Value axis on the left, category axis along the zero line.
    canvas.fill_rect(plot_left - 1.0, plot_top, plot_left + 1.0, plot_bottom, AXIS_COLOR);
    canvas.fill_rect(plot_left, baseline - 1.0, plot_right, baseline + 1.0, AXIS_COLOR);

    let (ticks, step) = tick_values(lo, hi);
    for tick in ticks {
        let y = to_y(tick);
        canvas.fill_rect(plot_left - TICK_LEN, y - 0.5, plot_left, y + 0.5, AXIS_COLOR);
        let label = format_tick(tick, step);
        let x = (plot_left - TICK_LEN) as i64 - 4 - text_width(&label, LABEL_SCALE);
        canvas.text(x, y as i64 - GLYPH * LABEL_SCALE / 2, &label, LABEL_SCALE);
    }

    let title_x = (WIDTH as i64 - text_width(title, TITLE_SCALE)) / 2;
    let title_y = (MARGIN_TOP as i64 - GLYPH * TITLE_SCALE) / 2;
    canvas.text(title_x.max(0), title_y, title, TITLE_SCALE);

    let plot_center_x = ((plot_left + plot_right) / 2.0) as i64;
    canvas.text(
        plot_center_x - text_width(X_LABEL, LABEL_SCALE) / 2,
        HEIGHT as i64 - MARGIN_BOTTOM as i64 / 2,
        X_LABEL,
        LABEL_SCALE,
    );

    let plot_center_y = ((plot_top + plot_bottom) / 2.0) as i64;
    canvas.text_up(
        10,
        plot_center_y + text_width(FIELD_TO_PLOT, LABEL_SCALE) / 2,
        FIELD_TO_PLOT,
        LABEL_SCALE,
    );

    canvas
}

/// Encode `pixels` as an RGB PNG at `path`. The title and axis labels are
/// also kept as text chunks for tools that read image metadata.
fn write_png(path: &Path, pixels: &[u8], title: &str) -> Result<(), ChartError> {
    let file = File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), WIDTH, HEIGHT);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.add_itxt_chunk("Title".to_string(), title.to_string())?;
    encoder.add_itxt_chunk("XLabel".to_string(), X_LABEL.to_string())?;
    encoder.add_itxt_chunk("YLabel".to_string(), FIELD_TO_PLOT.to_string())?;

    let mut writer = encoder.write_header()?;
    writer.write_image_data(pixels)?;
    writer.finish()?;
    Ok(())
}
