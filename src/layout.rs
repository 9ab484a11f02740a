//! Table-to-page layout: column scaling, cell text fitting, the per-page
//! header block and the row pagination loop.
//!
//! All positions are PDF user space (origin bottom-left). The vertical cursor
//! starts below the header bar and moves down one row height per record.

use crate::canvas::{DocumentCanvas, FontHandle, LineStyle, PageId, RectStyle, TextStyle};
use crate::error::Result;
use crate::font::FontVariant;
use crate::metrics::{PageMetrics, RenderMetrics};
use crate::row::RowRecord;
use crate::types::{Color, Point, Pt, Size};
use serde::{Deserialize, Serialize};
use std::time::Instant;

pub const ELLIPSIS: char = '\u{2026}';

const TITLE_COLOR: Color = Color::BLACK;
const META_COLOR: Color = Color {
    r: 0.25,
    g: 0.25,
    b: 0.25,
};
const HEADER_FILL: Color = Color {
    r: 0.2,
    g: 0.2,
    b: 0.2,
};
const HEADER_TEXT_COLOR: Color = Color::WHITE;
const HEADER_RULE_COLOR: Color = Color::BLACK;
const CELL_TEXT_COLOR: Color = Color::BLACK;
const CELL_RULE_COLOR: Color = Color {
    r: 0.85,
    g: 0.85,
    b: 0.85,
};
const ROW_RULE_COLOR: Color = Color {
    r: 0.75,
    g: 0.75,
    b: 0.75,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub key: String,
    pub label: String,
    #[serde(rename = "w", alias = "width")]
    pub width: Pt,
    #[serde(default)]
    pub align: Alignment,
}

impl ColumnSpec {
    pub fn new(key: impl Into<String>, label: impl Into<String>, width: f32) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            width: Pt::from_f32(width),
            align: Alignment::Left,
        }
    }

    pub fn align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }
}

/// A column with the width it is actually drawn at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledColumn<'a> {
    pub spec: &'a ColumnSpec,
    pub width: Pt,
}

#[derive(Debug, Clone)]
pub struct ScaledColumns<'a> {
    pub columns: Vec<ScaledColumn<'a>>,
    pub scaled: bool,
    pub available: Pt,
}

impl ScaledColumns<'_> {
    pub fn total_width(&self) -> Pt {
        self.columns.iter().map(|c| c.width).sum()
    }

    /// The minimum column width can leave the table wider than the page.
    pub fn overflows(&self) -> bool {
        self.total_width() > self.available
    }
}

/// Geometry and type sizes of a table export. Defaults mirror a half-inch
/// margin on A4.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableLayout {
    pub page_size: Size,
    pub margin: Pt,
    pub title_size: Pt,
    pub meta_size: Pt,
    pub header_size: Pt,
    pub cell_size: Pt,
    pub row_height: Pt,
    pub header_height: Pt,
    pub min_column_width: Pt,
    /// Total horizontal room reserved inside a cell when fitting text.
    pub cell_padding: Pt,
    /// Offset of left/right aligned text from the column edge.
    pub text_inset: Pt,
    pub title_gap: Pt,
    pub meta_gap: Pt,
    pub header_gap: Pt,
    /// Vertical band of the per-cell separators around the text baseline.
    pub rule_below_baseline: Pt,
    pub rule_above_baseline: Pt,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            page_size: Size::a4(),
            margin: Pt::from_i32(36),
            title_size: Pt::from_i32(20),
            meta_size: Pt::from_i32(10),
            header_size: Pt::from_i32(11),
            cell_size: Pt::from_i32(10),
            row_height: Pt::from_i32(20),
            header_height: Pt::from_i32(24),
            min_column_width: Pt::from_i32(40),
            cell_padding: Pt::from_i32(8),
            text_inset: Pt::from_i32(6),
            title_gap: Pt::from_i32(6),
            meta_gap: Pt::from_i32(10),
            header_gap: Pt::from_i32(8),
            rule_below_baseline: Pt::from_i32(6),
            rule_above_baseline: Pt::from_i32(14),
        }
    }
}

impl TableLayout {
    /// Distance from the top margin down to the first row baseline.
    pub fn header_block_height(&self) -> Pt {
        self.title_size
            + self.title_gap
            + self.meta_size
            + self.meta_gap
            + self.header_height
            + self.header_gap
    }

    /// Rows that fit on a page of `page_height` below the header block.
    pub fn rows_per_page(&self, page_height: Pt) -> usize {
        let first = page_height - self.margin - self.header_block_height();
        let floor = self.margin + self.row_height;
        if first < floor || self.row_height <= Pt::ZERO {
            return 0;
        }
        let spare = (first - floor).to_milli_i64();
        (spare / self.row_height.to_milli_i64()) as usize + 1
    }
}

/// Shrinks columns proportionally when their requested widths exceed
/// `available`. Each scaled width is floored to a whole point and held at or
/// above `min_width`.
pub fn scale_columns(columns: &[ColumnSpec], available: Pt, min_width: Pt) -> ScaledColumns<'_> {
    let requested: Pt = columns.iter().map(|c| c.width).sum();
    if requested <= available {
        return ScaledColumns {
            columns: columns
                .iter()
                .map(|spec| ScaledColumn {
                    spec,
                    width: spec.width,
                })
                .collect(),
            scaled: false,
            available,
        };
    }
    let columns = columns
        .iter()
        .map(|spec| ScaledColumn {
            spec,
            width: spec
                .width
                .mul_ratio_floor(available, requested)
                .floor()
                .max(min_width),
        })
        .collect();
    ScaledColumns {
        columns,
        scaled: true,
        available,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FittedText {
    pub text: String,
    pub truncated: bool,
}

/// Fits `text` into `cell_width - padding`, cutting it to the longest prefix
/// that still fits with a trailing ellipsis. When not even the ellipsis fits
/// the result is the ellipsis alone.
pub fn fit_text<F>(text: &str, cell_width: Pt, padding: Pt, mut measure: F) -> Result<FittedText>
where
    F: FnMut(&str) -> Result<Pt>,
{
    let limit = cell_width - padding;
    if measure(text)? <= limit {
        return Ok(FittedText {
            text: text.to_string(),
            truncated: false,
        });
    }

    // boundaries[n] is the byte length of the first n chars.
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(idx, _)| idx)
        .chain(std::iter::once(text.len()))
        .collect();
    let mut lo = 0usize;
    let mut hi = boundaries.len() - 1;
    let mut candidate = String::with_capacity(text.len() + ELLIPSIS.len_utf8());
    while lo < hi {
        let mid = (lo + hi + 1) / 2;
        candidate.clear();
        candidate.push_str(&text[..boundaries[mid]]);
        candidate.push(ELLIPSIS);
        if measure(&candidate)? <= limit {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }

    let mut out = String::with_capacity(boundaries[lo] + ELLIPSIS.len_utf8());
    out.push_str(&text[..boundaries[lo]]);
    out.push(ELLIPSIS);
    Ok(FittedText {
        text: out,
        truncated: true,
    })
}

/// X position of text of `text_width` inside a column starting at `x`.
pub fn aligned_x(align: Alignment, x: Pt, width: Pt, text_width: Pt, inset: Pt) -> Pt {
    match align {
        Alignment::Left => x + inset,
        Alignment::Center => x + (width - text_width) / 2,
        Alignment::Right => x + width - text_width - inset,
    }
}

/// Where drawing currently happens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageState {
    pub page: PageId,
    pub size: Size,
    pub cursor: Pt,
}

impl PageState {
    /// True when a row of `row_height` no longer fits above `margin`.
    pub fn needs_break(&self, margin: Pt, row_height: Pt) -> bool {
        self.cursor < margin + row_height
    }

    pub fn advance(self, row_height: Pt) -> PageState {
        PageState {
            cursor: self.cursor - row_height,
            ..self
        }
    }
}

pub struct TableRequest<'a> {
    pub title: &'a str,
    pub subtitle: Option<&'a str>,
    pub columns: &'a [ColumnSpec],
    pub rows: &'a [RowRecord],
    pub exported_at: String,
}

impl TableRequest<'_> {
    pub fn full_title(&self) -> String {
        match self.subtitle {
            Some(subtitle) if !subtitle.is_empty() => format!("{} \u{2014} {}", self.title, subtitle),
            _ => self.title.to_string(),
        }
    }

    pub fn meta_line(&self) -> String {
        format!(
            "Exported: {}  |  Total: {}",
            self.exported_at,
            self.rows.len()
        )
    }
}

#[derive(Clone, Copy)]
struct Fonts {
    regular: FontHandle,
    bold: FontHandle,
}

struct HeaderBlock<'r> {
    title: String,
    meta: String,
    columns: &'r ScaledColumns<'r>,
}

pub struct TableLayoutEngine<'l> {
    layout: &'l TableLayout,
}

impl<'l> TableLayoutEngine<'l> {
    pub fn new(layout: &'l TableLayout) -> Self {
        Self { layout }
    }

    /// Lays the whole table out on `canvas`, adding pages as rows run past
    /// the bottom margin. Canvas errors are returned as-is.
    pub fn render<C: DocumentCanvas>(
        &self,
        canvas: &mut C,
        request: &TableRequest<'_>,
    ) -> Result<RenderMetrics> {
        let started = Instant::now();
        let layout = self.layout;
        let fonts = Fonts {
            regular: canvas.embed_font(FontVariant::Regular)?,
            bold: canvas.embed_font(FontVariant::Bold)?,
        };

        let first_page = canvas.add_page(Some(layout.page_size))?;
        let first_size = canvas.page_size(first_page)?;
        let available = first_size.width - layout.margin * 2;
        let scaled = scale_columns(request.columns, available, layout.min_column_width);
        if scaled.scaled {
            log::debug!(
                "scaled {} columns to fit {} pt (total now {} pt)",
                scaled.columns.len(),
                available,
                scaled.total_width()
            );
        }
        if scaled.overflows() {
            log::warn!(
                "minimum column width leaves table at {} pt, wider than the {} pt available",
                scaled.total_width(),
                available
            );
        }

        let header = HeaderBlock {
            title: request.full_title(),
            meta: request.meta_line(),
            columns: &scaled,
        };

        let mut metrics = RenderMetrics {
            columns_scaled: scaled.scaled,
            width_overflow: scaled.overflows(),
            ..RenderMetrics::default()
        };
        let mut state = PageState {
            page: first_page,
            size: first_size,
            cursor: self.draw_header(canvas, first_page, first_size, &header, fonts)?,
        };
        metrics.pages.push(PageMetrics {
            page_number: 1,
            ..PageMetrics::default()
        });

        for row in request.rows {
            if state.needs_break(layout.margin, layout.row_height) {
                state = self.start_page(canvas, state.size, &header, fonts)?;
                metrics.pages.push(PageMetrics {
                    page_number: metrics.pages.len() + 1,
                    ..PageMetrics::default()
                });
                log::debug!("page break before row {}", metrics.rows_drawn + 1);
            }
            metrics.truncated_cells += self.draw_row(canvas, &state, row, &scaled, fonts)?;
            metrics.rows_drawn += 1;
            if let Some(page) = metrics.pages.last_mut() {
                page.rows += 1;
            }
            state = state.advance(layout.row_height);
        }

        metrics.layout_ms = started.elapsed().as_secs_f64() * 1000.0;
        Ok(metrics)
    }

    fn start_page<C: DocumentCanvas>(
        &self,
        canvas: &mut C,
        previous_size: Size,
        header: &HeaderBlock<'_>,
        fonts: Fonts,
    ) -> Result<PageState> {
        let page = canvas.add_page(Some(previous_size))?;
        let size = canvas.page_size(page)?;
        let cursor = self.draw_header(canvas, page, size, header, fonts)?;
        Ok(PageState { page, size, cursor })
    }

    /// Draws title, meta line and the column header bar. Returns the baseline
    /// of the first row.
    fn draw_header<C: DocumentCanvas>(
        &self,
        canvas: &mut C,
        page: PageId,
        size: Size,
        header: &HeaderBlock<'_>,
        fonts: Fonts,
    ) -> Result<Pt> {
        let layout = self.layout;
        let left = layout.margin;
        let top = size.height - layout.margin;

        canvas.draw_text(
            page,
            &header.title,
            TextStyle {
                x: left,
                y: top - layout.title_size,
                size: layout.title_size,
                font: fonts.bold,
                color: TITLE_COLOR,
            },
        )?;
        let mut y = top - layout.title_size - layout.title_gap;

        canvas.draw_text(
            page,
            &header.meta,
            TextStyle {
                x: left,
                y: y - layout.meta_size,
                size: layout.meta_size,
                font: fonts.regular,
                color: META_COLOR,
            },
        )?;
        y -= layout.meta_size + layout.meta_gap;

        let bar_y = y - layout.header_height;
        let bar_top = bar_y + layout.header_height;
        canvas.draw_rectangle(
            page,
            RectStyle {
                x: left,
                y: bar_y,
                width: header.columns.total_width(),
                height: layout.header_height,
                color: HEADER_FILL,
            },
        )?;

        let label_y = bar_y + (layout.header_height - layout.header_size) / 2 + Pt::from_i32(2);
        let mut x = left;
        for column in &header.columns.columns {
            let label = column.spec.label.as_str();
            let text_width = match column.spec.align {
                Alignment::Left => Pt::ZERO,
                _ => canvas.measure_width(fonts.bold, label, layout.header_size)?,
            };
            canvas.draw_text(
                page,
                label,
                TextStyle {
                    x: aligned_x(column.spec.align, x, column.width, text_width, layout.text_inset),
                    y: label_y,
                    size: layout.header_size,
                    font: fonts.bold,
                    color: HEADER_TEXT_COLOR,
                },
            )?;
            canvas.draw_line(page, vertical(x, bar_y, bar_top, 0.3, HEADER_RULE_COLOR))?;
            x += column.width;
        }
        canvas.draw_line(page, vertical(x, bar_y, bar_top, 0.3, HEADER_RULE_COLOR))?;
        canvas.draw_line(
            page,
            LineStyle {
                start: Point::new(left, bar_y),
                end: Point::new(x, bar_y),
                thickness: Pt::from_f32(0.6),
                color: HEADER_RULE_COLOR,
            },
        )?;

        Ok(bar_y - layout.header_gap)
    }

    /// Draws one record at the cursor. Returns how many cells were truncated.
    fn draw_row<C: DocumentCanvas>(
        &self,
        canvas: &mut C,
        state: &PageState,
        row: &RowRecord,
        columns: &ScaledColumns<'_>,
        fonts: Fonts,
    ) -> Result<usize> {
        let layout = self.layout;
        let y = state.cursor;
        let rule_bottom = y - layout.rule_below_baseline;
        let rule_top = y + layout.rule_above_baseline;
        let mut truncated = 0usize;
        let mut x = layout.margin;

        for column in &columns.columns {
            let value = row.display(&column.spec.key);
            let fitted = fit_text(&value, column.width, layout.cell_padding, |candidate| {
                canvas.measure_width(fonts.regular, candidate, layout.cell_size)
            })?;
            if fitted.truncated {
                truncated += 1;
            }
            let text_width = match column.spec.align {
                Alignment::Left => Pt::ZERO,
                _ => canvas.measure_width(fonts.regular, &fitted.text, layout.cell_size)?,
            };
            canvas.draw_text(
                state.page,
                &fitted.text,
                TextStyle {
                    x: aligned_x(column.spec.align, x, column.width, text_width, layout.text_inset),
                    y,
                    size: layout.cell_size,
                    font: fonts.regular,
                    color: CELL_TEXT_COLOR,
                },
            )?;
            canvas.draw_line(
                state.page,
                vertical(x, rule_bottom, rule_top, 0.2, CELL_RULE_COLOR),
            )?;
            x += column.width;
        }

        canvas.draw_line(
            state.page,
            vertical(x, rule_bottom, rule_top, 0.2, CELL_RULE_COLOR),
        )?;
        canvas.draw_line(
            state.page,
            LineStyle {
                start: Point::new(layout.margin, rule_bottom),
                end: Point::new(x, rule_bottom),
                thickness: Pt::from_f32(0.3),
                color: ROW_RULE_COLOR,
            },
        )?;
        Ok(truncated)
    }
}

fn vertical(x: Pt, bottom: Pt, top: Pt, thickness: f32, color: Color) -> LineStyle {
    LineStyle {
        start: Point::new(x, bottom),
        end: Point::new(x, top),
        thickness: Pt::from_f32(thickness),
        color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Canvas, Command, Document};
    use crate::font::StandardFont;

    fn measure(text: &str) -> Result<Pt> {
        Ok(StandardFont::Helvetica.measure_text_width(Pt::from_i32(10), text))
    }

    fn booking_columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("date", "Date", 90.0),
            ColumnSpec::new("session", "Session", 120.0).align(Alignment::Center),
            ColumnSpec::new("name", "Name", 180.0),
        ]
    }

    fn rows(count: usize) -> Vec<RowRecord> {
        (0..count)
            .map(|i| {
                RowRecord::new()
                    .with("date", "2025-01-14")
                    .with("session", "12:00 PM - 12:45 PM")
                    .with("name", format!("Devotee {}", i + 1))
            })
            .collect()
    }

    fn render(layout: &TableLayout, columns: &[ColumnSpec], rows: &[RowRecord]) -> (Document, RenderMetrics) {
        let mut canvas = Canvas::new(layout.page_size);
        let request = TableRequest {
            title: "Annadanam Bookings",
            subtitle: Some("2025-01-14"),
            columns,
            rows,
            exported_at: "1/14/2025, 10:00:00 AM".to_string(),
        };
        let metrics = TableLayoutEngine::new(layout)
            .render(&mut canvas, &request)
            .expect("render");
        (canvas.finish(), metrics)
    }

    fn row_separator_count(document: &Document) -> usize {
        document
            .pages
            .iter()
            .flat_map(|p| p.commands.iter())
            .filter(|cmd| matches!(cmd, Command::Line { color, .. } if *color == ROW_RULE_COLOR))
            .count()
    }

    fn cell_texts(document: &Document, key_prefix: &str) -> Vec<String> {
        document
            .pages
            .iter()
            .flat_map(|p| p.commands.iter())
            .filter_map(|cmd| match cmd {
                Command::Text { text, color, .. }
                    if *color == CELL_TEXT_COLOR && text.starts_with(key_prefix) =>
                {
                    Some(text.clone())
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn columns_within_available_width_are_untouched() {
        let columns = booking_columns();
        let scaled = scale_columns(&columns, Pt::from_f32(523.28), Pt::from_i32(40));
        assert!(!scaled.scaled);
        for (col, spec) in scaled.columns.iter().zip(&columns) {
            assert_eq!(col.width, spec.width);
        }
        assert_eq!(scaled.total_width(), Pt::from_i32(390));
    }

    #[test]
    fn wide_columns_scale_down_with_floor() {
        let columns = vec![
            ColumnSpec::new("date", "Date", 90.0),
            ColumnSpec::new("session", "Session", 120.0),
            ColumnSpec::new("name", "Name", 180.0),
            ColumnSpec::new("email", "Email", 220.0),
            ColumnSpec::new("phone", "Phone", 120.0),
        ];
        let available = Pt::from_f32(523.28);
        let scaled = scale_columns(&columns, available, Pt::from_i32(40));
        assert!(scaled.scaled);
        let widths: Vec<Pt> = scaled.columns.iter().map(|c| c.width).collect();
        // 523.28 / 730 scale, floored.
        assert_eq!(
            widths,
            vec![
                Pt::from_i32(64),
                Pt::from_i32(86),
                Pt::from_i32(129),
                Pt::from_i32(157),
                Pt::from_i32(86),
            ]
        );
        assert!(widths.iter().all(|w| *w >= Pt::from_i32(40)));
        assert!(scaled.total_width() <= available);
        assert!(!scaled.overflows());
    }

    #[test]
    fn minimum_width_can_overflow_available() {
        let columns: Vec<ColumnSpec> = (0..12)
            .map(|i| ColumnSpec::new(format!("c{i}"), format!("C{i}"), 60.0))
            .collect();
        let available = Pt::from_f32(400.0);
        let scaled = scale_columns(&columns, available, Pt::from_i32(40));
        assert!(scaled.columns.iter().all(|c| c.width == Pt::from_i32(40)));
        assert_eq!(scaled.total_width(), Pt::from_i32(480));
        assert!(scaled.overflows());
    }

    #[test]
    fn fitting_text_returns_input_when_it_fits() {
        let fitted = fit_text("Asha", Pt::from_i32(90), Pt::from_i32(8), measure).expect("fit");
        assert_eq!(fitted.text, "Asha");
        assert!(!fitted.truncated);
    }

    #[test]
    fn truncation_is_prefix_plus_single_ellipsis() {
        let text = "sri.venkateswara.devotee@example.org";
        let fitted = fit_text(text, Pt::from_i32(90), Pt::from_i32(8), measure).expect("fit");
        assert!(fitted.truncated);
        let prefix = fitted.text.strip_suffix(ELLIPSIS).expect("ellipsis");
        assert!(!prefix.contains(ELLIPSIS));
        assert!(text.starts_with(prefix));
        assert!(prefix.len() < text.len());
        assert!(measure(&fitted.text).expect("measure") <= Pt::from_i32(82));

        // One more char would not fit.
        let next_len = prefix.chars().count() + 1;
        let longer: String = text.chars().take(next_len).chain(std::iter::once(ELLIPSIS)).collect();
        assert!(measure(&longer).expect("measure") > Pt::from_i32(82));
    }

    #[test]
    fn truncation_is_monotone_in_cell_width() {
        let text = "Sri Lakshmi Narasimha Swamy Seva Samithi";
        let mut previous = 0usize;
        for width in (40..=260).step_by(5) {
            let fitted = fit_text(text, Pt::from_i32(width), Pt::from_i32(8), measure).expect("fit");
            let kept = fitted
                .text
                .strip_suffix(ELLIPSIS)
                .unwrap_or(&fitted.text)
                .chars()
                .count();
            assert!(kept >= previous, "width {width} kept {kept} < {previous}");
            previous = kept;
        }
        assert_eq!(previous, text.chars().count());
    }

    #[test]
    fn degenerate_cell_yields_bare_ellipsis() {
        let fitted = fit_text("abc", Pt::from_i32(12), Pt::from_i32(8), measure).expect("fit");
        assert_eq!(fitted.text, ELLIPSIS.to_string());
        assert!(fitted.truncated);
    }

    #[test]
    fn text_exactly_at_the_limit_is_kept() {
        let text = "Hello";
        let width = measure(text).expect("measure");
        assert_eq!(width, Pt::from_f32(22.78));
        let padding = Pt::from_i32(8);

        let fitted = fit_text(text, width + padding, padding, measure).expect("fit");
        assert_eq!(fitted.text, text);
        assert!(!fitted.truncated);

        let narrower = width + padding - Pt::from_f32(0.001);
        let fitted = fit_text(text, narrower, padding, measure).expect("fit");
        assert!(fitted.truncated);
        assert!(fitted.text.ends_with(ELLIPSIS));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "Śrī Rāmānuja Ācārya Sannidhi";
        let fitted = fit_text(text, Pt::from_i32(60), Pt::from_i32(8), measure).expect("fit");
        let prefix = fitted.text.strip_suffix(ELLIPSIS).expect("ellipsis");
        assert!(text.starts_with(prefix));
    }

    #[test]
    fn alignment_positions() {
        let x = Pt::from_i32(100);
        let w = Pt::from_i32(120);
        let tw = Pt::from_i32(40);
        let inset = Pt::from_i32(6);
        assert_eq!(aligned_x(Alignment::Left, x, w, tw, inset), Pt::from_i32(106));
        assert_eq!(aligned_x(Alignment::Center, x, w, tw, inset), Pt::from_i32(140));
        assert_eq!(aligned_x(Alignment::Right, x, w, tw, inset), Pt::from_i32(174));
    }

    #[test]
    fn three_rows_fit_on_one_page() {
        let layout = TableLayout::default();
        let columns = booking_columns();
        let rows = rows(3);
        let (document, metrics) = render(&layout, &columns, &rows);
        assert_eq!(document.pages.len(), 1);
        assert_eq!(metrics.rows_drawn, 3);
        assert!(!metrics.columns_scaled);

        let bar_width = document.pages[0].commands.iter().find_map(|cmd| match cmd {
            Command::FillRect { width, .. } => Some(*width),
            _ => None,
        });
        assert_eq!(bar_width, Some(Pt::from_i32(390)));
        assert_eq!(row_separator_count(&document), 3);
    }

    #[test]
    fn header_block_positions_on_a4() {
        let layout = TableLayout::default();
        let columns = booking_columns();
        let (document, _) = render(&layout, &columns, &rows(1));
        let page = &document.pages[0];
        let texts: Vec<(String, Pt)> = page
            .commands
            .iter()
            .filter_map(|cmd| match cmd {
                Command::Text { text, y, .. } => Some((text.clone(), *y)),
                _ => None,
            })
            .collect();
        assert_eq!(texts[0].0, "Annadanam Bookings \u{2014} 2025-01-14");
        assert_eq!(texts[0].1, Pt::from_f32(785.89));
        assert_eq!(texts[1].0, "Exported: 1/14/2025, 10:00:00 AM  |  Total: 1");
        assert_eq!(texts[1].1, Pt::from_f32(769.89));
        // Header labels sit 8.5pt above the bar bottom at 735.89.
        assert_eq!(texts[2].0, "Date");
        assert_eq!(texts[2].1, Pt::from_f32(744.39));
        // First row baseline.
        assert_eq!(texts[5].1, Pt::from_f32(727.89));
    }

    #[test]
    fn centered_header_uses_bold_width() {
        let layout = TableLayout::default();
        let columns = booking_columns();
        let (document, _) = render(&layout, &columns, &[]);
        let session_x = document.pages[0].commands.iter().find_map(|cmd| match cmd {
            Command::Text { text, x, .. } if text == "Session" => Some(*x),
            _ => None,
        });
        let label_width = StandardFont::HelveticaBold.measure_text_width(Pt::from_i32(11), "Session");
        let expected = Pt::from_i32(36 + 90) + (Pt::from_i32(120) - label_width) / 2;
        assert_eq!(session_x, Some(expected));
    }

    #[test]
    fn empty_rows_still_produce_a_page() {
        let layout = TableLayout::default();
        let columns = booking_columns();
        let (document, metrics) = render(&layout, &columns, &[]);
        assert_eq!(document.pages.len(), 1);
        assert_eq!(metrics.rows_drawn, 0);
        assert_eq!(row_separator_count(&document), 0);
    }

    #[test]
    fn page_breaks_exactly_after_capacity() {
        let k = 3usize;
        // first baseline = H - 36 - 78; rows need a cursor >= 56.
        let layout = TableLayout {
            page_size: Size::new(595.28, 150.0 + 20.0 * k as f32),
            ..TableLayout::default()
        };
        assert_eq!(layout.rows_per_page(layout.page_size.height), k);

        let columns = booking_columns();
        let (document, metrics) = render(&layout, &columns, &rows(k));
        assert_eq!(document.pages.len(), 1);
        assert_eq!(metrics.rows_per_page(), vec![k]);

        let (document, metrics) = render(&layout, &columns, &rows(k + 1));
        assert_eq!(document.pages.len(), 2);
        assert_eq!(metrics.rows_per_page(), vec![k, 1]);
    }

    #[test]
    fn every_row_appears_once_in_order_across_pages() {
        let layout = TableLayout::default();
        let per_page = layout.rows_per_page(layout.page_size.height);
        assert_eq!(per_page, 34);
        let columns = booking_columns();
        let input = rows(per_page * 2 + 5);
        let (document, metrics) = render(&layout, &columns, &input);
        assert_eq!(document.pages.len(), 3);
        assert_eq!(metrics.rows_per_page(), vec![per_page, per_page, 5]);

        let drawn = cell_texts(&document, "Devotee ");
        let expected: Vec<String> = (1..=input.len()).map(|i| format!("Devotee {i}")).collect();
        assert_eq!(drawn, expected);
        assert_eq!(row_separator_count(&document), input.len());
    }

    #[test]
    fn header_repeats_on_each_page_with_full_total() {
        let layout = TableLayout::default();
        let columns = booking_columns();
        let (document, _) = render(&layout, &columns, &rows(40));
        assert_eq!(document.pages.len(), 2);
        for page in &document.pages {
            let texts: Vec<&str> = page.texts().collect();
            assert_eq!(texts[0], "Annadanam Bookings \u{2014} 2025-01-14");
            assert!(texts[1].ends_with("Total: 40"));
        }
    }

    #[test]
    fn subtitle_is_optional() {
        let request = TableRequest {
            title: "Pooja Blocks",
            subtitle: None,
            columns: &[],
            rows: &[],
            exported_at: String::new(),
        };
        assert_eq!(request.full_title(), "Pooja Blocks");
        let request = TableRequest {
            subtitle: Some(""),
            ..request
        };
        assert_eq!(request.full_title(), "Pooja Blocks");
    }
}
