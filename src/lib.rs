//! Paginated table exports.
//!
//! A [`TableExporter`] lays a list of records out as a table on PDF pages:
//! column widths are scaled to the printable width, cell text is cut to fit
//! with an ellipsis, and the title block plus header bar repeat on every
//! page. The same records can also be exported as CSV or JSON.

mod canvas;
mod clock;
mod deliver;
mod error;
mod export;
mod font;
mod inspect;
mod layout;
mod metrics;
mod pdf;
mod perf;
mod row;
mod types;

pub use canvas::{
    Canvas, Command, Document, DocumentCanvas, FontHandle, LineStyle, Page, PageId, RectStyle,
    TextStyle,
};
pub use clock::{ExportClock, format_exported_at};
pub use deliver::{Delivery, DirectorySink, MemorySink};
pub use error::{Result, TableExportError};
pub use export::{
    CSV_MIME, ExportedFile, JSON_MIME, PDF_MIME, export_csv, export_json, pdf_file_name,
};
pub use font::{FontVariant, StandardFont};
pub use inspect::{PdfInspectReport, inspect_pdf_bytes, inspect_pdf_path};
pub use layout::{
    Alignment, ColumnSpec, ELLIPSIS, FittedText, PageState, ScaledColumn, ScaledColumns,
    TableLayout, TableLayoutEngine, TableRequest, aligned_x, fit_text, scale_columns,
};
pub use metrics::{PageMetrics, RenderMetrics};
pub use pdf::{PdfOptions, document_to_pdf, document_to_writer};
pub use row::{CellValue, RowRecord};
pub use types::{Color, Point, Pt, Size};

use perf::{DEFAULT_PERF_LOG, PerfLogger};
use std::path::PathBuf;
use std::time::Instant;

/// Renders table exports. Immutable once built and safe to share between
/// callers; each call owns its own canvas.
pub struct TableExporter {
    layout: TableLayout,
    clock: ExportClock,
    pdf_options: PdfOptions,
    perf: Option<PerfLogger>,
}

#[derive(Clone)]
pub struct TableExporterBuilder {
    layout: TableLayout,
    clock: ExportClock,
    pdf_options: PdfOptions,
    perf_enabled: bool,
    perf_path: Option<PathBuf>,
}

impl TableExporter {
    pub fn builder() -> TableExporterBuilder {
        TableExporterBuilder::new()
    }

    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    /// Renders `rows` as a paginated PDF table named `output_name` (with
    /// `.pdf` appended when missing).
    pub fn generate(
        &self,
        title: &str,
        subtitle: Option<&str>,
        columns: &[ColumnSpec],
        rows: &[RowRecord],
        output_name: &str,
    ) -> Result<ExportedFile> {
        self.generate_with_metrics(title, subtitle, columns, rows, output_name)
            .map(|(file, _)| file)
    }

    pub fn generate_with_metrics(
        &self,
        title: &str,
        subtitle: Option<&str>,
        columns: &[ColumnSpec],
        rows: &[RowRecord],
        output_name: &str,
    ) -> Result<(ExportedFile, RenderMetrics)> {
        let name = pdf_file_name(output_name);
        let (document, mut metrics) = self.render_document(title, subtitle, columns, rows)?;

        let started = Instant::now();
        let bytes = document.to_pdf(&self.pdf_options)?;
        metrics.serialize_ms = started.elapsed().as_secs_f64() * 1000.0;
        metrics.total_bytes = bytes.len();

        log::debug!(
            "exported {} rows to {} ({} pages, {} bytes)",
            metrics.rows_drawn,
            name,
            metrics.page_count(),
            metrics.total_bytes
        );
        if let Some(perf) = self.perf.as_ref() {
            perf.log_span_ms("layout", &name, metrics.layout_ms);
            perf.log_span_ms("serialize", &name, metrics.serialize_ms);
            perf.log_counts(
                "layout",
                &name,
                &[
                    ("rows", metrics.rows_drawn as u64),
                    ("pages", metrics.page_count() as u64),
                    ("truncated_cells", metrics.truncated_cells as u64),
                    ("bytes", metrics.total_bytes as u64),
                ],
            );
            perf.flush();
        }

        Ok((ExportedFile::new(name, PDF_MIME, bytes), metrics))
    }

    /// Lays the table out without serializing it.
    pub fn render_document(
        &self,
        title: &str,
        subtitle: Option<&str>,
        columns: &[ColumnSpec],
        rows: &[RowRecord],
    ) -> Result<(Document, RenderMetrics)> {
        validate_columns(columns)?;
        let request = TableRequest {
            title,
            subtitle,
            columns,
            rows,
            exported_at: self.clock.stamp(),
        };
        let mut canvas = Canvas::with_options(self.layout.page_size, self.pdf_options.clone());
        let mut metrics = TableLayoutEngine::new(&self.layout).render(&mut canvas, &request)?;
        let document = canvas.finish();
        for (page, page_metrics) in document.pages.iter().zip(metrics.pages.iter_mut()) {
            page_metrics.command_count = page.commands.len();
        }
        if metrics.truncated_cells > 0 {
            log::debug!("{} cells truncated to fit", metrics.truncated_cells);
        }
        Ok((document, metrics))
    }

    pub fn export_csv(&self, rows: &[RowRecord], headers: &[&str], name: &str) -> ExportedFile {
        export_csv(rows, headers, name)
    }

    pub fn export_json(&self, rows: &[RowRecord], name: &str) -> Result<ExportedFile> {
        export_json(rows, name)
    }

    pub fn deliver<D: Delivery + ?Sized>(&self, sink: &mut D, file: &ExportedFile) -> Result<PathBuf> {
        sink.deliver(file)
    }
}

impl TableExporterBuilder {
    pub fn new() -> Self {
        Self {
            layout: TableLayout::default(),
            clock: ExportClock::System,
            pdf_options: PdfOptions::default(),
            perf_enabled: false,
            perf_path: None,
        }
    }

    /// Replaces the whole layout. Call before `page_size`/`margin` to combine.
    pub fn layout(mut self, layout: TableLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn page_size(mut self, size: Size) -> Self {
        self.layout.page_size = size;
        self
    }

    pub fn margin(mut self, margin: f32) -> Self {
        self.layout.margin = Pt::from_f32(margin);
        self
    }

    pub fn clock(mut self, clock: ExportClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn document_title(mut self, title: impl Into<String>) -> Self {
        self.pdf_options.document_title = Some(title.into());
        self
    }

    pub fn producer(mut self, producer: impl Into<String>) -> Self {
        self.pdf_options.producer = producer.into();
        self
    }

    // Enable performance logging to a JSONL file for timing/counter inspection.
    pub fn perf_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.perf_enabled = true;
        self.perf_path = Some(path.into());
        self
    }

    // Toggle performance logging (uses default file when enabled and no path is set).
    pub fn perf_enabled(mut self, enabled: bool) -> Self {
        self.perf_enabled = enabled;
        self
    }

    pub fn build(self) -> Result<TableExporter> {
        validate_layout(&self.layout)?;
        let perf = if self.perf_enabled || self.perf_path.is_some() {
            let path = self
                .perf_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PERF_LOG));
            Some(PerfLogger::new(path)?)
        } else {
            None
        };
        Ok(TableExporter {
            layout: self.layout,
            clock: self.clock,
            pdf_options: self.pdf_options,
            perf,
        })
    }
}

impl Default for TableExporterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_layout(layout: &TableLayout) -> Result<()> {
    let invalid = |msg: String| Err(TableExportError::InvalidConfiguration(msg));
    let size = layout.page_size;
    if size.width <= Pt::ZERO || size.height <= Pt::ZERO {
        return invalid(format!(
            "page size must be positive, got {}x{}",
            size.width, size.height
        ));
    }
    if layout.margin < Pt::ZERO {
        return invalid(format!("margin must not be negative, got {}", layout.margin));
    }
    for (name, value) in [
        ("title_size", layout.title_size),
        ("meta_size", layout.meta_size),
        ("header_size", layout.header_size),
        ("cell_size", layout.cell_size),
        ("row_height", layout.row_height),
        ("header_height", layout.header_height),
    ] {
        if value <= Pt::ZERO {
            return invalid(format!("{name} must be positive, got {value}"));
        }
    }
    if layout.min_column_width < Pt::ZERO || layout.cell_padding < Pt::ZERO {
        return invalid("min_column_width and cell_padding must not be negative".to_string());
    }
    if size.width - layout.margin * 2 <= Pt::ZERO {
        return invalid(format!(
            "margin {} leaves no printable width on a {} pt page",
            layout.margin, size.width
        ));
    }
    if layout.rows_per_page(size.height) == 0 {
        return invalid(format!(
            "page height {} leaves no room for a row below the header block",
            size.height
        ));
    }
    Ok(())
}

fn validate_columns(columns: &[ColumnSpec]) -> Result<()> {
    if columns.is_empty() {
        return Err(TableExportError::InvalidColumns(
            "at least one column is required".to_string(),
        ));
    }
    for column in columns {
        if column.width <= Pt::ZERO {
            return Err(TableExportError::InvalidColumns(format!(
                "column {:?} has non-positive width {}",
                column.key, column.width
            )));
        }
    }
    Ok(())
}
