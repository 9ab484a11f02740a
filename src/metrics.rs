#[derive(Debug, Clone, Default)]
pub struct PageMetrics {
    pub page_number: usize,
    pub rows: usize,
    pub command_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RenderMetrics {
    pub pages: Vec<PageMetrics>,
    pub rows_drawn: usize,
    pub truncated_cells: usize,
    pub columns_scaled: bool,
    // Set when the per-column minimum pushed the table past the printable width.
    pub width_overflow: bool,
    pub layout_ms: f64,
    pub serialize_ms: f64,
    pub total_bytes: usize,
}

impl RenderMetrics {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn rows_per_page(&self) -> Vec<usize> {
        self.pages.iter().map(|p| p.rows).collect()
    }
}
