#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMetrics {
    pub page_number: u32,
    pub rows: usize,
    pub first_row: Option<usize>,
    pub command_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderMetrics {
    pub pages: Vec<PageMetrics>,
    pub total_rows: usize,
    pub layout_ms: f64,
}

impl RenderMetrics {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn rows_per_page(&self) -> Vec<usize> {
        self.pages.iter().map(|p| p.rows).collect()
    }
}
