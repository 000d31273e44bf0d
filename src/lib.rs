mod bands;
mod canvas;
mod error;
mod font;
mod frame;
mod layout;
mod metrics;
mod model;
mod paginate;
mod pdf;
mod sink;
mod text;
mod types;

use bands::{HeaderText, Typefaces};
pub use canvas::{Canvas, Command, Document, Page};
use chrono::{DateTime, FixedOffset, Offset, Utc};
pub use error::{ReportError, Result};
use font::FontRegistry;
pub use font::{HELVETICA, HELVETICA_BOLD};
pub use frame::PageCursor;
pub use layout::{
    Align, COLUMN_MANIFEST, ColumnDef, ColumnKey, ColumnModel, ColumnSpec, KPI_SLOTS, KpiFormat,
    KpiKey, KpiSlot, PageGeometry, Palette, ReportLayout,
};
pub use metrics::{PageMetrics, RenderMetrics};
pub use model::{CellValue, KpiSummary, ReportRequest, RowRecord};
use paginate::{RenderContext, RenderInputs};
use serde::{Deserialize, Serialize};
pub use sink::{DocumentInfo, DocumentSink, PdfSink, RenderedReport, SinkReport};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
pub use text::{
    CurrencyStyle, ELLIPSIS, format_currency, format_timestamp, normalize_to_one_line,
    truncate_to_width,
};
pub use types::{Color, Margins, Pt, Rect, Size};

pub const DEFAULT_BRAND_CAPTION: &str = "CanteraVenta • Reporte automático";

pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = -180;

const PRODUCER: &str = concat!("resumen-pdf ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    pub brand_caption: String,
    pub document_title: Option<String>,
    pub utc_offset_minutes: i32,
    pub currency: CurrencyStyle,
    pub regular_font: String,
    pub bold_font: String,
    pub font_files: Vec<PathBuf>,
    pub font_dirs: Vec<PathBuf>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            brand_caption: DEFAULT_BRAND_CAPTION.to_string(),
            document_title: None,
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            currency: CurrencyStyle::default(),
            regular_font: HELVETICA.to_string(),
            bold_font: HELVETICA_BOLD.to_string(),
            font_files: Vec::new(),
            font_dirs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReportEngineBuilder {
    options: ReportOptions,
}

impl ReportEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ReportOptions) -> Self {
        Self { options }
    }

    pub fn brand_caption(mut self, caption: impl Into<String>) -> Self {
        self.options.brand_caption = caption.into();
        self
    }

    pub fn document_title(mut self, title: impl Into<String>) -> Self {
        self.options.document_title = Some(title.into());
        self
    }

    pub fn utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.options.utc_offset_minutes = minutes;
        self
    }

    pub fn currency(mut self, currency: CurrencyStyle) -> Self {
        self.options.currency = currency;
        self
    }

    pub fn regular_font(mut self, name: impl Into<String>) -> Self {
        self.options.regular_font = name.into();
        self
    }

    pub fn bold_font(mut self, name: impl Into<String>) -> Self {
        self.options.bold_font = name.into();
        self
    }

    pub fn register_font_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.font_files.push(path.into());
        self
    }

    pub fn register_font_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.font_dirs.push(path.into());
        self
    }

    pub fn build(self) -> Result<ReportEngine> {
        let mut options = self.options;
        let offset = options
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ReportError::InvalidConfiguration(format!(
                    "utc_offset_minutes out of range: {}",
                    options.utc_offset_minutes
                ))
            })?;

        let mut registry = FontRegistry::new();
        for dir in &options.font_dirs {
            registry.register_dir(dir);
        }
        for file in &options.font_files {
            registry.register_file(file)?;
        }
        for name in [&mut options.regular_font, &mut options.bold_font] {
            match registry.canonical_name(name) {
                Some(canonical) => *name = canonical,
                None => {
                    return Err(ReportError::InvalidConfiguration(format!(
                        "font '{name}' is neither built in nor registered"
                    )));
                }
            }
        }
        Ok(ReportEngine::from_parts(options, registry, offset))
    }
}

#[derive(Debug, Clone)]
pub struct ReportEngine {
    options: ReportOptions,
    fonts: Arc<FontRegistry>,
    layout: ReportLayout,
    columns: ColumnModel,
    typefaces: Typefaces,
    offset: FixedOffset,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSummary {
    pub pages: usize,
    pub rows: usize,
    pub bytes_written: usize,
    pub sha256: Option<String>,
    pub metrics: RenderMetrics,
}

impl Default for ReportEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEngine {
    pub fn new() -> Self {
        let options = ReportOptions::default();
        let offset = FixedOffset::east_opt(DEFAULT_UTC_OFFSET_MINUTES * 60)
            .unwrap_or_else(|| Utc.fix());
        Self::from_parts(options, FontRegistry::new(), offset)
    }

    pub fn builder() -> ReportEngineBuilder {
        ReportEngineBuilder::new()
    }

    fn from_parts(options: ReportOptions, fonts: FontRegistry, offset: FixedOffset) -> Self {
        let layout = ReportLayout::standard();
        let typefaces = Typefaces {
            regular: options.regular_font.clone(),
            bold: options.bold_font.clone(),
        };
        Self {
            columns: layout.columns(),
            options,
            fonts: Arc::new(fonts),
            layout,
            typefaces,
            offset,
        }
    }

    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    pub fn layout(&self) -> &ReportLayout {
        &self.layout
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    pub fn layout_document(
        &self,
        request: &ReportRequest,
        generated_at: DateTime<FixedOffset>,
    ) -> (Document, RenderMetrics) {
        let inputs = RenderInputs {
            fonts: &self.fonts,
            layout: &self.layout,
            typefaces: &self.typefaces,
            currency: &self.options.currency,
            brand_caption: &self.options.brand_caption,
        };
        let header = HeaderText {
            title: request.title.clone(),
            subtitle: request.subtitle.clone(),
            generated: format!("Generado: {}", format_timestamp(&generated_at)),
        };
        RenderContext::new(&inputs, &self.columns, header).run(request)
    }

    pub fn render(
        &self,
        request: &ReportRequest,
        sink: &mut impl DocumentSink,
    ) -> Result<RenderSummary> {
        self.render_at(request, self.now(), sink)
    }

    pub fn render_at(
        &self,
        request: &ReportRequest,
        generated_at: DateTime<FixedOffset>,
        sink: &mut impl DocumentSink,
    ) -> Result<RenderSummary> {
        let started = Instant::now();
        let (document, metrics) = self.layout_document(request, generated_at);
        let info = DocumentInfo {
            title: Some(self.document_title(request)),
            producer: PRODUCER.to_string(),
            created_at: generated_at,
        };
        let report = RenderedReport {
            document: &document,
            info: &info,
            fonts: &self.fonts,
        };
        sink.write_document(&report)?;
        let written = sink.finish()?;

        let summary = RenderSummary {
            pages: document.pages.len(),
            rows: metrics.total_rows,
            bytes_written: written.bytes_written,
            sha256: written.sha256,
            metrics,
        };
        tracing::info!(
            pages = summary.pages,
            rows = summary.rows,
            bytes = summary.bytes_written,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "report rendered"
        );
        Ok(summary)
    }

    pub fn render_pdf(&self, request: &ReportRequest, writer: impl Write) -> Result<RenderSummary> {
        let mut sink = PdfSink::new(writer);
        self.render(request, &mut sink)
    }

    pub fn render_pdf_to_vec(&self, request: &ReportRequest) -> Result<(Vec<u8>, RenderSummary)> {
        let mut sink = PdfSink::new(Vec::new());
        let summary = self.render(request, &mut sink)?;
        Ok((sink.into_inner(), summary))
    }

    fn document_title(&self, request: &ReportRequest) -> String {
        if let Some(title) = self.options.document_title.as_deref() {
            return title.to_string();
        }
        let title = normalize_to_one_line(Some(&request.title));
        if title.is_empty() {
            bands::DEFAULT_TITLE.to_string()
        } else {
            title
        }
    }
}

pub fn render_report_pdf(request: &ReportRequest, writer: impl Write) -> Result<RenderSummary> {
    ReportEngine::new().render_pdf(request, writer)
}
