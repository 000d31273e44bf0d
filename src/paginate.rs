use crate::bands::{
    HeaderText, Surface, Typefaces, draw_detail_row, draw_empty_message, draw_footer,
    draw_header, draw_kpi_grid, draw_section_caption, draw_table_header,
};
use crate::canvas::{Canvas, Document};
use crate::font::FontRegistry;
use crate::frame::PageCursor;
use crate::layout::{ColumnModel, PageGeometry, ReportLayout};
use crate::metrics::{PageMetrics, RenderMetrics};
use crate::model::ReportRequest;
use crate::text::CurrencyStyle;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenderState {
    FirstPage,
    ContinuationPage,
    Finished,
}

pub(crate) struct RenderInputs<'a> {
    pub(crate) fonts: &'a FontRegistry,
    pub(crate) layout: &'a ReportLayout,
    pub(crate) typefaces: &'a Typefaces,
    pub(crate) currency: &'a CurrencyStyle,
    pub(crate) brand_caption: &'a str,
}

pub(crate) struct RenderContext<'a> {
    surface: Surface<'a>,
    geometry: PageGeometry,
    cursor: PageCursor,
    state: RenderState,
    header: HeaderText,
    brand_caption: &'a str,
    metrics: RenderMetrics,
    page: PageMetrics,
}

impl<'a> RenderContext<'a> {
    pub(crate) fn new(
        inputs: &RenderInputs<'a>,
        columns: &'a ColumnModel,
        header: HeaderText,
    ) -> Self {
        let geometry = inputs.layout.geometry();
        Self {
            surface: Surface {
                canvas: Canvas::new(inputs.layout.page_size),
                fonts: inputs.fonts,
                layout: inputs.layout,
                columns,
                typefaces: inputs.typefaces,
                currency: inputs.currency,
            },
            cursor: PageCursor::first_page(&geometry),
            geometry,
            state: RenderState::FirstPage,
            header,
            brand_caption: inputs.brand_caption,
            metrics: RenderMetrics::default(),
            page: PageMetrics {
                page_number: 1,
                ..PageMetrics::default()
            },
        }
    }

    pub(crate) fn run(mut self, request: &ReportRequest) -> (Document, RenderMetrics) {
        let started = Instant::now();
        self.open_page();
        let y = draw_kpi_grid(&mut self.surface, self.cursor.y, request.kpis.as_ref());
        self.cursor.move_to(y);

        if request.rows.is_empty() {
            let y = draw_empty_message(&mut self.surface, self.cursor.y);
            self.cursor.move_to(y);
        } else {
            self.open_table();
            let row_height = self.surface.layout.table.row_height;
            for (index, row) in request.rows.iter().enumerate() {
                if self.cursor.would_overflow(row_height) {
                    self.break_page(index);
                }
                let y = draw_detail_row(&mut self.surface, self.cursor.y, index, row);
                self.cursor.move_to(y);
                self.page.rows += 1;
                if self.page.first_row.is_none() {
                    self.page.first_row = Some(index);
                }
            }
        }
        self.close_page();
        self.state = RenderState::Finished;

        self.metrics.total_rows = request.rows.len();
        self.metrics.layout_ms = started.elapsed().as_secs_f64() * 1000.0;
        (self.surface.canvas.finish(), self.metrics)
    }

    fn open_page(&mut self) {
        debug_assert_ne!(self.state, RenderState::Finished);
        self.surface
            .canvas
            .meta("page", self.cursor.page_number.to_string());
        let y = draw_header(&mut self.surface, &self.header);
        self.cursor.move_to(y);
    }

    fn open_table(&mut self) {
        let continuation = self.state == RenderState::ContinuationPage;
        let y = draw_section_caption(&mut self.surface, self.cursor.y, continuation);
        let y = draw_table_header(&mut self.surface, y);
        self.cursor.move_to(y);
    }

    fn close_page(&mut self) {
        draw_footer(&mut self.surface, self.cursor.page_number, self.brand_caption);
        self.page.command_count = self.surface.canvas.current_command_count();
        let next = PageMetrics {
            page_number: self.cursor.page_number + 1,
            ..PageMetrics::default()
        };
        self.metrics.pages.push(std::mem::replace(&mut self.page, next));
    }

    fn break_page(&mut self, next_row: usize) {
        self.close_page();
        self.surface.canvas.show_page();
        self.cursor.next_page(self.geometry.margins.top);
        self.state = RenderState::ContinuationPage;
        tracing::debug!(page = self.cursor.page_number, next_row, "page break");
        self.open_page();
        self.open_table();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::EMPTY_MESSAGE;
    use crate::font::{HELVETICA, HELVETICA_BOLD};
    use crate::model::{KpiSummary, RowRecord};

    fn run(request: &ReportRequest) -> (Document, RenderMetrics) {
        let fonts = FontRegistry::new();
        let layout = ReportLayout::standard();
        let columns = layout.columns();
        let typefaces = Typefaces {
            regular: HELVETICA.to_string(),
            bold: HELVETICA_BOLD.to_string(),
        };
        let currency = CurrencyStyle::es_ar();
        let inputs = RenderInputs {
            fonts: &fonts,
            layout: &layout,
            typefaces: &typefaces,
            currency: &currency,
            brand_caption: "Marca",
        };
        let header = HeaderText {
            title: request.title.clone(),
            subtitle: request.subtitle.clone(),
            generated: "Generado: 01/01/26, 00:00".to_string(),
        };
        RenderContext::new(&inputs, &columns, header).run(request)
    }

    fn rows(count: usize) -> Vec<RowRecord> {
        (0..count)
            .map(|i| RowRecord {
                client: format!("Cliente {i}"),
                total: 100.0,
                ..RowRecord::default()
            })
            .collect()
    }

    #[test]
    fn capacities_depend_on_kpi_overhead() {
        let with_kpis = ReportRequest::default()
            .with_kpis(KpiSummary::default())
            .with_rows(rows(26));
        let (doc, metrics) = run(&with_kpis);
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(metrics.rows_per_page(), vec![26]);

        let overflow = with_kpis.clone().with_rows(rows(27));
        let (_, metrics) = run(&overflow);
        assert_eq!(metrics.rows_per_page(), vec![26, 1]);

        let without_kpis = ReportRequest::default().with_rows(rows(33));
        let (_, metrics) = run(&without_kpis);
        assert_eq!(metrics.rows_per_page(), vec![32, 1]);
    }

    #[test]
    fn continuation_pages_repeat_header_and_caption() {
        let request = ReportRequest::new("Viajes", "Semana 10")
            .with_kpis(KpiSummary::default())
            .with_rows(rows(26 + 32 + 5));
        let (doc, metrics) = run(&request);
        assert_eq!(metrics.rows_per_page(), vec![26, 32, 5]);
        assert_eq!(metrics.pages[1].first_row, Some(26));
        assert_eq!(metrics.pages[2].first_row, Some(58));

        for (index, page) in doc.pages.iter().enumerate() {
            let strings: Vec<&str> = page.strings().collect();
            assert_eq!(strings[0], "Viajes");
            let caption = if index == 0 { "Detalle" } else { "Detalle (cont.)" };
            assert!(strings.contains(&caption));
            let kpi_cards = page.meta_values("kpi_card").count();
            assert_eq!(kpi_cards, if index == 0 { 5 } else { 0 });
            let footer: Vec<&str> = page.meta_values("footer").collect();
            assert_eq!(footer, vec![(index + 1).to_string().as_str()]);
        }
    }

    #[test]
    fn empty_rows_draw_message_only() {
        let request = ReportRequest::default().with_kpis(KpiSummary::default());
        let (doc, metrics) = run(&request);
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(metrics.total_rows, 0);
        let page = &doc.pages[0];
        let bands: Vec<&str> = page.meta_values("band").collect();
        assert_eq!(bands, vec!["header", "kpi", "empty"]);
        assert!(page.strings().any(|s| s == EMPTY_MESSAGE));
        assert!(page.strings().any(|s| s == "Página 1"));
        assert_eq!(page.meta_values("row").count(), 0);
    }
}
