use crate::canvas::Canvas;
use crate::font::FontRegistry;
use crate::layout::{Align, ColumnModel, KPI_SLOTS, ReportLayout};
use crate::model::{KpiSummary, RowRecord};
use crate::text::{CurrencyStyle, normalize_to_one_line, truncate_to_width};
use crate::types::{Color, Pt, Rect};

pub(crate) const DEFAULT_TITLE: &str = "Resumen";
pub(crate) const CAPTION_FIRST: &str = "Detalle";
pub(crate) const CAPTION_CONTINUED: &str = "Detalle (cont.)";
pub(crate) const EMPTY_MESSAGE: &str = "Sin movimientos para el período seleccionado.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Typefaces {
    pub(crate) regular: String,
    pub(crate) bold: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Weight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HeaderText {
    pub(crate) title: String,
    pub(crate) subtitle: String,
    pub(crate) generated: String,
}

pub(crate) struct Surface<'a> {
    pub(crate) canvas: Canvas,
    pub(crate) fonts: &'a FontRegistry,
    pub(crate) layout: &'a ReportLayout,
    pub(crate) columns: &'a ColumnModel,
    pub(crate) typefaces: &'a Typefaces,
    pub(crate) currency: &'a CurrencyStyle,
}

impl<'a> Surface<'a> {
    fn face(&self, weight: Weight) -> &'a str {
        let faces: &'a Typefaces = self.typefaces;
        match weight {
            Weight::Regular => &faces.regular,
            Weight::Bold => &faces.bold,
        }
    }

    pub(crate) fn measure(&self, weight: Weight, size: Pt, text: &str) -> Pt {
        self.fonts.measure_text_width(self.face(weight), size, text)
    }

    pub(crate) fn fit(&self, weight: Weight, size: Pt, text: &str, max_width: Pt) -> String {
        let face = self.face(weight);
        truncate_to_width(
            |s| self.fonts.measure_text_width(face, size, s),
            text,
            max_width,
        )
    }

    fn text(&mut self, weight: Weight, size: Pt, color: Color, x: Pt, y: Pt, text: String) {
        if text.is_empty() {
            return;
        }
        let face = self.face(weight);
        self.canvas.set_font(face, size);
        self.canvas.set_fill_color(color);
        self.canvas.draw_string(x, y, text);
    }

    // Draws `text` whole; right-aligned text ends at `x + width` even when it
    // is wider than the box.
    #[allow(clippy::too_many_arguments)]
    fn text_aligned(
        &mut self,
        weight: Weight,
        size: Pt,
        color: Color,
        x: Pt,
        y: Pt,
        width: Pt,
        align: Align,
        text: &str,
    ) {
        let x = match align {
            Align::Left => x,
            Align::Right => x + width - self.measure(weight, size, text),
        };
        self.text(weight, size, color, x, y, text.to_string());
    }

    #[allow(clippy::too_many_arguments)]
    fn text_in_box(
        &mut self,
        weight: Weight,
        size: Pt,
        color: Color,
        x: Pt,
        y: Pt,
        width: Pt,
        align: Align,
        text: &str,
    ) {
        let fitted = self.fit(weight, size, text, width);
        self.text_aligned(weight, size, color, x, y, width, align, &fitted);
    }

    fn content_width(&self) -> Pt {
        self.layout.geometry().content_width()
    }
}

pub(crate) fn draw_header(surface: &mut Surface<'_>, header: &HeaderText) -> Pt {
    let layout = surface.layout;
    let metrics = layout.header;
    let palette = layout.palette;
    let sizes = layout.sizes;
    let left = layout.margins.left;
    let width = surface.content_width();

    surface.canvas.meta("band", "header");
    surface.canvas.set_fill_color(palette.brand);
    surface.canvas.draw_rect(Rect::new(
        Pt::ZERO,
        Pt::ZERO,
        layout.page_size.width,
        metrics.height,
    ));

    let title = normalize_to_one_line(Some(&header.title));
    let title = if title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        title
    };
    let rows = [
        (Weight::Bold, sizes.title, palette.header_text, metrics.title_y, title),
        (
            Weight::Regular,
            sizes.subtitle,
            palette.header_subtitle,
            metrics.subtitle_y,
            header.subtitle.clone(),
        ),
        (
            Weight::Regular,
            sizes.generated,
            palette.header_generated,
            metrics.generated_y,
            header.generated.clone(),
        ),
    ];
    for (weight, size, color, y, text) in rows {
        surface.text_in_box(weight, size, color, left, y, width, Align::Left, &text);
    }
    metrics.content_top
}

pub(crate) fn draw_kpi_grid(surface: &mut Surface<'_>, y: Pt, kpis: Option<&KpiSummary>) -> Pt {
    let Some(kpis) = kpis else {
        return y;
    };
    let layout = surface.layout;
    let grid = layout.kpi;
    let palette = layout.palette;
    let sizes = layout.sizes;
    let columns = grid.columns.max(1);
    let gaps = grid.gap * (columns as i32 - 1);
    let card_width = (surface.content_width() - gaps) / (columns as i32);
    let inner_width = card_width - grid.inset_x * 2;

    surface.canvas.meta("band", "kpi");
    surface.canvas.set_line_width(grid.border_width);
    for (index, slot) in KPI_SLOTS.iter().enumerate() {
        let col = (index % columns) as i32;
        let row = (index / columns) as i32;
        let x = layout.margins.left + (card_width + grid.gap) * col;
        let top = y + (grid.card_height + grid.gap) * row;
        let card = Rect::new(x, top, card_width, grid.card_height);

        surface.canvas.meta("kpi_card", slot.label);
        surface.canvas.set_fill_color(palette.card_fill);
        surface.canvas.set_stroke_color(palette.card_border);
        surface.canvas.rounded_rect_path(card, grid.corner_radius);
        surface.canvas.fill_stroke();

        let value = kpis.display_value(slot, surface.currency);
        let text_x = x + grid.inset_x;
        surface.text_in_box(
            Weight::Regular,
            sizes.card_label,
            palette.card_label,
            text_x,
            top + grid.label_y,
            inner_width,
            Align::Left,
            slot.label,
        );
        surface.text_in_box(
            Weight::Bold,
            sizes.card_value,
            palette.body_text,
            text_x,
            top + grid.value_y,
            inner_width,
            Align::Left,
            &value,
        );
    }
    let rows = KPI_SLOTS.len().div_ceil(columns) as i32;
    y + (grid.card_height + grid.gap) * rows + grid.trailing_gap
}

pub(crate) fn draw_section_caption(surface: &mut Surface<'_>, y: Pt, continuation: bool) -> Pt {
    let layout = surface.layout;
    let table = layout.table;
    let caption = if continuation {
        CAPTION_CONTINUED
    } else {
        CAPTION_FIRST
    };
    surface.canvas.meta("band", "caption");
    let width = surface.content_width();
    surface.text_in_box(
        Weight::Bold,
        layout.sizes.section_caption,
        layout.palette.brand,
        layout.margins.left,
        y + table.caption_gap,
        width,
        Align::Left,
        caption,
    );
    y + table.caption_gap + table.caption_height
}

pub(crate) fn draw_table_header(surface: &mut Surface<'_>, y: Pt) -> Pt {
    let layout = surface.layout;
    let table = layout.table;
    let columns = surface.columns;

    surface.canvas.meta("band", "table_header");
    surface
        .canvas
        .meta("band_width", columns.total_width.to_milli_i64().to_string());
    surface.canvas.set_fill_color(layout.palette.brand);
    surface.canvas.draw_rect(Rect::new(
        columns.left(),
        y,
        columns.total_width,
        table.header_height,
    ));
    for column in &columns.columns {
        surface.text_aligned(
            Weight::Bold,
            layout.sizes.table,
            layout.palette.header_text,
            column.x + table.cell_inset,
            y + table.header_text_y,
            column.width - table.cell_inset * 2,
            column.align,
            column.label,
        );
    }
    y + table.header_height
}

// Striping follows the input index, so it does not restart on a new page.
pub(crate) fn draw_detail_row(
    surface: &mut Surface<'_>,
    y: Pt,
    index: usize,
    row: &RowRecord,
) -> Pt {
    let layout = surface.layout;
    let table = layout.table;
    let palette = layout.palette;
    let columns = surface.columns;
    let fill = if index % 2 == 0 {
        palette.stripe_even
    } else {
        palette.stripe_odd
    };

    surface.canvas.meta("row", index.to_string());
    surface
        .canvas
        .meta("band_width", columns.total_width.to_milli_i64().to_string());
    surface.canvas.set_fill_color(fill);
    surface.canvas.set_stroke_color(palette.row_border);
    surface.canvas.set_line_width(table.border_width);
    surface.canvas.rect_path(Rect::new(
        columns.left(),
        y,
        columns.total_width,
        table.row_height,
    ));
    surface.canvas.fill_stroke();

    for column in &columns.columns {
        let text = row.cell_text(column.key, surface.currency);
        surface.text_in_box(
            Weight::Regular,
            layout.sizes.table,
            palette.body_text,
            column.x + table.cell_inset,
            y + table.row_text_y,
            column.width - table.cell_inset * 2,
            column.align,
            &text,
        );
    }
    y + table.row_height
}

pub(crate) fn draw_empty_message(surface: &mut Surface<'_>, y: Pt) -> Pt {
    let layout = surface.layout;
    let size = layout.sizes.empty_message;
    let top = y + layout.table.empty_message_gap;
    surface.canvas.meta("band", "empty");
    let width = surface.content_width();
    surface.text_in_box(
        Weight::Bold,
        size,
        layout.palette.body_text,
        layout.margins.left,
        top,
        width,
        Align::Left,
        EMPTY_MESSAGE,
    );
    top + size
}

pub(crate) fn draw_footer(surface: &mut Surface<'_>, page_number: u32, caption: &str) {
    let layout = surface.layout;
    let footer = layout.footer;
    let palette = layout.palette;
    let height = layout.page_size.height;
    let left = layout.margins.left;
    let width = surface.content_width();
    let right = left + width;
    let rule_y = height - footer.rule_from_bottom;

    surface.canvas.meta("footer", page_number.to_string());
    surface.canvas.set_stroke_color(palette.footer_rule);
    surface.canvas.set_line_width(footer.rule_width);
    surface.canvas.move_to(left, rule_y);
    surface.canvas.line_to(right, rule_y);
    surface.canvas.stroke();

    surface.text_in_box(
        Weight::Regular,
        layout.sizes.footer,
        palette.footer_text,
        left,
        height - footer.caption_from_bottom,
        width,
        Align::Left,
        caption,
    );
    surface.text_in_box(
        Weight::Regular,
        layout.sizes.footer,
        palette.footer_text,
        left,
        height - footer.page_number_from_bottom,
        width,
        Align::Right,
        &format!("Página {page_number}"),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Command;
    use crate::font::{HELVETICA, HELVETICA_BOLD};

    struct Fixture {
        fonts: FontRegistry,
        layout: ReportLayout,
        columns: ColumnModel,
        typefaces: Typefaces,
        currency: CurrencyStyle,
    }

    impl Fixture {
        fn new() -> Self {
            let layout = ReportLayout::standard();
            Self {
                fonts: FontRegistry::new(),
                columns: layout.columns(),
                layout,
                typefaces: Typefaces {
                    regular: HELVETICA.to_string(),
                    bold: HELVETICA_BOLD.to_string(),
                },
                currency: CurrencyStyle::es_ar(),
            }
        }

        fn surface(&self) -> Surface<'_> {
            Surface {
                canvas: Canvas::new(self.layout.page_size),
                fonts: &self.fonts,
                layout: &self.layout,
                columns: &self.columns,
                typefaces: &self.typefaces,
                currency: &self.currency,
            }
        }
    }

    fn strings_with_pos(commands: &[Command]) -> Vec<(Pt, Pt, String)> {
        commands
            .iter()
            .filter_map(|cmd| match cmd {
                Command::DrawString { x, y, text } => Some((*x, *y, text.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn header_defaults_title_and_truncates() {
        let fixture = Fixture::new();
        let mut surface = fixture.surface();
        let long = "Subtítulo ".repeat(40);
        let y = draw_header(
            &mut surface,
            &HeaderText {
                title: "   ".to_string(),
                subtitle: long.clone(),
                generated: "Generado: 07/03/26, 09:05".to_string(),
            },
        );
        assert_eq!(y, Pt::from_i32(92));
        let doc = surface.canvas.finish();
        let strings: Vec<String> = doc.pages[0].strings().map(str::to_string).collect();
        assert_eq!(strings[0], DEFAULT_TITLE);
        assert!(strings[1].ends_with('…'));
        assert!(strings[1].len() < long.len());
        assert_eq!(strings[2], "Generado: 07/03/26, 09:05");
    }

    #[test]
    fn kpi_grid_consumes_two_card_rows() {
        let fixture = Fixture::new();
        let mut surface = fixture.surface();
        let kpis = KpiSummary::default();
        let y = draw_kpi_grid(&mut surface, Pt::from_i32(92), Some(&kpis));
        assert_eq!(y, Pt::from_i32(210));
        let doc = surface.canvas.finish();
        let cards: Vec<&str> = doc.pages[0].meta_values("kpi_card").collect();
        assert_eq!(
            cards,
            vec!["Ventas", "Total", "Efectivo", "Transferencia", "A cobrar"]
        );
    }

    #[test]
    fn absent_kpis_consume_no_height() {
        let fixture = Fixture::new();
        let mut surface = fixture.surface();
        let y = draw_kpi_grid(&mut surface, Pt::from_i32(92), None);
        assert_eq!(y, Pt::from_i32(92));
        assert_eq!(surface.canvas.current_command_count(), 0);
    }

    #[test]
    fn detail_cells_stay_inside_their_columns() {
        let fixture = Fixture::new();
        let mut surface = fixture.surface();
        let row = RowRecord {
            date: "2026-03-04".to_string(),
            time: "08:15".to_string(),
            client: "Cooperativa de Transportistas Unidos del Sur".to_string(),
            product: "Piedra partida 6-20 lavada".to_string(),
            qty: Some(12.5.into()),
            payment_method: "transferencia".to_string(),
            total: 123_456_789.0,
            debt: 0.0,
        };
        let y = draw_detail_row(&mut surface, Pt::from_i32(270), 3, &row);
        assert_eq!(y, Pt::from_i32(288));
        let doc = surface.canvas.finish();
        let size = fixture.layout.sizes.table;
        for (x, _, text) in strings_with_pos(&doc.pages[0].commands) {
            let column = fixture
                .columns
                .columns
                .iter()
                .rev()
                .find(|c| c.x <= x)
                .expect("string starts inside the table");
            let width = fixture.fonts.measure_text_width(HELVETICA, size, &text);
            assert!(x + width <= column.x + column.width - Pt::from_i32(6), "{text}");
        }
        let fills: Vec<&Command> = doc.pages[0]
            .commands
            .iter()
            .filter(|c| matches!(c, Command::SetFillColor(_)))
            .collect();
        assert_eq!(
            fills[0],
            &Command::SetFillColor(fixture.layout.palette.stripe_odd)
        );
    }

    #[test]
    fn table_header_draws_labels_whole() {
        let fixture = Fixture::new();
        let mut surface = fixture.surface();
        let y = draw_table_header(&mut surface, Pt::from_i32(128));
        assert_eq!(y, Pt::from_i32(152));
        let doc = surface.canvas.finish();
        let strings = strings_with_pos(&doc.pages[0].commands);
        let labels: Vec<&str> = strings.iter().map(|(_, _, text)| text.as_str()).collect();
        let expected: Vec<&str> = fixture.columns.columns.iter().map(|c| c.label).collect();
        assert_eq!(labels, expected);

        let size = fixture.layout.sizes.table;
        let inset = fixture.layout.table.cell_inset;
        for ((x, _, text), column) in strings.iter().zip(&fixture.columns.columns) {
            if column.align == Align::Right {
                let width = fixture.fonts.measure_text_width(HELVETICA_BOLD, size, text);
                assert_eq!(*x + width, column.x + column.width - inset, "{text}");
            } else {
                assert_eq!(*x, column.x + inset, "{text}");
            }
        }
    }

    #[test]
    fn line_widths_come_from_the_layout() {
        let fixture = Fixture::new();
        let mut surface = fixture.surface();
        draw_detail_row(&mut surface, Pt::from_i32(152), 0, &RowRecord::default());
        draw_footer(&mut surface, 1, "Marca");
        let doc = surface.canvas.finish();
        let widths: Vec<Pt> = doc.pages[0]
            .commands
            .iter()
            .filter_map(|c| match c {
                Command::SetLineWidth(width) => Some(*width),
                _ => None,
            })
            .collect();
        assert_eq!(
            widths,
            vec![
                fixture.layout.table.border_width,
                fixture.layout.footer.rule_width
            ]
        );
        assert_eq!(fixture.layout.footer.rule_width, Pt::from_i32(1));
        assert_eq!(fixture.layout.kpi.border_width, Pt::from_i32(1));
    }

    #[test]
    fn footer_right_aligns_page_number() {
        let fixture = Fixture::new();
        let mut surface = fixture.surface();
        draw_footer(&mut surface, 3, "CanteraVenta • Reporte automático");
        let doc = surface.canvas.finish();
        let strings = strings_with_pos(&doc.pages[0].commands);
        let (x, y, text) = strings.last().expect("page number drawn").clone();
        assert_eq!(text, "Página 3");
        let height = fixture.layout.page_size.height;
        assert_eq!(y, height - Pt::from_i32(30));
        let width = fixture
            .fonts
            .measure_text_width(HELVETICA, fixture.layout.sizes.footer, &text);
        let right_edge = fixture.layout.page_size.width - fixture.layout.margins.right;
        assert_eq!(x + width, right_edge);
    }
}
