use crate::types::{Color, Margins, Pt, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKey {
    Date,
    Time,
    Client,
    Product,
    Qty,
    Pay,
    Total,
    Debt,
}

impl ColumnKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnKey::Date => "date",
            ColumnKey::Time => "time",
            ColumnKey::Client => "client",
            ColumnKey::Product => "product",
            ColumnKey::Qty => "qty",
            ColumnKey::Pay => "pay",
            ColumnKey::Total => "total",
            ColumnKey::Debt => "debt",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub key: ColumnKey,
    pub label: &'static str,
    pub width: u16,
    pub align: Align,
}

pub const COLUMN_MANIFEST: [ColumnDef; 8] = [
    ColumnDef {
        key: ColumnKey::Date,
        label: "Fecha",
        width: 78,
        align: Align::Left,
    },
    ColumnDef {
        key: ColumnKey::Time,
        label: "Hora",
        width: 58,
        align: Align::Left,
    },
    ColumnDef {
        key: ColumnKey::Client,
        label: "Cliente",
        width: 100,
        align: Align::Left,
    },
    ColumnDef {
        key: ColumnKey::Product,
        label: "Producto",
        width: 84,
        align: Align::Left,
    },
    ColumnDef {
        key: ColumnKey::Qty,
        label: "Cant.",
        width: 30,
        align: Align::Right,
    },
    ColumnDef {
        key: ColumnKey::Pay,
        label: "Pago",
        width: 50,
        align: Align::Left,
    },
    ColumnDef {
        key: ColumnKey::Total,
        label: "Total",
        width: 60,
        align: Align::Right,
    },
    ColumnDef {
        key: ColumnKey::Debt,
        label: "Deuda",
        width: 60,
        align: Align::Right,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KpiKey {
    Ventas,
    Total,
    Efectivo,
    Transferencia,
    ACobrar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KpiFormat {
    Plain,
    Currency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KpiSlot {
    pub key: KpiKey,
    pub label: &'static str,
    pub format: KpiFormat,
}

pub const KPI_SLOTS: [KpiSlot; 5] = [
    KpiSlot {
        key: KpiKey::Ventas,
        label: "Ventas",
        format: KpiFormat::Plain,
    },
    KpiSlot {
        key: KpiKey::Total,
        label: "Total",
        format: KpiFormat::Currency,
    },
    KpiSlot {
        key: KpiKey::Efectivo,
        label: "Efectivo",
        format: KpiFormat::Currency,
    },
    KpiSlot {
        key: KpiKey::Transferencia,
        label: "Transferencia",
        format: KpiFormat::Currency,
    },
    KpiSlot {
        key: KpiKey::ACobrar,
        label: "A cobrar",
        format: KpiFormat::Currency,
    },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub brand: Color,
    pub header_text: Color,
    pub header_subtitle: Color,
    pub header_generated: Color,
    pub body_text: Color,
    pub card_label: Color,
    pub card_fill: Color,
    pub card_border: Color,
    pub stripe_even: Color,
    pub stripe_odd: Color,
    pub row_border: Color,
    pub footer_rule: Color,
    pub footer_text: Color,
}

impl Palette {
    pub fn standard() -> Self {
        Self {
            brand: Color::hex(0x0B4F6C),
            header_text: Color::WHITE,
            header_subtitle: Color::hex(0xEAF2F6),
            header_generated: Color::hex(0xD3E6EF),
            body_text: Color::hex(0x111827),
            card_label: Color::hex(0x51606A),
            card_fill: Color::hex(0xF3F6F8),
            card_border: Color::hex(0xD9E2E7),
            stripe_even: Color::WHITE,
            stripe_odd: Color::hex(0xFAFBFC),
            row_border: Color::hex(0xEEF2F4),
            footer_rule: Color::hex(0xE1E7EB),
            footer_text: Color::hex(0x7A8790),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeSizes {
    pub title: Pt,
    pub subtitle: Pt,
    pub generated: Pt,
    pub section_caption: Pt,
    pub table: Pt,
    pub card_label: Pt,
    pub card_value: Pt,
    pub empty_message: Pt,
    pub footer: Pt,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderMetrics {
    pub height: Pt,
    pub title_y: Pt,
    pub subtitle_y: Pt,
    pub generated_y: Pt,
    pub content_top: Pt,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KpiGridMetrics {
    pub columns: usize,
    pub card_height: Pt,
    pub gap: Pt,
    pub corner_radius: Pt,
    pub border_width: Pt,
    pub inset_x: Pt,
    pub label_y: Pt,
    pub value_y: Pt,
    pub trailing_gap: Pt,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableMetrics {
    pub caption_gap: Pt,
    pub caption_height: Pt,
    pub header_height: Pt,
    pub header_text_y: Pt,
    pub row_height: Pt,
    pub row_text_y: Pt,
    pub cell_inset: Pt,
    pub border_width: Pt,
    pub empty_message_gap: Pt,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FooterMetrics {
    pub reserved_height: Pt,
    pub rule_from_bottom: Pt,
    pub rule_width: Pt,
    pub caption_from_bottom: Pt,
    pub page_number_from_bottom: Pt,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportLayout {
    pub page_size: Size,
    pub margins: Margins,
    pub header: HeaderMetrics,
    pub kpi: KpiGridMetrics,
    pub table: TableMetrics,
    pub footer: FooterMetrics,
    pub sizes: TypeSizes,
    pub palette: Palette,
}

impl ReportLayout {
    pub fn standard() -> Self {
        let pt = Pt::from_i32;
        Self {
            page_size: Size::a4(),
            margins: Margins::all(40.0),
            header: HeaderMetrics {
                height: pt(72),
                title_y: pt(18),
                subtitle_y: pt(44),
                generated_y: pt(58),
                content_top: pt(92),
            },
            kpi: KpiGridMetrics {
                columns: 3,
                card_height: pt(46),
                gap: pt(10),
                corner_radius: pt(8),
                border_width: pt(1),
                inset_x: pt(10),
                label_y: pt(8),
                value_y: pt(22),
                trailing_gap: pt(6),
            },
            table: TableMetrics {
                caption_gap: pt(8),
                caption_height: pt(28),
                header_height: pt(24),
                header_text_y: pt(6),
                row_height: pt(18),
                row_text_y: pt(4),
                cell_inset: pt(6),
                border_width: Pt::from_f32(0.5),
                empty_message_gap: pt(18),
            },
            footer: FooterMetrics {
                reserved_height: pt(60),
                rule_from_bottom: pt(48),
                rule_width: pt(1),
                caption_from_bottom: pt(40),
                page_number_from_bottom: pt(30),
            },
            sizes: TypeSizes {
                title: pt(18),
                subtitle: pt(10),
                generated: pt(9),
                section_caption: pt(11),
                table: pt(9),
                card_label: pt(9),
                card_value: pt(14),
                empty_message: pt(12),
                footer: pt(8),
            },
            palette: Palette::standard(),
        }
    }

    pub fn geometry(&self) -> PageGeometry {
        PageGeometry {
            page_size: self.page_size,
            margins: self.margins,
            reserved_footer: self.footer.reserved_height,
        }
    }

    pub fn columns(&self) -> ColumnModel {
        ColumnModel::build(&COLUMN_MANIFEST, self.margins.left)
    }
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_size: Size,
    pub margins: Margins,
    pub reserved_footer: Pt,
}

impl PageGeometry {
    pub fn content_width(&self) -> Pt {
        self.page_size.width - self.margins.left - self.margins.right
    }

    pub fn content_height(&self) -> Pt {
        self.page_size.height - self.margins.top - self.margins.bottom
    }

    pub fn max_content_y(&self) -> Pt {
        self.page_size.height - self.margins.bottom - self.reserved_footer
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub key: ColumnKey,
    pub label: &'static str,
    pub width: Pt,
    pub align: Align,
    pub x: Pt,
}

// total_width is the width of every table band and row rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnModel {
    pub columns: Vec<ColumnSpec>,
    pub total_width: Pt,
}

impl ColumnModel {
    pub fn build(manifest: &[ColumnDef], left: Pt) -> Self {
        let mut x = left;
        let mut columns = Vec::with_capacity(manifest.len());
        for def in manifest {
            let width = Pt::from_i32(def.width as i32);
            columns.push(ColumnSpec {
                key: def.key,
                label: def.label,
                width,
                align: def.align,
                x,
            });
            x += width;
        }
        let total_width = columns.iter().map(|c| c.width).sum();
        Self {
            columns,
            total_width,
        }
    }

    pub fn left(&self) -> Pt {
        self.columns.first().map(|c| c.x).unwrap_or(Pt::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_are_laid_out_back_to_back() {
        let model = ReportLayout::standard().columns();
        assert_eq!(model.columns.len(), 8);
        assert_eq!(model.total_width, Pt::from_i32(520));
        assert_eq!(model.left(), Pt::from_i32(40));
        for pair in model.columns.windows(2) {
            assert_eq!(pair[0].x + pair[0].width, pair[1].x);
        }
        let last = model.columns.last().expect("manifest is not empty");
        assert_eq!(last.x + last.width, model.left() + model.total_width);
    }

    #[test]
    fn manifest_alignment_matches_numeric_columns() {
        let right: Vec<&str> = COLUMN_MANIFEST
            .iter()
            .filter(|c| c.align == Align::Right)
            .map(|c| c.key.as_str())
            .collect();
        assert_eq!(right, vec!["qty", "total", "debt"]);
    }

    #[test]
    fn geometry_reserves_footer_zone() {
        let geometry = ReportLayout::standard().geometry();
        assert_eq!(geometry.content_width().to_milli_i64(), 515_280);
        assert_eq!(geometry.content_height().to_milli_i64(), 761_890);
        assert_eq!(geometry.max_content_y().to_milli_i64(), 741_890);
    }

    #[test]
    fn kpi_slots_keep_fixed_order() {
        let labels: Vec<&str> = KPI_SLOTS.iter().map(|s| s.label).collect();
        assert_eq!(
            labels,
            vec!["Ventas", "Total", "Efectivo", "Transferencia", "A cobrar"]
        );
    }
}
