use crate::canvas::{Command, Document, Page};
use crate::font::{FIRST_CHAR, FontRegistry, LAST_CHAR, RegisteredFont, winansi_code};
use crate::types::{Color, Pt, Size};
use chrono::{DateTime, FixedOffset};
use std::collections::BTreeMap;
use std::io::{self, Write};

const PDF_CATALOG_ID: usize = 1;
const PDF_PAGES_ID: usize = 2;
const PDF_RESOURCES_ID: usize = 3;

// Keep intermediate page tree nodes small so long reports do not produce a
// single huge /Kids array.
const PDF_PAGE_NODE_MAX_KIDS: usize = 64;

const PDF_HEADER: &[u8] = b"%PDF-1.7\n";

#[derive(Debug, Clone, Default)]
pub(crate) struct PdfOptions {
    pub document_title: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamFontKind {
    Type1,
    TrueTypeWinAnsi,
}

#[derive(Debug)]
struct StreamFont {
    logical_name: String,
    resource: String,
    start_id: usize,
    kind: StreamFontKind,
}

impl StreamFont {
    fn font_object_id(&self) -> usize {
        match self.kind {
            StreamFontKind::Type1 => self.start_id,
            // FontFile2, FontDescriptor, Font.
            StreamFontKind::TrueTypeWinAnsi => self.start_id + 2,
        }
    }
}

#[derive(Debug)]
struct PdfPageNode {
    id: usize,
    kids: Vec<usize>,
}

pub(crate) struct PdfStreamWriter<'a, W: Write> {
    writer: &'a mut W,
    offset: usize,
    offsets: Vec<usize>, // index by object id; 0 is the free object.
    next_id: usize,
    page_size: Size,
    options: PdfOptions,
    registry: &'a FontRegistry,

    fonts: BTreeMap<String, StreamFont>,
    next_font_resource: usize,

    page_nodes: Vec<PdfPageNode>,
    current_node: Option<PdfPageNode>,
    page_count: usize,
}

impl<'a, W: Write> PdfStreamWriter<'a, W> {
    pub(crate) fn new(
        writer: &'a mut W,
        page_size: Size,
        registry: &'a FontRegistry,
        options: PdfOptions,
    ) -> io::Result<Self> {
        let mut offset: usize = 0;
        write_bytes(writer, PDF_HEADER, &mut offset)?;
        write_bytes(writer, b"%\xE2\xE3\xCF\xD3\n", &mut offset)?;
        Ok(Self {
            writer,
            offset,
            offsets: vec![0; PDF_RESOURCES_ID + 1],
            next_id: PDF_RESOURCES_ID + 1,
            page_size,
            options,
            registry,
            fonts: BTreeMap::new(),
            next_font_resource: 1,
            page_nodes: Vec::new(),
            current_node: None,
            page_count: 0,
        })
    }

    pub(crate) fn add_document(&mut self, document: &Document) -> io::Result<()> {
        if document.page_size != self.page_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "mixed page sizes are not supported in a single PDF stream",
            ));
        }
        for page in &document.pages {
            self.add_page(page)?;
        }
        Ok(())
    }

    pub(crate) fn add_page(&mut self, page: &Page) -> io::Result<()> {
        let parent_id = self.ensure_page_node();
        let start = self.alloc_ids(2);
        let content_id = start;
        let page_id = start + 1;
        if let Some(node) = self.current_node.as_mut() {
            node.kids.push(page_id);
        }

        let content = self.render_commands(&page.commands)?;
        self.write_object(content_id, &stream_object(&content))?;
        let page_obj = format!(
            "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {} {}] /Resources {} 0 R /Contents {} 0 R >>",
            parent_id,
            fmt_pt(self.page_size.width),
            fmt_pt(self.page_size.height),
            PDF_RESOURCES_ID,
            content_id,
        );
        self.write_object(page_id, &page_obj)?;
        self.page_count += 1;
        Ok(())
    }

    pub(crate) fn finish(&mut self) -> io::Result<usize> {
        if let Some(node) = self.current_node.take() {
            self.page_nodes.push(node);
        }

        // 1) Fonts; ids were reserved when each face was first used.
        let fonts = std::mem::take(&mut self.fonts);
        for font_state in fonts.values() {
            match font_state.kind {
                StreamFontKind::Type1 => {
                    self.write_object(
                        font_state.start_id,
                        &font_object(&font_state.logical_name),
                    )?;
                }
                StreamFontKind::TrueTypeWinAnsi => {
                    let Some(font) = self.registry.resolve(&font_state.logical_name) else {
                        return Err(io::Error::new(
                            io::ErrorKind::NotFound,
                            format!("font not found in registry: {}", font_state.logical_name),
                        ));
                    };
                    let objects = build_truetype_font_objects(font, font_state.start_id);
                    for (i, obj) in objects.iter().enumerate() {
                        self.write_object(font_state.start_id + i, obj)?;
                    }
                }
            }
        }

        // 2) Resources dictionary (referenced by every page).
        let font_entries: Vec<(String, usize)> = fonts
            .values()
            .map(|f| (f.resource.clone(), f.font_object_id()))
            .collect();
        self.write_object(
            PDF_RESOURCES_ID,
            &format!("<< /Font {} >>", font_resources(&font_entries)),
        )?;

        // 3) Page tree nodes + root.
        let page_nodes = std::mem::take(&mut self.page_nodes);
        for node in &page_nodes {
            self.write_object(
                node.id,
                &format!(
                    "<< /Type /Pages /Parent {} 0 R /Count {} /Kids [{}] >>",
                    PDF_PAGES_ID,
                    node.kids.len(),
                    object_refs(&node.kids)
                ),
            )?;
        }
        let total_pages: usize = page_nodes.iter().map(|n| n.kids.len()).sum();
        let node_ids: Vec<usize> = page_nodes.iter().map(|n| n.id).collect();
        self.write_object(
            PDF_PAGES_ID,
            &format!(
                "<< /Type /Pages /Count {} /Kids [{}] >>",
                total_pages,
                object_refs(&node_ids)
            ),
        )?;

        // 4) Info + Catalog.
        let info_id = self.alloc_ids(1);
        self.write_object(info_id, &info_object(&self.options))?;
        let mut catalog = format!("<< /Type /Catalog /Pages {} 0 R", PDF_PAGES_ID);
        if self.options.document_title.is_some() {
            catalog.push_str(" /ViewerPreferences << /DisplayDocTitle true >>");
        }
        catalog.push_str(" >>");
        self.write_object(PDF_CATALOG_ID, &catalog)?;

        // 5) XRef + trailer.
        let total_objects = self.next_id.saturating_sub(1);
        let xref_start = self.offset;
        write_str(
            self.writer,
            &format!("xref\n0 {}\n", total_objects + 1),
            &mut self.offset,
        )?;
        write_bytes(self.writer, b"0000000000 65535 f \n", &mut self.offset)?;
        for id in 1..=total_objects {
            let obj_offset = self.offsets.get(id).copied().unwrap_or(0);
            write_str(
                self.writer,
                &format!("{:010} 00000 n \n", obj_offset),
                &mut self.offset,
            )?;
        }
        let trailer = format!(
            "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            total_objects + 1,
            PDF_CATALOG_ID,
            info_id,
            xref_start
        );
        write_str(self.writer, &trailer, &mut self.offset)?;
        self.writer.flush()?;

        tracing::debug!(
            bytes = self.offset,
            pages = self.page_count,
            fonts = fonts.len(),
            "pdf stream finished"
        );
        Ok(self.offset)
    }

    fn render_commands(&mut self, commands: &[Command]) -> io::Result<String> {
        let page_height = self.page_size.height;
        let mut out = String::new();
        let mut current_font_size = Pt::from_i32(12);
        let mut current_font_name = "Helvetica".to_string();

        for cmd in commands {
            match cmd {
                Command::Meta { .. } => {}
                Command::SetFillColor(color) => out.push_str(&color_to_pdf_fill(*color)),
                Command::SetStrokeColor(color) => out.push_str(&color_to_pdf_stroke(*color)),
                Command::SetLineWidth(width) => {
                    out.push_str(&format!("{} w\n", fmt_pt(*width)));
                }
                Command::SetFontName(name) => {
                    current_font_name = name.clone();
                    self.ensure_font(&current_font_name);
                }
                Command::SetFontSize(size) => current_font_size = *size,
                Command::MoveTo { x, y } => {
                    out.push_str(&format!("{} {} m\n", fmt_pt(*x), fmt_pt(page_height - *y)));
                }
                Command::LineTo { x, y } => {
                    out.push_str(&format!("{} {} l\n", fmt_pt(*x), fmt_pt(page_height - *y)));
                }
                Command::CurveTo {
                    x1,
                    y1,
                    x2,
                    y2,
                    x,
                    y,
                } => {
                    out.push_str(&format!(
                        "{} {} {} {} {} {} c\n",
                        fmt_pt(*x1),
                        fmt_pt(page_height - *y1),
                        fmt_pt(*x2),
                        fmt_pt(page_height - *y2),
                        fmt_pt(*x),
                        fmt_pt(page_height - *y),
                    ));
                }
                Command::RectPath {
                    x,
                    y,
                    width,
                    height,
                } => {
                    out.push_str(&rect_op(*x, page_height - *y - *height, *width, *height));
                }
                Command::ClosePath => out.push_str("h\n"),
                Command::Stroke => out.push_str("S\n"),
                Command::FillStroke => out.push_str("B\n"),
                Command::DrawRect {
                    x,
                    y,
                    width,
                    height,
                } => {
                    out.push_str(&rect_op(*x, page_height - *y - *height, *width, *height));
                    out.push_str("f\n");
                }
                Command::DrawString { x, y, text } => {
                    let resource = self.ensure_font(&current_font_name);
                    let encoded = encode_winansi_pdf_string(text);
                    if encoded.replaced > 0 {
                        tracing::debug!(
                            font = %current_font_name,
                            replaced = encoded.replaced,
                            "characters outside WinAnsi emitted as '?'"
                        );
                    }
                    out.push_str("BT\n");
                    out.push_str(&format!("/{} {} Tf\n", resource, fmt_pt(current_font_size)));
                    out.push_str(&format!(
                        "{} {} Td\n",
                        fmt_pt(*x),
                        fmt_pt(page_height - *y - current_font_size)
                    ));
                    out.push_str(&format!("({}) Tj\n", encoded.text));
                    out.push_str("ET\n");
                }
            }
        }
        Ok(out)
    }

    fn ensure_offsets_len(&mut self, required_len: usize) {
        if self.offsets.len() < required_len {
            self.offsets.resize(required_len, 0);
        }
    }

    fn alloc_ids(&mut self, count: usize) -> usize {
        let start = self.next_id;
        self.next_id = self.next_id.saturating_add(count);
        self.ensure_offsets_len(self.next_id);
        start
    }

    fn write_object(&mut self, obj_id: usize, body: &str) -> io::Result<()> {
        write_pdf_object(
            self.writer,
            &mut self.offset,
            &mut self.offsets,
            obj_id,
            body,
        )
    }

    fn ensure_page_node(&mut self) -> usize {
        let needs_new = self
            .current_node
            .as_ref()
            .map(|n| n.kids.len() >= PDF_PAGE_NODE_MAX_KIDS)
            .unwrap_or(true);
        if needs_new {
            if let Some(node) = self.current_node.take() {
                self.page_nodes.push(node);
            }
            let id = self.alloc_ids(1);
            self.current_node = Some(PdfPageNode {
                id,
                kids: Vec::with_capacity(PDF_PAGE_NODE_MAX_KIDS),
            });
        }
        self.current_node
            .as_ref()
            .map(|n| n.id)
            .unwrap_or(PDF_PAGES_ID)
    }

    fn ensure_font(&mut self, name: &str) -> String {
        if let Some(font) = self.fonts.get(name) {
            return font.resource.clone();
        }
        let resource = format!("F{}", self.next_font_resource);
        self.next_font_resource += 1;

        let kind = if !is_base14_font(name) && self.registry.resolve(name).is_some() {
            StreamFontKind::TrueTypeWinAnsi
        } else {
            StreamFontKind::Type1
        };
        let start_id = self.alloc_ids(match kind {
            StreamFontKind::Type1 => 1,
            StreamFontKind::TrueTypeWinAnsi => 3,
        });
        self.fonts.insert(
            name.to_string(),
            StreamFont {
                logical_name: name.to_string(),
                resource: resource.clone(),
                start_id,
                kind,
            },
        );
        resource
    }
}

pub(crate) fn write_document<W: Write>(
    document: &Document,
    registry: &FontRegistry,
    options: PdfOptions,
    writer: &mut W,
) -> io::Result<usize> {
    let mut pdf_stream = PdfStreamWriter::new(writer, document.page_size, registry, options)?;
    pdf_stream.add_document(document)?;
    pdf_stream.finish()
}

fn is_base14_font(name: &str) -> bool {
    matches!(
        name,
        "Helvetica"
            | "Helvetica-Bold"
            | "Helvetica-Oblique"
            | "Helvetica-BoldOblique"
            | "Times-Roman"
            | "Times-Bold"
            | "Times-Italic"
            | "Times-BoldItalic"
            | "Courier"
            | "Courier-Bold"
            | "Courier-Oblique"
            | "Courier-BoldOblique"
            | "Symbol"
            | "ZapfDingbats"
    )
}

fn build_truetype_font_objects(font: &RegisteredFont, start_id: usize) -> Vec<String> {
    let font_file_id = start_id;
    let descriptor_id = start_id + 1;
    vec![
        font_file_object(&font.data),
        font_descriptor_object(font, font_file_id),
        truetype_font_object(font, descriptor_id),
    ]
}

fn truetype_font_object(font: &RegisteredFont, descriptor_id: usize) -> String {
    let base = sanitize_font_name(&font.name);
    let widths = font
        .metrics
        .widths
        .iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "<< /Type /Font /Subtype /TrueType /BaseFont /{} /FirstChar {} /LastChar {} /Widths [{}] /FontDescriptor {} 0 R /Encoding /WinAnsiEncoding >>",
        base, FIRST_CHAR, LAST_CHAR, widths, descriptor_id
    )
}

fn font_descriptor_object(font: &RegisteredFont, font_file_id: usize) -> String {
    let base = sanitize_font_name(&font.name);
    let metrics = &font.metrics;
    // Nonsymbolic, plus FixedPitch when the face says so.
    let mut flags = 32;
    if metrics.is_fixed_pitch {
        flags |= 1;
    }
    format!(
        "<< /Type /FontDescriptor /FontName /{} /Flags {} /FontBBox [{} {} {} {}] /ItalicAngle {} /Ascent {} /Descent {} /CapHeight {} /StemV 80 /MissingWidth {} /FontFile2 {} 0 R >>",
        base,
        flags,
        metrics.bbox.0,
        metrics.bbox.1,
        metrics.bbox.2,
        metrics.bbox.3,
        metrics.italic_angle,
        metrics.ascent,
        metrics.descent,
        metrics.cap_height,
        metrics.missing_width,
        font_file_id
    )
}

fn font_file_object(data: &[u8]) -> String {
    let mut stream_data = ascii_hex_encode(data);
    stream_data.push('>');
    stream_data.push('\n');
    format!(
        "<< /Length {} /Length1 {} /Filter /ASCIIHexDecode >>\nstream\n{}endstream",
        stream_data.len(),
        data.len(),
        stream_data
    )
}

fn ascii_hex_encode(data: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut out = String::with_capacity(data.len() * 2 + data.len() / 32);
    for (index, byte) in data.iter().enumerate() {
        let _ = write!(&mut out, "{:02X}", byte);
        if index % 32 == 31 {
            out.push('\n');
        }
    }
    out
}

fn font_object(name: &str) -> String {
    format!(
        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
        sanitize_font_name(name)
    )
}

fn font_resources(fonts: &[(String, usize)]) -> String {
    let entries: Vec<String> = fonts
        .iter()
        .map(|(resource, font_id)| format!("/{} {} 0 R", resource, font_id))
        .collect();
    format!("<< {} >>", entries.join(" "))
}

fn object_refs(ids: &[usize]) -> String {
    ids.iter()
        .map(|id| format!("{} 0 R", id))
        .collect::<Vec<_>>()
        .join(" ")
}

fn sanitize_font_name(name: &str) -> String {
    let mut out = String::new();
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' {
            out.push(ch);
        } else if ch == ' ' {
            out.push('-');
        }
    }
    if out.is_empty() {
        "Helvetica".to_string()
    } else {
        out
    }
}

fn stream_object(content: &str) -> String {
    format!(
        "<< /Length {} >>\nstream\n{}\nendstream",
        content.len(),
        content
    )
}

fn info_object(options: &PdfOptions) -> String {
    let mut entries: Vec<String> = Vec::new();
    if let Some(title) = options.document_title.as_deref() {
        entries.push(format!("/Title ({})", encode_winansi_pdf_string(title).text));
    }
    let producer = options.producer.as_deref().unwrap_or("resumen-pdf");
    entries.push(format!(
        "/Producer ({})",
        encode_winansi_pdf_string(producer).text
    ));
    if let Some(date) = options.creation_date.as_ref() {
        entries.push(format!("/CreationDate ({})", pdf_date(date)));
    }
    format!("<< {} >>", entries.join(" "))
}

fn pdf_date(date: &DateTime<FixedOffset>) -> String {
    let offset = date.offset().local_minus_utc();
    let sign = if offset < 0 { '-' } else { '+' };
    let offset = offset.abs();
    format!(
        "D:{}{}{:02}'{:02}'",
        date.format("%Y%m%d%H%M%S"),
        sign,
        offset / 3600,
        (offset % 3600) / 60
    )
}

fn write_pdf_object<W: Write>(
    writer: &mut W,
    offset: &mut usize,
    offsets: &mut [usize],
    obj_id: usize,
    body: &str,
) -> io::Result<()> {
    if let Some(slot) = offsets.get_mut(obj_id) {
        *slot = *offset;
    }
    write_str(writer, &format!("{} 0 obj\n", obj_id), offset)?;
    write_bytes(writer, body.as_bytes(), offset)?;
    write_bytes(writer, b"\nendobj\n", offset)?;
    Ok(())
}

fn write_bytes<W: Write>(writer: &mut W, data: &[u8], offset: &mut usize) -> io::Result<()> {
    writer.write_all(data)?;
    *offset += data.len();
    Ok(())
}

fn write_str<W: Write>(writer: &mut W, data: &str, offset: &mut usize) -> io::Result<()> {
    write_bytes(writer, data.as_bytes(), offset)
}

struct WinAnsiEncoded {
    text: String,
    replaced: usize,
}

// Characters without a WinAnsi slot become '?'.
fn encode_winansi_pdf_string(input: &str) -> WinAnsiEncoded {
    let mut out = String::with_capacity(input.len());
    let mut replaced = 0usize;
    for ch in input.chars() {
        let byte = match winansi_code(ch) {
            Some(byte) => byte,
            None => {
                replaced += 1;
                b'?'
            }
        };
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b if !(0x20..0x7f).contains(&b) => out.push_str(&format!("\\{:03o}", b)),
            b => out.push(b as char),
        }
    }
    WinAnsiEncoded {
        text: out,
        replaced,
    }
}

fn rect_op(x: Pt, y: Pt, width: Pt, height: Pt) -> String {
    format!(
        "{} {} {} {} re\n",
        fmt_pt(x),
        fmt_pt(y),
        fmt_pt(width),
        fmt_pt(height)
    )
}

fn fmt_unit(value: f32) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let milli = (value.clamp(0.0, 1.0) * 1000.0).round() as i64;
    format_milli(milli)
}

fn format_milli(milli: i64) -> String {
    if milli == 0 {
        return "0".to_string();
    }
    let sign = if milli < 0 { "-" } else { "" };
    let abs = milli.abs();
    let int_part = abs / 1000;
    let frac_part = abs % 1000;
    if frac_part == 0 {
        return format!("{}{}", sign, int_part);
    }
    let mut s = format!("{}{}.{:03}", sign, int_part, frac_part);
    while s.ends_with('0') {
        s.pop();
    }
    s
}

fn fmt_pt(value: Pt) -> String {
    format_milli(value.to_milli_i64())
}

fn color_to_pdf_fill(color: Color) -> String {
    format!(
        "{} {} {} rg\n",
        fmt_unit(color.r),
        fmt_unit(color.g),
        fmt_unit(color.b)
    )
}

fn color_to_pdf_stroke(color: Color) -> String {
    format!(
        "{} {} {} RG\n",
        fmt_unit(color.r),
        fmt_unit(color.g),
        fmt_unit(color.b)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::types::Rect;
    use chrono::TimeZone;

    fn one_page_document(commands: Vec<Command>) -> Document {
        Document {
            page_size: Size::a4(),
            pages: vec![Page { commands }],
        }
    }

    fn count_token(bytes: &[u8], token: &[u8]) -> usize {
        if token.is_empty() || bytes.len() < token.len() {
            return 0;
        }
        bytes.windows(token.len()).filter(|w| *w == token).count()
    }

    fn to_bytes(document: &Document, options: PdfOptions) -> Vec<u8> {
        let registry = FontRegistry::new();
        let mut out = Vec::new();
        let written = write_document(document, &registry, options, &mut out).expect("pdf");
        assert_eq!(written, out.len());
        out
    }

    #[test]
    fn text_is_placed_from_the_top_edge() {
        let doc = one_page_document(vec![
            Command::SetFontName("Helvetica-Bold".to_string()),
            Command::SetFontSize(Pt::from_i32(10)),
            Command::DrawString {
                x: Pt::from_i32(40),
                y: Pt::from_i32(100),
                text: "Página (1)".to_string(),
            },
        ]);
        let bytes = to_bytes(&doc, PdfOptions::default());
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/F1 10 Tf\n40 731.89 Td\n(P\\341gina \\(1\\)) Tj\n"));
        assert!(text.contains("/BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding"));
    }

    #[test]
    fn rectangles_flip_to_bottom_left_origin() {
        let mut canvas = Canvas::new(Size::a4());
        canvas.set_fill_color(Color::hex(0x0B4F6C));
        canvas.draw_rect(Rect::new(
            Pt::ZERO,
            Pt::ZERO,
            Pt::from_f32(595.28),
            Pt::from_i32(72),
        ));
        let bytes = to_bytes(&canvas.finish(), PdfOptions::default());
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("0.043 0.31 0.424 rg\n0 769.89 595.28 72 re\nf\n"));
    }

    #[test]
    fn unencodable_characters_become_question_marks() {
        let encoded = encode_winansi_pdf_string("a→b€");
        assert_eq!(encoded.text, "a?b\\200");
        assert_eq!(encoded.replaced, 1);
    }

    #[test]
    fn output_parses_and_counts_pages() {
        let mut canvas = Canvas::new(Size::a4());
        for page in 0..3 {
            canvas.draw_string(Pt::from_i32(40), Pt::from_i32(40), format!("page {page}"));
            if page < 2 {
                canvas.show_page();
            }
        }
        let bytes = to_bytes(&canvas.finish(), PdfOptions::default());
        let parsed = lopdf::Document::load_mem(&bytes).expect("valid pdf");
        assert_eq!(parsed.get_pages().len(), 3);
        assert_eq!(count_token(&bytes, b"/Type /Page "), 3);
        assert_eq!(count_token(&bytes, b"/Subtype /Type1"), 1);
    }

    #[test]
    fn info_dictionary_carries_title_and_date() {
        let date = FixedOffset::west_opt(3 * 3600)
            .and_then(|tz| tz.with_ymd_and_hms(2026, 3, 7, 9, 5, 0).single())
            .expect("valid instant");
        let options = PdfOptions {
            document_title: Some("Resumen semanal".to_string()),
            producer: None,
            creation_date: Some(date),
        };
        let bytes = to_bytes(&one_page_document(vec![]), options);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Title (Resumen semanal)"));
        assert!(text.contains("/CreationDate (D:20260307090500-03'00')"));
        assert!(text.contains("/DisplayDocTitle true"));
        assert!(text.ends_with("%%EOF\n"));
    }

    #[test]
    fn many_pages_split_the_page_tree() {
        let pages = (0..PDF_PAGE_NODE_MAX_KIDS + 1)
            .map(|_| Page::default())
            .collect();
        let doc = Document {
            page_size: Size::a4(),
            pages,
        };
        let bytes = to_bytes(&doc, PdfOptions::default());
        let parsed = lopdf::Document::load_mem(&bytes).expect("valid pdf");
        assert_eq!(parsed.get_pages().len(), PDF_PAGE_NODE_MAX_KIDS + 1);
        assert_eq!(count_token(&bytes, b"/Type /Pages"), 3);
    }
}
