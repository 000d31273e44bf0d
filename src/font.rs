use crate::error::ReportError;
use crate::types::Pt;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const HELVETICA: &str = "Helvetica";
pub const HELVETICA_BOLD: &str = "Helvetica-Bold";

pub(crate) const FIRST_CHAR: u8 = 32;
pub(crate) const LAST_CHAR: u8 = 255;
const WIDTH_SLOTS: usize = (LAST_CHAR - FIRST_CHAR) as usize + 1;

// Adobe AFM advance widths (1/1000 em), WinAnsi codes 32..=255.
// Codes undefined in WinAnsi carry the space width.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; WIDTH_SLOTS] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, 278,
    556, 278, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 278, 611, 278,
    278, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 278, 500, 667,
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; WIDTH_SLOTS] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, 278,
    556, 278, 278, 556, 500, 1000, 556, 556, 333, 1000, 667, 333, 1000, 278, 611, 278,
    278, 278, 278, 500, 500, 350, 556, 1000, 333, 1000, 556, 333, 944, 278, 500, 667,
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
];

// cp1252 assignments in 0x80..=0x9F; the rest of that range is undefined.
const WINANSI_HIGH: [(u8, char); 27] = [
    (0x80, '\u{20AC}'),
    (0x82, '\u{201A}'),
    (0x83, '\u{0192}'),
    (0x84, '\u{201E}'),
    (0x85, '\u{2026}'),
    (0x86, '\u{2020}'),
    (0x87, '\u{2021}'),
    (0x88, '\u{02C6}'),
    (0x89, '\u{2030}'),
    (0x8A, '\u{0160}'),
    (0x8B, '\u{2039}'),
    (0x8C, '\u{0152}'),
    (0x8E, '\u{017D}'),
    (0x91, '\u{2018}'),
    (0x92, '\u{2019}'),
    (0x93, '\u{201C}'),
    (0x94, '\u{201D}'),
    (0x95, '\u{2022}'),
    (0x96, '\u{2013}'),
    (0x97, '\u{2014}'),
    (0x98, '\u{02DC}'),
    (0x99, '\u{2122}'),
    (0x9A, '\u{0161}'),
    (0x9B, '\u{203A}'),
    (0x9C, '\u{0153}'),
    (0x9E, '\u{017E}'),
    (0x9F, '\u{0178}'),
];

pub(crate) fn winansi_code(ch: char) -> Option<u8> {
    match ch {
        ' '..='~' | '\u{00A0}'..='\u{00FF}' => Some(ch as u32 as u8),
        _ => WINANSI_HIGH
            .iter()
            .find(|(_, c)| *c == ch)
            .map(|(code, _)| *code),
    }
}

fn winansi_char(code: u8) -> Option<char> {
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as char),
        _ => WINANSI_HIGH
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, ch)| *ch),
    }
}

#[derive(Debug)]
pub(crate) struct FontMetrics {
    pub(crate) widths: Vec<u16>,
    pub(crate) missing_width: u16,
    pub(crate) ascent: i16,
    pub(crate) descent: i16,
    pub(crate) cap_height: i16,
    pub(crate) italic_angle: i16,
    pub(crate) bbox: (i16, i16, i16, i16),
    pub(crate) is_fixed_pitch: bool,
}

impl FontMetrics {
    fn builtin(widths: &[u16; WIDTH_SLOTS], bbox: (i16, i16, i16, i16)) -> Self {
        Self {
            widths: widths.to_vec(),
            missing_width: widths[0],
            ascent: 718,
            descent: -207,
            cap_height: 718,
            italic_angle: 0,
            bbox,
            is_fixed_pitch: false,
        }
    }

    fn from_face(face: &ttf_parser::Face<'_>) -> Self {
        let units_per_em = face.units_per_em().max(1);
        let scale = 1000.0 / units_per_em as f32;
        let mut widths = Vec::with_capacity(WIDTH_SLOTS);
        for code in FIRST_CHAR..=LAST_CHAR {
            let advance = winansi_char(code)
                .and_then(|ch| face.glyph_index(ch))
                .and_then(|id| face.glyph_hor_advance(id))
                .unwrap_or(0);
            let scaled = (advance as f32 * scale).round() as i32;
            widths.push(scaled.clamp(0, u16::MAX as i32) as u16);
        }
        let missing_width = widths.first().copied().unwrap_or(0);
        let ascent = scale_i16(face.ascender(), scale);
        let bbox = face.global_bounding_box();
        Self {
            widths,
            missing_width,
            ascent,
            descent: scale_i16(face.descender(), scale),
            cap_height: face
                .capital_height()
                .map(|value| scale_i16(value, scale))
                .unwrap_or(ascent),
            italic_angle: face
                .italic_angle()
                .map(|value| value.round() as i16)
                .unwrap_or(0),
            bbox: (
                scale_i16(bbox.x_min, scale),
                scale_i16(bbox.y_min, scale),
                scale_i16(bbox.x_max, scale),
                scale_i16(bbox.y_max, scale),
            ),
            is_fixed_pitch: face.is_monospaced(),
        }
    }

    fn advance_for_char(&self, ch: char) -> u16 {
        // Unencodable characters are emitted as '?', so they measure as '?'.
        let code = winansi_code(ch).unwrap_or(b'?');
        self.widths
            .get((code - FIRST_CHAR) as usize)
            .copied()
            .unwrap_or(self.missing_width)
    }

    fn measure_text_width(&self, font_size: Pt, text: &str) -> Pt {
        let total_units = text.chars().fold(0i32, |acc, ch| {
            acc.saturating_add(self.advance_for_char(ch) as i32)
        });
        if total_units <= 0 {
            return Pt::ZERO;
        }
        font_size.mul_ratio(total_units, 1000)
    }
}

#[derive(Debug)]
pub(crate) struct RegisteredFont {
    pub(crate) name: String,
    pub(crate) data: Vec<u8>,
    pub(crate) metrics: FontMetrics,
}

#[derive(Debug)]
pub(crate) struct FontRegistry {
    builtin: HashMap<String, FontMetrics>,
    fonts: Vec<RegisteredFont>,
    lookup: HashMap<String, usize>,
}

impl FontRegistry {
    pub(crate) fn new() -> Self {
        let mut builtin = HashMap::new();
        builtin.insert(
            normalize_name(HELVETICA),
            FontMetrics::builtin(&HELVETICA_WIDTHS, (-166, -225, 1000, 931)),
        );
        builtin.insert(
            normalize_name(HELVETICA_BOLD),
            FontMetrics::builtin(&HELVETICA_BOLD_WIDTHS, (-170, -228, 1003, 962)),
        );
        Self {
            builtin,
            fonts: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    pub(crate) fn register_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let Ok(entries) = fs::read_dir(path) else {
            tracing::warn!(dir = %path.display(), "font directory is not readable");
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let is_font = path
                .extension()
                .and_then(|v| v.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("ttf"))
                .unwrap_or(false);
            if !path.is_file() || !is_font {
                continue;
            }
            if let Err(err) = self.register_file(&path) {
                tracing::warn!(file = %path.display(), error = %err, "skipping font file");
            }
        }
    }

    pub(crate) fn register_file(&mut self, path: impl AsRef<Path>) -> Result<String, ReportError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|err| {
            ReportError::Font(format!("cannot read {}: {}", path.display(), err))
        })?;
        let stem = path.file_stem().and_then(|v| v.to_str());
        self.register_bytes(data, stem)
    }

    pub(crate) fn register_bytes(
        &mut self,
        data: Vec<u8>,
        source_name: Option<&str>,
    ) -> Result<String, ReportError> {
        let source = source_name.unwrap_or("EmbeddedFont");
        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|err| ReportError::Font(format!("invalid font data for {source}: {err}")))?;
        if face.tables().cff.is_some() {
            return Err(ReportError::Font(format!(
                "{source} is an OpenType CFF face; only TrueType outlines can be embedded"
            )));
        }

        let (name, aliases) = font_names(&face, source);
        let metrics = FontMetrics::from_face(&face);
        drop(face);

        let index = self.fonts.len();
        self.fonts.push(RegisteredFont {
            name: name.clone(),
            data,
            metrics,
        });
        for alias in std::iter::once(name.clone()).chain(aliases) {
            let key = normalize_name(&alias);
            if key.is_empty() || self.lookup.contains_key(&key) {
                continue;
            }
            self.lookup.insert(key, index);
        }
        tracing::debug!(font = %name, "registered font");
        Ok(name)
    }

    pub(crate) fn resolve(&self, name: &str) -> Option<&RegisteredFont> {
        self.lookup
            .get(&normalize_name(name))
            .and_then(|index| self.fonts.get(*index))
    }

    // Spelling `name` resolves to: the registered face name, or the exact
    // base-14 name the PDF writer must emit.
    pub(crate) fn canonical_name(&self, name: &str) -> Option<String> {
        if let Some(font) = self.resolve(name) {
            return Some(font.name.clone());
        }
        let key = normalize_name(name);
        [HELVETICA, HELVETICA_BOLD]
            .into_iter()
            .find(|builtin| normalize_name(builtin) == key)
            .map(str::to_string)
    }

    fn metrics(&self, name: &str) -> Option<&FontMetrics> {
        if let Some(font) = self.resolve(name) {
            return Some(&font.metrics);
        }
        self.builtin.get(&normalize_name(name))
    }

    pub(crate) fn measure_text_width(&self, name: &str, font_size: Pt, text: &str) -> Pt {
        match self.metrics(name) {
            Some(metrics) => metrics.measure_text_width(font_size, text),
            None => {
                let char_width = (font_size * 0.6).max(Pt::from_f32(1.0));
                char_width * (text.chars().count() as i32)
            }
        }
    }
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn scale_i16(value: i16, scale: f32) -> i16 {
    let scaled = (value as f32 * scale).round() as i32;
    scaled.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

fn font_names(face: &ttf_parser::Face<'_>, source: &str) -> (String, Vec<String>) {
    use ttf_parser::name::name_id;

    let mut family = None;
    let mut full = None;
    let mut post = None;
    for entry in face.names() {
        let Some(name) = entry.to_string() else {
            continue;
        };
        let slot = match entry.name_id {
            name_id::TYPOGRAPHIC_FAMILY | name_id::FAMILY => &mut family,
            name_id::FULL_NAME => &mut full,
            name_id::POST_SCRIPT_NAME => &mut post,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(name);
        }
    }

    let stem = Some(source.to_string());
    let primary = post
        .clone()
        .or_else(|| full.clone())
        .or_else(|| family.clone())
        .or_else(|| stem.clone())
        .unwrap_or_else(|| "EmbeddedFont".to_string());
    let aliases = [family, full, post, stem]
        .into_iter()
        .flatten()
        .filter(|candidate| *candidate != primary)
        .collect();
    (primary, aliases)
}

fn normalize_name(name: &str) -> String {
    name.trim()
        .trim_matches('"')
        .trim_matches('\'')
        .to_ascii_lowercase()
}
