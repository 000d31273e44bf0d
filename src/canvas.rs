use crate::types::{Color, Pt, Rect, Size};

const KAPPA: f32 = 0.552_284_8;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // Non-rendered metadata used for page-aware reporting. Ignored by the PDF writer.
    Meta {
        key: String,
        value: String,
    },
    SetFillColor(Color),
    SetStrokeColor(Color),
    SetLineWidth(Pt),
    SetFontName(String),
    SetFontSize(Pt),
    MoveTo {
        x: Pt,
        y: Pt,
    },
    LineTo {
        x: Pt,
        y: Pt,
    },
    CurveTo {
        x1: Pt,
        y1: Pt,
        x2: Pt,
        y2: Pt,
        x: Pt,
        y: Pt,
    },
    // Appends a rectangle to the current path without painting it.
    RectPath {
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
    },
    ClosePath,
    Stroke,
    FillStroke,
    // `y` is the top of the text line; the writer places the baseline.
    DrawString {
        x: Pt,
        y: Pt,
        text: String,
    },
    // Filled rectangle in the current fill colour.
    DrawRect {
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub commands: Vec<Command>,
}

impl Page {
    fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    pub fn meta_values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.commands.iter().filter_map(move |cmd| match cmd {
            Command::Meta { key: k, value } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn strings(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|cmd| match cmd {
            Command::DrawString { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub page_size: Size,
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone)]
struct GraphicsState {
    fill_color: Color,
    stroke_color: Color,
    line_width: Pt,
    font_size: Pt,
    font_name: String,
}

impl GraphicsState {
    fn initial() -> Self {
        Self {
            fill_color: Color::BLACK,
            stroke_color: Color::BLACK,
            line_width: Pt::from_f32(1.0),
            font_size: Pt::from_f32(12.0),
            font_name: "Helvetica".to_string(),
        }
    }
}

pub struct Canvas {
    page_size: Size,
    pages: Vec<Page>,
    current: Page,
    current_state: GraphicsState,
}

impl Canvas {
    pub fn new(page_size: Size) -> Self {
        Self {
            page_size,
            pages: Vec::new(),
            current: Page::new(),
            current_state: GraphicsState::initial(),
        }
    }

    pub fn meta(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.current.commands.push(Command::Meta {
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn set_fill_color(&mut self, color: Color) {
        if self.current_state.fill_color == color {
            return;
        }
        self.current_state.fill_color = color;
        self.current.commands.push(Command::SetFillColor(color));
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        if self.current_state.stroke_color == color {
            return;
        }
        self.current_state.stroke_color = color;
        self.current.commands.push(Command::SetStrokeColor(color));
    }

    pub fn set_line_width(&mut self, width: Pt) {
        let width = width.max(Pt::ZERO);
        if self.current_state.line_width == width {
            return;
        }
        self.current_state.line_width = width;
        self.current.commands.push(Command::SetLineWidth(width));
    }

    pub fn set_font(&mut self, name: &str, size: Pt) {
        if self.current_state.font_name != name {
            self.current_state.font_name = name.to_string();
            self.current
                .commands
                .push(Command::SetFontName(self.current_state.font_name.clone()));
        }
        if self.current_state.font_size != size {
            self.current_state.font_size = size;
            self.current.commands.push(Command::SetFontSize(size));
        }
    }

    pub fn move_to(&mut self, x: Pt, y: Pt) {
        self.current.commands.push(Command::MoveTo { x, y });
    }

    pub fn line_to(&mut self, x: Pt, y: Pt) {
        self.current.commands.push(Command::LineTo { x, y });
    }

    pub fn curve_to(&mut self, x1: Pt, y1: Pt, x2: Pt, y2: Pt, x: Pt, y: Pt) {
        self.current.commands.push(Command::CurveTo {
            x1,
            y1,
            x2,
            y2,
            x,
            y,
        });
    }

    pub fn rect_path(&mut self, rect: Rect) {
        self.current.commands.push(Command::RectPath {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        });
    }

    // Radius is clamped to half the shorter side.
    pub fn rounded_rect_path(&mut self, rect: Rect, radius: Pt) {
        let radius = radius
            .min(rect.width / 2)
            .min(rect.height / 2)
            .max(Pt::ZERO);
        let c = radius * (1.0 - KAPPA);
        let (left, top, right, bottom) = (rect.x, rect.y, rect.right(), rect.bottom());

        self.move_to(left + radius, top);
        self.line_to(right - radius, top);
        self.curve_to(right - c, top, right, top + c, right, top + radius);
        self.line_to(right, bottom - radius);
        self.curve_to(right, bottom - c, right - c, bottom, right - radius, bottom);
        self.line_to(left + radius, bottom);
        self.curve_to(left + c, bottom, left, bottom - c, left, bottom - radius);
        self.line_to(left, top + radius);
        self.curve_to(left, top + c, left + c, top, left + radius, top);
        self.close_path();
    }

    pub fn close_path(&mut self) {
        self.current.commands.push(Command::ClosePath);
    }

    pub fn stroke(&mut self) {
        self.current.commands.push(Command::Stroke);
    }

    pub fn fill_stroke(&mut self) {
        self.current.commands.push(Command::FillStroke);
    }

    pub fn draw_string(&mut self, x: Pt, y: Pt, text: impl Into<String>) {
        self.current.commands.push(Command::DrawString {
            x,
            y,
            text: text.into(),
        });
    }

    pub fn draw_rect(&mut self, rect: Rect) {
        self.current.commands.push(Command::DrawRect {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        });
    }

    pub fn show_page(&mut self) {
        let current = std::mem::replace(&mut self.current, Page::new());
        self.pages.push(current);
        self.current_state = GraphicsState::initial();
    }

    pub fn current_command_count(&self) -> usize {
        self.current.commands.len()
    }

    pub fn finish(mut self) -> Document {
        if !self.current.commands.is_empty() || self.pages.is_empty() {
            self.show_page();
        }
        Document {
            page_size: self.page_size,
            pages: self.pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redundant_state_changes_are_dropped() {
        let mut canvas = Canvas::new(Size::a4());
        canvas.set_fill_color(Color::WHITE);
        canvas.set_fill_color(Color::WHITE);
        canvas.set_font("Helvetica", Pt::from_i32(12));
        canvas.set_font("Helvetica-Bold", Pt::from_i32(12));
        let doc = canvas.finish();
        assert_eq!(
            doc.pages[0].commands,
            vec![
                Command::SetFillColor(Color::WHITE),
                Command::SetFontName("Helvetica-Bold".to_string()),
            ]
        );
    }

    #[test]
    fn show_page_resets_graphics_state() {
        let mut canvas = Canvas::new(Size::a4());
        canvas.set_fill_color(Color::WHITE);
        canvas.show_page();
        canvas.set_fill_color(Color::WHITE);
        let doc = canvas.finish();
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.pages[1].commands.len(), 1);
    }

    #[test]
    fn rounded_rect_is_a_closed_path() {
        let mut canvas = Canvas::new(Size::a4());
        let rect = Rect::new(
            Pt::from_i32(10),
            Pt::from_i32(10),
            Pt::from_i32(100),
            Pt::from_i32(40),
        );
        canvas.rounded_rect_path(rect, Pt::from_i32(8));
        let doc = canvas.finish();
        let cmds = &doc.pages[0].commands;
        assert_eq!(
            cmds.first(),
            Some(&Command::MoveTo {
                x: Pt::from_i32(18),
                y: Pt::from_i32(10)
            })
        );
        assert_eq!(cmds.last(), Some(&Command::ClosePath));
        let curves = cmds
            .iter()
            .filter(|c| matches!(c, Command::CurveTo { .. }))
            .count();
        assert_eq!(curves, 4);
    }
}
