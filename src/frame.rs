use crate::layout::PageGeometry;
use crate::types::Pt;

// bottom_limit is the lowest y a row may reach; below it is the footer zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageCursor {
    pub y: Pt,
    pub page_number: u32,
    pub continuation: bool,
    pub bottom_limit: Pt,
}

impl PageCursor {
    pub fn first_page(geometry: &PageGeometry) -> Self {
        Self {
            y: geometry.margins.top,
            page_number: 1,
            continuation: false,
            bottom_limit: geometry.max_content_y(),
        }
    }

    pub fn would_overflow(&self, height: Pt) -> bool {
        self.y + height > self.bottom_limit
    }

    pub fn advance(&mut self, height: Pt) {
        self.y += height;
    }

    pub fn move_to(&mut self, y: Pt) {
        self.y = y;
    }

    pub fn next_page(&mut self, top: Pt) {
        self.page_number += 1;
        self.continuation = true;
        self.y = top;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ReportLayout;

    #[test]
    fn row_touching_the_limit_still_fits() {
        let geometry = ReportLayout::standard().geometry();
        let mut cursor = PageCursor::first_page(&geometry);
        let row = Pt::from_i32(18);
        cursor.move_to(geometry.max_content_y() - row);
        assert!(!cursor.would_overflow(row));
        cursor.advance(Pt::from_milli_i64(1));
        assert!(cursor.would_overflow(row));
    }

    #[test]
    fn next_page_resets_position_and_counts() {
        let geometry = ReportLayout::standard().geometry();
        let mut cursor = PageCursor::first_page(&geometry);
        assert_eq!(cursor.page_number, 1);
        assert!(!cursor.continuation);
        cursor.advance(Pt::from_i32(500));
        cursor.next_page(Pt::from_i32(92));
        assert_eq!(cursor.page_number, 2);
        assert!(cursor.continuation);
        assert_eq!(cursor.y, Pt::from_i32(92));
        assert_eq!(cursor.bottom_limit, geometry.max_content_y());
    }
}
