use pdf_writer::{Content, Name, Str};

use crate::fonts::{FontEntry, to_winansi_bytes};

// Page geometry. Layout arithmetic is specified in millimetres (matching the
// paper form the report reproduces) and converted to PDF points through MM;
// font sizes are already in points.
pub(crate) const MM: f32 = 72.0 / 25.4;
pub(crate) const PAGE_WIDTH: f32 = 210.0 * MM;
pub(crate) const PAGE_HEIGHT: f32 = 297.0 * MM;
pub(crate) const MARGIN: f32 = 10.0 * MM;
pub(crate) const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

/// Base row pitch for key/value listings.
pub(crate) const ROW_H: f32 = 5.0 * MM;

/// Layout cursor for one render call: owns the finished pages, the
/// in-progress content stream, and the current vertical position (PDF
/// coordinates, so `y` decreases as content is placed). Discarded when the
/// render completes.
pub(super) struct PageCursor {
    done: Vec<Content>,
    current: Content,
    y: f32,
}

impl PageCursor {
    pub(super) fn new() -> Self {
        Self {
            done: Vec::new(),
            current: Content::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    pub(super) fn y(&self) -> f32 {
        self.y
    }

    pub(super) fn content(&mut self) -> &mut Content {
        &mut self.current
    }

    pub(super) fn advance(&mut self, dy: f32) {
        self.y -= dy;
    }

    fn at_page_top(&self) -> bool {
        (self.y - (PAGE_HEIGHT - MARGIN)).abs() < 1.0
    }

    pub(super) fn break_page(&mut self) {
        self.done
            .push(std::mem::replace(&mut self.current, Content::new()));
        self.y = PAGE_HEIGHT - MARGIN;
    }

    /// Break the page if `needed` points would cross the bottom margin.
    /// No-op at the top of a fresh page, so a block taller than a whole page
    /// is still placed instead of looping.
    pub(super) fn ensure_room(&mut self, needed: f32) {
        if !self.at_page_top() && self.y - needed < MARGIN {
            self.break_page();
        }
    }

    pub(super) fn finish(mut self) -> Vec<Content> {
        self.done.push(self.current);
        self.done
    }
}

pub(super) fn draw_text(
    content: &mut Content,
    font: &FontEntry,
    size: f32,
    x: f32,
    y: f32,
    text: &str,
) {
    let bytes = to_winansi_bytes(text);
    content
        .begin_text()
        .set_font(Name(font.pdf_name.as_bytes()), size)
        .next_line(x, y)
        .show(Str(&bytes))
        .end_text();
}

pub(super) fn draw_text_centered(
    content: &mut Content,
    font: &FontEntry,
    size: f32,
    center_x: f32,
    y: f32,
    text: &str,
) {
    let w = font.text_width(text, size);
    draw_text(content, font, size, center_x - w / 2.0, y, text);
}

pub(super) fn draw_text_right(
    content: &mut Content,
    font: &FontEntry,
    size: f32,
    right_x: f32,
    y: f32,
    text: &str,
) {
    let w = font.text_width(text, size);
    draw_text(content, font, size, right_x - w, y, text);
}

/// Measured word-wrap: greedy fill against the font's width table, never a
/// character count. Hard line breaks are preserved (blank input lines come
/// through as empty output lines, keeping paragraph gaps). A single word
/// wider than `max_width` gets a line of its own rather than being split.
pub(super) fn wrap_text(text: &str, font: &FontEntry, size: f32, max_width: f32) -> Vec<String> {
    let space_w = font.space_width(size);
    let mut lines = Vec::new();
    for hard_line in text.lines() {
        let mut line = String::new();
        let mut line_w = 0.0f32;
        for word in hard_line.split_whitespace() {
            let word_w = font.text_width(word, size);
            if line.is_empty() {
                line.push_str(word);
                line_w = word_w;
            } else if line_w + space_w + word_w > max_width {
                lines.push(std::mem::take(&mut line));
                line.push_str(word);
                line_w = word_w;
            } else {
                line.push(' ');
                line.push_str(word);
                line_w += space_w + word_w;
            }
        }
        lines.push(line);
    }
    lines
}

/// Enforce the photo-caption character budget: captions over budget keep
/// `max_chars - 3` characters plus a trailing `...`; captions at or under
/// budget pass through unmodified.
pub(super) fn truncate_caption(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
