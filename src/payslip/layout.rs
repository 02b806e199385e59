use crate::fonts::FontFace;
use crate::model::{Alignment, DrawOp, Document, Stroke, TextColor, TextRun};

/// Running vertical cursor threaded through the section fold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Pen {
    pub(crate) y: f32,
}

impl Pen {
    pub(crate) fn at(y: f32) -> Self {
        Pen { y }
    }

    #[must_use]
    pub(crate) fn advance(self, dy: f32) -> Self {
        Pen { y: self.y + dy }
    }
}

/// Break `text` into lines no wider than `max_width`.
///
/// Words are packed greedily with one space between them; a word that is wider
/// than the whole box is split between characters. Explicit newlines start a
/// new line. Blank text produces no lines.
pub fn wrap_text(face: &FontFace, text: &str, font_size: f32, max_width: f32) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let space_w = face.space_width(font_size);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_w = 0.0f32;

        for word in paragraph.split_whitespace() {
            let ww = face.text_width(word, font_size);
            let proposed = if current.is_empty() {
                ww
            } else {
                current_w + space_w + ww
            };
            if proposed <= max_width {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
                current_w = proposed;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_w = 0.0;
            }
            if ww <= max_width {
                current.push_str(word);
                current_w = ww;
                continue;
            }

            // Word alone overflows the box: hard-break it.
            for ch in word.chars() {
                let cw = face.text_width(ch.encode_utf8(&mut [0; 4]), font_size);
                if !current.is_empty() && current_w + cw > max_width {
                    lines.push(std::mem::take(&mut current));
                    current_w = 0.0;
                }
                current.push(ch);
                current_w += cw;
            }
        }
        lines.push(current);
    }

    // Trailing newlines do not add height
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Height of `text` wrapped at `width`: line count times the face's line height.
pub fn text_height(face: &FontFace, text: &str, font_size: f32, width: f32) -> f32 {
    wrap_text(face, text, font_size, width).len() as f32 * face.line_height(font_size)
}

/// Height of a two-column row: the taller of the two wrapped texts, never below `floor`.
pub fn row_height(
    face: &FontFace,
    font_size: f32,
    width: f32,
    left: &str,
    right: &str,
    floor: f32,
) -> f32 {
    text_height(face, left, font_size, width)
        .max(text_height(face, right, font_size, width))
        .max(floor)
}

/// Collects draw operations for one page, measuring text with a single face.
pub(crate) struct Canvas<'a> {
    face: &'a FontFace,
    ops: Vec<DrawOp>,
}

impl<'a> Canvas<'a> {
    pub(crate) fn new(face: &'a FontFace) -> Self {
        Canvas {
            face,
            ops: Vec::new(),
        }
    }

    pub(crate) fn face(&self) -> &'a FontFace {
        self.face
    }

    pub(crate) fn text_height(&self, text: &str, font_size: f32, width: f32) -> f32 {
        text_height(self.face, text, font_size, width)
    }

    /// Draw wrapped text with its first line box at `(x, y)`. Returns the height used.
    pub(crate) fn text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        width: f32,
        align: Alignment,
        font_size: f32,
        color: TextColor,
    ) -> f32 {
        let line_h = self.face.line_height(font_size);
        let lines = wrap_text(self.face, text, font_size, width);
        let n = lines.len();
        for (i, line) in lines.into_iter().enumerate() {
            self.ops.push(DrawOp::Text(TextRun {
                text: line,
                x,
                y: y + i as f32 * line_h,
                width,
                align,
                font_size,
                color,
            }));
        }
        n as f32 * line_h
    }

    pub(crate) fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, stroke: Stroke) {
        self.ops.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
            stroke,
        });
    }

    pub(crate) fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, stroke: Stroke) {
        self.ops.push(DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
        });
    }

    pub(crate) fn finish(self, page_width: f32, page_height: f32) -> Document {
        Document {
            page_width,
            page_height,
            ops: self.ops,
        }
    }
}
