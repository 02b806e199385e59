use crate::model::{Alignment, TextColor};

use super::layout::Canvas;

/// One side of a two-column row: a label and, for money rows, an amount cell.
pub(super) struct RowSide {
    pub(super) label: String,
    pub(super) amount: Option<String>,
}

impl RowSide {
    pub(super) fn text(label: String) -> Self {
        RowSide {
            label,
            amount: None,
        }
    }
}

/// Horizontal placement of one column.
pub(super) struct ColumnSpec {
    pub(super) x: f32,
    pub(super) label_width: f32,
    /// Right edge of the amount cell, when the column has one.
    pub(super) amount_right: Option<f32>,
    pub(super) amount_width: f32,
}

pub(super) struct RowStyle {
    pub(super) font_size: f32,
    pub(super) padding: f32,
    pub(super) min_height: f32,
    /// Distance from the row top to the text top.
    pub(super) text_offset: f32,
}

/// Lay out rows of paired cells starting at `start_y`.
///
/// Each row is as tall as its taller wrapped label (at least
/// `style.min_height`), followed by `style.padding`. A missing side leaves its
/// half blank without shortening the other. Returns the row boundaries,
/// beginning with `start_y` and ending with the y below the last row.
pub(super) fn layout_rows(
    canvas: &mut Canvas,
    columns: &[ColumnSpec; 2],
    rows: Vec<[Option<RowSide>; 2]>,
    style: &RowStyle,
    start_y: f32,
) -> Vec<f32> {
    let mut y = start_y;
    let mut boundaries = Vec::with_capacity(rows.len() + 1);
    boundaries.push(y);

    for (ri, row) in rows.iter().enumerate() {
        let label = |i: usize| row[i].as_ref().map_or("", |s| s.label.as_str());
        let row_h = super::layout::row_height(
            canvas.face(),
            style.font_size,
            columns[0].label_width,
            label(0),
            label(1),
            style.min_height,
        );

        let text_y = y + style.text_offset;
        for (side, col) in row.iter().zip(columns) {
            let Some(side) = side else {
                continue;
            };
            canvas.text(
                &side.label,
                col.x,
                text_y,
                col.label_width,
                Alignment::Left,
                style.font_size,
                TextColor::Black,
            );
            if let (Some(amount), Some(right)) = (&side.amount, col.amount_right) {
                canvas.text(
                    amount,
                    right - col.amount_width,
                    text_y,
                    col.amount_width,
                    Alignment::Right,
                    style.font_size,
                    TextColor::Black,
                );
            }
        }

        log::debug!("row={ri} top={y:.2} height={row_h:.2}");
        y += row_h + style.padding;
        boundaries.push(y);
    }
    boundaries
}
