mod layout;
mod table;

use crate::error::Error;
use crate::fonts::FontFace;
use crate::format::{display_field, format_currency, format_serial_date};
use crate::model::{Alignment, CompanyInfo, Document, EmployeeRecord, Stroke, TextColor};

pub use layout::{row_height, text_height, wrap_text};

use layout::{Canvas, Pen};
use table::{ColumnSpec, RowSide, RowStyle, layout_rows};

// A4 in points
pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 30.0;

const BORDER_X: f32 = 20.0;
const BORDER_Y: f32 = 20.0;
const BORDER_WIDTH: f32 = 555.0;
const BORDER_HEIGHT: f32 = 800.0;

// Detail grid, financial table and net-pay box share the border's span
const BOX_X: f32 = 20.0;
const BOX_WIDTH: f32 = 555.0;
const SPLIT_X: f32 = BOX_X + BOX_WIDTH / 2.0;
const CELL_INSET: f32 = 5.0;
const ROW_PADDING: f32 = 4.0;
const SECTION_GAP: f32 = 10.0;

const DETAIL_FONT_SIZE: f32 = 8.0;
const DETAIL_COL_WIDTH: f32 = BOX_WIDTH / 2.0 - 10.0;

const TABLE_FONT_SIZE: f32 = 9.0;
const TABLE_LABEL_WIDTH: f32 = BOX_WIDTH / 2.0 - 95.0;
const TABLE_AMOUNT_WIDTH: f32 = 80.0;
pub const FINANCIAL_MIN_ROW_HEIGHT: f32 = 12.0;

const NET_PAY_BOX_HEIGHT: f32 = 25.0;
const NET_PAY_FONT_SIZE: f32 = 10.0;

const FOOTER_Y: f32 = 800.0;
const FOOTER_FONT_SIZE: f32 = 8.0;
pub const FOOTER_TEXT: &str =
    "This is a software-generated document and does not require signature.";

/// Field that names each employee's document in the archive.
pub const IDENTITY_FIELD: &str = "Casper Id";
pub const NET_PAYABLE_FIELD: &str = "Net Payable";

#[derive(Clone, Copy)]
enum DetailKind {
    Plain,
    Date,
}

/// (label, column, how the value is shown)
const LEFT_DETAILS: [(&str, &str, DetailKind); 7] = [
    ("Casper ID", IDENTITY_FIELD, DetailKind::Plain),
    ("Employee ID", "Employee Id", DetailKind::Plain),
    ("Employee Name", "Employee Name", DetailKind::Plain),
    ("Father Name", "Father Name", DetailKind::Plain),
    ("ESIC Number", "ESIC Number", DetailKind::Plain),
    ("UAN Number", "UAN Number", DetailKind::Plain),
    ("Work Place", "Work Place", DetailKind::Plain),
];

const RIGHT_DETAILS: [(&str, &str, DetailKind); 10] = [
    ("Date Of Birth", "Date Of Birth", DetailKind::Date),
    ("Designation", "Designation", DetailKind::Plain),
    ("Date of Joining", "Date of Joining", DetailKind::Date),
    ("Bank Name", "Bank Name", DetailKind::Plain),
    ("Account Number", "Account Number", DetailKind::Plain),
    ("IFSC Code", "IFSC code", DetailKind::Plain),
    ("Total Days in Month", "Total Days in Month", DetailKind::Plain),
    ("Pay Days", "Pay Days", DetailKind::Plain),
    ("Over Time (H)", "Over Time (H)", DetailKind::Plain),
    ("Arrear Days", "Arrear Days", DetailKind::Plain),
];

/// A money row: its label and the columns it may be read from, in priority order.
struct LineItem {
    label: &'static str,
    columns: &'static [&'static str],
}

const EARNINGS: [LineItem; 7] = [
    LineItem {
        label: "Basic",
        columns: &["Basic"],
    },
    LineItem {
        label: "Leave Encashment",
        columns: &["Leave Encashment"],
    },
    LineItem {
        label: "Additional Bonus",
        columns: &["Additional Bonus"],
    },
    LineItem {
        label: "Over Time",
        columns: &["Over Time"],
    },
    LineItem {
        label: "Shift Allowance",
        columns: &["Shift Allowance"],
    },
    LineItem {
        label: "Total Others",
        columns: &["Total Others", "OTotal Others"],
    },
    LineItem {
        label: "Gross",
        columns: &["Gross"],
    },
];

const DEDUCTIONS: [LineItem; 5] = [
    LineItem {
        label: "PF",
        columns: &["PF"],
    },
    LineItem {
        label: "ESIC",
        columns: &["ESIC"],
    },
    LineItem {
        label: "LWF",
        columns: &["LWF"],
    },
    LineItem {
        label: "Advance Amount",
        columns: &["Advance Amount"],
    },
    LineItem {
        label: "Total Deduction",
        columns: &["Total Deduction"],
    },
];

pub fn earnings_labels() -> impl Iterator<Item = &'static str> {
    EARNINGS.iter().map(|item| item.label)
}

pub fn deduction_labels() -> impl Iterator<Item = &'static str> {
    DEDUCTIONS.iter().map(|item| item.label)
}

/// The record's identity, or `None` when it is absent or blank.
pub fn identity(record: &EmployeeRecord) -> Option<String> {
    let id = display_field(record.get(IDENTITY_FIELD));
    let id = id.trim();
    (!id.is_empty()).then(|| id.to_string())
}

struct SlipContext<'a> {
    company: &'a CompanyInfo,
    record: &'a EmployeeRecord,
}

/// Flow sections, laid out top to bottom.
#[derive(Clone, Copy, Debug)]
enum Section {
    Header,
    Details,
    Financials,
    NetPayable,
}

const FLOW: [Section; 4] = [
    Section::Header,
    Section::Details,
    Section::Financials,
    Section::NetPayable,
];

impl Section {
    fn layout(self, ctx: &SlipContext, canvas: &mut Canvas, pen: Pen) -> Pen {
        let next = match self {
            Section::Header => header(ctx.company, canvas, pen),
            Section::Details => detail_grid(ctx.record, canvas, pen),
            Section::Financials => financial_table(ctx.record, canvas, pen),
            Section::NetPayable => net_payable(ctx.record, canvas, pen),
        };
        log::debug!("{self:?}: y {:.2} -> {:.2}", pen.y, next.y);
        next
    }
}

/// Lay out one employee's payslip.
///
/// The result depends only on the arguments: rendering the same record twice
/// yields identical geometry.
pub fn render(
    company: &CompanyInfo,
    record: &EmployeeRecord,
    face: &FontFace,
) -> Result<Document, Error> {
    if identity(record).is_none() {
        return Err(Error::MissingField {
            row: record.row,
            field: IDENTITY_FIELD,
        });
    }

    let mut canvas = Canvas::new(face);
    canvas.rect(BORDER_X, BORDER_Y, BORDER_WIDTH, BORDER_HEIGHT, Stroke::Regular);

    let ctx = SlipContext { company, record };
    let end = FLOW
        .iter()
        .fold(Pen::at(MARGIN), |pen, section| section.layout(&ctx, &mut canvas, pen));
    if end.y > FOOTER_Y {
        log::debug!("content ends at {:.2}, below the footer line", end.y);
    }

    footer(&mut canvas);
    Ok(canvas.finish(PAGE_WIDTH, PAGE_HEIGHT))
}

fn header(company: &CompanyInfo, canvas: &mut Canvas, pen: Pen) -> Pen {
    let width = PAGE_WIDTH - 2.0 * MARGIN;
    let half_line = canvas.face().line_height(10.0) * 0.5;
    let mut centered = |text: &str, pen: Pen, size: f32| {
        let h = canvas.text(text, MARGIN, pen.y, width, Alignment::Center, size, TextColor::Black);
        pen.advance(h)
    };

    let pen = centered(&company.name, pen, 16.0);
    let pen = centered(&company.address, pen, 10.0);
    let pen = pen.advance(half_line);
    let title = format!("Pay Slip for the Month of {}", company.salary_month);
    let pen = centered(&title, pen, 12.0);
    pen.advance(15.0)
}

fn detail_text(record: &EmployeeRecord, (label, column, kind): (&str, &str, DetailKind)) -> String {
    let value = match kind {
        DetailKind::Plain => display_field(record.get(column)),
        DetailKind::Date => format_serial_date(record.get(column)),
    };
    format!("{label} : {value}")
}

/// Zip two columns into rows, padding the shorter one with blanks.
fn pair_rows(left: Vec<RowSide>, right: Vec<RowSide>) -> Vec<[Option<RowSide>; 2]> {
    let n = left.len().max(right.len());
    let mut left = left.into_iter();
    let mut right = right.into_iter();
    (0..n).map(|_| [left.next(), right.next()]).collect()
}

fn detail_grid(record: &EmployeeRecord, canvas: &mut Canvas, pen: Pen) -> Pen {
    let top = pen.y;
    let columns = [
        ColumnSpec {
            x: BOX_X + CELL_INSET,
            label_width: DETAIL_COL_WIDTH,
            amount_right: None,
            amount_width: 0.0,
        },
        ColumnSpec {
            x: SPLIT_X + CELL_INSET,
            label_width: DETAIL_COL_WIDTH,
            amount_right: None,
            amount_width: 0.0,
        },
    ];
    let style = RowStyle {
        font_size: DETAIL_FONT_SIZE,
        padding: ROW_PADDING,
        min_height: 0.0,
        text_offset: 0.0,
    };
    let side = |d| RowSide::text(detail_text(record, d));
    let rows = pair_rows(
        LEFT_DETAILS.into_iter().map(side).collect(),
        RIGHT_DETAILS.into_iter().map(side).collect(),
    );

    let boundaries = layout_rows(canvas, &columns, rows, &style, top + CELL_INSET);
    let bottom = boundaries.last().copied().unwrap_or(top);

    canvas.rect(BOX_X, top, BOX_WIDTH, bottom - top, Stroke::Regular);
    // Rules sit in the middle of the padding between rows
    if boundaries.len() > 2 {
        for &b in &boundaries[1..boundaries.len() - 1] {
            let y = b - ROW_PADDING / 2.0;
            canvas.line(BOX_X, y, BOX_X + BOX_WIDTH, y, Stroke::Light);
        }
    }
    canvas.line(SPLIT_X, top, SPLIT_X, bottom, Stroke::Light);

    Pen::at(bottom + SECTION_GAP)
}

fn money_side(record: &EmployeeRecord, item: &LineItem) -> RowSide {
    let value = item.columns.iter().find_map(|c| record.get(c));
    RowSide {
        label: item.label.to_string(),
        amount: value.map(|v| format_currency(Some(v))),
    }
}

fn financial_table(record: &EmployeeRecord, canvas: &mut Canvas, pen: Pen) -> Pen {
    let top = pen.y;
    let right_edge = BOX_X + BOX_WIDTH;

    for (heading, x) in [("Earnings", BOX_X), ("Deductions", SPLIT_X)] {
        canvas.text(
            heading,
            x + CELL_INSET,
            top + CELL_INSET,
            TABLE_LABEL_WIDTH,
            Alignment::Left,
            TABLE_FONT_SIZE,
            TextColor::Black,
        );
    }
    let header_h = canvas.text_height("Earnings", TABLE_FONT_SIZE, TABLE_LABEL_WIDTH);
    let rows_top = top + header_h + 2.0 * CELL_INSET;
    // From here down every rule and box uses the light stroke
    canvas.line(BOX_X, rows_top, right_edge, rows_top, Stroke::Light);

    let columns = [
        ColumnSpec {
            x: BOX_X + CELL_INSET,
            label_width: TABLE_LABEL_WIDTH,
            amount_right: Some(SPLIT_X - CELL_INSET),
            amount_width: TABLE_AMOUNT_WIDTH,
        },
        ColumnSpec {
            x: SPLIT_X + CELL_INSET,
            label_width: TABLE_LABEL_WIDTH,
            amount_right: Some(right_edge - CELL_INSET),
            amount_width: TABLE_AMOUNT_WIDTH,
        },
    ];
    let style = RowStyle {
        font_size: TABLE_FONT_SIZE,
        padding: ROW_PADDING,
        min_height: FINANCIAL_MIN_ROW_HEIGHT,
        text_offset: ROW_PADDING,
    };
    let rows = pair_rows(
        EARNINGS.iter().map(|item| money_side(record, item)).collect(),
        DEDUCTIONS.iter().map(|item| money_side(record, item)).collect(),
    );

    let boundaries = layout_rows(canvas, &columns, rows, &style, rows_top);
    for &b in &boundaries[1..] {
        canvas.line(BOX_X, b, right_edge, b, Stroke::Light);
    }
    let bottom = boundaries.last().copied().unwrap_or(rows_top);

    canvas.rect(BOX_X, top, BOX_WIDTH, bottom - top, Stroke::Light);
    canvas.line(SPLIT_X, top, SPLIT_X, bottom, Stroke::Light);

    Pen::at(bottom + SECTION_GAP)
}

fn net_payable(record: &EmployeeRecord, canvas: &mut Canvas, pen: Pen) -> Pen {
    canvas.rect(BOX_X, pen.y, BOX_WIDTH, NET_PAY_BOX_HEIGHT, Stroke::Light);
    let text = format!(
        "Net Payable : {}",
        format_currency(record.get(NET_PAYABLE_FIELD))
    );
    canvas.text(
        &text,
        BOX_X + CELL_INSET,
        pen.y + 7.0,
        BOX_WIDTH - 2.0 * CELL_INSET,
        Alignment::Left,
        NET_PAY_FONT_SIZE,
        TextColor::Black,
    );
    pen.advance(NET_PAY_BOX_HEIGHT + SECTION_GAP)
}

/// Pinned to the page bottom whatever the content above it.
fn footer(canvas: &mut Canvas) {
    canvas.text(
        FOOTER_TEXT,
        BORDER_X,
        FOOTER_Y,
        BORDER_WIDTH,
        Alignment::Center,
        FOOTER_FONT_SIZE,
        TextColor::Muted,
    );
}
