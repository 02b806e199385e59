mod batch;
mod config;
mod error;
mod fonts;
mod format;
mod model;
mod payslip;
mod pdf;
mod xlsx;

pub use batch::{BatchOptions, RenderedSlip, render_batch, write_archive};
pub use config::{Config, DEFAULT_ARCHIVE_NAME, DEFAULT_FONT_FAMILY, DEFAULT_FONT_PATH};
pub use error::{Error, Result};
pub use fonts::FontFace;
pub use format::{CURRENCY_SYMBOL, display_field, format_currency, format_serial_date};
pub use model::{
    Alignment, CompanyInfo, DrawOp, Document, EmployeeRecord, Stroke, TextColor, TextRun, Value,
    Workbook,
};
pub use payslip::{
    FINANCIAL_MIN_ROW_HEIGHT, FOOTER_TEXT, IDENTITY_FIELD, NET_PAYABLE_FIELD, PAGE_HEIGHT,
    PAGE_WIDTH, deduction_labels, earnings_labels, identity, render, row_height, text_height,
    wrap_text,
};
pub use pdf::encode_pdf;
pub use xlsx::{read_workbook, read_workbook_bytes};

use std::path::Path;
use std::time::Instant;

/// What a finished batch produced.
#[derive(Clone, Debug)]
pub struct BatchSummary {
    pub documents: usize,
    pub archive_bytes: u64,
    pub font: String,
}

fn run(workbook: Workbook, output: &Path, config: &Config, t0: Instant) -> Result<BatchSummary> {
    let t_parse = t0.elapsed();

    let face = FontFace::resolve(config);
    let t_font = t0.elapsed();

    let options = BatchOptions {
        max_concurrency: config.max_concurrency,
    };
    let slips = render_batch(&workbook.company, &workbook.employees, &face, &options)?;
    let t_render = t0.elapsed();

    write_archive(&slips, output)?;
    let t_total = t0.elapsed();
    let archive_bytes = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);

    log::info!(
        "Timing: parse={:.1}ms, font={:.1}ms, render={:.1}ms, archive={:.1}ms, total={:.1}ms ({} slips, {} bytes)",
        t_parse.as_secs_f64() * 1000.0,
        (t_font - t_parse).as_secs_f64() * 1000.0,
        (t_render - t_font).as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        slips.len(),
        archive_bytes,
    );

    Ok(BatchSummary {
        documents: slips.len(),
        archive_bytes,
        font: face.name().to_string(),
    })
}

/// Read a payroll workbook and write one PDF payslip per employee into a ZIP at `output`.
///
/// Nothing is written when any employee's payslip fails to render.
pub fn generate_payslips(input: &Path, output: &Path, config: &Config) -> Result<BatchSummary> {
    let t0 = Instant::now();
    let workbook = read_workbook(input)?;
    run(workbook, output, config, t0)
}

pub fn generate_payslips_from_bytes(
    input: &[u8],
    output: &Path,
    config: &Config,
) -> Result<BatchSummary> {
    let t0 = Instant::now();
    let workbook = read_workbook_bytes(input)?;
    run(workbook, output, config, t0)
}
