use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use zip::write::SimpleFileOptions;

use crate::error::Error;
use crate::fonts::FontFace;
use crate::model::{CompanyInfo, EmployeeRecord};
use crate::payslip;

#[derive(Clone, Copy, Debug, Default)]
pub struct BatchOptions {
    /// Maximum renders in flight; 0 means one per CPU.
    pub max_concurrency: usize,
}

/// A finished payslip, ready to be packaged.
#[derive(Clone, Debug)]
pub struct RenderedSlip {
    pub identity: String,
    pub pdf: Vec<u8>,
}

impl RenderedSlip {
    pub fn file_name(&self) -> String {
        format!("{}.pdf", sanitize_file_stem(&self.identity))
    }
}

/// Keep archive entry names flat: no directory separators or control chars.
fn sanitize_file_stem(id: &str) -> String {
    id.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

fn render_one(
    company: &CompanyInfo,
    record: &EmployeeRecord,
    face: &FontFace,
) -> Result<RenderedSlip, Error> {
    let doc = payslip::render(company, record, face)?;
    let identity = payslip::identity(record).ok_or(Error::MissingField {
        row: record.row,
        field: payslip::IDENTITY_FIELD,
    })?;
    let title = format!("Pay Slip {} - {}", identity, company.salary_month);
    let pdf = crate::pdf::encode_pdf(&doc, face, &title)?;
    Ok(RenderedSlip { identity, pdf })
}

/// Render every record, at most `options.max_concurrency` at a time.
///
/// All renders are joined before returning and results keep input order. Any
/// failed render fails the whole batch: its error is returned and no slips are.
pub fn render_batch(
    company: &CompanyInfo,
    records: &[EmployeeRecord],
    face: &FontFace,
    options: &BatchOptions,
) -> Result<Vec<RenderedSlip>, Error> {
    if records.is_empty() {
        return Err(Error::NoRecords);
    }

    let pool = ThreadPoolBuilder::new()
        .num_threads(options.max_concurrency)
        .build()
        .map_err(|e| Error::ThreadPool(e.to_string()))?;
    log::debug!(
        "render_batch: {} records on {} threads",
        records.len(),
        pool.current_num_threads()
    );

    let slips = pool.install(|| {
        records
            .par_iter()
            .map(|record| render_one(company, record, face))
            .collect::<Result<Vec<_>, Error>>()
    })?;

    let mut seen = HashSet::new();
    for slip in &slips {
        if !seen.insert(slip.file_name()) {
            return Err(Error::DuplicateIdentity(slip.identity.clone()));
        }
    }
    Ok(slips)
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "archive.zip".into());
    name.push(".partial");
    path.with_file_name(name)
}

fn write_entries(slips: &[RenderedSlip], file: std::fs::File) -> Result<(), Error> {
    let mut zip = zip::ZipWriter::new(std::io::BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o644);
    for slip in slips {
        zip.start_file(slip.file_name(), options)?;
        zip.write_all(&slip.pdf)?;
    }
    zip.finish()?.flush()?;
    Ok(())
}

/// Package slips as a ZIP at `path`, one `<identity>.pdf` entry each.
///
/// The archive is written beside `path` and renamed into place, so a failure
/// never leaves a partial archive behind.
pub fn write_archive(slips: &[RenderedSlip], path: &Path) -> Result<(), Error> {
    let tmp = temp_sibling(path);
    let result = std::fs::File::create(&tmp)
        .map_err(Error::Io)
        .and_then(|file| write_entries(slips, file))
        .and_then(|()| std::fs::rename(&tmp, path).map_err(Error::Io));
    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result
}
