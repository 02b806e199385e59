//! Minimal XLSX reader: sheet order, shared strings and cell values, enough to
//! turn the company sheet and the employee sheet into records.

use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;

use crate::error::Error;
use crate::model::{CompanyInfo, EmployeeRecord, Value, Workbook};

const SML_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

fn sml<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    node.children()
        .find(|n| n.tag_name().name() == name && n.tag_name().namespace() == Some(SML_NS))
}

fn sml_children<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = roxmltree::Node<'a, 'input>> {
    node.children()
        .filter(move |n| n.tag_name().name() == name && n.tag_name().namespace() == Some(SML_NS))
}

fn read_zip_text<R: Read + Seek>(zip: &mut zip::ZipArchive<R>, name: &str) -> Option<String> {
    let mut content = String::new();
    zip.by_name(name).ok()?.read_to_string(&mut content).ok()?;
    Some(content)
}

/// Concatenated text of every `<t>` below `node` (rich text runs included,
/// phonetic hints skipped).
fn string_item_text(node: roxmltree::Node) -> String {
    node.descendants()
        .filter(|n| n.tag_name().name() == "t" && n.tag_name().namespace() == Some(SML_NS))
        .filter(|n| {
            !n.ancestors()
                .any(|a| a.tag_name().name() == "rPh" && a.tag_name().namespace() == Some(SML_NS))
        })
        .filter_map(|n| n.text())
        .collect()
}

fn parse_shared_strings<R: Read + Seek>(
    zip: &mut zip::ZipArchive<R>,
) -> Result<Vec<String>, Error> {
    let Some(xml_content) = read_zip_text(zip, "xl/sharedStrings.xml") else {
        return Ok(Vec::new());
    };
    let xml = roxmltree::Document::parse(&xml_content)?;
    Ok(sml_children(xml.root_element(), "si")
        .map(string_item_text)
        .collect())
}

/// Resolve `r:id` -> part path from the workbook relationships.
fn parse_workbook_rels<R: Read + Seek>(
    zip: &mut zip::ZipArchive<R>,
) -> Result<HashMap<String, String>, Error> {
    let Some(xml_content) = read_zip_text(zip, "xl/_rels/workbook.xml.rels") else {
        return Ok(HashMap::new());
    };
    let xml = roxmltree::Document::parse(&xml_content)?;
    Ok(xml
        .root_element()
        .children()
        .filter(|n| n.tag_name().name() == "Relationship")
        .filter_map(|n| {
            let id = n.attribute("Id")?;
            let target = n.attribute("Target")?;
            let path = match target.strip_prefix('/') {
                Some(abs) => abs.to_string(),
                None => format!("xl/{target}"),
            };
            Some((id.to_string(), path))
        })
        .collect())
}

/// Worksheet part paths in workbook tab order.
fn sheet_paths<R: Read + Seek>(zip: &mut zip::ZipArchive<R>) -> Result<Vec<String>, Error> {
    let rels = parse_workbook_rels(zip)?;
    let xml_content = read_zip_text(zip, "xl/workbook.xml").ok_or_else(|| {
        Error::InvalidWorkbook("missing xl/workbook.xml (is this an XLSX file?)".into())
    })?;
    let xml = roxmltree::Document::parse(&xml_content)?;
    let sheets = sml(xml.root_element(), "sheets")
        .ok_or_else(|| Error::InvalidWorkbook("workbook has no <sheets>".into()))?;

    Ok(sml_children(sheets, "sheet")
        .enumerate()
        .map(|(i, sheet)| {
            sheet
                .attribute((REL_NS, "id"))
                .and_then(|rid| rels.get(rid).cloned())
                .unwrap_or_else(|| format!("xl/worksheets/sheet{}.xml", i + 1))
        })
        .collect())
}

/// Zero-based column index from a cell reference like `AB12`.
fn column_index(cell_ref: &str) -> Option<usize> {
    let letters: Vec<u8> = cell_ref
        .bytes()
        .take_while(|b| b.is_ascii_alphabetic())
        .collect();
    if letters.is_empty() {
        return None;
    }
    letters
        .iter()
        .try_fold(0usize, |acc, &b| {
            acc.checked_mul(26)?
                .checked_add((b.to_ascii_uppercase() - b'A') as usize + 1)
        })
        .map(|n| n - 1)
}

fn cell_value(cell: roxmltree::Node, shared: &[String]) -> Option<Value> {
    let v = sml(cell, "v").and_then(|n| n.text());
    let value = match cell.attribute("t").unwrap_or("n") {
        "s" => {
            let idx: usize = v?.trim().parse().ok()?;
            shared.get(idx).cloned().map(Value::Text)
        }
        "inlineStr" => sml(cell, "is").map(string_item_text).map(Value::Text),
        "str" | "e" => v.map(|s| Value::Text(s.to_string())),
        // FALSE reads as a blank cell
        "b" => (v?.trim() == "1").then(|| Value::Text("true".to_string())),
        _ => v.and_then(|s| s.trim().parse::<f64>().ok()).map(Value::Number),
    };
    value.filter(|val| !matches!(val, Value::Text(s) if s.is_empty()))
}

/// One parsed row: (1-based sheet row, column index -> value).
type SheetRow = (usize, HashMap<usize, Value>);

fn parse_sheet<R: Read + Seek>(
    zip: &mut zip::ZipArchive<R>,
    path: &str,
    shared: &[String],
) -> Result<Vec<SheetRow>, Error> {
    let xml_content = read_zip_text(zip, path)
        .ok_or_else(|| Error::InvalidWorkbook(format!("missing worksheet {path}")))?;
    let xml = roxmltree::Document::parse(&xml_content)?;
    let Some(data) = sml(xml.root_element(), "sheetData") else {
        return Ok(Vec::new());
    };

    let mut rows = Vec::new();
    for (ri, row) in sml_children(data, "row").enumerate() {
        let row_num = row
            .attribute("r")
            .and_then(|r| r.parse().ok())
            .unwrap_or(ri + 1);
        let mut cells = HashMap::new();
        let mut next_col = 0usize;
        for cell in sml_children(row, "c") {
            let col = cell
                .attribute("r")
                .and_then(column_index)
                .unwrap_or(next_col);
            next_col = col + 1;
            if let Some(value) = cell_value(cell, shared) {
                cells.insert(col, value);
            }
        }
        if !cells.is_empty() {
            rows.push((row_num, cells));
        }
    }
    Ok(rows)
}

/// Map each row after the header to a record keyed by header text.
fn rows_to_records(rows: Vec<SheetRow>) -> Vec<EmployeeRecord> {
    let mut rows = rows.into_iter();
    let Some((_, header)) = rows.next() else {
        return Vec::new();
    };
    let header: HashMap<usize, String> = header
        .into_iter()
        .filter_map(|(col, v)| match v {
            Value::Text(s) => Some((col, s.trim().to_string())),
            Value::Number(n) => Some((col, crate::format::number_to_string(n))),
        })
        .filter(|(_, name)| !name.is_empty())
        .collect();

    rows.filter_map(|(row_num, cells)| {
        let mut record = EmployeeRecord::with_row(row_num);
        for (col, value) in cells {
            if let Some(name) = header.get(&col) {
                record.set(name.clone(), value);
            }
        }
        (!record.is_empty()).then_some(record)
    })
    .collect()
}

fn text_field(record: &EmployeeRecord, field: &str) -> String {
    crate::format::display_field(record.get(field))
}

fn read_archive<R: Read + Seek>(reader: R) -> Result<Workbook, Error> {
    let mut zip = zip::ZipArchive::new(reader)
        .map_err(|_| Error::InvalidWorkbook("file is not a ZIP archive".into()))?;

    let shared = parse_shared_strings(&mut zip)?;
    let paths = sheet_paths(&mut zip)?;
    if paths.len() < 2 {
        return Err(Error::InvalidWorkbook(format!(
            "expected a company sheet and an employee sheet, found {} sheet(s)",
            paths.len()
        )));
    }

    let company_rows = rows_to_records(parse_sheet(&mut zip, &paths[0], &shared)?);
    let company = company_rows
        .first()
        .map(|row| CompanyInfo {
            name: text_field(row, "Company Name"),
            address: text_field(row, "Company Address"),
            salary_month: text_field(row, "Salary Month"),
        })
        .unwrap_or_default();

    let employees = rows_to_records(parse_sheet(&mut zip, &paths[1], &shared)?);
    if employees.is_empty() {
        return Err(Error::NoRecords);
    }

    log::info!(
        "Workbook: {} sheets, {} shared strings, {} employee rows",
        paths.len(),
        shared.len(),
        employees.len()
    );
    Ok(Workbook { company, employees })
}

pub fn read_workbook(path: &Path) -> Result<Workbook, Error> {
    let file = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
            std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())),
        ),
        _ => Error::Io(e),
    })?;
    read_archive(std::io::BufReader::new(file))
}

pub fn read_workbook_bytes(bytes: &[u8]) -> Result<Workbook, Error> {
    read_archive(std::io::Cursor::new(bytes))
}
