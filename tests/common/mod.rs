#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::PathBuf;

use payslip_pdf::{CompanyInfo, EmployeeRecord, Value};
use zip::write::SimpleFileOptions;

/// Route `log` output through the test harness (`RUST_LOG=debug cargo test`).
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn company() -> CompanyInfo {
    CompanyInfo {
        name: "Acme Facility Services Pvt. Ltd.".into(),
        address: "12 Industrial Estate, Pune 411001".into(),
        salary_month: "March 2024".into(),
    }
}

/// A fully populated employee row.
pub fn record(id: &str) -> EmployeeRecord {
    let mut r = EmployeeRecord::new();
    r.set("Casper Id", id)
        .set("Employee Id", "EMP-1001")
        .set("Employee Name", "Ravi Kumar")
        .set("Father Name", "Suresh Kumar")
        .set("ESIC Number", "3100123456")
        .set("UAN Number", "100987654321")
        .set("Work Place", "Pune Plant 2")
        .set("Date Of Birth", 33604.0)
        .set("Designation", "Technician")
        .set("Date of Joining", 44927.0)
        .set("Bank Name", "State Bank of India")
        .set("Account Number", "30012345678")
        .set("IFSC code", "SBIN0001234")
        .set("Total Days in Month", 31.0)
        .set("Pay Days", 30.0)
        .set("Over Time (H)", 6.0)
        .set("Arrear Days", 0.0)
        .set("Basic", 15000.0)
        .set("Leave Encashment", 0.0)
        .set("Additional Bonus", 1250.5)
        .set("Over Time", 900.0)
        .set("Shift Allowance", 500.0)
        .set("Total Others", 0.0)
        .set("Gross", 17650.5)
        .set("PF", 1800.0)
        .set("ESIC", 132.38)
        .set("LWF", 12.0)
        .set("Advance Amount", 0.0)
        .set("Total Deduction", 1944.38)
        .set("Net Payable", 15706.12);
    r
}

/// Fresh, empty directory under the system temp dir.
pub fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "payslip-pdf-tests-{}-{}",
        std::process::id(),
        name
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

/// A cell for the in-memory workbook builder.
#[derive(Clone, Copy)]
pub enum Cell {
    /// Stored in sharedStrings.xml
    Shared(&'static str),
    Inline(&'static str),
    Number(f64),
    Bool(bool),
    Empty,
}

fn column_letters(mut idx: usize) -> String {
    let mut out = Vec::new();
    loop {
        out.push(b'A' + (idx % 26) as u8);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    out.reverse();
    String::from_utf8(out).unwrap()
}

fn sheet_xml(rows: &[Vec<Cell>], shared: &mut Vec<String>) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (ri, row) in rows.iter().enumerate() {
        let r = ri + 1;
        xml.push_str(&format!(r#"<row r="{r}">"#));
        for (ci, cell) in row.iter().enumerate() {
            let at = format!("{}{}", column_letters(ci), r);
            match cell {
                Cell::Shared(s) => {
                    let idx = shared.iter().position(|x| x == s).unwrap_or_else(|| {
                        shared.push(s.to_string());
                        shared.len() - 1
                    });
                    xml.push_str(&format!(r#"<c r="{at}" t="s"><v>{idx}</v></c>"#));
                }
                Cell::Inline(s) => {
                    xml.push_str(&format!(r#"<c r="{at}" t="inlineStr"><is><t>{s}</t></is></c>"#))
                }
                Cell::Number(n) => xml.push_str(&format!(r#"<c r="{at}"><v>{n}</v></c>"#)),
                Cell::Bool(b) => {
                    let v = u8::from(*b);
                    xml.push_str(&format!(r#"<c r="{at}" t="b"><v>{v}</v></c>"#))
                }
                Cell::Empty => {}
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

/// Build an .xlsx in memory with one worksheet per entry of `sheets`.
pub fn build_xlsx(sheets: &[Vec<Vec<Cell>>]) -> Vec<u8> {
    let mut shared = Vec::new();
    let sheet_parts: Vec<String> = sheets.iter().map(|rows| sheet_xml(rows, &mut shared)).collect();

    let mut workbook = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
    );
    let mut rels = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for i in 1..=sheet_parts.len() {
        workbook.push_str(&format!(
            r#"<sheet name="Sheet{i}" sheetId="{i}" r:id="rId{i}"/>"#
        ));
        rels.push_str(&format!(
            r#"<Relationship Id="rId{i}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{i}.xml"/>"#
        ));
    }
    workbook.push_str("</sheets></workbook>");
    rels.push_str("</Relationships>");

    let mut sst = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">"#,
        shared.len()
    );
    for s in &shared {
        sst.push_str(&format!("<si><t>{s}</t></si>"));
    }
    sst.push_str("</sst>");

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let opts = SimpleFileOptions::default();
    let mut put = |name: &str, body: &str| {
        zip.start_file(name, opts).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    };
    put("xl/workbook.xml", &workbook);
    put("xl/_rels/workbook.xml.rels", &rels);
    put("xl/sharedStrings.xml", &sst);
    for (i, part) in sheet_parts.iter().enumerate() {
        put(&format!("xl/worksheets/sheet{}.xml", i + 1), part);
    }
    zip.finish().unwrap().into_inner()
}

pub fn company_sheet() -> Vec<Vec<Cell>> {
    vec![
        vec![
            Cell::Shared("Company Name"),
            Cell::Shared("Company Address"),
            Cell::Shared("Salary Month"),
        ],
        vec![
            Cell::Shared("Acme Facility Services Pvt. Ltd."),
            Cell::Inline("12 Industrial Estate, Pune"),
            Cell::Shared("March 2024"),
        ],
    ]
}

/// Employee sheet with the given (Casper Id, Basic, Net Payable) rows.
pub fn employee_sheet(rows: &[(Cell, f64, f64)]) -> Vec<Vec<Cell>> {
    let mut out = vec![vec![
        Cell::Shared("Casper Id"),
        Cell::Shared("Employee Name"),
        Cell::Shared("Date Of Birth"),
        Cell::Shared("Basic"),
        Cell::Shared("Net Payable"),
    ]];
    for (id, basic, net) in rows {
        out.push(vec![
            *id,
            Cell::Shared("Test Employee"),
            Cell::Number(33604.0),
            Cell::Number(*basic),
            Cell::Number(*net),
        ]);
    }
    out
}

pub fn text(v: Option<&Value>) -> Option<&str> {
    match v {
        Some(Value::Text(s)) => Some(s.as_str()),
        _ => None,
    }
}
