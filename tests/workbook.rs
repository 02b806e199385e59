mod common;

use common::Cell;
use payslip_pdf::{Error, Value, read_workbook, read_workbook_bytes};

#[test]
fn reads_company_and_employees() {
    let xlsx = common::build_xlsx(&[
        common::company_sheet(),
        common::employee_sheet(&[
            (Cell::Shared("C-001"), 15000.0, 14000.0),
            (Cell::Number(1002.0), 18000.5, 16500.25),
        ]),
    ]);
    let workbook = read_workbook_bytes(&xlsx).unwrap();

    assert_eq!(workbook.company.name, "Acme Facility Services Pvt. Ltd.");
    assert_eq!(workbook.company.address, "12 Industrial Estate, Pune");
    assert_eq!(workbook.company.salary_month, "March 2024");

    assert_eq!(workbook.employees.len(), 2);
    let first = &workbook.employees[0];
    assert_eq!(first.row, 2);
    assert_eq!(common::text(first.get("Casper Id")), Some("C-001"));
    assert_eq!(common::text(first.get("Employee Name")), Some("Test Employee"));
    assert_eq!(first.get("Date Of Birth"), Some(&Value::Number(33604.0)));

    let second = &workbook.employees[1];
    assert_eq!(second.row, 3);
    assert_eq!(second.get("Casper Id"), Some(&Value::Number(1002.0)));
    assert_eq!(second.get("Net Payable"), Some(&Value::Number(16500.25)));
    assert_eq!(second.get("Gross"), None);
}

#[test]
fn empty_cells_are_absent() {
    let xlsx = common::build_xlsx(&[
        common::company_sheet(),
        common::employee_sheet(&[(Cell::Empty, 15000.0, 14000.0)]),
    ]);
    let workbook = read_workbook_bytes(&xlsx).unwrap();
    assert_eq!(workbook.employees[0].get("Casper Id"), None);
    assert_eq!(workbook.employees[0].len(), 4);
}

#[test]
fn boolean_cells_read_as_text_or_blank() {
    let xlsx = common::build_xlsx(&[
        common::company_sheet(),
        vec![
            vec![
                Cell::Shared("Casper Id"),
                Cell::Shared("Designation"),
                Cell::Shared("Work Place"),
            ],
            vec![Cell::Shared("C-001"), Cell::Bool(true), Cell::Bool(false)],
        ],
    ]);
    let workbook = read_workbook_bytes(&xlsx).unwrap();
    let record = &workbook.employees[0];
    assert_eq!(common::text(record.get("Designation")), Some("true"));
    assert_eq!(record.get("Work Place"), None);
    assert_eq!(record.len(), 2);
}

#[test]
fn single_sheet_is_invalid() {
    let xlsx = common::build_xlsx(&[common::company_sheet()]);
    let err = read_workbook_bytes(&xlsx).unwrap_err();
    assert!(matches!(err, Error::InvalidWorkbook(_)), "{err}");
}

#[test]
fn non_zip_input_is_invalid() {
    let err = read_workbook_bytes(b"Company Name,Salary Month\n").unwrap_err();
    assert!(matches!(err, Error::InvalidWorkbook(_)), "{err}");
}

#[test]
fn header_only_sheet_has_no_records() {
    let xlsx = common::build_xlsx(&[common::company_sheet(), common::employee_sheet(&[])]);
    let err = read_workbook_bytes(&xlsx).unwrap_err();
    assert!(matches!(err, Error::NoRecords), "{err}");
}

#[test]
fn reads_from_disk() {
    let dir = common::temp_dir("workbook-file");
    let path = dir.join("payroll.xlsx");
    std::fs::write(
        &path,
        common::build_xlsx(&[
            common::company_sheet(),
            common::employee_sheet(&[(Cell::Shared("C-001"), 1.0, 1.0)]),
        ]),
    )
    .unwrap();
    let workbook = read_workbook(&path).unwrap();
    assert_eq!(workbook.employees.len(), 1);

    let err = read_workbook(&dir.join("missing.xlsx")).unwrap_err();
    assert!(matches!(err, Error::Io(_)), "{err}");
}
