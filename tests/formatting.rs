use payslip_pdf::{Value, display_field, format_currency, format_serial_date};

fn num(n: f64) -> Value {
    Value::Number(n)
}

#[test]
fn serial_dates_convert_to_day_month_year() {
    let cases = [
        (25569.0, "01-01-1970"),
        (1.0, "31-12-1899"),
        (33604.0, "01-01-1992"),
        (44927.0, "01-01-2023"),
        (45351.0, "29-02-2024"),
    ];
    for (serial, expected) in cases {
        assert_eq!(format_serial_date(Some(&num(serial))), expected, "serial {serial}");
    }
}

#[test]
fn fractional_serial_keeps_its_calendar_day() {
    // 18:00 on 1 Jan 2023
    assert_eq!(format_serial_date(Some(&num(44927.75))), "01-01-2023");
}

#[test]
fn text_dates_pass_through() {
    assert_eq!(format_serial_date(Some(&Value::from("N/A"))), "N/A");
    assert_eq!(format_serial_date(Some(&Value::from("12/03/1990"))), "12/03/1990");
}

#[test]
fn absent_and_nan_dates_are_blank() {
    assert_eq!(format_serial_date(None), "");
    assert_eq!(format_serial_date(Some(&num(f64::NAN))), "");
}

#[test]
fn out_of_range_serial_prints_raw_number() {
    assert_eq!(format_serial_date(Some(&num(1e12))), "1000000000000");
    assert_eq!(format_serial_date(Some(&num(f64::INFINITY))), "Infinity");
}

#[test]
fn currency_has_symbol_and_two_decimals() {
    assert_eq!(format_currency(Some(&num(1234.5))), "₹ 1234.50");
    assert_eq!(format_currency(Some(&num(15000.0))), "₹ 15000.00");
    assert_eq!(format_currency(Some(&num(-250.0))), "₹ -250.00");
}

#[test]
fn currency_rounds_half_cents_away_from_zero() {
    assert_eq!(format_currency(Some(&num(1.125))), "₹ 1.13");
    assert_eq!(format_currency(Some(&num(0.125))), "₹ 0.13");
    assert_eq!(format_currency(Some(&num(1234.625))), "₹ 1234.63");
    assert_eq!(format_currency(Some(&num(-1.125))), "₹ -1.13");
    assert_eq!(format_currency(Some(&num(0.375))), "₹ 0.38");
    // Not a tie once stored as a double: 1.005 is slightly below 1.005
    assert_eq!(format_currency(Some(&num(1.005))), "₹ 1.00");
    assert_eq!(format_currency(Some(&num(2.5))), "₹ 2.50");
}

#[test]
fn currency_treats_absent_as_zero() {
    assert_eq!(format_currency(None), "₹ 0.00");
    assert_eq!(format_currency(Some(&num(f64::NAN))), "₹ 0.00");
    assert_eq!(format_currency(Some(&num(-0.0))), "₹ 0.00");
}

#[test]
fn currency_parses_numeric_text() {
    assert_eq!(format_currency(Some(&Value::from("1200"))), "₹ 1200.00");
    assert_eq!(format_currency(Some(&Value::from(" 99.9 "))), "₹ 99.90");
    assert_eq!(format_currency(Some(&Value::from(""))), "₹ 0.00");
}

#[test]
fn currency_with_unparseable_text_is_nan() {
    assert_eq!(format_currency(Some(&Value::from("abc"))), "₹ NaN");
}

#[test]
fn detail_fields_blank_zero_and_absent() {
    assert_eq!(display_field(None), "");
    assert_eq!(display_field(Some(&num(0.0))), "");
    assert_eq!(display_field(Some(&num(30.0))), "30");
    assert_eq!(display_field(Some(&num(12.5))), "12.5");
    assert_eq!(display_field(Some(&Value::from("Pune"))), "Pune");
}
