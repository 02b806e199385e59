use std::collections::HashMap;

/// A single spreadsheet cell value. Blank cells are never stored.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompanyInfo {
    pub name: String,
    pub address: String,
    pub salary_month: String,
}

/// One payroll row, keyed by the header names of the employee sheet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EmployeeRecord {
    /// 1-based sheet row the record came from (0 when built in code).
    pub row: usize,
    fields: HashMap<String, Value>,
}

impl EmployeeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_row(row: usize) -> Self {
        EmployeeRecord {
            row,
            fields: HashMap::new(),
        }
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for EmployeeRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        EmployeeRecord {
            row: 0,
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[derive(Debug)]
pub struct Workbook {
    pub company: CompanyInfo,
    pub employees: Vec<EmployeeRecord>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Stroke {
    Regular,
    /// Light grey interior rule (#bbb).
    Light,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TextColor {
    Black,
    /// Grey footer text (#666).
    Muted,
}

/// One wrapped line of text. `(x, y)` is the top-left corner of the line box.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub align: Alignment,
    pub font_size: f32,
    pub color: TextColor,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Text(TextRun),
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stroke: Stroke,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        stroke: Stroke,
    },
}

/// A single laid-out page. Coordinates are in points, origin top-left, y down.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub page_width: f32,
    pub page_height: f32,
    pub ops: Vec<DrawOp>,
}

impl Document {
    pub fn text_runs(&self) -> impl Iterator<Item = &TextRun> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text(run) => Some(run),
            _ => None,
        })
    }
}
