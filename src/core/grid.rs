//! In-memory workbook grid: named sheets of sparse, typed cells.
//!
//! The grid is the only mutable state a report run touches. Sheets are
//! created lazily on first write, rows and cells on demand. Reads are
//! forgiving (missing cell → empty string); writes are typed. Formula cells
//! are evaluated on read with xlformula_engine, resolving plain `A1`-style
//! references against the same sheet.

use crate::core::range::RangeAddress;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;
use xlformula_engine::{calculate, parse_formula, types, NoCustomFunction};

/// A typed cell. Absence of a cell models "blank".
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Number(f64),
    Bool(bool),
    /// Formula text, leading `=` included.
    Formula(String),
    /// A spreadsheet error code, e.g. `#N/A`.
    Error(String),
}

/// A single sheet: sparse rows of sparse cells, zero-based coordinates.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    name: String,
    rows: BTreeMap<u32, BTreeMap<u16, CellValue>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self, row: u32, col: u16) -> Option<&CellValue> {
        self.rows.get(&row).and_then(|r| r.get(&col))
    }

    pub fn set(&mut self, row: u32, col: u16, value: CellValue) {
        self.rows.entry(row).or_default().insert(col, value);
    }

    pub fn write_string(&mut self, row: u32, col: u16, value: impl Into<String>) {
        self.set(row, col, CellValue::String(value.into()));
    }

    pub fn write_number(&mut self, row: u32, col: u16, value: f64) {
        self.set(row, col, CellValue::Number(value));
    }

    /// Write a formula cell. Malformed formula text is logged and skipped;
    /// the cell keeps its prior state and the run continues.
    pub fn write_formula(&mut self, row: u32, col: u16, text: &str) {
        if let Err(reason) = check_formula_text(text) {
            warn!(
                sheet = %self.name,
                row,
                col,
                %reason,
                "skipping malformed formula: {text}"
            );
            return;
        }
        self.set(row, col, CellValue::Formula(text.to_string()));
    }

    /// The cell's value coerced to trimmed text by declared type: number →
    /// decimal text, bool → "True"/"False", error → its code text. A formula
    /// cell is evaluated first and the result coerced the same way. Missing
    /// row or cell yields the empty string.
    pub fn string_value(&self, row: u32, col: u16) -> String {
        let cell = match self.value(row, col) {
            Some(cell) => cell,
            None => return String::new(),
        };
        let resolved;
        let cell = match cell {
            CellValue::Formula(text) => match self.evaluate(text) {
                Some(value) => {
                    resolved = value;
                    &resolved
                }
                None => return String::new(),
            },
            other => other,
        };
        match cell {
            CellValue::String(s) => s.trim().to_string(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(b) => if *b { "True" } else { "False" }.to_string(),
            CellValue::Error(e) => e.trim().to_string(),
            CellValue::Formula(_) => String::new(),
        }
    }

    /// The cell's numeric value. Callers only use this on cells known to
    /// hold numbers; anything else yields 0.0.
    pub fn numeric_value(&self, row: u32, col: u16) -> f64 {
        match self.value(row, col) {
            Some(CellValue::Number(n)) => *n,
            _ => 0.0,
        }
    }

    /// Iterate all populated cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u16, &CellValue)> {
        self.rows
            .iter()
            .flat_map(|(&row, cols)| cols.iter().map(move |(&col, cell)| (row, col, cell)))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.values().all(|r| r.is_empty())
    }

    /// Evaluate formula text against this sheet. Single-cell references
    /// (`B5`, `$B$5`) resolve to the referenced cell's value; a reference to
    /// another formula cell is not chased and resolves to an error. Returns
    /// `None` when evaluation fails.
    fn evaluate(&self, text: &str) -> Option<CellValue> {
        let resolver = |reference: String| -> types::Value {
            let range = match RangeAddress::parse(&reference) {
                Ok(r) if r.first_row == r.last_row && r.first_col == r.last_col => r,
                _ => return types::Value::Error(types::Error::Value),
            };
            match self.value(range.first_row, range.first_col) {
                Some(CellValue::Number(n)) => types::Value::Number(*n as f32),
                Some(CellValue::String(s)) => types::Value::Text(s.clone()),
                Some(CellValue::Bool(true)) => types::Value::Boolean(types::Boolean::True),
                Some(CellValue::Bool(false)) => types::Value::Boolean(types::Boolean::False),
                _ => types::Value::Error(types::Error::Value),
            }
        };

        let parsed = parse_formula::parse_string_to_formula(text, None::<NoCustomFunction>);
        match calculate::calculate_formula(parsed, Some(&resolver)) {
            types::Value::Number(n) => Some(CellValue::Number(f64::from(n))),
            types::Value::Text(t) => Some(CellValue::String(t)),
            types::Value::Boolean(types::Boolean::True) => Some(CellValue::Bool(true)),
            types::Value::Boolean(types::Boolean::False) => Some(CellValue::Bool(false)),
            _ => None,
        }
    }
}

/// The workbook abstraction: sheets by name, insertion order preserved for
/// saving. Sheet lookup is memoized; not safe for concurrent writers.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    sheets: Vec<Sheet>,
    index: HashMap<String, usize>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.index.get(name).map(|&idx| &self.sheets[idx])
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        match self.index.get(name) {
            Some(&idx) => Some(&mut self.sheets[idx]),
            None => None,
        }
    }

    /// First call creates the sheet; subsequent calls return the same one.
    pub fn get_or_create_sheet(&mut self, name: &str) -> &mut Sheet {
        if let Some(&idx) = self.index.get(name) {
            return &mut self.sheets[idx];
        }
        self.index.insert(name.to_string(), self.sheets.len());
        self.sheets.push(Sheet::new(name));
        self.sheets.last_mut().unwrap()
    }

    /// Sheets in insertion order.
    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.iter()
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

/// Format a number the way a spreadsheet displays it: up to 6 decimal
/// places, trailing zeros removed ("42", "0.5", "1.25").
pub fn format_number(n: f64) -> String {
    let rounded = (n * 1e6).round() / 1e6;
    format!("{:.6}", rounded)
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Minimal structural check for generated formula text: leading `=`, a
/// non-empty body, balanced parentheses outside string literals, closed
/// string literals.
fn check_formula_text(text: &str) -> Result<(), String> {
    let body = match text.strip_prefix('=') {
        Some(body) => body,
        None => return Err("missing leading '='".to_string()),
    };
    if body.trim().is_empty() {
        return Err("empty formula body".to_string());
    }

    let mut depth: i32 = 0;
    let mut in_string = false;
    for ch in body.chars() {
        match ch {
            '"' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => {
                depth -= 1;
                if depth < 0 {
                    return Err("unbalanced parentheses".to_string());
                }
            }
            _ => {}
        }
    }
    if in_string {
        return Err("unterminated string literal".to_string());
    }
    if depth != 0 {
        return Err("unbalanced parentheses".to_string());
    }
    Ok(())
}
