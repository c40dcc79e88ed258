//! Stateless search primitives over a rectangular region of a sheet.
//!
//! All functions take a read-only sheet and an inclusive [`RangeAddress`];
//! nothing is cached between calls. Not-found is data (`None` / empty Vec),
//! never an error.

use crate::core::grid::{CellValue, Sheet};
use crate::core::range::RangeAddress;

/// Row index of the first cell in the range whose value is a string equal to
/// `value`, case-insensitively. Rows are scanned top-to-bottom, columns
/// left-to-right within each row. Only string-typed cells participate;
/// numbers and booleans never match.
pub fn find_first_match_row(sheet: &Sheet, range: &RangeAddress, value: &str) -> Option<u32> {
    for row in range.first_row..=range.last_row {
        for col in range.first_col..=range.last_col {
            if cell_matches(sheet, row, col, value) {
                return Some(row);
            }
        }
    }
    None
}

/// Every matching row in the range's first column, ascending. Used when a
/// key may repeat non-contiguously.
pub fn find_all_match_rows(sheet: &Sheet, range: &RangeAddress, value: &str) -> Vec<u32> {
    (range.first_row..=range.last_row)
        .filter(|&row| cell_matches(sheet, row, range.first_col, value))
        .collect()
}

/// Consecutive matching rows in the range's first column, starting at the
/// first match and stopping at the first non-matching row after it — even if
/// more matches exist further down. Precondition: the key column is sorted
/// so that all rows for a key are adjacent.
pub fn find_contiguous_match_rows(sheet: &Sheet, range: &RangeAddress, value: &str) -> Vec<u32> {
    let mut rows = Vec::new();
    for row in range.first_row..=range.last_row {
        if cell_matches(sheet, row, range.first_col, value) {
            rows.push(row);
        } else if !rows.is_empty() {
            break;
        }
    }
    rows
}

/// Coordinates of every non-empty cell in the range, column-major (outer
/// loop over columns, rows within each column).
///
/// Emptiness policy: missing or blank → empty; string → empty iff
/// zero-length; number → empty iff exactly 0; boolean → empty iff false;
/// anything else → not empty. A quantity of exactly zero is thus
/// indistinguishable from no quantity at all, which is what lets downstream
/// code detect "which model columns have demand for this row".
pub fn find_non_empty_cells(sheet: &Sheet, range: &RangeAddress) -> Vec<(u32, u16)> {
    let mut cells = Vec::new();
    for col in range.first_col..=range.last_col {
        for row in range.first_row..=range.last_row {
            if !is_empty(sheet.value(row, col)) {
                cells.push((row, col));
            }
        }
    }
    cells
}

/// Column projection of [`find_non_empty_cells`], order preserved.
pub fn find_non_empty_columns(sheet: &Sheet, range: &RangeAddress) -> Vec<u16> {
    find_non_empty_cells(sheet, range)
        .into_iter()
        .map(|(_, col)| col)
        .collect()
}

/// Row projection of [`find_non_empty_cells`], order preserved.
pub fn find_non_empty_rows(sheet: &Sheet, range: &RangeAddress) -> Vec<u32> {
    find_non_empty_cells(sheet, range)
        .into_iter()
        .map(|(row, _)| row)
        .collect()
}

/// Distinct string-typed cell values across the rectangle, in
/// first-occurrence order (row-major). The order is what group discovery
/// iterates, so it is part of the contract.
pub fn unique_string_values(sheet: &Sheet, range: &RangeAddress) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for row in range.first_row..=range.last_row {
        for col in range.first_col..=range.last_col {
            if let Some(CellValue::String(s)) = sheet.value(row, col) {
                if !s.is_empty() && !values.iter().any(|v| v == s) {
                    values.push(s.clone());
                }
            }
        }
    }
    values
}

fn cell_matches(sheet: &Sheet, row: u32, col: u16, value: &str) -> bool {
    matches!(
        sheet.value(row, col),
        Some(CellValue::String(s)) if s.eq_ignore_ascii_case(value)
    )
}

fn is_empty(cell: Option<&CellValue>) -> bool {
    match cell {
        None => true,
        Some(CellValue::String(s)) => s.is_empty(),
        Some(CellValue::Number(n)) => *n == 0.0,
        Some(CellValue::Bool(b)) => !b,
        Some(_) => false,
    }
}
