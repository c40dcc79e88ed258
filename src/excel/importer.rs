//! Excel importer — .xlsx/.xlsm → in-memory [`Grid`].

use crate::core::grid::{CellValue, Grid};
use crate::error::{ReportError, ReportResult};
use calamine::{open_workbook, Data, Reader, Xlsx};
use std::path::Path;

/// Load a workbook into a [`Grid`]. An absent or unreadable file is a
/// reported error, never a silently substituted empty workbook.
///
/// Cached cell values are preferred over formula text; the formula string is
/// stored only for cells that carry no cached value, so scanning always sees
/// what the workbook last displayed.
pub fn load<P: AsRef<Path>>(path: P) -> ReportResult<Grid> {
    let path = path.as_ref();
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e| {
        ReportError::Workbook(format!("failed to open {}: {e}", path.display()))
    })?;

    let mut grid = Grid::new();
    for sheet_name in workbook.sheet_names().to_vec() {
        let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
            ReportError::Workbook(format!("failed to read sheet {sheet_name}: {e}"))
        })?;
        let formulas = workbook.worksheet_formula(&sheet_name).ok();

        let sheet = grid.get_or_create_sheet(&sheet_name);

        let (first_row, first_col) = range.start().unwrap_or((0, 0));
        for (row, col, cell) in range.used_cells() {
            let value = match cell {
                Data::String(s) => CellValue::String(s.clone()),
                Data::Float(f) => CellValue::Number(*f),
                Data::Int(i) => CellValue::Number(*i as f64),
                Data::Bool(b) => CellValue::Bool(*b),
                Data::Error(e) => CellValue::Error(e.to_string()),
                Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
                Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
                Data::Empty => continue,
            };
            sheet.set(first_row + row as u32, (first_col as usize + col) as u16, value);
        }

        if let Some(formulas) = formulas {
            let (first_row, first_col) = formulas.start().unwrap_or((0, 0));
            for (row, col, text) in formulas.used_cells() {
                if text.is_empty() {
                    continue;
                }
                let abs_row = first_row + row as u32;
                let abs_col = (first_col as usize + col) as u16;
                if sheet.value(abs_row, abs_col).is_none() {
                    let text = if text.starts_with('=') {
                        text.clone()
                    } else {
                        format!("={text}")
                    };
                    sheet.set(abs_row, abs_col, CellValue::Formula(text));
                }
            }
        }
    }

    Ok(grid)
}
