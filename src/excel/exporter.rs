//! Excel exporter — in-memory [`Grid`] → .xlsx.

use crate::core::grid::{CellValue, Grid};
use crate::error::{ReportError, ReportResult};
use rust_xlsxwriter::{Formula, Workbook};
use std::path::Path;

/// Save the grid as a workbook, sheets in insertion order. Formula cells are
/// written as formulas (the target application recalculates them on open);
/// error cells keep their code as text.
pub fn save(grid: &Grid, path: &Path) -> ReportResult<()> {
    let mut workbook = Workbook::new();

    for sheet in grid.sheets() {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name()).map_err(|e| {
            ReportError::Workbook(format!("failed to name worksheet {}: {e}", sheet.name()))
        })?;

        for (row, col, cell) in sheet.cells() {
            match cell {
                CellValue::String(s) => worksheet.write_string(row, col, s.as_str()),
                CellValue::Number(n) => worksheet.write_number(row, col, *n),
                CellValue::Bool(b) => worksheet.write_boolean(row, col, *b),
                CellValue::Formula(text) => {
                    worksheet.write_formula(row, col, Formula::new(text.as_str()))
                }
                CellValue::Error(e) => worksheet.write_string(row, col, e.as_str()),
            }
            .map_err(|e| {
                ReportError::Workbook(format!(
                    "failed to write {}!({row},{col}): {e}",
                    sheet.name()
                ))
            })?;
        }
    }

    workbook
        .save(path)
        .map_err(|e| ReportError::Workbook(format!("failed to save {}: {e}", path.display())))?;

    Ok(())
}
