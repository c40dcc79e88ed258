//! The RYG report generator.
//!
//! Walks the demand sheet group by group with a monotonically advancing
//! cursor, resolves each demand row's model columns against the reference
//! sheet, and lays out one output block per group: material rows, deduped
//! model rows in the side columns, a demand row, and a balance row, plus the
//! 26-period supply/demand/balance formula grid.

use crate::core::grid::{format_number, Grid, Sheet};
use crate::core::range::{column_letter, RangeAddress};
use crate::core::scanner;
use crate::error::{ReportError, ReportResult};
use crate::types::{Material, ProductModel};
use tracing::debug;

pub const DEMAND_SHEET: &str = "Demanda";
pub const INFO_REF_SHEET: &str = "Info Referencia";
pub const MASTER_SHEET: &str = "Materiales";
pub const STOCK_SHEET: &str = "Inventario";
pub const TRANSIT_SHEET: &str = "Transito";
pub const SUPPLY_SHEET: &str = "Suministro";
pub const REPORT_SHEET: &str = "RYG";

/// Sheets the output workbook must contain even when empty: every sheet the
/// generated formulas reference, plus the report itself.
pub const FIXED_SHEETS: [&str; 7] = [
    REPORT_SHEET,
    DEMAND_SHEET,
    INFO_REF_SHEET,
    MASTER_SHEET,
    STOCK_SHEET,
    TRANSIT_SHEET,
    SUPPLY_SHEET,
];

/// Status value the sink receives once a run has finished.
pub const IDLE_STATUS: &str = "Idle";

// Demand sheet conventions: row 0 holds the week dates of the 26 demand
// buckets starting at column AA, row 1 the model-name header, data rows
// start at row 2. Column A: group key (clustered), column B: part number,
// columns E..Z: per-model quantities.
pub const GROUP_KEY_RANGE: &str = "A3:A10000";
const MODEL_HEADER_ROW: u32 = 1;
const PART_COL: u16 = 1;
const DEMAND_BUCKET_FIRST_COL: u16 = 26; // AA

// Reference sheet: searched over both the id and model-name columns; fields
// of the matched row at offsets 1..5 (name, risk, program, APN, description).
const INFO_REF_SEARCH_RANGE: &str = "A1:B100";

// Output sheet columns. O and R are the two initial-supply columns the
// period-1 balance sums directly.
const COL_ITEM: u16 = 0;
const COL_PART: u16 = 1;
const COL_TYPE: u16 = 2;
const COL_GROUP: u16 = 3;
const COL_MODEL_APN: u16 = 4;
const COL_MODEL_NAME: u16 = 5;
const COL_MODEL_QTY: u16 = 6;
const COL_STATUS: u16 = 7;
const COL_DESCRIPTION: u16 = 8;
const COL_COMMODITY: u16 = 9;
const COL_BUYER: u16 = 10;
const COL_OPEN_ORDERS: u16 = 11;
const COL_LEAD_TIME: u16 = 12;
const COL_MOQ: u16 = 13;
const COL_ON_HAND: u16 = 14; // O
const COL_SAFETY: u16 = 15;
const COL_WIP: u16 = 16;
const COL_IN_TRANSIT: u16 = 17; // R
const COL_LABEL: u16 = 18; // S, the type/date anchor column
const HORIZON: u16 = 26; // period p sits at column COL_LABEL + p

const FIRST_BLOCK_ROW: u32 = 3;

/// One-directional progress channel: the generator pushes a status string
/// after each well-defined point; it never depends on what listens.
pub type ProgressSink = Box<dyn Fn(&str) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary {
    pub groups: usize,
    pub materials: usize,
}

/// Carries the per-run state the algorithm needs: the demand-row cursor
/// (last consumed row) and the output row counter. Both reset at the start
/// of every [`generate`](ReportGenerator::generate) call.
pub struct ReportGenerator {
    cursor: u32,
    output_row: u32,
    progress: Option<ProgressSink>,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self {
            cursor: 0,
            output_row: FIRST_BLOCK_ROW,
            progress: None,
        }
    }

    pub fn with_progress(mut self, sink: ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    fn report(&self, status: &str) {
        if let Some(sink) = &self.progress {
            sink(status);
        }
    }

    /// Run the full report over `grid`: discover groups, correlate demand
    /// rows with reference models, lay out one block per group, and ensure
    /// the fixed sheet set exists. The demand sheet must be present.
    pub fn generate(&mut self, grid: &mut Grid) -> ReportResult<ReportSummary> {
        self.cursor = 0;
        self.output_row = FIRST_BLOCK_ROW;
        self.report("Generating report...");

        let group_range = RangeAddress::parse(GROUP_KEY_RANGE)?;
        let info_range = RangeAddress::parse(INFO_REF_SEARCH_RANGE)?;

        let groups = {
            let demand = grid
                .sheet(DEMAND_SHEET)
                .ok_or_else(|| ReportError::SheetNotFound(DEMAND_SHEET.to_string()))?;
            scanner::unique_string_values(demand, &group_range)
        };

        write_report_headers(grid.get_or_create_sheet(REPORT_SHEET));

        let mut total_materials = 0;
        for (idx, key) in groups.iter().enumerate() {
            let materials = self.collect_group_materials(grid, &group_range, &info_range, key)?;
            if materials.is_empty() {
                debug!(group = %key, "no demand rows left for group, skipping block");
            } else {
                total_materials += materials.len();
                self.write_group_block(grid, idx, &materials);
            }
            self.report(&format!(
                "Processing group [{key}] [{}/{}]...",
                idx + 1,
                groups.len()
            ));
        }

        for name in FIXED_SHEETS {
            grid.get_or_create_sheet(name);
        }

        self.report(IDLE_STATUS);
        Ok(ReportSummary {
            groups: groups.len(),
            materials: total_materials,
        })
    }

    /// Find the group's contiguous demand-row block starting after the
    /// cursor, advance the cursor past it, and build one Material per row.
    /// Rows at or before the cursor are never rescanned, which is what makes
    /// the pre-sorted-input precondition matter.
    fn collect_group_materials(
        &mut self,
        grid: &Grid,
        group_range: &RangeAddress,
        info_range: &RangeAddress,
        key: &str,
    ) -> ReportResult<Vec<Material>> {
        let demand = grid
            .sheet(DEMAND_SHEET)
            .ok_or_else(|| ReportError::SheetNotFound(DEMAND_SHEET.to_string()))?;

        if self.cursor + 1 > group_range.last_row {
            return Ok(Vec::new());
        }
        let scan = RangeAddress::new(
            self.cursor + 1,
            group_range.last_row,
            group_range.first_col,
            group_range.first_col,
        )?;
        let rows = scanner::find_contiguous_match_rows(demand, &scan, key);
        if let Some(&last) = rows.last() {
            self.cursor = last;
        }

        let mut materials = Vec::with_capacity(rows.len());
        for &row in &rows {
            let mut material = Material::new(key, demand.string_value(row, PART_COL));

            // E{row}:Z{row}: each non-empty column is a model with demand
            let window = RangeAddress::parse(&format!("E{0}:Z{0}", row + 1))?;
            for col in scanner::find_non_empty_columns(demand, &window) {
                let model_name = demand.string_value(MODEL_HEADER_ROW, col);
                let mut model = resolve_model(grid, info_range, &model_name);
                if model.is_null() {
                    // not in the reference sheet: dropped, never attached
                    continue;
                }
                model.qty = demand.numeric_value(row, col);
                material.models.push(model);
            }
            materials.push(material);
        }
        Ok(materials)
    }

    /// Lay out one group's output block: material rows, deduped model rows
    /// in the side columns, the demand row beneath the material rows, the
    /// balance row after the last material/model row, and the horizon grid.
    fn write_group_block(&mut self, grid: &mut Grid, group_idx: usize, materials: &[Material]) {
        let start = self.output_row;
        let material_count = materials.len() as u32;

        // Distinct model names, first occurrence wins, quantities aggregated
        // across every occurrence in the group.
        let mut model_rows: Vec<(String, String, f64)> = Vec::new();
        for material in materials {
            for model in &material.models {
                match model_rows.iter_mut().find(|(_, name, _)| *name == model.name) {
                    Some((_, _, qty)) => *qty += model.qty,
                    None => {
                        model_rows.push((model.apn_pcba.clone(), model.name.clone(), model.qty))
                    }
                }
            }
        }

        let demand_row = start + material_count;
        let balance_row = start + (material_count + 1).max(model_rows.len() as u32);

        let first_period = column_letter(COL_LABEL + 1);
        let last_period = column_letter(COL_LABEL + HORIZON);
        let on_hand = column_letter(COL_ON_HAND);
        let in_transit = column_letter(COL_IN_TRANSIT);

        // Excel (1-based) rows for the formula text
        let first_material_xl = start + 1;
        let last_material_xl = start + material_count;
        let demand_xl = demand_row + 1;
        let balance_xl = balance_row + 1;

        let sheet = grid.get_or_create_sheet(REPORT_SHEET);

        for (i, material) in materials.iter().enumerate() {
            let row = start + i as u32;
            let row_xl = row + 1;
            let part_ref = format!("$B{row_xl}");

            sheet.write_number(row, COL_ITEM, (group_idx + 1) as f64);
            sheet.write_string(row, COL_PART, &material.part_number);
            sheet.write_string(row, COL_TYPE, material.material_type());
            sheet.write_string(row, COL_GROUP, &material.group);

            if !material.part_number.trim().is_empty() {
                sheet.write_formula(
                    row,
                    COL_STATUS,
                    &format!(
                        "=IF(MIN(${first_period}${balance_xl}:${last_period}${balance_xl})<0,\"R\",\"G\")"
                    ),
                );
            }

            sheet.write_formula(
                row,
                COL_DESCRIPTION,
                &format!("=IFERROR(VLOOKUP({part_ref},{MASTER_SHEET}!$A:$F,2,FALSE),\"\")"),
            );
            sheet.write_formula(
                row,
                COL_COMMODITY,
                &format!("=IFERROR(VLOOKUP({part_ref},{MASTER_SHEET}!$A:$F,3,FALSE),\"\")"),
            );
            sheet.write_formula(
                row,
                COL_BUYER,
                &format!("=IFERROR(VLOOKUP({part_ref},{MASTER_SHEET}!$A:$F,4,FALSE),\"\")"),
            );
            sheet.write_formula(
                row,
                COL_OPEN_ORDERS,
                &format!(
                    "=IFERROR(SUMIF({SUPPLY_SHEET}!$A:$A,{part_ref},{SUPPLY_SHEET}!$C:$C),0)"
                ),
            );
            sheet.write_formula(
                row,
                COL_LEAD_TIME,
                &format!("=IFERROR(VLOOKUP({part_ref},{MASTER_SHEET}!$A:$F,5,FALSE),\"\")"),
            );
            sheet.write_formula(
                row,
                COL_MOQ,
                &format!("=IFERROR(VLOOKUP({part_ref},{MASTER_SHEET}!$A:$F,6,FALSE),0)"),
            );
            sheet.write_formula(
                row,
                COL_ON_HAND,
                &format!("=IFERROR(VLOOKUP({part_ref},{STOCK_SHEET}!$A:$B,2,FALSE),0)"),
            );
            sheet.write_formula(
                row,
                COL_SAFETY,
                &format!("=IFERROR(VLOOKUP({part_ref},{STOCK_SHEET}!$A:$C,3,FALSE),0)"),
            );
            sheet.write_formula(
                row,
                COL_WIP,
                &format!("=IFERROR(VLOOKUP({part_ref},{STOCK_SHEET}!$A:$D,4,FALSE),0)"),
            );
            sheet.write_formula(
                row,
                COL_IN_TRANSIT,
                &format!("=IFERROR(VLOOKUP({part_ref},{TRANSIT_SHEET}!$A:$B,2,FALSE),0)"),
            );

            let label = if i == 0 {
                format!("Supply {} (Main)", i + 1)
            } else {
                format!("Supply {}", i + 1)
            };
            sheet.write_string(row, COL_LABEL, &label);

            // period-1 supply is the O+R initial stock, handled by the
            // balance row; formulas start at period 2
            for period in 2..=HORIZON {
                let col = COL_LABEL + period;
                let c = column_letter(col);
                sheet.write_formula(
                    row,
                    col,
                    &format!(
                        "=SUMIFS({SUPPLY_SHEET}!$C:$C,{SUPPLY_SHEET}!$A:$A,{part_ref},\
                         {SUPPLY_SHEET}!$B:$B,\">=\"&{c}$2,{SUPPLY_SHEET}!$B:$B,\"<\"&{c}$2+7)"
                    ),
                );
            }
        }

        for (j, (apn, name, qty)) in model_rows.iter().enumerate() {
            let row = start + j as u32;
            sheet.write_string(row, COL_MODEL_APN, apn);
            sheet.write_string(row, COL_MODEL_NAME, name);
            sheet.write_string(row, COL_MODEL_QTY, &format_number(*qty));
        }

        // demand row: one lookup per period, keyed on the first material
        // row's group cell
        sheet.write_string(demand_row, COL_LABEL, "Demand");
        let group_ref = format!("$D{first_material_xl}");
        for period in 1..=HORIZON {
            let col = COL_LABEL + period;
            let c = column_letter(col);
            sheet.write_formula(
                demand_row,
                col,
                &format!(
                    "=IFERROR(VLOOKUP({group_ref},{DEMAND_SHEET}!$A:$BZ,\
                     MATCH({c}$2,{DEMAND_SHEET}!$1:$1,0),FALSE),0)"
                ),
            );
        }

        // balance row: period 1 sums the two initial-supply columns, later
        // periods carry the recurrence forward
        sheet.write_string(balance_row, COL_LABEL, "Balance");
        sheet.write_formula(
            balance_row,
            COL_LABEL + 1,
            &format!(
                "=SUM(${on_hand}${first_material_xl}:${on_hand}${last_material_xl})\
                 +SUM(${in_transit}${first_material_xl}:${in_transit}${last_material_xl})\
                 -{first_period}{demand_xl}"
            ),
        );
        for period in 2..=HORIZON {
            let col = COL_LABEL + period;
            let c = column_letter(col);
            let prev = column_letter(col - 1);
            sheet.write_formula(
                balance_row,
                col,
                &format!(
                    "={prev}{balance_xl}+SUM({c}${first_material_xl}:{c}${last_material_xl})\
                     -{c}{demand_xl}"
                ),
            );
        }

        // one blank spacer row between blocks
        self.output_row = balance_row + 2;
    }
}

/// Resolve a model name against the reference sheet. A miss yields the
/// sentinel, never an error; each field read degrades to an empty string on
/// a bad cell rather than aborting the row.
fn resolve_model(grid: &Grid, info_range: &RangeAddress, name: &str) -> ProductModel {
    let info = match grid.sheet(INFO_REF_SHEET) {
        Some(sheet) => sheet,
        None => return ProductModel::null(),
    };
    match scanner::find_first_match_row(info, info_range, name) {
        Some(row) => ProductModel {
            name: info.string_value(row, 1),
            risk: info.string_value(row, 2),
            program: info.string_value(row, 3),
            apn_pcba: info.string_value(row, 4),
            apn_description: info.string_value(row, 5),
            qty: 0.0,
        },
        None => ProductModel::null(),
    }
}

fn write_report_headers(sheet: &mut Sheet) {
    let titles: [(u16, &str); 19] = [
        (COL_ITEM, "Item"),
        (COL_PART, "Part Number"),
        (COL_TYPE, "Material Type"),
        (COL_GROUP, "Group"),
        (COL_MODEL_APN, "APN PCBA"),
        (COL_MODEL_NAME, "Model"),
        (COL_MODEL_QTY, "Qty"),
        (COL_STATUS, "Status"),
        (COL_DESCRIPTION, "Description"),
        (COL_COMMODITY, "Commodity"),
        (COL_BUYER, "Buyer"),
        (COL_OPEN_ORDERS, "Open Orders"),
        (COL_LEAD_TIME, "Lead Time"),
        (COL_MOQ, "MOQ"),
        (COL_ON_HAND, "On Hand"),
        (COL_SAFETY, "Safety Stock"),
        (COL_WIP, "WIP"),
        (COL_IN_TRANSIT, "In Transit"),
        (COL_LABEL, "Type / Date"),
    ];
    for (col, title) in titles {
        sheet.write_string(0, col, title);
    }

    // period date header: mirror the demand sheet's week dates (row 1, AA..)
    sheet.write_string(1, COL_LABEL, "Week of");
    for period in 1..=HORIZON {
        let bucket = column_letter(DEMAND_BUCKET_FIRST_COL + period - 1);
        sheet.write_formula(
            1,
            COL_LABEL + period,
            &format!("={DEMAND_SHEET}!{bucket}$1"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::CellValue;
    use pretty_assertions::assert_eq;

    fn base_grid() -> Grid {
        let mut grid = Grid::new();
        {
            let demand = grid.get_or_create_sheet(DEMAND_SHEET);
            // week dates for the demand buckets
            for period in 0..HORIZON {
                demand.write_number(0, DEMAND_BUCKET_FIRST_COL + period, 45000.0 + 7.0 * period as f64);
            }
            // model-name header
            demand.write_string(1, 4, "ModelA");
            demand.write_string(1, 5, "ModelB");
        }
        {
            let info = grid.get_or_create_sheet(INFO_REF_SHEET);
            info.write_string(4, 0, "X12");
            info.write_string(4, 1, "ModelA");
            info.write_string(4, 2, "High");
            info.write_string(4, 3, "ProgZ");
            info.write_string(4, 4, "APN1");
            info.write_string(4, 5, "Desc1");

            info.write_string(5, 0, "X13");
            info.write_string(5, 1, "ModelB");
            info.write_string(5, 2, "Low");
            info.write_string(5, 3, "ProgY");
            info.write_string(5, 4, "APN2");
            info.write_string(5, 5, "Desc2");
        }
        grid
    }

    fn demand_row(grid: &mut Grid, row: u32, group: &str, part: &str, qty_by_col: &[(u16, f64)]) {
        let demand = grid.get_or_create_sheet(DEMAND_SHEET);
        demand.write_string(row, 0, group);
        demand.write_string(row, PART_COL, part);
        for &(col, qty) in qty_by_col {
            demand.write_number(row, col, qty);
        }
    }

    #[test]
    fn test_generate_correlates_demand_with_reference() {
        let mut grid = base_grid();
        demand_row(&mut grid, 9, "G1", "P1", &[(4, 12.0)]);

        let mut generator = ReportGenerator::new();
        let summary = generator.generate(&mut grid).unwrap();

        assert_eq!(summary.groups, 1);
        assert_eq!(summary.materials, 1);

        let report = grid.sheet(REPORT_SHEET).unwrap();
        assert_eq!(report.string_value(FIRST_BLOCK_ROW, COL_PART), "P1");
        assert_eq!(report.string_value(FIRST_BLOCK_ROW, COL_TYPE), "Single");
        assert_eq!(report.string_value(FIRST_BLOCK_ROW, COL_GROUP), "G1");
        // model side columns
        assert_eq!(report.string_value(FIRST_BLOCK_ROW, COL_MODEL_APN), "APN1");
        assert_eq!(report.string_value(FIRST_BLOCK_ROW, COL_MODEL_NAME), "ModelA");
        assert_eq!(report.string_value(FIRST_BLOCK_ROW, COL_MODEL_QTY), "12");
    }

    #[test]
    fn test_unresolved_model_is_filtered_not_an_error() {
        let mut grid = base_grid();
        let demand = grid.get_or_create_sheet(DEMAND_SHEET);
        demand.write_string(1, 6, "Ghost"); // absent from the reference sheet
        demand_row(&mut grid, 9, "G1", "P1", &[(6, 5.0)]);

        let mut generator = ReportGenerator::new();
        let summary = generator.generate(&mut grid).unwrap();

        assert_eq!(summary.materials, 1);
        let report = grid.sheet(REPORT_SHEET).unwrap();
        assert_eq!(report.string_value(FIRST_BLOCK_ROW, COL_TYPE), "Single");
        assert_eq!(report.string_value(FIRST_BLOCK_ROW, COL_MODEL_NAME), "");
    }

    #[test]
    fn test_model_rows_deduped_and_aggregated() {
        let mut grid = base_grid();
        demand_row(&mut grid, 9, "G1", "P1", &[(4, 3.0)]);
        demand_row(&mut grid, 10, "G1", "P2", &[(4, 4.0), (5, 2.0)]);

        let mut generator = ReportGenerator::new();
        generator.generate(&mut grid).unwrap();

        let report = grid.sheet(REPORT_SHEET).unwrap();
        // two distinct models across the group → two side rows
        assert_eq!(report.string_value(FIRST_BLOCK_ROW, COL_MODEL_NAME), "ModelA");
        assert_eq!(report.string_value(FIRST_BLOCK_ROW, COL_MODEL_QTY), "7");
        assert_eq!(
            report.string_value(FIRST_BLOCK_ROW + 1, COL_MODEL_NAME),
            "ModelB"
        );
        assert_eq!(report.string_value(FIRST_BLOCK_ROW + 1, COL_MODEL_QTY), "2");
        assert_eq!(report.string_value(FIRST_BLOCK_ROW + 2, COL_MODEL_NAME), "");
    }

    #[test]
    fn test_group_block_layout_rows() {
        let mut grid = base_grid();
        demand_row(&mut grid, 9, "G1", "P1", &[(4, 3.0)]);
        demand_row(&mut grid, 10, "G1", "P2", &[(5, 2.0)]);

        let mut generator = ReportGenerator::new();
        generator.generate(&mut grid).unwrap();

        let report = grid.sheet(REPORT_SHEET).unwrap();
        assert_eq!(
            report.string_value(FIRST_BLOCK_ROW, COL_LABEL),
            "Supply 1 (Main)"
        );
        assert_eq!(report.string_value(FIRST_BLOCK_ROW + 1, COL_LABEL), "Supply 2");
        assert_eq!(report.string_value(FIRST_BLOCK_ROW + 2, COL_LABEL), "Demand");
        assert_eq!(report.string_value(FIRST_BLOCK_ROW + 3, COL_LABEL), "Balance");
    }

    #[test]
    fn test_balance_recurrence_formulas() {
        let mut grid = base_grid();
        demand_row(&mut grid, 9, "G1", "P1", &[(4, 3.0)]);

        let mut generator = ReportGenerator::new();
        generator.generate(&mut grid).unwrap();

        let report = grid.sheet(REPORT_SHEET).unwrap();
        let balance_row = FIRST_BLOCK_ROW + 2;
        // period 1: initial supply columns O and R minus period-1 demand
        assert_eq!(
            report.value(balance_row, COL_LABEL + 1),
            Some(&CellValue::Formula(
                "=SUM($O$4:$O$4)+SUM($R$4:$R$4)-T5".to_string()
            ))
        );
        // period 2: prior balance + supply − demand
        assert_eq!(
            report.value(balance_row, COL_LABEL + 2),
            Some(&CellValue::Formula("=T6+SUM(U$4:U$4)-U5".to_string()))
        );
    }

    #[test]
    fn test_status_formula_only_for_nonempty_part() {
        let mut grid = base_grid();
        demand_row(&mut grid, 9, "G1", "", &[(4, 3.0)]);
        demand_row(&mut grid, 10, "G1", "P2", &[(5, 2.0)]);

        let mut generator = ReportGenerator::new();
        generator.generate(&mut grid).unwrap();

        let report = grid.sheet(REPORT_SHEET).unwrap();
        assert_eq!(report.value(FIRST_BLOCK_ROW, COL_STATUS), None);
        assert!(matches!(
            report.value(FIRST_BLOCK_ROW + 1, COL_STATUS),
            Some(CellValue::Formula(text)) if text.starts_with("=IF(MIN(")
        ));
    }

    #[test]
    fn test_cursor_never_rescans_consumed_rows() {
        let mut grid = base_grid();
        demand_row(&mut grid, 9, "G1", "P1", &[(4, 1.0)]);
        demand_row(&mut grid, 10, "G2", "P2", &[(4, 1.0)]);
        demand_row(&mut grid, 11, "G1", "P3", &[(4, 1.0)]); // violates sort order

        let mut generator = ReportGenerator::new();
        let summary = generator.generate(&mut grid).unwrap();

        // G1's second block was already passed over when G2 advanced the
        // cursor, so only the first G1 row and the G2 row become materials
        assert_eq!(summary.groups, 2);
        assert_eq!(summary.materials, 2);
    }

    #[test]
    fn test_second_run_resets_cursor() {
        let mut grid = base_grid();
        demand_row(&mut grid, 9, "G1", "P1", &[(4, 12.0)]);

        let mut generator = ReportGenerator::new();
        let first = generator.generate(&mut grid).unwrap();
        let second = generator.generate(&mut grid).unwrap();
        assert_eq!(first, second);

        let report = grid.sheet(REPORT_SHEET).unwrap();
        assert_eq!(report.string_value(FIRST_BLOCK_ROW, COL_PART), "P1");
    }

    #[test]
    fn test_fixed_sheets_exist_after_run() {
        let mut grid = base_grid();
        demand_row(&mut grid, 9, "G1", "P1", &[(4, 1.0)]);

        let mut generator = ReportGenerator::new();
        generator.generate(&mut grid).unwrap();

        for name in FIXED_SHEETS {
            assert!(grid.sheet(name).is_some(), "missing sheet {name}");
        }
    }

    #[test]
    fn test_missing_demand_sheet_is_an_error() {
        let mut grid = Grid::new();
        let mut generator = ReportGenerator::new();
        assert!(matches!(
            generator.generate(&mut grid),
            Err(ReportError::SheetNotFound(name)) if name == DEMAND_SHEET
        ));
    }

    #[test]
    fn test_progress_sequence() {
        use std::sync::{Arc, Mutex};

        let mut grid = base_grid();
        demand_row(&mut grid, 9, "G1", "P1", &[(4, 1.0)]);
        demand_row(&mut grid, 10, "G2", "P2", &[(5, 1.0)]);

        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut generator = ReportGenerator::new()
            .with_progress(Box::new(move |status| sink.lock().unwrap().push(status.to_string())));
        generator.generate(&mut grid).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.first().map(String::as_str), Some("Generating report..."));
        assert!(seen.contains(&"Processing group [G1] [1/2]...".to_string()));
        assert!(seen.contains(&"Processing group [G2] [2/2]...".to_string()));
        assert_eq!(seen.last().map(String::as_str), Some(IDLE_STATUS));
    }
}
