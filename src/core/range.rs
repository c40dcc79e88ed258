//! Spreadsheet range notation ("A1:Z100") and column letter conversions.

use crate::error::{ReportError, ReportResult};
use regex::Regex;

/// An inclusive rectangular cell region, zero-based on both axes.
///
/// Invariant: `first_row <= last_row` and `first_col <= last_col`, enforced
/// at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeAddress {
    pub first_row: u32,
    pub last_row: u32,
    pub first_col: u16,
    pub last_col: u16,
}

impl RangeAddress {
    /// Build a range from zero-based inclusive bounds.
    pub fn new(first_row: u32, last_row: u32, first_col: u16, last_col: u16) -> ReportResult<Self> {
        if first_row > last_row || first_col > last_col {
            return Err(ReportError::Range(format!(
                "inverted bounds: rows {first_row}..{last_row}, cols {first_col}..{last_col}"
            )));
        }
        Ok(Self {
            first_row,
            last_row,
            first_col,
            last_col,
        })
    }

    /// Parse conventional "A1:Z100" notation (also accepts a single cell,
    /// e.g. "B7"). Column letters map A=0 … Z=25, AA=26 …; 1-based row
    /// numbers are converted to 0-based.
    pub fn parse(notation: &str) -> ReportResult<Self> {
        let re = Regex::new(r"^\$?([A-Za-z]{1,3})\$?([0-9]+)(?::\$?([A-Za-z]{1,3})\$?([0-9]+))?$")
            .map_err(|e| ReportError::Range(format!("regex error: {e}")))?;

        let caps = re
            .captures(notation.trim())
            .ok_or_else(|| ReportError::Range(notation.to_string()))?;

        let first_col = column_index(&caps[1])?;
        let first_row = parse_row(&caps[2], notation)?;

        let (last_col, last_row) = match (caps.get(3), caps.get(4)) {
            (Some(col), Some(row)) => (column_index(col.as_str())?, parse_row(row.as_str(), notation)?),
            _ => (first_col, first_row),
        };

        Self::new(first_row, last_row, first_col, last_col)
    }

    pub fn row_count(&self) -> u32 {
        self.last_row - self.first_row + 1
    }

    pub fn col_count(&self) -> u16 {
        self.last_col - self.first_col + 1
    }
}

fn parse_row(digits: &str, notation: &str) -> ReportResult<u32> {
    let row: u32 = digits
        .parse()
        .map_err(|_| ReportError::Range(notation.to_string()))?;
    if row == 0 {
        return Err(ReportError::Range(format!("{notation}: row numbers are 1-based")));
    }
    Ok(row - 1)
}

/// Convert a zero-based column index to its base-26 alphabetic label
/// (0 → A, 25 → Z, 26 → AA, ...).
pub fn column_letter(index: u16) -> String {
    let mut result = String::new();
    let mut idx = index as usize;

    loop {
        let remainder = idx % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }

    result
}

/// Inverse of [`column_letter`]: "A" → 0, "Z" → 25, "AA" → 26, ...
pub fn column_index(letters: &str) -> ReportResult<u16> {
    let mut index: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return Err(ReportError::Range(letters.to_string()));
        }
        let digit = (ch.to_ascii_uppercase() as u8 - b'A') as u32 + 1;
        index = index * 26 + digit;
    }
    if index == 0 || index > u16::MAX as u32 + 1 {
        return Err(ReportError::Range(letters.to_string()));
    }
    Ok((index - 1) as u16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_simple_range() {
        let range = RangeAddress::parse("A1:Z100").unwrap();
        assert_eq!(range.first_row, 0);
        assert_eq!(range.last_row, 99);
        assert_eq!(range.first_col, 0);
        assert_eq!(range.last_col, 25);
    }

    #[test]
    fn test_parse_multi_letter_columns() {
        let range = RangeAddress::parse("AA10:AB20").unwrap();
        assert_eq!(range.first_col, 26);
        assert_eq!(range.last_col, 27);
        assert_eq!(range.first_row, 9);
        assert_eq!(range.last_row, 19);
    }

    #[test]
    fn test_parse_single_cell() {
        let range = RangeAddress::parse("B7").unwrap();
        assert_eq!(range.first_row, 6);
        assert_eq!(range.last_row, 6);
        assert_eq!(range.first_col, 1);
        assert_eq!(range.last_col, 1);
    }

    #[test]
    fn test_parse_absolute_markers() {
        let range = RangeAddress::parse("$E$3:$Z$3").unwrap();
        assert_eq!(range.first_row, 2);
        assert_eq!(range.last_row, 2);
        assert_eq!(range.first_col, 4);
        assert_eq!(range.last_col, 25);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(RangeAddress::parse("").is_err());
        assert!(RangeAddress::parse("1A:Z9").is_err());
        assert!(RangeAddress::parse("A0:B5").is_err());
        assert!(RangeAddress::parse("A1:B2:C3").is_err());
    }

    #[test]
    fn test_parse_rejects_inverted_bounds() {
        assert!(RangeAddress::parse("B5:A1").is_err());
        assert!(RangeAddress::parse("A10:A5").is_err());
    }

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(1), "B");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(51), "AZ");
        assert_eq!(column_letter(52), "BA");
        assert_eq!(column_letter(701), "ZZ");
    }

    #[test]
    fn test_column_index_round_trip() {
        for idx in [0u16, 1, 25, 26, 27, 51, 52, 701, 702] {
            assert_eq!(column_index(&column_letter(idx)).unwrap(), idx);
        }
    }

    #[test]
    fn test_column_index_case_insensitive() {
        assert_eq!(column_index("aa").unwrap(), 26);
        assert_eq!(column_index("z").unwrap(), 25);
    }
}
