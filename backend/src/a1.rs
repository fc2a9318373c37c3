//! A1-notation cell addresses (`B7`, `A2:B`, `D3:3`).
//!
//! Rows and columns are 1-based, as they are written.

use crate::error::StoreError;
use std::fmt;

/// Highest addressable row of a sheet.
pub const MAX_ROWS: u32 = 1_048_576;
/// Highest addressable column of a sheet (`XFD`).
pub const MAX_COLUMNS: u32 = 16_384;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    pub fn parse(input: &str) -> Result<Self, StoreError> {
        match parse_parts(input.trim()) {
            (Some(col), Some(row)) => Ok(CellRef { row, col }),
            _ => Err(StoreError::InvalidCell(input.to_string())),
        }
    }

    /// Fails when the shifted cell falls outside the sheet.
    pub fn offset(&self, rows: u32, cols: u32) -> Result<Self, StoreError> {
        let row = self.row.checked_add(rows);
        let col = self.col.checked_add(cols);
        match (row, col) {
            (Some(row), Some(col)) => CellRef { row, col }.within_sheet(),
            _ => Err(StoreError::InvalidCell(format!(
                "{} shifted by {} row(s) and {} column(s)",
                self, rows, cols
            ))),
        }
    }

    /// Returns the cell unchanged if it lies inside `MAX_ROWS` x `MAX_COLUMNS`.
    pub fn within_sheet(self) -> Result<Self, StoreError> {
        if (1..=MAX_ROWS).contains(&self.row) && (1..=MAX_COLUMNS).contains(&self.col) {
            Ok(self)
        } else {
            Err(StoreError::InvalidCell(format!(
                "row {} column {} is outside the sheet",
                self.row, self.col
            )))
        }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_name(self.col), self.row)
    }
}

/// A rectangular range. `end_row == None` means "down to the last used row" (`A3:A`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start: CellRef,
    pub end_col: u32,
    pub end_row: Option<u32>,
}

impl CellRange {
    pub fn parse(input: &str) -> Result<Self, StoreError> {
        let invalid = || StoreError::InvalidCell(input.to_string());
        let (start, end) = input.trim().split_once(':').ok_or_else(invalid)?;
        let start = CellRef::parse(start)?;
        let (end_col, end_row) = parse_parts(end.trim());
        let end_col = end_col.ok_or_else(invalid)?;
        if end_col < start.col || end_row.is_some_and(|row| row < start.row) {
            return Err(invalid());
        }
        Ok(CellRange {
            start,
            end_col,
            end_row,
        })
    }

    pub fn width(&self) -> u32 {
        self.end_col - self.start.col + 1
    }

    /// Closes an open-ended range at `last_row`.
    pub fn bounded(&self, last_row: u32) -> CellRange {
        CellRange {
            end_row: Some(self.end_row.unwrap_or(last_row)),
            ..*self
        }
    }
}

/// Converts a 1-based column index to letters: 1 -> A, 27 -> AA.
pub fn column_name(mut col: u32) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        col = (col - 1) / 26;
    }
    letters.iter().rev().collect()
}

fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    letters.chars().try_fold(0u32, |acc, ch| {
        let digit = ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        acc.checked_mul(26)?.checked_add(digit)
    })
}

/// Splits `$B$7`-style input into optional column and row parts.
fn parse_parts(input: &str) -> (Option<u32>, Option<u32>) {
    let cleaned: String = input.chars().filter(|c| *c != '$').collect();
    let split = cleaned
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(cleaned.len());
    let (letters, digits) = cleaned.split_at(split);
    let col = column_index(letters).filter(|c| *c <= MAX_COLUMNS);
    let row = if digits.is_empty() {
        None
    } else {
        digits.parse::<u32>().ok().filter(|r| (1..=MAX_ROWS).contains(r))
    };
    // Trailing garbage after the row or a bare row with no digits is invalid.
    if !digits.is_empty() && row.is_none() {
        return (None, None);
    }
    (col, row)
}
