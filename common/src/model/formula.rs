use serde::{Deserialize, Serialize};

/// How much of the master sheet a generated formula pulls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MasterShape {
    /// `{column}{row}:{row}`, the rest of the row from `column` onwards, transposed into a column.
    TransposedRow,
    /// `{column}{row}`, one cell.
    Cell,
}

/// Which master row a formula references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MasterRow {
    /// The same row for every roster entry.
    Fixed(u32),
    /// `base + i` for the roster entry at 0-based index `i`.
    Offset(u32),
}

impl MasterRow {
    pub fn resolve(&self, index: usize) -> u32 {
        match *self {
            MasterRow::Fixed(row) => row,
            MasterRow::Offset(base) => base + index as u32,
        }
    }
}

/// A formula cell of the per-person report, pointing back into the master dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulaDescriptor {
    pub cell: String,
    pub shape: MasterShape,
    pub column: String,
    pub row: MasterRow,
}
