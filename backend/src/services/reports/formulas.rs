//! The cross-document formulas written into each report.

use crate::workspace::SheetId;
use common::model::formula::{FormulaDescriptor, MasterRow, MasterShape};

/// First master row holding per-person data; roster entry `i` maps to row `FIRST_PERSON_ROW + i`.
pub const FIRST_PERSON_ROW: u32 = 3;

fn descriptor(cell: &str, shape: MasterShape, column: &str, row: MasterRow) -> FormulaDescriptor {
    FormulaDescriptor {
        cell: cell.to_string(),
        shape,
        column: column.to_string(),
        row,
    }
}

/// The five report cells, in the order they are written.
pub fn report_card_formulas() -> Vec<FormulaDescriptor> {
    vec![
        descriptor("B7", MasterShape::TransposedRow, "D", MasterRow::Fixed(2)),
        descriptor("C7", MasterShape::TransposedRow, "D", MasterRow::Offset(FIRST_PERSON_ROW)),
        descriptor("G3", MasterShape::Cell, "C", MasterRow::Offset(FIRST_PERSON_ROW)),
        descriptor("G12", MasterShape::Cell, "B", MasterRow::Offset(FIRST_PERSON_ROW)),
        descriptor("D7", MasterShape::TransposedRow, "D", MasterRow::Fixed(1)),
    ]
}

/// Where generated formulas import from: the roster spreadsheet's master sheet.
#[derive(Debug, Clone)]
pub struct MasterSource {
    pub spreadsheet_url: String,
    /// Sheet id of the master sheet, when it exists in the source spreadsheet.
    pub gid: Option<SheetId>,
    pub sheet: String,
}

impl MasterSource {
    fn edit_url(&self) -> String {
        match self.gid {
            Some(gid) => format!("{}/edit?gid={}", self.spreadsheet_url, gid),
            None => format!("{}/edit", self.spreadsheet_url),
        }
    }

    fn cell_url(&self) -> String {
        match self.gid {
            Some(gid) => format!("{}#gid={}", self.edit_url(), gid),
            None => self.edit_url(),
        }
    }

    fn sheet_prefix(&self) -> String {
        if self.sheet.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            self.sheet.clone()
        } else {
            format!("'{}'", self.sheet.replace('\'', "''"))
        }
    }

    /// Formula text for `descriptor` on the report of roster entry `index` (0-based).
    pub fn render(&self, descriptor: &FormulaDescriptor, index: usize) -> String {
        let row = descriptor.row.resolve(index);
        match descriptor.shape {
            MasterShape::TransposedRow => format!(
                "=TRANSPOSE(IMPORTRANGE(\"{}\",\"{}!{}{}:{}\"))",
                self.edit_url(),
                self.sheet_prefix(),
                descriptor.column,
                row,
                row
            ),
            MasterShape::Cell => format!(
                "=IMPORTRANGE(\"{}\",\"{}!{}{}\")",
                self.cell_url(),
                self.sheet_prefix(),
                descriptor.column,
                row
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn master() -> MasterSource {
        MasterSource {
            spreadsheet_url: "https://rosterdesk.local/spreadsheets/d/abc".to_string(),
            gid: Some(42),
            sheet: "Master".to_string(),
        }
    }

    fn rendered(index: usize) -> Vec<(String, String)> {
        let master = master();
        report_card_formulas()
            .iter()
            .map(|d| (d.cell.clone(), master.render(d, index)))
            .collect()
    }

    #[test]
    fn first_entry_formulas() {
        let url = "https://rosterdesk.local/spreadsheets/d/abc/edit?gid=42";
        assert_eq!(
            rendered(0),
            vec![
                ("B7".to_string(), format!("=TRANSPOSE(IMPORTRANGE(\"{}\",\"Master!D2:2\"))", url)),
                ("C7".to_string(), format!("=TRANSPOSE(IMPORTRANGE(\"{}\",\"Master!D3:3\"))", url)),
                ("G3".to_string(), format!("=IMPORTRANGE(\"{}#gid=42\",\"Master!C3\")", url)),
                ("G12".to_string(), format!("=IMPORTRANGE(\"{}#gid=42\",\"Master!B3\")", url)),
                ("D7".to_string(), format!("=TRANSPOSE(IMPORTRANGE(\"{}\",\"Master!D1:1\"))", url)),
            ]
        );
    }

    #[test]
    fn per_person_rows_follow_roster_index() {
        let at_five = rendered(5);
        assert!(at_five[1].1.ends_with("\"Master!D8:8\"))"));
        assert!(at_five[2].1.ends_with("\"Master!C8\")"));
        assert!(at_five[3].1.ends_with("\"Master!B8\")"));
        // Header rows do not move.
        assert_eq!(at_five[0].1, rendered(0)[0].1);
        assert_eq!(at_five[4].1, rendered(0)[4].1);
    }

    #[test]
    fn offsets_strictly_increase() {
        for d in report_card_formulas() {
            if let MasterRow::Offset(_) = d.row {
                assert!(d.row.resolve(1) > d.row.resolve(0));
                assert_eq!(d.row.resolve(0), FIRST_PERSON_ROW);
            }
        }
    }

    #[test]
    fn missing_master_sheet_drops_gid_and_quotes_names() {
        let master = MasterSource {
            spreadsheet_url: "https://h/s".to_string(),
            gid: None,
            sheet: "Master Data".to_string(),
        };
        let formulas = report_card_formulas();
        assert_eq!(
            master.render(&formulas[2], 0),
            "=IMPORTRANGE(\"https://h/s/edit\",\"'Master Data'!C3\")"
        );
    }
}
