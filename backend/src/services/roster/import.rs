//! `POST /api/roster/import`: writes CSV text into a sheet, one CSV line per sheet row.
//!
//! The delimiter is guessed from the first line. Cells are trimmed, stripped of
//! outer quotes and non-breaking spaces, and numeric text is stored as a number.

use crate::a1::CellRef;
use crate::config::Config;
use crate::error::AutomationError;
use crate::services::blocking_response;
use crate::workspace::{SpreadsheetStore, SqliteWorkspace, TabularSource};
use actix_web::{web, Responder};
use common::model::cell::CellValue;
use common::requests::ImportRosterRequest;
use log::info;
use serde::Serialize;

const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

#[derive(Debug, Serialize, PartialEq)]
pub struct ImportSummary {
    pub sheet_id: i64,
    pub rows: usize,
    pub cells: usize,
}

pub(crate) async fn process(
    config: web::Data<Config>,
    payload: web::Json<ImportRosterRequest>,
) -> impl Responder {
    let req = payload.into_inner();
    let database_path = config.database_path.clone();
    blocking_response(
        web::block(move || {
            let ws = SqliteWorkspace::open(&database_path)?;
            import_roster(&ws, &req)
        })
        .await,
    )
}

/// The most frequent candidate delimiter in `header`; comma wins ties.
pub fn detect_delimiter(header: &str) -> u8 {
    let mut best = (b',', header.matches(',').count());
    for &d in &DELIMITERS[1..] {
        let count = header.matches(d as char).count();
        if count > best.1 {
            best = (d, count);
        }
    }
    best.0
}

pub fn normalize_cell(cell: &str) -> String {
    let s = cell.trim();
    let s = s
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| s.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(s);
    s.replace('\u{00A0}', " ").trim().to_string()
}

pub fn parse_csv(text: &str) -> Result<Vec<Vec<CellValue>>, AutomationError> {
    let header = text.lines().next().unwrap_or_default();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(detect_delimiter(header))
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|cell| CellValue::from_raw(&normalize_cell(cell)))
                .collect(),
        );
    }
    Ok(rows)
}

/// Writes the parsed CSV starting at `start_cell`, creating the sheet if it does not exist.
pub fn import_roster<W>(ws: &W, req: &ImportRosterRequest) -> Result<ImportSummary, AutomationError>
where
    W: SpreadsheetStore + TabularSource,
{
    let start = CellRef::parse(&req.start_cell)
        .map_err(|_| AutomationError::InvalidInput(format!("bad start cell '{}'", req.start_cell)))?;
    let rows = parse_csv(&req.csv)?;

    let sheet = match ws.sheet_by_name(&req.spreadsheet_id, &req.sheet)? {
        Some(sheet) => sheet,
        None => ws.insert_sheet(&req.spreadsheet_id, &req.sheet)?,
    };

    let mut cells = 0;
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            if value.is_blank() {
                continue;
            }
            let cell = start.offset(
                u32::try_from(r).unwrap_or(u32::MAX),
                u32::try_from(c).unwrap_or(u32::MAX),
            )?;
            ws.set_value(sheet.id, cell, value)?;
            cells += 1;
        }
    }
    info!(
        "Imported {} row(s) into sheet '{}' of {}",
        rows.len(),
        sheet.name,
        req.spreadsheet_id
    );

    Ok(ImportSummary {
        sheet_id: sheet.id,
        rows: rows.len(),
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::a1::CellRange;
    use crate::error::StoreError;
    use crate::services::merge::drafts::read_roster;
    use crate::services::reports::provision::read_names;

    #[test]
    fn delimiter_detection_prefers_comma_on_ties() {
        assert_eq!(detect_delimiter("name,emails"), b',');
        assert_eq!(detect_delimiter("name;emails;notes"), b';');
        assert_eq!(detect_delimiter("name\temails"), b'\t');
        assert_eq!(detect_delimiter("name"), b',');
    }

    #[test]
    fn cells_are_normalized() {
        assert_eq!(normalize_cell("  'Sue' "), "Sue");
        assert_eq!(normalize_cell("\"Ann\""), "Ann");
        assert_eq!(normalize_cell("Mary\u{00A0}Jo "), "Mary Jo");
    }

    #[test]
    fn quoted_email_lists_stay_in_one_cell() {
        let rows = parse_csv("Name,Emails\nSue,\"sue@x.com, mom@x.com\"\nBo,7\n").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][1], CellValue::from("sue@x.com, mom@x.com"));
        assert_eq!(rows[2][1], CellValue::Number(7.0));
    }

    #[test]
    fn import_writes_from_start_cell() {
        let ws = SqliteWorkspace::open_in_memory().unwrap();
        let id = ws.create_spreadsheet("Roster").unwrap();
        let req = ImportRosterRequest {
            spreadsheet_id: id.clone(),
            sheet: "Names".to_string(),
            start_cell: "A2".to_string(),
            csv: "Sue;sue@x.com\nAnn;\n".to_string(),
        };

        let summary = import_roster(&ws, &req).unwrap();
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.cells, 3);

        let sheet = ws.sheet_by_name(&id, "Names").unwrap().unwrap();
        let rows = ws.read_range(sheet.id, &CellRange::parse("A2:B").unwrap()).unwrap();
        assert_eq!(
            rows,
            vec![
                vec![CellValue::from("Sue"), CellValue::from("sue@x.com")],
                vec![CellValue::from("Ann"), CellValue::Empty],
            ]
        );
    }

    #[test]
    fn bad_start_cell_is_invalid_input() {
        let ws = SqliteWorkspace::open_in_memory().unwrap();
        let id = ws.create_spreadsheet("Roster").unwrap();
        let req = ImportRosterRequest {
            spreadsheet_id: id,
            sheet: "Sheet1".to_string(),
            start_cell: "2A".to_string(),
            csv: "Sue".to_string(),
        };
        assert!(matches!(
            import_roster(&ws, &req),
            Err(AutomationError::InvalidInput(_))
        ));
    }

    #[test]
    fn start_cell_past_the_sheet_is_rejected() {
        let ws = SqliteWorkspace::open_in_memory().unwrap();
        let id = ws.create_spreadsheet("Roster").unwrap();
        let req = ImportRosterRequest {
            spreadsheet_id: id,
            sheet: "Sheet1".to_string(),
            start_cell: "A4294967295".to_string(),
            csv: "Sue\nAnn\n".to_string(),
        };
        assert!(matches!(
            import_roster(&ws, &req),
            Err(AutomationError::InvalidInput(_))
        ));
    }

    #[test]
    fn rows_running_off_the_last_row_are_an_error() {
        let ws = SqliteWorkspace::open_in_memory().unwrap();
        let id = ws.create_spreadsheet("Roster").unwrap();
        let req = ImportRosterRequest {
            spreadsheet_id: id,
            sheet: "Sheet1".to_string(),
            start_cell: "A1048576".to_string(),
            csv: "Sue\nAnn\n".to_string(),
        };
        assert!(matches!(
            import_roster(&ws, &req),
            Err(AutomationError::Store(StoreError::InvalidCell(_)))
        ));
    }

    #[test]
    fn names_that_look_like_number_words_survive_import() {
        let ws = SqliteWorkspace::open_in_memory().unwrap();
        let id = ws.create_spreadsheet("Roster").unwrap();
        let req = ImportRosterRequest {
            spreadsheet_id: id.clone(),
            sheet: "Sheet1".to_string(),
            start_cell: "A2".to_string(),
            csv: "Sue,sue@x.com\nNan,nan@x.com\nInfinity,i@x.com\n1e3,e@x.com\n".to_string(),
        };
        import_roster(&ws, &req).unwrap();
        let sheet = ws.sheet_by_name(&id, "Sheet1").unwrap().unwrap();

        let roster = read_roster(&ws, sheet.id).unwrap();
        let names: Vec<&str> = roster.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, vec!["Sue", "Nan", "Infinity", "1e3"]);
        assert_eq!(roster[1].emails.as_deref(), Some("nan@x.com"));

        // Report names start at A3.
        let names = read_names(&ws, sheet.id).unwrap();
        assert_eq!(names, vec!["Nan", "Infinity", "1e3"]);
    }
}
