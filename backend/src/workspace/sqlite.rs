//! SQLite-backed workspace: folders, files, spreadsheets, cells and drafts in one file.
//!
//! Folders and files share the `files` table and are linked through
//! `file_parents`, so a file can sit in several folders at once (or, briefly,
//! only in the root folder right after creation). Enumeration order everywhere
//! is insertion order.

use super::{
    DraftMailer, FileEntry, FileKind, FileStore, Sheet, SheetId, SpreadsheetStore, TabularSource,
};
use crate::a1::{CellRange, CellRef};
use crate::error::StoreError;
use common::model::cell::CellValue;
use common::model::draft::{DraftOptions, StoredDraft};
use common::model::sharing::{Access, Permission};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use uuid::Uuid;

pub const ROOT_FOLDER_ID: &str = "root";
const ROOT_FOLDER_NAME: &str = "My Drive";
const DEFAULT_SHEET_NAME: &str = "Sheet1";
const BASE_URL: &str = "https://rosterdesk.local";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS files (
    seq        INTEGER PRIMARY KEY AUTOINCREMENT,
    id         TEXT NOT NULL UNIQUE,
    name       TEXT NOT NULL,
    kind       TEXT NOT NULL,
    access     TEXT NOT NULL DEFAULT 'private',
    permission TEXT NOT NULL DEFAULT 'edit'
);
CREATE TABLE IF NOT EXISTS file_parents (
    seq       INTEGER PRIMARY KEY AUTOINCREMENT,
    file_id   TEXT NOT NULL,
    folder_id TEXT NOT NULL,
    UNIQUE (file_id, folder_id)
);
CREATE TABLE IF NOT EXISTS sheets (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    spreadsheet_id TEXT NOT NULL,
    name           TEXT NOT NULL,
    position       INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS cells (
    sheet_id INTEGER NOT NULL,
    row      INTEGER NOT NULL,
    col      INTEGER NOT NULL,
    value    TEXT NOT NULL,
    formula  TEXT,
    PRIMARY KEY (sheet_id, row, col)
);
CREATE TABLE IF NOT EXISTS drafts (
    seq        INTEGER PRIMARY KEY AUTOINCREMENT,
    id         TEXT NOT NULL UNIQUE,
    recipients TEXT NOT NULL,
    subject    TEXT NOT NULL,
    body       TEXT NOT NULL,
    html_body  TEXT
);
";

pub struct SqliteWorkspace {
    conn: Connection,
}

impl SqliteWorkspace {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        conn.execute(
            "INSERT OR IGNORE INTO files (id, name, kind) VALUES (?1, ?2, ?3)",
            params![ROOT_FOLDER_ID, ROOT_FOLDER_NAME, FileKind::Folder.as_str()],
        )?;
        Ok(Self { conn })
    }

    /// All drafts created so far, oldest first.
    pub fn drafts(&self) -> Result<Vec<StoredDraft>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, recipients, subject, body, html_body FROM drafts ORDER BY seq",
        )?;
        let drafts = stmt
            .query_map([], |row| {
                Ok(StoredDraft {
                    id: row.get(0)?,
                    recipients: row.get(1)?,
                    subject: row.get(2)?,
                    body: row.get(3)?,
                    html_body: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(drafts)
    }

    fn file(&self, id: &str) -> Result<FileEntry, StoreError> {
        self.conn
            .query_row(
                "SELECT id, name, kind FROM files WHERE id = ?1",
                params![id],
                file_entry_from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found("file", id))?
    }

    fn folder(&self, id: &str) -> Result<FileEntry, StoreError> {
        let entry = self.file(id)?;
        if entry.kind != FileKind::Folder {
            return Err(StoreError::not_found("folder", id));
        }
        Ok(entry)
    }

    fn sheet(&self, id: SheetId) -> Result<Sheet, StoreError> {
        self.conn
            .query_row(
                "SELECT id, spreadsheet_id, name, position FROM sheets WHERE id = ?1",
                params![id],
                sheet_from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found("sheet", id.to_string()))
    }

    fn spreadsheet(&self, id: &str) -> Result<FileEntry, StoreError> {
        let entry = self.file(id)?;
        if entry.kind != FileKind::Spreadsheet {
            return Err(StoreError::not_found("spreadsheet", id));
        }
        Ok(entry)
    }

    fn next_position(&self, spreadsheet_id: &str) -> Result<u32, StoreError> {
        let next: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM sheets WHERE spreadsheet_id = ?1",
            params![spreadsheet_id],
            |row| row.get(0),
        )?;
        Ok(next as u32)
    }

    fn insert_file(&self, name: &str, kind: FileKind, folder_id: &str) -> Result<FileEntry, StoreError> {
        self.folder(folder_id)?;
        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO files (id, name, kind) VALUES (?1, ?2, ?3)",
            params![id, name, kind.as_str()],
        )?;
        self.conn.execute(
            "INSERT INTO file_parents (file_id, folder_id) VALUES (?1, ?2)",
            params![id, folder_id],
        )?;
        Ok(FileEntry {
            id,
            name: name.to_string(),
            kind,
        })
    }
}

fn file_entry_from_row(row: &Row<'_>) -> rusqlite::Result<Result<FileEntry, StoreError>> {
    let kind: String = row.get(2)?;
    Ok(match FileKind::parse(&kind) {
        Some(kind) => Ok(FileEntry {
            id: row.get(0)?,
            name: row.get(1)?,
            kind,
        }),
        None => Err(StoreError::Corrupt(format!("unknown file kind '{}'", kind))),
    })
}

fn sheet_from_row(row: &Row<'_>) -> rusqlite::Result<Sheet> {
    Ok(Sheet {
        id: row.get(0)?,
        spreadsheet_id: row.get(1)?,
        name: row.get(2)?,
        position: row.get::<_, i64>(3)? as u32,
    })
}

fn encode_value(value: &CellValue) -> Result<String, StoreError> {
    if let CellValue::Number(n) = value {
        if !n.is_finite() {
            return Err(StoreError::Rejected(format!("non-finite number {}", n)));
        }
    }
    serde_json::to_string(value).map_err(|e| StoreError::Corrupt(e.to_string()))
}

fn decode_value(raw: &str) -> Result<CellValue, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::Corrupt(e.to_string()))
}

impl TabularSource for SqliteWorkspace {
    fn read_range(&self, sheet: SheetId, range: &CellRange) -> Result<Vec<Vec<CellValue>>, StoreError> {
        self.sheet(sheet)?;
        let range = range.bounded(self.last_row(sheet)?);
        let end_row = range.end_row.unwrap_or(range.start.row);
        if end_row < range.start.row {
            return Ok(Vec::new());
        }

        let height = (end_row - range.start.row + 1) as usize;
        let width = range.width() as usize;
        let mut grid = vec![vec![CellValue::Empty; width]; height];

        let mut stmt = self.conn.prepare(
            "SELECT row, col, value FROM cells
             WHERE sheet_id = ?1 AND row BETWEEN ?2 AND ?3 AND col BETWEEN ?4 AND ?5",
        )?;
        let cells = stmt
            .query_map(
                params![sheet, range.start.row, end_row, range.start.col, range.end_col],
                |row| Ok((row.get::<_, u32>(0)?, row.get::<_, u32>(1)?, row.get::<_, String>(2)?)),
            )?
            .collect::<Result<Vec<_>, _>>()?;
        for (row, col, raw) in cells {
            grid[(row - range.start.row) as usize][(col - range.start.col) as usize] =
                decode_value(&raw)?;
        }
        Ok(grid)
    }

    fn value(&self, sheet: SheetId, cell: CellRef) -> Result<CellValue, StoreError> {
        self.sheet(sheet)?;
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM cells WHERE sheet_id = ?1 AND row = ?2 AND col = ?3",
                params![sheet, cell.row, cell.col],
                |row| row.get(0),
            )
            .optional()?;
        raw.map_or(Ok(CellValue::Empty), |raw| decode_value(&raw))
    }

    fn set_value(&self, sheet: SheetId, cell: CellRef, value: &CellValue) -> Result<(), StoreError> {
        self.sheet(sheet)?;
        let cell = cell.within_sheet()?;
        if *value == CellValue::Empty {
            self.conn.execute(
                "DELETE FROM cells WHERE sheet_id = ?1 AND row = ?2 AND col = ?3",
                params![sheet, cell.row, cell.col],
            )?;
            return Ok(());
        }
        // Writing a value replaces any formula in the cell.
        self.conn.execute(
            "INSERT INTO cells (sheet_id, row, col, value, formula) VALUES (?1, ?2, ?3, ?4, NULL)
             ON CONFLICT (sheet_id, row, col) DO UPDATE SET value = excluded.value, formula = NULL",
            params![sheet, cell.row, cell.col, encode_value(value)?],
        )?;
        Ok(())
    }

    fn formula(&self, sheet: SheetId, cell: CellRef) -> Result<Option<String>, StoreError> {
        self.sheet(sheet)?;
        let formula: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT formula FROM cells WHERE sheet_id = ?1 AND row = ?2 AND col = ?3",
                params![sheet, cell.row, cell.col],
                |row| row.get(0),
            )
            .optional()?;
        Ok(formula.flatten())
    }

    fn set_formula(&self, sheet: SheetId, cell: CellRef, formula: &str) -> Result<(), StoreError> {
        self.sheet(sheet)?;
        let cell = cell.within_sheet()?;
        self.conn.execute(
            "INSERT INTO cells (sheet_id, row, col, value, formula) VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (sheet_id, row, col) DO UPDATE SET formula = excluded.formula",
            params![sheet, cell.row, cell.col, encode_value(&CellValue::Empty)?, formula],
        )?;
        Ok(())
    }

    fn last_row(&self, sheet: SheetId) -> Result<u32, StoreError> {
        let last: Option<u32> = self.conn.query_row(
            "SELECT MAX(row) FROM cells WHERE sheet_id = ?1",
            params![sheet],
            |row| row.get(0),
        )?;
        Ok(last.unwrap_or(0))
    }
}

impl SpreadsheetStore for SqliteWorkspace {
    fn create_spreadsheet(&self, name: &str) -> Result<String, StoreError> {
        let entry = self.insert_file(name, FileKind::Spreadsheet, ROOT_FOLDER_ID)?;
        self.insert_sheet(&entry.id, DEFAULT_SHEET_NAME)?;
        Ok(entry.id)
    }

    fn sheets(&self, spreadsheet_id: &str) -> Result<Vec<Sheet>, StoreError> {
        self.spreadsheet(spreadsheet_id)?;
        let mut stmt = self.conn.prepare(
            "SELECT id, spreadsheet_id, name, position FROM sheets
             WHERE spreadsheet_id = ?1 ORDER BY position",
        )?;
        let sheets = stmt
            .query_map(params![spreadsheet_id], sheet_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sheets)
    }

    fn sheet_by_name(&self, spreadsheet_id: &str, name: &str) -> Result<Option<Sheet>, StoreError> {
        Ok(self
            .sheets(spreadsheet_id)?
            .into_iter()
            .find(|sheet| sheet.name == name))
    }

    fn copy_sheet(&self, sheet: SheetId, into: &str) -> Result<Sheet, StoreError> {
        let source = self.sheet(sheet)?;
        self.spreadsheet(into)?;
        let tx = self.conn.unchecked_transaction()?;
        let copy = self.insert_sheet(into, &format!("Copy of {}", source.name))?;
        tx.execute(
            "INSERT INTO cells (sheet_id, row, col, value, formula)
             SELECT ?1, row, col, value, formula FROM cells WHERE sheet_id = ?2",
            params![copy.id, source.id],
        )?;
        tx.commit()?;
        Ok(copy)
    }

    fn delete_sheet(&self, sheet: SheetId) -> Result<(), StoreError> {
        let target = self.sheet(sheet)?;
        if self.sheets(&target.spreadsheet_id)?.len() == 1 {
            return Err(StoreError::Rejected(format!(
                "cannot delete '{}', the only sheet of its spreadsheet",
                target.name
            )));
        }
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM cells WHERE sheet_id = ?1", params![sheet])?;
        tx.execute("DELETE FROM sheets WHERE id = ?1", params![sheet])?;
        tx.execute(
            "UPDATE sheets SET position = position - 1 WHERE spreadsheet_id = ?1 AND position > ?2",
            params![target.spreadsheet_id, target.position],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn rename_sheet(&self, sheet: SheetId, name: &str) -> Result<(), StoreError> {
        let target = self.sheet(sheet)?;
        if let Some(other) = self.sheet_by_name(&target.spreadsheet_id, name)? {
            if other.id != sheet {
                return Err(StoreError::Rejected(format!(
                    "a sheet named '{}' already exists",
                    name
                )));
            }
        }
        self.conn
            .execute("UPDATE sheets SET name = ?1 WHERE id = ?2", params![name, sheet])?;
        Ok(())
    }

    fn insert_sheet(&self, spreadsheet_id: &str, name: &str) -> Result<Sheet, StoreError> {
        self.spreadsheet(spreadsheet_id)?;
        let position = self.next_position(spreadsheet_id)?;
        self.conn.execute(
            "INSERT INTO sheets (spreadsheet_id, name, position) VALUES (?1, ?2, ?3)",
            params![spreadsheet_id, name, position],
        )?;
        Ok(Sheet {
            id: self.conn.last_insert_rowid(),
            spreadsheet_id: spreadsheet_id.to_string(),
            name: name.to_string(),
            position,
        })
    }
}

impl FileStore for SqliteWorkspace {
    fn root_folder(&self) -> Result<FileEntry, StoreError> {
        self.folder(ROOT_FOLDER_ID)
    }

    fn create_folder(&self, name: &str, parent_id: &str) -> Result<FileEntry, StoreError> {
        self.insert_file(name, FileKind::Folder, parent_id)
    }

    fn create_file(&self, name: &str, folder_id: &str) -> Result<FileEntry, StoreError> {
        self.insert_file(name, FileKind::File, folder_id)
    }

    fn parents(&self, file_id: &str) -> Result<Vec<FileEntry>, StoreError> {
        self.file(file_id)?;
        let mut stmt = self.conn.prepare(
            "SELECT f.id, f.name, f.kind FROM file_parents p
             JOIN files f ON f.id = p.folder_id
             WHERE p.file_id = ?1 ORDER BY p.seq",
        )?;
        let parents = stmt
            .query_map(params![file_id], file_entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        parents.into_iter().collect()
    }

    fn files_by_name(&self, folder_id: &str, name: &str) -> Result<Vec<FileEntry>, StoreError> {
        self.folder(folder_id)?;
        let mut stmt = self.conn.prepare(
            "SELECT f.id, f.name, f.kind FROM file_parents p
             JOIN files f ON f.id = p.file_id
             WHERE p.folder_id = ?1 AND f.name = ?2 AND f.kind != 'folder'
             ORDER BY f.seq",
        )?;
        let files = stmt
            .query_map(params![folder_id, name], file_entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        files.into_iter().collect()
    }

    fn add_file(&self, folder_id: &str, file_id: &str) -> Result<(), StoreError> {
        self.folder(folder_id)?;
        self.file(file_id)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO file_parents (file_id, folder_id) VALUES (?1, ?2)",
            params![file_id, folder_id],
        )?;
        Ok(())
    }

    fn remove_file(&self, folder_id: &str, file_id: &str) -> Result<(), StoreError> {
        self.folder(folder_id)?;
        self.conn.execute(
            "DELETE FROM file_parents WHERE file_id = ?1 AND folder_id = ?2",
            params![file_id, folder_id],
        )?;
        Ok(())
    }

    fn set_sharing(&self, file_id: &str, access: Access, permission: Permission) -> Result<(), StoreError> {
        let updated = self.conn.execute(
            "UPDATE files SET access = ?1, permission = ?2 WHERE id = ?3",
            params![access.as_str(), permission.as_str(), file_id],
        )?;
        if updated == 0 {
            return Err(StoreError::not_found("file", file_id));
        }
        Ok(())
    }

    fn sharing(&self, file_id: &str) -> Result<(Access, Permission), StoreError> {
        let (access, permission): (String, String) = self
            .conn
            .query_row(
                "SELECT access, permission FROM files WHERE id = ?1",
                params![file_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found("file", file_id))?;
        match (Access::parse(&access), Permission::parse(&permission)) {
            (Some(access), Some(permission)) => Ok((access, permission)),
            _ => Err(StoreError::Corrupt(format!(
                "unknown sharing '{}/{}' on {}",
                access, permission, file_id
            ))),
        }
    }

    fn url(&self, file_id: &str) -> Result<String, StoreError> {
        let entry = self.file(file_id)?;
        Ok(match entry.kind {
            FileKind::Folder => format!("{}/drive/folders/{}", BASE_URL, entry.id),
            FileKind::Spreadsheet => format!("{}/spreadsheets/d/{}", BASE_URL, entry.id),
            FileKind::File => format!("{}/file/d/{}/view", BASE_URL, entry.id),
        })
    }
}

impl DraftMailer for SqliteWorkspace {
    fn create_draft(
        &self,
        recipients: &str,
        subject: &str,
        body: &str,
        options: &DraftOptions,
    ) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO drafts (id, recipients, subject, body, html_body) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, recipients, subject, body, options.html_body],
        )?;
        Ok(id)
    }
}
