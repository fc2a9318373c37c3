//! Collaborator capabilities consumed by the pipelines.
//!
//! The pipelines never reach for an ambient "active" document: the roster
//! spreadsheet, the sheets inside it and the target folder are all passed in
//! explicitly. Each capability is a small synchronous trait so a run stays a
//! straight sequence of calls; `SqliteWorkspace` implements all of them.

pub mod sqlite;

use crate::a1::{CellRange, CellRef};
use crate::error::StoreError;
use common::model::cell::CellValue;
use common::model::draft::DraftOptions;
use common::model::sharing::{Access, Permission};
use serde::Serialize;

pub use sqlite::SqliteWorkspace;

/// Integer sheet id, stable for the life of the sheet (the `gid` in a sheet URL).
pub type SheetId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileKind {
    Folder,
    Spreadsheet,
    File,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Folder => "folder",
            FileKind::Spreadsheet => "spreadsheet",
            FileKind::File => "file",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "folder" => Some(FileKind::Folder),
            "spreadsheet" => Some(FileKind::Spreadsheet),
            "file" => Some(FileKind::File),
            _ => None,
        }
    }
}

/// A folder or file as listed by the file store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileEntry {
    pub id: String,
    pub name: String,
    pub kind: FileKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    pub id: SheetId,
    pub spreadsheet_id: String,
    pub name: String,
    pub position: u32,
}

/// Reading and writing cells of one sheet.
pub trait TabularSource {
    /// Reads a range as rows of values. Open-ended ranges stop at `last_row`.
    fn read_range(&self, sheet: SheetId, range: &CellRange) -> Result<Vec<Vec<CellValue>>, StoreError>;
    fn value(&self, sheet: SheetId, cell: CellRef) -> Result<CellValue, StoreError>;
    fn set_value(&self, sheet: SheetId, cell: CellRef, value: &CellValue) -> Result<(), StoreError>;
    fn formula(&self, sheet: SheetId, cell: CellRef) -> Result<Option<String>, StoreError>;
    fn set_formula(&self, sheet: SheetId, cell: CellRef, formula: &str) -> Result<(), StoreError>;
    /// Highest row holding any value or formula, 0 for an empty sheet.
    fn last_row(&self, sheet: SheetId) -> Result<u32, StoreError>;
}

/// Spreadsheet documents and the sheets (sections) inside them.
pub trait SpreadsheetStore {
    /// Creates a spreadsheet with one default sheet. New spreadsheets always land in the root folder.
    fn create_spreadsheet(&self, name: &str) -> Result<String, StoreError>;
    /// Sheets in tab order.
    fn sheets(&self, spreadsheet_id: &str) -> Result<Vec<Sheet>, StoreError>;
    fn sheet_by_name(&self, spreadsheet_id: &str, name: &str) -> Result<Option<Sheet>, StoreError>;
    /// Appends a copy of `sheet` (cells and formulas) to `into`, named `Copy of {name}`.
    fn copy_sheet(&self, sheet: SheetId, into: &str) -> Result<Sheet, StoreError>;
    fn delete_sheet(&self, sheet: SheetId) -> Result<(), StoreError>;
    fn rename_sheet(&self, sheet: SheetId, name: &str) -> Result<(), StoreError>;
    fn insert_sheet(&self, spreadsheet_id: &str, name: &str) -> Result<Sheet, StoreError>;
}

/// The folder hierarchy, sharing and URLs.
pub trait FileStore {
    fn root_folder(&self) -> Result<FileEntry, StoreError>;
    fn create_folder(&self, name: &str, parent_id: &str) -> Result<FileEntry, StoreError>;
    fn create_file(&self, name: &str, folder_id: &str) -> Result<FileEntry, StoreError>;
    /// Folders containing the file, in the order they were linked.
    fn parents(&self, file_id: &str) -> Result<Vec<FileEntry>, StoreError>;
    /// Children of `folder_id` whose name equals `name` exactly, in insertion order.
    fn files_by_name(&self, folder_id: &str, name: &str) -> Result<Vec<FileEntry>, StoreError>;
    fn add_file(&self, folder_id: &str, file_id: &str) -> Result<(), StoreError>;
    fn remove_file(&self, folder_id: &str, file_id: &str) -> Result<(), StoreError>;
    fn set_sharing(&self, file_id: &str, access: Access, permission: Permission) -> Result<(), StoreError>;
    fn sharing(&self, file_id: &str) -> Result<(Access, Permission), StoreError>;
    fn url(&self, file_id: &str) -> Result<String, StoreError>;
}

/// Draft creation. Nothing is sent.
pub trait DraftMailer {
    fn create_draft(
        &self,
        recipients: &str,
        subject: &str,
        body: &str,
        options: &DraftOptions,
    ) -> Result<String, StoreError>;
}
