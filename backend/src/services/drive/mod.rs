//! # Workspace Service Module
//!
//! The minimal file-store surface needed to set up a roster by hand:
//!
//! *   **`POST /folders`**: creates a folder under `parent_id` (the root folder when omitted).
//! *   **`POST /spreadsheets`**: creates a spreadsheet, then moves it from the root into `folder_id`.
//! *   **`POST /files`**: creates a plain file, the kind the mail merge links to.
//! *   **`GET /drafts`**: lists every draft the mail merge has created.

use crate::config::Config;
use crate::error::{AutomationError, StoreError};
use crate::services::blocking_response;
use crate::workspace::sqlite::ROOT_FOLDER_ID;
use crate::workspace::{FileEntry, FileStore, SpreadsheetStore, SqliteWorkspace};
use actix_web::web::{get, post, scope};
use actix_web::{web, Responder, Scope};
use common::model::draft::StoredDraft;
use common::requests::{CreateFileRequest, CreateFolderRequest, CreateSpreadsheetRequest};

const API_PATH: &str = "/api/workspace";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/folders", post().to(create_folder))
        .route("/spreadsheets", post().to(create_spreadsheet))
        .route("/files", post().to(create_file))
        .route("/drafts", get().to(list_drafts))
}

async fn create_folder(config: web::Data<Config>, payload: web::Json<CreateFolderRequest>) -> impl Responder {
    let req = payload.into_inner();
    let path = config.database_path.clone();
    blocking_response(
        web::block(move || -> Result<FileEntry, AutomationError> {
            let ws = SqliteWorkspace::open(&path)?;
            let parent = req.parent_id.as_deref().unwrap_or(ROOT_FOLDER_ID);
            Ok(ws.create_folder(&req.name, parent)?)
        })
        .await,
    )
}

async fn create_spreadsheet(
    config: web::Data<Config>,
    payload: web::Json<CreateSpreadsheetRequest>,
) -> impl Responder {
    let req = payload.into_inner();
    let path = config.database_path.clone();
    blocking_response(
        web::block(move || -> Result<String, AutomationError> {
            let ws = SqliteWorkspace::open(&path)?;
            Ok(place_spreadsheet(&ws, &req)?)
        })
        .await,
    )
}

async fn create_file(config: web::Data<Config>, payload: web::Json<CreateFileRequest>) -> impl Responder {
    let req = payload.into_inner();
    let path = config.database_path.clone();
    blocking_response(
        web::block(move || -> Result<FileEntry, AutomationError> {
            let ws = SqliteWorkspace::open(&path)?;
            Ok(ws.create_file(&req.name, &req.folder_id)?)
        })
        .await,
    )
}

async fn list_drafts(config: web::Data<Config>) -> impl Responder {
    let path = config.database_path.clone();
    blocking_response(
        web::block(move || -> Result<Vec<StoredDraft>, AutomationError> {
            let ws = SqliteWorkspace::open(&path)?;
            Ok(ws.drafts()?)
        })
        .await,
    )
}

/// Creates the spreadsheet with its extra sheets and files it under `folder_id`.
pub fn place_spreadsheet<W>(ws: &W, req: &CreateSpreadsheetRequest) -> Result<String, StoreError>
where
    W: SpreadsheetStore + FileStore,
{
    let root = ws.root_folder()?;
    let id = ws.create_spreadsheet(&req.name)?;
    for sheet in &req.sheets {
        ws.insert_sheet(&id, sheet)?;
    }
    ws.add_file(&req.folder_id, &id)?;
    if req.folder_id != root.id {
        ws.remove_file(&root.id, &id)?;
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spreadsheet_is_filed_with_extra_sheets() {
        let ws = SqliteWorkspace::open_in_memory().unwrap();
        let folder = ws.create_folder("Class", ROOT_FOLDER_ID).unwrap();
        let req = CreateSpreadsheetRequest {
            name: "Roster".to_string(),
            folder_id: folder.id.clone(),
            sheets: vec!["Report Card".to_string(), "Master".to_string()],
        };

        let id = place_spreadsheet(&ws, &req).unwrap();
        let names: Vec<String> = ws.sheets(&id).unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Sheet1", "Report Card", "Master"]);
        assert_eq!(ws.parents(&id).unwrap(), vec![folder]);
    }

    #[test]
    fn unknown_folder_is_an_error() {
        let ws = SqliteWorkspace::open_in_memory().unwrap();
        let req = CreateSpreadsheetRequest {
            name: "Roster".to_string(),
            folder_id: "missing".to_string(),
            sheets: Vec::new(),
        };
        assert!(place_spreadsheet(&ws, &req).is_err());
    }
}
