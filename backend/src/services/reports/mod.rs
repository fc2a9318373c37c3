//! # Report Service Module
//!
//! Routes under `/api/reports`:
//!
//! *   **`POST /start`**: schedules a provisioning run that creates one report
//!     spreadsheet per roster name from the template sheet, skipping names that
//!     already have one in the roster's folder.

pub mod formulas;
pub mod provision;
mod start;

use actix_web::web::{post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/reports";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/start", post().to(start::process))
}
