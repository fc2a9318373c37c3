//! # Merge Job Start Service
//!
//! `POST /api/merge/start` schedules a mail-merge run over one roster sheet and
//! returns its `job_id` immediately. The run itself opens its own connection to
//! the workspace database and creates one draft per eligible roster row; see
//! `drafts::draft_emails`. Poll `GET /api/jobs/{job_id}` for the outcome.

use super::drafts::draft_emails;
use crate::config::Config;
use crate::job_controller::schedule::schedule_job;
use crate::job_controller::state::JobsState;
use crate::workspace::SqliteWorkspace;
use actix_web::{web, HttpResponse, Responder};
use common::requests::StartMergeRequest;

/// The Actix web handler for `POST /api/merge/start`.
pub(crate) async fn process(
    state: web::Data<JobsState>,
    config: web::Data<Config>,
    payload: web::Json<StartMergeRequest>,
) -> impl Responder {
    let req = payload.into_inner();
    if req.spreadsheet_id.trim().is_empty() {
        return HttpResponse::BadRequest().body("spreadsheet_id must not be empty");
    }

    let database_path = config.database_path.clone();
    let job_id = schedule_job(&state, "merge", move |progress| {
        let ws = SqliteWorkspace::open(&database_path)?;
        let summary = draft_emails(&ws, &req, progress)?;
        Ok(summary.message())
    })
    .await;

    HttpResponse::Ok().json(serde_json::json!({ "job_id": job_id }))
}
