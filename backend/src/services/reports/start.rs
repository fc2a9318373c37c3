use super::provision::provision_reports;
use crate::config::Config;
use crate::job_controller::schedule::schedule_job;
use crate::job_controller::state::JobsState;
use crate::workspace::SqliteWorkspace;
use actix_web::{web, HttpResponse, Responder};
use common::requests::ProvisionReportsRequest;

/// Handler for `POST /api/reports/start`. Returns `{ "job_id": ... }` right away.
pub(crate) async fn process(
    state: web::Data<JobsState>,
    config: web::Data<Config>,
    payload: web::Json<ProvisionReportsRequest>,
) -> impl Responder {
    let req = payload.into_inner();
    if req.spreadsheet_id.trim().is_empty() {
        return HttpResponse::BadRequest().body("spreadsheet_id must not be empty");
    }

    let database_path = config.database_path.clone();
    let job_id = schedule_job(&state, "reports", move |progress| {
        let ws = SqliteWorkspace::open(&database_path)?;
        let summary = provision_reports(&ws, &req, progress)?;
        Ok(summary.message())
    })
    .await;

    HttpResponse::Ok().json(serde_json::json!({ "job_id": job_id }))
}
