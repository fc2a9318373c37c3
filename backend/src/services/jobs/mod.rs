use crate::job_controller::state::JobsState;
use actix_web::{web, HttpResponse, Responder};

const API_PATH: &str = "/api/jobs";

pub fn configure_routes() -> actix_web::Scope {
    web::scope(API_PATH).route("/{job_id}", web::get().to(process))
}

/// `GET /api/jobs/{job_id}`: the latest status of a merge or report job.
async fn process(job_id: web::Path<String>, state: web::Data<JobsState>) -> impl Responder {
    match state.status(&job_id.into_inner()).await {
        Some(status) => HttpResponse::Ok().json(status),
        None => HttpResponse::NotFound().body("Job ID not found"),
    }
}
