pub mod drive;
pub mod jobs;
pub mod lookup;
pub mod merge;
pub mod reports;
pub mod roster;

use crate::error::{AutomationError, StoreError};
use actix_web::error::BlockingError;
use actix_web::HttpResponse;
use serde::Serialize;

/// Turns the outcome of a `web::block` store call into a response.
pub(crate) fn blocking_response<T: Serialize>(
    outcome: Result<Result<T, AutomationError>, BlockingError>,
) -> HttpResponse {
    match outcome {
        Ok(Ok(value)) => HttpResponse::Ok().json(value),
        Ok(Err(e)) => error_response(&e),
        Err(e) => HttpResponse::InternalServerError().body(format!("Error: {}", e)),
    }
}

pub(crate) fn error_response(e: &AutomationError) -> HttpResponse {
    let body = format!("Error: {}", e);
    match e {
        AutomationError::MissingPrecondition(_)
        | AutomationError::InvalidInput(_)
        | AutomationError::Csv(_)
        | AutomationError::Store(StoreError::InvalidCell(_))
        | AutomationError::Store(StoreError::Rejected(_)) => HttpResponse::BadRequest().body(body),
        AutomationError::Store(StoreError::NotFound { .. }) => HttpResponse::NotFound().body(body),
        _ => HttpResponse::InternalServerError().body(body),
    }
}
