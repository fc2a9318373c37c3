pub mod import;

use actix_web::web;

const API_PATH: &str = "/api/roster";

pub fn configure_routes() -> actix_web::Scope {
    web::scope(API_PATH).route("/import", web::post().to(import::process))
}
