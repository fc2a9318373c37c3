mod a1;
mod config;
mod error;
mod job_controller;
mod services;
mod workspace;

use crate::config::Config;
use crate::job_controller::state::{start_job_updater, JobsState};
use crate::workspace::SqliteWorkspace;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    // Create the schema and root folder up front so the first request does not race on it.
    if let Err(e) = SqliteWorkspace::open(&config.database_path) {
        error!("Cannot open workspace {}: {}", config.database_path.display(), e);
        return Err(std::io::Error::other(e.to_string()));
    }

    let (jobs_state, rx) = JobsState::new(100);
    let updater_state = jobs_state.clone();
    tokio::spawn(async move {
        start_job_updater(updater_state, rx).await;
    });

    info!(
        "Server running at {} (workspace {})",
        config.bind_url(),
        config.database_path.display()
    );

    let bind = (config.host.clone(), config.port);
    let json_limit = config.json_limit;
    let config = web::Data::new(config);
    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(json_limit))
            .app_data(web::Data::new(jobs_state.clone()))
            .app_data(config.clone())
            .service(services::merge::configure_routes())
            .service(services::reports::configure_routes())
            .service(services::roster::configure_routes())
            .service(services::drive::configure_routes())
            .service(services::jobs::configure_routes())
    })
    .bind(bind)?
    .run()
    .await
}
