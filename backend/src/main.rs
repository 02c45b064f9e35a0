mod analytics;
mod config;
mod error;
mod export;
mod fetcher;
mod job_controller;
mod services;
mod source;
mod table;
mod timestamps;

use crate::config::AppConfig;
use crate::job_controller::state::DashboardState;
use actix_web::{web, App, HttpServer};
use common::model::filter::FilterSpec;
use env_logger::Env;
use log::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let config = AppConfig::from_env();
    let (host, port) = config.bind_address();

    let source = config
        .build_source()
        .map_err(|e| std::io::Error::other(format!("cannot open {:?} source: {}", config.source, e)))?;
    info!("using {:?} query service", config.source);

    // Initialize dashboard state
    let (state, rx) = DashboardState::new(source);

    // Start cycle updater task
    let updater_state = state.clone();
    tokio::spawn(async move {
        job_controller::state::start_cycle_updater(updater_state, rx).await;
    });

    // Initial load with no constraint
    state.issue(FilterSpec::default()).await;

    info!("Server running at http://{}:{}", host, port);

    let config = web::Data::new(config);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(config.clone())
            .service(services::complaints::configure_routes())
            .service(services::aggregations::configure_routes())
            .service(services::export::configure_routes())
    })
    .workers(1)
    .bind((host.as_str(), port))?
    .run()
    .await
}
