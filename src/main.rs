mod classifier;
mod collector;
mod config;
mod error;
mod handlers;
mod models;
mod page;

use std::process::ExitCode;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use log::{error, info};

use classifier::OnnxClassifier;
use config::ServerConfig;
use handlers::AppState;

#[actix_web::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    // The session cannot proceed without a model.
    let model = match OnnxClassifier::load(&config.model_path) {
        Ok(model) => model,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let state = web::Data::new(AppState {
        model_path: model.path().display().to_string(),
        classifier: Arc::new(model),
    });

    let bind_address = config.bind_address();
    info!("Server running at http://{}", bind_address);
    info!("Workers: {}", config.workers);

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(state.clone())
            .configure(handlers::routes::<OnnxClassifier>)
    })
    .workers(config.workers)
    .bind(&bind_address);

    let result = match server {
        Ok(server) => server.run().await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Server error on {}: {}", bind_address, e);
            ExitCode::FAILURE
        }
    }
}
