use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{middleware::Logger, web, App, HttpServer};
use jsonwebtoken::Validation;

mod config;
mod errors;
mod feed;
mod handlers;
mod models;
mod schema;
mod service;
mod store;
mod utils;

use config::AppConfig;
use errors::ServerError;
use service::NoteService;
use store::{MemoryNoteStore, NoteStore, PgNoteStore};

pub struct AppState {
    pub secret: String,
    pub jwt_validator: Validation,
}

impl AppState {
    pub fn new(secret: String) -> Self {
        AppState {
            secret,
            jwt_validator: Validation::default(),
        }
    }
}

fn startup_error(e: ServerError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

fn open_store(config: &AppConfig) -> Result<Arc<dyn NoteStore>, ServerError> {
    match &config.database_url {
        Some(database_url) => {
            let pool = store::postgres::build_pool(database_url)?;
            store::postgres::run_migrations(&pool)?;
            Ok(Arc::new(PgNoteStore::new(pool)))
        }
        None => {
            log::warn!("DATABASE_URL is not set, notes are kept in memory");
            Ok(Arc::new(MemoryNoteStore::new()))
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(startup_error)?;
    let service = web::Data::new(NoteService::new(
        open_store(&config).map_err(startup_error)?,
    ));
    let state = web::Data::new(AppState::new(config.secret_key.clone()));
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(config.rate_limit_per_second)
        .burst_size(config.rate_limit_burst)
        .finish()
        .ok_or_else(|| startup_error(ServerError::EnvironmentError))?;

    log::info!("listening on 0.0.0.0:{}", config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(service.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Governor::new(&governor_conf))
            .wrap(Logger::default())
            .configure(handlers::config)
    })
    .bind(("0.0.0.0", config.port))?
    .run()
    .await
}
