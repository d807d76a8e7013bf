use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use chrono::NaiveTime;
use dotenvy::dotenv;
use std::sync::Arc;

mod api;
mod attendance;
mod auth;
mod config;
mod db;
mod model;
mod models;
mod routes;
mod utils;
mod docs;

use config::Config;
use db::init_db;

use crate::attendance::backfill::BackfillJob;
use crate::attendance::clock::SystemClock;
use crate::attendance::pg::{PgAttendanceStore, PgEmployeeRoster};
use crate::attendance::service::AttendanceService;
use tracing::info;
use tracing_appender::rolling;
use utoipa_swagger_ui::SwaggerUi;
use crate::docs::ApiDoc;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()

#[get("/")]
async fn index() -> impl Responder {
    "Attendance Tracker API"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await;

    let store = Arc::new(PgAttendanceStore::new(pool.clone()));
    let roster = Arc::new(PgEmployeeRoster::new(pool.clone()));
    let clock = Arc::new(SystemClock);
    let service = AttendanceService::new(store.clone(), roster.clone(), clock.clone());

    // Nightly sweep that marks yesterday's no-shows absent
    let backfill_at = NaiveTime::parse_from_str(&config.backfill_time, "%H:%M")
        .expect("BACKFILL_TIME must be HH:MM");
    let backfill = Arc::new(BackfillJob::new(store, roster, clock, backfill_at));
    actix_web::rt::spawn(backfill.run());

    // Clone values for the closure (avoid move issues)
    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(Data::new(service.clone()))
            .service(index)
            // Configure auth + protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
