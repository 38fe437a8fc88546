mod canteens;
mod config;
mod db;
mod errors;
mod ingestion;
mod middleware;
mod models;
mod routes;
mod services;
mod utils;

use actix_web::{App, HttpServer, web};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let app_config = config::AppConfig::from_env();

    tracing::info!("connecting to database");
    let db = db::establish_connection()
        .await
        .expect("Failed to connect to database");
    db::create_tables(&db)
        .await
        .expect("Failed to create tables");
    tracing::info!("database ready");

    // Background menu ingestion, independent of the request path.
    tokio::spawn(ingestion::pipeline::run_scheduled(
        db.clone(),
        app_config.menu_base_url.clone(),
        app_config.ingest_interval,
    ));

    tracing::info!(addr = %app_config.bind_addr, "starting server");
    let bind_addr = app_config.bind_addr.clone();

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::new(app_config.clone()))
            .configure(routes::configure_routes)
    })
    .bind(bind_addr)?
    .run()
    .await
}
