//! Build test results server - Main entry point.
//!
//! Starts the Actix-web server storing and serving build test results.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use btr_lib::api::{self, ApiDoc, SharedCatalog};
use btr_lib::config::Config;
use btr_lib::db::DbPool;
use btr_lib::i18n::BuiltinCatalog;
use btr_lib::middleware::RequestLogger;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        std::process::exit(1);
    }

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, BTR_DATABASE_URL must point to PostgreSQL");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Build Test Results Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
        info!("Using development default for BTR_DATABASE_URL");
    }

    let pool = match DbPool::new(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };
    info!("Database connection established");

    if let Err(e) = pool.run_migrations().await {
        error!("Failed to run migrations: {}", e);
        std::process::exit(1);
    }
    info!("Database migrations complete");

    let bind_address = config.bind_address();
    let catalog: SharedCatalog = Arc::new(BuiltinCatalog);

    let worker_count = if config.is_development() {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!("Starting server at http://{} ({} workers)", bind_address, cpus);
        cpus
    };

    HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(catalog.clone()))
            .configure(api::configure_health_routes)
            .configure(api::configure_test_results_routes)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .workers(worker_count)
    .bind(&bind_address)?
    .run()
    .await
}
