use actix_cors::Cors;
use actix_multipart::form::MultipartFormConfig;
use actix_web::{http::header, middleware::NormalizePath, web, App, HttpServer};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

use portfolio_api::{
    db::postgres::create_pool, graceful_shutdown::shutdown_signal,
    middlewares::auth::AuthMiddleware, routes::configure_routes, settings::AppConfig, AppState,
};

// Certifications accept PDFs up to 10MB; the per-field limits in the
// typed forms enforce the tighter 5MB image cap.
const MULTIPART_TOTAL_LIMIT: usize = 10 * 1024 * 1024;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match AppConfig::new() {
        Ok(cfg) => {
            tracing::info!("Loaded configuration: {:?}", cfg);
            cfg
        }
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let pool = create_pool(&config.database_url)
        .await
        .expect("Failed to create database connection pool");

    let app_state = web::Data::new(AppState::new(&config, pool));

    let server_addr = format!("{}:{}", config.host, config.port);
    tracing::info!(
        "Starting {} v{} on {}",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    let cors_origins = config.cors_origins();
    let worker_count = config.worker_count;

    let server = HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(3600);
        for origin in &cors_origins {
            cors = if origin == "*" {
                cors.allow_any_origin()
            } else {
                cors.allowed_origin(origin)
            };
        }

        App::new()
            .app_data(app_state.clone())
            .app_data(
                MultipartFormConfig::default()
                    .total_limit(MULTIPART_TOTAL_LIMIT)
                    .memory_limit(2 * 1024 * 1024),
            )
            // AuthMiddleware requires a BoxBody service beneath it, so it
            // goes on before TracingLogger changes the body type.
            .wrap(NormalizePath::trim())
            .wrap(AuthMiddleware)
            .wrap(TracingLogger::default())
            .wrap(cors)
            .configure(configure_routes)
    })
    .workers(worker_count)
    .bind(server_addr)?
    .run();

    tokio::select! {
        res = server => res,
        _ = shutdown_signal() => Ok(()),
    }
}
