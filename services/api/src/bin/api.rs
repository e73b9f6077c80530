//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{CsvEventStore, DbAdapter},
    config::Config,
    error::ApiError,
    web::{api_router, rest::ApiDoc, state::AppState},
};
use axum::http::{header::CONTENT_TYPE, HeaderValue, Method};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Prepare the Analytics Log ---
    let analytics = Arc::new(CsvEventStore::new(config.analytics_csv_path.clone()));
    analytics.ensure_file().await?;
    info!("Analytics log at {}", analytics.path().display());
    if config.admin.is_none() {
        info!("ADMIN_USER/ADMIN_PASSWORD not set; admin routes will answer 503.");
    }

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        analytics,
        contacts: db_adapter,
        config: config.clone(),
    });

    // --- 5. Create the Web Router ---
    let mut app = Router::new()
        .merge(api_router(app_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    if let Some(static_dir) = &config.static_dir {
        info!("Serving site from {}", static_dir.display());
        let index = ServeFile::new(static_dir.join("index.html"));
        app = app.fallback_service(ServeDir::new(static_dir).fallback(index));
    }

    if let Some(origin) = &config.cors_allowed_origin {
        let origin = origin.parse::<HeaderValue>().map_err(|e| {
            ApiError::Internal(format!("Invalid CORS_ALLOWED_ORIGIN '{}': {}", origin, e))
        })?;
        let cors = CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE]);
        app = app.layer(cors);
    }

    let app = app.layer(TraceLayer::new_for_http());

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
