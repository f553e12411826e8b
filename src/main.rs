//! Karibu - content and booking-analytics backend for tour marketing sites

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use karibu::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{
            SqlxBookingRepository, SqlxCategoryRepository, SqlxCommentRepository,
            SqlxCustomerRepository, SqlxInquiryRepository, SqlxPostRepository,
            SqlxReviewRepository, SqlxSubscriberRepository, SqlxTagRepository,
            SqlxTourRepository,
        },
        Database,
    },
    services::{AnalyticsService, ContentService},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "karibu=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Karibu backend...");

    // Load configuration
    let config = Config::load(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let db = Arc::new(Database::connect(&config.database).await?);
    tracing::info!("Database connected: {}", config.database.url);

    // Run migrations
    db::migrations::run_migrations(&db).await?;
    tracing::info!("Database migrations completed");

    // Wire repositories into the services
    let content = Arc::new(ContentService::new(
        SqlxPostRepository::boxed(db.clone()),
        SqlxCategoryRepository::boxed(db.clone()),
        SqlxTagRepository::boxed(db.clone()),
        SqlxCommentRepository::boxed(db.clone()),
    ));
    let analytics = Arc::new(AnalyticsService::new(
        SqlxBookingRepository::boxed(db.clone()),
        SqlxTourRepository::boxed(db.clone()),
        SqlxCustomerRepository::boxed(db.clone()),
        SqlxReviewRepository::boxed(db.clone()),
        SqlxInquiryRepository::boxed(db.clone()),
        SqlxSubscriberRepository::boxed(db.clone()),
    ));

    let state = AppState {
        db,
        content,
        analytics,
    };

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
