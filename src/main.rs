// SPDX-License-Identifier: MIT

//! Coursetrack API Server
//!
//! Serves the course-video learning platform: signup/login, course browsing,
//! watch tracking, and the admin video-upload pipeline.

use coursetrack::{
    config::Config,
    db::FirestoreDb,
    services::{ObjectStore, PasswordVault, Thumbnailer},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Coursetrack API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Initialize object storage gateway
    let object_store = ObjectStore::new(
        &config.s3_bucket,
        &config.s3_region,
        config.s3_endpoint_url.as_deref(),
    )
    .await
    .expect("Failed to initialize object store");
    tracing::info!(bucket = %config.s3_bucket, "Object store initialized");

    // Thumbnail transcoder (external ffmpeg)
    let thumbnailer = Thumbnailer::new(&config.ffmpeg_path);

    // Password vault for the reversible credential copy
    let password_vault =
        PasswordVault::new(&config.password_key).expect("Invalid password encryption key");

    // Ensure the staging directory for uploads exists
    std::fs::create_dir_all(&config.temp_dir).expect("Failed to create upload temp directory");
    tracing::info!(temp_dir = %config.temp_dir.display(), "Upload staging directory ready");

    // Build shared state
    let state = Arc::new(AppState::new(
        config.clone(),
        db,
        password_vault,
        object_store,
        thumbnailer,
    ));

    // Build router
    let app = coursetrack::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("coursetrack=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
