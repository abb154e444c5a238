//! content-api server: loads settings and the resource catalog, connects both stores, serves HTTP.
//!
//! Run from repo root: `cargo run -p server`

use content_api::{app, load_catalog, resolve, AppState, PgRecordStore, S3ObjectStore, Settings};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("content_api=info,server=info,tower_http=info")
            }),
        )
        .init();

    let settings = Settings::from_env()?;

    let mut catalog = load_catalog(settings.resources_path.as_deref()).await?;
    if let Some(schema) = &settings.database_schema {
        catalog.schema = schema.clone();
    }
    let model = resolve(&catalog)?;
    tracing::info!(resources = model.resources.len(), schema = %catalog.schema, "resource catalog loaded");

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await?;
    let records = Arc::new(PgRecordStore::new(pool));
    let objects = Arc::new(S3ObjectStore::connect(&settings.storage).await);

    let state = AppState::new(model, records, objects);
    let router = app(state, settings.max_body_bytes);

    let listener = TcpListener::bind(("0.0.0.0", settings.port)).await?;
    let port = listener.local_addr()?.port();
    tracing::info!("content-api listening on http://0.0.0.0:{}", port);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
