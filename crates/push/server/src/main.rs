//! Push gateway server.

use std::net::SocketAddr;

use axum::Router;
use color_eyre::eyre::WrapErr as _;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("push-server starting");

    // Initialize storage
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:push.db".to_string());

    let storage = push_storage::SqliteStorage::new(&database_url)
        .wrap_err("failed to initialize storage")?;

    storage
        .run_migrations()
        .wrap_err("failed to run migrations")?;

    // Create the dispatch engine
    let config = push_gcm::GcmConfig::from_env().wrap_err("invalid GCM configuration")?;

    if config.api_key.is_none() {
        tracing::warn!("GCM_API_KEY is not set; sends will fail until it is configured");
    }

    let transport = push_gcm::HttpTransport::new().wrap_err("failed to create transport")?;
    let dispatcher = push_gcm::GcmDispatcher::new(config, transport, storage.clone());
    let service = push_gcm::PushService::new(storage.clone(), dispatcher);

    // Build router
    let app = Router::new()
        .merge(push_http::device_router(storage))
        .merge(push_http::push_router(service))
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 8080));
    tracing::info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .wrap_err("failed to bind")?;

    axum::serve(listener, app).await.wrap_err("server error")?;

    Ok(())
}
