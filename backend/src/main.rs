mod collection;
mod config;
mod error;
mod routes;

use std::sync::Arc;

use redis::Client;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("taskfin_backend=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    let client = Client::open(config.redis_url.as_str())?;
    let pool = Arc::new(client);

    let app = routes::router(pool)
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        addr = %config.bind_addr,
        redis = %config.redis_url,
        static_dir = %config.static_dir.display(),
        "document store listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
