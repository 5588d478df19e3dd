use std::sync::Arc;

use anyhow::Context;
use feedback_service::{
    AppState,
    config::{Config, StoreKind},
    router,
    store::{FeedbackStore, MemoryFeedbackStore, PgFeedbackStore},
};

// ===== Main =====

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feedback_service=debug,server=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env().context("invalid configuration")?;

    let store: Arc<dyn FeedbackStore> = match config.store {
        StoreKind::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set")?;
            Arc::new(
                PgFeedbackStore::connect(database_url, config.max_connections)
                    .await
                    .context("failed to connect to database")?,
            )
        }
        StoreKind::Memory => {
            tracing::warn!("Using in-memory store, data is lost on exit");
            Arc::new(MemoryFeedbackStore::new())
        }
    };

    let addr = config.bind_addr();
    let app = router(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
