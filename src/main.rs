use person_registry_infrastructure::files::LocalFileManager;
use person_registry_infrastructure::persistence::{schema, DatabaseConfig};
use person_registry_interface::http::{router, AppState};
use std::env;
use std::net::SocketAddr;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = DatabaseConfig::from_env()?;
    let pool = config.connect().await?;
    schema::run_migrations(&pool).await?;

    let photo_dir = env::var("REGISTRY_PHOTO_DIR").unwrap_or_else(|_| "photos".to_string());
    LocalFileManager::new(&photo_dir).init().await?;

    let addr: SocketAddr = env::var("REGISTRY_HTTP_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
        .parse()?;

    let state = AppState::postgres(pool, photo_dir);
    let app = router(state);

    info!(%addr, "starting person registry server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
