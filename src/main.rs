use std::sync::Arc;

use anyhow::Context;
use songs_api::db::{seed, Database, MemoryStore, SongStore};
use songs_api::secrets::{StoreKind, SECRET_MANAGER};
use songs_api::{app, AppState};
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

async fn connect_store() -> anyhow::Result<Arc<dyn SongStore>> {
    match SECRET_MANAGER.store_kind()? {
        StoreKind::MongoDb => {
            let url = SECRET_MANAGER.mongodb_url()?;
            let database = Database::connect(&url)
                .await
                .context("failed to connect to MongoDB")?;
            info!("📊 Connected to MongoDB at {}", SECRET_MANAGER.get("MONGODB_SERVICE"));
            Ok(Arc::new(database))
        }
        StoreKind::Memory => {
            info!("📊 Using in-memory song store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let store = connect_store().await?;

    // Seeding replaces whatever the collection held before.
    let seed_file = SECRET_MANAGER.get("SEED_FILE");
    let songs = seed::load_songs(&seed_file)?;
    let seeded = songs.len();
    store
        .replace_all(songs)
        .await
        .context("failed to seed songs collection")?;
    info!("📊 Seeded {} songs from {}", seeded, seed_file);

    let port = SECRET_MANAGER.port()?;
    let backend_url = SECRET_MANAGER.get("BACKEND_URL");
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;

    let app = app(AppState::new(store, backend_url.clone()));

    info!("🎧 Songs API listening on {}", backend_url);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_target(false)
        .init();

    if let Err(e) = run().await {
        error!("❌ {:#}", e);
        std::process::exit(1);
    }
}
