//! Application bootstrap.

use anyhow::Context;
use vitrine_db::DocumentStore;
use vitrine_kernel::{
    settings::{DatabaseSettings, Settings},
    InitCtx, ModuleRegistry,
};

use crate::modules;

/// Open the document store described by `settings`.
pub async fn open_store(settings: &DatabaseSettings) -> anyhow::Result<DocumentStore> {
    match &settings.path {
        Some(path) => DocumentStore::open(path)
            .await
            .with_context(|| format!("failed to open document store at {}", path.display())),
        None => {
            tracing::warn!(
                database = %settings.name,
                "no database path configured; using an in-memory store"
            );
            Ok(DocumentStore::in_memory())
        }
    }
}

/// Registry with every application module registered against `store`.
pub fn build_registry(store: &DocumentStore, settings: &Settings) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store, settings);
    registry
}

/// Run the full service lifecycle until the HTTP server shuts down.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        db = ?settings.database.path,
        "vitrine bootstrap starting"
    );

    let store = open_store(&settings.database).await?;
    let registry = build_registry(&store, &settings);
    let ctx = InitCtx {
        settings: &settings,
        db: &store,
    };

    registry.init_modules(&ctx).await?;
    registry.ensure_indexes(&store).await?;
    registry.start_modules(&ctx).await?;

    tracing::info!("vitrine bootstrap complete");

    let served = vitrine_http::start_server(&registry, &settings).await;
    registry.stop_modules().await?;
    served
}
