use std::sync::Arc;

use anyhow::Context;
use shelf_app::modules::{
    self,
    books::repository::{
        DynCatalogRepository, InMemoryCatalogRepository, PostgresCatalogRepository,
    },
    Services,
};
use shelf_db::DatabaseModule;
use shelf_kernel::{
    settings::{DatabaseBackend, Settings},
    InitCtx, ModuleRegistry,
};
use shelf_storage::{DynUploadSigner, S3UploadSigner, StorageModule};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load shelf settings")?;
    shelf_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.database.backend,
        db = %settings.database.endpoint(),
        bucket = %settings.storage.bucket,
        "shelf-app bootstrap starting"
    );

    let mut registry = ModuleRegistry::new();

    let signer: DynUploadSigner = Arc::new(S3UploadSigner::from_settings(&settings.storage).await);
    registry.register_core(Arc::new(StorageModule::new(Arc::clone(&signer))));

    let mut pool = None;
    let catalog: DynCatalogRepository = match settings.database.backend {
        DatabaseBackend::Postgres => {
            let db = shelf_db::connect(&settings.database).await?;
            registry.register_core(Arc::new(DatabaseModule::new(db.clone())));
            pool = Some(db.clone());
            Arc::new(PostgresCatalogRepository::new(db))
        }
        DatabaseBackend::Memory => {
            tracing::warn!("using the in-memory catalog; data is lost on restart");
            Arc::new(InMemoryCatalogRepository::new())
        }
    };

    modules::register_all(
        &mut registry,
        &Services {
            catalog,
            uploads: signer,
        },
    );

    if let Some(pool) = &pool {
        let applied = shelf_db::run_migrations(pool, &registry.collect_migrations())
            .await
            .context("failed to run migrations")?;
        tracing::info!(applied, "migrations complete");
    }

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    tracing::info!("shelf-app bootstrap complete");

    let served = shelf_http::start_server(&registry, &settings).await;
    let stopped = registry.stop_all().await;

    served.and(stopped)
}
