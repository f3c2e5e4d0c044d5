use anyhow::Context;
use shelf_kernel::Migration;
use sqlx::PgPool;

const LEDGER_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS shelf_migrations (
    module     TEXT        NOT NULL,
    id         TEXT        NOT NULL,
    applied_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (module, id)
)
"#;

/// Apply every migration not yet recorded in `shelf_migrations`.
///
/// Each migration runs in its own transaction together with its ledger row,
/// so a failing script leaves neither partial DDL nor a ledger entry.
/// Returns how many migrations were applied.
pub async fn run_migrations(
    pool: &PgPool,
    migrations: &[(String, Migration)],
) -> anyhow::Result<usize> {
    sqlx::query(LEDGER_DDL)
        .execute(pool)
        .await
        .context("failed to create migration ledger")?;

    let mut applied = 0;
    for (module, migration) in migrations {
        let already: Option<i32> =
            sqlx::query_scalar("SELECT 1 FROM shelf_migrations WHERE module = $1 AND id = $2")
                .bind(module.as_str())
                .bind(migration.id)
                .fetch_optional(pool)
                .await
                .with_context(|| format!("failed to read ledger for {module}/{}", migration.id))?;

        if already.is_some() {
            tracing::debug!(%module, id = migration.id, "migration already applied");
            continue;
        }

        let mut tx = pool
            .begin()
            .await
            .context("failed to open migration transaction")?;

        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("migration {module}/{} failed", migration.id))?;

        sqlx::query("INSERT INTO shelf_migrations (module, id) VALUES ($1, $2)")
            .bind(module.as_str())
            .bind(migration.id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to record migration {module}/{}", migration.id))?;

        tx.commit()
            .await
            .with_context(|| format!("failed to commit migration {module}/{}", migration.id))?;

        tracing::info!(%module, id = migration.id, "migration applied");
        applied += 1;
    }

    Ok(applied)
}
