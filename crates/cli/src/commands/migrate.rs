//! Run commerce database migrations.

use super::CommandError;

/// Apply all pending migrations from `crates/commerce/migrations/`.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a migration
/// fails.
pub async fn run() -> Result<(), CommandError> {
    let url = super::database_url()?;
    let pool = driftwood_commerce::db::create_pool(&url).await?;

    tracing::info!("Running commerce migrations");
    driftwood_commerce::db::MIGRATOR.run(&pool).await?;
    tracing::info!("Migrations complete");

    Ok(())
}
