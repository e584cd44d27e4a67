//! CLI subcommands.

pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use thiserror::Error;

/// Errors from CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Repository(#[from] driftwood_commerce::db::RepositoryError),
}

/// Read the database URL from the environment (loading `.env` if present).
pub fn database_url() -> Result<SecretString, CommandError> {
    let _ = dotenvy::dotenv();
    std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingDatabaseUrl)
}
