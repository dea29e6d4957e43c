//! Embedded schema migrations applied at startup.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::domain::ports::define_port_error;

/// SQL migrations from `backend/migrations`, compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

define_port_error! {
    /// Errors raised while applying migrations.
    pub enum MigrationError {
        /// The migration connection could not be opened.
        Connect { message: String } => "migration connection failed: {message}",
        /// A migration failed to apply.
        Apply { message: String } => "migration failed: {message}",
        /// The blocking migration task was cancelled or panicked.
        Task { message: String } => "migration task failed: {message}",
    }
}

/// Apply every pending migration to `database_url`.
///
/// Diesel's migration harness is synchronous, so the work runs on the
/// blocking thread pool over a dedicated connection. Returns the number of
/// migrations applied.
pub async fn run_pending_migrations(database_url: &str) -> Result<usize, MigrationError> {
    let url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || {
        let mut connection = PgConnection::establish(&url)
            .map_err(|err| MigrationError::connect(err.to_string()))?;
        connection
            .run_pending_migrations(MIGRATIONS)
            .map(|versions| versions.len())
            .map_err(|err| MigrationError::apply(err.to_string()))
    })
    .await
    .map_err(|err| MigrationError::task(err.to_string()))??;

    info!(applied, "database migrations applied");
    Ok(applied)
}
