//! Shared helpers for the Diesel adapter suites.
//!
//! Integration tests compile as separate crates, so the embedded cluster
//! bootstrap and the raw-SQL helpers live here and are pulled in with
//! `mod support;`.

pub mod embedded_postgres;

pub use embedded_postgres::{provision_database, shared_cluster};

use backend::domain::UserId;
use postgres::{Client, NoTls};

/// Render a `postgres` error with its SQLSTATE and message.
///
/// `postgres::Error`'s `Display` collapses database errors to `db error`.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut summary = format!(
        "postgres error {:?}: {}",
        db_error.code(),
        db_error.message()
    );
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}

/// Open a plain client for seeding and assertions.
pub fn connect(url: &str) -> Result<Client, String> {
    Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))
}

/// Insert an account row directly and return its id.
///
/// The adapters under test only need the row to satisfy foreign keys, so the
/// password hash is a placeholder.
pub fn seed_user(url: &str, username: &str) -> Result<UserId, String> {
    let id = UserId::random();
    let email = format!("{username}@example.com");
    connect(url)?
        .execute(
            "INSERT INTO users (id, username, email, password_hash) VALUES ($1, $2, $3, $4)",
            &[id.as_uuid(), &username, &email, &"unused"],
        )
        .map_err(|err| format_postgres_error(&err))?;
    Ok(id)
}

/// Whether `SKIP_TEST_CLUSTER` is set to a truthy value.
fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip with a marker when `SKIP_TEST_CLUSTER` is truthy, otherwise fail loudly.
#[expect(clippy::print_stderr, reason = "skip marker for CI logs")]
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}
