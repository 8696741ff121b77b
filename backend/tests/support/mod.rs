//! Shared helper utilities for integration tests that need PostgreSQL.
//!
//! Integration tests compile as separate crates under `backend/tests/`, so
//! the cluster bootstrap, skip policy, and raw-SQL inspection helpers live
//! here rather than being repeated per suite.

pub mod cluster_skip;
pub mod embedded_postgres;

pub use cluster_skip::handle_cluster_setup_failure;
pub use embedded_postgres::{count_rows, provision_migrated_database, stored_password_hash};

/// Render a `postgres` error with enough detail to be useful in CI logs.
///
/// The `Display` implementation often collapses database errors to a
/// generic `db error`; prefer the SQLSTATE and server message when present.
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
