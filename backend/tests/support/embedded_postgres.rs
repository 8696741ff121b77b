//! Embedded PostgreSQL provisioning for integration tests.
//!
//! Each suite gets a fresh database on the shared cluster with the crate's
//! own embedded migrations applied, so test schemas never drift from the
//! one `family-tree migrate` installs. Row inspection goes through the
//! synchronous `postgres` client to stay outside the adapters under test.

use family_tree::outbound::persistence::run_migrations;
use pg_embedded_setup_unpriv::TemporaryDatabase;
use pg_embedded_setup_unpriv::test_support::shared_cluster_handle;
use postgres::{Client, NoTls};
use tokio::runtime::Runtime;

use super::format_postgres_error;

/// Create a temporary database and migrate it to the latest schema.
pub fn provision_migrated_database(runtime: &Runtime) -> Result<TemporaryDatabase, String> {
    let cluster = shared_cluster_handle().map_err(|err| format!("start cluster: {err:?}"))?;
    let database = cluster
        .create_temporary_database()
        .map_err(|err| format!("create database: {err:?}"))?;
    runtime
        .block_on(run_migrations(database.url()))
        .map_err(|err| format!("migrate: {err}"))?;
    Ok(database)
}

fn connect(url: &str) -> Result<Client, String> {
    Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))
}

/// Count every row of `table`.
pub fn count_rows(url: &str, table: &str) -> Result<i64, String> {
    let mut client = connect(url)?;
    let row = client
        .query_one(format!("SELECT COUNT(*) FROM {table}").as_str(), &[])
        .map_err(|err| format_postgres_error(&err))?;
    Ok(row.get(0))
}

/// Read the raw `password_hash` column for `username`.
pub fn stored_password_hash(url: &str, username: &str) -> Result<String, String> {
    let mut client = connect(url)?;
    let row = client
        .query_one(
            "SELECT password_hash FROM users WHERE username = $1",
            &[&username],
        )
        .map_err(|err| format_postgres_error(&err))?;
    Ok(row.get(0))
}
