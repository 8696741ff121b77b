//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{EmailAddress, NewUser, PasswordHash, User, UserId, Username};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, unique_violation_constraint,
};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    if let Some(constraint) = unique_violation_constraint(&error) {
        let field = if constraint.contains("email") {
            "email"
        } else {
            "username"
        };
        return UserPersistenceError::duplicate(field);
    }
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

/// Rebuild a domain user, rejecting rows that no longer satisfy validation.
fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let username = Username::new(&row.username).map_err(|err| {
        UserPersistenceError::query(format!("stored username for user {} is invalid: {err}", row.id))
    })?;
    let email = EmailAddress::new(&row.email).map_err(|err| {
        UserPersistenceError::query(format!("stored email for user {} is invalid: {err}", row.id))
    })?;
    let password_hash = PasswordHash::from_encoded(row.password_hash).map_err(|err| {
        UserPersistenceError::query(format!("stored hash for user {} is invalid: {err}", row.id))
    })?;
    Ok(User::new(UserId::new(row.id), username, email, password_hash))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            username: user.username.as_ref(),
            email: user.email.as_ref(),
            password_hash: user.password_hash.as_str(),
        };
        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_user(row)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.get()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn exists_with_username_or_email(
        &self,
        username: &Username,
        email: &EmailAddress,
    ) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::select(diesel::dsl::exists(
            users::table.filter(
                users::username
                    .eq(username.as_ref())
                    .or(users::email.eq(email.as_ref())),
            ),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for user row mapping and error classification.
    use super::*;
    use rstest::rstest;

    fn row(username: &str, email: &str, hash: String) -> UserRow {
        UserRow {
            id: 11,
            username: username.to_owned(),
            email: email.to_owned(),
            password_hash: hash,
        }
    }

    #[rstest]
    fn valid_rows_become_users() {
        let hash = PasswordHash::create("pw", 1_000);
        let user = row_to_user(row("alice", "alice@example.com", hash.as_str().to_owned()))
            .expect("row maps");
        assert_eq!(user.id(), UserId::new(11));
        assert_eq!(user.username().as_ref(), "alice");
        assert!(user.password_hash().verify("pw"));
    }

    #[rstest]
    fn plaintext_password_column_is_rejected() {
        let err = row_to_user(row("alice", "alice@example.com", "hunter2".to_owned()))
            .expect_err("plaintext is not a hash");
        assert!(matches!(err, UserPersistenceError::Query { .. }));
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_pool_error(PoolError::checkout("connection refused"));
        assert_eq!(err, UserPersistenceError::connection("connection refused"));
    }

    #[rstest]
    fn not_found_maps_to_query_error() {
        let err = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(err, UserPersistenceError::Query { .. }));
    }
}
