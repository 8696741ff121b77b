//! Identity store service: registration and credential verification.
//!
//! Password hashing is CPU bound, so both hashing and verification run on the
//! blocking thread pool.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use zeroize::Zeroizing;

use crate::domain::ports::{IdentityService, UserPersistenceError, UserRepository};
use crate::domain::{
    DEFAULT_ITERATIONS, Error, LoginCredentials, NewUser, PasswordHash, Registration, User, UserId,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// [`IdentityService`] backed by a [`UserRepository`].
pub struct AccountService<U> {
    users: Arc<U>,
    hash_iterations: u32,
}

impl<U> AccountService<U> {
    /// Create a service hashing with the production iteration count.
    pub fn new(users: Arc<U>) -> Self {
        Self {
            users,
            hash_iterations: DEFAULT_ITERATIONS,
        }
    }

    /// Override the PBKDF2 iteration count used for new hashes.
    ///
    /// Existing hashes keep the count encoded in them.
    pub fn with_hash_iterations(mut self, iterations: u32) -> Self {
        self.hash_iterations = iterations;
        self
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::Duplicate { field } => {
            Error::conflict(format!("a user with this {field} already exists"))
        }
    }
}

fn map_join_error(error: tokio::task::JoinError) -> Error {
    Error::internal(format!("password hashing task failed: {error}"))
}

#[async_trait]
impl<U> IdentityService for AccountService<U>
where
    U: UserRepository,
{
    async fn register(&self, registration: &Registration) -> Result<UserId, Error> {
        let taken = self
            .users
            .exists_with_username_or_email(registration.username(), registration.email())
            .await
            .map_err(map_user_error)?;
        if taken {
            return Err(Error::conflict("username or email already registered"));
        }

        let password = Zeroizing::new(registration.password().to_owned());
        let iterations = self.hash_iterations;
        let password_hash =
            tokio::task::spawn_blocking(move || PasswordHash::create(&password, iterations))
                .await
                .map_err(map_join_error)?;

        let new_user = NewUser {
            username: registration.username().clone(),
            email: registration.email().clone(),
            password_hash,
        };
        let user = self.users.insert(&new_user).await.map_err(map_user_error)?;
        info!(user_id = %user.id(), username = %user.username(), "registered user");
        Ok(user.id())
    }

    async fn verify_credentials(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let user = self
            .users
            .find_by_username(credentials.username())
            .await
            .map_err(map_user_error)?;

        // Unknown usernames still pay for one derivation.
        let stored = user.as_ref().map(|user| user.password_hash().clone());
        let iterations = self.hash_iterations;
        let password = Zeroizing::new(credentials.password().to_owned());
        let matches = tokio::task::spawn_blocking(move || match stored {
            Some(hash) => hash.verify(&password),
            None => PasswordHash::verify_absent(&password, iterations),
        })
        .await
        .map_err(map_join_error)?;

        match user {
            Some(user) if matches => Ok(user),
            _ => Err(Error::unauthorized(INVALID_CREDENTIALS)),
        }
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, Error> {
        self.users.find_by_id(id).await.map_err(map_user_error)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, Error> {
        self.users
            .find_by_username(username)
            .await
            .map_err(map_user_error)
    }
}
