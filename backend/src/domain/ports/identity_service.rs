//! Driving port for account registration and credential checks.
//!
//! Inbound adapters (the CLI today) call this port to register accounts and
//! authenticate without importing persistence or hashing concerns.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, Registration, User, UserId};

/// Domain use-case port for the identity store.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Create an account and return its id.
    ///
    /// Fails with [`crate::domain::ErrorCode::Conflict`] when the username or
    /// email is already registered.
    async fn register(&self, registration: &Registration) -> Result<UserId, Error>;

    /// Return the account matching the credentials.
    ///
    /// Unknown usernames and wrong passwords both fail with the same
    /// [`crate::domain::ErrorCode::Unauthorized`] error.
    async fn verify_credentials(&self, credentials: &LoginCredentials) -> Result<User, Error>;

    /// Fetch an account by id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, Error>;

    /// Fetch an account by exact username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, Error>;
}
