//! Port for family tree metadata persistence.
//!
//! The [`FamilyTreeRepository`] trait owns the owner → tree mapping. Adapters
//! must make [`FamilyTreeRepository::find_or_create`] atomic so concurrent
//! first visits by the same owner still produce exactly one tree.

use async_trait::async_trait;

use crate::domain::{FamilyTree, NewFamilyTree, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by family tree repository adapters.
    pub enum FamilyTreeRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "family tree repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "family tree repository query failed: {message}",
    }
}

/// Storage for tree metadata keyed by owner.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FamilyTreeRepository: Send + Sync {
    /// Fetch the tree owned by `owner_id`, if one exists.
    async fn find_by_owner(
        &self,
        owner_id: UserId,
    ) -> Result<Option<FamilyTree>, FamilyTreeRepositoryError>;

    /// Return the tree owned by `tree.owner_id`, inserting `tree` first when
    /// the owner has none.
    ///
    /// The lookup and insert form one atomic step. When a tree already
    /// exists the supplied values are ignored.
    async fn find_or_create(
        &self,
        tree: &NewFamilyTree,
    ) -> Result<FamilyTree, FamilyTreeRepositoryError>;
}
