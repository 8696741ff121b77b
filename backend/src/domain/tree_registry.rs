//! Owner to tree resolution.
//!
//! Every user owns exactly one tree. The tree is created lazily the first
//! time any operation needs it, so callers never handle a "no tree yet"
//! state.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::ports::{FamilyTreeRepository, FamilyTreeRepositoryError};
use crate::domain::{Error, FamilyTree, NewFamilyTree, TreeId, UserId};

/// Resolves an owner's tree, creating it on first access.
pub struct TreeRegistry<T> {
    trees: Arc<T>,
    clock: Arc<dyn Clock>,
}

impl<T> TreeRegistry<T> {
    /// Create a registry over the given repository.
    pub fn new(trees: Arc<T>, clock: Arc<dyn Clock>) -> Self {
        Self { trees, clock }
    }
}

impl<T> TreeRegistry<T>
where
    T: FamilyTreeRepository,
{
    fn map_tree_error(error: FamilyTreeRepositoryError) -> Error {
        match error {
            FamilyTreeRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("tree repository unavailable: {message}"))
            }
            FamilyTreeRepositoryError::Query { message } => {
                Error::internal(format!("tree repository error: {message}"))
            }
        }
    }

    /// Return the id of the tree owned by `owner_id`, creating the tree when
    /// the owner has none.
    pub async fn resolve_or_create_tree(&self, owner_id: UserId) -> Result<TreeId, Error> {
        self.resolve_tree(owner_id).await.map(|tree| tree.id)
    }

    /// Return the full tree owned by `owner_id`, creating it when the owner
    /// has none.
    pub async fn resolve_tree(&self, owner_id: UserId) -> Result<FamilyTree, Error> {
        if let Some(tree) = self
            .trees
            .find_by_owner(owner_id)
            .await
            .map_err(Self::map_tree_error)?
        {
            return Ok(tree);
        }

        let candidate = NewFamilyTree::default_for(owner_id, self.clock.utc());
        let tree = self
            .trees
            .find_or_create(&candidate)
            .await
            .map_err(Self::map_tree_error)?;
        info!(owner_id = %owner_id, tree_id = %tree.id, "family tree provisioned");
        Ok(tree)
    }
}
