//! Driving port for tree reads.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{Error, FamilyTree, GraphPayload, Individual, NamedRelationship, UserId};

/// Everything needed to render the tree as tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeView {
    pub tree: FamilyTree,
    pub individuals: Vec<Individual>,
    pub relationships: Vec<NamedRelationship>,
}

/// Domain use-case port for reading the caller's tree.
///
/// Reads resolve the owner's tree first, creating an empty one on first
/// access.
#[async_trait]
pub trait FamilyTreeQuery: Send + Sync {
    /// Tree metadata for the owner.
    async fn tree(&self, owner_id: UserId) -> Result<FamilyTree, Error>;

    /// Individuals and name-joined relationships of the owner's tree.
    async fn tree_view(&self, owner_id: UserId) -> Result<TreeView, Error>;

    /// Node/link payload of the owner's tree.
    async fn graph(&self, owner_id: UserId) -> Result<GraphPayload, Error>;
}
