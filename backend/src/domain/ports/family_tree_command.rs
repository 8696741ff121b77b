//! Driving port for tree mutations.
//!
//! Every call names the acting user; the implementation resolves that user's
//! tree and never reaches into another owner's records.

use async_trait::async_trait;

use crate::domain::{
    Error, Individual, IndividualDetails, IndividualId, Relationship, RelationshipDetails,
    RelationshipId, UserId,
};

use super::IndividualRemoval;

/// Domain use-case port for editing the caller's tree.
#[async_trait]
pub trait FamilyTreeCommand: Send + Sync {
    /// Add a person to the owner's tree.
    async fn add_individual(
        &self,
        owner_id: UserId,
        details: IndividualDetails,
    ) -> Result<Individual, Error>;

    /// Remove a person, and every relationship naming them, from the owner's
    /// tree.
    async fn delete_individual(
        &self,
        owner_id: UserId,
        individual_id: IndividualId,
    ) -> Result<IndividualRemoval, Error>;

    /// Link two people of the owner's tree.
    ///
    /// Fails with [`crate::domain::ErrorCode::InvalidRequest`] when either
    /// individual lies outside the tree.
    async fn add_relationship(
        &self,
        owner_id: UserId,
        details: RelationshipDetails,
    ) -> Result<Relationship, Error>;

    /// Remove a relationship from the owner's tree.
    async fn delete_relationship(
        &self,
        owner_id: UserId,
        relationship_id: RelationshipId,
    ) -> Result<(), Error>;
}
