//! Port for individual and relationship persistence.
//!
//! Every operation is scoped to a tree id; adapters must never return or
//! modify a record belonging to another tree. Mutations also advance the
//! tree's `last_modified_at` to the supplied timestamp within the same atomic
//! step as the write itself.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Individual, IndividualDetails, IndividualId, NamedRelationship, Relationship,
    RelationshipDetails, RelationshipId, TreeId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by genealogy repository adapters.
    pub enum GenealogyRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "genealogy repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "genealogy repository query failed: {message}",
        /// A relationship named an individual that is not in its tree.
        ForeignIndividual { tree_id: TreeId } =>
            "relationship references individuals outside tree {tree_id}",
        /// The targeted record does not exist in the tree.
        NotFound { entity: String, id: i64 } =>
            "{entity} {id} not found in this tree",
    }
}

/// Result of removing an individual together with its relationships.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndividualRemoval {
    pub individual_id: IndividualId,
    /// Relationships that referenced the individual and were removed with it.
    pub removed_relationships: usize,
}

/// Tree-scoped storage for individuals and relationships.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenealogyRepository: Send + Sync {
    /// All individuals of the tree in insertion order.
    async fn list_individuals(
        &self,
        tree_id: TreeId,
    ) -> Result<Vec<Individual>, GenealogyRepositoryError>;

    /// All relationships of the tree joined to both individuals' names.
    ///
    /// Both individuals must belong to `tree_id`; relationships failing that
    /// join predicate are omitted.
    async fn list_relationships_with_names(
        &self,
        tree_id: TreeId,
    ) -> Result<Vec<NamedRelationship>, GenealogyRepositoryError>;

    /// Insert an individual into the tree.
    async fn insert_individual(
        &self,
        tree_id: TreeId,
        details: &IndividualDetails,
        modified_at: DateTime<Utc>,
    ) -> Result<Individual, GenealogyRepositoryError>;

    /// Delete an individual of the tree and every relationship referencing it.
    ///
    /// Fails with [`GenealogyRepositoryError::NotFound`] and changes nothing
    /// when the individual is not in `tree_id`.
    async fn delete_individual(
        &self,
        tree_id: TreeId,
        individual_id: IndividualId,
        modified_at: DateTime<Utc>,
    ) -> Result<IndividualRemoval, GenealogyRepositoryError>;

    /// Insert a relationship after checking that exactly two individuals
    /// matching the requested ids belong to the tree.
    ///
    /// Fails with [`GenealogyRepositoryError::ForeignIndividual`] and inserts
    /// nothing when the membership count is not two.
    async fn insert_relationship(
        &self,
        tree_id: TreeId,
        details: &RelationshipDetails,
        modified_at: DateTime<Utc>,
    ) -> Result<Relationship, GenealogyRepositoryError>;

    /// Delete a relationship of the tree.
    ///
    /// Fails with [`GenealogyRepositoryError::NotFound`] when the relationship
    /// is not in `tree_id`.
    async fn delete_relationship(
        &self,
        tree_id: TreeId,
        relationship_id: RelationshipId,
        modified_at: DateTime<Utc>,
    ) -> Result<(), GenealogyRepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn foreign_individual_error_names_the_tree() {
        let err = GenealogyRepositoryError::foreign_individual(TreeId::new(3));
        assert_eq!(
            err.to_string(),
            "relationship references individuals outside tree 3"
        );
    }

    #[rstest]
    fn not_found_error_names_entity_and_id() {
        let err = GenealogyRepositoryError::not_found("individual", 12_i64);
        assert_eq!(err.to_string(), "individual 12 not found in this tree");
    }
}
