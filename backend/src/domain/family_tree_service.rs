//! Family tree domain service.
//!
//! Implements the tree command and query driving ports. Each call resolves
//! the acting owner's tree through the [`TreeRegistry`] and then works only
//! inside that tree, so one user can never read or change another's records.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{
    FamilyTreeCommand, FamilyTreeQuery, FamilyTreeRepository, GenealogyRepository,
    GenealogyRepositoryError, IndividualRemoval, TreeView,
};
use crate::domain::{
    Error, FamilyTree, GraphPayload, Individual, IndividualDetails, IndividualId, Relationship,
    RelationshipDetails, RelationshipId, TreeRegistry, UserId, project_graph,
};

/// Tree service implementing [`FamilyTreeCommand`] and [`FamilyTreeQuery`].
pub struct FamilyTreeService<T, G> {
    registry: TreeRegistry<T>,
    genealogy: Arc<G>,
    clock: Arc<dyn Clock>,
}

impl<T, G> FamilyTreeService<T, G> {
    /// Create a service over the tree and genealogy repositories.
    pub fn new(trees: Arc<T>, genealogy: Arc<G>, clock: Arc<dyn Clock>) -> Self {
        Self {
            registry: TreeRegistry::new(trees, Arc::clone(&clock)),
            genealogy,
            clock,
        }
    }
}

fn map_genealogy_error(error: GenealogyRepositoryError) -> Error {
    match error {
        GenealogyRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("genealogy repository unavailable: {message}"))
        }
        GenealogyRepositoryError::Query { message } => {
            Error::internal(format!("genealogy repository error: {message}"))
        }
        err @ GenealogyRepositoryError::ForeignIndividual { .. } => {
            Error::invalid_request(err.to_string())
        }
        err @ GenealogyRepositoryError::NotFound { .. } => Error::not_found(err.to_string()),
    }
}

#[async_trait]
impl<T, G> FamilyTreeCommand for FamilyTreeService<T, G>
where
    T: FamilyTreeRepository,
    G: GenealogyRepository,
{
    async fn add_individual(
        &self,
        owner_id: UserId,
        details: IndividualDetails,
    ) -> Result<Individual, Error> {
        let tree_id = self.registry.resolve_or_create_tree(owner_id).await?;
        let individual = self
            .genealogy
            .insert_individual(tree_id, &details, self.clock.utc())
            .await
            .map_err(map_genealogy_error)?;
        debug!(tree_id = %tree_id, individual_id = %individual.id, "individual added");
        Ok(individual)
    }

    async fn delete_individual(
        &self,
        owner_id: UserId,
        individual_id: IndividualId,
    ) -> Result<IndividualRemoval, Error> {
        let tree_id = self.registry.resolve_or_create_tree(owner_id).await?;
        let removal = self
            .genealogy
            .delete_individual(tree_id, individual_id, self.clock.utc())
            .await
            .map_err(map_genealogy_error)?;
        debug!(
            tree_id = %tree_id,
            individual_id = %individual_id,
            removed_relationships = removal.removed_relationships,
            "individual deleted"
        );
        Ok(removal)
    }

    async fn add_relationship(
        &self,
        owner_id: UserId,
        details: RelationshipDetails,
    ) -> Result<Relationship, Error> {
        let tree_id = self.registry.resolve_or_create_tree(owner_id).await?;
        let relationship = self
            .genealogy
            .insert_relationship(tree_id, &details, self.clock.utc())
            .await
            .map_err(map_genealogy_error)?;
        debug!(tree_id = %tree_id, relationship_id = %relationship.id, "relationship added");
        Ok(relationship)
    }

    async fn delete_relationship(
        &self,
        owner_id: UserId,
        relationship_id: RelationshipId,
    ) -> Result<(), Error> {
        let tree_id = self.registry.resolve_or_create_tree(owner_id).await?;
        self.genealogy
            .delete_relationship(tree_id, relationship_id, self.clock.utc())
            .await
            .map_err(map_genealogy_error)?;
        debug!(tree_id = %tree_id, relationship_id = %relationship_id, "relationship deleted");
        Ok(())
    }
}

#[async_trait]
impl<T, G> FamilyTreeQuery for FamilyTreeService<T, G>
where
    T: FamilyTreeRepository,
    G: GenealogyRepository,
{
    async fn tree(&self, owner_id: UserId) -> Result<FamilyTree, Error> {
        self.registry.resolve_tree(owner_id).await
    }

    async fn tree_view(&self, owner_id: UserId) -> Result<TreeView, Error> {
        let tree = self.registry.resolve_tree(owner_id).await?;
        let individuals = self
            .genealogy
            .list_individuals(tree.id)
            .await
            .map_err(map_genealogy_error)?;
        let relationships = self
            .genealogy
            .list_relationships_with_names(tree.id)
            .await
            .map_err(map_genealogy_error)?;
        Ok(TreeView {
            tree,
            individuals,
            relationships,
        })
    }

    async fn graph(&self, owner_id: UserId) -> Result<GraphPayload, Error> {
        let tree_id = self.registry.resolve_or_create_tree(owner_id).await?;
        let individuals = self
            .genealogy
            .list_individuals(tree_id)
            .await
            .map_err(map_genealogy_error)?;
        let relationships = self
            .genealogy
            .list_relationships_with_names(tree_id)
            .await
            .map_err(map_genealogy_error)?;
        Ok(project_graph(
            &individuals,
            relationships.iter().map(|named| &named.relationship),
        ))
    }
}

#[cfg(test)]
mod tests;
