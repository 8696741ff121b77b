//! In-memory adapters for every driven port.
//!
//! One mutex guards all tables, so each port call is atomic in the same way
//! the Diesel adapters' transactions are. Identifiers come from per-table
//! counters starting at 1, mirroring PostgreSQL identity columns.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    FamilyTreeRepository, FamilyTreeRepositoryError, GenealogyRepository,
    GenealogyRepositoryError, IndividualRemoval, UserPersistenceError, UserRepository,
};
use crate::domain::{
    EmailAddress, FamilyTree, Individual, IndividualDetails, IndividualId, NamedRelationship,
    NewFamilyTree, NewUser, Relationship, RelationshipDetails, RelationshipId, TreeId, User,
    UserId, Username,
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    trees: Vec<FamilyTree>,
    individuals: Vec<Individual>,
    relationships: Vec<Relationship>,
    next_user_id: i64,
    next_tree_id: i64,
    next_individual_id: i64,
    next_relationship_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl Tables {
    fn touch_tree(&mut self, tree_id: TreeId, modified_at: DateTime<Utc>) {
        if let Some(tree) = self.trees.iter_mut().find(|tree| tree.id == tree_id) {
            tree.last_modified_at = modified_at;
        }
    }

    fn individual_in_tree(&self, tree_id: TreeId, id: IndividualId) -> Option<&Individual> {
        self.individuals
            .iter()
            .find(|individual| individual.id == id && individual.tree_id == tree_id)
    }
}

/// Shared in-memory store implementing the user, tree, and genealogy ports.
///
/// # Examples
/// ```
/// use family_tree::test_support::InMemoryStore;
///
/// let store = InMemoryStore::default();
/// assert_eq!(store.tree_count(), 0);
/// ```
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    fn lock(&self) -> MutexGuard<'_, Tables> {
        match self.tables.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn tree_count(&self) -> usize {
        self.lock().trees.len()
    }

    pub fn individual_count(&self) -> usize {
        self.lock().individuals.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.lock().relationships.len()
    }

    /// Store a relationship without the membership check, simulating rows
    /// written before that check existed.
    pub fn insert_unchecked_relationship(
        &self,
        tree_id: TreeId,
        details: RelationshipDetails,
    ) -> Relationship {
        let mut tables = self.lock();
        let id = RelationshipId::new(next_id(&mut tables.next_relationship_id));
        let relationship = details.into_relationship(id, tree_id);
        tables.relationships.push(relationship.clone());
        relationship
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut tables = self.lock();
        if tables
            .users
            .iter()
            .any(|existing| existing.username() == &user.username)
        {
            return Err(UserPersistenceError::duplicate("username"));
        }
        if tables
            .users
            .iter()
            .any(|existing| existing.email() == &user.email)
        {
            return Err(UserPersistenceError::duplicate("email"));
        }

        let id = UserId::new(next_id(&mut tables.next_user_id));
        let stored = User::new(
            id,
            user.username.clone(),
            user.email.clone(),
            user.password_hash.clone(),
        );
        tables.users.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock().users.iter().find(|user| user.id() == id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|user| user.username().as_ref() == username)
            .cloned())
    }

    async fn exists_with_username_or_email(
        &self,
        username: &Username,
        email: &EmailAddress,
    ) -> Result<bool, UserPersistenceError> {
        Ok(self
            .lock()
            .users
            .iter()
            .any(|user| user.username() == username || user.email() == email))
    }
}

#[async_trait]
impl FamilyTreeRepository for InMemoryStore {
    async fn find_by_owner(
        &self,
        owner_id: UserId,
    ) -> Result<Option<FamilyTree>, FamilyTreeRepositoryError> {
        Ok(self
            .lock()
            .trees
            .iter()
            .find(|tree| tree.owner_id == owner_id)
            .cloned())
    }

    async fn find_or_create(
        &self,
        tree: &NewFamilyTree,
    ) -> Result<FamilyTree, FamilyTreeRepositoryError> {
        let mut tables = self.lock();
        if let Some(existing) = tables
            .trees
            .iter()
            .find(|existing| existing.owner_id == tree.owner_id)
        {
            return Ok(existing.clone());
        }

        let created = FamilyTree {
            id: TreeId::new(next_id(&mut tables.next_tree_id)),
            name: tree.name.clone(),
            owner_id: tree.owner_id,
            description: tree.description.clone(),
            is_public: tree.is_public,
            created_at: tree.created_at,
            last_modified_at: tree.created_at,
        };
        tables.trees.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl GenealogyRepository for InMemoryStore {
    async fn list_individuals(
        &self,
        tree_id: TreeId,
    ) -> Result<Vec<Individual>, GenealogyRepositoryError> {
        Ok(self
            .lock()
            .individuals
            .iter()
            .filter(|individual| individual.tree_id == tree_id)
            .cloned()
            .collect())
    }

    async fn list_relationships_with_names(
        &self,
        tree_id: TreeId,
    ) -> Result<Vec<NamedRelationship>, GenealogyRepositoryError> {
        let tables = self.lock();
        Ok(tables
            .relationships
            .iter()
            .filter(|relationship| relationship.tree_id == tree_id)
            .filter_map(|relationship| {
                let first = tables.individual_in_tree(tree_id, relationship.individual_id1)?;
                let second = tables.individual_in_tree(tree_id, relationship.individual_id2)?;
                Some(NamedRelationship {
                    relationship: relationship.clone(),
                    name1: first.display_name(),
                    name2: second.display_name(),
                })
            })
            .collect())
    }

    async fn insert_individual(
        &self,
        tree_id: TreeId,
        details: &IndividualDetails,
        modified_at: DateTime<Utc>,
    ) -> Result<Individual, GenealogyRepositoryError> {
        let mut tables = self.lock();
        let id = IndividualId::new(next_id(&mut tables.next_individual_id));
        let individual = details.clone().into_individual(id, tree_id);
        tables.individuals.push(individual.clone());
        tables.touch_tree(tree_id, modified_at);
        Ok(individual)
    }

    async fn delete_individual(
        &self,
        tree_id: TreeId,
        individual_id: IndividualId,
        modified_at: DateTime<Utc>,
    ) -> Result<IndividualRemoval, GenealogyRepositoryError> {
        let mut tables = self.lock();
        if tables.individual_in_tree(tree_id, individual_id).is_none() {
            return Err(GenealogyRepositoryError::not_found(
                "individual",
                individual_id.get(),
            ));
        }

        let before = tables.relationships.len();
        tables.relationships.retain(|relationship| {
            relationship.individual_id1 != individual_id
                && relationship.individual_id2 != individual_id
        });
        let removed_relationships = before - tables.relationships.len();
        tables
            .individuals
            .retain(|individual| individual.id != individual_id);
        tables.touch_tree(tree_id, modified_at);

        Ok(IndividualRemoval {
            individual_id,
            removed_relationships,
        })
    }

    async fn insert_relationship(
        &self,
        tree_id: TreeId,
        details: &RelationshipDetails,
        modified_at: DateTime<Utc>,
    ) -> Result<Relationship, GenealogyRepositoryError> {
        let mut tables = self.lock();
        let requested = [details.individual_id1(), details.individual_id2()];
        let members = tables
            .individuals
            .iter()
            .filter(|individual| {
                individual.tree_id == tree_id && requested.contains(&individual.id)
            })
            .count();
        if members != 2 {
            return Err(GenealogyRepositoryError::foreign_individual(tree_id));
        }

        let id = RelationshipId::new(next_id(&mut tables.next_relationship_id));
        let relationship = details.clone().into_relationship(id, tree_id);
        tables.relationships.push(relationship.clone());
        tables.touch_tree(tree_id, modified_at);
        Ok(relationship)
    }

    async fn delete_relationship(
        &self,
        tree_id: TreeId,
        relationship_id: RelationshipId,
        modified_at: DateTime<Utc>,
    ) -> Result<(), GenealogyRepositoryError> {
        let mut tables = self.lock();
        let before = tables.relationships.len();
        tables.relationships.retain(|relationship| {
            !(relationship.id == relationship_id && relationship.tree_id == tree_id)
        });
        if tables.relationships.len() == before {
            return Err(GenealogyRepositoryError::not_found(
                "relationship",
                relationship_id.get(),
            ));
        }
        tables.touch_tree(tree_id, modified_at);
        Ok(())
    }
}
