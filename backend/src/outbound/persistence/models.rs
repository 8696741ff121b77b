//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Each row converts field by field into its
//! domain record.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Nullable, Text};

use crate::domain::{
    FamilyTree, Individual, IndividualId, NamedRelationship, Relationship, RelationshipId, TreeId,
    UserId,
};

use super::schema::{family_trees, individuals, relationships, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

// ---------------------------------------------------------------------------
// Family tree models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = family_trees)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FamilyTreeRow {
    pub id: i64,
    pub tree_name: String,
    pub owner_id: i64,
    pub description: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
}

impl From<FamilyTreeRow> for FamilyTree {
    fn from(row: FamilyTreeRow) -> Self {
        Self {
            id: TreeId::new(row.id),
            name: row.tree_name,
            owner_id: UserId::new(row.owner_id),
            description: row.description,
            is_public: row.is_public,
            created_at: row.created_at,
            last_modified_at: row.last_modified_at,
        }
    }
}

/// Insertable struct for creating a tree; `last_modified_at` starts equal to
/// `created_at`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = family_trees)]
pub(crate) struct NewFamilyTreeRow<'a> {
    pub tree_name: &'a str,
    pub owner_id: i64,
    pub description: Option<&'a str>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Genealogy models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = individuals)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct IndividualRow {
    pub id: i64,
    pub tree_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub birth_date: String,
    pub death_date: Option<String>,
    pub occupation: String,
}

impl From<IndividualRow> for Individual {
    fn from(row: IndividualRow) -> Self {
        Self {
            id: IndividualId::new(row.id),
            tree_id: TreeId::new(row.tree_id),
            first_name: row.first_name,
            last_name: row.last_name,
            gender: row.gender,
            birth_date: row.birth_date,
            death_date: row.death_date,
            occupation: row.occupation,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = individuals)]
pub(crate) struct NewIndividualRow<'a> {
    pub tree_id: i64,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub gender: &'a str,
    pub birth_date: &'a str,
    pub death_date: Option<&'a str>,
    pub occupation: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = relationships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RelationshipRow {
    pub id: i64,
    pub tree_id: i64,
    pub individual_id1: i64,
    pub individual_id2: i64,
    pub relationship_type: String,
    pub start_date: String,
    pub end_date: Option<String>,
}

impl From<RelationshipRow> for Relationship {
    fn from(row: RelationshipRow) -> Self {
        Self {
            id: RelationshipId::new(row.id),
            tree_id: TreeId::new(row.tree_id),
            individual_id1: IndividualId::new(row.individual_id1),
            individual_id2: IndividualId::new(row.individual_id2),
            relationship_type: row.relationship_type,
            start_date: row.start_date,
            end_date: row.end_date,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = relationships)]
pub(crate) struct NewRelationshipRow<'a> {
    pub tree_id: i64,
    pub individual_id1: i64,
    pub individual_id2: i64,
    pub relationship_type: &'a str,
    pub start_date: &'a str,
    pub end_date: Option<&'a str>,
}

/// Relationship joined with both individuals' names, loaded by raw SQL.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct NamedRelationshipRow {
    #[diesel(sql_type = BigInt)]
    pub id: i64,
    #[diesel(sql_type = BigInt)]
    pub tree_id: i64,
    #[diesel(sql_type = BigInt)]
    pub individual_id1: i64,
    #[diesel(sql_type = BigInt)]
    pub individual_id2: i64,
    #[diesel(sql_type = Text)]
    pub relationship_type: String,
    #[diesel(sql_type = Text)]
    pub start_date: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub end_date: Option<String>,
    #[diesel(sql_type = Text)]
    pub first_name1: String,
    #[diesel(sql_type = Text)]
    pub last_name1: String,
    #[diesel(sql_type = Text)]
    pub first_name2: String,
    #[diesel(sql_type = Text)]
    pub last_name2: String,
}

impl From<NamedRelationshipRow> for NamedRelationship {
    fn from(row: NamedRelationshipRow) -> Self {
        Self {
            name1: format!("{} {}", row.first_name1, row.last_name1),
            name2: format!("{} {}", row.first_name2, row.last_name2),
            relationship: Relationship {
                id: RelationshipId::new(row.id),
                tree_id: TreeId::new(row.tree_id),
                individual_id1: IndividualId::new(row.individual_id1),
                individual_id2: IndividualId::new(row.individual_id2),
                relationship_type: row.relationship_type,
                start_date: row.start_date,
                end_date: row.end_date,
            },
        }
    }
}
