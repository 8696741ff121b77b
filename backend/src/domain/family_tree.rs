//! Family tree metadata.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ids::{TreeId, UserId};

/// Name given to a tree created on its owner's first visit.
///
/// # Examples
/// ```
/// use family_tree::domain::{UserId, default_tree_name};
///
/// assert_eq!(default_tree_name(UserId::new(4)), "4's Family Tree");
/// ```
pub fn default_tree_name(owner_id: UserId) -> String {
    format!("{owner_id}'s Family Tree")
}

/// A named collection of individuals and relationships owned by one user.
///
/// ## Invariants
/// - At most one tree exists per `owner_id`.
/// - `last_modified_at` is never earlier than `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyTree {
    pub id: TreeId,
    pub name: String,
    pub owner_id: UserId,
    pub description: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
}

/// Tree awaiting insertion; the repository assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFamilyTree {
    pub name: String,
    pub owner_id: UserId,
    pub description: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

impl NewFamilyTree {
    /// Private, undescribed tree with the default name for `owner_id`.
    pub fn default_for(owner_id: UserId, created_at: DateTime<Utc>) -> Self {
        Self {
            name: default_tree_name(owner_id),
            owner_id,
            description: None,
            is_public: false,
            created_at,
        }
    }
}
