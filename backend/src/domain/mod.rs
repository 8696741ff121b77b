//! Domain primitives, aggregates, and services.
//!
//! Purpose: define strongly typed entities for accounts and family trees,
//! the validation that guards them, and the services implementing the
//! driving ports. Keep types immutable where possible and document
//! invariants and serialisation contracts (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - UserId, TreeId, IndividualId, RelationshipId: record identifiers.
//! - User, Registration, LoginCredentials, PasswordHash: identity store.
//! - FamilyTree, Individual, Relationship: genealogy records.
//! - GraphPayload / project_graph: visualisation projection.
//! - AccountService, TreeRegistry, FamilyTreeService: domain services.

pub mod account_service;
pub mod auth;
pub mod error;
pub mod family_tree;
pub mod family_tree_service;
pub mod genealogy;
pub mod graph;
pub mod ids;
pub mod password;
pub mod ports;
pub mod tree_registry;
pub mod user;

pub use self::account_service::AccountService;
pub use self::auth::{CredentialsValidationError, LoginCredentials, Registration};
pub use self::error::{Error, ErrorCode};
pub use self::family_tree::{FamilyTree, NewFamilyTree, default_tree_name};
pub use self::family_tree_service::FamilyTreeService;
pub use self::genealogy::{
    GenealogyValidationError, Individual, IndividualDetails, IndividualDetailsBuilder,
    NamedRelationship, Relationship, RelationshipDetails, normalize_optional,
};
pub use self::graph::{GraphLink, GraphNode, GraphPayload, project_graph};
pub use self::ids::{IndividualId, RelationshipId, TreeId, UserId};
pub use self::password::{DEFAULT_ITERATIONS, PasswordHash, PasswordHashError};
pub use self::tree_registry::TreeRegistry;
pub use self::user::{EmailAddress, NewUser, USERNAME_MAX, User, UserValidationError, Username};

/// Convenient domain result alias.
///
/// # Examples
/// ```
/// use family_tree::domain::{DomainResult, Error};
///
/// fn lookup() -> DomainResult<()> {
///     Err(Error::not_found("individual 3 not found in this tree"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
