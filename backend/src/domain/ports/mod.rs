//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`) describe what the domain needs from storage;
//! each exposes a typed error enum so adapters map their failures into
//! predictable variants. Driving ports (`IdentityService`,
//! `FamilyTreeCommand`, `FamilyTreeQuery`) are what inbound adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod family_tree_command;
mod family_tree_query;
mod family_tree_repository;
mod genealogy_repository;
mod identity_service;
mod user_repository;

pub use family_tree_command::FamilyTreeCommand;
pub use family_tree_query::{FamilyTreeQuery, TreeView};
#[cfg(test)]
pub use family_tree_repository::MockFamilyTreeRepository;
pub use family_tree_repository::{FamilyTreeRepository, FamilyTreeRepositoryError};
#[cfg(test)]
pub use genealogy_repository::MockGenealogyRepository;
pub use genealogy_repository::{
    GenealogyRepository, GenealogyRepositoryError, IndividualRemoval,
};
pub use identity_service::IdentityService;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
