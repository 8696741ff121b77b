//! Family tree backend library.
//!
//! Accounts, one family tree per account, and the individuals and
//! relationships within it, laid out as a hexagon: `domain` holds entities,
//! ports, and services; `outbound` holds the PostgreSQL adapters.

pub mod config;
pub mod domain;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
