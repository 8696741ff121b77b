//! Test utilities shared by unit tests (in `src/`) and integration tests
//! (in `tests/`).
//!
//! Compiled for `cfg(test)` and when the `test-support` feature is enabled.

mod clock;
mod in_memory;

pub use clock::MutableClock;
pub use in_memory::InMemoryStore;
