//! In-memory persistence - used by tests and when no database is configured.
//!
//! Data is lost on process restart.

mod store;

pub use store::InMemoryStore;

#[cfg(test)]
mod tests;
