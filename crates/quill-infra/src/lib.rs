//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`:
//! persistence, password hashing, tokens and rate limiting.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL repositories via SeaORM
//! - `minimal` - in-memory store only

pub mod auth;
pub mod database;
pub mod memory;
pub mod rate_limit;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::DatabaseConnections;
pub use memory::InMemoryStore;
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};
