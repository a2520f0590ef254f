//! Middleware, extractors and response helpers.

pub mod auth;
pub mod error;
pub mod flash;
pub mod rate_limit;
