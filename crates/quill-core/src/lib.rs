//! # Quill Core
//!
//! The domain layer of the Quill blog.
//! Entities, ports, access rules, form validation and the use-case services
//! live here with zero infrastructure dependencies.

pub mod access;
pub mod domain;
pub mod error;
pub mod form;
pub mod pagination;
pub mod ports;
pub mod service;

pub use error::DomainError;
