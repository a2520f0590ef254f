//! # Quill Shared
//!
//! Request and response types exchanged with clients.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
