//! Use-case services.
//!
//! Each operation takes the viewer explicitly, applies the access rules,
//! validates input and talks to the repositories through their ports.

mod account;
mod blog;

pub use account::{AccountService, ProfileDetail};
pub use blog::{BlogService, PostDetail};
