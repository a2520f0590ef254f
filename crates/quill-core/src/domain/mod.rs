//! Domain entities - the core business objects.

mod comment;
mod post;
mod profile;
mod user;

pub use comment::{AuthoredComment, Comment};
pub use post::{AuthoredPost, Post};
pub use profile::{DEFAULT_AVATAR, Profile};
pub use user::{Author, CurrentUser, User};
