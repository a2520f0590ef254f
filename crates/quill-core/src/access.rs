//! Access-control rules.
//!
//! Pure predicates over the explicit viewer identity. Services compose them
//! before any mutation.

use crate::domain::{CurrentUser, Post};
use crate::error::DomainError;

/// True when `viewer` wrote `post`.
pub fn is_author(viewer: Option<&CurrentUser>, post: &Post) -> bool {
    viewer.is_some_and(|user| user.id == post.author_id)
}

pub fn require_authenticated(viewer: Option<&CurrentUser>) -> Result<&CurrentUser, DomainError> {
    viewer.ok_or(DomainError::Unauthenticated)
}

/// Registration and login are for anonymous visitors only.
pub fn require_anonymous(viewer: Option<&CurrentUser>) -> Result<(), DomainError> {
    match viewer {
        Some(_) => Err(DomainError::AlreadyAuthenticated),
        None => Ok(()),
    }
}

/// Gate for updating or deleting a post: signed in, and the author.
pub fn authorize_post_change<'a>(
    viewer: Option<&'a CurrentUser>,
    post: &Post,
) -> Result<&'a CurrentUser, DomainError> {
    let user = require_authenticated(viewer)?;
    if is_author(Some(user), post) {
        Ok(user)
    } else {
        Err(DomainError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(name: &str) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            username: name.to_string(),
        }
    }

    fn post_by(author: &CurrentUser) -> Post {
        Post::new(
            author.id,
            "Hello".into(),
            None,
            String::new(),
            "World".into(),
        )
    }

    #[test]
    fn test_author_may_change_post() {
        let alice = user("alice");
        let post = post_by(&alice);

        assert!(is_author(Some(&alice), &post));
        let allowed = authorize_post_change(Some(&alice), &post).unwrap();
        assert_eq!(allowed.username, "alice");
    }

    #[test]
    fn test_other_user_is_forbidden() {
        let alice = user("alice");
        let bob = user("bob");
        let post = post_by(&alice);

        assert!(!is_author(Some(&bob), &post));
        assert!(matches!(
            authorize_post_change(Some(&bob), &post),
            Err(DomainError::Forbidden)
        ));
    }

    #[test]
    fn test_anonymous_is_never_author() {
        let post = post_by(&user("alice"));

        assert!(!is_author(None, &post));
        assert!(matches!(
            authorize_post_change(None, &post),
            Err(DomainError::Unauthenticated)
        ));
    }

    #[test]
    fn test_require_anonymous() {
        assert!(require_anonymous(None).is_ok());
        assert!(matches!(
            require_anonymous(Some(&user("carol"))),
            Err(DomainError::AlreadyAuthenticated)
        ));
    }
}
