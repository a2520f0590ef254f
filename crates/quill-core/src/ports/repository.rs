use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{AuthoredComment, AuthoredPost, Comment, Post, Profile, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity. `RepoError::NotFound` if it is gone.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with account-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Persist a new user and its profile as one unit.
    async fn create_with_profile(&self, user: User, profile: Profile) -> Result<User, RepoError>;

    /// Overwrite a user and its profile as one unit.
    async fn update_with_profile(
        &self,
        user: User,
        profile: Profile,
    ) -> Result<(User, Profile), RepoError>;
}

#[async_trait]
pub trait ProfileRepository: BaseRepository<Profile, Uuid> {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Profile>, RepoError>;
}

/// Post repository. Listings are always newest-first.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Number of posts, optionally restricted to one author.
    async fn count(&self, author_id: Option<Uuid>) -> Result<u64, RepoError>;

    /// A window of posts ordered by `date_posted` descending.
    async fn list_newest(
        &self,
        author_id: Option<Uuid>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<AuthoredPost>, RepoError>;

    async fn find_authored(&self, id: Uuid) -> Result<Option<AuthoredPost>, RepoError>;
}

#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments of a post, newest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<AuthoredComment>, RepoError>;

    /// A comment only if it belongs to `post_id`.
    async fn find_in_post(
        &self,
        comment_id: Uuid,
        post_id: Uuid,
    ) -> Result<Option<Comment>, RepoError>;
}
