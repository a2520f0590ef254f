use std::cmp::Reverse;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Author, AuthoredComment, AuthoredPost, Comment, Post, Profile, User};
use quill_core::error::RepoError;
use quill_core::ports::{
    BaseRepository, CommentRepository, PostRepository, ProfileRepository, UserRepository,
};

/// Rows kept in insertion order, so later rows win date ties.
#[derive(Default)]
struct Tables {
    users: Vec<User>,
    profiles: Vec<Profile>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
}

impl Tables {
    fn author(&self, user_id: Uuid) -> Result<Author, RepoError> {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .map(User::author)
            .ok_or_else(|| RepoError::Query(format!("dangling author reference {user_id}")))
    }

    fn username_taken(&self, username: &str, except: Option<Uuid>) -> bool {
        self.users
            .iter()
            .any(|u| u.username == username && Some(u.id) != except)
    }

    fn user_exists(&self, id: Uuid) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    fn post_exists(&self, id: Uuid) -> bool {
        self.posts.iter().any(|p| p.id == id)
    }

    fn remove_post(&mut self, id: Uuid) {
        self.posts.retain(|p| p.id != id);
        self.comments.retain(|c| c.post_id != id);
    }

    fn remove_user(&mut self, id: Uuid) {
        let owned: Vec<Uuid> = self
            .posts
            .iter()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in owned {
            self.remove_post(post_id);
        }
        self.comments.retain(|c| c.author_id != id);
        self.profiles.retain(|p| p.user_id != id);
        self.users.retain(|u| u.id != id);
    }

    fn check_user(&self, user: &User, except: Option<Uuid>) -> Result<(), RepoError> {
        if self.username_taken(&user.username, except) {
            return Err(RepoError::Constraint(format!(
                "username {} already exists",
                user.username
            )));
        }
        Ok(())
    }

    fn check_profile(&self, profile: &Profile) -> Result<(), RepoError> {
        if !self.user_exists(profile.user_id) {
            return Err(RepoError::Constraint(format!(
                "profile references missing user {}",
                profile.user_id
            )));
        }
        if self
            .profiles
            .iter()
            .any(|p| p.user_id == profile.user_id && p.id != profile.id)
        {
            return Err(RepoError::Constraint(format!(
                "user {} already has a profile",
                profile.user_id
            )));
        }
        Ok(())
    }

    fn upsert_profile(&mut self, profile: Profile) {
        match self.profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(slot) => *slot = profile,
            None => self.profiles.push(profile),
        }
    }
}

/// Thread-safe store implementing every repository port.
///
/// Share one instance behind an `Arc` and hand it out as each
/// `Arc<dyn ...Repository>`. Deletes cascade like the SQL schema does.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest first; equal timestamps fall back to reverse insertion order.
fn newest_first<T, K: Ord>(
    rows: impl DoubleEndedIterator<Item = T>,
    key: impl Fn(&T) -> K,
) -> Vec<T> {
    let mut rows: Vec<T> = rows.rev().collect();
    rows.sort_by_key(|row| Reverse(key(row)));
    rows
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        tables.check_user(&user, None)?;
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        tables.check_user(&user, Some(user.id))?;
        let slot = tables
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(RepoError::NotFound)?;
        *slot = user.clone();
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.user_exists(id) {
            return Err(RepoError::NotFound);
        }
        tables.remove_user(id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_with_profile(&self, user: User, profile: Profile) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        tables.check_user(&user, None)?;
        if profile.user_id != user.id {
            return Err(RepoError::Constraint("profile belongs to another user".into()));
        }
        tables.users.push(user.clone());
        tables.profiles.push(profile);
        Ok(user)
    }

    async fn update_with_profile(
        &self,
        user: User,
        profile: Profile,
    ) -> Result<(User, Profile), RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.user_exists(user.id) {
            return Err(RepoError::NotFound);
        }
        tables.check_user(&user, Some(user.id))?;
        tables.check_profile(&profile)?;

        if let Some(slot) = tables.users.iter_mut().find(|u| u.id == user.id) {
            *slot = user.clone();
        }
        tables.upsert_profile(profile.clone());
        Ok((user, profile))
    }
}

#[async_trait]
impl BaseRepository<Profile, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, profile: Profile) -> Result<Profile, RepoError> {
        let mut tables = self.tables.write().await;
        tables.check_profile(&profile)?;
        tables.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn update(&self, profile: Profile) -> Result<Profile, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.profiles.iter().any(|p| p.id == profile.id) {
            return Err(RepoError::NotFound);
        }
        tables.check_profile(&profile)?;
        tables.upsert_profile(profile.clone());
        Ok(profile)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let before = tables.profiles.len();
        tables.profiles.retain(|p| p.id != id);
        if tables.profiles.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for InMemoryStore {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Profile>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.iter().find(|p| p.user_id == user_id).cloned())
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.user_exists(post.author_id) {
            return Err(RepoError::Constraint(format!(
                "post references missing user {}",
                post.author_id
            )));
        }
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or(RepoError::NotFound)?;
        *slot = post.clone();
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.post_exists(id) {
            return Err(RepoError::NotFound);
        }
        tables.remove_post(id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn count(&self, author_id: Option<Uuid>) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        let count = tables
            .posts
            .iter()
            .filter(|p| author_id.is_none_or(|id| p.author_id == id))
            .count();
        Ok(count as u64)
    }

    async fn list_newest(
        &self,
        author_id: Option<Uuid>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<AuthoredPost>, RepoError> {
        let tables = self.tables.read().await;
        let matching = tables
            .posts
            .iter()
            .filter(|p| author_id.is_none_or(|id| p.author_id == id));

        newest_first(matching, |p| p.date_posted)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|post| {
                Ok(AuthoredPost {
                    author: tables.author(post.author_id)?,
                    post: post.clone(),
                })
            })
            .collect()
    }

    async fn find_authored(&self, id: Uuid) -> Result<Option<AuthoredPost>, RepoError> {
        let tables = self.tables.read().await;
        let Some(post) = tables.posts.iter().find(|p| p.id == id) else {
            return Ok(None);
        };

        Ok(Some(AuthoredPost {
            author: tables.author(post.author_id)?,
            post: post.clone(),
        }))
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn insert(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.post_exists(comment.post_id) || !tables.user_exists(comment.author_id) {
            return Err(RepoError::Constraint(
                "comment references a missing post or user".into(),
            ));
        }
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn update(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .comments
            .iter_mut()
            .find(|c| c.id == comment.id)
            .ok_or(RepoError::NotFound)?;
        *slot = comment.clone();
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let before = tables.comments.len();
        tables.comments.retain(|c| c.id != id);
        if tables.comments.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<AuthoredComment>, RepoError> {
        let tables = self.tables.read().await;
        let matching = tables.comments.iter().filter(|c| c.post_id == post_id);

        newest_first(matching, |c| c.date_added)
            .into_iter()
            .map(|comment| {
                Ok(AuthoredComment {
                    author: tables.author(comment.author_id)?,
                    comment: comment.clone(),
                })
            })
            .collect()
    }

    async fn find_in_post(
        &self,
        comment_id: Uuid,
        post_id: Uuid,
    ) -> Result<Option<Comment>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .iter()
            .find(|c| c.id == comment_id && c.post_id == post_id)
            .cloned())
    }
}
