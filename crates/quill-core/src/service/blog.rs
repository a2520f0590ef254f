use std::sync::Arc;

use uuid::Uuid;

use crate::access;
use crate::domain::{Author, AuthoredComment, AuthoredPost, Comment, CurrentUser, Post};
use crate::error::DomainError;
use crate::form::{CommentForm, Form, PostForm};
use crate::pagination::{PAGE_SIZE, Page, PageRequest, PageWindow};
use crate::ports::{CommentRepository, PostRepository, UserRepository};

/// A post with its comment thread and what the viewer may do with it.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: AuthoredPost,
    pub comments: Vec<AuthoredComment>,
    pub can_edit: bool,
    pub can_comment: bool,
}

/// Posts and comments.
#[derive(Clone)]
pub struct BlogService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    users: Arc<dyn UserRepository>,
}

impl BlogService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            posts,
            comments,
            users,
        }
    }

    /// All posts, newest first.
    pub async fn list_posts(
        &self,
        request: PageRequest,
    ) -> Result<Page<AuthoredPost>, DomainError> {
        self.page_of(None, request).await
    }

    /// Posts written by `username`, newest first.
    pub async fn list_user_posts(
        &self,
        username: &str,
        request: PageRequest,
    ) -> Result<(Author, Page<AuthoredPost>), DomainError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("user", username))?;

        let page = self.page_of(Some(user.id), request).await?;
        Ok((user.author(), page))
    }

    async fn page_of(
        &self,
        author_id: Option<Uuid>,
        request: PageRequest,
    ) -> Result<Page<AuthoredPost>, DomainError> {
        let total = self.posts.count(author_id).await?;
        let window = PageWindow::resolve(request, total, PAGE_SIZE)?;
        let items = self
            .posts
            .list_newest(author_id, window.offset, window.limit)
            .await?;

        Ok(Page::new(items, window))
    }

    pub async fn post_detail(
        &self,
        viewer: Option<&CurrentUser>,
        post_id: Uuid,
    ) -> Result<PostDetail, DomainError> {
        let post = self
            .posts
            .find_authored(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))?;
        let comments = self.comments.list_for_post(post_id).await?;

        Ok(PostDetail {
            can_edit: access::is_author(viewer, &post.post),
            can_comment: viewer.is_some(),
            post,
            comments,
        })
    }

    /// Append a comment by the viewer to a post.
    pub async fn add_comment(
        &self,
        viewer: Option<&CurrentUser>,
        post_id: Uuid,
        form: CommentForm,
    ) -> Result<Comment, DomainError> {
        let user = access::require_authenticated(viewer)?;
        let post = self.load_post(post_id).await?;
        form.validate()?;

        let comment = Comment::new(post.id, user.id, form.body);
        Ok(self.comments.insert(comment).await?)
    }

    /// Delete a comment of this post. A comment of another post is treated
    /// as missing.
    pub async fn delete_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<(), DomainError> {
        self.load_post(post_id).await?;

        let comment = self
            .comments
            .find_in_post(comment_id, post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("comment", comment_id))?;

        self.comments.delete(comment.id).await?;
        Ok(())
    }

    pub async fn create_post(
        &self,
        viewer: Option<&CurrentUser>,
        form: PostForm,
    ) -> Result<Post, DomainError> {
        let user = access::require_authenticated(viewer)?;
        form.validate()?;

        let post = Post::new(
            user.id,
            form.title.unwrap_or_default(),
            form.subtitle,
            form.image_url.unwrap_or_default(),
            form.content.unwrap_or_default(),
        );
        Ok(self.posts.insert(post).await?)
    }

    /// Load a post, with its stored author, that the viewer is about to
    /// edit or delete.
    pub async fn post_for_change(
        &self,
        viewer: Option<&CurrentUser>,
        post_id: Uuid,
    ) -> Result<AuthoredPost, DomainError> {
        access::require_authenticated(viewer)?;
        let authored = self
            .posts
            .find_authored(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))?;
        access::authorize_post_change(viewer, &authored.post)?;
        Ok(authored)
    }

    pub async fn update_post(
        &self,
        viewer: Option<&CurrentUser>,
        post_id: Uuid,
        form: PostForm,
    ) -> Result<Post, DomainError> {
        let existing = self.post_for_change(viewer, post_id).await?.post;
        let user = access::authorize_post_change(viewer, &existing)?;
        form.validate()?;

        let post = Post {
            author_id: user.id,
            title: form.title.unwrap_or_default(),
            subtitle: form.subtitle,
            image_url: form.image_url.unwrap_or_default(),
            content: form.content.unwrap_or_default(),
            ..existing
        };
        Ok(self.posts.update(post).await?)
    }

    /// Delete a post together with its comments.
    pub async fn delete_post(
        &self,
        viewer: Option<&CurrentUser>,
        post_id: Uuid,
    ) -> Result<Post, DomainError> {
        let post = self.post_for_change(viewer, post_id).await?.post;
        self.posts.delete(post.id).await?;
        Ok(post)
    }

    async fn load_post(&self, post_id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }
}
