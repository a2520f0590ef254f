//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use quill_core::domain::{AuthoredComment, AuthoredPost, Comment, Profile, User};
use quill_core::error::RepoError;
use quill_core::ports::{CommentRepository, PostRepository, ProfileRepository, UserRepository};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::profile::{self, Entity as ProfileEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_error, write_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL profile repository.
pub type PostgresProfileRepository = PostgresBaseRepository<ProfileEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

fn authored_post(
    (post, author): (post::Model, Option<user::Model>),
) -> Result<AuthoredPost, RepoError> {
    let author = author.ok_or_else(|| RepoError::Query(format!("post {} has no author", post.id)))?;
    Ok(AuthoredPost {
        post: post.into(),
        author: author.into(),
    })
}

fn authored_comment(
    (comment, author): (comment::Model, Option<user::Model>),
) -> Result<AuthoredComment, RepoError> {
    let author =
        author.ok_or_else(|| RepoError::Query(format!("comment {} has no author", comment.id)))?;
    Ok(AuthoredComment {
        comment: comment.into(),
        author: author.into(),
    })
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username = %username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn create_with_profile(&self, user: User, profile: Profile) -> Result<User, RepoError> {
        let txn = self.db.begin().await.map_err(query_error)?;

        let created = user::ActiveModel::from(user)
            .insert(&txn)
            .await
            .map_err(write_error)?;
        profile::ActiveModel::from(profile)
            .insert(&txn)
            .await
            .map_err(write_error)?;

        txn.commit().await.map_err(query_error)?;
        Ok(created.into())
    }

    async fn update_with_profile(
        &self,
        user: User,
        profile: Profile,
    ) -> Result<(User, Profile), RepoError> {
        let txn = self.db.begin().await.map_err(query_error)?;

        let updated_user = user::ActiveModel::from(user)
            .update(&txn)
            .await
            .map_err(write_error)?;

        let exists = ProfileEntity::find_by_id(profile.id)
            .one(&txn)
            .await
            .map_err(query_error)?
            .is_some();
        let active = profile::ActiveModel::from(profile);
        let saved_profile = if exists {
            active.update(&txn).await
        } else {
            active.insert(&txn).await
        }
        .map_err(write_error)?;

        txn.commit().await.map_err(query_error)?;
        Ok((updated_user.into(), saved_profile.into()))
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Profile>, RepoError> {
        let result = ProfileEntity::find()
            .filter(profile::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn count(&self, author_id: Option<Uuid>) -> Result<u64, RepoError> {
        let mut query = PostEntity::find();
        if let Some(author_id) = author_id {
            query = query.filter(post::Column::AuthorId.eq(author_id));
        }

        query.count(&self.db).await.map_err(query_error)
    }

    async fn list_newest(
        &self,
        author_id: Option<Uuid>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<AuthoredPost>, RepoError> {
        let mut query = PostEntity::find().find_also_related(UserEntity);
        if let Some(author_id) = author_id {
            query = query.filter(post::Column::AuthorId.eq(author_id));
        }

        let rows = query
            .order_by_desc(post::Column::DatePosted)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        rows.into_iter().map(authored_post).collect()
    }

    async fn find_authored(&self, id: Uuid) -> Result<Option<AuthoredPost>, RepoError> {
        let row = PostEntity::find_by_id(id)
            .find_also_related(UserEntity)
            .one(&self.db)
            .await
            .map_err(query_error)?;

        row.map(authored_post).transpose()
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<AuthoredComment>, RepoError> {
        let rows = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .find_also_related(UserEntity)
            .order_by_desc(comment::Column::DateAdded)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        rows.into_iter().map(authored_comment).collect()
    }

    async fn find_in_post(
        &self,
        comment_id: Uuid,
        post_id: Uuid,
    ) -> Result<Option<Comment>, RepoError> {
        let result = CommentEntity::find_by_id(comment_id)
            .filter(comment::Column::PostId.eq(post_id))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}
