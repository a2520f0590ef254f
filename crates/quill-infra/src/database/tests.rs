#[cfg(test)]
mod tests {
    use crate::database::entity::{post, user};
    use crate::database::postgres_repo::{PostgresPostRepository, PostgresUserRepository};
    use quill_core::domain::{Post, User};
    use quill_core::error::RepoError;
    use quill_core::ports::{BaseRepository, UserRepository};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn user_model(username: &str) -> user::Model {
        user::Model {
            id: uuid::Uuid::new_v4(),
            username: username.to_owned(),
            email: format!("{username}@example.com"),
            password_hash: "hash".to_owned(),
            date_joined: chrono::Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_post_by_id() {
        let post_id = uuid::Uuid::new_v4();
        let author_id = uuid::Uuid::new_v4();
        let now = chrono::Utc::now();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post::Model {
                id: post_id,
                author_id,
                title: "Hello".to_owned(),
                subtitle: None,
                image_url: String::new(),
                content: "World".to_owned(),
                date_posted: now.into(),
            }]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

        let post = result.unwrap();
        assert_eq!(post.title, "Hello");
        assert_eq!(post.author_id, author_id);
        assert_eq!(post.subtitle, None);
    }

    #[tokio::test]
    async fn test_find_user_by_username() {
        let alice = user_model("alice");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![alice.clone()]])
            .append_query_results(vec![Vec::<user::Model>::new()])
            .into_connection();

        let repo = PostgresUserRepository::new(db);

        let found = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.id, alice.id);
        assert_eq!(found.username, "alice");

        assert!(repo.find_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_post_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result = BaseRepository::<Post, uuid::Uuid>::delete(&repo, uuid::Uuid::new_v4()).await;
        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_insert_user_returns_stored_row() {
        let stored = user_model("bob");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![stored.clone()]])
            .into_connection();

        let repo = PostgresUserRepository::new(db);
        let user: User = stored.clone().into();

        let saved = repo.insert(user).await.unwrap();
        assert_eq!(saved.id, stored.id);
        assert_eq!(saved.email, "bob@example.com");
    }
}
