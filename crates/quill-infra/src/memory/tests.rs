//! Service-level tests against the in-memory store.

use std::sync::Arc;

use uuid::Uuid;

use quill_core::DomainError;
use quill_core::domain::{CurrentUser, DEFAULT_AVATAR, Profile, User};
use quill_core::error::RepoError;
use quill_core::form::{
    AccountForm, CommentForm, LoginForm, NON_FIELD_ERRORS, PostForm, ProfileForm,
    RegistrationForm,
};
use quill_core::pagination::PageRequest;
use quill_core::ports::{
    BaseRepository, CommentRepository, PostRepository, ProfileRepository, UserRepository,
};
use quill_core::service::{AccountService, BlogService};

use super::InMemoryStore;
use crate::auth::Argon2PasswordService;

struct Fixture {
    store: Arc<InMemoryStore>,
    blog: BlogService,
    accounts: AccountService,
}

fn fixture() -> Fixture {
    let store = Arc::new(InMemoryStore::new());
    Fixture {
        blog: BlogService::new(store.clone(), store.clone(), store.clone()),
        accounts: AccountService::new(
            store.clone(),
            store.clone(),
            Arc::new(Argon2PasswordService::new()),
        ),
        store,
    }
}

async fn seed_user(store: &InMemoryStore, username: &str) -> CurrentUser {
    let user = User::new(
        username.to_string(),
        format!("{username}@example.com"),
        "not-a-real-hash".to_string(),
    );
    let profile = Profile::new(user.id);
    let user = store.create_with_profile(user, profile).await.unwrap();
    CurrentUser::from(&user)
}

fn post_form(title: &str, content: &str) -> PostForm {
    PostForm::new(Some(title.into()), None, None, Some(content.into()))
}

fn registration(username: &str, password1: &str, password2: &str) -> RegistrationForm {
    RegistrationForm::new(
        Some(username.into()),
        Some(format!("{username}@example.com")),
        Some(password1.into()),
        Some(password2.into()),
    )
}

#[tokio::test]
async fn test_created_post_leads_listing_and_detail() {
    let f = fixture();
    let alice = seed_user(&f.store, "alice").await;

    f.blog
        .create_post(Some(&alice), post_form("Older", "First"))
        .await
        .unwrap();
    let post = f
        .blog
        .create_post(Some(&alice), post_form("Hello", "World"))
        .await
        .unwrap();

    let page = f.blog.list_posts(PageRequest::First).await.unwrap();
    assert_eq!(page.items[0].post.id, post.id);
    assert_eq!(page.items[0].author.username, "alice");

    let detail = f.blog.post_detail(None, post.id).await.unwrap();
    assert_eq!(detail.post.post.title, "Hello");
    assert!(!detail.can_edit);
    assert!(!detail.can_comment);

    let detail = f.blog.post_detail(Some(&alice), post.id).await.unwrap();
    assert!(detail.can_edit);
    assert!(detail.can_comment);
}

#[tokio::test]
async fn test_create_post_requires_identity_and_valid_form() {
    let f = fixture();
    let alice = seed_user(&f.store, "alice").await;

    let err = f
        .blog
        .create_post(None, post_form("Hello", "World"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Unauthenticated));

    let err = f
        .blog
        .create_post(Some(&alice), PostForm::new(None, None, None, Some("x".into())))
        .await
        .unwrap_err();
    let DomainError::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(errors.has("title"));
    assert_eq!(f.store.count(None).await.unwrap(), 0);
}

#[tokio::test]
async fn test_user_listing_contains_only_their_posts_newest_first() {
    let f = fixture();
    let alice = seed_user(&f.store, "alice").await;
    let bob = seed_user(&f.store, "bob").await;

    let mut alice_posts = Vec::new();
    for i in 0..3 {
        let post = f
            .blog
            .create_post(Some(&alice), post_form(&format!("alice {i}"), "text"))
            .await
            .unwrap();
        alice_posts.push(post.id);
        f.blog
            .create_post(Some(&bob), post_form(&format!("bob {i}"), "text"))
            .await
            .unwrap();
    }

    let (author, page) = f
        .blog
        .list_user_posts("alice", PageRequest::First)
        .await
        .unwrap();
    assert_eq!(author.username, "alice");
    assert_eq!(page.total, 3);

    let ids: Vec<Uuid> = page.items.iter().map(|p| p.post.id).collect();
    alice_posts.reverse();
    assert_eq!(ids, alice_posts);
    assert!(page.items.iter().all(|p| p.author.id == alice.id));
}

#[tokio::test]
async fn test_unknown_username_is_not_found() {
    let f = fixture();

    let err = f
        .blog
        .list_user_posts("nobody", PageRequest::First)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn test_pagination_last_and_out_of_range() {
    let f = fixture();
    let alice = seed_user(&f.store, "alice").await;
    for i in 0..5 {
        f.blog
            .create_post(Some(&alice), post_form(&format!("post {i}"), "text"))
            .await
            .unwrap();
    }

    let first = f.blog.list_posts(PageRequest::First).await.unwrap();
    assert_eq!(first.items.len(), 4);
    assert_eq!(first.num_pages, 2);
    assert!(first.has_next());

    let last = f.blog.list_posts(PageRequest::Last).await.unwrap();
    assert_eq!(last.number, 2);
    assert_eq!(last.items.len(), 1);
    assert_eq!(last.items[0].post.title, "post 0");

    let err = f.blog.list_posts(PageRequest::Number(3)).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn test_comment_goes_to_top_of_thread() {
    let f = fixture();
    let alice = seed_user(&f.store, "alice").await;
    let bob = seed_user(&f.store, "bob").await;
    let post = f
        .blog
        .create_post(Some(&alice), post_form("Hello", "World"))
        .await
        .unwrap();

    f.blog
        .add_comment(Some(&alice), post.id, CommentForm::new(Some("First".into())))
        .await
        .unwrap();
    f.blog
        .add_comment(Some(&bob), post.id, CommentForm::new(Some("Nice!".into())))
        .await
        .unwrap();

    let detail = f.blog.post_detail(None, post.id).await.unwrap();
    assert_eq!(detail.comments.len(), 2);
    assert_eq!(detail.comments[0].comment.body, "Nice!");
    assert_eq!(detail.comments[0].author.username, "bob");
}

#[tokio::test]
async fn test_anonymous_comment_is_refused() {
    let f = fixture();
    let alice = seed_user(&f.store, "alice").await;
    let post = f
        .blog
        .create_post(Some(&alice), post_form("Hello", "World"))
        .await
        .unwrap();

    let err = f
        .blog
        .add_comment(None, post.id, CommentForm::new(Some("hi".into())))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Unauthenticated));
}

#[tokio::test]
async fn test_empty_comment_is_stored_as_empty_text() {
    let f = fixture();
    let alice = seed_user(&f.store, "alice").await;
    let post = f
        .blog
        .create_post(Some(&alice), post_form("Hello", "World"))
        .await
        .unwrap();

    let comment = f
        .blog
        .add_comment(Some(&alice), post.id, CommentForm::new(None))
        .await
        .unwrap();
    assert_eq!(comment.body, "");
}

#[tokio::test]
async fn test_delete_comment_only_within_its_post() {
    let f = fixture();
    let alice = seed_user(&f.store, "alice").await;
    let first = f
        .blog
        .create_post(Some(&alice), post_form("One", "text"))
        .await
        .unwrap();
    let second = f
        .blog
        .create_post(Some(&alice), post_form("Two", "text"))
        .await
        .unwrap();
    let comment = f
        .blog
        .add_comment(Some(&alice), first.id, CommentForm::new(Some("hi".into())))
        .await
        .unwrap();

    let err = f
        .blog
        .delete_comment(second.id, comment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
    assert_eq!(f.blog.post_detail(None, first.id).await.unwrap().comments.len(), 1);

    f.blog.delete_comment(first.id, comment.id).await.unwrap();
    assert!(f.blog.post_detail(None, first.id).await.unwrap().comments.is_empty());

    let err = f.blog.delete_comment(first.id, comment.id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn test_non_author_cannot_change_post() {
    let f = fixture();
    let alice = seed_user(&f.store, "alice").await;
    let bob = seed_user(&f.store, "bob").await;
    let post = f
        .blog
        .create_post(Some(&alice), post_form("Hello", "World"))
        .await
        .unwrap();

    let err = f.blog.post_for_change(Some(&bob), post.id).await.unwrap_err();
    assert!(matches!(err, DomainError::Forbidden));

    let err = f
        .blog
        .update_post(Some(&bob), post.id, post_form("Hacked", "x"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden));

    let err = f
        .blog
        .update_post(None, post.id, post_form("Hacked", "x"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Unauthenticated));

    let err = f.blog.delete_post(Some(&bob), post.id).await.unwrap_err();
    assert!(matches!(err, DomainError::Forbidden));

    let detail = f.blog.post_detail(None, post.id).await.unwrap();
    assert_eq!(detail.post.post.title, "Hello");
    assert_eq!(detail.post.author.id, alice.id);
}

#[tokio::test]
async fn test_change_of_missing_post_is_not_found() {
    let f = fixture();
    let alice = seed_user(&f.store, "alice").await;

    let err = f
        .blog
        .post_for_change(Some(&alice), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn test_author_updates_and_deletes_post() {
    let f = fixture();
    let alice = seed_user(&f.store, "alice").await;
    let post = f
        .blog
        .create_post(Some(&alice), post_form("Hello", "World"))
        .await
        .unwrap();
    f.blog
        .add_comment(Some(&alice), post.id, CommentForm::new(Some("hi".into())))
        .await
        .unwrap();

    let updated = f
        .blog
        .update_post(Some(&alice), post.id, post_form("Hello again", "World"))
        .await
        .unwrap();
    assert_eq!(updated.title, "Hello again");
    assert_eq!(updated.date_posted, post.date_posted);

    f.blog.delete_post(Some(&alice), post.id).await.unwrap();
    let err = f.blog.post_detail(None, post.id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
    assert!(f.store.list_for_post(post.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_register_while_signed_in_is_refused() {
    let f = fixture();
    let alice = seed_user(&f.store, "alice").await;

    let err = f
        .accounts
        .register(Some(&alice), registration("carol", "s3cure-passphrase", "s3cure-passphrase"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::AlreadyAuthenticated));
}

#[tokio::test]
async fn test_register_mismatched_passwords_creates_nothing() {
    let f = fixture();

    let err = f
        .accounts
        .register(None, registration("carol", "s3cure-passphrase", "different-phrase"))
        .await
        .unwrap_err();
    let DomainError::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert_eq!(
        errors.get("password2"),
        ["The two password fields didn't match.".to_string()]
    );
    assert!(f.store.find_by_username("carol").await.unwrap().is_none());
}

#[tokio::test]
async fn test_register_then_authenticate() {
    let f = fixture();

    let user = f
        .accounts
        .register(None, registration("carol", "s3cure-passphrase", "s3cure-passphrase"))
        .await
        .unwrap();
    assert_ne!(user.password_hash, "s3cure-passphrase");

    let viewer = CurrentUser::from(&user);
    let detail = f.accounts.profile(Some(&viewer)).await.unwrap();
    assert_eq!(detail.profile.image, DEFAULT_AVATAR);

    let signed_in = f
        .accounts
        .authenticate(LoginForm::new(
            Some("carol".into()),
            Some("s3cure-passphrase".into()),
        ))
        .await
        .unwrap();
    assert_eq!(signed_in.id, user.id);

    let err = f
        .accounts
        .authenticate(LoginForm::new(Some("carol".into()), Some("wrong".into())))
        .await
        .unwrap_err();
    let DomainError::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(errors.has(NON_FIELD_ERRORS));
}

#[tokio::test]
async fn test_register_taken_username() {
    let f = fixture();
    seed_user(&f.store, "alice").await;

    let err = f
        .accounts
        .register(None, registration("alice", "s3cure-passphrase", "s3cure-passphrase"))
        .await
        .unwrap_err();
    let DomainError::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(errors.has("username"));
}

#[tokio::test]
async fn test_profile_update_keeps_image_when_blank() {
    let f = fixture();
    let alice = seed_user(&f.store, "alice").await;

    let detail = f
        .accounts
        .update_profile(
            Some(&alice),
            AccountForm::new(Some("alicia".into()), Some("alicia@example.com".into())),
            ProfileForm::new(Some("   ".into())),
        )
        .await
        .unwrap();
    assert_eq!(detail.user.username, "alicia");
    assert_eq!(detail.profile.image, DEFAULT_AVATAR);

    let detail = f
        .accounts
        .update_profile(
            Some(&alice),
            AccountForm::new(Some("alicia".into()), Some("alicia@example.com".into())),
            ProfileForm::new(Some("alicia.png".into())),
        )
        .await
        .unwrap();
    assert_eq!(detail.profile.image, "alicia.png");
}

#[tokio::test]
async fn test_profile_update_merges_errors_and_writes_nothing() {
    let f = fixture();
    let alice = seed_user(&f.store, "alice").await;
    seed_user(&f.store, "bob").await;

    let err = f
        .accounts
        .update_profile(
            Some(&alice),
            AccountForm::new(Some("bob".into()), Some("alice@example.com".into())),
            ProfileForm::new(Some("avatar.exe".into())),
        )
        .await
        .unwrap_err();
    let DomainError::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(errors.has("username"));
    assert!(errors.has("image"));

    let stored = f.store.find_by_username("alice").await.unwrap();
    assert!(stored.is_some());
}

#[tokio::test]
async fn test_profile_requires_identity() {
    let f = fixture();

    let err = f.accounts.profile(None).await.unwrap_err();
    assert!(matches!(err, DomainError::Unauthenticated));
}

#[tokio::test]
async fn test_deleting_user_cascades_to_their_rows() {
    let f = fixture();
    let alice = seed_user(&f.store, "alice").await;
    let bob = seed_user(&f.store, "bob").await;

    f.blog
        .create_post(Some(&alice), post_form("Alice's", "text"))
        .await
        .unwrap();
    let bob_post = f
        .blog
        .create_post(Some(&bob), post_form("Bob's", "text"))
        .await
        .unwrap();
    f.blog
        .add_comment(Some(&alice), bob_post.id, CommentForm::new(Some("hi".into())))
        .await
        .unwrap();
    f.blog
        .add_comment(Some(&bob), bob_post.id, CommentForm::new(Some("thanks".into())))
        .await
        .unwrap();

    BaseRepository::<User, Uuid>::delete(&*f.store, alice.id)
        .await
        .unwrap();

    assert!(f.store.find_by_username("alice").await.unwrap().is_none());
    assert!(f.store.find_by_user_id(alice.id).await.unwrap().is_none());
    assert_eq!(f.store.count(Some(alice.id)).await.unwrap(), 0);

    assert_eq!(f.store.count(None).await.unwrap(), 1);
    assert!(f.store.find_by_user_id(bob.id).await.unwrap().is_some());
    let comments = f.store.list_for_post(bob_post.id).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].author.username, "bob");

    let err = BaseRepository::<User, Uuid>::delete(&*f.store, alice.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound));
}
