//! Post listing, detail, comments and the author-only post forms.

use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use quill_core::form::{CommentForm, PostForm};
use quill_core::pagination::PageRequest;
use quill_shared::dto::{
    CommentInput, ConfirmDeleteView, PostDetailView, PostInput, UserPostsView,
};

use super::views;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::middleware::flash::{self, FlashMessage, IncomingFlash};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    page: Option<String>,
}

impl PageQuery {
    fn request(&self) -> AppResult<PageRequest> {
        Ok(PageRequest::parse(self.page.as_deref())?)
    }
}

#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    action: Option<String>,
    comment_id: Option<String>,
}

fn post_form(input: PostInput) -> PostForm {
    PostForm::new(input.title, input.subtitle, input.image_url, input.content)
}

/// GET /
pub async fn list(
    state: web::Data<AppState>,
    flash: IncomingFlash,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state.blog.list_posts(query.request()?).await?;
    Ok(flash::render(flash, views::page_view(page)))
}

/// GET /user/{username}/
pub async fn user_posts(
    state: web::Data<AppState>,
    flash: IncomingFlash,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let (author, page) = state
        .blog
        .list_user_posts(&path.into_inner(), query.request()?)
        .await?;

    Ok(flash::render(
        flash,
        UserPostsView {
            author: views::author_view(&author),
            posts: views::page_view(page),
        },
    ))
}

/// GET /post/{id}/
///
/// With `?action=delete_comment&comment_id=<id>` removes that comment of
/// this post instead of rendering.
pub async fn detail(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    flash: IncomingFlash,
    path: web::Path<Uuid>,
    query: web::Query<DetailQuery>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    if query.action.as_deref() == Some("delete_comment") {
        let comment_id = query
            .comment_id
            .as_deref()
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
            .ok_or_else(|| AppError::NotFound("comment not found".to_string()))?;

        state.blog.delete_comment(post_id, comment_id).await?;
        tracing::info!(%post_id, %comment_id, "Comment deleted");

        return Ok(flash::redirect_with_flash(
            req.path(),
            FlashMessage::success("Comment deleted successfully."),
        ));
    }

    let detail = state.blog.post_detail(identity.viewer(), post_id).await?;

    Ok(flash::render(
        flash,
        PostDetailView {
            post: views::authored_post_view(detail.post),
            comments: detail.comments.into_iter().map(views::comment_view).collect(),
            can_edit: detail.can_edit,
            can_comment: detail.can_comment,
        },
    ))
}

/// POST /post/{id}/
pub async fn add_comment(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    form: web::Form<CommentInput>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let input = form.into_inner();

    let comment = state
        .blog
        .add_comment(Some(&identity.0), post_id, CommentForm::new(input.body.clone()))
        .await
        .map_err(|e| AppError::from(e).with_values(json!({ "body": input.body })))?;

    tracing::info!(
        %post_id,
        comment_id = %comment.id,
        user = %identity.0.username,
        "Comment added"
    );
    Ok(flash::redirect(req.path()))
}

/// GET /post/new/
pub async fn new_form(_identity: Identity, flash: IncomingFlash) -> HttpResponse {
    flash::render(flash, views::form_view::<PostForm>(json!({})))
}

/// POST /post/new/
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<PostInput>,
) -> AppResult<HttpResponse> {
    let input = form.into_inner();
    let values = json!(input);

    let post = state
        .blog
        .create_post(Some(&identity.0), post_form(input))
        .await
        .map_err(|e| AppError::from(e).with_values(values))?;

    tracing::info!(post_id = %post.id, user = %identity.0.username, "Post created");
    Ok(flash::redirect_with_flash(
        "/",
        FlashMessage::success("Post created successfully!"),
    ))
}

/// GET /post/{id}/update/
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    flash: IncomingFlash,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state
        .blog
        .post_for_change(Some(&identity.0), path.into_inner())
        .await?
        .post;

    let values = json!({
        "title": post.title,
        "subtitle": post.subtitle,
        "image_url": post.image_url,
        "content": post.content,
    });
    Ok(flash::render(flash, views::form_view::<PostForm>(values)))
}

/// POST /post/{id}/update/
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    form: web::Form<PostInput>,
) -> AppResult<HttpResponse> {
    let input = form.into_inner();
    let values = json!(input);

    let post = state
        .blog
        .update_post(Some(&identity.0), path.into_inner(), post_form(input))
        .await
        .map_err(|e| AppError::from(e).with_values(values))?;

    tracing::info!(post_id = %post.id, user = %identity.0.username, "Post updated");
    Ok(flash::redirect_with_flash(
        "/",
        FlashMessage::success("Post updated successfully!"),
    ))
}

/// GET /post/{id}/delete/
pub async fn confirm_delete(
    state: web::Data<AppState>,
    identity: Identity,
    flash: IncomingFlash,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let authored = state
        .blog
        .post_for_change(Some(&identity.0), path.into_inner())
        .await?;
    let prompt = format!(
        "Are you sure you want to delete \"{}\"?",
        authored.post.title
    );

    Ok(flash::render(
        flash,
        ConfirmDeleteView {
            post: views::authored_post_view(authored),
            prompt,
        },
    ))
}

/// POST /post/{id}/delete/
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state
        .blog
        .delete_post(Some(&identity.0), path.into_inner())
        .await?;

    tracing::info!(post_id = %post.id, user = %identity.0.username, "Post deleted");
    Ok(flash::redirect_with_flash(
        "/",
        FlashMessage::success("Post deleted successfully!"),
    ))
}
