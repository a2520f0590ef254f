//! Domain values to response DTOs.

use quill_core::domain::{Author, AuthoredComment, AuthoredPost, Post};
use quill_core::form::Form;
use quill_core::pagination::Page;
use quill_shared::dto::{AuthorView, CommentView, FieldView, FormView, PageView, PostView};

pub fn author_view(author: &Author) -> AuthorView {
    AuthorView {
        id: author.id,
        username: author.username.clone(),
    }
}

fn post_view(post: Post, author: &Author) -> PostView {
    PostView {
        id: post.id,
        title: post.title,
        subtitle: post.subtitle,
        image_url: post.image_url,
        content: post.content,
        date_posted: post.date_posted,
        author: author_view(author),
    }
}

pub fn authored_post_view(authored: AuthoredPost) -> PostView {
    post_view(authored.post, &authored.author)
}

pub fn comment_view(authored: AuthoredComment) -> CommentView {
    CommentView {
        id: authored.comment.id,
        body: authored.comment.body,
        date_added: authored.comment.date_added,
        author: author_view(&authored.author),
    }
}

pub fn page_view(page: Page<AuthoredPost>) -> PageView<PostView> {
    let has_next = page.has_next();
    let has_previous = page.has_previous();
    let page = page.map(authored_post_view);

    PageView {
        items: page.items,
        page: page.number,
        num_pages: page.num_pages,
        total: page.total,
        has_next,
        has_previous,
    }
}

/// Descriptor of form `F`, pre-filled with `values`.
pub fn form_view<F: Form>(values: serde_json::Value) -> FormView {
    let fields = F::schema()
        .fields
        .iter()
        .map(|field| FieldView {
            name: field.name.to_string(),
            required: field.required(),
            max_length: field.max_length(),
        })
        .collect();

    FormView { fields, values }
}
