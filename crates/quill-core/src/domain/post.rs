use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Author;

/// Post entity - a blog article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    /// Blank when the post has no header image.
    pub image_url: String,
    pub content: String,
    pub date_posted: DateTime<Utc>,
}

impl Post {
    /// Create a new post dated now.
    pub fn new(
        author_id: Uuid,
        title: String,
        subtitle: Option<String>,
        image_url: String,
        content: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            subtitle,
            image_url,
            content,
            date_posted: Utc::now(),
        }
    }
}

/// A post joined with its author, as listings and detail views need it.
#[derive(Debug, Clone)]
pub struct AuthoredPost {
    pub post: Post,
    pub author: Author,
}
