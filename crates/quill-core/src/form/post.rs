use super::{Constraint, FieldSpec, Form, Schema, clean};

static POST_SCHEMA: Schema = Schema {
    fields: &[
        FieldSpec {
            name: "title",
            constraints: &[Constraint::Required, Constraint::MaxLength(100)],
        },
        FieldSpec {
            name: "subtitle",
            constraints: &[Constraint::MaxLength(100)],
        },
        FieldSpec {
            name: "image_url",
            constraints: &[Constraint::MaxLength(250)],
        },
        FieldSpec {
            name: "content",
            constraints: &[Constraint::Required],
        },
    ],
};

/// Comment bodies are accepted as submitted, including empty ones.
static COMMENT_SCHEMA: Schema = Schema {
    fields: &[FieldSpec {
        name: "body",
        constraints: &[],
    }],
};

/// Author-editable fields of a post, used for create and update.
#[derive(Debug, Clone, Default)]
pub struct PostForm {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub image_url: Option<String>,
    pub content: Option<String>,
}

impl PostForm {
    pub fn new(
        title: Option<String>,
        subtitle: Option<String>,
        image_url: Option<String>,
        content: Option<String>,
    ) -> Self {
        Self {
            title: clean(title),
            subtitle: clean(subtitle),
            image_url: clean(image_url),
            content: clean(content),
        }
    }
}

impl Form for PostForm {
    fn schema() -> &'static Schema {
        &POST_SCHEMA
    }

    fn value(&self, field: &str) -> Option<&str> {
        match field {
            "title" => self.title.as_deref(),
            "subtitle" => self.subtitle.as_deref(),
            "image_url" => self.image_url.as_deref(),
            "content" => self.content.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommentForm {
    pub body: String,
}

impl CommentForm {
    /// A missing body is stored as empty text.
    pub fn new(body: Option<String>) -> Self {
        Self {
            body: body.unwrap_or_default(),
        }
    }
}

impl Form for CommentForm {
    fn schema() -> &'static Schema {
        &COMMENT_SCHEMA
    }

    fn value(&self, field: &str) -> Option<&str> {
        match field {
            "body" => Some(&self.body),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::REQUIRED_MESSAGE;

    fn form(title: &str, content: &str) -> PostForm {
        PostForm::new(Some(title.into()), None, None, Some(content.into()))
    }

    #[test]
    fn test_valid_post() {
        assert!(form("Hello", "World").validate().is_ok());
    }

    #[test]
    fn test_blank_title_and_content_are_required() {
        let errors = form("   ", "").validate().unwrap_err();

        assert_eq!(errors.get("title"), [REQUIRED_MESSAGE.to_string()]);
        assert_eq!(errors.get("content"), [REQUIRED_MESSAGE.to_string()]);
    }

    #[test]
    fn test_length_limits() {
        let post = PostForm::new(
            Some("t".repeat(101)),
            Some("s".repeat(101)),
            Some("i".repeat(251)),
            Some("body".into()),
        );

        let errors = post.validate().unwrap_err();
        assert!(errors.has("title"));
        assert!(errors.has("subtitle"));
        assert!(errors.has("image_url"));
        assert!(!errors.has("content"));
    }

    #[test]
    fn test_values_are_trimmed() {
        let post = PostForm::new(Some("  Hello ".into()), Some("  ".into()), None, None);

        assert_eq!(post.title.as_deref(), Some("Hello"));
        assert_eq!(post.subtitle, None);
    }

    #[test]
    fn test_empty_comment_is_accepted() {
        assert!(CommentForm::new(None).validate().is_ok());
        assert!(CommentForm::new(Some(String::new())).validate().is_ok());
    }
}
