//! Form schemas and validation.
//!
//! A [`Schema`] lists each field with its constraints. Validating is a pure
//! function from submitted values to [`FieldErrors`]; forms layer their
//! cross-field checks on top once the schema passes.

mod account;
mod post;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

pub use account::{AccountForm, LoginForm, ProfileForm, RegistrationForm};
pub use post::{CommentForm, PostForm};

/// Key for errors that belong to the form as a whole.
pub const NON_FIELD_ERRORS: &str = "__all__";

pub const REQUIRED_MESSAGE: &str = "This field is required.";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username regex"));

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// A single rule a field value must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    Required,
    MaxLength(usize),
    Email,
    /// Letters, digits and `@ . + - _` only.
    Username,
    /// File name with an image extension.
    ImageFile,
}

impl Constraint {
    /// Message for a non-empty `value` breaking this rule, if it does.
    fn violation(self, value: &str) -> Option<String> {
        let len = value.chars().count();
        match self {
            // Emptiness is handled before any other rule runs.
            Constraint::Required => None,
            Constraint::MaxLength(max) if len > max => Some(format!(
                "Ensure this value has at most {max} characters (it has {len})."
            )),
            Constraint::Email if !EMAIL_RE.is_match(value) => {
                Some("Enter a valid email address.".to_string())
            }
            Constraint::Username if !USERNAME_RE.is_match(value) => Some(
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                    .to_string(),
            ),
            Constraint::ImageFile => {
                let extension = value
                    .rsplit_once('.')
                    .map(|(_, ext)| ext.to_ascii_lowercase())
                    .unwrap_or_default();
                if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
                    None
                } else {
                    Some(format!(
                        "File extension \u{201c}{extension}\u{201d} is not allowed. Allowed extensions are: {}.",
                        IMAGE_EXTENSIONS.join(", ")
                    ))
                }
            }
            _ => None,
        }
    }
}

/// A named field and the rules it must satisfy.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub constraints: &'static [Constraint],
}

impl FieldSpec {
    pub fn required(&self) -> bool {
        self.constraints.contains(&Constraint::Required)
    }

    pub fn max_length(&self) -> Option<usize> {
        self.constraints.iter().find_map(|c| match c {
            Constraint::MaxLength(max) => Some(*max),
            _ => None,
        })
    }
}

/// The field layout of a form.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub fields: &'static [FieldSpec],
}

impl Schema {
    /// Check every field. Empty values only fail `Required`; the other
    /// constraints apply to non-empty values.
    pub fn validate<'a>(&self, value: impl Fn(&str) -> Option<&'a str>) -> FieldErrors {
        let mut errors = FieldErrors::new();

        for field in self.fields {
            match value(field.name).filter(|v| !v.is_empty()) {
                None => {
                    if field.required() {
                        errors.add(field.name, REQUIRED_MESSAGE);
                    }
                }
                Some(v) => {
                    for constraint in field.constraints {
                        if let Some(message) = constraint.violation(v) {
                            errors.add(field.name, message);
                        }
                    }
                }
            }
        }

        errors
    }
}

/// Validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fold another form's errors into this one.
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// A submitted form checked against its [`Schema`].
pub trait Form {
    fn schema() -> &'static Schema;

    /// The submitted value of `field`, if any.
    fn value(&self, field: &str) -> Option<&str>;

    /// Cross-field rules, run only when every field passed its schema.
    fn check(&self, _errors: &mut FieldErrors) {}

    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = Self::schema().validate(|field| self.value(field));
        if errors.is_empty() {
            self.check(&mut errors);
        }
        errors.into_result()
    }
}

/// Trim a submitted value; blank collapses to `None`.
pub(crate) fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: Schema = Schema {
        fields: &[
            FieldSpec {
                name: "name",
                constraints: &[Constraint::Required, Constraint::MaxLength(5)],
            },
            FieldSpec {
                name: "email",
                constraints: &[Constraint::Email],
            },
        ],
    };

    #[test]
    fn test_missing_required_field() {
        let errors = SCHEMA.validate(|_| None);

        assert_eq!(errors.get("name"), [REQUIRED_MESSAGE.to_string()]);
        assert!(!errors.has("email"));
    }

    #[test]
    fn test_optional_field_skips_rules_when_blank() {
        let errors = SCHEMA.validate(|field| match field {
            "name" => Some("ok"),
            _ => Some(""),
        });

        assert!(errors.is_empty());
    }

    #[test]
    fn test_constraint_messages() {
        let errors = SCHEMA.validate(|field| match field {
            "name" => Some("too long"),
            _ => Some("not-an-email"),
        });

        assert_eq!(
            errors.get("name"),
            ["Ensure this value has at most 5 characters (it has 8).".to_string()]
        );
        assert_eq!(errors.get("email"), ["Enter a valid email address.".to_string()]);
    }

    #[test]
    fn test_image_extension() {
        assert!(Constraint::ImageFile.violation("me.PNG").is_none());
        assert!(Constraint::ImageFile.violation("notes.txt").is_some());
        assert!(Constraint::ImageFile.violation("noextension").is_some());
    }

    #[test]
    fn test_merge_and_display() {
        let mut errors = FieldErrors::new();
        errors.add("a", "first");
        let mut other = FieldErrors::new();
        other.add("a", "second");
        other.add("b", "third");

        errors.merge(other);

        assert_eq!(errors.get("a").len(), 2);
        assert_eq!(errors.to_string(), "a: first; a: second; b: third");
    }
}
