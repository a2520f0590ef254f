use super::{Constraint, FieldErrors, FieldSpec, Form, Schema, clean};

pub const PASSWORD_MIN_LENGTH: usize = 8;

const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "password123", "12345678", "123456789", "1234567890",
    "qwerty123", "qwertyuiop", "iloveyou", "sunshine", "princess", "football",
    "baseball", "welcome1", "letmein1", "trustno1", "superman", "starwars",
    "abc12345", "passw0rd", "admin123", "dragon12",
];

const USERNAME_CONSTRAINTS: &[Constraint] = &[
    Constraint::Required,
    Constraint::MaxLength(150),
    Constraint::Username,
];
const EMAIL_CONSTRAINTS: &[Constraint] = &[
    Constraint::Required,
    Constraint::MaxLength(254),
    Constraint::Email,
];

static REGISTRATION_SCHEMA: Schema = Schema {
    fields: &[
        FieldSpec {
            name: "username",
            constraints: USERNAME_CONSTRAINTS,
        },
        FieldSpec {
            name: "email",
            constraints: EMAIL_CONSTRAINTS,
        },
        FieldSpec {
            name: "password1",
            constraints: &[Constraint::Required],
        },
        FieldSpec {
            name: "password2",
            constraints: &[Constraint::Required],
        },
    ],
};

static LOGIN_SCHEMA: Schema = Schema {
    fields: &[
        FieldSpec {
            name: "username",
            constraints: &[Constraint::Required],
        },
        FieldSpec {
            name: "password",
            constraints: &[Constraint::Required],
        },
    ],
};

static ACCOUNT_SCHEMA: Schema = Schema {
    fields: &[
        FieldSpec {
            name: "username",
            constraints: USERNAME_CONSTRAINTS,
        },
        FieldSpec {
            name: "email",
            constraints: EMAIL_CONSTRAINTS,
        },
    ],
};

static PROFILE_SCHEMA: Schema = Schema {
    fields: &[FieldSpec {
        name: "image",
        constraints: &[Constraint::MaxLength(100), Constraint::ImageFile],
    }],
};

/// Passwords keep their whitespace; only emptiness is collapsed.
fn raw_password(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Sign-up form.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password1: Option<String>,
    pub password2: Option<String>,
}

impl RegistrationForm {
    pub fn new(
        username: Option<String>,
        email: Option<String>,
        password1: Option<String>,
        password2: Option<String>,
    ) -> Self {
        Self {
            username: clean(username),
            email: clean(email),
            password1: raw_password(password1),
            password2: raw_password(password2),
        }
    }

    fn password_problems(&self, password: &str) -> Vec<&'static str> {
        let mut problems = Vec::new();

        if password.chars().count() < PASSWORD_MIN_LENGTH {
            problems.push("This password is too short. It must contain at least 8 characters.");
        }
        if password.chars().all(|c| c.is_ascii_digit()) {
            problems.push("This password is entirely numeric.");
        }
        if COMMON_PASSWORDS.contains(&password.to_lowercase().as_str()) {
            problems.push("This password is too common.");
        }
        if let Some(username) = self.username.as_deref().filter(|u| u.len() >= 3) {
            if password.to_lowercase().contains(&username.to_lowercase()) {
                problems.push("The password is too similar to the username.");
            }
        }

        problems
    }
}

impl Form for RegistrationForm {
    fn schema() -> &'static Schema {
        &REGISTRATION_SCHEMA
    }

    fn value(&self, field: &str) -> Option<&str> {
        match field {
            "username" => self.username.as_deref(),
            "email" => self.email.as_deref(),
            "password1" => self.password1.as_deref(),
            "password2" => self.password2.as_deref(),
            _ => None,
        }
    }

    fn check(&self, errors: &mut FieldErrors) {
        let (Some(first), Some(second)) = (self.password1.as_deref(), self.password2.as_deref())
        else {
            return;
        };

        if first != second {
            errors.add("password2", "The two password fields didn't match.");
            return;
        }

        for problem in self.password_problems(second) {
            errors.add("password2", problem);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginForm {
    pub fn new(username: Option<String>, password: Option<String>) -> Self {
        Self {
            username: clean(username),
            password: raw_password(password),
        }
    }
}

impl Form for LoginForm {
    fn schema() -> &'static Schema {
        &LOGIN_SCHEMA
    }

    fn value(&self, field: &str) -> Option<&str> {
        match field {
            "username" => self.username.as_deref(),
            "password" => self.password.as_deref(),
            _ => None,
        }
    }
}

/// Account half of the profile page.
#[derive(Debug, Clone, Default)]
pub struct AccountForm {
    pub username: Option<String>,
    pub email: Option<String>,
}

impl AccountForm {
    pub fn new(username: Option<String>, email: Option<String>) -> Self {
        Self {
            username: clean(username),
            email: clean(email),
        }
    }
}

impl Form for AccountForm {
    fn schema() -> &'static Schema {
        &ACCOUNT_SCHEMA
    }

    fn value(&self, field: &str) -> Option<&str> {
        match field {
            "username" => self.username.as_deref(),
            "email" => self.email.as_deref(),
            _ => None,
        }
    }
}

/// Profile half of the profile page. A blank image keeps the current one.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub image: Option<String>,
}

impl ProfileForm {
    pub fn new(image: Option<String>) -> Self {
        Self {
            image: clean(image),
        }
    }
}

impl Form for ProfileForm {
    fn schema() -> &'static Schema {
        &PROFILE_SCHEMA
    }

    fn value(&self, field: &str) -> Option<&str> {
        match field {
            "image" => self.image.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(username: &str, password1: &str, password2: &str) -> RegistrationForm {
        RegistrationForm::new(
            Some(username.into()),
            Some(format!("{username}@example.com")),
            Some(password1.into()),
            Some(password2.into()),
        )
    }

    #[test]
    fn test_valid_registration() {
        assert!(registration("alice", "correct-horse-9", "correct-horse-9").validate().is_ok());
    }

    #[test]
    fn test_mismatched_passwords() {
        let errors = registration("alice", "correct-horse-9", "correct-horse-8")
            .validate()
            .unwrap_err();

        assert_eq!(
            errors.get("password2"),
            ["The two password fields didn't match.".to_string()]
        );
    }

    #[test]
    fn test_weak_passwords() {
        let errors = registration("alice", "1234", "1234").validate().unwrap_err();
        let messages = errors.get("password2");
        assert!(messages.iter().any(|m| m.contains("too short")));
        assert!(messages.iter().any(|m| m.contains("entirely numeric")));

        let errors = registration("alice", "password123", "password123")
            .validate()
            .unwrap_err();
        assert!(errors.get("password2").iter().any(|m| m.contains("too common")));

        let errors = registration("alice", "alice-rules-ok", "alice-rules-ok")
            .validate()
            .unwrap_err();
        assert!(errors.get("password2").iter().any(|m| m.contains("similar")));
    }

    #[test]
    fn test_invalid_username_and_email() {
        let form = RegistrationForm::new(
            Some("bad name!".into()),
            Some("nope".into()),
            Some("correct-horse-9".into()),
            Some("correct-horse-9".into()),
        );

        let errors = form.validate().unwrap_err();
        assert!(errors.has("username"));
        assert!(errors.has("email"));
        // Cross-field checks wait for the schema to pass.
        assert!(!errors.has("password2"));
    }

    #[test]
    fn test_profile_image_rules() {
        assert!(ProfileForm::new(None).validate().is_ok());
        assert!(ProfileForm::new(Some("avatars/me.jpg".into())).validate().is_ok());
        assert!(ProfileForm::new(Some("avatars/me.exe".into())).validate().is_err());
    }

    #[test]
    fn test_login_requires_both_fields() {
        let errors = LoginForm::new(Some("alice".into()), None).validate().unwrap_err();
        assert!(errors.has("password"));
        assert!(!errors.has("username"));
    }
}
