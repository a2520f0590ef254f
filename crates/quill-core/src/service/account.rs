use std::sync::Arc;

use crate::access;
use crate::domain::{CurrentUser, Profile, User};
use crate::error::{DomainError, RepoError};
use crate::form::{
    AccountForm, FieldErrors, Form, LoginForm, NON_FIELD_ERRORS, ProfileForm, RegistrationForm,
};
use crate::ports::{PasswordService, ProfileRepository, UserRepository};

const USERNAME_TAKEN: &str = "A user with that username already exists.";
const BAD_CREDENTIALS: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

/// An account together with its profile.
#[derive(Debug, Clone)]
pub struct ProfileDetail {
    pub user: User,
    pub profile: Profile,
}

/// Registration, sign-in and profile management.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    profiles: Arc<dyn ProfileRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        profiles: Arc<dyn ProfileRepository>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        Self {
            users,
            profiles,
            passwords,
        }
    }

    /// Create an account and its default profile. Anonymous visitors only.
    pub async fn register(
        &self,
        viewer: Option<&CurrentUser>,
        form: RegistrationForm,
    ) -> Result<User, DomainError> {
        access::require_anonymous(viewer)?;

        let mut errors = form.validate().err().unwrap_or_default();
        if let Some(username) = form.username.as_deref() {
            if self.users.find_by_username(username).await?.is_some() {
                errors.add("username", USERNAME_TAKEN);
            }
        }
        errors.into_result()?;

        let (Some(username), Some(email), Some(password)) =
            (form.username, form.email, form.password1)
        else {
            return Err(DomainError::Internal("validated form lost a field".into()));
        };

        let password_hash = self
            .passwords
            .hash(&password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let user = User::new(username, email, password_hash);
        let profile = Profile::new(user.id);

        self.users
            .create_with_profile(user, profile)
            .await
            .map_err(|e| match e {
                RepoError::Constraint(_) => username_taken(),
                other => other.into(),
            })
    }

    /// Check credentials and return the matching user.
    pub async fn authenticate(&self, form: LoginForm) -> Result<User, DomainError> {
        form.validate()?;

        let username = form.username.as_deref().unwrap_or_default();
        let password = form.password.as_deref().unwrap_or_default();

        let Some(user) = self.users.find_by_username(username).await? else {
            return Err(bad_credentials());
        };

        let valid = self
            .passwords
            .verify(password, &user.password_hash)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if valid { Ok(user) } else { Err(bad_credentials()) }
    }

    pub async fn profile(
        &self,
        viewer: Option<&CurrentUser>,
    ) -> Result<ProfileDetail, DomainError> {
        let current = access::require_authenticated(viewer)?;
        let user = self
            .users
            .find_by_id(current.id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", current.id))?;

        // Accounts created outside registration may lack a profile.
        let profile = self
            .profiles
            .find_by_user_id(user.id)
            .await?
            .unwrap_or_else(|| Profile::new(user.id));

        Ok(ProfileDetail { user, profile })
    }

    /// Update the account and profile forms together: both must be valid
    /// before either is written.
    pub async fn update_profile(
        &self,
        viewer: Option<&CurrentUser>,
        account: AccountForm,
        profile_form: ProfileForm,
    ) -> Result<ProfileDetail, DomainError> {
        let ProfileDetail { user, profile } = self.profile(viewer).await?;

        let mut errors = account.validate().err().unwrap_or_default();
        if let Err(profile_errors) = profile_form.validate() {
            errors.merge(profile_errors);
        }
        if let Some(username) = account.username.as_deref() {
            let taken = self
                .users
                .find_by_username(username)
                .await?
                .is_some_and(|other| other.id != user.id);
            if taken {
                errors.add("username", USERNAME_TAKEN);
            }
        }
        errors.into_result()?;

        let user = User {
            username: account.username.unwrap_or(user.username),
            email: account.email.unwrap_or(user.email),
            ..user
        };
        let profile = Profile {
            image: profile_form.image.unwrap_or(profile.image),
            ..profile
        };

        let (user, profile) = self
            .users
            .update_with_profile(user, profile)
            .await
            .map_err(|e| match e {
                RepoError::Constraint(_) => username_taken(),
                other => other.into(),
            })?;

        Ok(ProfileDetail { user, profile })
    }
}

fn username_taken() -> DomainError {
    let mut errors = FieldErrors::new();
    errors.add("username", USERNAME_TAKEN);
    DomainError::Validation(errors)
}

fn bad_credentials() -> DomainError {
    let mut errors = FieldErrors::new();
    errors.add(NON_FIELD_ERRORS, BAD_CREDENTIALS);
    DomainError::Validation(errors)
}
