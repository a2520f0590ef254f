//! Registration, login/logout and the profile page.

use actix_web::{HttpResponse, http::header, web};
use serde::Deserialize;
use serde_json::json;

use quill_core::form::{AccountForm, LoginForm, ProfileForm, RegistrationForm};
use quill_shared::dto::{AuthResponse, LoginInput, ProfileInput, ProfileView, RegisterInput};

use super::views;
use crate::middleware::auth::{self, Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::middleware::flash::{self, FlashMessage, IncomingFlash};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    next: Option<String>,
}

/// Only local absolute paths are followed after login.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/",
    }
}

/// GET /register/
pub async fn register_form(
    identity: OptionalIdentity,
    flash: IncomingFlash,
) -> AppResult<HttpResponse> {
    if identity.0.is_some() {
        return Err(AppError::AlreadyAuthenticated);
    }
    Ok(flash::render(flash, views::form_view::<RegistrationForm>(json!({}))))
}

/// POST /register/
pub async fn register(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    form: web::Form<RegisterInput>,
) -> AppResult<HttpResponse> {
    let input = form.into_inner();
    // Passwords are never echoed back.
    let values = json!({ "username": input.username, "email": input.email });

    let user = state
        .accounts
        .register(
            identity.viewer(),
            RegistrationForm::new(input.username, input.email, input.password1, input.password2),
        )
        .await
        .map_err(|e| AppError::from(e).with_values(values))?;

    tracing::info!(user_id = %user.id, username = %user.username, "Account registered");
    Ok(flash::redirect_with_flash(
        "/login/",
        FlashMessage::success(format!(
            "Your account {} has been created! Now you can Login.",
            user.username
        )),
    ))
}

/// GET /login/
pub async fn login_form(flash: IncomingFlash) -> HttpResponse {
    flash::render(flash, views::form_view::<LoginForm>(json!({})))
}

/// POST /login/
///
/// Sets the session cookie and redirects to `next`; the token is also
/// returned in the body for API clients.
pub async fn login(
    state: web::Data<AppState>,
    query: web::Query<NextQuery>,
    form: web::Form<LoginInput>,
) -> AppResult<HttpResponse> {
    let input = form.into_inner();
    let values = json!({ "username": input.username });

    let user = state
        .accounts
        .authenticate(LoginForm::new(input.username, input.password))
        .await
        .map_err(|e| {
            tracing::info!("Failed login attempt");
            AppError::from(e).with_values(values)
        })?;

    let token = state
        .tokens
        .generate_token(user.id, &user.username)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let expires_in = state.tokens.expiration_seconds();

    tracing::info!(user_id = %user.id, username = %user.username, "User signed in");

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, safe_next(query.next.as_deref())))
        .cookie(auth::session_cookie(token.clone(), expires_in))
        .json(AuthResponse {
            access_token: token,
            token_type: "Bearer".to_string(),
            expires_in: expires_in.max(0) as u64,
        }))
}

/// POST /logout/
pub async fn logout() -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, "/"))
        .cookie(auth::clear_session_cookie())
        .finish()
}

/// GET /profile/
pub async fn profile(
    state: web::Data<AppState>,
    identity: Identity,
    flash: IncomingFlash,
) -> AppResult<HttpResponse> {
    let detail = state.accounts.profile(Some(&identity.0)).await?;

    let view = ProfileView {
        account_form: views::form_view::<AccountForm>(json!({
            "username": detail.user.username,
            "email": detail.user.email,
        })),
        profile_form: views::form_view::<ProfileForm>(json!({ "image": detail.profile.image })),
        username: detail.user.username,
        email: detail.user.email,
        image: detail.profile.image,
    };
    Ok(flash::render(flash, view))
}

/// POST /profile/
pub async fn update_profile(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<ProfileInput>,
) -> AppResult<HttpResponse> {
    let input = form.into_inner();
    let values = json!(input);

    let detail = state
        .accounts
        .update_profile(
            Some(&identity.0),
            AccountForm::new(input.username, input.email),
            ProfileForm::new(input.image),
        )
        .await
        .map_err(|e| AppError::from(e).with_values(values))?;

    tracing::info!(user_id = %detail.user.id, username = %detail.user.username, "Profile updated");
    Ok(flash::redirect_with_flash(
        "/profile/",
        FlashMessage::success("Your account has been updated!"),
    ))
}
