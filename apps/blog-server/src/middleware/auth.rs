//! Identity extractors and the session cookie.

use std::future::{Ready, ready};

use actix_web::cookie::{Cookie, SameSite, time};
use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};

use quill_core::domain::CurrentUser;
use quill_core::ports::{AuthError, TokenClaims};

use super::error::AppError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "quill_token";

/// Authenticated user identity extractor.
///
/// Anonymous requests are redirected to the login page:
/// ```ignore
/// async fn new_post(identity: Identity) -> AppResult<HttpResponse> {
///     // identity.0.username ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity(pub CurrentUser);

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self(CurrentUser {
            id: claims.user_id,
            username: claims.username,
        })
    }
}

/// Path and query of the request, the place to return to after login.
pub fn requested_path(req: &HttpRequest) -> String {
    match req.uri().path_and_query() {
        Some(pq) => pq.as_str().to_string(),
        None => req.path().to_string(),
    }
}

/// Token from `Authorization: Bearer`, falling back to the session cookie.
///
/// Other authorization schemes are ignored rather than rejected.
fn bearer_or_cookie(req: &HttpRequest) -> Result<String, AuthError> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Ok(token.to_string());
    }

    req.cookie(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::MissingAuth)
}

fn identify(req: &HttpRequest) -> Result<Identity, AuthError> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        tracing::error!("AppState not found in app data");
        return Err(AuthError::InvalidToken(
            "Server configuration error".to_string(),
        ));
    };

    let token = bearer_or_cookie(req)?;
    state.tokens.validate_token(&token).map(Identity::from)
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(identify(req).map_err(|e| {
            if !matches!(e, AuthError::MissingAuth) {
                tracing::debug!(error = %e, "Rejected credentials");
            }
            AppError::LoginRequired {
                next: requested_path(req),
            }
        }))
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
#[derive(Debug, Clone)]
pub struct OptionalIdentity(pub Option<CurrentUser>);

impl OptionalIdentity {
    pub fn viewer(&self) -> Option<&CurrentUser> {
        self.0.as_ref()
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(OptionalIdentity(identify(req).ok().map(|i| i.0))))
    }
}

/// HttpOnly cookie carrying a freshly issued token.
pub fn session_cookie(token: String, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age_seconds))
        .finish()
}

/// Expired session cookie that signs the browser out.
pub fn clear_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn test_bearer_header_wins_over_cookie() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer from-header"))
            .cookie(Cookie::new(SESSION_COOKIE, "from-cookie"))
            .to_http_request();

        assert_eq!(bearer_or_cookie(&req).unwrap(), "from-header");
    }

    #[test]
    fn test_other_scheme_falls_back_to_cookie() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic YWxpY2U6c2VjcmV0"))
            .cookie(Cookie::new(SESSION_COOKIE, "from-cookie"))
            .to_http_request();

        assert_eq!(bearer_or_cookie(&req).unwrap(), "from-cookie");
    }

    #[test]
    fn test_nothing_presented_is_missing_auth() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic YWxpY2U6c2VjcmV0"))
            .to_http_request();

        assert!(matches!(bearer_or_cookie(&req), Err(AuthError::MissingAuth)));
    }
}
