//! One-time flash messages carried across a redirect in a cookie.

use std::future::{Ready, ready};

use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload};
use serde::Serialize;

use quill_shared::ApiResponse;

pub const FLASH_COOKIE: &str = "quill_flash";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashMessage {
    pub level: String,
    pub text: String,
}

impl FlashMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: "success".to_string(),
            text: text.into(),
        }
    }

    fn encode(&self) -> String {
        urlencoding::encode(&format!("{}:{}", self.level, self.text)).into_owned()
    }

    fn decode(raw: &str) -> Option<Self> {
        let decoded = urlencoding::decode(raw).ok()?;
        let (level, text) = decoded.split_once(':')?;
        Some(Self {
            level: level.to_string(),
            text: text.to_string(),
        })
    }
}

/// The flash left by the previous response, if any.
#[derive(Debug, Clone, Default)]
pub struct IncomingFlash(pub Option<FlashMessage>);

impl FromRequest for IncomingFlash {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let flash = req
            .cookie(FLASH_COOKIE)
            .and_then(|cookie| FlashMessage::decode(cookie.value()));
        ready(Ok(IncomingFlash(flash)))
    }
}

/// `302 Found` to `location`.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// `302 Found` that leaves `flash` for the next page.
pub fn redirect_with_flash(location: &str, flash: FlashMessage) -> HttpResponse {
    let cookie = Cookie::build(FLASH_COOKIE, flash.encode())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();

    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .cookie(cookie)
        .finish()
}

/// 200 view in the API envelope, consuming any pending flash.
pub fn render<T: Serialize>(flash: IncomingFlash, data: T) -> HttpResponse {
    let mut builder = HttpResponse::Ok();

    let body = match flash.0 {
        Some(message) => {
            let mut removal = Cookie::new(FLASH_COOKIE, "");
            removal.set_path("/");
            removal.make_removal();
            builder.cookie(removal);
            ApiResponse::ok_with_message(data, message.text)
        }
        None => ApiResponse::ok(data),
    };

    builder.json(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_value_survives_encoding() {
        let flash = FlashMessage::success("Post created successfully!");
        let decoded = FlashMessage::decode(&flash.encode()).unwrap();
        assert_eq!(decoded, flash);
    }

    #[test]
    fn test_text_may_contain_separator() {
        let decoded = FlashMessage::decode("info%3Aa%3Ab").unwrap();
        assert_eq!(decoded.level, "info");
        assert_eq!(decoded.text, "a:b");
    }

    #[test]
    fn test_garbage_cookie_is_ignored() {
        assert!(FlashMessage::decode("no-separator").is_none());
    }
}
