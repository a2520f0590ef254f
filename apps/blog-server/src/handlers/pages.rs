//! Static pages.

use actix_web::HttpResponse;
use chrono::{Datelike, Utc};

use quill_shared::dto::StaticPageView;

use crate::middleware::flash::{self, IncomingFlash};

fn page(flash: IncomingFlash, title: &str) -> HttpResponse {
    flash::render(
        flash,
        StaticPageView {
            page: title.to_string(),
            year: Utc::now().year(),
        },
    )
}

/// GET /about/
pub async fn about(flash: IncomingFlash) -> HttpResponse {
    page(flash, "About")
}

/// GET /contact/
pub async fn contact(flash: IncomingFlash) -> HttpResponse {
    page(flash, "Contact")
}
