//! HTTP handlers and route configuration.

mod health;
mod pages;
mod posts;
mod users;
mod views;


use actix_web::web;

use crate::middleware::error::AppError;
use crate::middleware::rate_limit::RateLimit;

/// Configure all application routes. Trailing slashes are significant.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::NotFound(err.to_string()).into()),
    )
    .app_data(
        web::FormConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .route("/health", web::get().to(health::health_check))
    // Posts
    .route("/", web::get().to(posts::list))
    .route("/user/{username}/", web::get().to(posts::user_posts))
    .service(
        web::resource("/post/new/")
            .route(web::get().to(posts::new_form))
            .route(web::post().to(posts::create)),
    )
    .service(
        web::resource("/post/{id}/")
            .route(web::get().to(posts::detail))
            .route(web::post().to(posts::add_comment)),
    )
    .service(
        web::resource("/post/{id}/update/")
            .route(web::get().to(posts::edit_form))
            .route(web::post().to(posts::update)),
    )
    .service(
        web::resource("/post/{id}/delete/")
            .route(web::get().to(posts::confirm_delete))
            .route(web::post().to(posts::delete)),
    )
    // Static pages
    .route("/about/", web::get().to(pages::about))
    .route("/contact/", web::get().to(pages::contact))
    // Accounts
    .service(
        web::resource("/register/")
            .route(web::get().to(users::register_form))
            .route(web::post().to(users::register))
            .wrap(RateLimit),
    )
    .service(
        web::resource("/login/")
            .route(web::get().to(users::login_form))
            .route(web::post().to(users::login))
            .wrap(RateLimit),
    )
    .route("/logout/", web::post().to(users::logout))
    .service(
        web::resource("/profile/")
            .route(web::get().to(users::profile))
            .route(web::post().to(users::update_profile)),
    );
}
