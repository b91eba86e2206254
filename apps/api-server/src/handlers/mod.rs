//! HTTP handlers and route configuration.

mod auth;
mod feed;
mod follow;
mod health;
mod posts;


use actix_web::http::header;
use actix_web::{HttpResponse, web};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        // Listings
        .route("/", web::get().to(feed::index))
        .route("/follow/", web::get().to(feed::follow_index))
        .route("/group/{slug}/", web::get().to(feed::group_posts))
        .route("/profile/{handle}/", web::get().to(feed::profile))
        // Follow graph
        .service(
            web::resource("/profile/{handle}/follow/")
                .route(web::get().to(follow::profile_follow))
                .route(web::post().to(follow::profile_follow)),
        )
        .service(
            web::resource("/profile/{handle}/unfollow/")
                .route(web::get().to(follow::profile_unfollow))
                .route(web::post().to(follow::profile_unfollow)),
        )
        // Posts
        .service(
            web::resource("/create/")
                .route(web::get().to(posts::create_form))
                .route(web::post().to(posts::create_post)),
        )
        .route("/posts/{post_id}/", web::get().to(posts::post_detail))
        .service(
            web::resource("/posts/{post_id}/edit/")
                .route(web::get().to(posts::edit_form))
                .route(web::post().to(posts::edit_post)),
        )
        .route("/posts/{post_id}/comment/", web::post().to(posts::add_comment))
        // Accounts
        .service(
            web::scope("/auth")
                .route("/signup/", web::post().to(auth::signup))
                .service(
                    web::resource("/login/")
                        .route(web::get().to(auth::login_page))
                        .route(web::post().to(auth::login)),
                )
                .service(
                    web::resource("/logout/")
                        .route(web::get().to(auth::logout))
                        .route(web::post().to(auth::logout)),
                ),
        );
}

/// `303 See Other` to `location`, the response to every successful form post.
pub(crate) fn see_other(location: impl AsRef<str>) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.as_ref()))
        .finish()
}

pub(crate) fn profile_url(handle: &str) -> String {
    format!("/profile/{handle}/")
}

pub(crate) fn post_url(post_id: i64) -> String {
    format!("/posts/{post_id}/")
}
