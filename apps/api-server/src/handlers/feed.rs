//! Listing pages: global, followed, group and profile feeds.

use actix_web::{HttpRequest, HttpResponse, web};

use quill_shared::dto::PageQuery;

use crate::middleware::auth::{CurrentViewer, LoginRequired};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET / - every post, served from the feed cache.
pub async fn index(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .feed
        .global_page(req.query_string(), query.page.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(page))
}

/// GET /follow/ - posts by authors the viewer follows.
pub async fn follow_index(
    state: web::Data<AppState>,
    LoginRequired(viewer): LoginRequired,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .feed
        .followed_page(&viewer, query.page.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(page))
}

/// GET /group/{slug}/
pub async fn group_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let feed = state.feed.group_page(&slug, query.page.as_deref()).await?;

    Ok(HttpResponse::Ok().json(feed))
}

/// GET /profile/{handle}/
pub async fn profile(
    state: web::Data<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let handle = path.into_inner();
    let profile = state
        .feed
        .author_page(&viewer, &handle, query.page.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(profile))
}
