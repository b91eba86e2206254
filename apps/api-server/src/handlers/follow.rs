//! Follow and unfollow actions.

use actix_web::{HttpResponse, web};

use quill_core::DomainError;

use super::{profile_url, see_other};
use crate::middleware::auth::LoginRequired;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET|POST /profile/{handle}/follow/
pub async fn profile_follow(
    state: web::Data<AppState>,
    LoginRequired(viewer): LoginRequired,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let handle = path.into_inner();

    match state.follows.follow(&viewer, &handle).await {
        Ok(_) | Err(DomainError::SelfFollow) => Ok(see_other(profile_url(&handle))),
        Err(e) => Err(e.into()),
    }
}

/// GET|POST /profile/{handle}/unfollow/
pub async fn profile_unfollow(
    state: web::Data<AppState>,
    LoginRequired(viewer): LoginRequired,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let handle = path.into_inner();
    state.follows.unfollow(&viewer, &handle).await?;

    Ok(see_other(profile_url(&handle)))
}
