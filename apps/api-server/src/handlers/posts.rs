//! Post detail, authoring and comments.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use quill_core::DomainError;
use quill_core::domain::{Group, PostId};
use quill_core::services::{PostDetail, PostDraft, can_edit};
use quill_shared::dto::{CommentForm, PostForm};

use super::{post_url, profile_url, see_other};
use crate::middleware::auth::{CurrentViewer, LoginRequired};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Serialize)]
struct PostDetailView {
    #[serde(flatten)]
    detail: PostDetail,
    can_edit: bool,
}

/// Context for the create/edit form.
#[derive(Serialize)]
struct PostFormView {
    is_edit: bool,
    post_id: Option<PostId>,
    form: PostForm,
    groups: Vec<Group>,
}

fn draft(form: PostForm) -> PostDraft {
    PostDraft {
        text: form.text,
        group: form.group,
        image: form.image,
    }
}

/// GET /posts/{post_id}/
pub async fn post_detail(
    state: web::Data<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    let detail = state.feed.post_detail(path.into_inner()).await?;
    let can_edit = can_edit(&viewer, &detail.post);

    Ok(HttpResponse::Ok().json(PostDetailView { detail, can_edit }))
}

/// GET /create/
pub async fn create_form(
    state: web::Data<AppState>,
    _viewer: LoginRequired,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(PostFormView {
        is_edit: false,
        post_id: None,
        form: PostForm::default(),
        groups: state.groups.list().await?,
    }))
}

/// POST /create/ - on success, back to the author's profile.
pub async fn create_post(
    state: web::Data<AppState>,
    LoginRequired(viewer): LoginRequired,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let post = state
        .publishing
        .create_post(&viewer, draft(form.into_inner()))
        .await?;

    Ok(see_other(profile_url(&post.author.handle)))
}

/// GET /posts/{post_id}/edit/
///
/// Anyone but the author is sent back to the post.
pub async fn edit_form(
    state: web::Data<AppState>,
    LoginRequired(viewer): LoginRequired,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    let post = match state.publishing.editable_post(&viewer, post_id).await {
        Ok(post) => post,
        Err(DomainError::Forbidden | DomainError::NotFound { .. }) => {
            return Ok(see_other(post_url(post_id)));
        }
        Err(e) => return Err(e.into()),
    };

    Ok(HttpResponse::Ok().json(PostFormView {
        is_edit: true,
        post_id: Some(post.id),
        form: PostForm {
            text: post.text,
            group: post.group.map(|g| g.slug),
            image: post.image,
        },
        groups: state.groups.list().await?,
    }))
}

/// POST /posts/{post_id}/edit/
pub async fn edit_post(
    state: web::Data<AppState>,
    LoginRequired(viewer): LoginRequired,
    path: web::Path<PostId>,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    match state
        .publishing
        .edit_post(&viewer, post_id, draft(form.into_inner()))
        .await
    {
        Ok(_) | Err(DomainError::Forbidden | DomainError::NotFound { .. }) => {
            Ok(see_other(post_url(post_id)))
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /posts/{post_id}/comment/
///
/// Rejected comment text is dropped: the viewer lands on the post either way.
pub async fn add_comment(
    state: web::Data<AppState>,
    LoginRequired(viewer): LoginRequired,
    path: web::Path<PostId>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    match state
        .publishing
        .add_comment(&viewer, post_id, form.into_inner().text)
        .await
    {
        Ok(_) => {}
        Err(e @ (DomainError::Content(_) | DomainError::InvalidField { .. })) => {
            tracing::warn!(post_id, error = %e, "Comment rejected");
        }
        Err(e) => return Err(AppError::from(e)),
    }

    Ok(see_other(post_url(post_id)))
}
