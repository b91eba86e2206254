//! Sign-up, log-in and log-out.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use quill_core::services::Registration;
use quill_shared::dto::{AuthResponse, LoginForm, NextQuery, SignupForm};

use super::see_other;
use crate::middleware::auth::{cleared_token_cookie, safe_next, token_cookie};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /auth/signup/
pub async fn signup(
    state: web::Data<AppState>,
    form: web::Form<SignupForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();

    state
        .accounts
        .register(Registration {
            handle: form.handle,
            email: form.email,
            password: form.password,
            first_name: form.first_name,
            last_name: form.last_name,
        })
        .await?;

    Ok(see_other("/"))
}

/// GET /auth/login/ - the login form context, echoing `next`.
pub async fn login_page(query: web::Query<NextQuery>) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "next": safe_next(query.next.as_deref()) }))
}

/// POST /auth/login/
///
/// Sets the token cookie and redirects to `next`. API clients that ask for
/// JSON and give no `next` get the token in the body instead.
pub async fn login(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<NextQuery>,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let (author, token) = state.accounts.login(&form.handle, &form.password).await?;
    let expires_in = state.tokens().expiration_seconds();
    tracing::info!(author = %author.handle, "Author logged in");

    let next = safe_next(query.next.as_deref());
    if next.is_none() && wants_json(&req) {
        return Ok(HttpResponse::Ok()
            .cookie(token_cookie(&token, expires_in))
            .json(AuthResponse {
                access_token: token,
                token_type: "Bearer".to_string(),
                expires_in: expires_in.max(0) as u64,
            }));
    }

    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, next.unwrap_or("/")))
        .cookie(token_cookie(&token, expires_in))
        .finish())
}

/// GET|POST /auth/logout/
pub async fn logout() -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/"))
        .cookie(cleared_token_cookie())
        .finish()
}

fn wants_json(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"))
}
