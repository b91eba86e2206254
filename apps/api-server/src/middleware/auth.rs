//! Request authentication extractors.

use std::fmt;
use std::future::{Ready, ready};

use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload, web};

use quill_core::domain::Viewer;

use crate::state::AppState;

/// Cookie carrying the access token for browser clients.
pub const TOKEN_COOKIE: &str = "quill_token";

const LOGIN_PATH: &str = "/auth/login/";

/// The viewer behind a request. Requests without a valid token are anonymous.
///
/// ```ignore
/// async fn page(viewer: CurrentViewer) -> impl Responder {
///     format!("authenticated: {}", viewer.0.is_authenticated())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentViewer(pub Viewer);

impl FromRequest for CurrentViewer {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(CurrentViewer(viewer_from_request(req))))
    }
}

/// An authenticated viewer. Anonymous requests are redirected to the login
/// page with the requested path in `next`.
#[derive(Debug, Clone)]
pub struct LoginRequired(pub Viewer);

impl FromRequest for LoginRequired {
    type Error = LoginRedirect;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let viewer = viewer_from_request(req);
        if viewer.is_authenticated() {
            ready(Ok(LoginRequired(viewer)))
        } else {
            ready(Err(LoginRedirect::for_request(req)))
        }
    }
}

/// Rejection of [`LoginRequired`]: `302 Found` to the login page.
#[derive(Debug)]
pub struct LoginRedirect {
    next: String,
}

impl LoginRedirect {
    pub fn for_request(req: &HttpRequest) -> Self {
        let next = match req.query_string() {
            "" => req.path().to_string(),
            query => format!("{}?{}", req.path(), query),
        };
        Self { next }
    }

    pub fn location(&self) -> String {
        login_url(&self.next)
    }
}

impl fmt::Display for LoginRedirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "login required for {}", self.next)
    }
}

impl ResponseError for LoginRedirect {
    fn status_code(&self) -> StatusCode {
        StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Found()
            .insert_header((header::LOCATION, self.location()))
            .finish()
    }
}

pub fn login_url(next: &str) -> String {
    format!("{LOGIN_PATH}?next={}", encode_query_value(next))
}

/// Percent-encode a query value, leaving `/` readable.
fn encode_query_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

/// Only same-site absolute paths are honoured as a post-login destination.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| n.starts_with('/') && !n.starts_with("//") && !n.contains('\\'))
}

pub fn token_cookie(token: &str, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, token.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(max_age_secs))
        .finish()
}

pub fn cleared_token_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(TOKEN_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let from_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);

    from_header.or_else(|| req.cookie(TOKEN_COOKIE).map(|c| c.value().to_string()))
}

fn viewer_from_request(req: &HttpRequest) -> Viewer {
    let Some(token) = bearer_token(req) else {
        return Viewer::Anonymous;
    };

    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        tracing::error!("AppState not found in app data");
        return Viewer::Anonymous;
    };

    match state.tokens().validate_token(&token) {
        Ok(claims) => Viewer::authenticated(claims.author_id, claims.handle),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring invalid access token");
            Viewer::Anonymous
        }
    }
}
