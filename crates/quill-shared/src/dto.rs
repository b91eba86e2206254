//! Request and response bodies for the HTTP API.

use serde::{Deserialize, Serialize};

/// Sign-up form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupForm {
    pub handle: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Log-in form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    pub handle: String,
    pub password: String,
}

/// Where to send the browser after logging in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Issued access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Create/edit post form. `group` is a group slug; blank means none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

/// `?page=` on listing routes. Kept as a raw string: anything that is not a
/// number falls back to the first page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_form_optional_fields() {
        let form: PostForm = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();

        assert_eq!(form.text, "hi");
        assert!(form.group.is_none());
        assert!(form.image.is_none());
    }

    #[test]
    fn test_page_query_keeps_garbage() {
        let query: PageQuery = serde_json::from_str(r#"{"page":"abc"}"#).unwrap();

        assert_eq!(query.page.as_deref(), Some("abc"));
    }
}
