//! Sign-up and log-in on top of the token, password and mail ports.

use std::sync::Arc;

use crate::domain::Author;
use crate::error::{DomainError, RepoError};
use crate::ports::{AuthorRepository, MailMessage, Mailer, PasswordService, TokenService};

pub const MIN_PASSWORD_LEN: usize = 8;
const MAX_HANDLE_LEN: usize = 150;

/// Submitted sign-up form.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub handle: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Clone)]
pub struct AccountService {
    authors: Arc<dyn AuthorRepository>,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn TokenService>,
    mailer: Arc<dyn Mailer>,
}

impl AccountService {
    pub fn new(
        authors: Arc<dyn AuthorRepository>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            authors,
            passwords,
            tokens,
            mailer,
        }
    }

    pub fn tokens(&self) -> &Arc<dyn TokenService> {
        &self.tokens
    }

    /// Create an author account and send the welcome mail.
    pub async fn register(&self, form: Registration) -> Result<Author, DomainError> {
        let handle = form.handle.trim().to_string();
        validate_handle(&handle)?;

        if form.email.is_empty() || !form.email.contains('@') {
            return Err(DomainError::InvalidField {
                field: "email",
                message: "invalid email address".to_string(),
            });
        }
        if form.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::InvalidField {
                field: "password",
                message: format!("must be at least {MIN_PASSWORD_LEN} characters"),
            });
        }

        if self.authors.find_by_handle(&handle).await?.is_some() {
            return Err(DomainError::Duplicate(format!("handle '{handle}' is taken")));
        }

        let password_hash = self
            .passwords
            .hash(&form.password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let author = Author::new(handle, form.email, password_hash)
            .with_name(form.first_name, form.last_name);

        let author = self.authors.create(author).await.map_err(|e| match e {
            RepoError::Constraint(msg) => DomainError::Duplicate(msg),
            other => other.into(),
        })?;

        tracing::info!(author = %author.handle, "Author registered");

        if let Err(e) = self.mailer.send(welcome_message(&author)).await {
            tracing::warn!(author = %author.handle, error = %e, "Welcome mail not sent");
        }

        Ok(author)
    }

    /// Check credentials and issue an access token.
    pub async fn login(&self, handle: &str, password: &str) -> Result<(Author, String), DomainError> {
        let author = self
            .authors
            .find_by_handle(handle)
            .await?
            .ok_or(DomainError::Unauthorized)?;

        let valid = self
            .passwords
            .verify(password, &author.password_hash)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        if !valid {
            tracing::debug!(author = %handle, "Rejected login");
            return Err(DomainError::Unauthorized);
        }

        let token = self
            .tokens
            .generate_token(author.id, &author.handle)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        Ok((author, token))
    }
}

fn validate_handle(handle: &str) -> Result<(), DomainError> {
    let invalid = |message: &str| DomainError::InvalidField {
        field: "handle",
        message: message.to_string(),
    };

    if handle.is_empty() {
        return Err(invalid("this field is required"));
    }
    if handle.chars().count() > MAX_HANDLE_LEN {
        return Err(invalid("too long"));
    }
    if !handle
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(invalid("letters, digits and @/./+/-/_ only"));
    }
    Ok(())
}

fn welcome_message(author: &Author) -> MailMessage {
    MailMessage {
        to: author.email.clone(),
        subject: "Registration complete".to_string(),
        body: format!(
            "Your Quill account is ready.\n\nLog in with the handle: {}.\n\nThe Quill team\n",
            author.handle
        ),
    }
}
