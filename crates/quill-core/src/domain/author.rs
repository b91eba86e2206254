use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author entity - the principal that owns posts and comments and can be followed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    /// Unique login handle, immutable once created.
    pub handle: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub joined: DateTime<Utc>,
}

impl Author {
    /// Create a new author with a generated ID.
    pub fn new(handle: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            handle,
            email,
            password_hash,
            first_name: String::new(),
            last_name: String::new(),
            joined: Utc::now(),
        }
    }

    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    pub fn to_ref(&self) -> AuthorRef {
        AuthorRef {
            id: self.id,
            handle: self.handle.clone(),
        }
    }
}

/// Lightweight author reference embedded in posts and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    pub id: Uuid,
    pub handle: String,
}
