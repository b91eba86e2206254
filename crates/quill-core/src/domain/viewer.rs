use uuid::Uuid;

use crate::error::DomainError;

/// An authenticated principal as seen by the domain layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub author_id: Uuid,
    pub handle: String,
}

/// The requesting party. Passed explicitly into every feed and authorization
/// operation instead of being read from ambient request state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Viewer {
    #[default]
    Anonymous,
    Authenticated(Principal),
}

impl Viewer {
    pub fn authenticated(author_id: Uuid, handle: impl Into<String>) -> Self {
        Self::Authenticated(Principal {
            author_id,
            handle: handle.into(),
        })
    }

    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(principal) => Some(principal),
        }
    }

    /// The principal, or `Unauthorized` for anonymous viewers.
    pub fn require(&self) -> Result<&Principal, DomainError> {
        self.principal().ok_or(DomainError::Unauthorized)
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal().is_some()
    }
}
