//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod cache;
mod mail;
mod repository;

pub use auth::{AuthError, PasswordService, TokenClaims, TokenService};
pub use cache::{Cache, CacheError};
pub use mail::{MailError, MailMessage, Mailer};
pub use repository::{
    AuthorRepository, BaseRepository, CommentRepository, FollowRepository, GroupRepository,
    PostRepository,
};
