//! Domain entities - the core business objects.

mod author;
mod comment;
mod created;
mod follow;
mod group;
mod post;
mod viewer;

pub use author::{Author, AuthorRef};
pub use comment::{Comment, NewComment};
pub use created::Created;
pub use follow::Follow;
pub use group::{Group, GroupRef};
pub use post::{NewPost, Post, PostChanges, PostId};
pub use viewer::{Principal, Viewer};
